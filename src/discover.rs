use crate::error::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A directory of lesson files.
#[derive(Debug, Clone)]
pub struct Chapter {
    pub path: PathBuf,
    pub name: String,
}

impl Chapter {
    pub fn new(path: PathBuf, base_dir: &Path) -> Self {
        let name = match path.strip_prefix(base_dir) {
            Ok(rel) if rel.as_os_str().is_empty() => base_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| ".".to_string()),
            Ok(rel) => rel.to_string_lossy().into_owned(),
            Err(_) => path.to_string_lossy().into_owned(),
        };

        Self { path, name }
    }

    pub fn lesson_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.path)
            .into_iter()
            .flatten()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_lesson_file(p))
            .collect();
        files.sort();
        files
    }
}

fn is_lesson_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "txt")
        && !path
            .file_name()
            .map_or(false, |n| n.to_string_lossy().starts_with('_'))
}

pub fn discover_chapters(root: &Path) -> Result<Vec<Chapter>> {
    let mut chapter_dirs: BTreeSet<PathBuf> = BTreeSet::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        let path = entry.path();

        if !entry.file_type().is_file() || !is_lesson_file(path) {
            continue;
        }

        if let Some(parent) = path.parent() {
            chapter_dirs.insert(parent.to_path_buf());
        }
    }

    let mut chapters: Vec<Chapter> = chapter_dirs
        .into_iter()
        .map(|p| Chapter::new(p, root))
        .collect();

    chapters.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(chapters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const LESSON: &str = "===\ndot\n===\n.\n---\nab\n---\n\"a\"\n\"b\"\n";

    fn create_lesson_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_discover_single_chapter() {
        let tmp = TempDir::new().unwrap();
        create_lesson_file(tmp.path(), "basics/intro.txt", LESSON);

        let chapters = discover_chapters(tmp.path()).unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].name, "basics");
        assert_eq!(chapters[0].lesson_files().len(), 1);
    }

    #[test]
    fn test_discover_nested_chapters_sorted() {
        let tmp = TempDir::new().unwrap();
        create_lesson_file(tmp.path(), "syntax/quantifiers/braces.txt", LESSON);
        create_lesson_file(tmp.path(), "syntax/anchors/caret.txt", LESSON);
        create_lesson_file(tmp.path(), "basics/intro.txt", LESSON);

        let chapters = discover_chapters(tmp.path()).unwrap();
        let names: Vec<_> = chapters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            ["basics", "syntax/anchors", "syntax/quantifiers"]
                .iter()
                .map(|s| Path::new(s).to_string_lossy().into_owned())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_skip_underscore_and_other_extensions() {
        let tmp = TempDir::new().unwrap();
        create_lesson_file(tmp.path(), "basics/intro.txt", LESSON);
        create_lesson_file(tmp.path(), "basics/_draft.txt", LESSON);
        create_lesson_file(tmp.path(), "basics/notes.md", "# notes");
        create_lesson_file(tmp.path(), "drafts/_only.txt", LESSON);

        let chapters = discover_chapters(tmp.path()).unwrap();
        assert_eq!(chapters.len(), 1);
        let files = chapters[0].lesson_files();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("intro.txt"));
    }

    #[test]
    fn test_lessons_in_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("lessons");
        create_lesson_file(&root, "intro.txt", LESSON);

        let chapters = discover_chapters(&root).unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].name, "lessons");
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(discover_chapters(&tmp.path().join("missing")).is_err());
    }
}
