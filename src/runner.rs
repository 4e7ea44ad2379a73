use crate::discover::Chapter;
use crate::error::Result;
use crate::lesson::{parse_lesson_content, parse_lesson_file, Expectation, Lesson};
use crate::matcher::{MatchOptions, MatcherBuilder, PatternMatcher};
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct LessonResult {
    pub lesson: Lesson,
    pub passed: bool,
    /// What the engine produced; `None` only if the lesson never ran.
    pub actual: Option<Expectation>,
    pub error: Option<String>,
    pub elapsed: Duration,
    pub chapter: String,
}

#[derive(Debug, Clone)]
pub struct FileResult {
    pub file_path: PathBuf,
    pub results: Vec<LessonResult>,
    pub parse_error: Option<String>,
}

impl FileResult {
    pub fn passed(&self) -> bool {
        self.parse_error.is_none() && self.results.iter().all(|r| r.passed)
    }
}

#[derive(Debug)]
pub struct ChapterResult {
    pub chapter: Chapter,
    pub file_results: Vec<FileResult>,
    pub elapsed: Duration,
}

impl ChapterResult {
    pub fn passed(&self) -> bool {
        self.file_results.iter().all(|f| f.passed())
    }

    pub fn total_lessons(&self) -> usize {
        self.file_results.iter().map(|f| f.results.len()).sum()
    }

    pub fn passed_lessons(&self) -> usize {
        self.file_results
            .iter()
            .flat_map(|f| &f.results)
            .filter(|r| r.passed)
            .count()
    }

    pub fn has_parse_errors(&self) -> bool {
        self.file_results.iter().any(|f| f.parse_error.is_some())
    }
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    LessonStart {
        chapter: String,
        file: String,
        name: String,
    },
    LessonComplete(Box<LessonResult>),
}

/// Compile `pattern` and run it once over `input`.
pub fn try_pattern(pattern: &str, input: &str, options: MatchOptions) -> Result<PatternMatcher> {
    let mut matcher = MatcherBuilder::new(pattern)
        .input(input)
        .options(options)
        .build()?;
    matcher.match_input();
    Ok(matcher)
}

pub fn run_lesson(lesson: &Lesson, chapter: &str) -> LessonResult {
    let start = Instant::now();
    debug!("running lesson '{}' with pattern '{}'", lesson.name, lesson.pattern);

    let built = MatcherBuilder::new(&lesson.pattern)
        .input(&lesson.input)
        .options(lesson.options)
        .build();

    let (actual, error) = match built {
        Ok(mut matcher) => {
            matcher.match_input();
            let found = matcher.results().map(<[String]>::to_vec).unwrap_or_default();
            (Expectation::Matches(found), None)
        }
        Err(e) => {
            debug!("lesson '{}' rejected: {}", lesson.name, e);
            let error = match lesson.expected {
                Expectation::Rejected => None,
                Expectation::Matches(_) => Some(e.to_string()),
            };
            (Expectation::Rejected, error)
        }
    };

    LessonResult {
        lesson: lesson.clone(),
        passed: actual == lesson.expected,
        actual: Some(actual),
        error,
        elapsed: start.elapsed(),
        chapter: chapter.to_string(),
    }
}

fn run_lessons(
    lessons: Vec<Lesson>,
    file_stem: &str,
    chapter: &str,
    filter: Option<&str>,
    progress_tx: Option<&Sender<ProgressEvent>>,
) -> Vec<LessonResult> {
    // A filter matching the file name selects every lesson in it.
    let file_matches = filter.map_or(true, |pat| file_stem.contains(pat));

    let mut results = Vec::new();
    for lesson in lessons {
        if let Some(pat) = filter {
            if !file_matches && !lesson.name.contains(pat) {
                continue;
            }
        }

        if let Some(tx) = progress_tx {
            let _ = tx.send(ProgressEvent::LessonStart {
                chapter: chapter.to_string(),
                file: file_stem.to_string(),
                name: lesson.name.clone(),
            });
        }

        let result = run_lesson(&lesson, chapter);
        if let Some(tx) = progress_tx {
            let _ = tx.send(ProgressEvent::LessonComplete(Box::new(result.clone())));
        }
        results.push(result);
    }
    results
}

pub fn run_lesson_file(
    file_path: &Path,
    chapter: &str,
    filter: Option<&str>,
    progress_tx: Option<&Sender<ProgressEvent>>,
) -> FileResult {
    let lessons = match parse_lesson_file(file_path) {
        Ok(lessons) => lessons,
        Err(e) => {
            return FileResult {
                file_path: file_path.to_path_buf(),
                results: vec![],
                parse_error: Some(e.to_string()),
            };
        }
    };

    let file_stem = file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    FileResult {
        file_path: file_path.to_path_buf(),
        results: run_lessons(lessons, file_stem, chapter, filter, progress_tx),
        parse_error: None,
    }
}

pub fn run_chapter(
    chapter: &Chapter,
    filter: Option<&str>,
    progress_tx: Option<&Sender<ProgressEvent>>,
) -> ChapterResult {
    let start = Instant::now();

    let file_results = chapter
        .lesson_files()
        .iter()
        .map(|file| run_lesson_file(file, &chapter.name, filter, progress_tx))
        .collect();

    ChapterResult {
        chapter: chapter.clone(),
        file_results,
        elapsed: start.elapsed(),
    }
}

pub fn run_from_stdin(
    content: &str,
    filter: Option<&str>,
    progress_tx: Option<&Sender<ProgressEvent>>,
) -> ChapterResult {
    let start = Instant::now();
    let stdin_path = PathBuf::from("<stdin>");
    let chapter = Chapter {
        name: "stdin".to_string(),
        path: PathBuf::from("."),
    };

    let file_result = match parse_lesson_content(content, &stdin_path) {
        Ok(lessons) => FileResult {
            file_path: stdin_path,
            results: run_lessons(lessons, "stdin", "stdin", filter, progress_tx),
            parse_error: None,
        },
        Err(e) => FileResult {
            file_path: stdin_path,
            results: vec![],
            parse_error: Some(e.to_string()),
        },
    };

    ChapterResult {
        chapter,
        file_results: vec![file_result],
        elapsed: start.elapsed(),
    }
}
