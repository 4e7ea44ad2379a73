use crate::lesson::is_header_separator;
use crate::runner::LessonResult;
use std::path::Path;

/// Rewrite the expected section of every failed lesson in `file_path`
/// with what the engine actually produced.
pub fn update_lesson_file(file_path: &Path, results: &[&LessonResult]) -> std::io::Result<()> {
    let content = std::fs::read_to_string(file_path)?;
    let lines: Vec<&str> = content.lines().collect();

    let mut pending: Vec<(&LessonResult, String)> = results
        .iter()
        .filter(|r| !r.passed)
        .filter_map(|r| r.actual.as_ref().map(|actual| (*r, actual.render())))
        .collect();
    pending.sort_by_key(|(r, _)| r.lesson.expected_lines.start);

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut pos = 0;
    for (result, rendered) in &pending {
        let range = &result.lesson.expected_lines;
        if range.start < pos || range.end > lines.len() {
            continue;
        }

        out.extend(&lines[pos..range.start]);
        out.extend(rendered.lines());
        if range.end < lines.len() && is_header_separator(lines[range.end]) {
            out.push("");
        }
        pos = range.end;
    }
    out.extend(&lines[pos..]);

    std::fs::write(file_path, out.join("\n") + "\n")
}
