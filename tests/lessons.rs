use regex_playground::discover::discover_chapters;
use regex_playground::runner::run_chapter;
use std::path::Path;

#[test]
fn test_bundled_lessons_pass() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("lessons");
    let chapters = discover_chapters(&root).unwrap();
    assert!(chapters.len() >= 8, "found {} chapters", chapters.len());

    let mut failures = Vec::new();
    let mut total = 0;
    for chapter in &chapters {
        let result = run_chapter(chapter, None, None);
        total += result.total_lessons();
        for file in &result.file_results {
            if let Some(err) = &file.parse_error {
                failures.push(err.clone());
            }
            for lesson in file.results.iter().filter(|r| !r.passed) {
                failures.push(format!(
                    "{}: {} (expected {:?}, got {:?}, error {:?})",
                    lesson.chapter,
                    lesson.lesson.name,
                    lesson.lesson.expected,
                    lesson.actual,
                    lesson.error
                ));
            }
        }
    }

    assert!(failures.is_empty(), "failing lessons:\n{}", failures.join("\n"));
    assert!(total > 40, "only {} lessons ran", total);
}
