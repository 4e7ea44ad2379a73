use crate::discover::Chapter;
use crate::lesson::{Expectation, Lesson};
use crate::matcher::PatternMatcher;
use crate::runner::{ChapterResult, LessonResult, ProgressEvent};
use similar::{ChangeTag, TextDiff};
use std::io::Write;
use std::time::Duration;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub struct Output {
    stdout: StandardStream,
    dot_count: usize,
}

impl Output {
    pub fn new(color: bool) -> Self {
        let color_choice = if color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            stdout: StandardStream::stdout(color_choice),
            dot_count: 0,
        }
    }

    fn set_color(&mut self, color: Color) {
        let _ = self.stdout.set_color(ColorSpec::new().set_fg(Some(color)));
    }

    fn set_bold(&mut self) {
        let _ = self.stdout.set_color(ColorSpec::new().set_bold(true));
    }

    fn set_dim(&mut self) {
        let _ = self.stdout.set_color(ColorSpec::new().set_dimmed(true));
    }

    fn reset(&mut self) {
        let _ = self.stdout.reset();
    }

    pub fn print_progress(&mut self, event: &ProgressEvent, verbose: bool, update_mode: bool) {
        match event {
            ProgressEvent::LessonStart { .. } => {}
            ProgressEvent::LessonComplete(result) => {
                if verbose {
                    self.print_verbose_result(result, update_mode);
                } else {
                    self.print_dot(result, update_mode);
                }
            }
        }
    }

    fn print_dot(&mut self, result: &LessonResult, update_mode: bool) {
        if result.passed {
            self.set_color(Color::Green);
            write!(self.stdout, ".").unwrap();
        } else if update_mode {
            self.set_color(Color::Cyan);
            write!(self.stdout, "U").unwrap();
        } else {
            self.set_color(Color::Red);
            write!(self.stdout, "F").unwrap();
        }
        self.reset();
        let _ = self.stdout.flush();

        self.dot_count += 1;
        if self.dot_count >= 80 {
            writeln!(self.stdout).unwrap();
            self.dot_count = 0;
        }
    }

    fn print_verbose_result(&mut self, result: &LessonResult, update_mode: bool) {
        if result.passed {
            self.set_color(Color::Green);
            write!(self.stdout, "✓").unwrap();
        } else if update_mode {
            self.set_color(Color::Cyan);
            write!(self.stdout, "↺").unwrap();
        } else {
            self.set_color(Color::Red);
            write!(self.stdout, "✗").unwrap();
        }
        self.reset();

        write!(
            self.stdout,
            " {}/{}: {}",
            result.chapter,
            file_stem(&result.lesson),
            result.lesson.name
        )
        .unwrap();

        self.set_dim();
        let count = match &result.actual {
            Some(Expectation::Matches(found)) => format!("{} match(es)", found.len()),
            Some(Expectation::Rejected) => "rejected".to_string(),
            None => "not run".to_string(),
        };
        writeln!(
            self.stdout,
            " {} in {:.2}ms",
            count,
            result.elapsed.as_secs_f64() * 1000.0
        )
        .unwrap();
        self.reset();
    }

    pub fn finish_progress(&mut self) {
        if self.dot_count > 0 {
            writeln!(self.stdout).unwrap();
        }
        writeln!(self.stdout).unwrap();
    }

    pub fn print_results(&mut self, results: &[ChapterResult], elapsed: Duration, update_mode: bool) {
        let mut total_passed = 0;
        let mut total_failed = 0;
        let mut failed_lessons: Vec<&LessonResult> = Vec::new();
        let mut parse_errors: Vec<(&std::path::Path, &str)> = Vec::new();

        let mut sorted_results: Vec<_> = results.iter().collect();
        sorted_results.sort_by(|a, b| a.chapter.name.cmp(&b.chapter.name));

        for chapter_result in &sorted_results {
            for file_result in &chapter_result.file_results {
                if let Some(err) = &file_result.parse_error {
                    parse_errors.push((file_result.file_path.as_path(), err.as_str()));
                }
            }

            let passed = chapter_result.passed_lessons();
            let total = chapter_result.total_lessons();
            total_passed += passed;
            total_failed += total - passed;
            if chapter_result.has_parse_errors() {
                total_failed += 1;
            }

            if chapter_result.passed() {
                self.set_color(Color::Green);
                write!(self.stdout, "✓ {}", chapter_result.chapter.name).unwrap();
            } else if update_mode {
                self.set_color(Color::Cyan);
                write!(self.stdout, "↺ {}", chapter_result.chapter.name).unwrap();
            } else {
                self.set_color(Color::Red);
                write!(self.stdout, "✗ {}", chapter_result.chapter.name).unwrap();
            }
            self.reset();
            writeln!(
                self.stdout,
                ": {}/{} lessons passed in {:.2}s",
                passed,
                total,
                chapter_result.elapsed.as_secs_f64()
            )
            .unwrap();

            failed_lessons.extend(
                chapter_result
                    .file_results
                    .iter()
                    .flat_map(|f| &f.results)
                    .filter(|r| !r.passed),
            );
        }

        if !parse_errors.is_empty() {
            writeln!(self.stdout).unwrap();
            self.set_color(Color::Red);
            self.set_bold();
            writeln!(self.stdout, "Parse Errors:").unwrap();
            self.reset();

            for (path, error) in &parse_errors {
                writeln!(self.stdout).unwrap();
                self.set_color(Color::Red);
                write!(self.stdout, "✗").unwrap();
                self.reset();
                writeln!(self.stdout, " {}", path.display()).unwrap();
                writeln!(self.stdout, "  {}", error).unwrap();
            }
        }

        if !failed_lessons.is_empty() {
            writeln!(self.stdout).unwrap();
            if update_mode {
                self.set_color(Color::Cyan);
                self.set_bold();
                writeln!(self.stdout, "Updated:").unwrap();
            } else {
                self.set_color(Color::Red);
                self.set_bold();
                writeln!(self.stdout, "Failures:").unwrap();
            }
            self.reset();

            for result in failed_lessons {
                self.print_failure(result, update_mode);
            }
        }

        writeln!(self.stdout).unwrap();
        let elapsed_str = format!(" in {:.2}s", elapsed.as_secs_f64());

        if total_failed == 0 {
            self.set_color(Color::Green);
            self.set_bold();
            write!(self.stdout, "All {} lessons passed", total_passed).unwrap();
            self.reset();
            writeln!(self.stdout, "{}", elapsed_str).unwrap();
        } else {
            self.set_bold();
            write!(self.stdout, "Summary:").unwrap();
            self.reset();
            if update_mode {
                writeln!(
                    self.stdout,
                    " {} left unchanged, {} updated{}",
                    total_passed, total_failed, elapsed_str
                )
                .unwrap();
            } else {
                writeln!(
                    self.stdout,
                    " {} passed, {} failed{}",
                    total_passed, total_failed, elapsed_str
                )
                .unwrap();
            }
        }
    }

    fn print_failure(&mut self, result: &LessonResult, update_mode: bool) {
        let lesson = &result.lesson;
        writeln!(self.stdout).unwrap();
        if update_mode {
            self.set_color(Color::Cyan);
            write!(self.stdout, "↺").unwrap();
        } else {
            self.set_color(Color::Red);
            write!(self.stdout, "✗").unwrap();
        }
        self.reset();
        writeln!(
            self.stdout,
            " {}/{}: {}",
            result.chapter,
            file_stem(lesson),
            lesson.name
        )
        .unwrap();

        let display_path = std::env::current_dir()
            .ok()
            .and_then(|cwd| lesson.file_path.strip_prefix(&cwd).ok())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| lesson.file_path.clone());
        writeln!(
            self.stdout,
            "  {}:{}",
            display_path.display(),
            lesson.start_line
        )
        .unwrap();
        writeln!(
            self.stdout,
            "  Pattern: {} ({})",
            lesson.pattern,
            lesson.options.describe()
        )
        .unwrap();

        if let Some(error) = &result.error {
            writeln!(self.stdout, "  Error: {}", error).unwrap();
        }
        if let Some(actual) = &result.actual {
            writeln!(self.stdout).unwrap();
            self.print_diff(&lesson.expected.render(), &actual.render());
        }
    }

    pub fn print_diff(&mut self, expected: &str, actual: &str) {
        let diff = TextDiff::from_lines(expected, actual);

        for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
            if idx > 0 {
                writeln!(self.stdout, "...").unwrap();
            }

            for op in group {
                for change in diff.iter_changes(op) {
                    let (sign, color) = match change.tag() {
                        ChangeTag::Delete => ("-", Color::Red),
                        ChangeTag::Insert => ("+", Color::Green),
                        ChangeTag::Equal => (" ", Color::White),
                    };

                    self.set_color(color);
                    write!(self.stdout, "{}{}", sign, change.value()).unwrap();
                    self.reset();
                    if change.missing_newline() {
                        writeln!(self.stdout).unwrap();
                    }
                }
            }
        }
    }

    pub fn print_list(&mut self, chapters: &[(&Chapter, Vec<Lesson>)]) {
        for (chapter, lessons) in chapters {
            writeln!(self.stdout).unwrap();
            self.set_bold();
            writeln!(self.stdout, "{}", chapter.name).unwrap();
            self.reset();

            let mut files: std::collections::BTreeMap<&std::path::Path, Vec<&Lesson>> =
                std::collections::BTreeMap::new();
            for lesson in lessons {
                files
                    .entry(lesson.file_path.as_path())
                    .or_default()
                    .push(lesson);
            }

            for (path, lessons) in files {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy())
                    .unwrap_or_default();
                writeln!(self.stdout, "  {}: {} lesson(s)", stem, lessons.len()).unwrap();
                for lesson in lessons {
                    write!(self.stdout, "    - {} ", lesson.name).unwrap();
                    self.set_dim();
                    writeln!(self.stdout, "/{}/", lesson.pattern).unwrap();
                    self.reset();
                }
            }
        }
    }

    /// Report the most recent match pass of `matcher`.
    pub fn print_matches(&mut self, matcher: &PatternMatcher) {
        self.set_bold();
        write!(self.stdout, "/{}/", matcher.as_str()).unwrap();
        self.reset();
        self.set_dim();
        writeln!(self.stdout, " ({})", matcher.config().options.describe()).unwrap();
        self.reset();

        let Some(outcome) = matcher.outcome() else {
            writeln!(self.stdout, "no input to match").unwrap();
            return;
        };

        if outcome.matched() {
            self.set_color(Color::Green);
        } else {
            self.set_color(Color::Red);
        }
        writeln!(self.stdout, "{} match(es)", outcome.count()).unwrap();
        self.reset();

        for (i, (text, span)) in outcome
            .substrings()
            .iter()
            .zip(outcome.spans())
            .enumerate()
        {
            self.set_dim();
            write!(self.stdout, "  {:>3} [{}..{}] ", i, span.start, span.end).unwrap();
            self.reset();
            writeln!(self.stdout, "{:?}", text).unwrap();

            for (g, group) in outcome.groups(i).iter().enumerate() {
                self.set_dim();
                write!(self.stdout, "        ${} ", g + 1).unwrap();
                self.reset();
                match group {
                    Some(text) => writeln!(self.stdout, "{:?}", text).unwrap(),
                    None => writeln!(self.stdout, "-").unwrap(),
                }
            }
        }
    }
}

fn file_stem(lesson: &Lesson) -> String {
    lesson
        .file_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
