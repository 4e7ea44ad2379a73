use crate::error::{Error, Result};
use crate::matcher::MatchOptions;
use std::ops::Range;
use std::path::{Path, PathBuf};
use winnow::ascii::space0;
use winnow::combinator::{alt, preceded, terminated};
use winnow::prelude::*;
use winnow::token::{any, take_while};

/// What running a lesson should produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// The matched substrings, in scan order.
    Matches(Vec<String>),
    /// The pattern should fail to compile.
    Rejected,
}

impl Expectation {
    /// Render as the body of a lesson's expected section.
    pub fn render(&self) -> String {
        match self {
            Expectation::Matches(found) => found
                .iter()
                .map(|s| quote(s))
                .collect::<Vec<_>>()
                .join("\n"),
            Expectation::Rejected => "error".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lesson {
    pub name: String,
    pub pattern: String,
    pub options: MatchOptions,
    pub input: String,
    pub expected: Expectation,
    pub file_path: PathBuf,
    /// 1-based line of the opening `===`.
    pub start_line: usize,
    /// 0-based line indices of the expected section, up to the next lesson.
    pub expected_lines: Range<usize>,
}

pub fn parse_lesson_file(path: &Path) -> Result<Vec<Lesson>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::ReadLesson {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_lesson_content(&content, path)
}

pub fn parse_lesson_content(content: &str, path: &Path) -> Result<Vec<Lesson>> {
    let fail = |line: usize, message: &str| Error::ParseLesson {
        path: path.to_path_buf(),
        line,
        message: message.to_string(),
    };

    let mut lessons = Vec::new();
    let lines: Vec<&str> = content.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        if !is_header_separator(lines[i]) {
            i += 1;
            continue;
        }

        let start_line = i + 1;
        let header_sep = lines[i];

        i += 1;
        if i >= lines.len() {
            return Err(fail(start_line, "lesson header has no name"));
        }
        let name = lines[i].trim().to_string();

        i += 1;
        if i >= lines.len() || lines[i] != header_sep {
            return Err(fail(i + 1, "expected closing header separator"));
        }

        i += 1;
        if i >= lines.len() || is_dash_separator(lines[i]) {
            return Err(fail(i + 1, "lesson has no pattern"));
        }
        let pattern = lines[i].to_string();
        i += 1;

        let mut options = MatchOptions::default();
        while i < lines.len() && lines[i].starts_with('%') {
            apply_option(lines[i], &mut options)
                .map_err(|message| fail(i + 1, message.as_str()))?;
            i += 1;
        }

        if i >= lines.len() || !is_dash_separator(lines[i]) {
            return Err(fail(i + 1, "expected '---' after the pattern"));
        }
        i += 1;

        let mut input_lines = Vec::new();
        while i < lines.len() && !is_dash_separator(lines[i]) {
            input_lines.push(lines[i]);
            i += 1;
        }
        if i >= lines.len() {
            return Err(fail(start_line, "missing '---' before the expected matches"));
        }
        while input_lines
            .last()
            .map(|s| s.trim().is_empty())
            .unwrap_or(false)
        {
            input_lines.pop();
        }
        let input = input_lines.join("\n");

        i += 1;
        let expected_start = i;
        let mut found = Vec::new();
        let mut rejected = false;
        while i < lines.len() && !is_header_separator(lines[i]) {
            let line = lines[i].trim();
            if !line.is_empty() {
                match expected_entry.parse(line) {
                    Ok(Entry::Match(s)) => found.push(s),
                    Ok(Entry::Rejected) => rejected = true,
                    Err(_) => {
                        let message =
                            format!("expected a quoted match or 'error', found '{}'", line);
                        return Err(fail(i + 1, message.as_str()));
                    }
                }
            }
            i += 1;
        }

        let expected = match (rejected, found.is_empty()) {
            (true, true) => Expectation::Rejected,
            (true, false) => {
                return Err(fail(
                    expected_start + 1,
                    "'error' cannot be combined with expected matches",
                ));
            }
            (false, _) => Expectation::Matches(found),
        };

        lessons.push(Lesson {
            name,
            pattern,
            options,
            input,
            expected,
            file_path: path.to_path_buf(),
            start_line,
            expected_lines: expected_start..i,
        });
    }

    Ok(lessons)
}

fn apply_option(line: &str, options: &mut MatchOptions) -> std::result::Result<(), String> {
    let name = option_directive
        .parse(line)
        .map_err(|_| format!("malformed option line '{}'", line))?;

    match name {
        "case-insensitive" => options.case_sensitive = false,
        "single-line" => options.multi_line = false,
        "dot-all" => options.dot_matches_new_line = true,
        "verbose" => options.ignore_whitespace = true,
        "literal" => options.literal = true,
        _ => return Err(format!("unknown option '{}'", name)),
    }
    Ok(())
}

#[derive(Debug, Clone)]
enum Entry {
    Match(String),
    Rejected,
}

fn option_directive<'a>(input: &mut &'a str) -> PResult<&'a str> {
    terminated(
        preceded(
            ('%', space0),
            take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-'),
        ),
        space0,
    )
    .parse_next(input)
}

fn expected_entry(input: &mut &str) -> PResult<Entry> {
    alt((quoted.map(Entry::Match), "error".value(Entry::Rejected))).parse_next(input)
}

fn quoted(input: &mut &str) -> PResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let c = any.parse_next(input)?;
        if c == '"' {
            break;
        }
        if c == '\\' {
            let escaped = any.parse_next(input)?;
            match escaped {
                'n' => s.push('\n'),
                't' => s.push('\t'),
                'r' => s.push('\r'),
                '"' => s.push('"'),
                '\\' => s.push('\\'),
                _ => {
                    s.push('\\');
                    s.push(escaped);
                }
            }
        } else {
            s.push(c);
        }
    }
    Ok(s)
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

pub(crate) fn is_header_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '=')
}

pub(crate) fn is_dash_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}
