//! A thin wrapper around [`regex::Regex`] for trying patterns out.
//!
//! A [`PatternMatcher`] is configured once, through a builder callback,
//! and can then be asked repeatedly whether (and how often) its pattern
//! matches the configured input or any other text.
//!
//! # Example
//!
//! ```
//! use regex_playground::PatternMatcher;
//!
//! let mut matcher = PatternMatcher::new(|b| {
//!     b.pattern("run").input("run forest run");
//! })
//! .unwrap();
//!
//! assert!(matcher.matches());
//! assert_eq!(matcher.match_input(), (true, 2));
//! assert_eq!(matcher.results().unwrap(), ["run", "run"]);
//! ```

use log::warn;
use regex::{Regex, RegexBuilder};
use std::ops::Range;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no pattern was given to the builder")]
    MissingPattern,
    #[error("failed to compile pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Flags handed to the engine when the pattern is compiled.
///
/// The defaults are case-sensitive with `^` and `$` anchored to line
/// boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    pub case_sensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
    pub ignore_whitespace: bool,
    /// Treat the whole pattern as literal text.
    pub literal: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            multi_line: true,
            dot_matches_new_line: false,
            ignore_whitespace: false,
            literal: false,
        }
    }
}

impl MatchOptions {
    /// Short human readable description, e.g. `multi-line, case-insensitive`.
    pub fn describe(&self) -> String {
        let mut parts = vec![if self.multi_line {
            "multi-line"
        } else {
            "single-line"
        }];
        if !self.case_sensitive {
            parts.push("case-insensitive");
        }
        if self.dot_matches_new_line {
            parts.push("dot-all");
        }
        if self.ignore_whitespace {
            parts.push("verbose");
        }
        if self.literal {
            parts.push("literal");
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchConfiguration {
    pub pattern: Option<String>,
    pub input: Option<String>,
    pub options: MatchOptions,
}

/// Mutable builder handed to [`PatternMatcher::new`].
#[derive(Debug, Clone, Default)]
pub struct MatcherBuilder {
    config: MatchConfiguration,
}

impl MatcherBuilder {
    pub fn new(pattern: impl Into<String>) -> Self {
        let mut builder = Self::default();
        builder.pattern(pattern);
        builder
    }

    pub fn pattern(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.config.pattern = Some(pattern.into());
        self
    }

    pub fn input(&mut self, input: impl Into<String>) -> &mut Self {
        self.config.input = Some(input.into());
        self
    }

    pub fn options(&mut self, options: MatchOptions) -> &mut Self {
        self.config.options = options;
        self
    }

    pub fn case_sensitive(&mut self, yes: bool) -> &mut Self {
        self.config.options.case_sensitive = yes;
        self
    }

    pub fn multi_line(&mut self, yes: bool) -> &mut Self {
        self.config.options.multi_line = yes;
        self
    }

    pub fn dot_matches_new_line(&mut self, yes: bool) -> &mut Self {
        self.config.options.dot_matches_new_line = yes;
        self
    }

    pub fn ignore_whitespace(&mut self, yes: bool) -> &mut Self {
        self.config.options.ignore_whitespace = yes;
        self
    }

    pub fn literal(&mut self, yes: bool) -> &mut Self {
        self.config.options.literal = yes;
        self
    }

    pub fn build(&self) -> Result<PatternMatcher, ConfigError> {
        PatternMatcher::from_config(self.config.clone())
    }
}

/// What a single match pass found, in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    substrings: Vec<String>,
    spans: Vec<Range<usize>>,
    groups: Vec<Vec<Option<String>>>,
}

impl MatchOutcome {
    pub fn matched(&self) -> bool {
        !self.substrings.is_empty()
    }

    pub fn count(&self) -> usize {
        self.substrings.len()
    }

    pub fn substrings(&self) -> &[String] {
        &self.substrings
    }

    /// Byte ranges of each match within the scanned text.
    pub fn spans(&self) -> &[Range<usize>] {
        &self.spans
    }

    /// Capture groups 1.. of the `index`th match. Groups that did not
    /// participate are `None`.
    pub fn groups(&self, index: usize) -> &[Option<String>] {
        self.groups.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone)]
pub struct PatternMatcher {
    config: MatchConfiguration,
    regex: Regex,
    outcome: Option<MatchOutcome>,
}

impl PatternMatcher {
    pub fn new<F>(configure: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&mut MatcherBuilder),
    {
        let mut builder = MatcherBuilder::default();
        configure(&mut builder);
        builder.build()
    }

    pub fn from_config(config: MatchConfiguration) -> Result<Self, ConfigError> {
        let Some(pattern) = config.pattern.as_deref() else {
            return Err(ConfigError::MissingPattern);
        };
        let regex = compile(pattern, &config.options)?;
        Ok(Self {
            config,
            regex,
            outcome: None,
        })
    }

    pub fn config(&self) -> &MatchConfiguration {
        &self.config
    }

    /// The pattern as handed to the engine (escaped when `literal` is set).
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns true if the configured input contains at least one match.
    ///
    /// Without a configured input this logs a warning and returns false.
    pub fn matches(&mut self) -> bool {
        self.match_input().0
    }

    /// Like [`matches`](Self::matches) but against `text`. The configured
    /// input is left alone.
    pub fn matches_text(&mut self, text: &str) -> bool {
        self.scan(text).matched()
    }

    /// Returns whether the configured input matched and how many
    /// non-overlapping matches were found.
    pub fn match_input(&mut self) -> (bool, usize) {
        let Some(input) = self.config.input.take() else {
            warn!(
                "pattern '{}': input should be provided with the builder",
                self.regex.as_str()
            );
            self.outcome = None;
            return (false, 0);
        };
        let outcome = self.scan(&input);
        let result = (outcome.matched(), outcome.count());
        self.config.input = Some(input);
        result
    }

    pub fn match_text(&mut self, text: &str) -> (bool, usize) {
        let outcome = self.scan(text);
        (outcome.matched(), outcome.count())
    }

    /// Matched substrings of the most recent match pass.
    pub fn results(&self) -> Option<&[String]> {
        self.outcome.as_ref().map(|o| o.substrings())
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    fn scan(&mut self, text: &str) -> &MatchOutcome {
        let mut outcome = MatchOutcome::default();
        for caps in self.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            outcome.substrings.push(whole.as_str().to_string());
            outcome.spans.push(whole.range());
            outcome.groups.push(
                caps.iter()
                    .skip(1)
                    .map(|g| g.map(|m| m.as_str().to_string()))
                    .collect(),
            );
        }
        self.outcome.insert(outcome)
    }
}

fn compile(pattern: &str, options: &MatchOptions) -> Result<Regex, ConfigError> {
    let source = if options.literal {
        regex::escape(pattern)
    } else {
        pattern.to_string()
    };

    RegexBuilder::new(&source)
        .case_insensitive(!options.case_sensitive)
        .multi_line(options.multi_line)
        .dot_matches_new_line(options.dot_matches_new_line)
        .ignore_whitespace(options.ignore_whitespace)
        .build()
        .map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(pattern: &str, input: &str) -> PatternMatcher {
        PatternMatcher::new(|b| {
            b.pattern(pattern).input(input);
        })
        .unwrap()
    }

    #[test]
    fn test_simple_match() {
        let mut m = matcher("run", "run forest run");
        assert!(m.matches());
        assert_eq!(m.match_input(), (true, 2));
        assert_eq!(m.results().unwrap(), ["run", "run"]);
    }

    #[test]
    fn test_case_sensitive_by_default() {
        let mut m = matcher("The", "The fat cat sat on the mat.");
        assert_eq!(m.match_input(), (true, 1));
    }

    #[test]
    fn test_case_insensitive() {
        let mut m = PatternMatcher::new(|b| {
            b.pattern("The")
                .input("The fat cat sat on the mat.")
                .case_sensitive(false);
        })
        .unwrap();
        assert_eq!(m.match_input(), (true, 2));
        assert_eq!(m.results().unwrap(), ["The", "the"]);
    }

    #[test]
    fn test_negated_character_class() {
        let mut m = matcher("[^t]ies", "All cities are filled with puppies.");
        assert_eq!(m.match_input(), (true, 1));
        assert_eq!(m.results().unwrap(), ["pies"]);
    }

    #[test]
    fn test_bounded_quantifier() {
        let mut m = matcher("[a-z]{1,3}", "Run forest run");
        assert_eq!(m.match_input(), (true, 4));
        assert_eq!(m.results().unwrap(), ["un", "for", "est", "run"]);
    }

    #[test]
    fn test_count_equals_results_len() {
        let cases = [
            (".ies", "All cities are filled with puppies"),
            (r"\s*[a-z]\s*", "Run forest run."),
            ("(f|c|s|m).t", "The fat cat sat on the mat."),
            ("dog", "The fat cat sat on the mat."),
        ];
        for (pattern, input) in cases {
            let mut m = matcher(pattern, input);
            let (_, count) = m.match_input();
            assert_eq!(count, m.results().unwrap().len(), "pattern {}", pattern);
        }
    }

    #[test]
    fn test_matches_text_agrees_with_match_text() {
        let mut m = matcher("[Rr]un", "unused");
        for text in ["Run forest run", "walk", "", "rerun"] {
            let (_, count) = m.match_text(text);
            assert_eq!(m.matches_text(text), count > 0, "text {:?}", text);
        }
    }

    #[test]
    fn test_match_is_idempotent() {
        let mut m = matcher("[a-z]{3}", "Run forest run");
        let first = m.match_input();
        let second = m.match_input();
        assert_eq!(first, (true, 3));
        assert_eq!(first, second);
    }

    #[test]
    fn test_match_text_leaves_config_alone() {
        let mut m = matcher("run", "run forest run");
        assert_eq!(m.match_text("nothing here"), (false, 0));
        assert_eq!(m.config().input.as_deref(), Some("run forest run"));
        assert_eq!(m.match_input(), (true, 2));
    }

    #[test]
    fn test_results_follow_latest_pass() {
        let mut m = matcher("run", "run forest run");
        assert!(m.results().is_none());
        m.match_input();
        assert_eq!(m.results().unwrap().len(), 2);
        assert!(!m.matches_text("walk"));
        assert!(m.results().unwrap().is_empty());
    }

    #[test]
    fn test_missing_input_is_soft() {
        let mut m = PatternMatcher::new(|b| {
            b.pattern("run");
        })
        .unwrap();
        assert!(!m.matches());
        assert_eq!(m.match_input(), (false, 0));
        assert!(m.results().is_none());
        assert!(m.matches_text("run"));
    }

    #[test]
    fn test_missing_pattern() {
        let result = PatternMatcher::new(|b| {
            b.input("run forest run");
        });
        assert!(matches!(result, Err(ConfigError::MissingPattern)));
    }

    #[test]
    fn test_malformed_pattern() {
        let result = PatternMatcher::new(|b| {
            b.pattern("[a-z").input("abc");
        });
        match result {
            Err(ConfigError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "[a-z"),
            other => panic!("expected InvalidPattern, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_line_anchors_by_default() {
        let input = "The fat cat\nsat on the mat.\nthe end";
        let mut m = matcher("^(T|t)he", input);
        assert_eq!(m.results(), None);
        assert_eq!(m.match_input(), (true, 2));

        let mut single = MatcherBuilder::new("^(T|t)he")
            .input(input)
            .multi_line(false)
            .build()
            .unwrap();
        assert_eq!(single.match_input(), (true, 1));
    }

    #[test]
    fn test_dot_matches_new_line() {
        let input = "The fat\ncat sat on the mat.";
        let mut m = matcher("fat.*mat", input);
        assert!(!m.matches());

        let mut dot_all = MatcherBuilder::new("fat.*mat")
            .input(input)
            .dot_matches_new_line(true)
            .build()
            .unwrap();
        assert_eq!(dot_all.match_input(), (true, 1));
        assert_eq!(dot_all.results().unwrap(), ["fat\ncat sat on the mat"]);
    }

    #[test]
    fn test_literal_option_escapes_pattern() {
        let mut m = MatcherBuilder::new("c.t")
            .input("cat c.t")
            .literal(true)
            .build()
            .unwrap();
        assert_eq!(m.as_str(), r"c\.t");
        assert_eq!(m.results(), None);
        assert_eq!(m.match_input(), (true, 1));
        assert_eq!(m.results().unwrap(), ["c.t"]);
    }

    #[test]
    fn test_ignore_whitespace() {
        let mut m = MatcherBuilder::new("(f|c|s|m) a t")
            .input("The fat cat sat on the mat.")
            .ignore_whitespace(true)
            .build()
            .unwrap();
        assert_eq!(m.match_input(), (true, 4));
    }

    #[test]
    fn test_outcome_spans_and_groups() {
        let mut m = matcher("(f|c)(at)?", "fat c");
        m.match_input();
        let outcome = m.outcome().unwrap();
        assert_eq!(outcome.spans(), [0..3, 4..5]);
        assert_eq!(
            outcome.groups(0),
            [Some("f".to_string()), Some("at".to_string())]
        );
        assert_eq!(outcome.groups(1), [Some("c".to_string()), None]);
        assert!(outcome.groups(2).is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = MatchConfiguration {
            pattern: Some("run".to_string()),
            input: Some("Run forest run".to_string()),
            options: MatchOptions {
                case_sensitive: false,
                ..MatchOptions::default()
            },
        };
        let mut m = PatternMatcher::from_config(config).unwrap();
        assert_eq!(m.match_input(), (true, 2));
    }

    #[test]
    fn test_describe_options() {
        assert_eq!(MatchOptions::default().describe(), "multi-line");
        let options = MatchOptions {
            case_sensitive: false,
            multi_line: false,
            literal: true,
            ..MatchOptions::default()
        };
        assert_eq!(options.describe(), "single-line, case-insensitive, literal");
    }
}
