use crate::matcher::MatchOptions;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "regex-playground",
    about = "A playground for learning regular expressions, one lesson at a time",
    version
)]
pub struct Cli {
    /// Directory of lessons, or "-" to read lessons from stdin
    #[arg(default_value = "lessons")]
    pub lesson_root: PathBuf,

    /// Only run lessons whose file or lesson name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Record actual matches as the expected matches of failing lessons
    #[arg(short, long)]
    pub update: bool,

    /// List all available lessons
    #[arg(short, long)]
    pub list: bool,

    /// Show each lesson as it completes; repeat for debug logging
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Run chapters sequentially instead of in parallel
    #[arg(short, long)]
    pub sequential: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Try a single pattern instead of running lessons
    #[arg(short = 'e', long = "try", value_name = "PATTERN")]
    pub try_pattern: Option<String>,

    /// Text to match with --try (read from stdin when omitted)
    #[arg(long, requires = "try_pattern")]
    pub input: Option<String>,

    /// Ignore letter case
    #[arg(short = 'i', long, requires = "try_pattern")]
    pub case_insensitive: bool,

    /// Anchor ^ and $ to the whole input instead of each line
    #[arg(long, requires = "try_pattern")]
    pub single_line: bool,

    /// Let . match newlines
    #[arg(long, requires = "try_pattern")]
    pub dot_all: bool,

    /// Ignore whitespace and allow # comments in the pattern
    #[arg(short = 'x', long, requires = "try_pattern")]
    pub extended: bool,

    /// Match the pattern as plain text
    #[arg(long, requires = "try_pattern")]
    pub literal: bool,
}

impl Cli {
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            case_sensitive: !self.case_insensitive,
            multi_line: !self.single_line,
            dot_matches_new_line: self.dot_all,
            ignore_whitespace: self.extended,
            literal: self.literal,
        }
    }
}
