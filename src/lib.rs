pub mod cli;
pub mod discover;
pub mod error;
pub mod lesson;
pub mod logger;
pub mod matcher;
pub mod output;
pub mod runner;
pub mod update;

pub use error::{Error, Result};
pub use lesson::{parse_lesson_content, parse_lesson_file, Expectation, Lesson};
pub use matcher::{
    ConfigError, MatchConfiguration, MatchOptions, MatchOutcome, MatcherBuilder, PatternMatcher,
};
