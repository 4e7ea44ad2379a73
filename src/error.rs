use crate::matcher::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read lesson file '{path}'")]
    ReadLesson {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse lesson file '{path}' at line {line}: {message}")]
    ParseLesson {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
