
// error types shared by every stage of the run.
// parse-level anomalies (unknown statements, red links, broken tuples) are
// never represented here, they are only counted.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssocError {
    #[error("{0}")]
    Usage(String),

    #[error("invalid exclusion pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("out of memory while allocating {what}")]
    OutOfMemory { what: &'static str },

    #[error("cannot build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl AssocError {

    // usage-class errors are reported to the user directly, everything else
    // goes through the log as a fatal message
    pub fn is_usage(&self) -> bool {
        matches!(self, AssocError::Usage(_) | AssocError::Regex(_))
    }
}

pub type Result<T> = std::result::Result<T, AssocError>;
