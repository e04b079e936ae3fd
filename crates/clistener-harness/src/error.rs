//! Harness error type.

use std::path::PathBuf;

use clistener_core::{ScanError, StdioError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fixture {path}: {source}")]
    Fixture {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no fixture JSON files found in {0}")]
    NoFixtures(PathBuf),
    #[error("bad argument '{text}': {reason}")]
    BadArgument { text: String, reason: String },
    #[error(transparent)]
    Stdio(#[from] StdioError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("conformance verification failed: {failed} of {total} cases")]
    VerificationFailed { failed: usize, total: usize },
    #[error("log validation failed: {count} error(s) in {path}")]
    InvalidLog { path: PathBuf, count: usize },
}
