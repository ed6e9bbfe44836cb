use std::fmt;
use std::io;

use tokio::sync::mpsc;

/// Outcome of one fetch job. Failures are delivered as an empty list.
pub(crate) type FetchResult = Vec<i64>;

/// One URL to fetch, tied to the result channel of the merge call that created it.
#[derive(Debug)]
pub(crate) struct Job {
    pub url: String,
    pub results: mpsc::Sender<FetchResult>,
}

impl Job {
    /// Hands the result back to the owning merge call.
    ///
    /// The result channel holds one slot per job, so this only fails when the
    /// merge call has already returned.
    pub(crate) async fn deliver(self, numbers: FetchResult) {
        if self.results.send(numbers).await.is_err() {
            engine_logging::engine_debug!(
                "merge call already finished, dropping late result url={}",
                self.url
            );
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Panicked,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "json decode error"),
            FailureKind::Panicked => write!(f, "fetcher panicked"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("failed to encode merged numbers: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write merged numbers: {0}")]
    Write(#[from] io::Error),
}
