//! Numbers engine: worker pool, fetching, and deadline-bounded merging.
mod engine;
mod fetch;
mod merge;
mod types;
mod worker;

pub use engine::{EngineSettings, MergeEngine, Merger};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use merge::DEFAULT_DEADLINE;
pub use types::{FailureKind, FetchError, MergeError};
