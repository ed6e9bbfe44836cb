use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use engine_logging::{engine_info, engine_warn};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::merge::merge_urls;
use crate::types::Job;
use crate::worker::spawn_worker;
use crate::{FetchError, MergeError};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub workers: usize,
    pub fetch: FetchSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            workers: 32,
            fetch: FetchSettings::default(),
        }
    }
}

/// Merges the number lists published at a set of URLs.
#[async_trait::async_trait]
pub trait Merger: Send + Sync {
    /// Writes `{"numbers":[...]}` to `output` exactly once, holding every distinct
    /// value received before `deadline` (five seconds from now when `None`).
    async fn merge(
        &self,
        urls: Vec<String>,
        output: &mut (dyn Write + Send),
        deadline: Option<Instant>,
    ) -> Result<(), MergeError>;
}

/// Owns the shared job queue and the fetch workers pulling from it.
///
/// Must be created inside a tokio runtime. Workers live until `shutdown` is
/// called or the engine is dropped.
pub struct MergeEngine {
    jobs: async_channel::Sender<Job>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
}

impl MergeEngine {
    pub fn start(settings: EngineSettings) -> Result<Self, FetchError> {
        let fetcher = ReqwestFetcher::new(settings.fetch)?;
        Ok(Self::with_fetcher(settings.workers, Arc::new(fetcher)))
    }

    pub fn with_fetcher(workers: usize, fetcher: Arc<dyn Fetcher>) -> Self {
        let worker_count = workers.max(1);
        let (jobs_tx, jobs_rx) = async_channel::bounded(worker_count);
        let handles = (0..worker_count)
            .map(|worker_id| spawn_worker(worker_id, jobs_rx.clone(), fetcher.clone()))
            .collect();
        engine_info!("merge engine started with {} workers", worker_count);

        Self {
            jobs: jobs_tx,
            workers: Mutex::new(handles),
            worker_count,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn is_closed(&self) -> bool {
        self.jobs.is_closed()
    }

    /// Closes the job queue and waits for every worker to drain it and exit.
    pub async fn shutdown(&self) {
        if self.jobs.close() {
            engine_info!("job queue closed, waiting for workers to drain");
        }
        let handles = std::mem::take(
            &mut *self
                .workers
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for (worker_id, handle) in handles.into_iter().enumerate() {
            if let Err(err) = handle.await {
                engine_warn!("worker {} task failed: {}", worker_id, err);
            }
        }
    }
}

#[async_trait::async_trait]
impl Merger for MergeEngine {
    async fn merge(
        &self,
        urls: Vec<String>,
        output: &mut (dyn Write + Send),
        deadline: Option<Instant>,
    ) -> Result<(), MergeError> {
        merge_urls(&self.jobs, urls, output, deadline).await
    }
}
