//! Persistent fetch workers.
//!
//! Every job pulled from the queue produces exactly one delivered result, even
//! when the fetch fails or the fetcher panics.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_trace, engine_warn};
use futures_util::FutureExt;
use tokio::task::JoinHandle;

use crate::types::{FetchResult, Job};
use crate::{FailureKind, FetchError, Fetcher};

pub(crate) fn spawn_worker(
    worker_id: usize,
    jobs: async_channel::Receiver<Job>,
    fetcher: Arc<dyn Fetcher>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        engine_debug!("worker {} waiting for jobs", worker_id);
        // recv keeps yielding buffered jobs after close, so the queue drains before exit.
        while let Ok(job) = jobs.recv().await {
            engine_trace!("worker {} picked up url={}", worker_id, job.url);
            let numbers = run_job(worker_id, fetcher.as_ref(), &job.url).await;
            job.deliver(numbers).await;
        }
        engine_debug!("worker {} exiting, job queue closed", worker_id);
    })
}

async fn run_job(worker_id: usize, fetcher: &dyn Fetcher, url: &str) -> FetchResult {
    let outcome = AssertUnwindSafe(fetcher.fetch(url))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            Err(FetchError::new(
                FailureKind::Panicked,
                panic_message(panic.as_ref()),
            ))
        });

    match outcome {
        Ok(numbers) => {
            engine_debug!(
                "worker {} fetched {} numbers url={}",
                worker_id,
                numbers.len(),
                url
            );
            numbers
        }
        Err(err) => {
            engine_warn!("worker {} fetch failed url={} cause={}", worker_id, url, err);
            Vec::new()
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
