use std::io::Write;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use numbers_core::{NumberSet, NumbersPayload};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use crate::types::{FetchResult, Job};
use crate::MergeError;

/// Upper bound applied when a merge call is given no deadline.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

/// Fans `urls` out to the worker queue and collects results until every job
/// has answered or `deadline` passes, then writes the merged payload once.
pub(crate) async fn merge_urls(
    queue: &async_channel::Sender<Job>,
    urls: Vec<String>,
    output: &mut (dyn Write + Send),
    deadline: Option<Instant>,
) -> Result<(), MergeError> {
    let deadline = deadline.unwrap_or_else(|| Instant::now() + DEFAULT_DEADLINE);
    let expected = urls.len();
    if expected == 0 {
        return write_numbers(output, Vec::new());
    }

    // One slot per job: a worker finishing after we stop listening never waits.
    let (results_tx, mut results_rx) = mpsc::channel::<FetchResult>(expected);
    spawn_enqueuer(queue.clone(), urls, results_tx);

    let mut store = NumberSet::new();
    let mut remaining = expected;
    let timer = time::sleep_until(deadline);
    tokio::pin!(timer);

    while remaining > 0 {
        tokio::select! {
            received = results_rx.recv() => match received {
                Some(numbers) => {
                    remaining -= 1;
                    store.insert_batch(numbers);
                }
                None => {
                    engine_warn!(
                        "result channel closed with {} of {} jobs outstanding",
                        remaining,
                        expected
                    );
                    break;
                }
            },
            _ = &mut timer => {
                engine_info!(
                    "merge deadline reached with {} of {} jobs outstanding",
                    remaining,
                    expected
                );
                break;
            }
        }
    }
    drop(results_rx);

    engine_debug!(
        "merge finished received={}/{} distinct={}",
        expected - remaining,
        expected,
        store.len()
    );
    write_numbers(output, store.finalize())
}

fn spawn_enqueuer(
    queue: async_channel::Sender<Job>,
    urls: Vec<String>,
    results: mpsc::Sender<FetchResult>,
) {
    tokio::spawn(async move {
        for url in urls {
            if results.is_closed() {
                engine_debug!("merge call finished before all jobs were queued");
                break;
            }
            let job = Job {
                url,
                results: results.clone(),
            };
            if let Err(async_channel::SendError(job)) = queue.send(job).await {
                engine_warn!("job queue closed, skipping url={}", job.url);
                job.deliver(Vec::new()).await;
            }
        }
    });
}

fn write_numbers(output: &mut (dyn Write + Send), numbers: Vec<i64>) -> Result<(), MergeError> {
    serde_json::to_writer(&mut *output, &NumbersPayload::new(numbers))?;
    output.write_all(b"\n")?;
    output.flush()?;
    Ok(())
}
