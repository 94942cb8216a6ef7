use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::error::ExecutorError;

use super::traits::WorkUnit;

/// Run every unit through a pool of at most `max_concurrency` workers.
///
/// Units are dispatched in input order into a shared queue. Each worker pulls
/// one unit at a time, processes it and hands it to the completion queue,
/// which is drained here: `finalize` is called on each unit as it arrives.
/// The returned list is in completion order. A unit's failure never stops
/// its siblings; the batch always runs to the end.
pub async fn run_bounded<T>(units: Vec<T>, max_concurrency: usize) -> Result<Vec<T>, ExecutorError>
where
    T: WorkUnit,
{
    if max_concurrency < 1 {
        return Err(ExecutorError::InvalidConcurrency(max_concurrency));
    }

    let total = units.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    // Extra workers beyond the batch size would only idle.
    let workers = max_concurrency.min(total);
    tracing::debug!(units = total, workers, "dispatching batch");

    let (work_tx, work_rx) = mpsc::channel::<T>(1);
    let work_rx = Arc::new(Mutex::new(work_rx));
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<T>();

    let dispatch = tokio::spawn(async move {
        for unit in units {
            if work_tx.send(unit).await.is_err() {
                tracing::warn!("work queue closed before dispatch finished");
                break;
            }
        }
    });

    let mut pool = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let work_rx = Arc::clone(&work_rx);
        let done_tx = done_tx.clone();

        pool.push(tokio::spawn(async move {
            loop {
                let next = work_rx.lock().await.recv().await;
                let Some(mut unit) = next else {
                    break;
                };
                unit.process().await;
                if done_tx.send(unit).is_err() {
                    break;
                }
            }
            tracing::trace!(worker_id, "worker drained");
        }));
    }

    // Workers own the queue ends from here on: the work queue closes when the
    // last worker exits, so dispatch cannot block behind a dead pool, and the
    // completion queue closes the same way.
    drop(work_rx);
    drop(done_tx);

    let mut finished = Vec::with_capacity(total);
    while let Some(mut unit) = done_rx.recv().await {
        unit.finalize();
        finished.push(unit);
    }

    dispatch
        .await
        .map_err(|e| ExecutorError::Worker(format!("dispatch: {e}")))?;
    for res in futures::future::join_all(pool).await {
        res.map_err(|e| ExecutorError::Worker(e.to_string()))?;
    }

    Ok(finished)
}
