//! Lane - one worker unit with an isolated queue pair and transform

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use contracts::BoxTransform;

use crate::error::EngineError;
use crate::metrics::LaneMetrics;

/// Channel ends and worker handle of a freshly spawned lane
///
/// The input sender goes to the dispatcher, the output receiver to the
/// combiner; the handle stays with the engine for join/metrics. This split
/// keeps every lane queue single-producer/single-consumer.
pub(crate) struct Lane<In, Out> {
    pub(crate) input: mpsc::Sender<In>,
    pub(crate) output: mpsc::Receiver<Out>,
    pub(crate) handle: LaneHandle,
}

/// Handle to a running lane worker
pub struct LaneHandle {
    /// Lane index in `[0, parallelism)`
    index: usize,
    /// Shared metrics
    metrics: Arc<LaneMetrics>,
    /// Worker task handle
    worker: JoinHandle<()>,
}

impl LaneHandle {
    /// Lane index used for round-robin assignment
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<LaneMetrics> {
        &self.metrics
    }

    /// Wait for the worker to terminate, surfacing a transform panic
    pub(crate) async fn join(self) -> Result<(), EngineError> {
        self.worker.await.map_err(|e| {
            if e.is_panic() {
                EngineError::LanePanic { lane: self.index }
            } else {
                EngineError::StagePanic { stage: "lane" }
            }
        })
    }
}

/// Create the lane's bounded queue pair and spawn its worker task
pub(crate) fn spawn_lane<In, Out>(
    index: usize,
    transform: BoxTransform<In, Out>,
    capacity: usize,
) -> Lane<In, Out>
where
    In: Send + 'static,
    Out: Send + 'static,
{
    let (input_tx, input_rx) = mpsc::channel(capacity);
    let (output_tx, output_rx) = mpsc::channel(capacity);
    let metrics = Arc::new(LaneMetrics::new());

    let worker_metrics = Arc::clone(&metrics);
    let worker = tokio::spawn(async move {
        lane_worker(index, transform, input_rx, output_tx, worker_metrics).await;
    });

    Lane {
        input: input_tx,
        output: output_rx,
        handle: LaneHandle {
            index,
            metrics,
            worker,
        },
    }
}

/// Worker loop: apply the lane transform to each queued item, in order
///
/// Blocks on an empty input queue and on a full output queue; the latter is
/// the sole back-pressure control on a fast lane feeding a slow combiner.
/// Exits once the input queue is closed and drained, closing the output
/// queue by dropping its sender.
#[instrument(name = "lane_worker_loop", skip(transform, rx, tx, metrics), fields(lane = index))]
async fn lane_worker<In, Out>(
    index: usize,
    mut transform: BoxTransform<In, Out>,
    mut rx: mpsc::Receiver<In>,
    tx: mpsc::Sender<Out>,
    metrics: Arc<LaneMetrics>,
) where
    In: Send + 'static,
    Out: Send + 'static,
{
    debug!(lane = index, transform = transform.name(), "Lane worker started");

    while let Some(item) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        let result = transform.apply(item).await;
        metrics.inc_processed_count();

        if tx.send(result).await.is_err() {
            // Combiner is gone; nothing downstream can consume results.
            debug!(lane = index, "Output receiver dropped, lane worker stopping");
            break;
        }
    }

    debug!(lane = index, "Lane worker stopped");
}
