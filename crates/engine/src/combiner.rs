//! Combiner - round-robin fan-in from lane outputs to the global output
//!
//! The combiner visits lanes in the identical cyclic order used for
//! assignment, so the k-th result it forwards corresponds to the k-th item
//! submitted. Order restoration therefore costs O(1) per item and O(N)
//! state, with no reorder buffer. The price is head-of-line blocking: a
//! slow lane delays results already waiting in later lanes' queues.

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Combiner loop
///
/// Blocks on the cursor lane's output queue; forwards each result to the
/// global output queue, then advances the cursor. Lanes close in lockstep
/// once the upstream input closes and drains, so the first closed lane seen
/// at the cursor marks the end of the stream; any still-buffered results of
/// a faulted lane were already delivered at their turns.
#[instrument(name = "combiner_run", skip(lanes, output), fields(lanes = lanes.len()))]
pub(crate) async fn combine<Out>(mut lanes: Vec<mpsc::Receiver<Out>>, output: mpsc::Sender<Out>)
where
    Out: Send + 'static,
{
    let n = lanes.len();
    let mut cursor = 0usize;
    let mut combined: u64 = 0;

    info!(lanes = n, "Combiner started");

    while let Some(result) = lanes[cursor].recv().await {
        if output.send(result).await.is_err() {
            warn!("Output receiver dropped, combiner stopping");
            return;
        }

        combined += 1;
        cursor = (cursor + 1) % n;

        if combined.is_multiple_of(100) {
            debug!(items = combined, "Combiner progress");
        }
    }

    debug!(lane = cursor, "Lane output closed at rotation cursor");
    info!(items = combined, "Combiner finished, closing output");
    // The global output sender drops here, signalling end-of-stream.
}
