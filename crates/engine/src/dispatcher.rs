//! Dispatcher - round-robin fan-out from the global input to lane queues

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Dispatcher loop
///
/// Reads the global input queue until closed; the k-th item goes to lane
/// `k mod N`, awaiting space in that specific lane queue. Assignment is
/// load-oblivious: a full lane back-pressures the dispatcher and, through
/// the bounded global input queue, the producer. Dropping the lane senders
/// on exit propagates closure to every lane.
#[instrument(name = "dispatcher_run", skip(input, lanes), fields(lanes = lanes.len()))]
pub(crate) async fn dispatch<In>(mut input: mpsc::Receiver<In>, lanes: Vec<mpsc::Sender<In>>)
where
    In: Send + 'static,
{
    let n = lanes.len();
    let mut cursor = 0usize;
    let mut dispatched: u64 = 0;

    info!(lanes = n, "Dispatcher started");

    while let Some(item) = input.recv().await {
        if lanes[cursor].send(item).await.is_err() {
            // The lane worker died; stop accepting so producers observe
            // closure instead of feeding a broken rotation.
            warn!(lane = cursor, "Lane input closed, dispatcher stopping");
            return;
        }

        dispatched += 1;
        cursor = (cursor + 1) % n;

        if dispatched.is_multiple_of(100) {
            debug!(items = dispatched, "Dispatcher progress");
        }
    }

    info!(
        items = dispatched,
        "Input closed, propagating shutdown to lanes"
    );
    // Lane senders drop here, closing every lane input queue.
}
