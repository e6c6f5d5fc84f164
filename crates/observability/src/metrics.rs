//! Pipeline metrics recording
//!
//! Counter/gauge helpers for the submit/dispatch/combine path. Recording is
//! a no-op until a metrics recorder is installed (see [`crate::init`]).

use metrics::{counter, gauge};

/// Record one item accepted onto the global input queue
pub fn record_item_submitted() {
    counter!("parlane_items_submitted_total").increment(1);
}

/// Record one ordered result delivered from the global output queue
pub fn record_result_delivered() {
    counter!("parlane_results_delivered_total").increment(1);
}

/// Record a lane's input queue depth
pub fn record_lane_queue_depth(lane: usize, depth: usize) {
    gauge!("parlane_lane_queue_depth", "lane" => lane.to_string()).set(depth as f64);
}

/// Record a lane's lifetime processed-item count
pub fn record_lane_processed_total(lane: usize, total: u64) {
    gauge!("parlane_lane_processed_total", "lane" => lane.to_string()).set(total as f64);
}
