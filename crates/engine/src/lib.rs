//! # Engine
//!
//! Order-preserving parallel mapping engine.
//!
//! Responsibilities:
//! - Fan out input items to a fixed pool of lane workers, round robin
//! - Apply one [`Transform`] instance per lane, strictly FIFO within a lane
//! - Fan the results back in using the same rotation, so the output stream
//!   respects submission order with no sequence numbers or reorder buffer
//! - Orderly drain on close: every submitted item reaches the output
//!
//! ## Usage
//!
//! ```ignore
//! use engine::{transform_fn, BoxTransform, Engine};
//!
//! let transforms: Vec<BoxTransform<u64, u64>> = (0..4)
//!     .map(|_| Box::new(transform_fn(|x: u64| x * 2)) as BoxTransform<u64, u64>)
//!     .collect();
//!
//! let running = Engine::new(4, transforms)?.start();
//! running.submit(21).await?;
//! // ... consume via running.recv().await, then running.close().await
//! ```
//!
//! A slow lane stalls delivery of later results until its turn completes
//! (head-of-line blocking); this is the accepted cost of the O(N)-state
//! rotation design.

mod combiner;
mod dispatcher;
pub mod engine;
pub mod error;
pub mod lane;
pub mod metrics;

pub use contracts::{transform_fn, BoxTransform, EngineConfig, FnTransform, Transform};
pub use engine::{Engine, RunningEngine};
pub use error::EngineError;
pub use lane::LaneHandle;
pub use metrics::{LaneMetrics, LaneSnapshot};
