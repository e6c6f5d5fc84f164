//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Ordering Model
//! - Items carry no sequence numbers; global order is implicit from lane rotation
//! - The k-th submitted item (k starting at 0) belongs to lane `k mod parallelism`

mod engine_config;
mod error;
mod transform;

pub use engine_config::EngineConfig;
pub use error::ContractError;
pub use transform::{transform_fn, BoxTransform, FnTransform, Transform};
