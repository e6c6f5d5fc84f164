//! Replicated Transform Demo
//!
//! Five lanes share clones of one slow transform (200ms per item). Requests
//! arrive every 20ms; results come back in submission order while the lanes
//! overlap the processing delays.
//!
//! Run with: cargo run --bin replicated [engine.toml]

use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use config_loader::ConfigLoader;
use engine::{Engine, EngineConfig, Transform};
use observability::{LogFormat, ObservabilityConfig};

const REQUEST_COUNT: u64 = 20;

/// Transform simulating a slow request handler
#[derive(Clone)]
struct SlowMapper {
    delay: Duration,
}

#[async_trait]
impl Transform<u64, u64> for SlowMapper {
    fn name(&self) -> &str {
        "slow-mapper"
    }

    async fn apply(&mut self, item: u64) -> u64 {
        tokio::time::sleep(self.delay).await;
        item
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Compact,
        metrics_port: None,
        default_log_level: "info".to_string(),
    })?;

    // ==== Stage 1: Use default config or load from file ====
    let config = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading engine config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        EngineConfig::new(5)
    };

    // ==== Stage 2: Construct and start the engine ====
    let engine = Engine::replicated(
        config.parallelism,
        SlowMapper {
            delay: Duration::from_millis(200),
        },
    )?;
    tracing::info!(lanes = engine.parallelism(), "Engine constructed");

    let mut running = engine.start();

    // ==== Stage 3: Stream requests from a producer task ====
    let sender = running.sender();
    let producer = tokio::spawn(async move {
        for i in 666..666 + REQUEST_COUNT {
            if sender.send(i).await.is_err() {
                break;
            }
            observability::record_item_submitted();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    });

    // ==== Stage 4: Consume ordered results ====
    let start = Instant::now();
    for _ in 0..REQUEST_COUNT {
        if let Some(result) = running.recv().await {
            observability::record_result_delivered();
            tracing::info!(
                result,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Ordered result"
            );
        }
    }
    producer.await?;

    // ==== Stage 5: Report lane metrics and shut down ====
    for (lane, snapshot) in running.metrics() {
        observability::record_lane_processed_total(lane, snapshot.processed_count);
        tracing::info!(lane, processed = snapshot.processed_count, "Lane summary");
    }

    let leftovers = running.close().await?;
    tracing::info!(leftovers = leftovers.len(), "Pipeline closed");

    Ok(())
}
