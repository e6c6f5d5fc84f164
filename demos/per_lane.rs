//! Per-Lane State Demo
//!
//! Builds one transform per lane through a factory, each with its own
//! artificial delay (`lane * 5` ms) and a private invocation counter. The
//! output stays in submission order even though the lanes run at different
//! speeds, and each item is tagged with the lane that handled it.
//!
//! Run with: cargo run --bin per_lane [engine.toml]

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use config_loader::ConfigLoader;
use engine::{BoxTransform, Engine, EngineConfig, Transform};
use observability::{LogFormat, ObservabilityConfig};

const REQUEST_COUNT: u64 = 25;

/// Lane-private transform state: delay and a local invocation counter
struct LaneMapper {
    lane: usize,
    delay: Duration,
    invocations: u64,
}

#[async_trait]
impl Transform<u64, String> for LaneMapper {
    fn name(&self) -> &str {
        "lane-mapper"
    }

    async fn apply(&mut self, item: u64) -> String {
        self.invocations += 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        format!("{item} (lane {}, call {})", self.lane, self.invocations)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Compact,
        metrics_port: None,
        default_log_level: "info".to_string(),
    })?;

    let config = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading engine config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        EngineConfig::new(5)
    };

    // One transform per lane, configured by lane index.
    let engine = Engine::from_config(
        &config,
        (0..config.parallelism)
            .map(|lane| {
                Box::new(LaneMapper {
                    lane,
                    delay: Duration::from_millis(lane as u64 * 5),
                    invocations: 0,
                }) as BoxTransform<u64, String>
            })
            .collect(),
    )?;

    let mut running = engine.start();

    let sender = running.sender();
    let producer = tokio::spawn(async move {
        for i in 666..666 + REQUEST_COUNT {
            if sender.send(i).await.is_err() {
                break;
            }
            observability::record_item_submitted();
        }
    });

    for _ in 0..REQUEST_COUNT {
        if let Some(result) = running.recv().await {
            observability::record_result_delivered();
            tracing::info!(%result, "Ordered result");
        }
    }
    producer.await?;

    for (lane, snapshot) in running.metrics() {
        observability::record_lane_processed_total(lane, snapshot.processed_count);
        observability::record_lane_queue_depth(lane, snapshot.queue_len);
        tracing::info!(lane, processed = snapshot.processed_count, "Lane summary");
    }

    let leftovers = running.close().await?;
    tracing::info!(leftovers = leftovers.len(), "Pipeline closed");

    Ok(())
}
