//! # Integration Tests
//!
//! End-to-end tests for the order-preserving mapping pipeline:
//! - Order preservation under randomized latencies
//! - Throughput over the sequential baseline
//! - Drain-on-close accounting
//! - Configuration validation
//! - Lane isolation and fault surfacing

#[cfg(test)]
mod helpers {
    use async_trait::async_trait;
    use contracts::Transform;
    use tokio::time::{sleep, Duration};

    /// Transform with a fixed per-item delay, cloned across lanes
    #[derive(Clone)]
    pub struct DelayTransform {
        pub delay_ms: u64,
    }

    #[async_trait]
    impl Transform<u64, u64> for DelayTransform {
        fn name(&self) -> &str {
            "delay"
        }

        async fn apply(&mut self, item: u64) -> u64 {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            item
        }
    }

    /// Transform tagging each result with the lane that produced it
    pub struct LaneTagTransform {
        pub lane: usize,
        pub delay_ms: u64,
    }

    #[async_trait]
    impl Transform<u64, (u64, usize)> for LaneTagTransform {
        async fn apply(&mut self, item: u64) -> (u64, usize) {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            (item, self.lane)
        }
    }
}

#[cfg(test)]
mod ordering_tests {
    use crate::helpers::LaneTagTransform;
    use async_trait::async_trait;
    use contracts::{BoxTransform, Transform};
    use engine::Engine;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use tokio::time::{sleep, Duration};

    /// Transform sleeping a seeded-random duration per item
    struct JitterTransform {
        rng: StdRng,
    }

    #[async_trait]
    impl Transform<u64, u64> for JitterTransform {
        async fn apply(&mut self, item: u64) -> u64 {
            let delay = self.rng.random_range(0..25);
            sleep(Duration::from_millis(delay)).await;
            item * 2
        }
    }

    /// Output order equals submission order no matter how per-item
    /// latencies interleave across lanes.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_order_preserved_under_random_latencies() {
        let total = 100u64;
        let engine = Engine::from_factory(5, |lane| {
            Ok::<_, std::convert::Infallible>(Box::new(JitterTransform {
                rng: StdRng::seed_from_u64(99 + lane as u64),
            }) as BoxTransform<u64, u64>)
        })
        .unwrap();

        let mut running = engine.start();
        let sender = running.sender();
        let producer = tokio::spawn(async move {
            for i in 0..total {
                sender.send(i).await.unwrap();
            }
        });

        let mut results = Vec::with_capacity(total as usize);
        for _ in 0..total {
            results.push(running.recv().await.unwrap());
        }
        producer.await.unwrap();

        let expected: Vec<u64> = (0..total).map(|i| i * 2).collect();
        assert_eq!(results, expected);

        assert!(running.close().await.unwrap().is_empty());
    }

    /// Each item is transformed by lane `k mod N`, with lane-private state,
    /// even when one lane is far slower than the other.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lane_isolation_with_distinct_delays() {
        let engine = Engine::from_factory(2, |lane| {
            Ok::<_, std::convert::Infallible>(Box::new(LaneTagTransform {
                lane,
                delay_ms: if lane == 0 { 0 } else { 100 },
            }) as BoxTransform<u64, (u64, usize)>)
        })
        .unwrap();

        let running = engine.start();
        for i in 0..6u64 {
            running.submit(i).await.unwrap();
        }

        let results = running.close().await.unwrap();
        assert_eq!(results.len(), 6);
        for (k, (item, lane)) in results.iter().enumerate() {
            assert_eq!(*item, k as u64);
            assert_eq!(*lane, k % 2, "item {k} processed by wrong lane");
        }
    }
}

#[cfg(test)]
mod throughput_tests {
    use crate::helpers::DelayTransform;
    use engine::Engine;
    use std::time::Instant;
    use tokio::time::{sleep, Duration};

    /// Five items at 50 ms each on five lanes, submitted 10 ms apart, must
    /// finish well under the 250 ms sequential baseline (ideal ~90 ms).
    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_outperforms_sequential() {
        let engine = Engine::replicated(5, DelayTransform { delay_ms: 50 }).unwrap();
        let mut running = engine.start();

        let sender = running.sender();
        let producer = tokio::spawn(async move {
            for i in 0..5u64 {
                sender.send(i).await.unwrap();
                if i < 4 {
                    sleep(Duration::from_millis(10)).await;
                }
            }
        });

        let start = Instant::now();
        for i in 0..5u64 {
            assert_eq!(running.recv().await, Some(i));
        }
        let elapsed = start.elapsed();

        producer.await.unwrap();
        running.close().await.unwrap();

        assert!(
            elapsed < Duration::from_millis(200),
            "parallel strategy ineffective: {elapsed:?} against a sequential 250ms"
        );
    }
}

#[cfg(test)]
mod shutdown_tests {
    use crate::helpers::DelayTransform;
    use engine::{Engine, EngineError};

    /// Submitting k items then closing yields exactly k results, none
    /// missing, none duplicated, in order, even when close precedes
    /// consumption of the tail.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_drop_on_close() {
        let total = 20u64;
        let engine = Engine::replicated(4, DelayTransform { delay_ms: 5 }).unwrap();
        let mut running = engine.start();

        let sender = running.sender();
        let producer = tokio::spawn(async move {
            for i in 0..total {
                sender.send(i).await.unwrap();
            }
        });

        // Consume only part of the stream before closing.
        let mut consumed = Vec::new();
        for _ in 0..7 {
            consumed.push(running.recv().await.unwrap());
        }
        producer.await.unwrap();

        let drained = running.close().await.unwrap();

        let mut all = consumed;
        all.extend(drained);
        assert_eq!(all, (0..total).collect::<Vec<_>>());
    }

    /// After close returns, the pipeline is gone: every task has been
    /// joined and nothing further can be submitted.
    #[tokio::test]
    async fn test_close_terminates_pipeline() {
        let engine = Engine::replicated(3, DelayTransform { delay_ms: 0 }).unwrap();
        let running = engine.start();

        for i in 0..3u64 {
            running.submit(i).await.unwrap();
        }
        let sender = running.sender();
        let closer = tokio::spawn(running.close());
        drop(sender); // outstanding clones would keep the input open

        let drained = closer.await.unwrap().unwrap();
        assert_eq!(drained, vec![0, 1, 2]);
    }

    /// A panicking transform is surfaced as a lane fault on close; results
    /// computed before the fault are still delivered in order.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lane_panic_surfaced_on_close() {
        let engine = Engine::<u64, u64>::from_factory(2, |_lane| {
            Ok::<_, std::convert::Infallible>(Box::new(engine::transform_fn(|x: u64| {
                if x == 3 {
                    panic!("transform fault on item 3");
                }
                x
            })) as engine::BoxTransform<u64, u64>)
        })
        .unwrap();

        let running = engine.start();
        let sender = running.sender();
        for i in 0..6u64 {
            // Later sends may fail once the pipeline starts winding down.
            if sender.send(i).await.is_err() {
                break;
            }
        }
        drop(sender);

        match running.close().await {
            Err(EngineError::LanePanic { lane }) => assert_eq!(lane, 1),
            other => panic!("expected LanePanic, got {:?}", other.map(|v| v.len())),
        }
    }
}

#[cfg(test)]
mod metrics_tests {
    use crate::helpers::DelayTransform;
    use engine::Engine;

    /// Lane snapshots feed the observability recorders without a recorder
    /// installed (no-op) and account for every processed item.
    #[tokio::test]
    async fn test_lane_metrics_recording() {
        let engine = Engine::replicated(2, DelayTransform { delay_ms: 0 }).unwrap();
        let running = engine.start();

        for i in 0..4u64 {
            running.submit(i).await.unwrap();
            observability::record_item_submitted();
        }

        let drained = running.close().await.unwrap();
        for _ in &drained {
            observability::record_result_delivered();
        }
        assert_eq!(drained.len(), 4);
    }
}

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{transform_fn, BoxTransform, EngineConfig};
    use engine::{Engine, EngineError};

    #[tokio::test]
    async fn test_transform_count_mismatch_rejected() {
        let transforms: Vec<BoxTransform<u64, u64>> = vec![Box::new(transform_fn(|x: u64| x))];
        let result = Engine::new(5, transforms);
        assert!(matches!(result, Err(EngineError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_zero_parallelism_rejected() {
        assert!(Engine::<u64, u64>::new(0, Vec::new()).is_err());
    }

    #[tokio::test]
    async fn test_loaded_config_drives_engine() {
        let config = ConfigLoader::load_from_str(
            "parallelism = 3\nqueue_capacity = 6\n",
            ConfigFormat::Toml,
        )
        .unwrap();

        let transforms: Vec<BoxTransform<u64, u64>> = (0..config.parallelism)
            .map(|_| Box::new(transform_fn(|x: u64| x + 1)) as BoxTransform<u64, u64>)
            .collect();

        let running = Engine::from_config(&config, transforms).unwrap().start();
        for i in 0..9u64 {
            running.submit(i).await.unwrap();
        }
        let results = running.close().await.unwrap();
        assert_eq!(results, (1..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_invalid_loaded_config_rejected() {
        let result = ConfigLoader::load_from_str("parallelism = 0\n", ConfigFormat::Toml);
        assert!(result.is_err());

        let config = EngineConfig::new(0);
        assert!(Engine::<u64, u64>::from_config(&config, Vec::new()).is_err());
    }
}
