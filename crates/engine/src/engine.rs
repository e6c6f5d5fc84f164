//! Engine - construction and lifecycle of the mapping pipeline

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use contracts::{BoxTransform, EngineConfig, Transform};

use crate::combiner::combine;
use crate::dispatcher::dispatch;
use crate::error::EngineError;
use crate::lane::{spawn_lane, Lane, LaneHandle};
use crate::metrics::LaneSnapshot;

/// A constructed, not-yet-running engine
///
/// Owns one transform per lane. [`Engine::start`] consumes the engine, so
/// an instance is single-use and a second start is a compile error.
pub struct Engine<In, Out> {
    transforms: Vec<BoxTransform<In, Out>>,
    capacity: usize,
}

impl<In, Out> Engine<In, Out>
where
    In: Send + 'static,
    Out: Send + 'static,
{
    /// Create an engine from one transform instance per lane
    ///
    /// # Errors
    /// Rejects `parallelism == 0` and a transform list whose length does
    /// not equal `parallelism` (the lane-to-transform mapping must be
    /// one-to-one).
    pub fn new(
        parallelism: usize,
        transforms: Vec<BoxTransform<In, Out>>,
    ) -> Result<Self, EngineError> {
        if parallelism == 0 {
            return Err(EngineError::configuration("parallelism must be at least 1"));
        }
        if transforms.len() != parallelism {
            return Err(EngineError::configuration(format!(
                "expected {parallelism} transforms (one per lane), got {}",
                transforms.len()
            )));
        }
        Ok(Self {
            transforms,
            capacity: parallelism,
        })
    }

    /// Create an engine replicating one transform across all lanes
    ///
    /// Each lane gets its own clone; state is only shared across lanes if
    /// the transform clones a shared handle (e.g. an `Arc`) itself.
    pub fn replicated<T>(parallelism: usize, transform: T) -> Result<Self, EngineError>
    where
        T: Transform<In, Out> + Clone + 'static,
    {
        let transforms = (0..parallelism)
            .map(|_| Box::new(transform.clone()) as BoxTransform<In, Out>)
            .collect();
        Self::new(parallelism, transforms)
    }

    /// Create an engine from a per-lane transform factory
    ///
    /// The factory is invoked once per lane index, allowing
    /// index-dependent configuration.
    ///
    /// # Errors
    /// A factory failure is propagated without retry, naming the lane.
    pub fn from_factory<F, E>(parallelism: usize, mut factory: F) -> Result<Self, EngineError>
    where
        F: FnMut(usize) -> Result<BoxTransform<In, Out>, E>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        if parallelism == 0 {
            return Err(EngineError::configuration("parallelism must be at least 1"));
        }
        let mut transforms = Vec::with_capacity(parallelism);
        for lane in 0..parallelism {
            transforms.push(factory(lane).map_err(|e| EngineError::Factory {
                lane,
                source: e.into(),
            })?);
        }
        Self::new(parallelism, transforms)
    }

    /// Create an engine from a validated [`EngineConfig`]
    ///
    /// Honors `queue_capacity` when set; all other forms use the default
    /// capacity-equals-parallelism model.
    pub fn from_config(
        config: &EngineConfig,
        transforms: Vec<BoxTransform<In, Out>>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let mut engine = Self::new(config.parallelism, transforms)?;
        engine.capacity = config.effective_capacity();
        Ok(engine)
    }

    /// Number of lanes
    pub fn parallelism(&self) -> usize {
        self.transforms.len()
    }

    /// Spawn the dispatcher, lane workers, and combiner
    ///
    /// Starts N+2 tasks on the current tokio runtime.
    #[instrument(name = "engine_start", skip(self), fields(lanes = self.transforms.len()))]
    pub fn start(self) -> RunningEngine<In, Out> {
        let n = self.transforms.len();
        let (input_tx, input_rx) = mpsc::channel(self.capacity);
        let (output_tx, output_rx) = mpsc::channel(self.capacity);

        let mut lane_inputs = Vec::with_capacity(n);
        let mut lane_outputs = Vec::with_capacity(n);
        let mut handles = Vec::with_capacity(n);

        for (index, transform) in self.transforms.into_iter().enumerate() {
            let Lane {
                input,
                output,
                handle,
            } = spawn_lane(index, transform, self.capacity);
            lane_inputs.push(input);
            lane_outputs.push(output);
            handles.push(handle);
        }

        let dispatcher = tokio::spawn(dispatch(input_rx, lane_inputs));
        let combiner = tokio::spawn(combine(lane_outputs, output_tx));

        info!(lanes = n, "Engine started");

        RunningEngine {
            input: input_tx,
            output: output_rx,
            dispatcher,
            combiner,
            lanes: handles,
        }
    }
}

/// A started engine: submission and consumption handles plus task handles
///
/// Output order always equals submission order. The engine cannot be
/// restarted; [`RunningEngine::close`] tears the pipeline down.
pub struct RunningEngine<In, Out> {
    input: mpsc::Sender<In>,
    output: mpsc::Receiver<Out>,
    dispatcher: JoinHandle<()>,
    combiner: JoinHandle<()>,
    lanes: Vec<LaneHandle>,
}

impl<In, Out> RunningEngine<In, Out>
where
    In: Send + 'static,
    Out: Send + 'static,
{
    /// Submit one item, blocking while the global input queue is full
    ///
    /// # Errors
    /// [`EngineError::Closed`] once the dispatcher has stopped (a lane
    /// faulted and the pipeline is winding down).
    pub async fn submit(&self, item: In) -> Result<(), EngineError> {
        self.input.send(item).await.map_err(|_| EngineError::Closed)
    }

    /// Clonable producer handle for driving the pipeline from other tasks
    ///
    /// Every clone must be dropped before [`RunningEngine::close`] can
    /// finish draining: an outstanding sender keeps the input queue open.
    pub fn sender(&self) -> mpsc::Sender<In> {
        self.input.clone()
    }

    /// Receive the next result, strictly in submission order
    ///
    /// Returns `None` once the stream has fully drained after close.
    pub async fn recv(&mut self) -> Option<Out> {
        self.output.recv().await
    }

    /// Per-lane metrics snapshots, indexed by lane
    pub fn metrics(&self) -> Vec<(usize, LaneSnapshot)> {
        self.lanes
            .iter()
            .map(|lane| (lane.index(), lane.metrics().snapshot()))
            .collect()
    }

    /// Close the input, drain the pipeline, and join every task
    ///
    /// Results not yet consumed via [`RunningEngine::recv`] are returned in
    /// submission order, so no submitted item is ever silently dropped.
    ///
    /// # Errors
    /// Surfaces the first lane panic ([`EngineError::LanePanic`]) or a
    /// dispatcher/combiner panic after all tasks have been joined.
    #[instrument(name = "engine_close", skip(self))]
    pub async fn close(self) -> Result<Vec<Out>, EngineError> {
        let Self {
            input,
            mut output,
            dispatcher,
            combiner,
            lanes,
        } = self;

        // Closing the global input starts the drain: the dispatcher
        // forwards what is queued, then propagates closure to the lanes.
        drop(input);

        let mut drained = Vec::new();
        while let Some(result) = output.recv().await {
            drained.push(result);
        }

        dispatcher
            .await
            .map_err(|_| EngineError::StagePanic { stage: "dispatcher" })?;

        let mut fault = None;
        for lane in lanes {
            if let Err(e) = lane.join().await {
                fault.get_or_insert(e);
            }
        }

        combiner
            .await
            .map_err(|_| EngineError::StagePanic { stage: "combiner" })?;

        info!(drained = drained.len(), "Engine closed");

        match fault {
            Some(e) => Err(e),
            None => Ok(drained),
        }
    }
}
