//! Transform trait - per-lane mapping interface
//!
//! Defines the abstract interface for the user-supplied transformation.

use async_trait::async_trait;

/// Per-lane item transformation
///
/// Exactly one instance is owned by each lane worker, which applies it to
/// every item assigned to that lane, strictly in arrival order. The `&mut`
/// receiver gives the instance lane-private state without any locking.
///
/// The engine never inspects or retries a transformation. `apply` is
/// infallible by signature; a panic inside it is treated as a lane fault
/// and surfaced when the engine is closed.
#[async_trait]
pub trait Transform<In, Out>: Send
where
    In: Send + 'static,
    Out: Send + 'static,
{
    /// Transform name (used for logging/metrics)
    fn name(&self) -> &str {
        "transform"
    }

    /// Apply the transformation to one item
    ///
    /// Invoked exactly once per item, by that lane's worker only.
    async fn apply(&mut self, item: In) -> Out;
}

/// Boxed transform object, resolved once at engine construction
pub type BoxTransform<In, Out> = Box<dyn Transform<In, Out>>;

/// Adapter turning a plain closure into a [`Transform`]
#[derive(Clone)]
pub struct FnTransform<F> {
    f: F,
}

/// Wrap a closure as a lane transform
///
/// ```
/// use contracts::{transform_fn, BoxTransform};
///
/// let double: BoxTransform<u64, u64> = Box::new(transform_fn(|x: u64| x * 2));
/// # let _ = double;
/// ```
pub fn transform_fn<F>(f: F) -> FnTransform<F> {
    FnTransform { f }
}

#[async_trait]
impl<In, Out, F> Transform<In, Out> for FnTransform<F>
where
    In: Send + 'static,
    Out: Send + 'static,
    F: FnMut(In) -> Out + Send,
{
    async fn apply(&mut self, item: In) -> Out {
        (self.f)(item)
    }
}
