use async_trait::async_trait;

/// A unit of work driven by the bounded scheduler.
///
/// The scheduler only knows these three operations, so any batch of uniform
/// tasks can be driven by it. Outcomes are captured on the unit itself;
/// `process` never fails from the scheduler's point of view.
#[async_trait]
pub trait WorkUnit: Send + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Do the work and keep the outcome.
    async fn process(&mut self);

    /// Called by the collecting stage once the unit left its worker.
    fn finalize(&mut self) {}

    /// Captured failure, if any.
    fn error(&self) -> Option<&Self::Error>;

    /// Give up the captured failure.
    fn into_error(self) -> Option<Self::Error>
    where
        Self: Sized;
}
