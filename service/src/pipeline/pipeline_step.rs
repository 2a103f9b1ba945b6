use crate::error::Error;

/// What the pipeline does after a step returns.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    /// Run the next step
    Continue,
    /// Stop here without an error
    Skip,
    /// Stop here and return the error to the caller
    Abort(Error),
}

/// One phase of a deploy or cache pipeline.
///
/// Steps share state through the mutable context `T`: the configuration and
/// client handles they read, and the results they leave for later steps and
/// for the final report.
///
/// Only failures that must stop everything after them should be returned as
/// `Abort`. A step whose failure the rest of the run can tolerate records it
/// in the context and returns `Continue`.
#[async_trait::async_trait]
pub trait PipelineStep<T>: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the step applies to this run. Checked right before the step
    /// would run, so it sees what earlier steps left in the context.
    fn should_execute(&self, _context: &T) -> bool {
        true
    }

    async fn execute(&self, context: &mut T) -> StepAction;
}
