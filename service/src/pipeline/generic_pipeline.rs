use super::pipeline_step::{PipelineStep, StepAction};
use crate::error::Error;

/// Runs a fixed list of steps in order over a shared context.
///
/// # Example
///
/// ```ignore
/// struct PrintStep;
///
/// #[async_trait::async_trait]
/// impl PipelineStep<Vec<String>> for PrintStep {
///     fn name(&self) -> &'static str { "print" }
///     async fn execute(&self, context: &mut Vec<String>) -> StepAction {
///         context.push("printed".to_string());
///         StepAction::Continue
///     }
/// }
///
/// let pipeline = Pipeline::with_steps(vec![Box::new(PrintStep)]);
/// let mut context = Vec::new();
/// pipeline.execute(&mut context).await?;
/// ```
pub struct Pipeline<T> {
    pub steps: Vec<Box<dyn PipelineStep<T>>>,
}

impl<T> Pipeline<T> {
    pub fn with_steps(steps: Vec<Box<dyn PipelineStep<T>>>) -> Self {
        Self { steps }
    }

    /// Names of the steps in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Execute the steps one after another.
    ///
    /// A step whose `should_execute` returns false is passed over. Execution
    /// ends after the last step, at the first `Skip` (returning `Ok`), or at the
    /// first `Abort` (returning its error).
    pub async fn execute(&self, context: &mut T) -> Result<(), Error> {
        for step in &self.steps {
            if !step.should_execute(context) {
                tracing::info!("Step {} will be skipped based on context", step.name());
                continue;
            }

            tracing::info!("Executing step: {}", step.name());

            match step.execute(context).await {
                StepAction::Continue => {}
                StepAction::Skip => {
                    tracing::info!("Step {} requested skip - stopping pipeline", step.name());
                    return Ok(());
                }
                StepAction::Abort(error) => {
                    tracing::error!("Step {} aborted the pipeline: {}", step.name(), error);
                    return Err(error);
                }
            }
        }

        Ok(())
    }
}
