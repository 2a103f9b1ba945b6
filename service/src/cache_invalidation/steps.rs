use cdn_cache::invalidate_cache;

use crate::{
    cache_invalidation::context::CacheContext,
    error::Error,
    pipeline::{PipelineStep, StepAction},
};

/// Creates the invalidation for the configured distribution. Any failure is
/// returned to the caller.
pub struct CreateInvalidationStep;

#[async_trait::async_trait]
impl PipelineStep<CacheContext> for CreateInvalidationStep {
    fn name(&self) -> &'static str {
        "create_invalidation"
    }

    fn should_execute(&self, context: &CacheContext) -> bool {
        context.config.cache.is_some()
    }

    async fn execute(&self, context: &mut CacheContext) -> StepAction {
        let (Some(session), Some(cache)) = (context.session.clone(), context.config.cache.clone())
        else {
            return StepAction::Abort(Error::CacheError(
                "Not connected to cloud".to_string(),
            ));
        };

        match invalidate_cache(session.cdn_ops.as_ref(), &cache).await {
            Ok(invalidation) => {
                context.invalidation = Some(invalidation);
                StepAction::Continue
            }
            Err(e) => {
                tracing::error!("Error creating invalidation: {}", e);
                StepAction::Abort(Error::from(e))
            }
        }
    }
}
