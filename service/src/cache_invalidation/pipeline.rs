use crate::{
    cache_invalidation::{context::CacheContext, steps::CreateInvalidationStep},
    pipeline::{ConnectToCloudStep, Pipeline},
};

impl Default for Pipeline<CacheContext> {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline<CacheContext> {
    pub fn new() -> Self {
        Self::with_steps(vec![
            Box::new(ConnectToCloudStep::<CacheContext>::new()),
            Box::new(CreateInvalidationStep),
        ])
    }
}
