use crate::{
    deploy::{
        context::DeployContext,
        steps::{
            BuildProjectStep, DeleteRemoteObjectsStep, InvalidateCacheStep,
            PrepareUploadManifestStep, UploadManifestStep,
        },
    },
    pipeline::{ConnectToCloudStep, Pipeline},
};

impl Pipeline<DeployContext> {
    pub fn new() -> Self {
        Self::with_steps(vec![
            Box::new(ConnectToCloudStep::<DeployContext>::new()),
            Box::new(BuildProjectStep),
            Box::new(PrepareUploadManifestStep),
            Box::new(DeleteRemoteObjectsStep),
            Box::new(UploadManifestStep),
            Box::new(InvalidateCacheStep),
        ])
    }
}

impl Default for Pipeline<DeployContext> {
    fn default() -> Self {
        Self::new()
    }
}
