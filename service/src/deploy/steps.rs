use cdn_cache::invalidate_cache;
use cloud_storage::content_type_for;
use core_types::DeployEvent;
use file_system::{collect_upload_files, object_key};

use crate::{
    deploy::{
        context::DeployContext,
        report::{BuildOutcome, DeletionOutcome, FailedUpload, InvalidationOutcome},
    },
    error::Error,
    pipeline::{PipelineStep, StepAction},
    session::DeploySession,
};

fn connected_session(context: &DeployContext) -> Result<DeploySession, Error> {
    context
        .session
        .clone()
        .ok_or_else(|| Error::CloudSyncError("Not connected to cloud".to_string()))
}

/// Step 1: Run the configured build command
pub struct BuildProjectStep;

#[async_trait::async_trait]
impl PipelineStep<DeployContext> for BuildProjectStep {
    fn name(&self) -> &'static str {
        "build_project"
    }

    fn should_execute(&self, context: &DeployContext) -> bool {
        !context.skip_build && context.config.build_cmd.is_some()
    }

    async fn execute(&self, context: &mut DeployContext) -> StepAction {
        let Some(command) = context.config.build_cmd.clone() else {
            return StepAction::Continue;
        };

        tracing::info!(command = %command, "Building project");
        context
            .send(DeployEvent::BuildStarted {
                command: command.clone(),
            })
            .await;

        match context
            .executable_runner
            .run_shell_command(&command, None)
            .await
        {
            Ok(()) => {
                context.report.build = BuildOutcome::Completed;
                context.send(DeployEvent::BuildCompleted).await;
                StepAction::Continue
            }
            Err(e) => {
                tracing::error!("Build failed: {}", e);
                StepAction::Abort(Error::from(e))
            }
        }
    }
}

/// Step 2: Collect the local files to upload
pub struct PrepareUploadManifestStep;

#[async_trait::async_trait]
impl PipelineStep<DeployContext> for PrepareUploadManifestStep {
    fn name(&self) -> &'static str {
        "prepare_upload_manifest"
    }

    async fn execute(&self, context: &mut DeployContext) -> StepAction {
        let root = &context.config.deploy_folder_path;

        match collect_upload_files(root, &context.config.ignore_files) {
            Ok(files) => {
                tracing::info!(
                    folder = %root.display(),
                    total_files = files.len(),
                    "Prepared upload manifest"
                );
                context.report.files_prepared = files.len();
                context.manifest = files;
                context
                    .send(DeployEvent::ManifestPrepared {
                        total_files: context.manifest.len(),
                    })
                    .await;
                StepAction::Continue
            }
            Err(e) => {
                tracing::error!("Error reading {}: {}", root.display(), e);
                StepAction::Abort(Error::IoError(format!(
                    "Failed to read {}: {}",
                    root.display(),
                    e
                )))
            }
        }
    }
}

/// Step 3: Delete every object currently in the bucket
///
/// Failures are recorded in the report and the upload still runs.
pub struct DeleteRemoteObjectsStep;

#[async_trait::async_trait]
impl PipelineStep<DeployContext> for DeleteRemoteObjectsStep {
    fn name(&self) -> &'static str {
        "delete_remote_objects"
    }

    fn should_execute(&self, context: &DeployContext) -> bool {
        context.session.is_some()
    }

    async fn execute(&self, context: &mut DeployContext) -> StepAction {
        let session = match connected_session(context) {
            Ok(session) => session,
            Err(e) => return StepAction::Abort(e),
        };

        let keys = match session.cloud_ops.list_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!("Error listing bucket, skipping deletion: {}", e);
                context.report.deletion = DeletionOutcome::Failed {
                    error: e.to_string(),
                };
                context
                    .send(DeployEvent::DeletionFailed {
                        error: e.to_string(),
                    })
                    .await;
                return StepAction::Continue;
            }
        };

        if keys.is_empty() {
            tracing::info!("Bucket is empty, nothing to delete");
            context.report.deletion = DeletionOutcome::NothingToDelete;
            return StepAction::Continue;
        }

        context
            .send(DeployEvent::DeletionStarted {
                total_objects: keys.len(),
            })
            .await;

        match session.cloud_ops.delete_keys(&keys).await {
            Ok(count) => {
                tracing::info!(deleted_objects = count, "Deleted bucket contents");
                context.report.deletion = DeletionOutcome::Deleted { count };
                context
                    .send(DeployEvent::DeletionCompleted {
                        deleted_objects: count,
                    })
                    .await;
            }
            Err(e) => {
                tracing::error!("Error deleting bucket contents: {}", e);
                context.report.deletion = DeletionOutcome::Failed {
                    error: e.to_string(),
                };
                context
                    .send(DeployEvent::DeletionFailed {
                        error: e.to_string(),
                    })
                    .await;
            }
        }

        StepAction::Continue
    }
}

/// Step 4: Upload the manifest one file at a time
///
/// The first failure stops the upload. Files already uploaded stay in the
/// bucket and the rest are not attempted.
pub struct UploadManifestStep;

#[async_trait::async_trait]
impl PipelineStep<DeployContext> for UploadManifestStep {
    fn name(&self) -> &'static str {
        "upload_manifest"
    }

    fn should_execute(&self, context: &DeployContext) -> bool {
        context.session.is_some()
    }

    async fn execute(&self, context: &mut DeployContext) -> StepAction {
        let session = match connected_session(context) {
            Ok(session) => session,
            Err(e) => return StepAction::Abort(e),
        };

        let manifest = std::mem::take(&mut context.manifest);
        let total_files = manifest.len();

        for (index, path) in manifest.iter().enumerate() {
            let file_number = index + 1;
            let key = object_key(&context.config.deploy_folder_path, path);
            let content_type = content_type_for(path);

            context
                .send(DeployEvent::FileUploadStarted {
                    key: key.clone(),
                    file_number,
                    total_files,
                })
                .await;

            match session
                .cloud_ops
                .upload_file(path, &key, content_type)
                .await
            {
                Ok(()) => {
                    tracing::debug!(key = %key, content_type = ?content_type, "Uploaded file");
                    context
                        .send(DeployEvent::FileUploadCompleted {
                            key: key.clone(),
                            file_number,
                            total_files,
                        })
                        .await;
                    context.report.upload.uploaded.push(key);
                }
                Err(e) => {
                    tracing::error!("Error uploading {}: {}", key, e);
                    context
                        .send(DeployEvent::FileUploadFailed {
                            key: key.clone(),
                            error: e.to_string(),
                            file_number,
                            total_files,
                        })
                        .await;
                    context.report.upload.failed = Some(FailedUpload {
                        key,
                        error: e.to_string(),
                    });
                    context.report.upload.skipped = total_files - file_number;
                    break;
                }
            }
        }

        context.manifest = manifest;

        let uploaded_files = context.report.upload.uploaded.len();
        tracing::info!(uploaded_files, total_files, "Upload finished");
        context
            .send(DeployEvent::UploadCompleted { uploaded_files })
            .await;

        StepAction::Continue
    }
}

/// Step 5: Invalidate the CDN cache when one is configured
pub struct InvalidateCacheStep;

#[async_trait::async_trait]
impl PipelineStep<DeployContext> for InvalidateCacheStep {
    fn name(&self) -> &'static str {
        "invalidate_cache"
    }

    fn should_execute(&self, context: &DeployContext) -> bool {
        context.config.cache.is_some() && context.session.is_some()
    }

    async fn execute(&self, context: &mut DeployContext) -> StepAction {
        let session = match connected_session(context) {
            Ok(session) => session,
            Err(e) => return StepAction::Abort(e),
        };
        let Some(cache) = context.config.cache.clone() else {
            return StepAction::Continue;
        };

        match invalidate_cache(session.cdn_ops.as_ref(), &cache).await {
            Ok(invalidation) => {
                context
                    .send(DeployEvent::InvalidationCreated {
                        distribution_id: cache.distribution_id.clone(),
                        invalidation_id: invalidation.id.clone(),
                        status: invalidation.status.clone(),
                    })
                    .await;
                context.report.invalidation = InvalidationOutcome::Created(invalidation);
            }
            Err(e) => {
                tracing::error!("Error creating invalidation: {}", e);
                context
                    .send(DeployEvent::InvalidationFailed {
                        distribution_id: cache.distribution_id.clone(),
                        error: e.to_string(),
                    })
                    .await;
                context.report.invalidation = InvalidationOutcome::Failed {
                    error: e.to_string(),
                };
            }
        }

        StepAction::Continue
    }
}
