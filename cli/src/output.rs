use core_types::DeployEvent;
use service::{
    DeployReport,
    deploy::report::{BuildOutcome, DeletionOutcome, InvalidationOutcome},
};

/// One line of progress output for an event.
pub fn describe_event(event: &DeployEvent) -> String {
    match event {
        DeployEvent::BuildStarted { command } => format!("Building: {}", command),
        DeployEvent::BuildCompleted => "Build completed".to_string(),
        DeployEvent::ManifestPrepared { total_files } => {
            format!("{} files to upload", total_files)
        }
        DeployEvent::DeletionStarted { total_objects } => {
            format!("Deleting {} objects from bucket", total_objects)
        }
        DeployEvent::DeletionCompleted { deleted_objects } => {
            format!("Deleted {} objects", deleted_objects)
        }
        DeployEvent::DeletionFailed { error } => format!("Deletion failed: {}", error),
        DeployEvent::FileUploadStarted {
            key,
            file_number,
            total_files,
        } => format!("[{}/{}] Uploading {}", file_number, total_files, key),
        DeployEvent::FileUploadCompleted {
            key,
            file_number,
            total_files,
        } => format!("[{}/{}] Uploaded {}", file_number, total_files, key),
        DeployEvent::FileUploadFailed {
            key,
            error,
            file_number,
            total_files,
        } => format!(
            "[{}/{}] Failed to upload {}: {}",
            file_number, total_files, key, error
        ),
        DeployEvent::UploadCompleted { uploaded_files } => {
            format!("Uploaded {} files", uploaded_files)
        }
        DeployEvent::InvalidationCreated {
            distribution_id,
            invalidation_id,
            status,
        } => format!(
            "Distribution : {} > Invalidation : {} - {}",
            distribution_id, invalidation_id, status
        ),
        DeployEvent::InvalidationFailed {
            distribution_id,
            error,
        } => format!("Distribution : {} > Invalidation failed: {}", distribution_id, error),
    }
}

/// Summary printed after a deploy.
pub fn summarize(report: &DeployReport) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(match report.build {
        BuildOutcome::Skipped => "Build:        skipped".to_string(),
        BuildOutcome::Completed => "Build:        completed".to_string(),
    });

    lines.push(match &report.deletion {
        DeletionOutcome::NotRun => "Deletion:     not run".to_string(),
        DeletionOutcome::NothingToDelete => "Deletion:     bucket was empty".to_string(),
        DeletionOutcome::Deleted { count } => format!("Deletion:     {} objects deleted", count),
        DeletionOutcome::Failed { error } => format!("Deletion:     FAILED ({})", error),
    });

    let upload = &report.upload;
    lines.push(match &upload.failed {
        None => format!(
            "Upload:       {}/{} files uploaded",
            upload.uploaded.len(),
            report.files_prepared
        ),
        Some(failed) => format!(
            "Upload:       FAILED at {} ({}), {} uploaded, {} not attempted",
            failed.key,
            failed.error,
            upload.uploaded.len(),
            upload.skipped
        ),
    });

    lines.push(match &report.invalidation {
        InvalidationOutcome::NotConfigured => "Invalidation: not configured".to_string(),
        InvalidationOutcome::Created(invalidation) => format!(
            "Invalidation: {} ({})",
            invalidation.id, invalidation.status
        ),
        InvalidationOutcome::Failed { error } => format!("Invalidation: FAILED ({})", error),
    });

    lines
}

#[cfg(test)]
mod tests {
    use service::deploy::report::{FailedUpload, UploadOutcome};

    use super::*;

    #[test]
    fn test_describe_upload_progress() {
        let event = DeployEvent::FileUploadCompleted {
            key: "assets/app.js".to_string(),
            file_number: 2,
            total_files: 5,
        };

        assert_eq!(describe_event(&event), "[2/5] Uploaded assets/app.js");
    }

    #[test]
    fn test_summary_of_failed_upload() {
        let report = DeployReport {
            files_prepared: 4,
            deletion: DeletionOutcome::Deleted { count: 3 },
            upload: UploadOutcome {
                uploaded: vec!["a.txt".to_string()],
                failed: Some(FailedUpload {
                    key: "b.txt".to_string(),
                    error: "timeout".to_string(),
                }),
                skipped: 2,
            },
            ..Default::default()
        };

        assert_eq!(
            summarize(&report),
            vec![
                "Build:        skipped",
                "Deletion:     3 objects deleted",
                "Upload:       FAILED at b.txt (timeout), 1 uploaded, 2 not attempted",
                "Invalidation: not configured",
            ]
        );
    }
}
