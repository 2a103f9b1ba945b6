/// Progress of a deploy, sent through an optional channel while the
/// pipeline runs.
#[derive(Debug, Clone, PartialEq)]
pub enum DeployEvent {
    BuildStarted {
        command: String,
    },
    BuildCompleted,
    ManifestPrepared {
        total_files: usize,
    },
    DeletionStarted {
        total_objects: usize,
    },
    DeletionCompleted {
        deleted_objects: usize,
    },
    DeletionFailed {
        error: String,
    },
    FileUploadStarted {
        key: String,
        file_number: usize,
        total_files: usize,
    },
    FileUploadCompleted {
        key: String,
        file_number: usize,
        total_files: usize,
    },
    FileUploadFailed {
        key: String,
        error: String,
        file_number: usize,
        total_files: usize,
    },
    UploadCompleted {
        uploaded_files: usize,
    },
    InvalidationCreated {
        distribution_id: String,
        invalidation_id: String,
        status: String,
    },
    InvalidationFailed {
        distribution_id: String,
        error: String,
    },
}
