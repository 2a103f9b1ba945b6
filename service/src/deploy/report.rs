use cdn_cache::InvalidationInfo;

/// Outcome of every phase of a deploy.
///
/// Configuration, credential, build and enumeration failures abort the
/// deploy and are returned as errors instead; everything here ran to some
/// conclusion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployReport {
    pub build: BuildOutcome,
    pub files_prepared: usize,
    pub deletion: DeletionOutcome,
    pub upload: UploadOutcome,
    pub invalidation: InvalidationOutcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum BuildOutcome {
    #[default]
    Skipped,
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DeletionOutcome {
    #[default]
    NotRun,
    NothingToDelete,
    Deleted {
        count: usize,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadOutcome {
    /// Keys uploaded, in upload order
    pub uploaded: Vec<String>,
    /// The upload that stopped the phase
    pub failed: Option<FailedUpload>,
    /// Files never attempted because of the failure
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedUpload {
    pub key: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum InvalidationOutcome {
    #[default]
    NotConfigured,
    Created(InvalidationInfo),
    Failed {
        error: String,
    },
}

impl DeployReport {
    /// Names of the phases that failed.
    pub fn failed_phases(&self) -> Vec<&'static str> {
        let mut failed = Vec::new();
        if matches!(self.deletion, DeletionOutcome::Failed { .. }) {
            failed.push("deletion");
        }
        if self.upload.failed.is_some() {
            failed.push("upload");
        }
        if matches!(self.invalidation, InvalidationOutcome::Failed { .. }) {
            failed.push("invalidation");
        }
        failed
    }

    pub fn is_success(&self) -> bool {
        self.failed_phases().is_empty()
    }
}
