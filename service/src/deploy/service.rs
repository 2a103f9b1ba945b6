use std::sync::{Arc, Mutex, PoisonError};

use cdn_cache::InvalidationInfo;
use core_types::{DeployConfig, DeployEvent};
use credentials::RoleAssumer;
use executable_runner::ops::{DefaultExecutableRunnerOps, ExecutableRunnerOps};
use flume::Sender;

use crate::{
    cache_invalidation::context::CacheContext,
    deploy::{context::DeployContext, report::DeployReport},
    error::Error,
    pipeline::Pipeline,
    session::DeploySession,
};

/// Deploys a static site folder to its bucket.
///
/// Cloud clients are created on first use and reused by every later call on
/// the same service. A service built from another configuration connects
/// again.
pub struct DeployService {
    config: Arc<DeployConfig>,
    executable_runner: Arc<dyn ExecutableRunnerOps>,
    session: Mutex<Option<DeploySession>>,
    role_assumer: Option<Arc<dyn RoleAssumer>>,
    skip_build: bool,
}

impl DeployService {
    pub fn new(config: DeployConfig) -> Self {
        Self {
            config: Arc::new(config),
            executable_runner: Arc::new(DefaultExecutableRunnerOps::new()),
            session: Mutex::new(None),
            role_assumer: None,
            skip_build: false,
        }
    }

    /// Service using the given clients and command runner instead of
    /// connecting to AWS and spawning a shell.
    pub fn with_session(
        config: DeployConfig,
        session: DeploySession,
        executable_runner: Arc<dyn ExecutableRunnerOps>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            executable_runner,
            session: Mutex::new(Some(session)),
            role_assumer: None,
            skip_build: false,
        }
    }

    pub fn with_executable_runner(mut self, executable_runner: Arc<dyn ExecutableRunnerOps>) -> Self {
        self.executable_runner = executable_runner;
        self
    }

    /// Resolve credentials with `role_assumer` instead of STS.
    pub fn with_role_assumer(mut self, role_assumer: Arc<dyn RoleAssumer>) -> Self {
        self.role_assumer = Some(role_assumer);
        self
    }

    pub fn with_skip_build(mut self, skip_build: bool) -> Self {
        self.skip_build = skip_build;
        self
    }

    fn current_session(&self) -> Option<DeploySession> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_session(&self, session: Option<DeploySession>) {
        if session.is_some() {
            *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session;
        }
    }

    async fn connected_session(&self) -> Result<DeploySession, Error> {
        if let Some(session) = self.current_session() {
            return Ok(session);
        }
        let session = match &self.role_assumer {
            Some(assumer) => DeploySession::connect_with(&self.config, assumer.as_ref()).await?,
            None => DeploySession::connect(&self.config).await?,
        };
        self.store_session(Some(session.clone()));
        Ok(session)
    }

    /// Build the project, replace the bucket contents with the deploy folder
    /// and invalidate the CDN cache.
    ///
    /// Returns an error only when the deploy could not get as far as the
    /// bucket: bad credentials, a failed build or an unreadable folder.
    /// Everything after that is reported per phase in the [`DeployReport`].
    #[tracing::instrument(skip_all, err)]
    pub async fn deploy(
        &self,
        progress_tx: Option<Sender<DeployEvent>>,
    ) -> Result<DeployReport, Error> {
        tracing::info!(
            bucket = %self.config.bucket_name,
            folder = %self.config.deploy_folder_path.display(),
            "Starting deploy"
        );

        let mut context = DeployContext::new(
            self.config.clone(),
            self.executable_runner.clone(),
            progress_tx,
        )
        .with_session(self.current_session())
        .with_role_assumer(self.role_assumer.clone())
        .with_skip_build(self.skip_build);

        let pipeline = Pipeline::<DeployContext>::new();
        let result = pipeline.execute(&mut context).await;
        self.store_session(context.session.take());
        result?;

        let report = context.report;
        tracing::info!(
            files_prepared = report.files_prepared,
            uploaded_files = report.upload.uploaded.len(),
            skipped_files = report.upload.skipped,
            deletion = ?report.deletion,
            invalidation = ?report.invalidation,
            "Deploy summary"
        );

        Ok(report)
    }

    /// Invalidate the configured CDN paths.
    ///
    /// Returns `Ok(None)` without contacting anything when no cache is
    /// configured.
    #[tracing::instrument(skip_all, err)]
    pub async fn clear_cache(&self) -> Result<Option<InvalidationInfo>, Error> {
        if self.config.cache.is_none() {
            tracing::info!("Skipping clearing cache, no CACHE configuration");
            return Ok(None);
        }

        let mut context = CacheContext::new(self.config.clone())
            .with_session(self.current_session())
            .with_role_assumer(self.role_assumer.clone());

        let pipeline = Pipeline::<CacheContext>::new();
        let result = pipeline.execute(&mut context).await;
        self.store_session(context.session.take());
        result?;

        Ok(context.invalidation)
    }

    /// Current status of an earlier invalidation.
    #[tracing::instrument(skip(self), err)]
    pub async fn invalidation_status(
        &self,
        distribution_id: &str,
        invalidation_id: &str,
    ) -> Result<InvalidationInfo, Error> {
        let session = self.connected_session().await?;
        let invalidation =
            cdn_cache::invalidation_status(session.cdn_ops.as_ref(), distribution_id, invalidation_id)
                .await?;
        Ok(invalidation)
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use cdn_cache::mock::MockCdnCache;
    use cloud_storage::mock::MockCloudStorage;
    use core_types::{CacheOptions, DeployOptions};
    use credentials::mock::MockRoleAssumer;
    use executable_runner::ops::MockExecutableRunnerOps;

    use super::*;
    use crate::deploy::report::{BuildOutcome, DeletionOutcome, InvalidationOutcome};

    struct Fixture {
        cloud: MockCloudStorage,
        cdn: MockCdnCache,
        runner: MockExecutableRunnerOps,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                cloud: MockCloudStorage::new(),
                cdn: MockCdnCache::new(),
                runner: MockExecutableRunnerOps::new(),
            }
        }

        fn service(&self, options: DeployOptions) -> DeployService {
            DeployService::with_session(
                DeployConfig::try_from(options).unwrap(),
                DeploySession::new(Arc::new(self.cloud.clone()), Arc::new(self.cdn.clone())),
                Arc::new(self.runner.clone()),
            )
        }
    }

    fn options(root: &Path) -> DeployOptions {
        DeployOptions {
            id: Some("key".to_string()),
            secret: Some("secret".to_string()),
            bucket_name: Some("bucket".to_string()),
            deploy_folder_path: Some(root.to_string_lossy().to_string()),
            ..Default::default()
        }
    }

    fn cache_options() -> Option<CacheOptions> {
        Some(CacheOptions {
            id: Some("E2EXAMPLE".to_string()),
            paths: vec!["/*".to_string()],
            quantity: None,
        })
    }

    fn create_site(root: &Path) {
        fs::create_dir_all(root.join("assets")).unwrap();
        fs::create_dir_all(root.join("node_modules/lib")).unwrap();
        fs::write(root.join("index.html"), "<html></html>").unwrap();
        fs::write(root.join("assets/app.js"), "console.log(1)").unwrap();
        fs::write(root.join("node_modules/lib/index.js"), "").unwrap();
        fs::write(root.join(".DS_Store"), "").unwrap();
    }

    #[tokio::test]
    async fn test_deploy_replaces_bucket_contents() {
        let dir = tempfile::tempdir().unwrap();
        create_site(dir.path());
        let fixture = Fixture::new();
        fixture.cloud.add_file_dummy("old.html");
        fixture.cloud.add_file_dummy("index.html");

        let service = fixture.service(DeployOptions {
            build_cmd: Some("npm run build".to_string()),
            ignore_files: vec!["node_modules".to_string(), ".DS_Store".to_string()],
            cache: cache_options(),
            ..options(dir.path())
        });

        let report = service.deploy(None).await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.build, BuildOutcome::Completed);
        assert_eq!(report.deletion, DeletionOutcome::Deleted { count: 2 });
        assert_eq!(report.files_prepared, 2);
        assert_eq!(fixture.cloud.get_keys(), vec!["assets/app.js", "index.html"]);
        assert_eq!(
            fixture.cloud.get_uploaded_content("index.html"),
            Some(b"<html></html>".to_vec())
        );
        assert!(matches!(report.invalidation, InvalidationOutcome::Created(_)));
        assert_eq!(fixture.runner.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_deploy_uploads_when_listing_fails() {
        let dir = tempfile::tempdir().unwrap();
        create_site(dir.path());
        let fixture = Fixture::new();
        fixture.cloud.fail_listing();

        let report = fixture
            .service(DeployOptions {
                ignore_files: vec!["node_modules".to_string()],
                ..options(dir.path())
            })
            .deploy(None)
            .await
            .unwrap();

        assert_eq!(report.failed_phases(), vec!["deletion"]);
        assert_eq!(report.upload.uploaded.len(), 3);
        assert!(fixture.cloud.was_uploaded("index.html"));
    }

    #[tokio::test]
    async fn test_deploy_uploads_when_deletion_fails() {
        let dir = tempfile::tempdir().unwrap();
        create_site(dir.path());
        let fixture = Fixture::new();
        fixture.cloud.add_file_dummy("old.html");
        fixture.cloud.add_file_dummy("index.html");
        fixture.cloud.fail_deletion();

        let report = fixture
            .service(DeployOptions {
                ignore_files: vec!["node_modules".to_string()],
                ..options(dir.path())
            })
            .deploy(None)
            .await
            .unwrap();

        assert_eq!(report.failed_phases(), vec!["deletion"]);
        assert!(matches!(report.deletion, DeletionOutcome::Failed { .. }));
        assert_eq!(report.files_prepared, 3);
        assert_eq!(report.upload.uploaded.len(), 3);
        assert!(report.upload.failed.is_none());
        for key in ["index.html", "assets/app.js", ".DS_Store"] {
            assert!(fixture.cloud.was_uploaded(key), "{} was not uploaded", key);
        }
        assert!(fixture.cloud.get_keys().contains(&"old.html".to_string()));
    }

    #[tokio::test]
    async fn test_deploy_role_failure_aborts_before_build() {
        let dir = tempfile::tempdir().unwrap();
        create_site(dir.path());
        let runner = MockExecutableRunnerOps::new();
        let assumer = MockRoleAssumer::with_failure("AccessDenied");

        let config = DeployConfig::try_from(DeployOptions {
            build_cmd: Some("npm run build".to_string()),
            cross_account_role: Some("arn:aws:iam::123456789012:role/deploy".to_string()),
            ..options(dir.path())
        })
        .unwrap();
        let service = DeployService::new(config)
            .with_executable_runner(Arc::new(runner.clone()))
            .with_role_assumer(Arc::new(assumer.clone()));

        let result = service.deploy(None).await;

        assert!(matches!(result, Err(Error::CredentialsError(_))));
        assert_eq!(assumer.total_calls(), 1);
        assert_eq!(
            assumer.calls()[0].role_arn,
            "arn:aws:iam::123456789012:role/deploy"
        );
        assert_eq!(runner.total_calls(), 0);
        assert!(service.current_session().is_none());
    }

    #[tokio::test]
    async fn test_clear_cache_role_failure_is_returned() {
        let assumer = MockRoleAssumer::with_failure("AccessDenied");
        let config = DeployConfig::try_from(DeployOptions {
            cross_account_role: Some("arn:aws:iam::123456789012:role/deploy".to_string()),
            cache: cache_options(),
            ..options(Path::new("public"))
        })
        .unwrap();
        let service = DeployService::new(config).with_role_assumer(Arc::new(assumer.clone()));

        let result = service.clear_cache().await;

        assert!(matches!(result, Err(Error::CredentialsError(_))));
        assert_eq!(assumer.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_deploy_build_failure_aborts_before_sync() {
        let dir = tempfile::tempdir().unwrap();
        create_site(dir.path());
        let fixture = Fixture {
            runner: MockExecutableRunnerOps::with_failure("exit status: 2"),
            ..Fixture::new()
        };
        fixture.cloud.add_file_dummy("index.html");

        let result = fixture
            .service(DeployOptions {
                build_cmd: Some("npm run build".to_string()),
                ..options(dir.path())
            })
            .deploy(None)
            .await;

        assert!(matches!(result, Err(Error::BuildError(_))));
        assert!(fixture.cloud.delete_requests().is_empty());
        assert!(fixture.cloud.upload_attempts().is_empty());
    }

    #[tokio::test]
    async fn test_deploy_skip_build() {
        let dir = tempfile::tempdir().unwrap();
        create_site(dir.path());
        let fixture = Fixture::new();

        let report = fixture
            .service(DeployOptions {
                build_cmd: Some("npm run build".to_string()),
                ..options(dir.path())
            })
            .with_skip_build(true)
            .deploy(None)
            .await
            .unwrap();

        assert_eq!(report.build, BuildOutcome::Skipped);
        assert_eq!(fixture.runner.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_deploy_sends_progress_events() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        let fixture = Fixture::new();
        let (tx, rx) = flume::unbounded();

        fixture
            .service(options(dir.path()))
            .deploy(Some(tx))
            .await
            .unwrap();

        let events: Vec<DeployEvent> = rx.drain().collect();
        assert_eq!(events.first(), Some(&DeployEvent::ManifestPrepared { total_files: 1 }));
        assert_eq!(
            events.last(),
            Some(&DeployEvent::UploadCompleted { uploaded_files: 1 })
        );
    }

    #[tokio::test]
    async fn test_session_is_reused_between_calls() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        let fixture = Fixture::new();
        let service = fixture.service(DeployOptions {
            cache: cache_options(),
            ..options(dir.path())
        });

        service.deploy(None).await.unwrap();
        service.deploy(None).await.unwrap();
        service.clear_cache().await.unwrap();

        assert_eq!(fixture.cloud.upload_attempts().len(), 2);
        assert_eq!(fixture.cdn.invalidation_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_clear_cache_without_cache_makes_no_calls() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Fixture::new();

        let result = fixture.service(options(dir.path())).clear_cache().await;

        assert_eq!(result, Ok(None));
        assert_eq!(fixture.cdn.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_clear_cache_creates_invalidation() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Fixture::new();
        let service = fixture.service(DeployOptions {
            cache: Some(CacheOptions {
                id: Some("E2EXAMPLE".to_string()),
                paths: vec!["/index.html".to_string(), "/assets/*".to_string()],
                quantity: None,
            }),
            ..options(dir.path())
        });

        let invalidation = service.clear_cache().await.unwrap().unwrap();

        assert_eq!(invalidation.status, "InProgress");
        let requests = fixture.cdn.invalidation_requests();
        assert_eq!(requests[0].paths, vec!["/index.html", "/assets/*"]);
        assert_eq!(requests[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_clear_cache_failure_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Fixture {
            cdn: MockCdnCache::with_failure("AccessDenied"),
            ..Fixture::new()
        };

        let result = fixture
            .service(DeployOptions {
                cache: cache_options(),
                ..options(dir.path())
            })
            .clear_cache()
            .await;

        assert!(matches!(result, Err(Error::CacheError(_))));
    }

    #[tokio::test]
    async fn test_invalidation_status() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Fixture::new();
        let service = fixture.service(DeployOptions {
            cache: cache_options(),
            ..options(dir.path())
        });
        let created = service.clear_cache().await.unwrap().unwrap();

        let status = service
            .invalidation_status("E2EXAMPLE", &created.id)
            .await
            .unwrap();
        assert!(!status.is_completed());

        fixture.cdn.complete(&created.id);
        let status = service
            .invalidation_status("E2EXAMPLE", &created.id)
            .await
            .unwrap();
        assert!(status.is_completed());
    }

    #[tokio::test]
    async fn test_invalidation_status_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Fixture::new();

        let result = fixture
            .service(options(dir.path()))
            .invalidation_status("E2EXAMPLE", "UNKNOWN")
            .await;

        assert!(matches!(result, Err(Error::CacheError(_))));
    }
}
