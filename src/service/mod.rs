// Update determination service

use crate::catalog::{
    Application, Architecture, Page, Platform, RegisterReleaseRequest, Release, ReleaseEdit,
    ReleaseFilter, ReleaseKey,
};
use crate::error::{Error, Result};
use crate::store::ReleaseStore;
use crate::version::Version;
use chrono::Utc;
use log::{debug, info};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub mod response;
pub mod selection;

pub use response::{
    LatestRequest, LatestVersion, OfferedRelease, ReleaseSummary, UpdateDecision, UpdateRequest,
};
pub use selection::{Candidate, SelectionConfig, select_latest};

/// Answers update checks and manages the release catalog through a store.
///
/// Holds no mutable state. Every call works on the snapshot the store returns,
/// so one service can be shared across concurrent requests.
#[derive(Clone)]
pub struct UpdateService {
    store: Arc<dyn ReleaseStore>,
    deadline: Option<Duration>,
}

impl UpdateService {
    pub fn new(store: Arc<dyn ReleaseStore>) -> Self {
        Self {
            store,
            deadline: None,
        }
    }

    /// Abort any storage call that takes longer than `deadline`
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn store(&self) -> &Arc<dyn ReleaseStore> {
        &self.store
    }

    async fn call<T, F>(&self, operation: &'static str, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.deadline {
            Some(limit) => tokio::time::timeout(limit, future)
                .await
                .map_err(|_| Error::Timeout {
                    operation,
                    timeout: limit,
                })?,
            None => future.await,
        }
    }

    /// Decide whether the client described by `request` should update
    pub async fn check_for_update(&self, request: &UpdateRequest) -> Result<UpdateDecision> {
        let current = Version::parse(request.current_version.trim())?;

        let Some(candidate) = self.best_candidate(&LatestRequest::from(request)).await? else {
            return Ok(UpdateDecision::no_update(current.raw()));
        };
        if !candidate.version.greater_than(&current) {
            debug!(
                "{} is up to date (best candidate {})",
                current, candidate.version
            );
            return Ok(UpdateDecision::no_update(current.raw()));
        }

        let required =
            candidate.release.required && candidate.release.meets_minimum_version(current.raw())?;
        let latest_version = candidate.release.version.clone();
        Ok(UpdateDecision::offer(
            current.raw(),
            latest_version,
            OfferedRelease::from_release(candidate.release, required, request.include_metadata),
        ))
    }

    /// Highest-precedence release for a target, if any
    pub async fn get_latest_version(
        &self,
        request: &LatestRequest,
    ) -> Result<Option<LatestVersion>> {
        Ok(self.best_candidate(request).await?.map(|candidate| {
            let required = candidate.release.required;
            LatestVersion {
                latest_version: candidate.release.version.clone(),
                release: OfferedRelease::from_release(
                    candidate.release,
                    required,
                    request.include_metadata,
                ),
            }
        }))
    }

    async fn best_candidate(&self, request: &LatestRequest) -> Result<Option<Candidate>> {
        let application_id = request.application_id.trim();
        let application = self
            .call("get_application", self.store.get_application(application_id))
            .await?;

        let (Ok(platform), Ok(architecture)) = (
            request.platform.parse::<Platform>(),
            request.architecture.parse::<Architecture>(),
        ) else {
            debug!(
                "No releases for unsupported target {}/{}",
                request.platform, request.architecture
            );
            return Ok(None);
        };
        if !application.supports_platform(platform) {
            debug!("{} does not ship for {}", application.id, platform);
            return Ok(None);
        }

        let filter = ReleaseFilter::for_target(application_id, platform, architecture);
        let releases = match self.call("find_releases", self.store.find_releases(&filter)).await {
            Ok((releases, _)) => releases,
            Err(Error::NotFound { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };

        let allow_prerelease = application.policy.resolve_prerelease(request.allow_prerelease);
        let config = SelectionConfig::new(allow_prerelease).with_policy(&application.policy);
        select_latest(releases, &config)
    }

    /// Validate, default and run a listing query
    pub async fn list_releases(&self, mut filter: ReleaseFilter) -> Result<Page<ReleaseSummary>> {
        filter.validate()?;
        filter.normalize();
        let (releases, total) = self
            .call("find_releases", self.store.find_releases(&filter))
            .await?;
        Ok(Page::from_filter(releases, total, &filter).map(ReleaseSummary::from))
    }

    /// Turn a registration request into a release ready to persist.
    /// Does not touch the store.
    pub fn validate_registration(&self, request: RegisterReleaseRequest) -> Result<Release> {
        request.into_release(Utc::now())
    }

    /// Validate a registration against its application and save it
    pub async fn register_release(&self, request: RegisterReleaseRequest) -> Result<Release> {
        let release = self.validate_registration(request)?;
        let application = self
            .call("get_application", self.store.get_application(&release.application_id))
            .await?;
        if !application.supports_platform(release.platform) {
            return Err(Error::validation(
                "platform",
                format!(
                    "application '{}' does not support platform '{}'",
                    application.id, release.platform
                ),
            ));
        }
        self.call("save_release", self.store.save_release(&release))
            .await?;
        info!("Registered release {}", release.id());
        Ok(release)
    }

    pub async fn get_release(&self, key: &ReleaseKey) -> Result<Release> {
        self.call("get_release", self.store.get_release(key)).await
    }

    /// Apply a notes/metadata edit to an existing release
    pub async fn edit_release(&self, key: &ReleaseKey, edit: &ReleaseEdit) -> Result<Release> {
        if edit.is_empty() {
            return Err(Error::validation("edit", "nothing to change"));
        }
        let mut release = self.get_release(key).await?;
        edit.apply(&mut release, Utc::now());
        self.call("update_release", self.store.update_release(&release))
            .await?;
        info!("Updated release {}", release.id());
        Ok(release)
    }

    pub async fn delete_release(&self, key: &ReleaseKey) -> Result<()> {
        self.call("delete_release", self.store.delete_release(key))
            .await?;
        info!("Deleted release {}", key);
        Ok(())
    }

    /// Check downloaded bytes against the stored checksum
    pub async fn verify_artifact(&self, key: &ReleaseKey, data: &[u8]) -> Result<bool> {
        let release = self.get_release(key).await?;
        let matches = release.verify_checksum(data);
        debug!(
            "Checksum of {} ({}) {}",
            release.id(),
            release.checksum_type,
            if matches { "matches" } else { "does not match" }
        );
        Ok(matches)
    }

    pub async fn register_application(&self, application: Application) -> Result<Application> {
        application.validate()?;
        self.call("save_application", self.store.save_application(&application))
            .await?;
        info!("Registered application {}", application.id);
        Ok(application)
    }

    pub async fn get_application(&self, id: &str) -> Result<Application> {
        self.call("get_application", self.store.get_application(id))
            .await
    }

    pub async fn list_applications(&self) -> Result<Vec<Application>> {
        self.call("list_applications", self.store.list_applications())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::release::tests::sample_release;
    use crate::catalog::{ApplicationPolicy, ChecksumAlgorithm, compute_checksum};
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;
    use std::collections::BTreeMap;

    async fn service_with(versions: &[&str]) -> UpdateService {
        let store = MemoryStore::new();
        store
            .save_application(&Application::new(
                "acme",
                "Acme",
                vec![Platform::Linux, Platform::Windows],
            ))
            .await
            .unwrap();
        for version in versions {
            store.save_release(&sample_release(version)).await.unwrap();
        }
        UpdateService::new(Arc::new(store))
    }

    fn check(current: &str) -> UpdateRequest {
        UpdateRequest::new("acme", current, "linux", "amd64")
    }

    #[tokio::test]
    async fn test_stable_update_offered() {
        let service = service_with(&["1.5.0"]).await;
        let decision = service.check_for_update(&check("1.2.0")).await.unwrap();
        assert!(decision.update_available);
        assert_eq!(decision.latest_version, "1.5.0");
        assert_eq!(decision.current_version, "1.2.0");
        let offered = decision.release.unwrap();
        assert_eq!(offered.download_url, "https://downloads.example.com/acme-1.5.0.tar.gz");
        assert_eq!(offered.checksum_type, ChecksumAlgorithm::Sha256);
        assert!(!offered.required);
        assert_eq!(offered.metadata, None);
    }

    #[tokio::test]
    async fn test_current_version_echoed_trimmed() {
        let service = service_with(&["1.5.0"]).await;
        let decision = service.check_for_update(&check(" 1.2.0 ")).await.unwrap();
        assert_eq!(decision.current_version, "1.2.0");

        let decision = service.check_for_update(&check("\t1.5.0\n")).await.unwrap();
        assert!(!decision.update_available);
        assert_eq!(decision.current_version, "1.5.0");
        assert_eq!(decision.latest_version, "1.5.0");
    }

    #[tokio::test]
    async fn test_prerelease_only_when_allowed() {
        let service = service_with(&["1.5.0", "2.0.0-beta.1"]).await;

        let decision = service.check_for_update(&check("1.5.0")).await.unwrap();
        assert!(!decision.update_available);
        assert_eq!(decision.latest_version, "1.5.0");

        let decision = service
            .check_for_update(&check("1.5.0").allow_prerelease(true))
            .await
            .unwrap();
        assert!(decision.update_available);
        assert_eq!(decision.latest_version, "2.0.0-beta.1");
    }

    #[tokio::test]
    async fn test_policy_default_allows_prerelease() {
        let store = MemoryStore::new();
        let mut app = Application::new("acme", "Acme", vec![Platform::Linux]);
        app.policy.allow_prerelease = true;
        store.save_application(&app).await.unwrap();
        store.save_release(&sample_release("2.0.0-rc.1")).await.unwrap();
        let service = UpdateService::new(Arc::new(store));

        let decision = service.check_for_update(&check("1.0.0")).await.unwrap();
        assert_eq!(decision.latest_version, "2.0.0-rc.1");

        let decision = service
            .check_for_update(&check("1.0.0").allow_prerelease(false))
            .await
            .unwrap();
        assert!(!decision.update_available);
    }

    #[tokio::test]
    async fn test_required_flag_scoped_by_minimum_version() {
        let service = service_with(&[]).await;
        let mut release = sample_release("1.5.1");
        release.required = true;
        release.minimum_version = Some("1.0.0".to_string());
        service.store().save_release(&release).await.unwrap();

        let decision = service.check_for_update(&check("1.2.0")).await.unwrap();
        assert!(decision.update_available);
        assert!(decision.is_required());

        let below_gate = service.check_for_update(&check("0.9.0")).await.unwrap();
        assert!(below_gate.update_available);
        assert!(!below_gate.is_required());

        let ahead = service.check_for_update(&check("2.0.0")).await.unwrap();
        assert!(!ahead.update_available);
        assert!(!ahead.is_required());
    }

    #[tokio::test]
    async fn test_invalid_current_version_is_format_error() {
        let service = service_with(&["1.5.0"]).await;
        let err = service.check_for_update(&check("one.two")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatError);
        let err = service.check_for_update(&check("")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatError);
    }

    #[tokio::test]
    async fn test_unknown_application_not_found() {
        let service = service_with(&["1.5.0"]).await;
        let mut request = check("1.0.0");
        request.application_id = "ghost".to_string();
        let err = service.check_for_update(&request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_empty_or_mismatched_target_means_no_update() {
        let service = service_with(&["1.5.0"]).await;

        let mut windows = check("1.0.0");
        windows.platform = "windows".to_string();
        assert!(!service.check_for_update(&windows).await.unwrap().update_available);

        let mut unsupported = check("1.0.0");
        unsupported.platform = "ios".to_string();
        assert!(!service.check_for_update(&unsupported).await.unwrap().update_available);

        let mut unknown = check("1.0.0");
        unknown.architecture = "mips".to_string();
        assert!(!service.check_for_update(&unknown).await.unwrap().update_available);
    }

    #[tokio::test]
    async fn test_corrupt_entries_do_not_fail_check() {
        let service = service_with(&["1.4.0", "garbage", "1.2.3.4.5"]).await;
        let decision = service.check_for_update(&check("1.0.0")).await.unwrap();
        assert_eq!(decision.latest_version, "1.4.0");
    }

    #[tokio::test]
    async fn test_policy_bounds_limit_offer() {
        let store = MemoryStore::new();
        let mut app = Application::new("acme", "Acme", vec![Platform::Linux]);
        app.policy = ApplicationPolicy {
            max_version: Some("1.9.9".to_string()),
            ..Default::default()
        };
        store.save_application(&app).await.unwrap();
        for version in ["1.5.0", "2.0.0"] {
            store.save_release(&sample_release(version)).await.unwrap();
        }
        let service = UpdateService::new(Arc::new(store));
        let decision = service.check_for_update(&check("1.0.0")).await.unwrap();
        assert_eq!(decision.latest_version, "1.5.0");
    }

    #[tokio::test]
    async fn test_older_clients_never_get_older_offer() {
        let service = service_with(&["1.0.0", "1.2.0", "1.10.0", "2.0.0-beta.2"]).await;
        let mut previous: Option<Version> = None;
        for current in ["1.9.0", "1.1.0", "1.0.0", "0.1.0"] {
            let decision = service.check_for_update(&check(current)).await.unwrap();
            let offered = Version::parse(&decision.latest_version).unwrap();
            if let Some(previous) = &previous {
                assert!(offered.greater_or_equal(previous));
            }
            previous = Some(offered);
        }
    }

    #[tokio::test]
    async fn test_metadata_only_when_requested() {
        let service = service_with(&[]).await;
        let mut release = sample_release("1.1.0");
        release.metadata = BTreeMap::from([("channel".to_string(), "stable".to_string())]);
        service.store().save_release(&release).await.unwrap();

        let without = service.check_for_update(&check("1.0.0")).await.unwrap();
        assert_eq!(without.release.unwrap().metadata, None);

        let with = service
            .check_for_update(&check("1.0.0").include_metadata(true))
            .await
            .unwrap();
        assert_eq!(
            with.release.unwrap().metadata.unwrap().get("channel").map(String::as_str),
            Some("stable")
        );
    }

    #[tokio::test]
    async fn test_latest_version_lookup() {
        let service = service_with(&["1.0.0", "1.3.0", "2.0.0-alpha"]).await;
        let request = LatestRequest::from(&check("0.0.0"));
        let latest = service.get_latest_version(&request).await.unwrap().unwrap();
        assert_eq!(latest.latest_version, "1.3.0");

        let empty = service_with(&[]).await;
        assert!(empty.get_latest_version(&request).await.unwrap().is_none());
    }

    fn registration(version: &str) -> RegisterReleaseRequest {
        RegisterReleaseRequest {
            application_id: "acme".to_string(),
            version: version.to_string(),
            platform: "linux".to_string(),
            architecture: "amd64".to_string(),
            download_url: format!("https://downloads.example.com/acme-{}.tar.gz", version),
            checksum: compute_checksum(version.as_bytes(), ChecksumAlgorithm::Sha256),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_register_then_duplicate_conflicts() {
        let service = service_with(&[]).await;
        let release = service.register_release(registration("1.0.0")).await.unwrap();
        assert_eq!(release.version, "1.0.0");

        let err = service
            .register_release(registration("1.0.0"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_register_rejects_unsupported_platform() {
        let service = service_with(&[]).await;
        let mut request = registration("1.0.0");
        request.platform = "darwin".to_string();
        let err = service.register_release(request).await.unwrap_err();
        assert_eq!(err.field(), Some("platform"));
    }

    #[test]
    fn test_validate_registration_is_pure() {
        let service = UpdateService::new(Arc::new(MemoryStore::new()));
        let mut request = registration("1.0.0");
        request.checksum_type = "sha512".to_string();
        let err = service.validate_registration(request).unwrap_err();
        assert_eq!(err.field(), Some("checksum_type"));
        assert!(service.validate_registration(registration("1.0.0")).is_ok());
    }

    #[tokio::test]
    async fn test_list_releases_pages() {
        let service = service_with(&["1.0.0", "1.1.0", "1.2.0"]).await;
        let mut filter = ReleaseFilter::for_application("acme");
        filter.limit = 2;
        filter.sort_by = "version".to_string();
        let page = service.list_releases(filter).await.unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].version, "1.2.0");
        assert!(page.has_more);

        let mut bad = ReleaseFilter::for_application("acme");
        bad.offset = -1;
        assert_eq!(
            service.list_releases(bad).await.unwrap_err().field(),
            Some("offset")
        );
    }

    #[tokio::test]
    async fn test_list_releases_sorts_mixed_labels_by_version() {
        let labels: Vec<String> = (0..60)
            .flat_map(|i| [format!("1.0.0-{i}"), format!("1.0.0-{i}_")])
            .collect();
        let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        let service = service_with(&refs).await;

        let mut filter = ReleaseFilter::for_application("acme");
        filter.limit = 200;
        filter.sort_by = "version".to_string();
        let page = service.list_releases(filter).await.unwrap();
        assert_eq!(page.total_count, 120);
        assert_eq!(page.items[0].version, "1.0.0-9_");
        assert_eq!(page.items[59].version, "1.0.0-0_");
        assert_eq!(page.items[60].version, "1.0.0-59");
        assert_eq!(page.items[119].version, "1.0.0-0");

        let decision = service
            .check_for_update(&check("1.0.0-0").allow_prerelease(true))
            .await
            .unwrap();
        assert_eq!(decision.latest_version, "1.0.0-9_");
    }

    #[tokio::test]
    async fn test_edit_verify_delete() {
        let service = service_with(&["1.0.0"]).await;
        let key = sample_release("1.0.0").key();

        let edit = ReleaseEdit {
            release_notes: Some("Bug fixes".to_string()),
            ..Default::default()
        };
        let edited = service.edit_release(&key, &edit).await.unwrap();
        assert_eq!(edited.release_notes, "Bug fixes");
        assert_eq!(
            service.edit_release(&key, &ReleaseEdit::default()).await.unwrap_err().field(),
            Some("edit")
        );

        assert!(service.verify_artifact(&key, b"1.0.0").await.unwrap());
        assert!(!service.verify_artifact(&key, b"tampered").await.unwrap());

        service.delete_release(&key).await.unwrap();
        assert_eq!(
            service.delete_release(&key).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_register_application_validates() {
        let service = UpdateService::new(Arc::new(MemoryStore::new()));
        let err = service
            .register_application(Application::new("acme", "Acme", vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("platforms"));

        service
            .register_application(Application::new("acme", "Acme", vec![Platform::Linux]))
            .await
            .unwrap();
        assert_eq!(service.list_applications().await.unwrap().len(), 1);
    }

    struct SlowStore;

    #[async_trait::async_trait]
    impl ReleaseStore for SlowStore {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn find_releases(&self, _filter: &ReleaseFilter) -> Result<(Vec<Release>, usize)> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok((Vec::new(), 0))
        }

        async fn get_release(&self, key: &ReleaseKey) -> Result<Release> {
            Err(Error::not_found("release", key.to_string()))
        }

        async fn save_release(&self, _release: &Release) -> Result<()> {
            Ok(())
        }

        async fn update_release(&self, _release: &Release) -> Result<()> {
            Ok(())
        }

        async fn delete_release(&self, _key: &ReleaseKey) -> Result<()> {
            Ok(())
        }

        async fn get_application(&self, id: &str) -> Result<Application> {
            Ok(Application::new(id, "Slow", vec![Platform::Linux]))
        }

        async fn save_application(&self, _application: &Application) -> Result<()> {
            Ok(())
        }

        async fn list_applications(&self) -> Result<Vec<Application>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_storage_deadline_aborts_check() {
        let service =
            UpdateService::new(Arc::new(SlowStore)).with_deadline(Duration::from_millis(20));
        let err = service.check_for_update(&check("1.0.0")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(matches!(
            err,
            Error::Timeout {
                operation: "find_releases",
                ..
            }
        ));
    }
}
