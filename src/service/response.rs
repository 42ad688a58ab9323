// Request and response shapes exposed by the update service

use crate::catalog::{Architecture, ChecksumAlgorithm, Platform, Release};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A client asking whether it should update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub application_id: String,
    pub current_version: String,
    pub platform: String,
    pub architecture: String,
    /// None defers to the application's policy
    #[serde(default)]
    pub allow_prerelease: Option<bool>,
    #[serde(default)]
    pub include_metadata: bool,
}

impl UpdateRequest {
    pub fn new(
        application_id: impl Into<String>,
        current_version: impl Into<String>,
        platform: impl Into<String>,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            application_id: application_id.into(),
            current_version: current_version.into(),
            platform: platform.into(),
            architecture: architecture.into(),
            ..Default::default()
        }
    }

    pub fn allow_prerelease(mut self, allow: bool) -> Self {
        self.allow_prerelease = Some(allow);
        self
    }

    pub fn include_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }
}

/// Lookup of the newest release for one target, with no current version
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatestRequest {
    pub application_id: String,
    pub platform: String,
    pub architecture: String,
    #[serde(default)]
    pub allow_prerelease: Option<bool>,
    #[serde(default)]
    pub include_metadata: bool,
}

impl From<&UpdateRequest> for LatestRequest {
    fn from(request: &UpdateRequest) -> Self {
        Self {
            application_id: request.application_id.clone(),
            platform: request.platform.clone(),
            architecture: request.architecture.clone(),
            allow_prerelease: request.allow_prerelease,
            include_metadata: request.include_metadata,
        }
    }
}

/// Artifact details of the release being offered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferedRelease {
    pub download_url: String,
    pub checksum: String,
    pub checksum_type: ChecksumAlgorithm,
    pub file_size: u64,
    pub release_notes: String,
    pub release_date: DateTime<Utc>,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
}

impl OfferedRelease {
    pub fn from_release(release: Release, required: bool, include_metadata: bool) -> Self {
        Self {
            download_url: release.download_url,
            checksum: release.checksum,
            checksum_type: release.checksum_type,
            file_size: release.file_size,
            release_notes: release.release_notes,
            release_date: release.release_date,
            required,
            minimum_version: release.minimum_version,
            metadata: include_metadata.then_some(release.metadata),
        }
    }
}

/// Answer to an update check.
///
/// When no update is available `latest_version` echoes the current version
/// and no artifact fields are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateDecision {
    pub update_available: bool,
    pub latest_version: String,
    pub current_version: String,
    #[serde(flatten)]
    pub release: Option<OfferedRelease>,
}

impl UpdateDecision {
    pub fn no_update(current_version: impl Into<String>) -> Self {
        let current_version = current_version.into();
        Self {
            update_available: false,
            latest_version: current_version.clone(),
            current_version,
            release: None,
        }
    }

    pub fn offer(
        current_version: impl Into<String>,
        latest_version: String,
        release: OfferedRelease,
    ) -> Self {
        Self {
            update_available: true,
            latest_version,
            current_version: current_version.into(),
            release: Some(release),
        }
    }

    pub fn is_required(&self) -> bool {
        self.release.as_ref().is_some_and(|r| r.required)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestVersion {
    pub latest_version: String,
    #[serde(flatten)]
    pub release: OfferedRelease,
}

/// Listing row: a release without its notes and metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseSummary {
    pub id: String,
    pub application_id: String,
    pub version: String,
    pub platform: Platform,
    pub architecture: Architecture,
    pub download_url: String,
    pub checksum: String,
    pub checksum_type: ChecksumAlgorithm,
    pub file_size: u64,
    pub release_date: DateTime<Utc>,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_version: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Release> for ReleaseSummary {
    fn from(release: Release) -> Self {
        Self {
            id: release.id(),
            application_id: release.application_id,
            version: release.version,
            platform: release.platform,
            architecture: release.architecture,
            download_url: release.download_url,
            checksum: release.checksum,
            checksum_type: release.checksum_type,
            file_size: release.file_size,
            release_date: release.release_date,
            required: release.required,
            minimum_version: release.minimum_version,
            created_at: release.created_at,
        }
    }
}
