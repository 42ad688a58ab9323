// Release registration requests and post-registration edits

use crate::catalog::checksum::ChecksumAlgorithm;
use crate::catalog::platform::{Architecture, Platform};
use crate::catalog::release::{Release, require, validate_download_url};
use crate::error::{Error, Result};
use crate::version::Version;
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Incoming request to add a release to the catalog.
///
/// Fields are kept as the client sent them; [`into_release`] cleans them up,
/// validates, and produces a typed [`Release`].
///
/// [`into_release`]: RegisterReleaseRequest::into_release
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterReleaseRequest {
    pub application_id: String,
    pub version: String,
    pub platform: String,
    pub architecture: String,
    pub download_url: String,
    pub checksum: String,
    /// Empty means sha256
    #[serde(default)]
    pub checksum_type: String,
    #[serde(default)]
    pub file_size: i64,
    #[serde(default)]
    pub release_notes: String,
    #[serde(default)]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub minimum_version: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl RegisterReleaseRequest {
    pub fn normalize(&mut self) {
        self.application_id = self.application_id.trim().to_string();
        self.version = self.version.trim().to_string();
        self.platform = self.platform.trim().to_lowercase();
        self.architecture = self.architecture.trim().to_lowercase();
        self.download_url = self.download_url.trim().to_string();
        self.checksum = self.checksum.trim().to_lowercase();
        self.checksum_type = self.checksum_type.trim().to_lowercase();
        self.minimum_version = self
            .minimum_version
            .take()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
    }

    /// Same rules as [`Release::validate`], applied to the raw request
    pub fn validate(&self) -> Result<()> {
        require("application_id", &self.application_id)?;
        require("version", &self.version)?;
        Version::parse(&self.version)?;
        Platform::parse_field(&self.platform, "platform")?;
        Architecture::parse_field(&self.architecture, "architecture")?;
        validate_download_url(&self.download_url)?;
        require("checksum", &self.checksum)?;
        self.checksum_algorithm()?;
        if self.file_size < 0 {
            return Err(Error::validation("file_size", "must be >= 0"));
        }
        if let Some(minimum) = &self.minimum_version {
            Version::parse(minimum)?;
        }
        Ok(())
    }

    fn checksum_algorithm(&self) -> Result<ChecksumAlgorithm> {
        if self.checksum_type.is_empty() {
            return Ok(ChecksumAlgorithm::default());
        }
        self.checksum_type.parse()
    }

    /// Normalize, validate and build the release. Does not check uniqueness.
    pub fn into_release(mut self, now: DateTime<Utc>) -> Result<Release> {
        self.normalize();
        self.validate()?;

        let checksum_type = self.checksum_algorithm()?;
        let release = Release {
            platform: self.platform.parse()?,
            architecture: self.architecture.parse()?,
            file_size: u64::try_from(self.file_size)
                .map_err(|_| Error::validation("file_size", "must be >= 0"))?,
            release_date: self.release_date.unwrap_or(now),
            application_id: self.application_id,
            version: self.version,
            download_url: self.download_url,
            checksum: self.checksum,
            checksum_type,
            release_notes: self.release_notes,
            required: self.required,
            minimum_version: self.minimum_version,
            metadata: self.metadata,
            created_at: now,
            updated_at: now,
        };
        release.validate()?;
        if !release.checksum_type.is_recommended() {
            warn!(
                "Release {} uses {} checksums; sha256 is recommended for new releases",
                release.id(),
                release.checksum_type
            );
        }
        Ok(release)
    }
}

/// The fields that may change after a release is registered
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseEdit {
    #[serde(default)]
    pub release_notes: Option<String>,
    /// Entries to insert or overwrite
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub remove_metadata: Vec<String>,
}

impl ReleaseEdit {
    pub fn is_empty(&self) -> bool {
        self.release_notes.is_none() && self.metadata.is_empty() && self.remove_metadata.is_empty()
    }

    pub fn apply(&self, release: &mut Release, now: DateTime<Utc>) {
        if let Some(notes) = &self.release_notes {
            release.release_notes = notes.clone();
        }
        for key in &self.remove_metadata {
            release.metadata.remove(key);
        }
        release
            .metadata
            .extend(self.metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
        release.updated_at = now;
    }
}
