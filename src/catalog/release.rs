// Release entity: one downloadable artifact for one application build

use crate::catalog::checksum::{self, ChecksumAlgorithm};
use crate::catalog::platform::{Architecture, Platform};
use crate::error::{Error, Result};
use crate::version::Version;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Composite key identifying a release within the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReleaseKey {
    pub application_id: String,
    pub version: String,
    pub platform: Platform,
    pub architecture: Architecture,
}

impl ReleaseKey {
    pub fn new(
        application_id: impl Into<String>,
        version: impl Into<String>,
        platform: Platform,
        architecture: Architecture,
    ) -> Self {
        Self {
            application_id: application_id.into(),
            version: version.into(),
            platform,
            architecture,
        }
    }
}

impl fmt::Display for ReleaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}/{}-{}",
            self.application_id, self.version, self.platform, self.architecture
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub application_id: String,
    pub version: String,
    pub platform: Platform,
    pub architecture: Architecture,
    pub download_url: String,
    pub checksum: String,
    #[serde(default, deserialize_with = "checksum::deserialize_stored_tag")]
    pub checksum_type: ChecksumAlgorithm,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub release_notes: String,
    pub release_date: DateTime<Utc>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_version: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    // Tables go last so the TOML catalog keeps scalar keys first
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Release {
    pub fn key(&self) -> ReleaseKey {
        ReleaseKey::new(
            self.application_id.clone(),
            self.version.clone(),
            self.platform,
            self.architecture,
        )
    }

    /// String form of the composite key
    pub fn id(&self) -> String {
        self.key().to_string()
    }

    pub fn parsed_version(&self) -> Result<Version> {
        Ok(Version::parse(&self.version)?)
    }

    /// Check structural validity. Stops at the first failing field.
    pub fn validate(&self) -> Result<()> {
        require("application_id", &self.application_id)?;
        require("version", &self.version)?;
        Version::parse(&self.version)?;
        if let Some(minimum) = &self.minimum_version {
            Version::parse(minimum)?;
        }
        validate_download_url(&self.download_url)?;
        require("checksum", &self.checksum)?;
        Ok(())
    }

    pub fn matches_target(&self, platform: Platform, architecture: Architecture) -> bool {
        self.platform == platform && self.architecture == architecture
    }

    /// Whether this release targets the given platform and architecture names.
    /// Names that are not supported never match.
    pub fn is_compatible_with(&self, platform: &str, architecture: &str) -> bool {
        match (platform.parse::<Platform>(), architecture.parse::<Architecture>()) {
            (Ok(platform), Ok(architecture)) => self.matches_target(platform, architecture),
            _ => false,
        }
    }

    pub fn is_newer_than(&self, other: &Release) -> Result<bool> {
        Ok(self.parsed_version()?.greater_than(&other.parsed_version()?))
    }

    /// Whether a client on `current_version` is inside this release's
    /// minimum-version gate. Releases without a gate admit everyone.
    pub fn meets_minimum_version(&self, current_version: &str) -> Result<bool> {
        let Some(minimum) = &self.minimum_version else {
            return Ok(true);
        };
        let minimum = Version::parse(minimum)?;
        let current = Version::parse(current_version)?;
        Ok(current.greater_or_equal(&minimum))
    }

    pub fn verify_checksum(&self, data: &[u8]) -> bool {
        checksum::verify_checksum(data, &self.checksum, self.checksum_type)
    }
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    Ok(())
}

/// Download URLs must be absolute http(s) URLs with a host
pub fn validate_download_url(url: &str) -> Result<()> {
    require("download_url", url)?;
    let parsed = Url::parse(url).map_err(|e| {
        Error::validation("download_url", format!("'{}' is not a valid URL: {}", url, e))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::validation(
            "download_url",
            format!("unsupported scheme '{}', expected http or https", parsed.scheme()),
        ));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(Error::validation("download_url", "URL has no host"));
    }
    Ok(())
}
