// Application entity and its update policy

use crate::catalog::platform::Platform;
use crate::catalog::release::require;
use crate::constants::DEFAULT_CHECK_INTERVAL_SECS;
use crate::error::{Error, Result};
use crate::version::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub platforms: Vec<Platform>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub policy: ApplicationPolicy,
}

/// Per-application rules consulted when deciding which release to offer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationPolicy {
    /// Offer pre-releases when the client does not say either way
    #[serde(default)]
    pub allow_prerelease: bool,
    /// How often clients should poll, in seconds. Clients only.
    #[serde(default = "default_interval")]
    pub update_check_interval_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_version: Option<String>,
}

fn default_interval() -> u64 {
    DEFAULT_CHECK_INTERVAL_SECS
}

impl Default for ApplicationPolicy {
    fn default() -> Self {
        Self {
            allow_prerelease: false,
            update_check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            min_version: None,
            max_version: None,
        }
    }
}

impl ApplicationPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.update_check_interval_secs == 0 {
            return Err(Error::validation(
                "update_check_interval",
                "must be greater than zero",
            ));
        }
        let min = self.min_version.as_deref().map(Version::parse).transpose()?;
        let max = self.max_version.as_deref().map(Version::parse).transpose()?;
        if let (Some(min), Some(max)) = (min, max)
            && min.greater_than(&max)
        {
            return Err(Error::validation(
                "min_version",
                format!("{} is greater than max_version {}", min, max),
            ));
        }
        Ok(())
    }

    /// Whether `version` falls inside the configured bounds (inclusive)
    pub fn permits(&self, version: &Version) -> Result<bool> {
        if let Some(min) = &self.min_version
            && version.less_than(&Version::parse(min)?)
        {
            return Ok(false);
        }
        if let Some(max) = &self.max_version
            && version.greater_than(&Version::parse(max)?)
        {
            return Ok(false);
        }
        Ok(true)
    }

    /// The caller's explicit choice wins; otherwise the policy default applies.
    pub fn resolve_prerelease(&self, requested: Option<bool>) -> bool {
        requested.unwrap_or(self.allow_prerelease)
    }
}

impl Application {
    pub fn new(id: impl Into<String>, name: impl Into<String>, platforms: Vec<Platform>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            platforms,
            policy: ApplicationPolicy::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require("id", &self.id)?;
        require("name", &self.name)?;
        if self.platforms.is_empty() {
            return Err(Error::validation("platforms", "at least one platform is required"));
        }
        self.policy.validate()
    }

    pub fn supports_platform(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }
}
