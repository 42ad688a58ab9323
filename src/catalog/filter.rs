// Release listing filter: criteria, pagination and sort

use crate::catalog::platform::{Architecture, Platform};
use crate::catalog::release::{Release, require};
use crate::constants::DEFAULT_PAGE_SIZE;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Version,
    ReleaseDate,
    Platform,
    Architecture,
    CreatedAt,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Version,
        SortField::ReleaseDate,
        SortField::Platform,
        SortField::Architecture,
        SortField::CreatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Version => "version",
            SortField::ReleaseDate => "release_date",
            SortField::Platform => "platform",
            SortField::Architecture => "architecture",
            SortField::CreatedAt => "created_at",
        }
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| {
                Error::validation(
                    "sort_by",
                    format!(
                        "unknown sort field '{}'. Allowed: {}",
                        s,
                        SortField::ALL.map(|f| f.as_str()).join(", ")
                    ),
                )
            })
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(Error::validation(
                "sort_order",
                format!("must be 'asc' or 'desc', got '{}'", other),
            )),
        }
    }
}

/// A listing query. Build it from request input, call [`validate`] and
/// [`normalize`], then hand it to a store.
///
/// [`validate`]: ReleaseFilter::validate
/// [`normalize`]: ReleaseFilter::normalize
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFilter {
    pub application_id: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub sort_by: String,
    #[serde(default)]
    pub sort_order: String,
}

impl ReleaseFilter {
    pub fn for_application(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            ..Default::default()
        }
    }

    /// Unpaginated filter selecting every release of one application target
    pub fn for_target(
        application_id: impl Into<String>,
        platform: Platform,
        architecture: Architecture,
    ) -> Self {
        Self {
            application_id: application_id.into(),
            platform: Some(platform.to_string()),
            architecture: Some(architecture.to_string()),
            limit: i64::MAX,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        require("application_id", &self.application_id)?;
        if self.limit < 0 {
            return Err(Error::validation("limit", "must be >= 0"));
        }
        if self.offset < 0 {
            return Err(Error::validation("offset", "must be >= 0"));
        }
        if !self.sort_order.is_empty() {
            self.sort_order.parse::<SortOrder>()?;
        }
        if !self.sort_by.is_empty() {
            self.sort_by.parse::<SortField>()?;
        }
        for platform in &self.platforms {
            Platform::parse_field(platform, "platforms")?;
        }
        Ok(())
    }

    /// Trim and lower-case names and fill pagination and sort defaults.
    /// Idempotent.
    pub fn normalize(&mut self) {
        self.application_id = self.application_id.trim().to_string();
        self.platform = normalize_name(self.platform.take());
        self.architecture = normalize_name(self.architecture.take());
        self.version = self
            .version
            .take()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        self.platforms = self
            .platforms
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        self.sort_by = self.sort_by.trim().to_lowercase();
        self.sort_order = self.sort_order.trim().to_lowercase();

        if self.limit == 0 {
            self.limit = DEFAULT_PAGE_SIZE;
        }
        if self.sort_by.is_empty() {
            self.sort_by = SortField::ReleaseDate.as_str().to_string();
        }
        if self.sort_order.is_empty() {
            self.sort_order = "desc".to_string();
        }
    }

    /// Sort field of a normalized filter
    pub fn sort_field(&self) -> SortField {
        self.sort_by.parse().unwrap_or(SortField::ReleaseDate)
    }

    /// Sort order of a normalized filter
    pub fn order(&self) -> SortOrder {
        self.sort_order.parse().unwrap_or(SortOrder::Desc)
    }

    /// Criteria match, ignoring pagination
    pub fn matches(&self, release: &Release) -> bool {
        if release.application_id != self.application_id {
            return false;
        }
        if let Some(platform) = &self.platform
            && !name_matches(platform, release.platform)
        {
            return false;
        }
        if let Some(arch) = &self.architecture
            && !Architecture::from_str(arch).is_ok_and(|a| a == release.architecture)
        {
            return false;
        }
        if let Some(version) = &self.version
            && &release.version != version
        {
            return false;
        }
        if let Some(required) = self.required
            && release.required != required
        {
            return false;
        }
        if !self.platforms.is_empty()
            && !self.platforms.iter().any(|p| name_matches(p, release.platform))
        {
            return false;
        }
        true
    }
}

fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_lowercase()).filter(|n| !n.is_empty())
}

fn name_matches(name: &str, platform: Platform) -> bool {
    Platform::from_str(name).is_ok_and(|p| p == platform)
}

/// One page of listing results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Describe `items` as the page a normalized filter selected out of `total_count`
    pub fn from_filter(items: Vec<T>, total_count: usize, filter: &ReleaseFilter) -> Self {
        let page_size = usize::try_from(filter.limit.max(1)).unwrap_or(DEFAULT_PAGE_SIZE as usize);
        let offset = usize::try_from(filter.offset.max(0)).unwrap_or(0);
        let has_more = offset + items.len() < total_count;
        Self {
            page: offset / page_size + 1,
            page_size,
            total_count,
            has_more,
            items,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
            has_more: self.has_more,
        }
    }
}
