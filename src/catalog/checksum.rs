// Checksum algorithms and artifact digest verification

use crate::error::{Error, Result};
use log::warn;
use md5::Md5;
use serde::{Deserialize, Deserializer, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Digest algorithms a release checksum may be declared with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    #[default]
    Sha256,
    Md5,
    Sha1,
}

impl ChecksumAlgorithm {
    pub const ALL: [ChecksumAlgorithm; 3] = [
        ChecksumAlgorithm::Sha256,
        ChecksumAlgorithm::Md5,
        ChecksumAlgorithm::Sha1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Sha256 => "sha256",
            ChecksumAlgorithm::Md5 => "md5",
            ChecksumAlgorithm::Sha1 => "sha1",
        }
    }

    /// Only sha256 should be used for new releases
    pub fn is_recommended(&self) -> bool {
        matches!(self, ChecksumAlgorithm::Sha256)
    }

    /// Length of the hex-encoded digest
    pub fn hex_len(&self) -> usize {
        match self {
            ChecksumAlgorithm::Sha256 => 64,
            ChecksumAlgorithm::Md5 => 32,
            ChecksumAlgorithm::Sha1 => 40,
        }
    }

    /// Map a tag to an algorithm, falling back to the strong default for
    /// tags this build does not know.
    pub fn from_tag_or_default(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|_| {
            warn!(
                "Unknown checksum algorithm '{}', using {}",
                tag,
                ChecksumAlgorithm::default()
            );
            ChecksumAlgorithm::default()
        })
    }
}

/// Serde hook for stored releases: an algorithm tag from a newer writer
/// degrades to the default instead of failing the whole catalog.
pub fn deserialize_stored_tag<'de, D>(
    deserializer: D,
) -> std::result::Result<ChecksumAlgorithm, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = String::deserialize(deserializer)?;
    if tag.trim().is_empty() {
        return Ok(ChecksumAlgorithm::default());
    }
    Ok(ChecksumAlgorithm::from_tag_or_default(&tag))
}

impl FromStr for ChecksumAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sha256" => Ok(ChecksumAlgorithm::Sha256),
            "md5" => Ok(ChecksumAlgorithm::Md5),
            "sha1" => Ok(ChecksumAlgorithm::Sha1),
            other => Err(Error::validation(
                "checksum_type",
                format!(
                    "unsupported algorithm '{}'. Supported algorithms: {}",
                    other,
                    ChecksumAlgorithm::ALL.map(|a| a.as_str()).join(", ")
                ),
            )),
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn hex_digest<D: Digest>(data: &[u8]) -> String {
    hex::encode(D::digest(data))
}

/// Compute the lower-case hex digest of `data`
pub fn compute_checksum(data: &[u8], algorithm: ChecksumAlgorithm) -> String {
    match algorithm {
        ChecksumAlgorithm::Sha256 => hex_digest::<Sha256>(data),
        ChecksumAlgorithm::Md5 => hex_digest::<Md5>(data),
        ChecksumAlgorithm::Sha1 => hex_digest::<Sha1>(data),
    }
}

/// Recompute the digest of `data` and compare it to `expected`, ignoring case
pub fn verify_checksum(data: &[u8], expected: &str, algorithm: ChecksumAlgorithm) -> bool {
    compute_checksum(data, algorithm).eq_ignore_ascii_case(expected.trim())
}

/// Verify against a raw algorithm tag, as stored by older catalogs
pub fn verify_checksum_tagged(data: &[u8], expected: &str, tag: &str) -> bool {
    verify_checksum(data, expected, ChecksumAlgorithm::from_tag_or_default(tag))
}
