// Supported target platforms and CPU architectures

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    Darwin,
    Android,
    Ios,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Windows,
        Platform::Linux,
        Platform::Darwin,
        Platform::Android,
        Platform::Ios,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Darwin => "darwin",
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }

    /// Parse a platform name, reporting failures against `field`.
    pub fn parse_field(value: &str, field: &'static str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "windows" | "win" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "darwin" | "macos" | "osx" => Ok(Platform::Darwin),
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            "" => Err(Error::validation(field, "is required")),
            other => Err(Error::validation(
                field,
                format!(
                    "unsupported platform '{}'. Supported platforms: {}",
                    other,
                    supported_list(&Platform::ALL.map(|p| p.as_str()))
                ),
            )),
        }
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_field(s, "platform")
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Architecture {
    #[serde(rename = "amd64")]
    Amd64,
    #[serde(rename = "arm64")]
    Arm64,
    #[serde(rename = "386")]
    I386,
    #[serde(rename = "arm")]
    Arm,
}

impl Architecture {
    pub const ALL: [Architecture; 4] = [
        Architecture::Amd64,
        Architecture::Arm64,
        Architecture::I386,
        Architecture::Arm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Amd64 => "amd64",
            Architecture::Arm64 => "arm64",
            Architecture::I386 => "386",
            Architecture::Arm => "arm",
        }
    }

    pub fn parse_field(value: &str, field: &'static str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "amd64" | "x86_64" | "x64" => Ok(Architecture::Amd64),
            "arm64" | "aarch64" => Ok(Architecture::Arm64),
            "386" | "i386" | "x86" => Ok(Architecture::I386),
            "arm" | "armv7" => Ok(Architecture::Arm),
            "" => Err(Error::validation(field, "is required")),
            other => Err(Error::validation(
                field,
                format!(
                    "unsupported architecture '{}'. Supported architectures: {}",
                    other,
                    supported_list(&Architecture::ALL.map(|a| a.as_str()))
                ),
            )),
        }
    }
}

impl FromStr for Architecture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_field(s, "architecture")
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn supported_list(names: &[&str]) -> String {
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parse_is_case_insensitive() {
        assert_eq!("Linux".parse::<Platform>().unwrap(), Platform::Linux);
        assert_eq!(" WINDOWS ".parse::<Platform>().unwrap(), Platform::Windows);
        assert_eq!("macos".parse::<Platform>().unwrap(), Platform::Darwin);
    }

    #[test]
    fn test_platform_rejects_unknown() {
        let err = "beos".parse::<Platform>().unwrap_err();
        assert_eq!(err.field(), Some("platform"));
        assert!(err.to_string().contains("beos"));
        assert!("".parse::<Platform>().is_err());
    }

    #[test]
    fn test_architecture_aliases() {
        assert_eq!("x86_64".parse::<Architecture>().unwrap(), Architecture::Amd64);
        assert_eq!("AARCH64".parse::<Architecture>().unwrap(), Architecture::Arm64);
        assert_eq!("386".parse::<Architecture>().unwrap(), Architecture::I386);
        assert!("riscv64".parse::<Architecture>().is_err());
    }

    #[test]
    fn test_display_matches_serde_tag() {
        for arch in Architecture::ALL {
            let json = serde_json::to_string(&arch).unwrap();
            assert_eq!(json, format!("\"{}\"", arch));
        }
        for platform in Platform::ALL {
            let json = serde_json::to_string(&platform).unwrap();
            assert_eq!(json, format!("\"{}\"", platform));
        }
    }
}
