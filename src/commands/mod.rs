// Command implementations for the updraft binary

pub mod app;
pub mod check;
pub mod edit;
pub mod init;
pub mod latest;
pub mod list;
pub mod register;
pub mod remove;
pub mod verify;

use crate::cli::Target;
use std::collections::BTreeMap;
use updraft::config::Config;
use updraft::{Architecture, Platform, ReleaseKey, UpdateService, open_store};

/// Service over the configured store, with the configured storage deadline
pub fn service(config: &Config) -> UpdateService {
    let service = UpdateService::new(open_store(config));
    match config.storage_timeout {
        Some(timeout) => service.with_deadline(timeout),
        None => service,
    }
}

pub fn release_key(app: &str, version: &str, target: &Target) -> anyhow::Result<ReleaseKey> {
    Ok(ReleaseKey::new(
        app.trim(),
        version.trim(),
        target.platform.parse::<Platform>()?,
        target.architecture.parse::<Architecture>()?,
    ))
}

/// Parse repeated `key=value` arguments
pub fn parse_metadata(entries: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    entries
        .iter()
        .map(|entry| {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Invalid metadata '{}', expected key=value", entry))?;
            let key = key.trim();
            if key.is_empty() {
                anyhow::bail!("Invalid metadata '{}', key is empty", entry);
            }
            Ok((key.to_string(), value.trim().to_string()))
        })
        .collect()
}
