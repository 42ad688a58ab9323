// Verify command for checking an artifact against its recorded checksum

use crate::cli::Target;
use crate::commands::release_key;
use crate::{http, ui};
use anyhow::Context;
use log::debug;
use std::path::PathBuf;
use updraft::UpdateService;
use updraft::config::Config;

/// Where the artifact bytes come from
pub enum ArtifactSource {
    File(PathBuf),
    Download,
}

/// Returns whether the checksum matched
pub async fn verify(
    service: &UpdateService,
    config: &Config,
    app: String,
    version: String,
    target: Target,
    source: ArtifactSource,
) -> anyhow::Result<bool> {
    let key = release_key(&app, &version, &target)?;
    let release = service.get_release(&key).await?;

    let data = match source {
        ArtifactSource::File(path) => std::fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        ArtifactSource::Download => {
            let pb = ui::spinner(&format!("Downloading {}", release.download_url));
            match http::fetch_bytes(&release.download_url, &config.user_agent).await {
                Ok(data) => {
                    ui::finish_spinner_success(&pb, &format!("Downloaded {} bytes", data.len()));
                    data
                }
                Err(e) => {
                    ui::finish_spinner_error(&pb, "Download failed");
                    return Err(e);
                }
            }
        }
    };
    debug!("Read {} bytes for {}", data.len(), key);

    if release.file_size > 0 && data.len() as u64 != release.file_size {
        ui::warning(&format!(
            "Size mismatch: expected {} bytes, got {}",
            release.file_size,
            data.len()
        ));
    }

    let matches = service.verify_artifact(&key, &data).await?;
    if matches {
        ui::success(&format!("{} {} checksum verified", key, release.checksum_type));
    } else {
        ui::error(&format!("{} {} checksum mismatch", key, release.checksum_type));
    }
    Ok(matches)
}
