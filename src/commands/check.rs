// Check command for answering "is there an update?"

use crate::cli::Target;
use crate::ui;
use updraft::service::OfferedRelease;
use updraft::{UpdateRequest, UpdateService};

pub struct CheckOptions {
    pub prerelease: Option<bool>,
    pub metadata: bool,
    pub json: bool,
}

/// Returns whether an update is available
pub async fn check(
    service: &UpdateService,
    app: String,
    current: String,
    target: Target,
    options: CheckOptions,
) -> anyhow::Result<bool> {
    let mut request = UpdateRequest::new(app, current, target.platform, target.architecture)
        .include_metadata(options.metadata);
    request.allow_prerelease = options.prerelease;

    let decision = service.check_for_update(&request).await?;
    if options.json {
        ui::json(&decision)?;
        return Ok(decision.update_available);
    }

    match &decision.release {
        Some(release) if decision.update_available => {
            let kind = if release.required { "Required update" } else { "Update" };
            ui::action(&format!(
                "{} available: {} → {}",
                kind, decision.current_version, decision.latest_version
            ));
            print_release(release);
        }
        _ => ui::success(&format!("{} is up to date", decision.current_version)),
    }
    Ok(decision.update_available)
}

pub fn print_release(release: &OfferedRelease) {
    ui::status("url", &release.download_url);
    ui::status(
        "checksum",
        &format!("{}:{}", release.checksum_type, release.checksum),
    );
    ui::status("size", &format!("{} bytes", release.file_size));
    ui::status("released", &release.release_date.to_rfc3339());
    if let Some(minimum) = &release.minimum_version {
        ui::status("minimum", minimum);
    }
    if !release.release_notes.is_empty() {
        ui::status("notes", &release.release_notes);
    }
    if let Some(metadata) = &release.metadata {
        for (key, value) in metadata {
            ui::status("meta", &format!("{}={}", key, value));
        }
    }
}
