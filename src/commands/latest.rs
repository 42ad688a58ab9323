// Latest command for showing the newest release of a target

use crate::cli::Target;
use crate::commands::check::print_release;
use crate::ui;
use updraft::{LatestRequest, UpdateService};

pub async fn latest(
    service: &UpdateService,
    app: String,
    target: Target,
    prerelease: Option<bool>,
    metadata: bool,
    json: bool,
) -> anyhow::Result<bool> {
    let request = LatestRequest {
        application_id: app,
        platform: target.platform,
        architecture: target.architecture,
        allow_prerelease: prerelease,
        include_metadata: metadata,
    };

    let latest = service.get_latest_version(&request).await?;
    if json {
        ui::json(&latest)?;
        return Ok(latest.is_some());
    }

    match &latest {
        Some(latest) => {
            ui::success(&format!("Latest: {}", latest.latest_version));
            print_release(&latest.release);
        }
        None => ui::dim(&format!(
            "No releases for {} on {}/{}",
            request.application_id, request.platform, request.architecture
        )),
    }
    Ok(latest.is_some())
}
