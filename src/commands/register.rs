// Register command for adding a release to the catalog

use crate::cli::RegisterArgs;
use crate::commands::parse_metadata;
use crate::ui;
use updraft::{RegisterReleaseRequest, UpdateService};

pub async fn register(service: &UpdateService, args: RegisterArgs) -> anyhow::Result<()> {
    let request = RegisterReleaseRequest {
        application_id: args.app,
        version: args.version,
        platform: args.target.platform,
        architecture: args.target.architecture,
        download_url: args.url,
        checksum: args.checksum,
        checksum_type: args.checksum_type,
        file_size: args.size,
        release_notes: args.notes,
        release_date: None,
        required: args.required,
        minimum_version: args.min_version,
        metadata: parse_metadata(&args.meta)?,
    };

    let release = service.register_release(request).await?;
    if args.json {
        return ui::json(&release);
    }

    ui::success(&format!("Registered {}", release.id()));
    if !release.checksum_type.is_recommended() {
        ui::warning(&format!(
            "{} is accepted for compatibility; prefer sha256 for new releases",
            release.checksum_type
        ));
    }
    Ok(())
}
