// Edit command for updating release notes and metadata

use crate::cli::Target;
use crate::commands::{parse_metadata, release_key};
use crate::ui;
use updraft::{ReleaseEdit, UpdateService};

pub struct EditOptions {
    pub notes: Option<String>,
    pub meta: Vec<String>,
    pub unset: Vec<String>,
}

pub async fn edit(
    service: &UpdateService,
    app: String,
    version: String,
    target: Target,
    options: EditOptions,
) -> anyhow::Result<()> {
    let key = release_key(&app, &version, &target)?;
    let edit = ReleaseEdit {
        release_notes: options.notes,
        metadata: parse_metadata(&options.meta)?,
        remove_metadata: options.unset,
    };

    let release = service.edit_release(&key, &edit).await?;
    ui::success(&format!("Updated {}", release.id()));
    Ok(())
}
