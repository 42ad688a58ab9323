// Remove command for deleting a release from the catalog

use crate::cli::Target;
use crate::commands::release_key;
use crate::ui;
use updraft::UpdateService;

pub async fn remove(
    service: &UpdateService,
    app: String,
    version: String,
    target: Target,
) -> anyhow::Result<()> {
    let key = release_key(&app, &version, &target)?;
    service.delete_release(&key).await?;
    ui::success(&format!("Removed {}", key));
    Ok(())
}
