// List command for browsing the release catalog

use crate::cli::ListArgs;
use crate::ui;
use updraft::{ReleaseFilter, UpdateService};

pub async fn list(service: &UpdateService, args: ListArgs) -> anyhow::Result<()> {
    let heading = format!("Releases of {}", args.app.trim());
    let filter = ReleaseFilter {
        application_id: args.app,
        platform: None,
        architecture: args.architecture,
        version: args.version,
        required: args.required,
        platforms: args.platforms,
        limit: args.limit,
        offset: args.offset,
        sort_by: args.sort,
        sort_order: args.order,
    };

    let page = service.list_releases(filter).await?;
    if args.json {
        return ui::json(&page);
    }

    if page.items.is_empty() {
        ui::dim("No releases found");
        return Ok(());
    }
    ui::header(&heading);
    for release in &page.items {
        let required = if release.required { " (required)" } else { "" };
        ui::action(&format!(
            "{} {}/{} {}{}",
            release.version,
            release.platform,
            release.architecture,
            release.release_date.format("%Y-%m-%d"),
            required
        ));
    }
    ui::dim(&format!(
        "Page {} · {} of {} release(s){}",
        page.page,
        page.items.len(),
        page.total_count,
        if page.has_more { " · more available" } else { "" }
    ));
    Ok(())
}
