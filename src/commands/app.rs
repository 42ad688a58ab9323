// App commands for registering and listing applications

use crate::ui;
use updraft::{Application, ApplicationPolicy, Platform, UpdateService};

pub struct NewApplication {
    pub id: String,
    pub name: Option<String>,
    pub description: String,
    pub platforms: Vec<String>,
    pub prerelease: bool,
    pub min_version: Option<String>,
    pub max_version: Option<String>,
    pub interval: u64,
}

pub async fn add(service: &UpdateService, new: NewApplication) -> anyhow::Result<()> {
    let platforms = new
        .platforms
        .iter()
        .map(|p| p.parse::<Platform>())
        .collect::<Result<Vec<_>, _>>()?;

    let id = new.id.trim().to_string();
    let mut application = Application::new(id.clone(), new.name.unwrap_or(id), platforms);
    application.description = new.description;
    application.policy = ApplicationPolicy {
        allow_prerelease: new.prerelease,
        update_check_interval_secs: new.interval,
        min_version: new.min_version,
        max_version: new.max_version,
    };

    let application = service.register_application(application).await?;
    ui::success(&format!(
        "Added application {} ({})",
        application.id,
        join_platforms(&application.platforms)
    ));
    Ok(())
}

pub async fn list(service: &UpdateService, json: bool) -> anyhow::Result<()> {
    let applications = service.list_applications().await?;
    if json {
        return ui::json(&applications);
    }
    if applications.is_empty() {
        ui::dim("No applications registered");
        return Ok(());
    }
    for application in &applications {
        ui::action(&format!(
            "{} {} [{}]",
            application.id,
            application.name,
            join_platforms(&application.platforms)
        ));
    }
    Ok(())
}

fn join_platforms(platforms: &[Platform]) -> String {
    platforms
        .iter()
        .map(Platform::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
