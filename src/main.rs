mod cli;
mod commands;
mod http;
mod ui;

use clap::Parser;
use cli::{AppCommands, Cli, Commands};
use std::process::ExitCode;
use updraft::config::Config;

/// Negative outcome: no update available or checksum mismatch
const EXIT_NEGATIVE: u8 = 1;
const EXIT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli.command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_NEGATIVE),
        Err(e) => {
            match e.downcast_ref::<updraft::Error>() {
                Some(core) => ui::error(&format!("[{}] {:#}", core.kind(), e)),
                None => ui::error(&format!("{:#}", e)),
            }
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<bool> {
    let config = Config::load()?;
    log::debug!(
        "Using {:?} store in {}",
        config.store,
        config.data_dir().display()
    );
    let service = commands::service(&config);

    match command {
        Commands::Init => commands::init::init(&config)?,
        Commands::App { command } => match command {
            AppCommands::Add {
                id,
                name,
                description,
                platforms,
                prerelease,
                min_version,
                max_version,
                interval,
            } => {
                let new = commands::app::NewApplication {
                    id,
                    name,
                    description,
                    platforms,
                    prerelease,
                    min_version,
                    max_version,
                    interval,
                };
                commands::app::add(&service, new).await?
            }
            AppCommands::List { json } => commands::app::list(&service, json).await?,
        },
        Commands::Register(args) => commands::register::register(&service, args).await?,
        Commands::Check {
            app,
            current,
            target,
            prerelease,
            metadata,
            json,
        } => {
            let options = commands::check::CheckOptions {
                prerelease,
                metadata,
                json,
            };
            return commands::check::check(&service, app, current, target, options).await;
        }
        Commands::Latest {
            app,
            target,
            prerelease,
            metadata,
            json,
        } => {
            return commands::latest::latest(&service, app, target, prerelease, metadata, json)
                .await;
        }
        Commands::List(args) => commands::list::list(&service, args).await?,
        Commands::Edit {
            app,
            version,
            target,
            notes,
            meta,
            unset,
        } => {
            let options = commands::edit::EditOptions { notes, meta, unset };
            commands::edit::edit(&service, app, version, target, options).await?
        }
        Commands::Remove {
            app,
            version,
            target,
        } => commands::remove::remove(&service, app, version, target).await?,
        Commands::Verify {
            app,
            version,
            target,
            file,
            download,
        } => {
            let source = match file {
                Some(path) if !download => commands::verify::ArtifactSource::File(path),
                _ => commands::verify::ArtifactSource::Download,
            };
            return commands::verify::verify(&service, &config, app, version, target, source)
                .await;
        }
    }
    Ok(true)
}
