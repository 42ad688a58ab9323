// CLI module for handling command-line interface

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "updraft")]
#[command(about = "Release catalog and update decisions for self-updating applications")]
#[command(version)]
pub struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Platform and architecture a release targets
#[derive(Args, Debug, Clone)]
pub struct Target {
    #[arg(long)]
    pub platform: String,
    #[arg(long = "arch")]
    pub architecture: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty catalog in the data directory
    Init,
    /// Manage applications
    App {
        #[command(subcommand)]
        command: AppCommands,
    },
    /// Register a new release
    Register(RegisterArgs),
    /// Decide whether a client should update
    Check {
        app: String,
        current: String,
        #[command(flatten)]
        target: Target,
        /// Include pre-releases (defaults to the application's policy)
        #[arg(long)]
        prerelease: Option<bool>,
        /// Include release metadata in the answer
        #[arg(long)]
        metadata: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show the newest release for a target
    Latest {
        app: String,
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        prerelease: Option<bool>,
        #[arg(long)]
        metadata: bool,
        #[arg(long)]
        json: bool,
    },
    /// List releases of an application
    List(ListArgs),
    /// Change the notes or metadata of a release
    Edit {
        app: String,
        version: String,
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        notes: Option<String>,
        /// Set a metadata entry (key=value), repeatable
        #[arg(long = "meta")]
        meta: Vec<String>,
        /// Remove a metadata entry, repeatable
        #[arg(long = "unset")]
        unset: Vec<String>,
    },
    /// Delete a release
    Remove {
        app: String,
        version: String,
        #[command(flatten)]
        target: Target,
    },
    /// Check an artifact against the release checksum
    Verify {
        app: String,
        version: String,
        #[command(flatten)]
        target: Target,
        /// Local artifact to check
        #[arg(long, conflicts_with = "download", required_unless_present = "download")]
        file: Option<PathBuf>,
        /// Fetch the artifact from its download URL
        #[arg(long)]
        download: bool,
    },
}

#[derive(Subcommand)]
pub enum AppCommands {
    /// Register an application
    Add {
        id: String,
        /// Display name (defaults to the id)
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        /// Supported platform, repeatable
        #[arg(long = "platform", required = true)]
        platforms: Vec<String>,
        /// Offer pre-releases unless the client says otherwise
        #[arg(long)]
        prerelease: bool,
        #[arg(long)]
        min_version: Option<String>,
        #[arg(long)]
        max_version: Option<String>,
        /// Suggested polling interval for clients, in seconds
        #[arg(long, default_value_t = updraft::constants::DEFAULT_CHECK_INTERVAL_SECS)]
        interval: u64,
    },
    /// List registered applications
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct RegisterArgs {
    pub app: String,
    pub version: String,
    #[command(flatten)]
    pub target: Target,
    #[arg(long)]
    pub url: String,
    #[arg(long)]
    pub checksum: String,
    /// sha256 (default), sha1 or md5
    #[arg(long, default_value = "")]
    pub checksum_type: String,
    /// Artifact size in bytes
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub size: i64,
    #[arg(long, default_value = "")]
    pub notes: String,
    /// Mark the update as mandatory
    #[arg(long)]
    pub required: bool,
    /// Only clients at or above this version are affected by --required
    #[arg(long)]
    pub min_version: Option<String>,
    /// Metadata entry (key=value), repeatable
    #[arg(long = "meta")]
    pub meta: Vec<String>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ListArgs {
    pub app: String,
    /// Only these platforms, repeatable
    #[arg(long = "platform")]
    pub platforms: Vec<String>,
    #[arg(long = "arch")]
    pub architecture: Option<String>,
    #[arg(long)]
    pub version: Option<String>,
    #[arg(long)]
    pub required: Option<bool>,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub limit: i64,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub offset: i64,
    /// version, release_date, platform, architecture or created_at
    #[arg(long, default_value = "")]
    pub sort: String,
    /// asc or desc
    #[arg(long, default_value = "")]
    pub order: String,
    #[arg(long)]
    pub json: bool,
}
