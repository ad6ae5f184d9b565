//! # wp2grav CLI interface
//!
//! This module implements the full CLI surface for wp2grav: command
//! parsing, argument exposure and per-command orchestration. All mapping
//! and export logic lives in the [`wp2grav-core`] crate; this module is
//! strictly CLI glue.
//!
//! ## Features
//! - Entry struct [`Cli`] defines the user-facing options and subcommands.
//! - One subcommand per export target, plus `all` for the full run.
//! - Async entrypoint [`run`] for programmatic invocation and integration
//!   testing.
//!
//! ## How To Use
//! - For command-line users: run the installed `wp2grav` binary with
//!   `--help`.
//! - For programmatic/integration use: call [`run`] with a constructed
//!   [`Cli`].
//!
//! [`wp2grav-core`]: ../../wp2grav_core/

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use wp2grav_core::export;

use crate::load_config::load_config;
use crate::sink::DirSink;
use crate::source::JsonSnapshot;

/// CLI for wp2grav: export a WordPress content snapshot as a Grav site
/// skeleton.
#[derive(Parser)]
#[clap(
    name = "wp2grav",
    version,
    about = "Export a WordPress snapshot as Grav groups, accounts, blueprints, pages and media"
)]
pub struct Cli {
    /// Path to the YAML config file
    #[clap(long, global = true, default_value = "wp2grav.yaml")]
    pub config: PathBuf,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export WordPress roles as Grav groups (config/groups.yaml)
    Roles,
    /// Export WordPress users as Grav account files
    Users,
    /// Export post types as theme blueprints and templates
    PostTypes,
    /// Export posts as Grav pages, relocating referenced media
    Posts {
        /// Export only the entity with this id
        #[clap(long)]
        id: Option<u64>,
    },
    /// Export blog information as config/site.yaml
    Site,
    /// Run every export target in order
    All,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let config = load_config(&cli.config)?;
    let settings = config.export_settings();
    settings.trace_loaded();

    let source = JsonSnapshot::load(&config.source.snapshot)?;
    let sink = DirSink::dated(&config.export.output_dir)?;
    tracing::info!(run_root = %sink.root().display(), "Export run root created");

    match cli.command {
        Commands::Roles => {
            let report = export::export_roles(&source, &sink).await?;
            println!("Save complete! Exported {} groups", report.groups.len());
        }
        Commands::Users => {
            let report = export::export_users(&source, &sink).await?;
            println!(
                "Save complete! Exported {} user accounts",
                report.accounts.len()
            );
        }
        Commands::PostTypes => {
            let report = export::export_post_types(&source, &sink, &settings).await?;
            println!(
                "Save complete! Exported {} post types",
                report.post_types.len()
            );
        }
        Commands::Posts { id } => {
            let report = export::export_posts(&source, &sink, &settings, id).await?;
            println!(
                "Save complete! Exported {} pages, copied {} media assets ({} entities skipped)",
                report.pages.len(),
                report.assets,
                report.skipped
            );
        }
        Commands::Site => {
            let report = export::export_site(&source, &sink).await?;
            println!("Save complete! Exported site config for '{}'", report.title);
        }
        Commands::All => {
            let report = export::export_all(&source, &sink, &settings).await?;
            println!(
                "Save complete! Exported {} groups, {} accounts, {} post types, {} pages ({} media assets)",
                report.roles.groups.len(),
                report.users.accounts.len(),
                report.post_types.post_types.len(),
                report.posts.pages.len(),
                report.posts.assets
            );
        }
    }

    println!("Export written to {}", sink.root().display());
    Ok(())
}
