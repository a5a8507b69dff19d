///
/// This module implements the CLI interface for bucket-publish: command parsing,
/// wiring the AWS clients into a [`Publisher`], and printing the report.
///
/// All pipeline logic lives in [`crate::publish`]; this module is glue.
///
/// ## How To Use
/// - For command-line users: use the installed `bucket-publish` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
use crate::aws::{load_sdk_config, CloudFrontInvalidator, S3Storage};
use crate::fs::LocalFileSystem;
use crate::load_config::load_config;
use crate::publish::Publisher;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for bucket-publish: upload static assets to a bucket.
#[derive(Parser)]
#[clap(
    name = "bucket-publish",
    version,
    about = "Publish local files to an object-storage bucket and invalidate the CDN in front of it"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload the configured files to the target bucket
    Publish {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Keep existing objects under the destination instead of deleting them first
        #[clap(long)]
        no_clean: bool,
    },
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Publish { config, no_clean } => {
            let mut config = load_config(config)?;
            if no_clean {
                config.publish.clean = false;
            }
            tracing::info!(command = "publish", "Starting publish");

            let sdk_config = load_sdk_config(&config.aws).await;
            let storage = S3Storage::from_sdk_config(&sdk_config, &config.aws);
            let invalidator = CloudFrontInvalidator::from_sdk_config(&sdk_config);

            let mut publisher =
                Publisher::new(config.publish, storage, invalidator, LocalFileSystem::new())?;
            for file in &config.files {
                publisher.add_file(file)?;
            }
            for dir in &config.directories {
                publisher.add_directory(dir).await?;
            }

            match publisher.publish().await {
                Ok(report) => {
                    tracing::info!(command = "publish", "Publish complete");
                    let json = serde_json::to_string_pretty(&report)
                        .context("Failed to serialise publish report")?;
                    println!("{json}");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "publish", error = %e, "Publish failed");
                    Err(e.into())
                }
            }
        }
    }
}
