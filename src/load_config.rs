/// `load_config` module: Loads a static YAML publish config into strongly-typed structs.
///
/// This module is the only place where user-supplied YAML is parsed. It maps the
/// file onto a [`PublishConfig`] plus the list of files and directories to stage.
/// Secrets never live in the file: AWS credentials come from the environment
/// (optionally a `.env` file) through the standard provider chain.
///
/// # Errors
/// All errors in this module use `anyhow::Error` for context-rich diagnostics,
/// and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::aws::AwsSettings;
use crate::properties::PropertyRule;
use crate::publish::{Invalidation, PublishConfig, DEFAULT_INVALIDATION_PATH};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    bucket: String,
    #[serde(default)]
    destination: String,
    #[serde(default = "default_clean")]
    clean: bool,
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    properties: Vec<PropertyRule>,
    #[serde(default)]
    files: Vec<PathBuf>,
    #[serde(default)]
    directories: Vec<PathBuf>,
    #[serde(default)]
    invalidation: Option<InvalidationSection>,
    #[serde(default)]
    aws: AwsSettings,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InvalidationSection {
    distribution_id: String,
    #[serde(default = "default_invalidation_paths")]
    paths: Vec<String>,
}

fn default_clean() -> bool {
    true
}

fn default_invalidation_paths() -> Vec<String> {
    vec![DEFAULT_INVALIDATION_PATH.to_string()]
}

/// Everything the CLI needs for one publish run.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub publish: PublishConfig,
    /// Registered one by one, under their base names.
    pub files: Vec<PathBuf>,
    /// Registered recursively.
    pub directories: Vec<PathBuf>,
    pub aws: AwsSettings,
}

/// Loads a static YAML config file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = fs::read_to_string(path_ref)
        .map_err(|e| {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            e
        })
        .with_context(|| format!("Failed to read config file {:?}", path_ref))?;

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if raw.bucket.trim().is_empty() {
        error!(config_path = ?path_ref, "Config has an empty bucket name");
        anyhow::bail!("bucket must not be empty");
    }

    let invalidation = match raw.invalidation {
        Some(section) => {
            if section.distribution_id.trim().is_empty() {
                anyhow::bail!("invalidation.distribution_id must not be empty");
            }
            if section.paths.is_empty() {
                anyhow::bail!("invalidation.paths must list at least one path");
            }
            Invalidation::Enabled {
                distribution_id: section.distribution_id,
                paths: section.paths,
            }
        }
        None => Invalidation::Disabled,
    };

    let publish = PublishConfig {
        bucket: raw.bucket,
        destination: raw.destination,
        clean: raw.clean,
        properties: raw.properties,
        exclude: raw.exclude,
        invalidation,
    };

    info!(
        bucket = %publish.bucket,
        destination = %publish.destination,
        files = raw.files.len(),
        directories = raw.directories.len(),
        "Config loaded successfully"
    );

    Ok(CliConfig {
        publish,
        files: raw.files,
        directories: raw.directories,
        aws: raw.aws,
    })
}
