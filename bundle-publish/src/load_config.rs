/// `load_config` module: merges the optional YAML config file, CLI flags and environment into
/// the strongly-typed [`PublishRequest`] and [`StoreSettings`].
///
/// # Precedence
/// CLI flags override the config file; the file overrides environment fallbacks
/// (`AWS_REGION`, `AWS_ENDPOINT_URL`); built-in defaults fill the rest.
///
/// # Errors
/// A required value missing from every source is a [`PublishError::ConfigMissing`] naming
/// the flag. Unreadable or malformed files surface as `anyhow` errors with context.
use anyhow::{Context, Result};
use bundle_publish_core::config::{
    default_build_command, PublishRequest, DEFAULT_MANIFEST, DEFAULT_MAX_CONCURRENT_UPLOADS,
    DEFAULT_PUBLIC_URL_ENV,
};
use bundle_publish_core::error::PublishError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::cli::PublishArgs;
use crate::upload::StoreSettings;

/// Fully merged configuration for one publish run.
#[derive(Debug)]
pub struct LoadedConfig {
    pub request: PublishRequest,
    pub store: StoreSettings,
}

/// YAML-side schema; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub store_bucket: Option<String>,
    pub store_path: Option<String>,
    pub local_path: Option<PathBuf>,
    pub app_version: Option<String>,
    pub public_url_base: Option<String>,
    pub source_maps: Option<bool>,
    pub force: Option<bool>,
    pub manifest: Option<PathBuf>,
    pub build_command: Option<Vec<String>>,
    pub build_dir: Option<PathBuf>,
    pub public_url_env: Option<String>,
    pub max_concurrent_uploads: Option<usize>,
    pub aws_region: Option<String>,
    pub aws_endpoint_url: Option<String>,
}

pub fn read_config_file<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        e
    })
    .with_context(|| format!("Failed to read config file {:?}", path_ref))?;

    let parsed: FileConfig = serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
        e
    })
    .with_context(|| format!("Failed to parse config YAML {:?}", path_ref))?;

    info!(config_path = ?path_ref, "Parsed config YAML successfully");
    Ok(parsed)
}

pub fn load_config(args: &PublishArgs) -> Result<LoadedConfig> {
    let file = match &args.config {
        Some(path) => read_config_file(path)?,
        None => FileConfig::default(),
    };

    let bucket = required("store-bucket", args.store_bucket.clone().or(file.store_bucket))?;
    let store_path = required("store-path", args.store_path.clone().or(file.store_path))?;
    let local_path = required("local-path", args.local_path.clone().or(file.local_path))?;
    let public_url_base = required(
        "public-url-base",
        args.public_url_base.clone().or(file.public_url_base),
    )?;

    let build_command = file.build_command.unwrap_or_else(default_build_command);
    if build_command.is_empty() {
        return Err(PublishError::ConfigMissing("build_command".to_string()).into());
    }

    let max_concurrent_uploads = file
        .max_concurrent_uploads
        .unwrap_or(DEFAULT_MAX_CONCURRENT_UPLOADS);
    if max_concurrent_uploads == 0 {
        error!("max_concurrent_uploads must be at least 1");
        anyhow::bail!("max_concurrent_uploads must be at least 1");
    }

    let request = PublishRequest {
        bucket,
        store_path,
        local_path,
        app_version: args.app_version.clone().or(file.app_version),
        public_url_base,
        force: args.force || file.force.unwrap_or(false),
        source_maps: args.source_maps || file.source_maps.unwrap_or(false),
        manifest: args
            .manifest
            .clone()
            .or(file.manifest)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST)),
        build_command,
        build_dir: file.build_dir,
        public_url_env: file
            .public_url_env
            .unwrap_or_else(|| DEFAULT_PUBLIC_URL_ENV.to_string()),
        max_concurrent_uploads,
    };

    let store = StoreSettings {
        region: args
            .aws_region
            .clone()
            .or(file.aws_region)
            .or_else(|| env_var("AWS_REGION")),
        endpoint_url: args
            .aws_endpoint_url
            .clone()
            .or(file.aws_endpoint_url)
            .or_else(|| env_var("AWS_ENDPOINT_URL")),
    };

    info!(
        bucket = %request.bucket,
        store_path = %request.store_path,
        region = store.region.as_deref().unwrap_or("<default chain>"),
        "Config loaded and merged successfully"
    );

    Ok(LoadedConfig { request, store })
}

fn required<T>(flag: &str, value: Option<T>) -> Result<T, PublishError> {
    value.ok_or_else(|| {
        error!(flag, "Required configuration value missing");
        PublishError::ConfigMissing(format!("--{flag}"))
    })
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
