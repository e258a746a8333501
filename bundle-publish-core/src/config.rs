use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

pub const DEFAULT_MANIFEST: &str = "package.json";
pub const DEFAULT_PUBLIC_URL_ENV: &str = "PUBLIC_URL";
pub const DEFAULT_MAX_CONCURRENT_UPLOADS: usize = 8;

pub fn default_build_command() -> Vec<String> {
    vec!["npm".to_string(), "run".to_string(), "build".to_string()]
}

/// Everything one publish run needs. Built once from validated input and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    pub bucket: String,
    /// Destination prefix inside the bucket; the version is appended to it.
    pub store_path: String,
    /// Directory holding the built artifacts.
    pub local_path: PathBuf,
    pub app_version: Option<String>,
    pub public_url_base: String,
    pub force: bool,
    pub source_maps: bool,
    /// JSON manifest with a `version` field, consulted when no explicit version is given.
    pub manifest: PathBuf,
    /// Program followed by its arguments.
    pub build_command: Vec<String>,
    /// Working directory for the build; the current directory when unset.
    pub build_dir: Option<PathBuf>,
    /// Environment variable through which the public base URL reaches the build.
    pub public_url_env: String,
    pub max_concurrent_uploads: usize,
}

impl PublishRequest {
    pub fn trace_loaded(&self) {
        info!(
            bucket = %self.bucket,
            store_path = %self.store_path,
            local_path = %self.local_path.display(),
            app_version = self.app_version.as_deref().unwrap_or("<manifest>"),
            force = self.force,
            source_maps = self.source_maps,
            "Loaded PublishRequest"
        );
        debug!(?self, "PublishRequest loaded (full debug)");
    }

    /// Destination prefix and version joined into the unit of overwrite protection.
    ///
    /// A `/` is inserted only when the prefix is non-empty and lacks a trailing one.
    pub fn version_path(&self, version: &str) -> String {
        if self.store_path.is_empty() || self.store_path.ends_with('/') {
            format!("{}{}", self.store_path, version)
        } else {
            format!("{}/{}", self.store_path, version)
        }
    }
}
