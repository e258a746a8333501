use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use crate::error::PublishError;

#[derive(Deserialize)]
struct Manifest {
    version: Option<String>,
}

/// The version to publish: the explicit override if given, else the manifest's `version`.
pub fn resolve_version(explicit: Option<&str>, manifest: &Path) -> Result<String, PublishError> {
    if let Some(version) = explicit.map(str::trim).filter(|v| !v.is_empty()) {
        info!(version, "[PUBLISH] Using explicit app version");
        return Ok(version.to_string());
    }

    let failure = |reason: String| {
        error!(manifest = %manifest.display(), reason = %reason, "[PUBLISH][ERROR] Could not resolve version");
        PublishError::ManifestReadFailure {
            path: manifest.to_path_buf(),
            reason,
        }
    };

    let content = fs::read_to_string(manifest).map_err(|e| failure(e.to_string()))?;
    let parsed: Manifest =
        serde_json::from_str(&content).map_err(|e| failure(format!("invalid JSON: {e}")))?;
    let version = parsed
        .version
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| failure("no `version` field".to_string()))?;

    info!(version = %version, manifest = %manifest.display(), "[PUBLISH] Read app version from manifest");
    Ok(version)
}
