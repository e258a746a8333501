//! High-level pipeline: orchestrates version check → build → classify → upload.
//!
//! This module drives one publish run for a [`PublishRequest`]. The run is linear:
//!   - Resolves the version (explicit override, else the project manifest)
//!   - Asks the [`ObjectStore`] whether the version path already holds objects, and
//!     aborts with [`PublishError::VersionConflict`] unless `force` is set
//!   - Builds the application through a [`Builder`] with the versioned public base URL
//!   - Classifies the build output into scripts and stylesheets
//!   - Uploads every artifact concurrently and joins on all of them
//!
//! # Responsibilities
//! - Nothing is written to the store before the build succeeded and at least one script
//!   artifact exists
//! - Uploads are independent; a failing upload does not cancel the others. Failures are
//!   aggregated into [`PublishError::PartialUploadFailure`] once every task has finished
//! - No retries and no rollback: artifacts uploaded before a failure stay live
//!
//! # Concurrency
//! The existence check and the upload are not atomic. Two runs targeting the same version
//! at once can both pass the check; nothing here prevents that.
//!
//! # Navigation
//! - Main entrypoint: [`publish`]
//! - Supporting types: [`UploadTask`], [`PublishReport`].

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::classify::{classify, read_artifact_dir, ArtifactSet};
use crate::config::PublishRequest;
use crate::contract::{Builder, ObjectStore};
use crate::error::{PublishError, UploadFailure};
use crate::url::normalize;
use crate::version::resolve_version;

/// One artifact to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub key: String,
    pub source: PathBuf,
    pub content_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedArtifact {
    pub key: String,
    pub content_type: &'static str,
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct PublishReport {
    pub version: String,
    pub version_path: String,
    /// True when the version path already held objects and `force` allowed the overwrite.
    pub overwritten: bool,
    pub public_base_url: String,
    /// Public URL of the bundle's entry-point script.
    pub main_script_url: String,
    pub uploaded: Vec<UploadedArtifact>,
}

pub async fn publish<S, B>(
    request: &PublishRequest,
    store: &S,
    builder: &B,
) -> Result<PublishReport, PublishError>
where
    S: ObjectStore,
    B: Builder,
{
    info!(bucket = %request.bucket, "[PUBLISH] Starting publish run");

    // --- Version ---
    let version = resolve_version(request.app_version.as_deref(), &request.manifest)?;
    let version_path = normalize(&request.version_path(&version));
    info!(version = %version, version_path = %version_path, "[PUBLISH] Version resolved");

    // --- Existence check ---
    // Trailing `/` so that `1.0` does not match the objects of `1.0.1`.
    let exists = store
        .exists(&request.bucket, &existence_prefix(&version_path))
        .await
        .map_err(|source| {
            error!(error = ?source, version_path = %version_path, "[PUBLISH][ERROR] Existence check failed");
            PublishError::StoreUnavailable {
                stage: "existence check",
                source,
            }
        })?;

    if exists && !request.force {
        warn!(version = %version, version_path = %version_path, "[PUBLISH] Version already published, aborting");
        return Err(PublishError::VersionConflict {
            version,
            version_path,
        });
    }
    if exists {
        warn!(version_path = %version_path, "[PUBLISH] Version already published, overwriting (--force)");
    }

    // --- Build ---
    let public_base_url = normalize(&format!("{}/{}/", request.public_url_base, version_path));
    builder.build(&public_base_url).await.map_err(|e| {
        error!(error = %e, "[PUBLISH][ERROR] Build step failed");
        PublishError::BuildFailed(e)
    })?;
    info!(public_base_url = %public_base_url, "[PUBLISH] Build succeeded");

    // --- Classify ---
    let local_dir = artifact_dir(&request.local_path);
    let artifacts = classify(read_artifact_dir(&local_dir).await?, request.source_maps);
    info!(
        scripts = artifacts.scripts.len(),
        stylesheets = artifacts.stylesheets.len(),
        dir = %local_dir.display(),
        "[PUBLISH] Artifacts classified"
    );
    let main_script = match artifacts.main_script() {
        Some(main) => main.to_string(),
        None => {
            error!(dir = %local_dir.display(), "[PUBLISH][ERROR] No script artifacts to publish");
            return Err(PublishError::EmptyScriptSet { dir: local_dir });
        }
    };

    // --- Upload ---
    let tasks = upload_tasks(&artifacts, &version_path, &local_dir);
    let uploaded = upload_all(store, &request.bucket, tasks, request.max_concurrent_uploads).await?;

    let main_script_url = normalize(&format!("{public_base_url}{main_script}"));
    info!(
        uploaded = uploaded.len(),
        main_script_url = %main_script_url,
        "[PUBLISH] Publish complete"
    );

    Ok(PublishReport {
        version,
        version_path,
        overwritten: exists,
        public_base_url,
        main_script_url,
        uploaded,
    })
}

/// One task per artifact; scripts first, then stylesheets.
pub fn upload_tasks(
    artifacts: &ArtifactSet,
    version_path: &str,
    local_dir: &Path,
) -> Vec<UploadTask> {
    artifacts
        .iter()
        .map(|(name, kind)| UploadTask {
            key: normalize(&format!("{version_path}/{name}")),
            source: local_dir.join(name),
            content_type: kind.content_type(),
        })
        .collect()
}

/// Runs every task with at most `limit` in flight, then reports the aggregate.
///
/// All tasks run to completion even when some fail.
pub async fn upload_all<S>(
    store: &S,
    bucket: &str,
    tasks: Vec<UploadTask>,
    limit: usize,
) -> Result<Vec<UploadedArtifact>, PublishError>
where
    S: ObjectStore,
{
    let total = tasks.len();
    info!(total, limit, "[PUBLISH][UPLOAD] Dispatching uploads");

    let mut results: Vec<(usize, UploadTask, Result<(), PublishError>)> =
        stream::iter(tasks.into_iter().enumerate().map(|(index, task)| async move {
            let result = upload_one(store, bucket, &task).await;
            (index, task, result)
        }))
        .buffer_unordered(limit.max(1))
        .collect()
        .await;
    results.sort_by_key(|(index, _, _)| *index);

    let mut uploaded = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for (_, task, result) in results {
        match result {
            Ok(()) => uploaded.push(UploadedArtifact {
                key: task.key,
                content_type: task.content_type,
            }),
            Err(e) => failures.push(UploadFailure {
                key: task.key,
                reason: e.to_string(),
            }),
        }
    }

    if failures.is_empty() {
        Ok(uploaded)
    } else {
        error!(
            failed = failures.len(),
            uploaded = uploaded.len(),
            "[PUBLISH][ERROR][UPLOAD] Some uploads failed; uploaded artifacts remain live"
        );
        Err(PublishError::PartialUploadFailure {
            uploaded: uploaded.len(),
            failures,
        })
    }
}

async fn upload_one<S>(store: &S, bucket: &str, task: &UploadTask) -> Result<(), PublishError>
where
    S: ObjectStore,
{
    let body = tokio::fs::read(&task.source).await.map_err(|source| {
        error!(error = ?source, file = %task.source.display(), "[PUBLISH][ERROR][UPLOAD] Could not read artifact");
        PublishError::LocalReadFailure {
            path: task.source.clone(),
            source,
        }
    })?;

    debug!(key = %task.key, bytes = body.len(), content_type = task.content_type, "[PUBLISH][UPLOAD] Uploading artifact");
    store
        .upload(bucket, &task.key, body, task.content_type)
        .await
        .map_err(|source| {
            error!(error = ?source, key = %task.key, "[PUBLISH][ERROR][UPLOAD] Upload failed");
            PublishError::StoreUnavailable {
                stage: "upload",
                source,
            }
        })?;
    info!(key = %task.key, content_type = task.content_type, "[PUBLISH][UPLOAD] Uploaded artifact");
    Ok(())
}

/// Prefix that matches exactly the objects stored under `version_path`.
fn existence_prefix(version_path: &str) -> String {
    format!("{}/", version_path.trim_end_matches('/'))
}

/// `local_path` with any trailing `/` removed.
fn artifact_dir(local_path: &Path) -> PathBuf {
    match local_path.to_str().map(|raw| raw.trim_end_matches('/')) {
        Some(trimmed) if !trimmed.is_empty() => PathBuf::from(trimmed),
        _ => local_path.to_path_buf(),
    }
}
