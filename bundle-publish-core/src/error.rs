//! Error taxonomy for a publish run.
//!
//! Every variant is terminal for the run; nothing is retried automatically. Each variant
//! names the stage that failed so an operator can fix the cause and re-invoke.

use std::path::PathBuf;

use crate::contract::{BuildError, StoreError};

/// A single upload that did not make it to the store.
#[derive(Debug)]
pub struct UploadFailure {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("missing required configuration: {0}")]
    ConfigMissing(String),

    #[error("could not resolve the application version from {path}: {reason}")]
    ManifestReadFailure { path: PathBuf, reason: String },

    #[error("version {version} already exists at {version_path}; re-run with --force to overwrite it")]
    VersionConflict { version: String, version_path: String },

    #[error("build failed: {0}")]
    BuildFailed(#[source] BuildError),

    #[error("could not read local artifacts at {path}: {source}")]
    LocalReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no script artifacts found in {dir}; the bundle has no entry point to serve")]
    EmptyScriptSet { dir: PathBuf },

    #[error("object store unavailable during {stage}: {source}")]
    StoreUnavailable {
        stage: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{}", partial_upload_message(.uploaded, .failures))]
    PartialUploadFailure {
        uploaded: usize,
        failures: Vec<UploadFailure>,
    },
}

impl PublishError {
    /// Process exit status for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            PublishError::ConfigMissing(_) => 2,
            PublishError::VersionConflict { .. } => 3,
            PublishError::BuildFailed(_) => 4,
            PublishError::LocalReadFailure { .. } | PublishError::EmptyScriptSet { .. } => 5,
            PublishError::ManifestReadFailure { .. } => 6,
            PublishError::StoreUnavailable { .. } => 7,
            PublishError::PartialUploadFailure { .. } => 8,
        }
    }

    /// A version conflict is an expected outcome, not a crash.
    pub fn is_informational(&self) -> bool {
        matches!(self, PublishError::VersionConflict { .. })
    }
}

fn partial_upload_message(uploaded: &usize, failures: &[UploadFailure]) -> String {
    let failed = failures
        .iter()
        .map(|f| format!("{}: {}", f.key, f.reason))
        .collect::<Vec<_>>()
        .join("; ");
    format!(
        "{} of {} uploads failed ({failed}); {uploaded} artifact(s) may already be live in the store",
        failures.len(),
        failures.len() + uploaded,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_upload_failure_warns_about_live_artifacts() {
        let err = PublishError::PartialUploadFailure {
            uploaded: 2,
            failures: vec![UploadFailure {
                key: "web/1.0.0/main.js".into(),
                reason: "connection reset".into(),
            }],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("1 of 3 uploads failed"), "{msg}");
        assert!(msg.contains("web/1.0.0/main.js: connection reset"));
        assert!(msg.contains("2 artifact(s) may already be live"));
        assert_eq!(err.exit_code(), 8);
    }

    #[test]
    fn only_version_conflict_is_informational() {
        let conflict = PublishError::VersionConflict {
            version: "1.0.0".into(),
            version_path: "web/1.0.0".into(),
        };
        assert!(conflict.is_informational());
        assert_ne!(conflict.exit_code(), 0);
        assert!(!PublishError::ConfigMissing("store-bucket".into()).is_informational());
    }
}
