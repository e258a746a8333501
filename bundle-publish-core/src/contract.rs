//! # contract: collaborator interfaces for the publish workflow
//!
//! The orchestrator never talks to a store SDK or a process API directly. It drives two
//! traits, so the real clients and test mocks are interchangeable:
//!
//! - [`ObjectStore`]: existence check by key prefix, and public upload with a content type.
//! - [`Builder`]: runs the application build with the computed public base URL.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`; `MockObjectStore` and `MockBuilder` are
//!   exported under the `test-export-mocks` feature for integration tests of dependents.
//!
//! ## Errors
//! - Store implementations return a boxed error; the orchestrator classifies it as
//!   `StoreUnavailable` with the stage it happened in.
//! - Builders return a [`BuildError`] describing whether the process could not start
//!   or exited unsuccessfully.

#![allow(unused)]

use async_trait::async_trait;

use mockall::{automock, predicate::*};

/// Error type returned by [`ObjectStore`] implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("could not start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}", describe_exit(.code))]
    Exit { command: String, code: Option<i32> },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Trait for the remote object store that receives published artifacts.
///
/// Implementations must not retry internally; the caller decides what a failure means.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// True iff at least one object key in `bucket` begins with `prefix`.
    async fn exists(&self, bucket: &str, prefix: &str) -> Result<bool, StoreError>;

    /// Store `body` at `key`, publicly readable, with the given content type.
    ///
    /// Any existing object at `key` is overwritten.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;
}

/// Trait for the external build tool-chain.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Builder: Send + Sync {
    /// Run one build with `public_url` exposed to the tool-chain, resolving on success.
    async fn build(&self, public_url: &str) -> Result<(), BuildError>;
}
