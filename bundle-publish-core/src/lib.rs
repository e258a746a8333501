#![doc = "bundle-publish-core: core publish workflow for bundle-publish."]

//! This crate holds the whole publish workflow: version resolution, the overwrite guard,
//! build invocation, artifact selection and the concurrent upload stage.
//! Vendor SDKs (the concrete object-store client) live in the CLI crate and plug in
//! through the traits in [`contract`].
//!
//! # Usage
//! Construct a [`config::PublishRequest`], an [`contract::ObjectStore`] and a
//! [`contract::Builder`], then call [`publish::publish`].

pub mod build;
pub mod classify;
pub mod config;
pub mod contract;
pub mod error;
pub mod publish;
pub mod url;
pub mod version;
