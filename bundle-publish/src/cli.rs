///
/// This module implements the CLI interface for bundle-publish: command parsing, the async
/// entrypoint and the mapping from workflow errors to user-visible output.
///
/// All workflow logic (version guarding, build, artifact selection, upload) lives in the
/// [`bundle-publish-core`] crate. This module is strictly CLI glue.
///
/// ## How To Use
/// - For command-line users: run the `bundle-publish` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`bundle-publish-core`]: ../../bundle-publish-core/
use crate::load_config::load_config;
use crate::upload::S3Store;
use anyhow::Result;
use bundle_publish_core::build::CommandBuilder;
use bundle_publish_core::error::PublishError;
use bundle_publish_core::publish::publish;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI for bundle-publish: publish a built web bundle under a versioned store path.
#[derive(Parser)]
#[clap(
    name = "bundle-publish",
    version,
    about = "Build a web application and publish its scripts and stylesheets to an S3-compatible store under a version path"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the application and upload the new version's artifacts
    Publish(PublishArgs),
}

/// Options for `publish`. Any of them may instead come from `--config`; flags win.
#[derive(Args, Debug, Default, Clone)]
pub struct PublishArgs {
    /// Optional YAML file providing defaults for every option below
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Destination bucket
    #[clap(long)]
    pub store_bucket: Option<String>,

    /// Destination prefix inside the bucket; the version is appended to it
    #[clap(long)]
    pub store_path: Option<String>,

    /// Directory containing the built scripts and stylesheets
    #[clap(long)]
    pub local_path: Option<PathBuf>,

    /// Version to publish; defaults to the `version` field of the manifest
    #[clap(long)]
    pub app_version: Option<String>,

    /// Base URL the published assets are served from
    #[clap(long)]
    pub public_url_base: Option<String>,

    /// Also upload .js.map and .css.map files
    #[clap(long)]
    pub source_maps: bool,

    /// Overwrite a version that has already been published
    #[clap(long)]
    pub force: bool,

    /// Manifest holding the default version (default: package.json)
    #[clap(long)]
    pub manifest: Option<PathBuf>,

    /// Region of the object store
    #[clap(long)]
    pub aws_region: Option<String>,

    /// Custom S3-compatible endpoint (MinIO, LocalStack, ...)
    #[clap(long)]
    pub aws_endpoint_url: Option<String>,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Publish(args) => {
            let config = load_config(&args).map_err(|e| {
                eprintln!("[ERROR] Invalid configuration: {e:#}");
                e
            })?;
            config.request.trace_loaded();
            tracing::info!(command = "publish", "Starting publish run");

            let mut builder = CommandBuilder::new(
                config.request.build_command.clone(),
                config.request.public_url_env.clone(),
            )
            .ok_or_else(|| PublishError::ConfigMissing("build_command".to_string()))?;
            if let Some(dir) = &config.request.build_dir {
                builder = builder.with_working_dir(dir);
            }
            let store = S3Store::new(&config.store).await;

            match publish(&config.request, &store, &builder).await {
                Ok(report) => {
                    tracing::info!(command = "publish", ?report, "Publish complete");
                    println!(
                        "Published {} artifact(s) for version {} to s3://{}/{}",
                        report.uploaded.len(),
                        report.version,
                        config.request.bucket,
                        report.version_path
                    );
                    println!("{}", report.main_script_url);
                    Ok(())
                }
                Err(e) if e.is_informational() => {
                    tracing::warn!(command = "publish", reason = %e, "Publish aborted");
                    eprintln!("[ABORT] {e}");
                    Err(e.into())
                }
                Err(e) => {
                    tracing::error!(command = "publish", error = %e, "Publish failed");
                    eprintln!("[ERROR] Publish failed: {e}");
                    Err(e.into())
                }
            }
        }
    }
}

/// Process exit status for an error returned by [`run`].
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PublishError>()
        .map(PublishError::exit_code)
        .unwrap_or(1)
}

/// True when [`run`] stopped on purpose (an already published version) rather than failed.
pub fn is_abort(err: &anyhow::Error) -> bool {
    err.downcast_ref::<PublishError>()
        .is_some_and(PublishError::is_informational)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_follows_the_publish_error_kind() {
        let conflict: anyhow::Error = PublishError::VersionConflict {
            version: "1.0.0".into(),
            version_path: "web/1.0.0".into(),
        }
        .into();
        assert_eq!(exit_code(&conflict), 3);

        let wrapped = anyhow::Error::from(PublishError::ConfigMissing("store-bucket".into()))
            .context("loading configuration");
        assert_eq!(exit_code(&wrapped), 2);

        assert_eq!(exit_code(&anyhow::anyhow!("something else")), 1);
    }

    #[test]
    fn only_a_version_conflict_is_an_abort() {
        let conflict: anyhow::Error = PublishError::VersionConflict {
            version: "1.0.0".into(),
            version_path: "web/1.0.0".into(),
        }
        .into();
        assert!(is_abort(&conflict));

        let empty: anyhow::Error = PublishError::EmptyScriptSet {
            dir: PathBuf::from("build"),
        }
        .into();
        assert!(!is_abort(&empty));
        assert!(!is_abort(&anyhow::anyhow!("malformed config")));
    }

    #[test]
    fn parses_publish_flags() {
        let cli = Cli::parse_from([
            "bundle-publish",
            "publish",
            "--store-bucket",
            "assets",
            "--store-path",
            "apps/web/",
            "--local-path",
            "build/static/js/",
            "--public-url-base",
            "https://cdn.example.com",
            "--source-maps",
            "--force",
        ]);
        let Commands::Publish(args) = cli.command;
        assert_eq!(args.store_bucket.as_deref(), Some("assets"));
        assert_eq!(args.local_path, Some(PathBuf::from("build/static/js/")));
        assert!(args.source_maps);
        assert!(args.force);
        assert!(args.app_version.is_none());
    }
}
