use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, NamedTempFile};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

#[test]
fn help_lists_the_publish_command() {
    let mut cmd = Command::cargo_bin("bundle-publish").expect("Binary exists");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("publish"));
}

#[test]
fn publish_without_required_options_exits_with_config_error() {
    let mut cmd = Command::cargo_bin("bundle-publish").expect("Binary exists");
    cmd.arg("publish")
        .arg("--store-path")
        .arg("apps/web/")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--store-bucket"));
}

#[test]
fn malformed_config_file_fails() {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(config.path(), "store_bucket: [unterminated\n").expect("Writing temp config failed");

    let mut cmd = Command::cargo_bin("bundle-publish").expect("Binary exists");
    cmd.arg("publish")
        .arg("--config")
        .arg(config.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config YAML"));
}

#[test]
fn unreadable_manifest_fails_before_contacting_the_store() {
    let project = tempdir().unwrap();
    let config = project.path().join("publish.yaml");
    write(
        &config,
        format!(
            "store_bucket: assets\nstore_path: apps/web/\nlocal_path: {}\npublic_url_base: https://cdn.example.com\nmanifest: {}\naws_region: us-east-1\n",
            project.path().join("build").display(),
            project.path().join("missing-package.json").display(),
        ),
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("bundle-publish").expect("Binary exists");
    cmd.arg("publish")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .code(6)
        .stderr(predicate::str::contains("could not resolve the application version"));
}

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use bundle_publish::cli::{run, Cli, Commands, PublishArgs};

    // No options at all: run stops at config validation.
    let cli = Cli {
        command: Commands::Publish(PublishArgs::default()),
    };

    let result = run(cli).await;
    assert!(result.is_err(), "Missing options must fail");

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
