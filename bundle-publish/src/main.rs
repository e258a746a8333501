use bundle_publish::cli::{exit_code, is_abort, run, Cli};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries only the publish summary and URL.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let cli = Cli::parse();
    tracing::info!("CLI arguments parsed, invoking run");
    match run(cli).await {
        Ok(()) => tracing::info!("CLI completed successfully"),
        Err(e) => {
            let code = exit_code(&e);
            if is_abort(&e) {
                tracing::warn!(reason = %e, exit_code = code, "CLI aborted");
            } else {
                tracing::error!(error = %e, exit_code = code, "CLI exited with error");
            }
            std::process::exit(code);
        }
    }
}
