//! Runs the application's build tool-chain as a child process.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{error, info};

use crate::config::{default_build_command, DEFAULT_PUBLIC_URL_ENV};
use crate::contract::{BuildError, Builder};

/// Spawns `program args...` with the public base URL in its environment.
///
/// Standard streams are inherited so the tool-chain's own output reaches the operator;
/// only the exit status is inspected.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: String,
    args: Vec<String>,
    public_url_env: String,
    working_dir: Option<PathBuf>,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        let mut command = default_build_command();
        let program = command.remove(0);
        Self {
            program,
            args: command,
            public_url_env: DEFAULT_PUBLIC_URL_ENV.to_string(),
            working_dir: None,
        }
    }
}

impl CommandBuilder {
    /// `command` is the program followed by its arguments. Returns `None` when it is empty.
    pub fn new(command: Vec<String>, public_url_env: impl Into<String>) -> Option<Self> {
        let mut parts = command.into_iter();
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            public_url_env: public_url_env.into(),
            working_dir: None,
        })
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl Builder for CommandBuilder {
    async fn build(&self, public_url: &str) -> Result<(), BuildError> {
        let command = self.display();
        info!(command = %command, env = %self.public_url_env, public_url, "[PUBLISH][BUILD] Starting build");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).env(&self.public_url_env, public_url);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let status = cmd.status().await.map_err(|source| {
            error!(error = ?source, command = %command, "[PUBLISH][ERROR][BUILD] Failed to launch build process");
            BuildError::Spawn {
                command: command.clone(),
                source,
            }
        })?;

        if status.success() {
            info!(command = %command, "[PUBLISH][BUILD] Build finished");
            Ok(())
        } else {
            error!(command = %command, status = ?status, "[PUBLISH][ERROR][BUILD] Build exited with non-zero status");
            Err(BuildError::Exit {
                command,
                code: status.code(),
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandBuilder {
        CommandBuilder::new(
            vec!["sh".into(), "-c".into(), script.into()],
            "PUBLIC_URL",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn passes_the_public_url_through_the_environment() {
        let builder = sh(r#"test "$PUBLIC_URL" = "https://cdn.example.com/web/1.0.0/""#);
        builder
            .build("https://cdn.example.com/web/1.0.0/")
            .await
            .expect("build should see PUBLIC_URL");
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_build_failure() {
        let err = sh("exit 3").build("https://x/").await.unwrap_err();
        assert!(matches!(err, BuildError::Exit { code: Some(3), .. }), "{err:?}");
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_failure() {
        let builder =
            CommandBuilder::new(vec!["definitely-not-a-real-build-tool".into()], "PUBLIC_URL")
                .unwrap();
        let err = builder.build("https://x/").await.unwrap_err();
        assert!(matches!(err, BuildError::Spawn { .. }), "{err:?}");
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(CommandBuilder::new(Vec::new(), "PUBLIC_URL").is_none());
    }

    #[tokio::test]
    async fn runs_in_the_configured_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker"), "x").unwrap();
        sh("test -f marker")
            .with_working_dir(dir.path())
            .build("https://x/")
            .await
            .expect("build should run inside the working dir");
    }
}
