use crate::errors::StageError;
use async_trait::async_trait;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::process::Command;

static DEPLOYMENT_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https://[\w.-]+vercel\.app").unwrap());

/// What the deployment tool printed and whether it exited cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the deployment tool inside a site folder.
#[async_trait]
pub trait DeployRunner: Send + Sync {
    async fn run(&self, folder: &Path) -> io::Result<CliOutput>;
}

/// The hosting CLI, invoked as `<program> --prod --yes`.
pub struct VercelCli {
    program: PathBuf,
    timeout: Duration,
}

impl VercelCli {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl DeployRunner for VercelCli {
    async fn run(&self, folder: &Path) -> io::Result<CliOutput> {
        log::info!(
            "Running {} --prod --yes in {}",
            self.program.display(),
            folder.display()
        );

        // The child gets its own working directory; ours is never touched.
        let mut command = Command::new(&self.program);
        command
            .args(["--prod", "--yes"])
            .current_dir(folder)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(output) => output?,
            Err(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("deployment did not finish within {:?}", self.timeout),
                ))
            }
        };

        Ok(CliOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// First line of `<program> --version`, or `None` when it cannot be run.
pub async fn tool_version(program: &str) -> Option<String> {
    let output = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Finds the deployment URL in the tool's stdout: the URL on the first line
/// mentioning an `https://` `vercel.app` address.
pub fn parse_deployment_url(stdout: &str) -> Option<String> {
    let line = stdout
        .lines()
        .find(|line| line.contains("https://") && line.contains("vercel.app"))?;
    let url = DEPLOYMENT_URL_RE
        .find(line)
        .map(|m| m.as_str())
        .unwrap_or_else(|| line.trim());
    Some(url.to_string())
}

/// Maps the stderr of a failed run to a deployment error.
pub fn classify_failure(stderr: &str) -> StageError {
    let lower = stderr.to_lowercase();
    if lower.contains("command not found") || lower.contains("not recognized") {
        StageError::DeploymentToolMissing
    } else if lower.contains("not logged in") || lower.contains("no existing credentials") {
        StageError::DeploymentUnauthenticated
    } else {
        StageError::DeploymentFailed(stderr.trim().to_string())
    }
}

/// Maps an error from spawning or waiting on the tool.
pub fn classify_spawn_error(error: io::Error) -> StageError {
    match error.kind() {
        io::ErrorKind::NotFound => StageError::DeploymentToolMissing,
        _ => StageError::DeploymentFailed(error.to_string()),
    }
}
