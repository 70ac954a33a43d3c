//! Publishing a validated site through the hosting CLI.

pub mod descriptors;
pub mod project_name;
pub mod runner;

pub use runner::{DeployRunner, VercelCli};

use crate::errors::StageError;
use crate::models::DeploymentResult;
use crate::stages::StageResult;
use project_name::derive_project_name;
use runner::{classify_failure, classify_spawn_error, parse_deployment_url};
use std::path::Path;
use std::sync::Arc;

pub struct Deployer {
    runner: Arc<dyn DeployRunner>,
}

impl Deployer {
    pub fn new(runner: Arc<dyn DeployRunner>) -> Self {
        Self { runner }
    }

    pub async fn deploy(
        &self,
        folder: &Path,
        custom_name: Option<&str>,
    ) -> StageResult<DeploymentResult> {
        if !tokio::fs::metadata(folder)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
        {
            return Err(StageError::DeploymentFailed(format!(
                "deployment folder {} does not exist",
                folder.display()
            )));
        }

        let project_name = derive_project_name(custom_name);
        descriptors::write_descriptors(folder, &project_name).await?;

        let output = self.runner.run(folder).await.map_err(classify_spawn_error)?;
        log::debug!("Deploy stdout:\n{}", output.stdout);

        if !output.success {
            log::warn!("Deployment tool failed: {}", output.stderr.trim());
            return Err(classify_failure(&output.stderr));
        }

        match parse_deployment_url(&output.stdout) {
            Some(url) => {
                log::info!("Deployed {} to {}", project_name, url);
                Ok(DeploymentResult::success(url, project_name))
            }
            None => {
                log::warn!("Deployment finished but no URL was found in the output");
                Ok(DeploymentResult::partial(project_name, output.stdout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeploymentStatus;
    use crate::testing::FakeRunner;
    use std::io;
    use tempfile::TempDir;

    #[tokio::test]
    async fn url_in_output_is_success() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(FakeRunner::exits(
            true,
            "Production: https://bakery-x1.vercel.app [3s]\n",
            "",
        ));

        let result = Deployer::new(runner.clone())
            .deploy(dir.path(), Some("Bakery"))
            .await
            .unwrap();

        assert_eq!(result.status, DeploymentStatus::Success);
        assert_eq!(result.url.as_deref(), Some("https://bakery-x1.vercel.app"));
        assert_eq!(result.project_name, "bakery");
        assert_eq!(runner.folders(), vec![dir.path().to_path_buf()]);
        assert!(dir.path().join(descriptors::VERCEL_JSON).exists());
        assert!(dir.path().join(descriptors::PACKAGE_JSON).exists());
    }

    #[tokio::test]
    async fn clean_exit_without_url_is_partial() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(FakeRunner::exits(true, "Queued for deployment\n", ""));

        let result = Deployer::new(runner)
            .deploy(dir.path(), None)
            .await
            .unwrap();

        assert_eq!(result.status, DeploymentStatus::PartialSuccess);
        assert_eq!(result.url, None);
        assert_eq!(result.raw_output.as_deref(), Some("Queued for deployment\n"));
        assert!(result.project_name.starts_with("ai-website-"));
    }

    #[tokio::test]
    async fn failed_run_is_classified() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(FakeRunner::exits(false, "", "Error: Not logged in"));
        let err = Deployer::new(runner)
            .deploy(dir.path(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::DeploymentUnauthenticated));
    }

    #[tokio::test]
    async fn missing_tool_is_reported() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(FakeRunner::with_result(Err(io::Error::new(
            io::ErrorKind::NotFound,
            "vercel",
        ))));
        let err = Deployer::new(runner)
            .deploy(dir.path(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::DeploymentToolMissing));
    }

    #[tokio::test]
    async fn missing_folder_never_runs_the_tool() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(FakeRunner::exits(true, "", ""));
        let err = Deployer::new(runner.clone())
            .deploy(&dir.path().join("gone"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::DeploymentFailed(_)));
        assert_eq!(runner.calls(), 0);
    }
}
