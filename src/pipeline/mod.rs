//! The end-to-end run: interpret, generate, persist, validate, deploy.
//!
//! Stages run strictly in order and the first failing stage ends the run.
//! A failure carries the newest folder already on disk so the caller can
//! recover the work by hand.

use crate::api::LlmClient;
use crate::artifacts::ArtifactStore;
use crate::deploy::{DeployRunner, Deployer};
use crate::errors::StageError;
use crate::models::{DeploymentStatus, GeneratedFileSet, ImagePlacement, ValidationReport};
use crate::stages::{CodeGenerator, RequestInterpreter, StageResult, Validator};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const SUCCESS_MESSAGE: &str = "Website generated, validated, and deployed successfully!";
pub const PARTIAL_SUCCESS_MESSAGE: &str =
    "Website generated and validated, but the deployment URL could not be read from the tool output";
pub const URL_NOT_AVAILABLE: &str = "URL not available";

/// What the user asked for.
#[derive(Debug, Clone, Default)]
pub struct UserRequest {
    pub description: String,
    pub images: Vec<String>,
    pub image_hints: Vec<String>,
    pub project_name: Option<String>,
}

/// Splits a comma-separated list of placement hints. Blank entries become "auto".
pub fn parse_placement_hints(hints: &str) -> Vec<String> {
    if hints.trim().is_empty() {
        return Vec::new();
    }
    hints
        .split(',')
        .map(str::trim)
        .map(|hint| if hint.is_empty() { "auto" } else { hint })
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Interpret,
    Generate,
    Persist,
    Validate,
    Deploy,
}

impl Stage {
    /// Fraction of the run completed when this stage starts.
    pub fn progress(self) -> f32 {
        match self {
            Stage::Interpret => 0.0,
            Stage::Generate => 0.25,
            Stage::Persist => 0.5,
            Stage::Validate => 0.75,
            Stage::Deploy => 0.9,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Stage::Interpret => "Processing input...",
            Stage::Generate => "Generating website code...",
            Stage::Persist => "Saving website files...",
            Stage::Validate => "Validating website...",
            Stage::Deploy => "Deploying to Vercel...",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Interpret => "interpret",
            Stage::Generate => "generate",
            Stage::Persist => "persist",
            Stage::Validate => "validate",
            Stage::Deploy => "deploy",
        };
        write!(f, "{}", name)
    }
}

/// Progress notifications. Purely informational; nothing here can stop a run.
pub trait PipelineObserver {
    fn stage_started(&mut self, _stage: Stage) {}
    fn stage_finished(&mut self, _stage: Stage) {}
    fn stage_failed(&mut self, _stage: Stage, _error: &StageError) {}
    fn completed(&mut self, _success: &PipelineSuccess) {}
}

pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSuccess {
    pub message: String,
    pub deployment_url: String,
    pub local_folder: PathBuf,
    pub project_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
    #[serde(skip)]
    pub validation: ValidationReport,
}

#[derive(Debug)]
pub struct PipelineFailure {
    pub stage: Stage,
    pub error: StageError,
    pub local_folder: Option<PathBuf>,
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Serialize for PipelineFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.local_folder.is_some() { 2 } else { 1 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("error", &self.error.to_string())?;
        if let Some(folder) = &self.local_folder {
            map.serialize_entry("localFolder", folder)?;
        }
        map.end()
    }
}

pub struct Pipeline {
    interpreter: RequestInterpreter,
    generator: CodeGenerator,
    store: ArtifactStore,
    validator: Validator,
    deployer: Deployer,
}

impl Pipeline {
    pub fn new(llm: Arc<dyn LlmClient>, store: ArtifactStore, runner: Arc<dyn DeployRunner>) -> Self {
        Self {
            interpreter: RequestInterpreter::new(llm.clone()),
            generator: CodeGenerator::new(llm.clone()),
            store,
            validator: Validator::new(llm),
            deployer: Deployer::new(runner),
        }
    }

    pub async fn run(
        &self,
        request: &UserRequest,
        observer: &mut dyn PipelineObserver,
    ) -> Result<PipelineSuccess, PipelineFailure> {
        let images = ImagePlacement::from_paths(&request.images, &request.image_hints);

        let structured = step(
            Stage::Interpret,
            None,
            observer,
            self.interpreter.interpret(&request.description, &images),
        )
        .await?;

        let files = step(
            Stage::Generate,
            None,
            observer,
            self.generator.generate(&structured),
        )
        .await?;

        let mut allocated = None;
        let persisted = observe(
            Stage::Persist,
            observer,
            self.persist(&files, &structured.image_placements, &mut allocated),
        )
        .await;
        let folder = persisted.map_err(|error| PipelineFailure {
            stage: Stage::Persist,
            error,
            local_folder: allocated,
        })?;

        let validation = step(
            Stage::Validate,
            Some(folder.as_path()),
            observer,
            self.validator.validate(&structured, &folder),
        )
        .await?;

        let validated = validation.validated_folder.clone();
        let deployment = step(
            Stage::Deploy,
            Some(validated.as_path()),
            observer,
            self.deployer
                .deploy(&validated, request.project_name.as_deref()),
        )
        .await?;

        let (message, deployment_url) = match (deployment.status, deployment.url) {
            (DeploymentStatus::Success, Some(url)) => (SUCCESS_MESSAGE, url),
            _ => (PARTIAL_SUCCESS_MESSAGE, URL_NOT_AVAILABLE.to_string()),
        };
        let success = PipelineSuccess {
            message: message.to_string(),
            deployment_url,
            local_folder: validated,
            project_name: deployment.project_name,
            raw_output: deployment.raw_output,
            validation,
        };
        observer.completed(&success);
        Ok(success)
    }

    /// Saves the generated site, recording the folder as soon as it exists.
    async fn persist(
        &self,
        files: &GeneratedFileSet,
        images: &[ImagePlacement],
        allocated: &mut Option<PathBuf>,
    ) -> StageResult<PathBuf> {
        let folder = self.store.create_folder(files).await?;
        *allocated = Some(folder.clone());
        self.store.populate(&folder, files, images).await?;
        Ok(folder)
    }
}

async fn step<T>(
    stage: Stage,
    local_folder: Option<&Path>,
    observer: &mut dyn PipelineObserver,
    work: impl Future<Output = StageResult<T>>,
) -> Result<T, PipelineFailure> {
    observe(stage, observer, work)
        .await
        .map_err(|error| PipelineFailure {
            stage,
            error,
            local_folder: local_folder.map(Path::to_path_buf),
        })
}

/// Runs one stage, reporting its start and outcome to the observer.
async fn observe<T>(
    stage: Stage,
    observer: &mut dyn PipelineObserver,
    work: impl Future<Output = StageResult<T>>,
) -> StageResult<T> {
    log::debug!("Starting stage {}", stage);
    observer.stage_started(stage);
    match work.await {
        Ok(value) => {
            observer.stage_finished(stage);
            Ok(value)
        }
        Err(error) => {
            log::error!("Stage {} failed: {}", stage, error);
            if let Some(raw) = error.raw_output() {
                log::debug!("Raw model output:\n{}", raw);
            }
            observer.stage_failed(stage, &error);
            Err(error)
        }
    }
}
