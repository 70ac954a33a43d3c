use crate::api::LlmError;
use std::fmt;
use std::path::Path;

/// Failure of a single pipeline stage.
///
/// Every collaborator fault (HTTP, JSON, filesystem, deploy tool) is folded
/// into one of these at the stage boundary.
#[derive(Debug)]
pub enum StageError {
    Collaborator(LlmError),
    MalformedResponse { message: String, raw: Option<String> },
    GuideInsteadOfCode,
    NoContent(String),
    Filesystem {
        context: String,
        source: std::io::Error,
    },
    DeploymentToolMissing,
    DeploymentUnauthenticated,
    DeploymentFailed(String),
}

impl StageError {
    pub fn malformed(message: impl Into<String>, raw: Option<&str>) -> Self {
        StageError::MalformedResponse {
            message: message.into(),
            raw: raw.map(str::to_string),
        }
    }

    pub fn filesystem(context: impl Into<String>, source: std::io::Error) -> Self {
        StageError::Filesystem {
            context: context.into(),
            source,
        }
    }

    /// Builds a closure for `map_err` that tags an I/O error with the path it touched.
    pub fn io_at<'a>(action: &'a str, path: &'a Path) -> impl FnOnce(std::io::Error) -> Self + 'a {
        move |source| StageError::filesystem(format!("{} {}", action, path.display()), source)
    }

    /// Raw collaborator output kept for diagnosis, if any.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            StageError::MalformedResponse { raw, .. } => raw.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::Collaborator(e) => write!(f, "Model request failed: {}", e),
            StageError::MalformedResponse { message, .. } => {
                write!(f, "Model returned an unusable response: {}", message)
            }
            StageError::GuideInsteadOfCode => write!(
                f,
                "Validation failed: model returned a UI/UX guide instead of the expected website"
            ),
            StageError::NoContent(e) => write!(f, "Nothing to work with: {}", e),
            StageError::Filesystem { context, source } => {
                write!(f, "Filesystem error while trying to {}: {}", context, source)
            }
            StageError::DeploymentToolMissing => write!(
                f,
                "Vercel CLI is not installed. Please run 'npm i -g vercel' to install it."
            ),
            StageError::DeploymentUnauthenticated => write!(
                f,
                "Vercel is not authenticated. Please run 'vercel login' to authenticate."
            ),
            StageError::DeploymentFailed(e) => write!(f, "Deployment failed: {}", e),
        }
    }
}

impl std::error::Error for StageError {}

impl From<LlmError> for StageError {
    fn from(err: LlmError) -> Self {
        StageError::Collaborator(err)
    }
}

#[derive(Debug)]
pub enum AppError {
    IoError(std::io::Error),
    TomlError(toml::de::Error),
    TomlSerError(toml::ser::Error),
    JsonError(serde_json::Error),
    LlmError(LlmError),
    MissingPrompt,
    MissingApiKey,
    InvalidInput(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::IoError(e) => write!(f, "IO error: {}", e),
            AppError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            AppError::TomlSerError(e) => write!(f, "TOML writing error: {}", e),
            AppError::JsonError(e) => write!(f, "JSON error: {}", e),
            AppError::LlmError(e) => write!(f, "Model client error: {}", e),
            AppError::MissingPrompt => write!(f, "Prompt is required"),
            AppError::MissingApiKey => write!(
                f,
                "API key is required (set it with `model-config --set-api-key` or OPENAI_API_KEY)"
            ),
            AppError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::TomlError(err)
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::TomlSerError(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::JsonError(err)
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::LlmError(err)
    }
}
