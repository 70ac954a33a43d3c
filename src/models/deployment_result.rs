use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DeploymentStatus {
    Success,
    /// The tool exited cleanly but printed no recognizable URL.
    PartialSuccess,
}

/// Outcome of a deployment that did not fail outright.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResult {
    pub status: DeploymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub project_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl DeploymentResult {
    pub fn success(url: String, project_name: String) -> Self {
        Self {
            status: DeploymentStatus::Success,
            url: Some(url),
            project_name,
            raw_output: None,
        }
    }

    pub fn partial(project_name: String, raw_output: String) -> Self {
        Self {
            status: DeploymentStatus::PartialSuccess,
            url: None,
            project_name,
            raw_output: Some(raw_output),
        }
    }
}
