//! Fake collaborators shared by the unit tests.

use crate::api::{LlmClient, LlmError};
use crate::deploy::runner::{CliOutput, DeployRunner};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Replays canned model responses in order and records every prompt.
#[derive(Default)]
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, content: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(content.into()));
        self
    }

    pub fn fail(self, message: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Err(message.into()));
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// User prompt of the n-th call.
    pub fn user_prompt(&self, call: usize) -> String {
        self.prompts.lock().unwrap()[call].1.clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        _temperature: f32,
    ) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(content),
            Some(Err(message)) => Err(LlmError::ApiError(message)),
            None => Err(LlmError::ApiError("no scripted response left".to_string())),
        }
    }
}

/// Deploy tool stand-in that returns a fixed result.
pub struct FakeRunner {
    result: Mutex<Option<io::Result<CliOutput>>>,
    folders: Mutex<Vec<PathBuf>>,
}

impl FakeRunner {
    pub fn exits(success: bool, stdout: &str, stderr: &str) -> Self {
        Self::with_result(Ok(CliOutput {
            success,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }))
    }

    pub fn with_result(result: io::Result<CliOutput>) -> Self {
        Self {
            result: Mutex::new(Some(result)),
            folders: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.folders.lock().unwrap().len()
    }

    pub fn folders(&self) -> Vec<PathBuf> {
        self.folders.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeployRunner for FakeRunner {
    async fn run(&self, folder: &Path) -> io::Result<CliOutput> {
        self.folders.lock().unwrap().push(folder.to_path_buf());
        self.result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(io::Error::other("fake runner called twice")))
    }
}
