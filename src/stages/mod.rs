//! The model-backed pipeline stages.
//!
//! Each stage owns an injected [`LlmClient`](crate::api::LlmClient) and
//! returns a [`StageResult`]; nothing a collaborator does can escape a stage
//! as anything but a [`StageError`].

pub mod generator;
pub mod interpreter;
pub mod validator;

pub use generator::CodeGenerator;
pub use interpreter::RequestInterpreter;
pub use validator::Validator;

use crate::errors::StageError;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

pub type StageResult<T> = Result<T, StageError>;

static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$").unwrap());

/// Removes a markdown code fence wrapped around a model response.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    CODE_FENCE_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str())
        .unwrap_or(trimmed)
}

/// Parses a model response that must be a JSON object.
pub fn parse_json_object(raw: &str) -> StageResult<Value> {
    let body = strip_code_fences(raw);
    match serde_json::from_str::<Value>(body) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(StageError::malformed("expected a JSON object", Some(raw))),
        Err(e) => Err(StageError::malformed(
            format!("invalid JSON response: {}", e),
            Some(raw),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn fenced_content_keeps_inner_backticks() {
        let raw = "```json\n{\"script.js\": \"const s = `hi`;\"}\n```";
        let value = parse_json_object(raw).unwrap();
        assert_eq!(value["script.js"], "const s = `hi`;");
    }

    #[test]
    fn non_objects_are_malformed() {
        let err = parse_json_object("[1, 2]").unwrap_err();
        assert!(matches!(err, StageError::MalformedResponse { .. }));

        let err = parse_json_object("Sure! Here is your site").unwrap_err();
        assert_eq!(err.raw_output(), Some("Sure! Here is your site"));
    }
}
