use super::{parse_json_object, StageResult};
use crate::api::config::{INTERPRETER_INSTRUCTIONS, INTERPRETER_SYSTEM_PROMPT, INTERPRETER_TEMPERATURE};
use crate::api::LlmClient;
use crate::errors::StageError;
use crate::models::{ImagePlacement, StructuredRequest};
use std::sync::Arc;

/// Turns a free-text website description into a [`StructuredRequest`].
pub struct RequestInterpreter {
    llm: Arc<dyn LlmClient>,
}

impl RequestInterpreter {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn interpret(
        &self,
        description: &str,
        images: &[ImagePlacement],
    ) -> StageResult<StructuredRequest> {
        let user_prompt = format!(
            "Based on this user prompt:\n\n{}\n{}",
            description, INTERPRETER_INSTRUCTIONS
        );

        let raw = self
            .llm
            .complete_json(INTERPRETER_SYSTEM_PROMPT, &user_prompt, INTERPRETER_TEMPERATURE)
            .await?;

        let value = parse_json_object(&raw)?;
        let mut request: StructuredRequest = serde_json::from_value(value).map_err(|e| {
            StageError::malformed(format!("unexpected request structure: {}", e), Some(raw.as_str()))
        })?;

        // The model's idea of the image list is discarded; the caller's paths win.
        request.image_placements = images.to_vec();

        log::info!(
            "Interpreted request: structure={:?}, pages={:?}, images={}",
            request.website_structure,
            request.pages,
            request.image_placements.len()
        );
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedLlm;

    #[tokio::test]
    async fn caller_images_replace_model_placements() {
        let llm = Arc::new(ScriptedLlm::new().reply(
            r#"{
                "websiteTheme": "ocean",
                "website_structure": "multi-page",
                "pages": ["Home", "Contact"],
                "image_placements": [{"path": "hallucinated.png", "placement": "everywhere"}]
            }"#,
        ));
        let interpreter = RequestInterpreter::new(llm.clone());
        let images = vec![
            ImagePlacement::new("/uploads/one.png", "hero"),
            ImagePlacement::new("/uploads/two.png", "auto"),
        ];

        let request = interpreter
            .interpret("A surf school with a contact page", &images)
            .await
            .unwrap();

        assert_eq!(request.image_placements, images);
        assert_eq!(request.theme(), Some("ocean"));
        assert!(request.is_multi_page());
        assert!(llm.user_prompt(0).contains("A surf school with a contact page"));
    }

    #[tokio::test]
    async fn invalid_json_is_malformed() {
        let llm = Arc::new(ScriptedLlm::new().reply("I think you want a blog."));
        let err = RequestInterpreter::new(llm)
            .interpret("a blog", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn collaborator_failure_is_reported() {
        let llm = Arc::new(ScriptedLlm::new().fail("connection reset"));
        let err = RequestInterpreter::new(llm)
            .interpret("a blog", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Collaborator(_)));
        assert!(err.to_string().contains("connection reset"));
    }
}
