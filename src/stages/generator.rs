use super::{parse_json_object, StageResult};
use crate::api::config::{GENERATOR_SYSTEM_PROMPT, GENERATOR_TEMPERATURE};
use crate::api::LlmClient;
use crate::errors::StageError;
use crate::models::generated_files::INDEX_HTML;
use crate::models::{GeneratedFileSet, StructuredRequest};
use std::sync::Arc;

const DEFAULT_THEME: &str = "Default Modern Theme";

/// Asks the model for the site's source files.
pub struct CodeGenerator {
    llm: Arc<dyn LlmClient>,
}

impl CodeGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn generate(&self, request: &StructuredRequest) -> StageResult<GeneratedFileSet> {
        let request = request.with_site_image_paths();
        let user_prompt = build_prompt(&request);

        let raw = self
            .llm
            .complete_json(GENERATOR_SYSTEM_PROMPT, &user_prompt, GENERATOR_TEMPERATURE)
            .await?;

        let value = parse_json_object(&raw)?;
        let files = GeneratedFileSet::from_json_object(value)
            .map_err(|e| StageError::malformed(e, Some(raw.as_str())))?;

        if files.index_html().is_none() {
            return Err(StageError::malformed(
                format!("generated site has no {}", INDEX_HTML),
                Some(raw.as_str()),
            ));
        }

        log::info!(
            "Generated {} file(s): {:?}",
            files.len(),
            files.names().collect::<Vec<_>>()
        );
        Ok(files)
    }
}

fn build_prompt(request: &StructuredRequest) -> String {
    let images = if request.image_placements.is_empty() {
        "No images provided".to_string()
    } else {
        request
            .image_placements
            .iter()
            .map(|image| format!("{} ({})", image.source_path, image.placement_hint))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Generate a professional website based on the following input. \
Follow the user's requests strictly and fill any gaps with sensible content.\n\n\
### Input Data:\n\
- **Theme**: {}\n\
- **Images**: {}\n\
- **Content**: {}\n\n\
Return the response as a valid JSON object with the required keys.",
        request.theme().unwrap_or(DEFAULT_THEME),
        images,
        request.to_pretty_json()
    )
}
