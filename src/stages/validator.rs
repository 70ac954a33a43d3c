use super::{parse_json_object, StageResult};
use crate::api::config::{VALIDATOR_INSTRUCTIONS, VALIDATOR_SYSTEM_PROMPT, VALIDATOR_TEMPERATURE};
use crate::api::LlmClient;
use crate::artifacts::markup::{self, IMAGES_DIR};
use crate::artifacts::reader::{html_files_in, read_files};
use crate::artifacts::validated_folder_for;
use crate::artifacts::writer::{copy_dir, is_html};
use crate::errors::StageError;
use crate::models::generated_files::INDEX_HTML;
use crate::models::{FileChange, GeneratedFileSet, StructuredRequest, ValidationReport};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;

/// Files a generated site conventionally consists of.
pub const CONVENTIONAL_FILES: [&str; 7] = [
    "index.html",
    "styles.css",
    "script.js",
    "seo.json",
    "alpine.js",
    "tailwind.config.js",
    "postcss.config.js",
];

/// Phrases that show the model answered with a design guide instead of a site.
pub const GUIDE_MARKERS: [&str; 2] = ["UI/UX Excellence", "Design Guide"];

/// Conventional files plus one derived filename per declared page.
pub fn candidate_files(request: &StructuredRequest) -> Vec<String> {
    let mut candidates: Vec<String> = CONVENTIONAL_FILES.iter().map(|f| f.to_string()).collect();
    for page in request.page_filenames() {
        if page != INDEX_HTML && !candidates.contains(&page) {
            candidates.push(page);
        }
    }
    candidates
}

fn looks_like_guide(html: &str) -> bool {
    GUIDE_MARKERS.iter().any(|marker| html.contains(marker))
}

/// Normalizes a saved site into its `_validated` sibling and has the model fix it.
pub struct Validator {
    llm: Arc<dyn LlmClient>,
}

impl Validator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn validate(
        &self,
        request: &StructuredRequest,
        folder: &Path,
    ) -> StageResult<ValidationReport> {
        let mut candidates = candidate_files(request);
        for name in html_files_in(folder).await? {
            if !candidates.contains(&name) {
                candidates.push(name);
            }
        }

        let sources = read_files(folder, &candidates).await?;
        if sources.is_empty() {
            return Err(StageError::NoContent(format!(
                "no website files found to validate in {}",
                folder.display()
            )));
        }

        let validated = validated_folder_for(folder);
        fs::create_dir_all(&validated)
            .await
            .map_err(StageError::io_at("create", &validated))?;
        refresh_images(folder, &validated).await?;

        let mut submitted = GeneratedFileSet::new();
        for (name, content) in sources.non_empty() {
            let content = if is_html(name) {
                markup::normalize_html(content)
            } else {
                content.to_string()
            };
            let path = validated.join(name);
            fs::write(&path, &content)
                .await
                .map_err(StageError::io_at("write", &path))?;
            submitted.insert(name, content);
        }
        log::info!(
            "Normalized {} file(s) into {}",
            submitted.len(),
            validated.display()
        );

        let user_prompt = build_prompt(request, &submitted);
        let raw = self
            .llm
            .complete_json(VALIDATOR_SYSTEM_PROMPT, &user_prompt, VALIDATOR_TEMPERATURE)
            .await?;
        let value = parse_json_object(&raw)?;

        if value
            .get(INDEX_HTML)
            .and_then(Value::as_str)
            .is_some_and(looks_like_guide)
        {
            log::warn!("Validator returned a design guide instead of code");
            return Err(StageError::GuideInsteadOfCode);
        }

        let fixed = GeneratedFileSet::from_json_object(value)
            .map_err(|e| StageError::malformed(e, Some(raw.as_str())))?;

        let mut fixed_files = Vec::new();
        let mut changes = Vec::new();
        for (name, content) in fixed.non_empty() {
            let Some(before) = submitted.get(name) else {
                log::warn!("Ignoring {} from validator: not part of the site", name);
                continue;
            };
            let content = if is_html(name) {
                markup::normalize_html(content)
            } else {
                content.to_string()
            };
            let path = validated.join(name);
            fs::write(&path, &content)
                .await
                .map_err(StageError::io_at("write", &path))?;
            changes.push(FileChange::between(name, before, &content));
            fixed_files.push(name.to_string());
        }

        log::info!("Validator rewrote {:?}", fixed_files);
        Ok(ValidationReport {
            validated_folder: validated,
            fixed_files,
            changes,
        })
    }
}

/// Replaces the validated folder's images with a fresh copy of the source's.
async fn refresh_images(folder: &Path, validated: &Path) -> StageResult<()> {
    let source = folder.join(IMAGES_DIR);
    let target = validated.join(IMAGES_DIR);

    if fs::try_exists(&target).await.unwrap_or(false) {
        fs::remove_dir_all(&target)
            .await
            .map_err(StageError::io_at("clear", &target))?;
    }
    if fs::try_exists(&source).await.unwrap_or(false) {
        let copied = copy_dir(&source, &target)
            .await
            .map_err(StageError::io_at("copy images to", &target))?;
        log::debug!("Copied {} image(s) to {}", copied, target.display());
    }
    Ok(())
}

fn build_prompt(request: &StructuredRequest, files: &GeneratedFileSet) -> String {
    let files_json = serde_json::to_string_pretty(files).unwrap_or_else(|_| "{}".to_string());
    format!(
        "### Structured Input (User Requirements):\n{}\n\n### Website Files:\n{}\n{}",
        request.to_pretty_json(),
        files_json,
        VALIDATOR_INSTRUCTIONS
    )
}
