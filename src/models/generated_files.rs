use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const INDEX_HTML: &str = "index.html";

/// Generated site files keyed by relative filename.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct GeneratedFileSet {
    files: BTreeMap<String, String>,
}

impl GeneratedFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a file set from a model's JSON object.
    ///
    /// Objects and arrays (e.g. `seo.json`) are stored as pretty JSON text,
    /// nulls are dropped, and keys that could escape the site folder are
    /// skipped.
    pub fn from_json_object(value: Value) -> Result<Self, String> {
        let Value::Object(map) = value else {
            return Err("expected a JSON object mapping filenames to contents".to_string());
        };

        let mut files = Self::new();
        for (name, content) in map {
            if !is_safe_filename(&name) {
                log::warn!("Skipping generated file with unsafe name: {}", name);
                continue;
            }
            let text = match content {
                Value::Null => continue,
                Value::String(text) => text,
                other => serde_json::to_string_pretty(&other).map_err(|e| e.to_string())?,
            };
            files.insert(name, text);
        }
        Ok(files)
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.files.insert(name.into(), content.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    pub fn index_html(&self) -> Option<&str> {
        self.get(INDEX_HTML).filter(|html| !html.trim().is_empty())
    }

    /// Files with any content at all, in filename order. Whitespace counts.
    pub fn non_empty(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files
            .iter()
            .filter(|(_, content)| !content.is_empty())
            .map(|(name, content)| (name.as_str(), content.as_str()))
    }

    pub fn has_content(&self) -> bool {
        self.non_empty().next().is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// A plain top-level filename: no separators, no parent references.
pub fn is_safe_filename(name: &str) -> bool {
    !name.trim().is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && name != "."
        && name != ".."
        && !name.contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_values_become_text_files() {
        let files = GeneratedFileSet::from_json_object(json!({
            "index.html": "<html></html>",
            "seo.json": {"title": "Portfolio"},
            "script.js": null,
            "../escape.html": "<p>no</p>",
            "images/logo.svg": "<svg/>",
        }))
        .expect("file set");

        assert_eq!(files.index_html(), Some("<html></html>"));
        assert!(files.get("seo.json").unwrap().contains("\"title\": \"Portfolio\""));
        assert!(files.get("script.js").is_none());
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(GeneratedFileSet::from_json_object(json!(["index.html"])).is_err());
    }

    #[test]
    fn empty_files_are_not_content() {
        let mut files = GeneratedFileSet::new();
        files.insert("styles.css", "");
        assert!(!files.has_content());

        files.insert("index.html", "   ");
        assert!(files.has_content());
        assert!(files.index_html().is_none());

        files.insert("script.js", "console.log(1);");
        assert_eq!(files.non_empty().count(), 2);
    }
}
