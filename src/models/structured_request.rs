use crate::artifacts::markup::{basename, images_path};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const MULTI_PAGE: &str = "multi-page";

/// Where an uploaded image should go, as given by the user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImagePlacement {
    #[serde(rename = "path")]
    pub source_path: String,
    #[serde(rename = "placement")]
    pub placement_hint: String,
}

impl ImagePlacement {
    pub fn new(source_path: impl Into<String>, placement_hint: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            placement_hint: placement_hint.into(),
        }
    }

    /// Pairs each image with its hint; images past the last hint get "auto".
    pub fn from_paths(paths: &[String], hints: &[String]) -> Vec<Self> {
        paths
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let hint = hints.get(i).map(String::as_str).unwrap_or("auto");
                Self::new(path.clone(), hint)
            })
            .collect()
    }

    pub fn basename(&self) -> &str {
        basename(&self.source_path)
    }
}

/// The model's structured reading of a free-text website request.
///
/// Only the fields the pipeline acts on are typed; everything else the model
/// produced is carried along in `extra` and forwarded to later stages.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StructuredRequest {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub website_structure: Option<String>,
    #[serde(default, deserialize_with = "page_names", skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<String>,
    #[serde(default, deserialize_with = "lenient_placements")]
    pub image_placements: Vec<ImagePlacement>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StructuredRequest {
    pub fn theme(&self) -> Option<&str> {
        self.extra.get("websiteTheme").and_then(Value::as_str)
    }

    /// Multi-page only counts when there is at least one page to build.
    pub fn is_multi_page(&self) -> bool {
        self.website_structure.as_deref() == Some(MULTI_PAGE) && !self.pages.is_empty()
    }

    /// Filenames derived from the page names: lower-cased, spaces to hyphens.
    pub fn page_filenames(&self) -> Vec<String> {
        if !self.is_multi_page() {
            return Vec::new();
        }
        self.pages
            .iter()
            .map(|page| format!("{}.html", page.to_lowercase().replace(' ', "-")))
            .collect()
    }

    /// Copy of the request with every image path pointing at `images/<basename>`.
    pub fn with_site_image_paths(&self) -> Self {
        let mut request = self.clone();
        for placement in &mut request.image_placements {
            placement.source_path = images_path(&placement.source_path);
        }
        request
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_str().map(str::to_string)))
}

// The pipeline rebuilds placements from the caller's images, so a malformed
// list from the model is dropped instead of failing the whole request.
fn lenient_placements<'de, D>(deserializer: D) -> Result<Vec<ImagePlacement>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

fn page_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let names = match value {
        Some(Value::Array(items)) => items.iter().filter_map(page_name).collect(),
        // {"0": "Home", "1": "About"}
        Some(Value::Object(map)) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by_key(|(key, _)| key.parse::<usize>().unwrap_or(usize::MAX));
            entries.into_iter().filter_map(|(_, v)| page_name(v)).collect()
        }
        Some(Value::String(list)) => list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    };
    Ok(names)
}

fn page_name(value: &Value) -> Option<String> {
    let name = match value {
        Value::String(name) => name.as_str(),
        Value::Object(fields) => fields
            .get("name")
            .or_else(|| fields.get("title"))
            .and_then(Value::as_str)?,
        _ => return None,
    };
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}
