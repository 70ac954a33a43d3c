use crate::errors::StageError;
use serde_json::{json, Value};
use std::path::Path;
use tokio::fs;

pub const VERCEL_JSON: &str = "vercel.json";
pub const PACKAGE_JSON: &str = "package.json";

/// Static-hosting configuration: every page, stylesheet, script and image is
/// served as-is, with `/` falling back to `index.html`.
pub fn vercel_config(project_name: &str) -> Value {
    json!({
        "name": project_name,
        "version": 2,
        "public": true,
        "builds": [
            { "src": "*.html", "use": "@vercel/static" },
            { "src": "*.css", "use": "@vercel/static" },
            { "src": "*.js", "use": "@vercel/static" },
            { "src": "*.json", "use": "@vercel/static" },
            { "src": "images/**", "use": "@vercel/static" }
        ],
        "routes": [
            { "src": "/images/(.*)", "dest": "/images/$1" },
            { "src": "/(.*)", "dest": "/$1" },
            { "handle": "filesystem" },
            { "src": "/", "dest": "/index.html" }
        ]
    })
}

pub fn package_manifest(project_name: &str) -> Value {
    json!({
        "name": project_name,
        "version": "0.0.1",
        "scripts": { "start": "serve" },
        "dependencies": { "serve": "^14.0.0" }
    })
}

/// Writes both descriptors into `folder`, replacing any from an earlier attempt.
pub async fn write_descriptors(folder: &Path, project_name: &str) -> Result<(), StageError> {
    for (file_name, descriptor) in [
        (VERCEL_JSON, vercel_config(project_name)),
        (PACKAGE_JSON, package_manifest(project_name)),
    ] {
        let path = folder.join(file_name);
        let body = serde_json::to_string_pretty(&descriptor)
            .map_err(|e| StageError::DeploymentFailed(format!("cannot encode {}: {}", file_name, e)))?;
        fs::write(&path, body)
            .await
            .map_err(StageError::io_at("write", &path))?;
    }
    log::debug!("Wrote deployment descriptors to {}", folder.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn vercel_config_serves_static_files() {
        let config = vercel_config("bakery");
        assert_eq!(config["name"], "bakery");
        assert_eq!(config["version"], 2);
        assert_eq!(config["public"], true);

        let sources: Vec<&str> = config["builds"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["src"].as_str().unwrap())
            .collect();
        assert_eq!(sources, ["*.html", "*.css", "*.js", "*.json", "images/**"]);

        let routes = config["routes"].as_array().unwrap();
        assert_eq!(routes.len(), 4);
        assert_eq!(routes[0]["dest"], "/images/$1");
        assert_eq!(routes[2]["handle"], "filesystem");
        assert_eq!(routes[3]["dest"], "/index.html");
    }

    #[test]
    fn package_manifest_uses_serve() {
        let manifest = package_manifest("bakery");
        assert_eq!(manifest["version"], "0.0.1");
        assert_eq!(manifest["scripts"]["start"], "serve");
        assert_eq!(manifest["dependencies"]["serve"], "^14.0.0");
    }

    #[tokio::test]
    async fn descriptors_are_rewritten_each_time() {
        let dir = TempDir::new().unwrap();
        write_descriptors(dir.path(), "first").await.unwrap();
        write_descriptors(dir.path(), "second").await.unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(VERCEL_JSON)).unwrap())
                .unwrap();
        assert_eq!(written["name"], "second");
        assert!(dir.path().join(PACKAGE_JSON).exists());
    }
}
