use super::writer::is_html;
use crate::errors::StageError;
use crate::models::GeneratedFileSet;
use std::path::Path;
use tokio::fs;

/// Maximum size of a site file read back for validation (10 MB).
const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Reads the named files from `folder`, skipping missing and empty ones.
pub async fn read_files(folder: &Path, names: &[String]) -> Result<GeneratedFileSet, StageError> {
    let mut files = GeneratedFileSet::new();
    for name in names {
        let path = folder.join(name);
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => continue,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(StageError::filesystem(format!("inspect {}", path.display()), e)),
        };

        if metadata.len() > MAX_FILE_SIZE {
            log::warn!(
                "Skipping {} ({} bytes, max {} bytes)",
                path.display(),
                metadata.len(),
                MAX_FILE_SIZE
            );
            continue;
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(StageError::io_at("read", &path))?;
        if content.is_empty() {
            continue;
        }
        files.insert(name.clone(), content);
    }
    Ok(files)
}

/// Top-level `.html` files in `folder`, sorted by name.
pub async fn html_files_in(folder: &Path) -> Result<Vec<String>, StageError> {
    let mut names = Vec::new();
    let mut entries = fs::read_dir(folder)
        .await
        .map_err(StageError::io_at("list", folder))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(StageError::io_at("list", folder))?
    {
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if let Some(name) = entry.file_name().to_str() {
            if is_file && is_html(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
