use super::markup::{self, FAVICON_FILE, IMAGES_DIR};
use crate::errors::StageError;
use crate::models::generated_files::INDEX_HTML;
use crate::models::{GeneratedFileSet, ImagePlacement};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Prefix of every artifact folder: `website_001`, `website_002`, ...
pub const FOLDER_PREFIX: &str = "website_";

/// Suffix of the validated copy of an artifact folder.
pub const VALIDATED_SUFFIX: &str = "_validated";

/// How many times allocation moves on to the next number after losing a race.
const MAX_ALLOCATION_ATTEMPTS: u32 = 16;

/// Writes generated sites to numbered folders under a root directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    favicon_path: Option<PathBuf>,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>, favicon_path: Option<PathBuf>) -> Self {
        Self {
            root: root.into(),
            favicon_path,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name of the next artifact folder: one past the highest existing number.
    pub async fn next_folder_name(&self) -> Result<String, StageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(StageError::io_at("create", &self.root))?;

        let mut highest = 0u32;
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(StageError::io_at("list", &self.root))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(StageError::io_at("list", &self.root))?
        {
            let name = entry.file_name();
            if let Some(number) = name.to_str().and_then(folder_number) {
                highest = highest.max(number);
            }
        }

        let next = highest.checked_add(1).ok_or_else(|| {
            StageError::filesystem(
                format!("number a new folder under {}", self.root.display()),
                io::Error::other(format!("{}{} is the last folder number", FOLDER_PREFIX, highest)),
            )
        })?;
        Ok(format!("{}{:03}", FOLDER_PREFIX, next))
    }

    /// Creates a fresh artifact folder.
    ///
    /// `create_dir` fails if the folder already exists, so two runs racing for
    /// the same number cannot share a folder; the loser rescans and retries.
    async fn allocate_folder(&self) -> Result<PathBuf, StageError> {
        self.allocate_with(|| self.next_folder_name()).await
    }

    async fn allocate_with<F, Fut>(&self, mut candidate: F) -> Result<PathBuf, StageError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, StageError>>,
    {
        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let folder = self.root.join(candidate().await?);
            match fs::create_dir(&folder).await {
                Ok(()) => return Ok(folder),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    log::warn!("{} was taken concurrently, retrying", folder.display());
                }
                Err(e) => return Err(StageError::filesystem(format!("create {}", folder.display()), e)),
            }
        }
        Err(StageError::filesystem(
            format!("allocate a folder under {}", self.root.display()),
            io::Error::new(io::ErrorKind::AlreadyExists, "too many concurrent allocations"),
        ))
    }

    /// Writes a generated site to a new artifact folder and returns its path.
    #[cfg(test)]
    pub async fn save(
        &self,
        files: &GeneratedFileSet,
        images: &[ImagePlacement],
    ) -> Result<PathBuf, StageError> {
        let folder = self.create_folder(files).await?;
        self.populate(&folder, files, images).await?;
        Ok(folder)
    }

    /// Claims a new artifact folder for `files`, refusing a set with nothing to write.
    pub async fn create_folder(&self, files: &GeneratedFileSet) -> Result<PathBuf, StageError> {
        if !files.has_content() {
            return Err(StageError::NoContent(
                "the generator produced no website files".to_string(),
            ));
        }
        self.allocate_folder().await
    }

    /// Fills a claimed folder with images, the default favicon and the site files.
    pub async fn populate(
        &self,
        folder: &Path,
        files: &GeneratedFileSet,
        images: &[ImagePlacement],
    ) -> Result<(), StageError> {
        log::info!("Saving website files to {}", folder.display());

        let images_dir = folder.join(IMAGES_DIR);
        fs::create_dir_all(&images_dir)
            .await
            .map_err(StageError::io_at("create", &images_dir))?;

        for image in images {
            let name = image.basename();
            if name.is_empty() {
                continue;
            }
            let destination = images_dir.join(name);
            fs::copy(&image.source_path, &destination)
                .await
                .map_err(|e| {
                    StageError::filesystem(format!("copy image {}", image.source_path), e)
                })?;
            log::debug!("Copied image {} to {}", image.source_path, destination.display());
        }

        let favicon_added = self.copy_default_favicon(&images_dir).await?;

        let known_paths: Vec<&str> = images.iter().map(|i| i.source_path.as_str()).collect();
        for (name, content) in files.non_empty() {
            let mut content = content.to_string();
            if is_html(name) {
                log::debug!("Image sources in {} before: {:?}", name, markup::img_sources(&content));
                content = markup::rewrite_image_sources(&content, &known_paths);
                if favicon_added && name == INDEX_HTML {
                    content = markup::inject_favicon_link(&content);
                }
                log::debug!("Image sources in {} after: {:?}", name, markup::img_sources(&content));
            }

            let path = folder.join(name);
            fs::write(&path, content)
                .await
                .map_err(StageError::io_at("write", &path))?;
            log::debug!("Saved {}", name);
        }

        Ok(())
    }

    /// Copies the configured default favicon unless the site already has one.
    async fn copy_default_favicon(&self, images_dir: &Path) -> Result<bool, StageError> {
        let Some(source) = &self.favicon_path else {
            return Ok(false);
        };
        let target = images_dir.join(FAVICON_FILE);
        if exists(&target).await {
            return Ok(false);
        }
        if !exists(source).await {
            log::debug!("No default favicon at {}, skipping", source.display());
            return Ok(false);
        }
        fs::copy(source, &target)
            .await
            .map_err(StageError::io_at("copy favicon to", &target))?;
        Ok(true)
    }
}

/// `website_007` -> 7; anything else (including `website_007_validated`) -> None.
fn folder_number(name: &str) -> Option<u32> {
    let digits = name.strip_prefix(FOLDER_PREFIX)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Sibling folder that holds the validated copy of `folder`.
pub fn validated_folder_for(folder: &Path) -> PathBuf {
    let mut name = folder
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(VALIDATED_SUFFIX);
    folder.with_file_name(name)
}

pub fn is_html(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".html")
}

async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// [`copy_dir_all`] on the blocking thread pool.
pub async fn copy_dir(src: &Path, dst: &Path) -> io::Result<usize> {
    let (src, dst) = (src.to_path_buf(), dst.to_path_buf());
    tokio::task::spawn_blocking(move || copy_dir_all(&src, &dst))
        .await
        .map_err(io::Error::other)?
}

/// Recursively copies `src` into `dst`, returning the number of files copied.
pub fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
