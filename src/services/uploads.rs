use crate::constants::IMAGE_EXTENSIONS;
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// An uploaded image that passed type checks but is not on disk yet.
#[derive(Debug, Clone)]
pub struct PendingImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl PendingImage {
    /// Accepts the upload only when both the file extension and the declared
    /// content type (if any) say it is an image.
    #[must_use]
    pub fn new(file_name: Option<&str>, content_type: Option<&str>, bytes: Vec<u8>) -> Option<Self> {
        let extension = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)?;

        if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return None;
        }

        let guessed = mime_guess::from_ext(&extension).first()?;
        if guessed.type_() != mime_guess::mime::IMAGE {
            return None;
        }

        if let Some(declared) = content_type
            && !declared.starts_with("image/")
        {
            return None;
        }

        if bytes.is_empty() {
            return None;
        }

        Some(Self { extension, bytes })
    }
}

/// Item images on local disk, served statically under `/uploads`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create uploads dir {}", self.dir.display()))
    }

    /// Writes the image under a fresh name and returns that name.
    pub async fn save(&self, image: PendingImage) -> Result<String> {
        self.ensure_dir().await?;

        let filename = format!("item-{}.{}", uuid::Uuid::new_v4(), image.extension);
        let file_path = self.dir.join(&filename);

        fs::write(&file_path, &image.bytes)
            .await
            .with_context(|| format!("Failed to write image to {}", file_path.display()))?;

        info!(path = %file_path.display(), bytes = image.bytes.len(), "Stored upload");
        Ok(filename)
    }

    /// Removes a stored image. A missing file is not an error.
    pub async fn remove(&self, filename: &str) -> Result<bool> {
        let Some(path) = self.path_for(filename) else {
            warn!(filename, "Refusing to remove image outside uploads dir");
            return Ok(false);
        };

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }

    /// Best-effort removal for cleanup paths; failures are only logged.
    pub async fn discard(&self, filename: &str) {
        if let Err(e) = self.remove(filename).await {
            warn!(filename, error = %e, "Failed to clean up image");
        }
    }

    /// Resolves a stored name, rejecting anything that is not a bare file name.
    #[must_use]
    pub fn path_for(&self, filename: &str) -> Option<PathBuf> {
        let name = Path::new(filename).file_name()?;
        if name.to_str() != Some(filename) {
            return None;
        }
        Some(self.dir.join(name))
    }
}
