use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum IconError {
    #[error("cannot fetch icon from {0}")]
    Unsupported(String),
    #[error("icon url is not valid: {0}")]
    BadUrl(#[from] url::ParseError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not decode icon: {0}")]
    Decode(#[from] image::ImageError),
}

/// Fetches a touch icon and associates it with a saved bookmark.
/// Fire-and-forget from the editor's perspective: failures are logged by
/// the caller, never surfaced to the user.
pub trait TouchIconFetcher: Send + Sync {
    fn fetch(&self, icon_url: &str, bookmark_id: i64) -> Result<(), IconError>;
}

/// Resolves `file:` icon URLs, re-encodes the image as PNG and drops it in
/// the icon directory. Network schemes belong to the embedding browser and
/// are reported as unsupported.
pub struct LocalIconStore {
    dir: PathBuf,
}

impl LocalIconStore {
    pub fn new(dir: PathBuf) -> Self {
        LocalIconStore { dir }
    }
}

impl TouchIconFetcher for LocalIconStore {
    fn fetch(&self, icon_url: &str, bookmark_id: i64) -> Result<(), IconError> {
        let parsed = Url::parse(icon_url)?;
        if parsed.scheme() != "file" {
            return Err(IconError::Unsupported(icon_url.to_string()));
        }
        let source = parsed
            .to_file_path()
            .map_err(|_| IconError::Unsupported(icon_url.to_string()))?;

        let bytes = fs::read(source)?;
        let decoded = image::load_from_memory(&bytes)?;
        fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(format!("{}.png", bookmark_id));
        decoded.save(&target)?;
        log::debug!("stored touch icon for bookmark {} at {}", bookmark_id, target.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_file_icon_is_stored_as_png() {
        let scratch = tempfile::tempdir().expect("tempdir");
        let source = scratch.path().join("icon.png");
        image::RgbaImage::new(4, 4)
            .save(&source)
            .expect("write source icon");
        let icon_url = Url::from_file_path(&source).unwrap().to_string();

        let icons = LocalIconStore::new(scratch.path().join("icons"));
        icons.fetch(&icon_url, 42).expect("fetch");
        assert!(scratch.path().join("icons/42.png").exists());
    }

    #[test]
    fn test_network_scheme_is_unsupported() {
        let scratch = tempfile::tempdir().expect("tempdir");
        let icons = LocalIconStore::new(scratch.path().to_path_buf());
        let err = icons
            .fetch("https://example.com/icon.png", 1)
            .unwrap_err();
        assert!(matches!(err, IconError::Unsupported(_)));
    }
}
