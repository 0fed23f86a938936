mod file;

pub use file::FileStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a folder in the bookmark hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(pub i64);

impl FolderId {
    /// The top of the hierarchy. Never stored as a record of its own.
    pub const ROOT: FolderId = FolderId(1);
    /// "No folder selected" sentinel used by pickers.
    pub const NONE: FolderId = FolderId(-1);
    /// Parent value that terminates an ancestor walk.
    pub const NO_PARENT: FolderId = FolderId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl std::fmt::Display for FolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderRecord {
    pub id: FolderId,
    pub title: String,
    pub parent: FolderId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub parent: FolderId,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Fields of a bookmark about to be inserted.
#[derive(Debug, Clone)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    pub parent: FolderId,
    /// Encoded image bytes captured by the browser, if any.
    pub thumbnail: Option<Vec<u8>>,
}

/// Fields applied to an existing bookmark.
#[derive(Debug, Clone)]
pub struct BookmarkUpdate {
    pub title: String,
    pub url: String,
    pub parent: FolderId,
    /// Set when the URL changed, so a stale thumbnail is discarded.
    pub invalidate_thumbnail: bool,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not encode store file: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("bad thumbnail image: {0}")]
    Image(#[from] image::ImageError),
    #[error("store rejected the write: {0}")]
    Rejected(String),
    #[error("bookmark store is corrupt: {0}")]
    Corrupt(String),
}

/// Backing store contract: folder queries keyed by parent id, plus
/// folder/bookmark writes. Implementations are shared across the UI
/// thread, the loader worker and per-save threads.
pub trait BookmarkStore: Send + Sync {
    /// Folders whose parent is `parent`, sorted by title.
    fn folder_children(&self, parent: FolderId) -> Result<Vec<FolderRecord>, StoreError>;

    /// Every folder record, for ancestor-path reconstruction.
    fn all_folders(&self) -> Result<Vec<FolderRecord>, StoreError>;

    /// Insert a folder under `parent` and return its id.
    fn insert_folder(&self, title: &str, parent: FolderId) -> Result<FolderId, StoreError>;

    /// Insert a bookmark and return its id.
    fn insert_bookmark(&self, new: &NewBookmark) -> Result<i64, StoreError>;

    /// Apply `update` to an existing bookmark.
    fn update_bookmark(&self, id: i64, update: &BookmarkUpdate) -> Result<(), StoreError>;

    /// Look up a single bookmark, for edit mode.
    fn bookmark(&self, id: i64) -> Result<BookmarkRecord, StoreError>;
}
