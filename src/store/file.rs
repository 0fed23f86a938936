use super::{
    BookmarkRecord, BookmarkStore, BookmarkUpdate, FolderId, FolderRecord, NewBookmark, StoreError,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// On-disk shape of the store file.
#[derive(Serialize, Deserialize)]
struct StoreFile {
    next_id: i64,
    #[serde(default)]
    folders: Vec<FolderRecord>,
    #[serde(default)]
    bookmarks: Vec<BookmarkRecord>,
}

impl Default for StoreFile {
    fn default() -> Self {
        // Id 1 is the implicit root, so allocation starts past it.
        StoreFile {
            next_id: 2,
            folders: Vec::new(),
            bookmarks: Vec::new(),
        }
    }
}

/// TOML-file-backed bookmark store. The whole state is rewritten on each
/// mutation; bookmark counts in this domain are small.
pub struct FileStore {
    path: PathBuf,
    thumbs_dir: PathBuf,
    inner: Mutex<StoreFile>,
}

impl FileStore {
    /// Open (or create) the store file inside `dir`.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        let path = dir.join("bookmarks.toml");
        let thumbs_dir = dir.join("thumbs");

        let inner = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            toml::from_str::<StoreFile>(&contents)?
        } else {
            StoreFile::default()
        };

        Ok(FileStore {
            path,
            thumbs_dir,
            inner: Mutex::new(inner),
        })
    }

    fn write_to_disk(&self, inner: &StoreFile) -> Result<(), StoreError> {
        let contents = toml::to_string_pretty(inner)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    fn thumb_path(&self, bookmark_id: i64) -> PathBuf {
        self.thumbs_dir.join(format!("{}.png", bookmark_id))
    }

    fn write_thumbnail(&self, bookmark_id: i64, bytes: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.thumbs_dir)?;
        let decoded = image::load_from_memory(bytes)?;
        decoded.save(self.thumb_path(bookmark_id))?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreFile> {
        // A poisoned lock means a writer panicked mid-mutation; the state
        // itself is still a consistent snapshot.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl BookmarkStore for FileStore {
    fn folder_children(&self, parent: FolderId) -> Result<Vec<FolderRecord>, StoreError> {
        let inner = self.lock();
        let mut children: Vec<FolderRecord> = inner
            .folders
            .iter()
            .filter(|f| f.parent == parent)
            .cloned()
            .collect();
        children.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        Ok(children)
    }

    fn all_folders(&self) -> Result<Vec<FolderRecord>, StoreError> {
        Ok(self.lock().folders.clone())
    }

    fn insert_folder(&self, title: &str, parent: FolderId) -> Result<FolderId, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::Rejected("folder needs a name".to_string()));
        }
        if parent.is_none() {
            return Err(StoreError::Rejected(format!(
                "cannot file a folder under {}",
                parent
            )));
        }

        let mut inner = self.lock();
        let id = FolderId(inner.next_id);
        inner.next_id += 1;
        inner.folders.push(FolderRecord {
            id,
            title: title.to_string(),
            parent,
        });
        self.write_to_disk(&inner)?;
        log::debug!("created folder {} ({:?}) under {}", title, id, parent);
        Ok(id)
    }

    fn insert_bookmark(&self, new: &NewBookmark) -> Result<i64, StoreError> {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let now = Utc::now();
        inner.bookmarks.push(BookmarkRecord {
            id,
            title: new.title.clone(),
            url: new.url.clone(),
            parent: new.parent,
            created: now,
            modified: now,
        });
        self.write_to_disk(&inner)?;
        drop(inner);

        if let Some(bytes) = &new.thumbnail {
            // A bad thumbnail must not lose the bookmark itself.
            if let Err(e) = self.write_thumbnail(id, bytes) {
                log::warn!("dropping thumbnail for bookmark {}: {}", id, e);
            }
        }
        log::debug!("saved bookmark {} ({})", id, new.url);
        Ok(id)
    }

    fn update_bookmark(&self, id: i64, update: &BookmarkUpdate) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let record = inner
            .bookmarks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::Rejected(format!("no bookmark with id {}", id)))?;
        record.title = update.title.clone();
        record.url = update.url.clone();
        record.parent = update.parent;
        record.modified = Utc::now();
        self.write_to_disk(&inner)?;
        drop(inner);

        if update.invalidate_thumbnail {
            let thumb = self.thumb_path(id);
            if thumb.exists() {
                if let Err(e) = fs::remove_file(&thumb) {
                    log::warn!("could not remove stale thumbnail {}: {}", thumb.display(), e);
                }
            }
        }
        Ok(())
    }

    fn bookmark(&self, id: i64) -> Result<BookmarkRecord, StoreError> {
        self.lock()
            .bookmarks
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| StoreError::Rejected(format!("no bookmark with id {}", id)))
    }
}
