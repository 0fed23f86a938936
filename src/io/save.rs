use crate::io::icon::TouchIconFetcher;
use crate::state::SavePayload;
use crate::store::{BookmarkStore, NewBookmark};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

/// Typed result of a background save, delivered over a channel owned by
/// the screen that dispatched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed(String),
}

/// Write a new bookmark on a dedicated thread so the UI thread never
/// blocks on store I/O. One thread per save; no cancellation. The icon
/// fetch is fire-and-forget and cannot fail the save.
pub fn spawn_save(
    store: Arc<dyn BookmarkStore>,
    icons: Arc<dyn TouchIconFetcher>,
    payload: SavePayload,
    outcome_tx: Sender<SaveOutcome>,
    ctx: eframe::egui::Context,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let outcome = match store.insert_bookmark(&NewBookmark {
            title: payload.title,
            url: payload.url.clone(),
            parent: payload.parent,
            thumbnail: payload.thumbnail,
        }) {
            Ok(id) => {
                if let Some(icon_url) = &payload.touch_icon_url {
                    if let Err(e) = icons.fetch(icon_url, id) {
                        log::warn!("touch icon fetch for bookmark {} failed: {}", id, e);
                    }
                }
                SaveOutcome::Saved
            }
            Err(e) => {
                log::warn!("bookmark save failed: {}", e);
                SaveOutcome::Failed(e.to_string())
            }
        };
        // The receiver lives as long as the screen; if it is gone the
        // outcome has no audience.
        let _ = outcome_tx.send(outcome);
        ctx.request_repaint();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::icon::IconError;
    use crate::store::{
        BookmarkRecord, BookmarkUpdate, FolderId, FolderRecord, StoreError,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::channel;

    /// Store that counts inserts and can be told to refuse them.
    struct CountingStore {
        inserts: AtomicUsize,
        fail: bool,
    }

    impl BookmarkStore for CountingStore {
        fn folder_children(&self, _: FolderId) -> Result<Vec<FolderRecord>, StoreError> {
            Ok(Vec::new())
        }
        fn all_folders(&self) -> Result<Vec<FolderRecord>, StoreError> {
            Ok(Vec::new())
        }
        fn insert_folder(&self, _: &str, _: FolderId) -> Result<FolderId, StoreError> {
            Err(StoreError::Rejected("not under test".to_string()))
        }
        fn insert_bookmark(&self, _: &NewBookmark) -> Result<i64, StoreError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(StoreError::Rejected("disk full".to_string()))
            } else {
                Ok(1)
            }
        }
        fn update_bookmark(&self, _: i64, _: &BookmarkUpdate) -> Result<(), StoreError> {
            Ok(())
        }
        fn bookmark(&self, _: i64) -> Result<BookmarkRecord, StoreError> {
            Err(StoreError::Rejected("not under test".to_string()))
        }
    }

    struct NoIcons;
    impl TouchIconFetcher for NoIcons {
        fn fetch(&self, url: &str, _: i64) -> Result<(), IconError> {
            Err(IconError::Unsupported(url.to_string()))
        }
    }

    fn payload() -> SavePayload {
        SavePayload {
            title: "t".to_string(),
            url: "http://example.com/".to_string(),
            parent: FolderId::ROOT,
            thumbnail: None,
            touch_icon_url: None,
        }
    }

    #[test]
    fn test_save_writes_once_and_reports_success() {
        let store = Arc::new(CountingStore {
            inserts: AtomicUsize::new(0),
            fail: false,
        });
        let (tx, rx) = channel();
        let handle = spawn_save(
            store.clone(),
            Arc::new(NoIcons),
            payload(),
            tx,
            eframe::egui::Context::default(),
        );
        handle.join().unwrap();
        assert_eq!(rx.recv().unwrap(), SaveOutcome::Saved);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rejected_write_reports_failure() {
        let store = Arc::new(CountingStore {
            inserts: AtomicUsize::new(0),
            fail: true,
        });
        let (tx, rx) = channel();
        spawn_save(
            store,
            Arc::new(NoIcons),
            payload(),
            tx,
            eframe::egui::Context::default(),
        )
        .join()
        .unwrap();
        match rx.recv().unwrap() {
            SaveOutcome::Failed(reason) => assert!(reason.contains("disk full")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_icon_fetch_does_not_fail_the_save() {
        let store = Arc::new(CountingStore {
            inserts: AtomicUsize::new(0),
            fail: false,
        });
        let mut p = payload();
        p.touch_icon_url = Some("https://example.com/apple-touch-icon.png".to_string());
        let (tx, rx) = channel();
        spawn_save(
            store,
            Arc::new(NoIcons),
            p,
            tx,
            eframe::egui::Context::default(),
        )
        .join()
        .unwrap();
        assert_eq!(rx.recv().unwrap(), SaveOutcome::Saved);
    }
}
