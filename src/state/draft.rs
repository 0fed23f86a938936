use crate::store::{BookmarkRecord, FolderId};

/// The in-progress bookmark being created or edited. Immutable: edits
/// produce a new value via [`BookmarkDraft::with_fields`].
#[derive(Debug, Clone)]
pub struct BookmarkDraft {
    pub title: String,
    pub url: String,
    pub parent: FolderId,
    /// Encoded page snapshot handed in by the browser, if any.
    pub thumbnail: Option<Vec<u8>>,
    pub touch_icon_url: Option<String>,
    /// Id of the record being edited; `None` for a new bookmark.
    pub editing: Option<i64>,
}

impl BookmarkDraft {
    /// Draft for bookmarking a freshly visited page.
    pub fn new_page(title: String, url: String) -> Self {
        BookmarkDraft {
            title,
            url,
            parent: FolderId::ROOT,
            thumbnail: None,
            touch_icon_url: None,
            editing: None,
        }
    }

    /// Draft seeded from an existing record.
    pub fn edit(record: &BookmarkRecord) -> Self {
        BookmarkDraft {
            title: record.title.clone(),
            url: record.url.clone(),
            parent: record.parent,
            thumbnail: None,
            touch_icon_url: None,
            editing: Some(record.id),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    /// New draft with the user-editable fields replaced.
    pub fn with_fields(&self, title: String, url: String, parent: FolderId) -> Self {
        BookmarkDraft {
            title,
            url,
            parent,
            thumbnail: self.thumbnail.clone(),
            touch_icon_url: self.touch_icon_url.clone(),
            editing: self.editing,
        }
    }

    /// The captured thumbnail shows the original page; it is stale as soon
    /// as the URL differs from the one it was captured for.
    pub fn thumbnail_invalidated_by(&self, new_url: &str) -> bool {
        new_url != self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_fields_keeps_identity_and_attachments() {
        let mut draft = BookmarkDraft::new_page("t".to_string(), "http://a/".to_string());
        draft.thumbnail = Some(vec![1, 2, 3]);
        let updated = draft.with_fields("t2".to_string(), "http://b/".to_string(), FolderId(4));
        assert_eq!(updated.title, "t2");
        assert_eq!(updated.parent, FolderId(4));
        assert_eq!(updated.thumbnail, Some(vec![1, 2, 3]));
        assert!(!updated.is_edit());
        // The original value is untouched.
        assert_eq!(draft.title, "t");
    }

    #[test]
    fn test_thumbnail_invalidation_tracks_url_change() {
        let draft = BookmarkDraft::new_page("t".to_string(), "http://a/".to_string());
        assert!(!draft.thumbnail_invalidated_by("http://a/"));
        assert!(draft.thumbnail_invalidated_by("http://b/"));
    }
}
