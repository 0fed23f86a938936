use crate::state::draft::BookmarkDraft;
use crate::store::FolderId;
use crate::validate::{self, FieldError};

/// Which part of the screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorView {
    /// Title/URL fields plus the folder row.
    Fields,
    /// Folder picker: breadcrumb bar and folder list.
    Picker,
    /// Folder picker with the inline new-folder name input open.
    PickerNaming,
}

/// Everything a dispatched save needs; handed to the save thread.
#[derive(Debug, Clone)]
pub struct SavePayload {
    pub title: String,
    pub url: String,
    pub parent: FolderId,
    pub thumbnail: Option<Vec<u8>>,
    pub touch_icon_url: Option<String>,
}

/// What pressing OK resolved to.
#[derive(Debug)]
pub enum SaveAction {
    /// Validation failed; field errors are set on the state.
    Rejected,
    /// Editing an existing bookmark: the updated draft goes back to the
    /// caller synchronously, no store write happens in the editor.
    ReturnToCaller {
        draft: BookmarkDraft,
        invalidate_thumbnail: bool,
    },
    /// New bookmark: dispatch exactly one background save.
    Persist(SavePayload),
}

/// Mutable screen state around the immutable draft.
pub struct EditorState {
    pub draft: BookmarkDraft,
    pub title_input: String,
    pub url_input: String,
    pub folder_name_input: String,
    pub view: EditorView,
    pub title_error: Option<FieldError>,
    pub url_error: Option<FieldError>,
    /// A save has been dispatched and its outcome is still pending.
    pub saving: bool,
}

impl EditorState {
    pub fn new(draft: BookmarkDraft) -> Self {
        EditorState {
            title_input: draft.title.clone(),
            url_input: draft.url.clone(),
            folder_name_input: String::new(),
            view: EditorView::Fields,
            title_error: None,
            url_error: None,
            saving: false,
            draft,
        }
    }

    /// Validate the inputs and decide how the save proceeds. Both field
    /// errors are recomputed on every attempt so stale annotations clear.
    pub fn prepare_save(&mut self, current_folder: FolderId) -> SaveAction {
        let checked = validate::validate(&self.title_input, &self.url_input);
        self.title_error = checked.title_error;
        self.url_error = checked.url_error;
        if !checked.is_ok() {
            return SaveAction::Rejected;
        }

        let title = self.title_input.trim().to_string();
        let url = checked.url.unwrap_or_default();
        let invalidated = self.draft.thumbnail_invalidated_by(&url);

        if self.draft.is_edit() {
            SaveAction::ReturnToCaller {
                draft: self.draft.with_fields(title, url, current_folder),
                invalidate_thumbnail: invalidated,
            }
        } else {
            SaveAction::Persist(SavePayload {
                title,
                url,
                parent: current_folder,
                thumbnail: if invalidated {
                    None
                } else {
                    self.draft.thumbnail.clone()
                },
                touch_icon_url: self.draft.touch_icon_url.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BookmarkRecord, FolderId};
    use chrono::Utc;

    fn record(id: i64) -> BookmarkRecord {
        BookmarkRecord {
            id,
            title: "Example".to_string(),
            url: "http://example.com/".to_string(),
            parent: FolderId::ROOT,
            created: Utc::now(),
            modified: Utc::now(),
        }
    }

    #[test]
    fn test_invalid_input_rejects_and_annotates() {
        let mut state = EditorState::new(BookmarkDraft::new_page(
            String::new(),
            String::new(),
        ));
        let action = state.prepare_save(FolderId::ROOT);
        assert!(matches!(action, SaveAction::Rejected));
        assert!(state.title_error.is_some());
        assert!(state.url_error.is_some());

        // Errors clear once the input is fixed.
        state.title_input = "t".to_string();
        state.url_input = "example.com".to_string();
        let action = state.prepare_save(FolderId::ROOT);
        assert!(matches!(action, SaveAction::Persist(_)));
        assert!(state.title_error.is_none());
        assert!(state.url_error.is_none());
    }

    #[test]
    fn test_edit_returns_to_caller_without_dispatch() {
        let mut state = EditorState::new(BookmarkDraft::edit(&record(7)));
        state.title_input = "Renamed".to_string();
        let action = state.prepare_save(FolderId(3));
        match action {
            SaveAction::ReturnToCaller {
                draft,
                invalidate_thumbnail,
            } => {
                assert_eq!(draft.editing, Some(7));
                assert_eq!(draft.title, "Renamed");
                assert_eq!(draft.parent, FolderId(3));
                assert!(!invalidate_thumbnail);
            }
            other => panic!("expected ReturnToCaller, got {:?}", other),
        }
    }

    #[test]
    fn test_new_bookmark_dispatches_with_thumbnail() {
        let mut draft =
            BookmarkDraft::new_page("t".to_string(), "http://example.com/".to_string());
        draft.thumbnail = Some(vec![9]);
        let mut state = EditorState::new(draft);
        match state.prepare_save(FolderId::ROOT) {
            SaveAction::Persist(payload) => {
                assert_eq!(payload.thumbnail, Some(vec![9]));
                assert_eq!(payload.url, "http://example.com/");
            }
            other => panic!("expected Persist, got {:?}", other),
        }
    }

    #[test]
    fn test_changed_url_drops_the_thumbnail() {
        let mut draft =
            BookmarkDraft::new_page("t".to_string(), "http://example.com/".to_string());
        draft.thumbnail = Some(vec![9]);
        let mut state = EditorState::new(draft);
        state.url_input = "http://elsewhere.example/".to_string();
        match state.prepare_save(FolderId::ROOT) {
            SaveAction::Persist(payload) => assert_eq!(payload.thumbnail, None),
            other => panic!("expected Persist, got {:?}", other),
        }
    }
}
