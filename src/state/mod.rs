pub mod crumbs;
pub mod draft;
pub mod editor;

pub use crumbs::BreadcrumbPath;
pub use draft::BookmarkDraft;
pub use editor::{EditorState, EditorView, SaveAction, SavePayload};
