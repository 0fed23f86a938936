// Breadcrumb state - the ordered path from the root folder to the
// current selection.
use crate::store::{FolderId, FolderRecord, StoreError};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Crumb {
    pub title: String,
    pub id: FolderId,
}

/// Root-to-current folder path. Only ever pushed (descend) or truncated
/// (ascend); entries are never reordered.
pub struct BreadcrumbPath {
    crumbs: Vec<Crumb>,
}

impl BreadcrumbPath {
    pub fn new(root_title: impl Into<String>) -> Self {
        BreadcrumbPath {
            crumbs: vec![Crumb {
                title: root_title.into(),
                id: FolderId::ROOT,
            }],
        }
    }

    /// Id of the folder the path currently ends on.
    pub fn current(&self) -> FolderId {
        // Invariant: the root crumb is never removed.
        self.crumbs.last().map(|c| c.id).unwrap_or(FolderId::ROOT)
    }

    pub fn len(&self) -> usize {
        self.crumbs.len()
    }

    pub fn crumbs(&self) -> &[Crumb] {
        &self.crumbs
    }

    /// Append a crumb and make it current. Passing the "no selection"
    /// sentinel is a no-op, not an error; returns whether the path moved.
    pub fn descend(&mut self, title: impl Into<String>, id: FolderId) -> bool {
        if id.is_none() {
            return false;
        }
        self.crumbs.push(Crumb {
            title: title.into(),
            id,
        });
        true
    }

    /// Truncate the path so the crumb at `index` becomes current, and
    /// return the new current id.
    pub fn ascend_to(&mut self, index: usize) -> FolderId {
        self.crumbs.truncate(index + 1);
        self.current()
    }

    /// Index of the first crumb that should be rendered when at most
    /// `max_shown` segments fit. Everything before it stays in the path
    /// (ascend-by-index still works) but is hidden from the bar.
    pub fn first_visible(&self, max_shown: usize) -> usize {
        self.crumbs.len().saturating_sub(max_shown)
    }

    /// Replace everything below the root with the ancestor chain of
    /// `start`, reconstructed from the full folder set.
    ///
    /// A missing parent, an empty folder set, or a parent chain that does
    /// not terminate all mean the store is inconsistent; those surface as
    /// [`StoreError::Corrupt`] rather than a silently truncated path.
    pub fn rebuild(
        &mut self,
        folders: &[FolderRecord],
        start: FolderId,
    ) -> Result<(), StoreError> {
        self.crumbs.truncate(1);
        if start == FolderId::ROOT || start.is_none() {
            return Ok(());
        }

        let by_id: HashMap<FolderId, &FolderRecord> =
            folders.iter().map(|f| (f.id, f)).collect();

        // Walk child -> root, then reverse so the path reads root -> child.
        let mut chain: Vec<Crumb> = Vec::new();
        let mut parent = start;
        while parent != FolderId::ROOT && parent != FolderId::NO_PARENT {
            if folders.is_empty() {
                return Err(StoreError::Corrupt("no folders in the store".to_string()));
            }
            let record = by_id.get(&parent).ok_or_else(|| {
                StoreError::Corrupt(format!(
                    "folder {} holding this bookmark does not exist",
                    parent
                ))
            })?;
            chain.push(Crumb {
                title: record.title.clone(),
                id: record.id,
            });
            if chain.len() > folders.len() {
                return Err(StoreError::Corrupt(format!(
                    "parent chain of folder {} does not reach the root",
                    start
                )));
            }
            parent = record.parent;
        }

        self.crumbs.extend(chain.into_iter().rev());
        Ok(())
    }
}
