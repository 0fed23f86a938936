use crate::store::{BookmarkStore, FolderId, FolderRecord};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

/// The two folder queries the screen issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadQuery {
    /// Folders directly under the given folder, for the picker list.
    FolderChildren(FolderId),
    /// Every folder, for ancestor-path reconstruction.
    AllFolders,
}

impl LoadQuery {
    fn same_kind(self, other: LoadQuery) -> bool {
        matches!(
            (self, other),
            (LoadQuery::FolderChildren(_), LoadQuery::FolderChildren(_))
                | (LoadQuery::AllFolders, LoadQuery::AllFolders)
        )
    }
}

#[derive(Debug)]
pub struct LoadCommand {
    pub query: LoadQuery,
    /// Request sequence number; the UI drops results of superseded requests.
    pub seq: u64,
}

#[derive(Debug)]
pub enum LoadResult {
    Children {
        seq: u64,
        folders: Vec<FolderRecord>,
    },
    AllFolders {
        seq: u64,
        folders: Vec<FolderRecord>,
    },
    Failed {
        seq: u64,
        query: LoadQuery,
        error: String,
    },
}

/// A newer request for the same query kind supersedes an older one, so a
/// backlog never holds more than one command per kind. Keeps the last
/// command of each kind, in arrival order of the survivors.
fn collapse_backlog(commands: Vec<LoadCommand>) -> Vec<LoadCommand> {
    let mut survivors: Vec<LoadCommand> = Vec::new();
    for cmd in commands {
        survivors.retain(|kept| !kept.query.same_kind(cmd.query));
        survivors.push(cmd);
    }
    survivors
}

/// Spawn the folder loader thread. Results come back over the returned
/// receiver; the egui context is repainted so they get drained promptly.
pub fn spawn_loader(
    store: Arc<dyn BookmarkStore>,
    ctx: eframe::egui::Context,
) -> (Sender<LoadCommand>, Receiver<LoadResult>) {
    let (cmd_tx, cmd_rx) = channel::<LoadCommand>();
    let (res_tx, res_rx) = channel::<LoadResult>();

    thread::spawn(move || {
        while let Ok(first) = cmd_rx.recv() {
            // Drain whatever piled up while the previous query ran.
            let mut backlog = vec![first];
            while let Ok(next) = cmd_rx.try_recv() {
                backlog.push(next);
            }

            for cmd in collapse_backlog(backlog) {
                let result = match cmd.query {
                    LoadQuery::FolderChildren(parent) => {
                        store
                            .folder_children(parent)
                            .map(|folders| LoadResult::Children {
                                seq: cmd.seq,
                                folders,
                            })
                    }
                    LoadQuery::AllFolders => {
                        store.all_folders().map(|folders| LoadResult::AllFolders {
                            seq: cmd.seq,
                            folders,
                        })
                    }
                };
                let result = result.unwrap_or_else(|e| {
                    log::warn!("folder load {:?} failed: {}", cmd.query, e);
                    LoadResult::Failed {
                        seq: cmd.seq,
                        query: cmd.query,
                        error: e.to_string(),
                    }
                });
                // The screen may already be gone; nothing left to do then.
                if res_tx.send(result).is_err() {
                    return;
                }
            }
            ctx.request_repaint();
        }
    });

    (cmd_tx, res_rx)
}
