use crate::config::Config;
use crate::io::{self, LoadCommand, LoadQuery, LoadResult, SaveOutcome, TouchIconFetcher};
use crate::state::{BookmarkDraft, BreadcrumbPath, EditorState, EditorView, SaveAction};
use crate::store::{BookmarkStore, BookmarkUpdate, FolderId, FolderRecord, StoreError};
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

const TOAST_DURATION: Duration = Duration::from_millis(2500);
const CLOSE_DELAY: Duration = Duration::from_millis(900);

pub struct QuickmarkApp {
    config: Config,
    store: Arc<dyn BookmarkStore>,
    icons: Arc<dyn TouchIconFetcher>,

    editor: EditorState,
    crumbs: BreadcrumbPath,
    current_folder: FolderId,
    folder_entries: Vec<FolderRecord>,

    // Folder loads run on a worker thread; a new request for the same
    // query kind supersedes the previous one, tracked by these counters.
    loader_tx: Sender<LoadCommand>,
    loader_rx: Receiver<LoadResult>,
    children_seq: u64,
    all_seq: u64,

    // Outcome channel for the per-save thread, scoped to this screen.
    save_tx: Sender<SaveOutcome>,
    save_rx: Receiver<SaveOutcome>,

    toast: Option<(String, Instant)>,
    error: Option<String>,
    /// Data-integrity failure; the screen is unusable past this point.
    fatal: Option<String>,
    close_at: Option<Instant>,
}

impl QuickmarkApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: Config,
        store: Arc<dyn BookmarkStore>,
        icons: Arc<dyn TouchIconFetcher>,
        draft: BookmarkDraft,
    ) -> Self {
        if config.theme.mode == "light" {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
        } else {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
        }

        let (loader_tx, loader_rx) = io::spawn_loader(store.clone(), cc.egui_ctx.clone());
        let (save_tx, save_rx) = channel();

        let current_folder = if draft.parent.is_none() {
            FolderId::ROOT
        } else {
            draft.parent
        };

        let mut app = QuickmarkApp {
            crumbs: BreadcrumbPath::new(config.ui.root_folder_title.clone()),
            config,
            store,
            icons,
            editor: EditorState::new(draft),
            current_folder,
            folder_entries: Vec::new(),
            loader_tx,
            loader_rx,
            children_seq: 0,
            all_seq: 0,
            save_tx,
            save_rx,
            toast: None,
            error: None,
            fatal: None,
            close_at: None,
        };

        // A draft already filed in a non-root folder needs its ancestor
        // chain reconstructed before the picker first renders.
        if app.current_folder != FolderId::ROOT {
            app.request_all_folders();
        }
        app.request_children();
        app
    }

    fn request_children(&mut self) {
        self.children_seq += 1;
        let cmd = LoadCommand {
            query: LoadQuery::FolderChildren(self.current_folder),
            seq: self.children_seq,
        };
        if self.loader_tx.send(cmd).is_err() {
            log::warn!("folder loader is gone");
        }
    }

    fn request_all_folders(&mut self) {
        self.all_seq += 1;
        let cmd = LoadCommand {
            query: LoadQuery::AllFolders,
            seq: self.all_seq,
        };
        if self.loader_tx.send(cmd).is_err() {
            log::warn!("folder loader is gone");
        }
    }

    /// Enter a child folder and reload the picker list. Descending with
    /// the "no selection" sentinel is a no-op by contract.
    fn navigate_into(&mut self, title: String, id: FolderId) {
        if self.crumbs.descend(title, id) {
            self.current_folder = id;
            self.request_children();
        }
    }

    /// Jump to the crumb at `index` (hidden crumbs included).
    fn navigate_to_crumb(&mut self, index: usize) {
        self.current_folder = self.crumbs.ascend_to(index);
        self.request_children();
    }

    fn drain_loader(&mut self) {
        while let Ok(result) = self.loader_rx.try_recv() {
            match result {
                LoadResult::Children { seq, folders } if seq == self.children_seq => {
                    self.folder_entries = folders;
                }
                LoadResult::AllFolders { seq, folders } if seq == self.all_seq => {
                    if let Err(e) = self.crumbs.rebuild(&folders, self.current_folder) {
                        // Store corruption is not recoverable here.
                        log::error!("ancestor reconstruction failed: {}", e);
                        self.fatal = Some(e.to_string());
                    }
                }
                LoadResult::Failed { seq, query, error }
                    if seq == self.children_seq || seq == self.all_seq =>
                {
                    self.error = Some(format!("Could not load folders ({:?}): {}", query, error));
                }
                // Superseded by a newer request of the same kind.
                _ => {}
            }
        }
    }

    fn drain_save_outcomes(&mut self) {
        while let Ok(outcome) = self.save_rx.try_recv() {
            self.editor.saving = false;
            match outcome {
                SaveOutcome::Saved => {
                    self.show_toast("Bookmark saved");
                    self.close_at = Some(Instant::now() + CLOSE_DELAY);
                }
                SaveOutcome::Failed(reason) => {
                    // Inputs stay as they are so the user can retry.
                    self.error = Some(format!("Bookmark not saved: {}", reason));
                }
            }
        }
    }

    fn show_toast(&mut self, msg: impl Into<String>) {
        self.toast = Some((msg.into(), Instant::now() + TOAST_DURATION));
        self.error = None;
    }

    /// The OK button in the fields view: validate and either hand the
    /// updated record to the store (edit) or dispatch one background save
    /// (new bookmark).
    fn accept(&mut self, ctx: &egui::Context) {
        match self.editor.prepare_save(self.current_folder) {
            SaveAction::Rejected => {}
            SaveAction::ReturnToCaller {
                draft,
                invalidate_thumbnail,
            } => {
                let Some(id) = draft.editing else {
                    log::error!("edit save without a record id");
                    return;
                };
                let update = BookmarkUpdate {
                    title: draft.title.clone(),
                    url: draft.url.clone(),
                    parent: draft.parent,
                    invalidate_thumbnail,
                };
                match self.store.update_bookmark(id, &update) {
                    Ok(()) => {
                        self.show_toast("Bookmark updated");
                        self.close_at = Some(Instant::now() + CLOSE_DELAY);
                    }
                    Err(StoreError::Corrupt(msg)) => self.fatal = Some(msg),
                    Err(e) => self.error = Some(format!("Bookmark not saved: {}", e)),
                }
            }
            SaveAction::Persist(payload) => {
                self.editor.saving = true;
                io::spawn_save(
                    self.store.clone(),
                    self.icons.clone(),
                    payload,
                    self.save_tx.clone(),
                    ctx.clone(),
                );
            }
        }
    }

    /// Inline folder creation: on success the picker descends into the
    /// new folder right away.
    fn complete_folder_naming(&mut self) {
        let name = self.editor.folder_name_input.trim().to_string();
        if name.is_empty() {
            return;
        }
        match self.store.insert_folder(&name, self.current_folder) {
            Ok(id) => {
                self.navigate_into(name, id);
                self.editor.folder_name_input.clear();
                self.editor.view = EditorView::Picker;
            }
            Err(StoreError::Corrupt(msg)) => self.fatal = Some(msg),
            Err(e) => self.error = Some(format!("Could not create folder: {}", e)),
        }
    }

    fn close(&self, ctx: &egui::Context) {
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    // --- Views ---

    fn view_fields(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.add_space(8.0);
        ui.heading(if self.editor.draft.is_edit() {
            "Edit bookmark"
        } else {
            "Add bookmark"
        });
        ui.add_space(12.0);

        ui.label("Title");
        ui.add(
            egui::TextEdit::singleline(&mut self.editor.title_input)
                .hint_text("Page title")
                .desired_width(f32::INFINITY),
        );
        if let Some(err) = self.editor.title_error {
            ui.colored_label(egui::Color32::RED, err.to_string());
        }
        ui.add_space(8.0);

        ui.label("Address");
        ui.add(
            egui::TextEdit::singleline(&mut self.editor.url_input)
                .hint_text("https://")
                .desired_width(f32::INFINITY),
        );
        if let Some(err) = self.editor.url_error {
            ui.colored_label(egui::Color32::RED, err.to_string());
        }
        ui.add_space(12.0);

        ui.horizontal(|ui| {
            ui.label("Folder:");
            let current_title = self
                .crumbs
                .crumbs()
                .last()
                .map(|c| c.title.clone())
                .unwrap_or_default();
            if ui.button(format!("\u{f07b} {}", current_title)).clicked() {
                self.editor.view = EditorView::Picker;
            }
        });

        ui.add_space(16.0);
        ui.separator();
        ui.horizontal(|ui| {
            let ok = ui.add_enabled(
                !self.editor.saving,
                egui::Button::new(if self.editor.saving { "Saving..." } else { "OK" }),
            );
            if ok.clicked() {
                self.accept(ctx);
            }
            if ui.button("Cancel").clicked() {
                self.close(ctx);
            }
        });
    }

    fn view_picker(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.add_space(8.0);
        ui.heading("Choose a folder");
        ui.add_space(8.0);

        self.view_breadcrumb_bar(ui);
        ui.separator();

        match self.editor.view {
            EditorView::PickerNaming => {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.editor.folder_name_input)
                        .hint_text("New folder")
                        .desired_width(f32::INFINITY),
                );
                if response.lost_focus() && ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
                    self.complete_folder_naming();
                }
            }
            _ => {
                if ui.button("\u{2795} Add folder").clicked() {
                    self.editor.folder_name_input = "New folder".to_string();
                    self.editor.view = EditorView::PickerNaming;
                }
            }
        }
        ui.add_space(4.0);

        self.view_folder_table(ui);

        ui.add_space(8.0);
        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("OK").clicked() {
                // Naming in progress commits the name; otherwise the
                // current folder is the selection, back to the fields.
                if self.editor.view == EditorView::PickerNaming {
                    self.complete_folder_naming();
                } else {
                    self.editor.view = EditorView::Fields;
                }
            }
            if ui.button("Cancel").clicked() {
                if self.editor.view == EditorView::PickerNaming {
                    self.editor.folder_name_input.clear();
                    self.editor.view = EditorView::Picker;
                } else {
                    self.close(ctx);
                }
            }
        });
    }

    fn view_breadcrumb_bar(&mut self, ui: &mut egui::Ui) {
        let first_visible = self
            .crumbs
            .first_visible(self.config.ui.max_crumbs_shown.max(1));
        let mut clicked: Option<usize> = None;
        let mut back = false;

        ui.horizontal(|ui| {
            // Permanent back control, one level up per press.
            if ui
                .add_enabled(self.crumbs.len() > 1, egui::Button::new("\u{2b05}"))
                .clicked()
            {
                back = true;
            }
            for (index, crumb) in self.crumbs.crumbs().iter().enumerate() {
                if index < first_visible {
                    continue;
                }
                if index > first_visible {
                    ui.label("\u{203a}");
                }
                if ui.button(&crumb.title).clicked() {
                    clicked = Some(index);
                }
            }
        });

        if back {
            let up = self.crumbs.len().saturating_sub(2);
            self.navigate_to_crumb(up);
        } else if let Some(index) = clicked {
            self.navigate_to_crumb(index);
        }
    }

    fn view_folder_table(&mut self, ui: &mut egui::Ui) {
        let mut descend_into: Option<(String, FolderId)> = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, true])
            .max_height((ui.available_height() - 60.0).max(60.0))
            .show(ui, |ui| {
                use egui_extras::{Column, TableBuilder};

                if self.folder_entries.is_empty() {
                    ui.label("No folders here");
                    return;
                }

                TableBuilder::new(ui)
                    .striped(true)
                    .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                    .column(Column::auto().at_least(24.0)) // Icon
                    .column(Column::remainder()) // Name
                    .body(|body| {
                        let row_height = 24.0;
                        let num_rows = self.folder_entries.len();

                        body.rows(row_height, num_rows, |mut row| {
                            let entry = &self.folder_entries[row.index()];
                            row.col(|ui| {
                                ui.label("\u{f07b}");
                            });
                            row.col(|ui| {
                                if ui.selectable_label(false, &entry.title).clicked() {
                                    descend_into = Some((entry.title.clone(), entry.id));
                                }
                            });
                        });
                    });
            });

        if let Some((title, id)) = descend_into {
            self.navigate_into(title, id);
        }
    }

    fn view_status_bar(&mut self, ui: &mut egui::Ui) {
        let now = Instant::now();
        if let Some((_, deadline)) = self.toast {
            if now >= deadline {
                self.toast = None;
            }
        }

        ui.horizontal(|ui| {
            if let Some(err) = &self.error {
                ui.colored_label(egui::Color32::RED, err);
            } else if let Some((msg, deadline)) = &self.toast {
                ui.colored_label(egui::Color32::LIGHT_GREEN, msg);
                ui.ctx()
                    .request_repaint_after(deadline.saturating_duration_since(now));
            } else {
                ui.label("");
            }
        });
    }

    fn view_fatal(&self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.add_space(24.0);
        ui.heading("Bookmark store is corrupt");
        ui.add_space(8.0);
        if let Some(msg) = &self.fatal {
            ui.colored_label(egui::Color32::RED, msg);
        }
        ui.add_space(16.0);
        if ui.button("Close").clicked() {
            self.close(ctx);
        }
    }
}

impl eframe::App for QuickmarkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_loader();
        self.drain_save_outcomes();

        if let Some(at) = self.close_at {
            let now = Instant::now();
            if now >= at {
                self.close(ctx);
            } else {
                ctx.request_repaint_after(at.saturating_duration_since(now));
            }
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.view_status_bar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.fatal.is_some() {
                self.view_fatal(ui, ctx);
                return;
            }
            match self.editor.view {
                EditorView::Fields => self.view_fields(ui, ctx),
                EditorView::Picker | EditorView::PickerNaming => self.view_picker(ui, ctx),
            }
        });
    }
}
