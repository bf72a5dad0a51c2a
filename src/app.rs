//! Application state and the event plumbing between the UI loop and the
//! spawned network calls.
//!
//! All mutation of [`FeedList`] and the forms happens on the event loop.
//! A submit hands the request payload to a spawned task and returns
//! immediately; the task sends an [`AppEvent`] back over the channel and the
//! loop applies it to the owning form. The per-form in-flight guard means a
//! form never has two requests outstanding; an add and an edit may overlap,
//! which is safe because commits only append or merge by key.

use crate::api::{ApiError, Feed, FeedClient, FeedPatch};
use crate::forms::{AddFeedForm, EditFeedForm};
use crate::registry::{FeedList, Mode};
use tokio::sync::mpsc;

/// Which pane receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Form,
}

/// Completions of background network calls.
pub enum AppEvent {
    /// A (re)load of the whole collection resolved.
    Loaded(Result<Vec<Feed>, ApiError>),
    /// The add form's POST resolved.
    CreateFinished(Result<Feed, ApiError>),
    /// The edit form's PUT resolved. Carries the key and patch so the merge
    /// can still be applied if the selection moved on meanwhile.
    UpdateFinished {
        name: String,
        patch: FeedPatch,
        result: Result<(), ApiError>,
    },
    /// A DELETE (mark-for-deletion) resolved.
    DeleteFinished {
        name: String,
        result: Result<(), ApiError>,
    },
}

/// Top-level application state.
pub struct App {
    pub client: FeedClient,
    pub list: FeedList,
    pub add_form: AddFeedForm,
    pub edit_form: EditFeedForm,

    /// List cursor; independent of the committed selection in `list`.
    pub cursor: usize,
    pub focus: Focus,
    /// Focused field index within the open form.
    pub field: usize,

    /// Error shown on the list view (load or delete failures).
    pub list_error: Option<String>,
    pub loading: bool,
    delete_in_flight: bool,

    pub needs_redraw: bool,
}

impl App {
    pub fn new(client: FeedClient) -> Self {
        Self {
            client,
            list: FeedList::new(),
            add_form: AddFeedForm::default(),
            edit_form: EditFeedForm::default(),
            cursor: 0,
            focus: Focus::List,
            field: 0,
            list_error: None,
            loading: false,
            delete_in_flight: false,
            needs_redraw: true,
        }
    }

    /// Feed under the list cursor.
    pub fn feed_at_cursor(&self) -> Option<&Feed> {
        self.list.feeds().get(self.cursor)
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.list.len() {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Number of input fields in the currently open form.
    pub fn field_count(&self) -> usize {
        match self.list.mode() {
            Mode::Idle => 0,
            Mode::Adding => 2,  // name, url
            Mode::Editing => 3, // url, content type, deletion flag
        }
    }

    // ========================================================================
    // Selection transitions
    // ========================================================================

    /// Open the add form.
    pub fn begin_add(&mut self) {
        self.list.begin_add();
        self.add_form.reset();
        // Selection cleared: notify the edit form so its draft goes inert.
        self.edit_form.on_selection_changed(None);
        self.focus = Focus::Form;
        self.field = 0;
    }

    /// Open the edit form for the feed under the cursor.
    pub fn begin_edit_at_cursor(&mut self) {
        let Some(name) = self.feed_at_cursor().map(|f| f.name.clone()) else {
            return;
        };
        if self.list.begin_edit(&name).is_some() {
            self.edit_form.on_selection_changed(self.list.selected());
            self.focus = Focus::Form;
            self.field = 0;
        }
    }

    /// Close whatever form is open and return focus to the list.
    pub fn close_form(&mut self) {
        self.list.close_form();
        self.edit_form.on_selection_changed(None);
        self.focus = Focus::List;
        self.field = 0;
    }

    // ========================================================================
    // Spawned network calls
    // ========================================================================

    /// Re-fetch the collection; replace-on-success semantics apply when the
    /// completion arrives.
    pub fn reload(&mut self, tx: &mpsc::Sender<AppEvent>) {
        if self.loading {
            return;
        }
        self.loading = true;
        let client = self.client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = client.list().await;
            if tx.send(AppEvent::Loaded(result)).await.is_err() {
                tracing::warn!("Load completion dropped (receiver gone)");
            }
        });
    }

    /// Submit the add form. A no-op while a previous submit is outstanding.
    pub fn submit_add(&mut self, tx: &mpsc::Sender<AppEvent>) {
        let Some(draft) = self.add_form.begin_submit() else {
            return;
        };
        let client = self.client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = client.create(&draft).await;
            if tx.send(AppEvent::CreateFinished(result)).await.is_err() {
                tracing::warn!("Create completion dropped (receiver gone)");
            }
        });
    }

    /// Submit the edit form. A no-op while a previous submit is outstanding
    /// or when nothing is selected.
    pub fn submit_edit(&mut self, tx: &mpsc::Sender<AppEvent>) {
        let Some((name, patch)) = self.edit_form.begin_submit() else {
            return;
        };
        let client = self.client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let body = patch.clone().into_feed(name.clone());
            let result = client.update(&name, &body).await;
            let event = AppEvent::UpdateFinished {
                name,
                patch,
                result,
            };
            if tx.send(event).await.is_err() {
                tracing::warn!("Update completion dropped (receiver gone)");
            }
        });
    }

    /// Flag the feed under the cursor for deletion.
    pub fn request_delete(&mut self, tx: &mpsc::Sender<AppEvent>) {
        if self.delete_in_flight {
            return;
        }
        let Some(name) = self.feed_at_cursor().map(|f| f.name.clone()) else {
            return;
        };
        self.delete_in_flight = true;
        let client = self.client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = client.mark_deleted(&name).await;
            let event = AppEvent::DeleteFinished { name, result };
            if tx.send(event).await.is_err() {
                tracing::warn!("Delete completion dropped (receiver gone)");
            }
        });
    }

    // ========================================================================
    // Event application
    // ========================================================================

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Loaded(Ok(feeds)) => {
                self.loading = false;
                self.list_error = None;
                self.list.commit_loaded(feeds);
                // The replace reset selection and mode; drop any open form.
                self.edit_form.on_selection_changed(None);
                self.focus = Focus::List;
                self.field = 0;
                if self.cursor >= self.list.len() {
                    self.cursor = self.list.len().saturating_sub(1);
                }
            }
            AppEvent::Loaded(Err(err)) => {
                self.loading = false;
                self.list_error = Some(err.to_string());
            }
            AppEvent::CreateFinished(result) => {
                self.add_form.finish(&mut self.list, result);
            }
            AppEvent::UpdateFinished {
                name,
                patch,
                result,
            } => {
                self.edit_form.finish(&mut self.list, &name, &patch, result);
            }
            AppEvent::DeleteFinished { name, result } => {
                self.delete_in_flight = false;
                match result {
                    Ok(()) => {
                        self.list_error = None;
                        self.list.commit_marked(&name);
                    }
                    Err(err) => {
                        self.list_error = Some(err.to_string());
                    }
                }
            }
        }
    }
}
