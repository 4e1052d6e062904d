//! Application state and message handling

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use svault_core::{
    AppState, Completion, Confirmation, FormState, Operation, Request, RequestCoordinator, Secret,
    VaultError,
};

/// Input focused inside the create/edit dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogField {
    Name,
    Description,
    Key,
    Value,
    Entries,
}

impl DialogField {
    pub fn next(self) -> Self {
        match self {
            DialogField::Name => DialogField::Description,
            DialogField::Description => DialogField::Key,
            DialogField::Key => DialogField::Value,
            DialogField::Value => DialogField::Entries,
            DialogField::Entries => DialogField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            DialogField::Name => DialogField::Entries,
            DialogField::Description => DialogField::Name,
            DialogField::Key => DialogField::Description,
            DialogField::Value => DialogField::Key,
            DialogField::Entries => DialogField::Value,
        }
    }

    fn is_text(self) -> bool {
        self != DialogField::Entries
    }
}

/// Popup state (the create/edit dialog lives in the core ModalController)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
    ConfirmDelete { id: String, name: String },
}

/// Messages that can be sent to the app
#[derive(Debug)]
pub enum Message {
    /// A request spawned from the outbox has finished
    Completed(Completion),
}

/// Main application state
pub struct App {
    /// Whether the app is running
    pub running: bool,

    /// Store, dialog, error slot and in-flight guard
    pub state: AppState,

    coordinator: RequestCoordinator,

    /// Current popup state
    pub popup: Popup,

    /// Selected row in the filtered list
    pub secret_index: usize,

    /// Search filter string
    pub search_filter: String,

    /// Whether we're in search mode
    pub searching: bool,

    /// Focused dialog input
    pub field: DialogField,

    /// Cursor position (in chars) inside the focused text input
    pub cursor: usize,

    /// Selected row of the dialog's entry list
    pub entry_index: usize,

    /// Temporary status message (e.g., "Secret created")
    pub status_message: Option<String>,

    /// Requests waiting to be spawned by the event loop
    outbox: Vec<Request>,

    /// Layout area of the list, for mouse click detection
    pub secrets_area: Rect,

    /// Scroll offset of the list (updated during render)
    pub secrets_scroll_offset: usize,
}

impl App {
    pub fn new(coordinator: RequestCoordinator) -> Self {
        Self {
            running: true,
            state: AppState::new(),
            coordinator,
            popup: Popup::None,
            secret_index: 0,
            search_filter: String::new(),
            searching: false,
            field: DialogField::Name,
            cursor: 0,
            entry_index: 0,
            status_message: None,
            outbox: Vec::new(),
            secrets_area: Rect::default(),
            secrets_scroll_offset: 0,
        }
    }

    /// Take the requests queued since the last call
    pub fn drain_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.outbox)
    }

    /// Queue a reload of the list. Ignored while one is outstanding.
    pub fn refresh(&mut self) {
        match self.coordinator.begin_load(&mut self.state) {
            Ok(request) => self.outbox.push(request),
            Err(e) => tracing::debug!("Refresh skipped: {}", e),
        }
    }

    /// Get byte index from character index (UTF-8 safe)
    fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
        s.char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(s.len())
    }

    /// Get secrets, filtered by name
    pub fn filtered_secrets(&self) -> Vec<&Secret> {
        let secrets = self.state.store.secrets().iter();
        if self.search_filter.is_empty() {
            secrets.collect()
        } else {
            let filter = self.search_filter.to_lowercase();
            secrets
                .filter(|s| s.name.to_lowercase().contains(&filter))
                .collect()
        }
    }

    pub fn selected_secret(&self) -> Option<&Secret> {
        self.filtered_secrets().get(self.secret_index).copied()
    }

    /// Handle an incoming message
    pub fn handle_message(&mut self, msg: Message) {
        match msg {
            Message::Completed(completion) => {
                let operation = completion.operation();
                let succeeded = completion.succeeded();
                if let Err(e) = self.coordinator.complete(&mut self.state, completion) {
                    tracing::debug!("{} failed: {:?}", operation, e);
                }

                if succeeded {
                    self.status_message = match operation {
                        Operation::Create => Some("Secret created".to_string()),
                        Operation::Update => Some("Secret updated".to_string()),
                        Operation::Delete => Some("Secret deleted".to_string()),
                        _ => None,
                    };
                }
                if !self.state.modal.is_open() {
                    self.reset_dialog_focus();
                }
                self.clamp_selection();
            }
        }
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Clear status message on any keypress
        self.status_message = None;

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => {
                    self.running = false;
                    return;
                }
                KeyCode::Char('x') => {
                    self.state.error.dismiss();
                    return;
                }
                _ => {}
            }
        }

        if self.state.modal.is_open() {
            self.handle_dialog_key(key);
            return;
        }

        // Clear error on any keypress outside the dialog
        if !self.state.error.is_clean() && self.popup == Popup::None && !self.searching {
            self.state.error.dismiss();
            return;
        }

        match &self.popup {
            Popup::Help => {
                // Any key closes help
                self.popup = Popup::None;
                return;
            }
            Popup::ConfirmDelete { id, .. } => {
                let id = id.clone();
                self.handle_confirm_delete_key(key, id);
                return;
            }
            Popup::None => {}
        }

        // Handle search mode
        if self.searching {
            match key.code {
                KeyCode::Esc => {
                    self.searching = false;
                    self.search_filter.clear();
                    self.secret_index = 0;
                }
                KeyCode::Enter => {
                    self.searching = false;
                }
                KeyCode::Backspace => {
                    self.search_filter.pop();
                    self.secret_index = 0;
                }
                KeyCode::Char(c) => {
                    self.search_filter.push(c);
                    self.secret_index = 0;
                }
                _ => {}
            }
            return;
        }

        // Normal mode
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('/') => {
                self.searching = true;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
            }
            KeyCode::Char('g') => {
                self.secret_index = 0;
            }
            KeyCode::Char('G') => {
                self.secret_index = self.filtered_secrets().len().saturating_sub(1);
            }
            KeyCode::Char('?') => {
                self.popup = Popup::Help;
            }
            KeyCode::Char('r') => {
                self.refresh();
            }
            KeyCode::Char('n') => {
                if self.state.modal.open_create().is_ok() {
                    self.reset_dialog_focus();
                }
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                self.open_edit_selected();
            }
            KeyCode::Char('d') => {
                if let Some(secret) = self.selected_secret() {
                    self.popup = Popup::ConfirmDelete {
                        id: secret.id.clone(),
                        name: secret.name.clone(),
                    };
                }
            }
            _ => {}
        }
    }

    /// Handle a mouse event
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.popup != Popup::None || self.state.modal.is_open() {
            if let MouseEventKind::Down(MouseButton::Left) = mouse.kind
                && self.popup == Popup::Help
            {
                self.popup = Popup::None;
            }
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let (x, y) = (mouse.column, mouse.row);
                let area = self.secrets_area;
                if x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
                {
                    // Account for the border and the scroll offset
                    let relative_y = y.saturating_sub(area.y + 1);
                    let index = self.secrets_scroll_offset + relative_y as usize;
                    if index < self.filtered_secrets().len() {
                        self.secret_index = index;
                    }
                }
            }
            MouseEventKind::ScrollDown => self.move_selection(1),
            MouseEventKind::ScrollUp => self.move_selection(-1),
            _ => {}
        }
    }

    fn handle_confirm_delete_key(&mut self, key: KeyEvent, id: String) {
        let confirmation = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Confirmation::Confirmed,
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => Confirmation::Declined,
            _ => return,
        };
        self.popup = Popup::None;

        match self
            .coordinator
            .begin_remove(&mut self.state, &id, confirmation)
        {
            Ok(Some(request)) => {
                self.outbox.push(request);
                self.status_message = Some("Deleting...".to_string());
            }
            Ok(None) => {}
            Err(VaultError::RequestInFlight { .. }) => {
                self.status_message = Some("A request for this secret is in progress".to_string());
            }
            Err(e) => tracing::debug!("Delete not started: {}", e),
        }
    }

    fn open_edit_selected(&mut self) {
        let Some(secret) = self.selected_secret().cloned() else {
            return;
        };
        if self.state.modal.open_edit(&secret).is_ok() {
            self.reset_dialog_focus();
        }
    }

    fn reset_dialog_focus(&mut self) {
        self.field = DialogField::Name;
        self.cursor = self
            .state
            .modal
            .form()
            .map(|f| f.name.chars().count())
            .unwrap_or(0);
        self.entry_index = 0;
    }

    fn focus(&mut self, field: DialogField) {
        self.field = field;
        self.cursor = self
            .state
            .modal
            .form()
            .and_then(|form| Self::field_text(form, field))
            .map(|s| s.chars().count())
            .unwrap_or(0);
    }

    fn field_text(form: &FormState, field: DialogField) -> Option<&String> {
        match field {
            DialogField::Name => Some(&form.name),
            DialogField::Description => Some(&form.description),
            DialogField::Key => Some(&form.editor.pending.key),
            DialogField::Value => Some(&form.editor.pending.value),
            DialogField::Entries => None,
        }
    }

    fn field_text_mut(form: &mut FormState, field: DialogField) -> Option<&mut String> {
        match field {
            DialogField::Name => Some(&mut form.name),
            DialogField::Description => Some(&mut form.description),
            DialogField::Key => Some(&mut form.editor.pending.key),
            DialogField::Value => Some(&mut form.editor.pending.value),
            DialogField::Entries => None,
        }
    }

    /// Handle keys while the create/edit dialog is open
    fn handle_dialog_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            self.submit();
            return;
        }

        match key.code {
            KeyCode::Esc => {
                if self.state.modal.cancel().is_ok() {
                    self.reset_dialog_focus();
                }
            }
            KeyCode::Tab => self.focus(self.field.next()),
            KeyCode::BackTab => self.focus(self.field.prev()),
            KeyCode::Enter => match self.field {
                DialogField::Name | DialogField::Description => self.submit(),
                DialogField::Key | DialogField::Value => self.add_pending(),
                DialogField::Entries => {}
            },
            _ if self.field == DialogField::Entries => self.handle_entries_key(key),
            _ => self.edit_text(key),
        }
    }

    fn handle_entries_key(&mut self, key: KeyEvent) {
        let Some(form) = self.state.modal.form_mut() else {
            return;
        };
        let len = form.editor.len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if len > 0 {
                    self.entry_index = (self.entry_index + 1).min(len - 1);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.entry_index = self.entry_index.saturating_sub(1);
            }
            KeyCode::Delete | KeyCode::Backspace => {
                if let Some(entry) = form.editor.key_at(self.entry_index).map(str::to_string) {
                    form.editor.remove(&entry);
                    self.entry_index = self.entry_index.min(form.editor.len().saturating_sub(1));
                }
            }
            _ => {}
        }
    }

    fn edit_text(&mut self, key: KeyEvent) {
        let field = self.field;
        if !field.is_text() {
            return;
        }
        let Some(text) = self
            .state
            .modal
            .form_mut()
            .and_then(|form| Self::field_text_mut(form, field))
        else {
            return;
        };

        let len = text.chars().count();
        let cursor = self.cursor.min(len);
        match key.code {
            KeyCode::Backspace => {
                if cursor > 0 {
                    text.remove(Self::char_to_byte_index(text, cursor - 1));
                    self.cursor = cursor - 1;
                }
            }
            KeyCode::Delete => {
                if cursor < len {
                    text.remove(Self::char_to_byte_index(text, cursor));
                }
            }
            KeyCode::Left => self.cursor = cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (cursor + 1).min(len),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len,
            KeyCode::Char(c) => {
                text.insert(Self::char_to_byte_index(text, cursor), c);
                self.cursor = cursor + 1;
            }
            _ => {}
        }
    }

    fn add_pending(&mut self) {
        let Some(form) = self.state.modal.form_mut() else {
            return;
        };
        if form.editor.commit_pending() {
            self.entry_index = form.editor.len().saturating_sub(1);
            self.focus(DialogField::Key);
        } else {
            self.status_message = Some("Both key and value are required".to_string());
        }
    }

    fn submit(&mut self) {
        match self.coordinator.begin_submit(&mut self.state) {
            Ok(request) => {
                self.outbox.push(request);
                self.status_message = Some("Saving...".to_string());
            }
            Err(VaultError::NameRequired) => {
                self.status_message = Some("Name is required".to_string());
                self.focus(DialogField::Name);
            }
            Err(VaultError::RequestInFlight { .. }) => {
                self.status_message = Some("Already saving...".to_string());
            }
            Err(e) => tracing::debug!("Submit not started: {}", e),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered_secrets().len();
        self.secret_index = self.secret_index.min(len.saturating_sub(1));
    }

    fn move_selection(&mut self, delta: i32) {
        let len = self.filtered_secrets().len();
        if len == 0 {
            return;
        }
        let new_index = self.secret_index as i32 + delta;
        self.secret_index = new_index.clamp(0, len as i32 - 1) as usize;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use svault_core::memory::MemoryVault;
    use svault_core::{ModalKind, SecretPayload};

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Run every queued request to completion, the way the event loop does
    async fn settle(app: &mut App, vault: &Arc<MemoryVault>) {
        loop {
            let requests = app.drain_requests();
            if requests.is_empty() {
                break;
            }
            for request in requests {
                let completion = request.execute(vault.as_ref()).await;
                app.handle_message(Message::Completed(completion));
            }
        }
    }

    async fn setup(names: &[&str]) -> (Arc<MemoryVault>, App) {
        let vault = Arc::new(MemoryVault::new());
        for name in names {
            vault.seed(SecretPayload {
                name: name.to_string(),
                description: String::new(),
                data: [("user".to_string(), "root".to_string())]
                    .into_iter()
                    .collect(),
            });
        }
        let mut app = App::new(RequestCoordinator::new(vault.clone()));
        app.refresh();
        settle(&mut app, &vault).await;
        (vault, app)
    }

    #[tokio::test]
    async fn test_initial_load() {
        let (_vault, app) = setup(&["db", "api"]).await;
        assert!(app.state.store.is_loaded());
        assert_eq!(app.filtered_secrets().len(), 2);
        assert!(app.state.in_flight.is_idle());
    }

    #[tokio::test]
    async fn test_create_through_dialog() {
        let (vault, mut app) = setup(&[]).await;

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.state.modal.kind(), ModalKind::Create);
        type_text(&mut app, "db");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.field, DialogField::Key);
        type_text(&mut app, "user");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "root");
        press(&mut app, KeyCode::Enter);

        let form = app.state.modal.form().unwrap();
        assert_eq!(form.editor.len(), 1);
        assert!(form.editor.pending.is_empty());
        assert_eq!(app.field, DialogField::Key);

        ctrl(&mut app, 's');
        settle(&mut app, &vault).await;

        assert_eq!(app.state.modal.kind(), ModalKind::Closed);
        assert_eq!(app.state.store.len(), 1);
        assert_eq!(app.state.store.secrets()[0].name, "db");
        assert_eq!(app.status_message.as_deref(), Some("Secret created"));
    }

    #[tokio::test]
    async fn test_double_submit_queues_one_request() {
        let (vault, mut app) = setup(&[]).await;
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "db");

        press(&mut app, KeyCode::Enter);
        ctrl(&mut app, 's');
        assert_eq!(app.status_message.as_deref(), Some("Already saving..."));

        settle(&mut app, &vault).await;
        assert_eq!(vault.calls(Operation::Create), 1);
    }

    #[tokio::test]
    async fn test_empty_name_keeps_dialog_open() {
        let (vault, mut app) = setup(&[]).await;
        press(&mut app, KeyCode::Char('n'));
        ctrl(&mut app, 's');

        assert!(app.drain_requests().is_empty());
        assert_eq!(app.state.modal.kind(), ModalKind::Create);
        assert!(app.state.error.is_clean());
        assert_eq!(vault.calls(Operation::Create), 0);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_dialog_and_shows_error() {
        let (vault, mut app) = setup(&["db"]).await;
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.state.modal.kind(), ModalKind::Edit);
        type_text(&mut app, "-prod");

        vault.fail_next(Operation::Update, 500);
        press(&mut app, KeyCode::Enter);
        settle(&mut app, &vault).await;

        assert_eq!(app.state.modal.kind(), ModalKind::Edit);
        assert_eq!(app.state.modal.form().unwrap().name, "db-prod");
        assert_eq!(app.state.error.message(), Some("Failed to update secret"));
        assert_eq!(app.state.store.secrets()[0].name, "db");

        // Keys inside the dialog keep editing instead of dismissing the error
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.state.error.is_clean());
        ctrl(&mut app, 'x');
        assert!(app.state.error.is_clean());
    }

    #[tokio::test]
    async fn test_remove_entry_from_draft() {
        let (_vault, mut app) = setup(&["db"]).await;
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.field, DialogField::Entries);

        press(&mut app, KeyCode::Delete);
        assert!(app.state.modal.form().unwrap().editor.is_empty());
        // The store is untouched until submit
        assert_eq!(app.state.store.secrets()[0].key_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let (vault, mut app) = setup(&["db"]).await;

        press(&mut app, KeyCode::Char('d'));
        assert!(matches!(app.popup, Popup::ConfirmDelete { .. }));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.popup, Popup::None);
        assert!(app.drain_requests().is_empty());

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        settle(&mut app, &vault).await;

        assert_eq!(vault.calls(Operation::Delete), 1);
        assert!(app.state.store.is_empty());
        assert_eq!(app.secret_index, 0);
    }

    #[tokio::test]
    async fn test_any_key_dismisses_load_error() {
        let (vault, mut app) = setup(&["db"]).await;
        vault.set_offline(true);
        press(&mut app, KeyCode::Char('r'));
        settle(&mut app, &vault).await;

        assert_eq!(app.state.error.message(), Some("Failed to fetch secrets"));
        assert_eq!(app.state.store.len(), 1);

        // The key only dismisses the banner
        press(&mut app, KeyCode::Char('q'));
        assert!(app.state.error.is_clean());
        assert!(app.running);
    }

    #[tokio::test]
    async fn test_filter_by_name() {
        let (_vault, mut app) = setup(&["db-prod", "db-dev", "api"]).await;
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "DB");
        press(&mut app, KeyCode::Enter);

        let names: Vec<_> = app.filtered_secrets().iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["db-prod", "db-dev"]);

        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.selected_secret().unwrap().name, "db-dev");
    }

    #[tokio::test]
    async fn test_cancel_drops_draft() {
        let (_vault, mut app) = setup(&[]).await;
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "draft");
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.state.modal.kind(), ModalKind::Closed);
        assert!(app.running);

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.state.modal.form().unwrap().name, "");
    }
}
