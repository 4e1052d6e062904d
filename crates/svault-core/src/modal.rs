//! Dialog state machine
//!
//! Exactly one of {no dialog, create dialog, edit dialog} holds at a time.
//! The form draft lives inside the open variant, so closing a dialog drops
//! the draft with it.

use crate::editor::KeyValueEditor;
use crate::error::{Result, VaultError};
use crate::model::{Secret, SecretPayload};

/// Mutable staging area for the secret being composed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub name: String,
    pub description: String,
    pub editor: KeyValueEditor,
}

impl FormState {
    /// Seed a form from a cached secret. The data map is copied, never
    /// shared with the store's entry.
    pub fn from_secret(secret: &Secret) -> Self {
        Self {
            name: secret.name.clone(),
            description: secret.description.clone().unwrap_or_default(),
            editor: KeyValueEditor::with_data(secret.data.clone()),
        }
    }

    pub fn to_payload(&self) -> SecretPayload {
        SecretPayload {
            name: self.name.clone(),
            description: self.description.clone(),
            data: self.editor.data().clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Closed,
    Create,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Closed,
    Create { form: FormState },
    Edit { secret_id: String, form: FormState },
}

#[derive(Debug, Clone)]
pub struct ModalController {
    modal: Modal,
    /// Incremented on every open; lets late completions tell dialogs apart
    generation: u64,
}

impl Default for ModalController {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalController {
    pub fn new() -> Self {
        Self {
            modal: Modal::Closed,
            generation: 0,
        }
    }

    pub fn kind(&self) -> ModalKind {
        match self.modal {
            Modal::Closed => ModalKind::Closed,
            Modal::Create { .. } => ModalKind::Create,
            Modal::Edit { .. } => ModalKind::Edit,
        }
    }

    pub fn is_open(&self) -> bool {
        self.kind() != ModalKind::Closed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    /// Id of the secret being edited, if an edit dialog is open
    pub fn editing_id(&self) -> Option<&str> {
        match &self.modal {
            Modal::Edit { secret_id, .. } => Some(secret_id),
            _ => None,
        }
    }

    pub fn form(&self) -> Option<&FormState> {
        match &self.modal {
            Modal::Closed => None,
            Modal::Create { form } | Modal::Edit { form, .. } => Some(form),
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        match &mut self.modal {
            Modal::Closed => None,
            Modal::Create { form } | Modal::Edit { form, .. } => Some(form),
        }
    }

    /// Closed -> CreateOpen with an empty form
    pub fn open_create(&mut self) -> Result<()> {
        self.ensure_closed()?;
        self.generation += 1;
        self.modal = Modal::Create {
            form: FormState::default(),
        };
        Ok(())
    }

    /// Closed -> EditOpen with a form seeded from `secret`
    pub fn open_edit(&mut self, secret: &Secret) -> Result<()> {
        self.ensure_closed()?;
        self.generation += 1;
        self.modal = Modal::Edit {
            secret_id: secret.id.clone(),
            form: FormState::from_secret(secret),
        };
        Ok(())
    }

    /// CreateOpen|EditOpen -> Closed, discarding the draft
    pub fn cancel(&mut self) -> Result<()> {
        if !self.is_open() {
            return Err(VaultError::NoDialogOpen);
        }
        self.modal = Modal::Closed;
        Ok(())
    }

    /// Close after a successful submit, but only if the dialog open now is
    /// the one that was open when the request began.
    pub fn close_if_generation(&mut self, generation: u64) -> bool {
        if self.is_open() && self.generation == generation {
            self.modal = Modal::Closed;
            true
        } else {
            false
        }
    }

    fn ensure_closed(&self) -> Result<()> {
        if self.is_open() {
            Err(VaultError::DialogAlreadyOpen)
        } else {
            Ok(())
        }
    }
}
