//! Draft state: the form, the view mode and the signature over it.

use std::fmt;

use serde::Serialize;

use super::agenda::{self, AgendaEdit};
use super::canonical::{PayloadDigest, canonical_text};
use super::export::{DocumentExporter, ExportError, ExportedFile};
use super::form::{AssemblyRequest, Field, FieldUpdate, FormError};
use super::preview::Preview;
use crate::wallet::{MessageSigner, Signature, WalletError};

pub const SIGN_AND_SAVE_LABEL: &str = "Firma e Salva";
pub const DOWNLOAD_LABEL: &str = "Scarica PDF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Editing,
    Previewing,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Editing => ViewMode::Previewing,
            ViewMode::Previewing => ViewMode::Editing,
        }
    }
}

/// What the wallet is asked to sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignRequest {
    pub payload: String,
    pub digest: PayloadDigest,
}

impl SignRequest {
    fn for_form(form: &AssemblyRequest) -> Self {
        let payload = canonical_text(form);
        let digest = PayloadDigest::of(&payload);
        Self { payload, digest }
    }
}

/// Next step of the primary action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum SaveStep {
    Sign(SignRequest),
    Export,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    /// The form changed after the payload was handed to the wallet.
    Stale,
    Wallet(WalletError),
}

impl SignError {
    pub fn notice(&self) -> &'static str {
        match self {
            SignError::Wallet(WalletError::Unavailable) => WalletError::Unavailable.notice(),
            SignError::Stale => "Il documento è stato modificato durante la firma, riprova",
            SignError::Wallet(_) => "Errore durante la firma del documento",
        }
    }
}

impl fmt::Display for SignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignError::Stale => write!(f, "signature covers an outdated payload"),
            SignError::Wallet(e) => write!(f, "signing failed: {e}"),
        }
    }
}

impl std::error::Error for SignError {}

impl From<WalletError> for SignError {
    fn from(e: WalletError) -> Self {
        SignError::Wallet(e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    Sign(SignError),
    Export(ExportError),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Sign(e) => write!(f, "{e}"),
            SaveError::Export(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SaveError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    form: AssemblyRequest,
    signature: Option<Signature>,
    mode: ViewMode,
}

impl Draft {
    pub fn new(form: AssemblyRequest) -> Self {
        Self {
            form,
            signature: None,
            mode: ViewMode::Editing,
        }
    }

    pub fn form(&self) -> &AssemblyRequest {
        &self.form
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Sets one field. Any edit drops the signature, even one that leaves
    /// the value unchanged.
    pub fn update(&mut self, update: FieldUpdate) {
        let field = update.field();
        update.apply(&mut self.form);
        if self.signature.take().is_some() {
            log::debug!("Signature cleared by edit to {field}");
        }
    }

    /// Applies a line break to the agenda as typed in the browser, which
    /// becomes the new agenda value.
    pub fn apply_line_break(
        &mut self,
        value: &str,
        selection_start: usize,
        selection_end: usize,
        shift: bool,
    ) -> Result<AgendaEdit, FormError> {
        let edit = agenda::line_break(value, selection_start, selection_end, shift);
        self.update(FieldUpdate::parse(Field::Agenda.name(), &edit.value)?);
        Ok(edit)
    }

    pub fn toggle_mode(&mut self) -> ViewMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn canonical_text(&self) -> String {
        canonical_text(&self.form)
    }

    pub fn preview(&self) -> Preview {
        Preview::new(&self.form, self.signature.as_ref())
    }

    pub fn begin_sign(&self) -> SignRequest {
        SignRequest::for_form(&self.form)
    }

    /// Stores `signature` if `digest` still names the current payload.
    pub fn complete_sign(&mut self, digest: &PayloadDigest, signature: Signature) -> Result<(), SignError> {
        let current = PayloadDigest::of(&self.canonical_text());
        if &current != digest {
            log::warn!("Discarding signature for outdated payload {digest}");
            return Err(SignError::Stale);
        }
        log::info!("Request signed (payload {digest})");
        self.signature = Some(signature);
        Ok(())
    }

    pub async fn sign<S: MessageSigner + ?Sized>(&mut self, signer: &S) -> Result<(), SignError> {
        let request = self.begin_sign();
        let signature = signer.sign_message(&request.payload).await?;
        self.complete_sign(&request.digest, signature)
    }

    pub fn primary_label(&self) -> &'static str {
        if self.is_signed() {
            DOWNLOAD_LABEL
        } else {
            SIGN_AND_SAVE_LABEL
        }
    }

    pub fn toggle_label(&self) -> &'static str {
        match self.mode {
            ViewMode::Editing => "Anteprima",
            ViewMode::Previewing => "Modifica",
        }
    }

    /// Enters the preview and reports what the primary action does next.
    pub fn begin_save(&mut self) -> SaveStep {
        self.mode = ViewMode::Previewing;
        if self.is_signed() {
            SaveStep::Export
        } else {
            SaveStep::Sign(self.begin_sign())
        }
    }

    pub fn export<E: DocumentExporter + ?Sized>(&self, exporter: &E) -> Result<ExportedFile, ExportError> {
        if self.mode != ViewMode::Previewing {
            return Err(ExportError::NotPreviewing);
        }
        exporter.export(&self.preview(), self.form.date)
    }

    /// Runs the primary action to completion: preview, sign if needed, export.
    pub async fn save<S, E>(&mut self, signer: &S, exporter: &E) -> Result<ExportedFile, SaveError>
    where
        S: MessageSigner + ?Sized,
        E: DocumentExporter + ?Sized,
    {
        if let SaveStep::Sign(request) = self.begin_save() {
            let signature = signer
                .sign_message(&request.payload)
                .await
                .map_err(|e| SaveError::Sign(e.into()))?;
            self.complete_sign(&request.digest, signature).map_err(SaveError::Sign)?;
        }
        self.export(exporter).map_err(SaveError::Export)
    }
}
