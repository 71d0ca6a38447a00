use actix_session::Session;

use crate::errors::AppError;
use crate::identity::AccessGate;
use crate::store::DraftStore;

const GATE_KEY: &str = "gate";
const DRAFT_KEY: &str = "draft_id";
const FLASH_KEY: &str = "flash";

/// The session's access gate. A fresh session starts in the loading state
/// until the bridge script resyncs it with the wallet.
pub fn get_gate(session: &Session) -> AccessGate {
    session
        .get::<AccessGate>(GATE_KEY)
        .unwrap_or(None)
        .unwrap_or_default()
}

pub fn store_gate(session: &Session, gate: &AccessGate) -> Result<(), AppError> {
    session
        .insert(GATE_KEY, gate)
        .map_err(|e| AppError::Session(format!("Failed to store gate: {e}")))
}

/// Draft id for this session, allocated on first use.
pub fn draft_id(session: &Session) -> Result<String, AppError> {
    if let Ok(Some(id)) = session.get::<String>(DRAFT_KEY) {
        return Ok(id);
    }
    let id = DraftStore::new_id();
    session
        .insert(DRAFT_KEY, &id)
        .map_err(|e| AppError::Session(format!("Failed to store draft id: {e}")))?;
    Ok(id)
}

pub fn take_draft_id(session: &Session) -> Option<String> {
    let id = session.get::<String>(DRAFT_KEY).unwrap_or(None);
    if id.is_some() {
        session.remove(DRAFT_KEY);
    }
    id
}

pub fn set_flash(session: &Session, message: &str) {
    let _ = session.insert(FLASH_KEY, message);
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>(FLASH_KEY).unwrap_or(None);
    if flash.is_some() {
        session.remove(FLASH_KEY);
    }
    flash
}
