//! The exact text the representative signs.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::form::{AssemblyRequest, DATE_FORMAT, TIME_FORMAT};

pub const MANDATORY_CLAUSE: &str =
    " alla quale dovranno obbligatoriamente partecipare tutti i rappresentanti degli studenti";

// The blank line after the title holds six spaces. Signatures made with the
// earlier web app cover those bytes, so they stay.
const TITLE: &str = "RICHIESTA ASSEMBLEA DI ISTITUTO\n      \n";

/// Renders the signing payload. Pure: equal forms give equal text.
pub fn canonical_text(form: &AssemblyRequest) -> String {
    let clause = if form.mandatory_attendance {
        MANDATORY_CLAUSE
    } else {
        ""
    };
    format!(
        "{TITLE}Rappresentante: {name}\nData: {date}\nOrario: {start} - {end}\nLuogo: {location}{clause}\nOrdine del Giorno:\n{agenda}",
        name = form.representative_name,
        date = form.date.format(DATE_FORMAT),
        start = form.start_time.format(TIME_FORMAT),
        end = form.end_time.format(TIME_FORMAT),
        location = form.location,
        agenda = form.agenda,
    )
}

/// SHA-256 of a canonical text, lowercase hex. Names the payload a
/// signature request was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PayloadDigest(String);

impl PayloadDigest {
    pub fn of(text: &str) -> Self {
        PayloadDigest(hex::encode(Sha256::digest(text.as_bytes())))
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() == 64 && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(PayloadDigest(raw.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PayloadDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PayloadDigest {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PayloadDigest::parse(&value).ok_or_else(|| format!("invalid payload digest '{value}'"))
    }
}

impl From<PayloadDigest> for String {
    fn from(value: PayloadDigest) -> Self {
        value.0
    }
}
