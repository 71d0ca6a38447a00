//! The formal letter as it appears in the preview panel and the PDF.

use chrono::NaiveDate;

use super::canonical::MANDATORY_CLAUSE;
use super::form::{AssemblyRequest, TIME_FORMAT};
use crate::wallet::Signature;

pub const ADDRESSEE: &str = "Alla Dirigenza Scolastica";
pub const SUBJECT: &str = "Richiesta Assemblea di Istituto";
pub const COMMITTEE_LINE: &str = "CHIEDE A NOME DEL COMITATO STUDENTESCO";
pub const AGENDA_INTRO: &str = "L'assemblea avrà il seguente Ordine del Giorno:";
pub const SIGNER_TITLE: &str = "Il Rappresentante";

const NAME_PLACEHOLDER: &str = "[Nome Cognome]";
const SIGNER_PLACEHOLDER: &str = "Firma";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub representative: String,
    pub signature: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub mandatory: bool,
    pub agenda_lines: Vec<String>,
    pub signer: String,
}

impl Preview {
    pub fn new(form: &AssemblyRequest, signature: Option<&Signature>) -> Self {
        let name = form.representative_name.trim();
        Self {
            representative: non_empty_or(name, NAME_PLACEHOLDER),
            signature: signature.map(|s| s.to_string()),
            date: italian_date(form.date),
            start_time: form.start_time.format(TIME_FORMAT).to_string(),
            end_time: form.end_time.format(TIME_FORMAT).to_string(),
            location: form.location.clone(),
            mandatory: form.mandatory_attendance,
            agenda_lines: form.agenda.lines().map(|l| l.trim_end().to_string()).collect(),
            signer: non_empty_or(name, SIGNER_PLACEHOLDER),
        }
    }

    pub fn mandatory_clause(&self) -> &'static str {
        if self.mandatory { MANDATORY_CLAUSE } else { "" }
    }

    pub fn requester_sentence(&self) -> String {
        match &self.signature {
            Some(sig) => format!(
                "Il sottoscritto Rappresentante degli Studenti {}, con firma digitale {}",
                self.representative, sig
            ),
            None => format!(
                "Il sottoscritto Rappresentante degli Studenti {},",
                self.representative
            ),
        }
    }

    pub fn request_sentence(&self) -> String {
        format!(
            "di poter effettuare un'assemblea di istituto il giorno {} dalle ore {} alle ore {} presso {}{}.",
            self.date,
            self.start_time,
            self.end_time,
            self.location,
            self.mandatory_clause()
        )
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Short Italian date, day and month unpadded: 10/5/2025.
pub fn italian_date(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}
