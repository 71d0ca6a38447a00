use std::fmt;

use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOCATION: &str = "Aula Magna";
pub const DEFAULT_AGENDA: &str = "1. Discussione problemi scolastici\n2. Proposte attività extrascolastiche\n3. Varie ed eventuali";

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

const MAX_NAME_LEN: usize = 100;
const MAX_LOCATION_LEN: usize = 200;
const MAX_AGENDA_LEN: usize = 4000;

/// The assembly request as filled in by the representative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyRequest {
    pub representative_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub mandatory_attendance: bool,
    pub agenda: String,
}

impl AssemblyRequest {
    /// A blank request dated `today`, with the usual two-hour slot.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            representative_name: String::new(),
            date: today,
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
            location: DEFAULT_LOCATION.to_string(),
            mandatory_attendance: false,
            agenda: DEFAULT_AGENDA.to_string(),
        }
    }

    /// The value as the HTML form shows it.
    pub fn raw_value(&self, field: Field) -> String {
        match field {
            Field::RepresentativeName => self.representative_name.clone(),
            Field::Date => self.date.format(DATE_FORMAT).to_string(),
            Field::StartTime => self.start_time.format(TIME_FORMAT).to_string(),
            Field::EndTime => self.end_time.format(TIME_FORMAT).to_string(),
            Field::Location => self.location.clone(),
            Field::MandatoryAttendance => self.mandatory_attendance.to_string(),
            Field::Agenda => self.agenda.clone(),
        }
    }
}

impl Default for AssemblyRequest {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    RepresentativeName,
    Date,
    StartTime,
    EndTime,
    Location,
    MandatoryAttendance,
    Agenda,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::RepresentativeName,
        Field::Date,
        Field::StartTime,
        Field::EndTime,
        Field::Location,
        Field::MandatoryAttendance,
        Field::Agenda,
    ];

    /// Input name used by the HTML form and the bridge script.
    pub fn name(self) -> &'static str {
        match self {
            Field::RepresentativeName => "representative_name",
            Field::Date => "date",
            Field::StartTime => "start_time",
            Field::EndTime => "end_time",
            Field::Location => "location",
            Field::MandatoryAttendance => "mandatory_attendance",
            Field::Agenda => "agenda",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    UnknownField(String),
    InvalidDate(String),
    InvalidTime { field: Field, value: String },
    InvalidFlag(String),
    TooLong { field: Field, max: usize },
}

impl FormError {
    pub fn notice(&self) -> String {
        match self {
            FormError::UnknownField(name) => format!("Campo sconosciuto: {name}"),
            FormError::InvalidDate(_) => "Data non valida".to_string(),
            FormError::InvalidTime { .. } => "Orario non valido".to_string(),
            FormError::InvalidFlag(_) => "Valore non valido".to_string(),
            FormError::TooLong { max, .. } => format!("Il testo supera i {max} caratteri"),
        }
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::UnknownField(name) => write!(f, "unknown field '{name}'"),
            FormError::InvalidDate(v) => write!(f, "invalid date '{v}', expected YYYY-MM-DD"),
            FormError::InvalidTime { field, value } => {
                write!(f, "invalid time '{value}' for {field}, expected HH:MM")
            }
            FormError::InvalidFlag(v) => write!(f, "invalid flag value '{v}'"),
            FormError::TooLong { field, max } => write!(f, "{field} must be at most {max} characters"),
        }
    }
}

impl std::error::Error for FormError {}

/// A change to exactly one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    RepresentativeName(String),
    Date(NaiveDate),
    StartTime(NaiveTime),
    EndTime(NaiveTime),
    Location(String),
    MandatoryAttendance(bool),
    Agenda(String),
}

impl FieldUpdate {
    /// Parses a raw form value for the named field.
    pub fn parse(name: &str, raw: &str) -> Result<Self, FormError> {
        let field = Field::from_name(name).ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        match field {
            Field::RepresentativeName => {
                check_len(field, raw, MAX_NAME_LEN)?;
                Ok(FieldUpdate::RepresentativeName(raw.to_string()))
            }
            Field::Date => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                .map(FieldUpdate::Date)
                .map_err(|_| FormError::InvalidDate(raw.to_string())),
            Field::StartTime => parse_time(field, raw).map(FieldUpdate::StartTime),
            Field::EndTime => parse_time(field, raw).map(FieldUpdate::EndTime),
            Field::Location => {
                check_len(field, raw, MAX_LOCATION_LEN)?;
                Ok(FieldUpdate::Location(raw.to_string()))
            }
            Field::MandatoryAttendance => parse_flag(raw).map(FieldUpdate::MandatoryAttendance),
            Field::Agenda => {
                let agenda = normalize_newlines(raw);
                check_len(field, &agenda, MAX_AGENDA_LEN)?;
                Ok(FieldUpdate::Agenda(agenda))
            }
        }
    }

    pub fn field(&self) -> Field {
        match self {
            FieldUpdate::RepresentativeName(_) => Field::RepresentativeName,
            FieldUpdate::Date(_) => Field::Date,
            FieldUpdate::StartTime(_) => Field::StartTime,
            FieldUpdate::EndTime(_) => Field::EndTime,
            FieldUpdate::Location(_) => Field::Location,
            FieldUpdate::MandatoryAttendance(_) => Field::MandatoryAttendance,
            FieldUpdate::Agenda(_) => Field::Agenda,
        }
    }

    pub(crate) fn apply(self, form: &mut AssemblyRequest) {
        match self {
            FieldUpdate::RepresentativeName(v) => form.representative_name = v,
            FieldUpdate::Date(v) => form.date = v,
            FieldUpdate::StartTime(v) => form.start_time = v,
            FieldUpdate::EndTime(v) => form.end_time = v,
            FieldUpdate::Location(v) => form.location = v,
            FieldUpdate::MandatoryAttendance(v) => form.mandatory_attendance = v,
            FieldUpdate::Agenda(v) => form.agenda = v,
        }
    }
}

/// Form submissions send textarea line breaks as CRLF.
pub fn normalize_newlines(raw: &str) -> String {
    raw.replace("\r\n", "\n")
}

fn check_len(field: Field, raw: &str, max: usize) -> Result<(), FormError> {
    if raw.chars().count() > max {
        Err(FormError::TooLong { field, max })
    } else {
        Ok(())
    }
}

// Browsers send `HH:MM`, or `HH:MM:SS` when the input has a seconds step.
fn parse_time(field: Field, raw: &str) -> Result<NaiveTime, FormError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| FormError::InvalidTime {
            field,
            value: raw.to_string(),
        })
}

fn parse_flag(raw: &str) -> Result<bool, FormError> {
    match raw.trim() {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" | "" => Ok(false),
        other => Err(FormError::InvalidFlag(other.to_string())),
    }
}
