use crate::document::{Draft, Field, Preview, ViewMode};

/// Raw field values as the edit form shows them.
pub struct FormValues {
    pub representative_name: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub mandatory_attendance: bool,
    pub agenda: String,
}

/// The request form or its preview, whichever the draft is showing.
pub struct RequestPanel {
    pub previewing: bool,
    pub signed: bool,
    pub primary_label: &'static str,
    pub toggle_label: &'static str,
    pub values: FormValues,
    pub preview: Preview,
}

impl RequestPanel {
    pub fn from_draft(draft: &Draft) -> Self {
        let form = draft.form();
        Self {
            previewing: draft.mode() == ViewMode::Previewing,
            signed: draft.is_signed(),
            primary_label: draft.primary_label(),
            toggle_label: draft.toggle_label(),
            values: FormValues {
                representative_name: form.raw_value(Field::RepresentativeName),
                date: form.raw_value(Field::Date),
                start_time: form.raw_value(Field::StartTime),
                end_time: form.raw_value(Field::EndTime),
                location: form.raw_value(Field::Location),
                mandatory_attendance: form.mandatory_attendance,
                agenda: form.raw_value(Field::Agenda),
            },
            preview: draft.preview(),
        }
    }
}
