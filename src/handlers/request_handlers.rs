use std::collections::HashMap;

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};

use super::redirect;
use crate::auth::csrf;
use crate::auth::session::{draft_id, set_flash};
use crate::document::form::normalize_newlines;
use crate::document::{
    AgendaEdit, DocumentExporter, Draft, Field, FieldUpdate, FormError, PayloadDigest, SignError, ViewMode,
};
use crate::errors::AppError;
use crate::store::DraftStore;
use crate::wallet::SignatureReport;

/// Marker input present on every submission of the edit form.
const EDITOR_MARKER: &str = "editor";

type Fields = HashMap<String, String>;

/// What the bridge script needs to refresh the panel controls.
#[derive(Debug, Serialize)]
pub struct PanelStatus {
    pub mode: ViewMode,
    pub signed: bool,
    pub primary_label: &'static str,
    pub toggle_label: &'static str,
}

impl PanelStatus {
    fn of(draft: &Draft) -> Self {
        Self {
            mode: draft.mode(),
            signed: draft.is_signed(),
            primary_label: draft.primary_label(),
            toggle_label: draft.toggle_label(),
        }
    }
}

/// Applies the submitted fields whose value differs from the draft. All
/// values are validated before any is applied.
fn apply_changed(draft: &mut Draft, fields: &Fields) -> Result<usize, FormError> {
    let from_editor = fields.contains_key(EDITOR_MARKER);
    let mut updates = Vec::new();

    for field in Field::ALL {
        let raw = match fields.get(field.name()) {
            Some(v) => normalize_newlines(v),
            // Unticked checkboxes are not submitted
            None if from_editor && field == Field::MandatoryAttendance => "false".to_string(),
            None => continue,
        };
        if draft.form().raw_value(field) == raw {
            continue;
        }
        updates.push(FieldUpdate::parse(field.name(), &raw)?);
    }

    let count = updates.len();
    for update in updates {
        draft.update(update);
    }
    Ok(count)
}

fn submitted_token(fields: &Fields) -> &str {
    fields.get("csrf_token").map(String::as_str).unwrap_or("")
}

/// POST /request: save the edit form (no-script path)
pub async fn submit(
    session: Session,
    drafts: web::Data<DraftStore>,
    form: web::Form<Fields>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, submitted_token(&form))?;

    let id = draft_id(&session)?;
    if let Err(e) = drafts.with_draft(&id, |draft| apply_changed(draft, &form)) {
        log::warn!("Rejected request form: {e}");
        set_flash(&session, &e.notice());
    }
    Ok(redirect("/"))
}

/// POST /request/toggle: switch between the edit form and the preview,
/// keeping any edits submitted with it
pub async fn toggle(
    session: Session,
    drafts: web::Data<DraftStore>,
    form: web::Form<Fields>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, submitted_token(&form))?;

    let id = draft_id(&session)?;
    let result = drafts.with_draft(&id, |draft| {
        apply_changed(draft, &form)?;
        Ok::<_, FormError>(draft.toggle_mode())
    });
    match result {
        Ok(mode) => log::debug!("Request panel now {mode:?}"),
        Err(e) => {
            log::warn!("Rejected request form: {e}");
            set_flash(&session, &e.notice());
        }
    }
    Ok(redirect("/"))
}

#[derive(Deserialize)]
pub struct FieldBody {
    pub name: String,
    pub value: String,
}

/// POST /request/field: one field changed in the browser
pub async fn update_field(
    req: HttpRequest,
    session: Session,
    drafts: web::Data<DraftStore>,
    body: web::Json<FieldBody>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_header(&session, &req)?;

    let update = FieldUpdate::parse(&body.name, &body.value)?;
    let id = draft_id(&session)?;
    let status = drafts.with_draft(&id, |draft| {
        draft.update(update);
        PanelStatus::of(draft)
    });
    Ok(HttpResponse::Ok().json(status))
}

#[derive(Deserialize)]
pub struct LineBreakBody {
    pub value: String,
    pub selection_start: usize,
    pub selection_end: usize,
    #[serde(default)]
    pub shift: bool,
}

#[derive(Serialize)]
pub struct LineBreakResponse {
    #[serde(flatten)]
    pub edit: AgendaEdit,
    pub status: PanelStatus,
}

/// POST /request/agenda/line-break: Enter pressed in the agenda
pub async fn agenda_line_break(
    req: HttpRequest,
    session: Session,
    drafts: web::Data<DraftStore>,
    body: web::Json<LineBreakBody>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_header(&session, &req)?;

    let id = draft_id(&session)?;
    let response = drafts.with_draft(&id, |draft| {
        let edit = draft.apply_line_break(&body.value, body.selection_start, body.selection_end, body.shift)?;
        Ok::<_, FormError>(LineBreakResponse {
            edit,
            status: PanelStatus::of(draft),
        })
    })?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /request/save: primary action; answers with the next step
pub async fn save(
    req: HttpRequest,
    session: Session,
    drafts: web::Data<DraftStore>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_header(&session, &req)?;

    let id = draft_id(&session)?;
    let step = drafts.with_draft(&id, |draft| draft.begin_save());
    Ok(HttpResponse::Ok().json(step))
}

/// GET /request/payload: the text to sign and its digest
pub async fn payload(
    session: Session,
    drafts: web::Data<DraftStore>,
) -> Result<HttpResponse, AppError> {
    let id = draft_id(&session)?;
    let request = drafts.with_draft(&id, |draft| draft.begin_sign());
    Ok(HttpResponse::Ok().json(request))
}

/// POST /request/signature: the wallet's answer to a signing request
pub async fn signature(
    req: HttpRequest,
    session: Session,
    drafts: web::Data<DraftStore>,
    report: web::Json<SignatureReport>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_header(&session, &req)?;

    let report = report.into_inner();
    let digest = PayloadDigest::parse(&report.digest)
        .ok_or_else(|| AppError::BadRequest(format!("invalid payload digest '{}'", report.digest)))?;
    let signature = report.outcome().map_err(SignError::Wallet)?;

    let id = draft_id(&session)?;
    let status = drafts.with_draft(&id, |draft| {
        draft
            .complete_sign(&digest, signature)
            .map(|()| PanelStatus::of(draft))
    })?;
    Ok(HttpResponse::Ok().json(status))
}

/// GET /request/export.pdf: download the previewed request
pub async fn export_pdf(
    session: Session,
    drafts: web::Data<DraftStore>,
    exporter: web::Data<dyn DocumentExporter>,
) -> Result<HttpResponse, AppError> {
    let id = draft_id(&session)?;
    let draft = drafts.snapshot(&id).unwrap_or_default();
    let file = draft.export(exporter.get_ref())?;

    Ok(HttpResponse::Ok()
        .content_type(file.content_type)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", file.filename),
        ))
        .body(file.bytes))
}
