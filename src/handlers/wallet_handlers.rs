use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};

use super::redirect;
use crate::auth::csrf;
use crate::auth::session::{get_gate, store_gate, take_draft_id};
use crate::chain::MembershipPredicate;
use crate::errors::AppError;
use crate::identity::{Access, AccessGate};
use crate::store::DraftStore;
use crate::wallet::{AccountSource, BrowserReport};

/// Gate state as the bridge script sees it.
#[derive(Debug, Serialize)]
pub struct GateStatus {
    pub address: Option<String>,
    pub address_short: Option<String>,
    pub is_representative: bool,
    pub loading: bool,
    pub access: &'static str,
}

impl From<&AccessGate> for GateStatus {
    fn from(gate: &AccessGate) -> Self {
        Self {
            address: gate.address().map(|a| a.to_string()),
            address_short: gate.address().map(|a| a.short()),
            is_representative: gate.is_representative(),
            loading: gate.is_loading(),
            access: gate.access().as_str(),
        }
    }
}

#[derive(Deserialize)]
pub struct CsrfForm {
    pub csrf_token: String,
}

/// Saves the gate and drops the draft unless the same representative still
/// holds access.
fn finish_gate_change(
    session: &Session,
    drafts: &DraftStore,
    before: Access,
    gate: &AccessGate,
) -> Result<(), AppError> {
    store_gate(session, gate)?;
    if !before.same_holder(&gate.access()) {
        if let Some(id) = take_draft_id(session) {
            if drafts.discard(&id) {
                log::info!("Discarded request draft after access change");
            }
        }
    }
    Ok(())
}

/// POST /wallet/connect: result of the interactive account request
pub async fn connect(
    req: HttpRequest,
    session: Session,
    registry: web::Data<dyn MembershipPredicate>,
    drafts: web::Data<DraftStore>,
    report: web::Json<BrowserReport>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_header(&session, &req)?;

    let report = report.into_inner();
    let mut gate = get_gate(&session);
    let before = gate.access();
    let outcome = gate.connect(&report, registry.get_ref()).await;
    finish_gate_change(&session, &drafts, before, &gate)?;
    outcome?;

    Ok(HttpResponse::Ok().json(GateStatus::from(&gate)))
}

/// POST /wallet/resync: accounts the wallet already exposes, sent on page load
pub async fn resync(
    req: HttpRequest,
    session: Session,
    registry: web::Data<dyn MembershipPredicate>,
    drafts: web::Data<DraftStore>,
    report: web::Json<BrowserReport>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_header(&session, &req)?;

    let report = report.into_inner();
    let mut gate = get_gate(&session);
    let before = gate.access();
    let outcome = gate.resync(&report, registry.get_ref()).await;
    finish_gate_change(&session, &drafts, before, &gate)?;
    outcome?;

    Ok(HttpResponse::Ok().json(GateStatus::from(&gate)))
}

/// POST /wallet/accounts-changed: the wallet's `accountsChanged` event
pub async fn accounts_changed(
    req: HttpRequest,
    session: Session,
    registry: web::Data<dyn MembershipPredicate>,
    drafts: web::Data<DraftStore>,
    report: web::Json<BrowserReport>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_header(&session, &req)?;

    let accounts = report.into_inner().list_accounts().await?;
    let mut gate = get_gate(&session);
    let before = gate.access();
    gate.accounts_changed(accounts, registry.get_ref()).await;
    finish_gate_change(&session, &drafts, before, &gate)?;

    Ok(HttpResponse::Ok().json(GateStatus::from(&gate)))
}

/// POST /wallet/disconnect: forget the local identity
pub async fn disconnect(
    session: Session,
    drafts: web::Data<DraftStore>,
    form: web::Form<CsrfForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let mut gate = get_gate(&session);
    let before = gate.access();
    gate.disconnect();
    finish_gate_change(&session, &drafts, before, &gate)?;

    Ok(redirect("/"))
}

/// GET /wallet/status
pub async fn status(session: Session) -> HttpResponse {
    HttpResponse::Ok().json(GateStatus::from(&get_gate(&session)))
}
