use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::session::{draft_id, get_gate};
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::store::DraftStore;
use crate::templates_structs::{DashboardTemplate, PageContext, RequestPanel};

/// GET /: welcome, restricted notice or the request panel.
pub async fn index(
    session: Session,
    config: web::Data<AppConfig>,
    drafts: web::Data<DraftStore>,
) -> Result<HttpResponse, AppError> {
    let gate = get_gate(&session);
    let access = gate.access();
    let ctx = PageContext::build(&session, &gate, &config);

    // The form only exists for a granted representative.
    let panel = if access.is_granted() {
        let id = draft_id(&session)?;
        Some(drafts.with_draft(&id, |draft| RequestPanel::from_draft(draft)))
    } else {
        None
    };

    render(DashboardTemplate {
        ctx,
        state: access.as_str(),
        panel,
    })
}
