use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse, ResponseError,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::Method,
    middleware::Next,
};

use super::session::get_gate;
use crate::errors::AppError;

fn header<'a>(req: &'a ServiceRequest, name: &str) -> &'a str {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn wants_json(req: &ServiceRequest) -> bool {
    header(req, "accept").contains("application/json")
        || header(req, "content-type").starts_with("application/json")
}

/// Lets a request through only when the session's gate grants access.
/// Page requests are sent back to the dashboard; fetches get a 403 notice.
pub async fn require_representative(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let gate = get_gate(&req.get_session());

    if !gate.access().is_granted() {
        log::warn!("Blocked {} {} for {:?}", req.method(), req.path(), gate.access());
        let response = if wants_json(&req) {
            AppError::Forbidden(format!("{} {}", req.method(), req.path())).error_response()
        } else {
            HttpResponse::SeeOther()
                .insert_header(("Location", "/"))
                .finish()
        };
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Rejects POST requests that are not `application/json`. Paired with the
/// CSRF header check on the bridge endpoints.
pub async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    if req.method() == Method::POST && !header(&req, "content-type").starts_with("application/json") {
        let response = HttpResponse::BadRequest().json(serde_json::json!({
            "notice": "Richiesta non valida"
        }));
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}
