use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use askama::Template;
use std::fmt;

use crate::document::{ExportError, FormError, SignError};
use crate::wallet::WalletError;

#[derive(Debug)]
pub enum AppError {
    Template(askama::Error),
    Session(String),
    Csrf,
    Forbidden(String),
    BadRequest(String),
    Form(FormError),
    Wallet(WalletError),
    Sign(SignError),
    Export(ExportError),
}

impl AppError {
    /// Italian notice shown to the user, if the error is theirs to see.
    pub fn notice(&self) -> String {
        match self {
            AppError::Csrf => "Sessione scaduta, ricarica la pagina".to_string(),
            AppError::Forbidden(_) => "Accesso riservato ai rappresentanti".to_string(),
            AppError::BadRequest(_) => "Richiesta non valida".to_string(),
            AppError::Form(e) => e.notice(),
            AppError::Wallet(e) => e.notice().to_string(),
            AppError::Sign(e) => e.notice().to_string(),
            AppError::Export(e) => e.notice().to_string(),
            AppError::Template(_) | AppError::Session(_) => "Errore interno".to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::Csrf => write!(f, "Invalid or missing CSRF token"),
            AppError::Forbidden(e) => write!(f, "Forbidden: {e}"),
            AppError::BadRequest(e) => write!(f, "Bad request: {e}"),
            AppError::Form(e) => write!(f, "Form error: {e}"),
            AppError::Wallet(e) => write!(f, "Wallet error: {e}"),
            AppError::Sign(e) => write!(f, "Sign error: {e}"),
            AppError::Export(e) => write!(f, "Export error: {e}"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Csrf | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) | AppError::Form(_) | AppError::Wallet(_) => StatusCode::BAD_REQUEST,
            AppError::Sign(SignError::Stale) | AppError::Export(ExportError::NotPreviewing) => {
                StatusCode::CONFLICT
            }
            AppError::Sign(_) => StatusCode::BAD_REQUEST,
            AppError::Export(ExportError::UnsupportedChar(_) | ExportError::TooLong { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Template(_) | AppError::Session(_) | AppError::Export(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::warn!("{self}");
        }
        HttpResponse::build(status).json(serde_json::json!({ "notice": self.notice() }))
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

impl From<FormError> for AppError {
    fn from(e: FormError) -> Self {
        AppError::Form(e)
    }
}

impl From<WalletError> for AppError {
    fn from(e: WalletError) -> Self {
        AppError::Wallet(e)
    }
}

impl From<SignError> for AppError {
    fn from(e: SignError) -> Self {
        AppError::Sign(e)
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        AppError::Export(e)
    }
}

/// Renders an askama template into an HTML response.
pub fn render(tmpl: impl Template) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(tmpl.render()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn status_codes_follow_the_error_kind() {
        assert_eq!(AppError::Csrf.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Forbidden("no access".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::Sign(SignError::Stale).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Export(ExportError::NotPreviewing).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Export(ExportError::UnsupportedChar('\u{141}')).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Export(ExportError::Render("boom".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn forbidden_body_carries_the_notice() {
        let resp = AppError::Forbidden("GET /request".to_string()).error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["notice"], "Accesso riservato ai rappresentanti");
    }
}
