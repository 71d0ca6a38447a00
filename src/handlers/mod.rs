pub mod dashboard;
pub mod request_handlers;
pub mod wallet_handlers;

use actix_web::{HttpResponse, middleware::from_fn, web};

use crate::auth::middleware::{require_json_content_type, require_representative};

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

/// Registers every application route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(dashboard::index));

    cfg.service(
        web::scope("/wallet")
            .route("/status", web::get().to(wallet_handlers::status))
            .route("/disconnect", web::post().to(wallet_handlers::disconnect))
            // Bridge endpoints: JSON reports from the browser wallet
            .service(
                web::scope("")
                    .wrap(from_fn(require_json_content_type))
                    .route("/connect", web::post().to(wallet_handlers::connect))
                    .route("/resync", web::post().to(wallet_handlers::resync))
                    .route("/accounts-changed", web::post().to(wallet_handlers::accounts_changed)),
            ),
    );

    cfg.service(
        web::scope("/request")
            .wrap(from_fn(require_representative))
            .route("", web::post().to(request_handlers::submit))
            .route("/toggle", web::post().to(request_handlers::toggle))
            .route("/payload", web::get().to(request_handlers::payload))
            .route("/export.pdf", web::get().to(request_handlers::export_pdf))
            .service(
                web::scope("")
                    .wrap(from_fn(require_json_content_type))
                    .route("/field", web::post().to(request_handlers::update_field))
                    .route("/agenda/line-break", web::post().to(request_handlers::agenda_line_break))
                    .route("/save", web::post().to(request_handlers::save))
                    .route("/signature", web::post().to(request_handlers::signature)),
            ),
    );
}
