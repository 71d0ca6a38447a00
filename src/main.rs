use std::sync::Arc;
use std::time::Duration;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};
use askama::Template;

use assemblea::chain::{ContractMembership, MembershipPredicate};
use assemblea::config::AppConfig;
use assemblea::document::{DocumentExporter, PdfExporter};
use assemblea::handlers;
use assemblea::store::{self, DraftStore};
use assemblea::templates_structs::{APP_NAME, NotFoundTemplate};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Session encryption key. Load from SESSION_KEY for sessions that survive restarts
    let secret_key = match config.session_key.as_deref() {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    match config.contract_address {
        Some(contract) => log::info!("Representative registry at {contract} via {}", config.rpc_url),
        None => log::warn!("No CONTRACT_ADDRESS set, nobody will be granted access"),
    }

    let registry: Arc<dyn MembershipPredicate> =
        Arc::new(ContractMembership::from_config(&config).expect("Failed to build RPC client"));
    let registry = web::Data::from(registry);

    let exporter: Arc<dyn DocumentExporter> = Arc::new(PdfExporter::new(config.school_name.clone()));
    let exporter = web::Data::from(exporter);

    let drafts = DraftStore::new(config.draft_ttl);
    store::spawn_eviction(drafts.clone(), Duration::from_secs(60));
    let drafts = web::Data::new(drafts);

    let bind_addr = config.bind_addr.clone();
    let config = web::Data::new(config);

    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(config.clone())
            .app_data(registry.clone())
            .app_data(exporter.clone())
            .app_data(drafts.clone())
            // Static files
            .service(actix_files::Files::new("/static", "./static"))
            .configure(handlers::configure)
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                let html = NotFoundTemplate { app_name: APP_NAME.to_string() }
                    .render()
                    .unwrap_or_else(|_| "Pagina non trovata".to_string());
                actix_web::HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(html)
            }))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
