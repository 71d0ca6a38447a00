use actix_session::Session;
use askama::Template;

use crate::auth::csrf;
use crate::auth::session::take_flash;
use crate::config::AppConfig;
use crate::identity::AccessGate;

pub const APP_NAME: &str = "Comitato Studentesco";

/// Common context shared by all pages.
/// Templates access these as `ctx.csrf_token`, `ctx.address_short`, etc.
pub struct PageContext {
    pub app_name: String,
    pub school_name: String,
    pub csrf_token: String,
    pub flash: Option<String>,
    /// Connected address, empty when disconnected.
    pub address: String,
    pub address_short: String,
    pub access: &'static str,
}

impl PageContext {
    pub fn build(session: &Session, gate: &AccessGate, config: &AppConfig) -> Self {
        let (address, address_short) = match gate.address() {
            Some(a) => (a.to_string(), a.short()),
            None => (String::new(), String::new()),
        };
        Self {
            app_name: APP_NAME.to_string(),
            school_name: config.school_name.clone(),
            csrf_token: csrf::get_or_create_token(session),
            flash: take_flash(session),
            address,
            address_short,
            access: gate.access().as_str(),
        }
    }
}

#[derive(Template)]
#[template(path = "errors/404.html")]
pub struct NotFoundTemplate {
    pub app_name: String,
}
