use askama::Template;

use super::{PageContext, RequestPanel};

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    /// One of `loading`, `disconnected`, `restricted`, `granted`.
    pub state: &'static str,
    /// Only built when access is granted.
    pub panel: Option<RequestPanel>,
}
