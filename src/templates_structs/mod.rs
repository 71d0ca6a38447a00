// Template context structures for Askama templates.

mod common;
mod dashboard;
mod request;

pub use common::*;
pub use dashboard::*;
pub use request::*;
