pub mod auth;
pub mod chain;
pub mod config;
pub mod document;
pub mod errors;
pub mod handlers;
pub mod identity;
pub mod store;
pub mod templates_structs;
pub mod wallet;
