//! Operator dashboard over HTTP.

mod handlers;
pub mod pages;
pub mod server;
pub mod session;
