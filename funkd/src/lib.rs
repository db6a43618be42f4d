pub mod config;
pub mod form;
pub mod handler;
pub mod pages;
pub mod proto;
pub mod router;
pub mod server;
pub mod store;

pub use funk_api as api;
