#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod client;
pub mod config;
pub mod csrf;
pub mod data;
pub mod dom;
pub mod feed;
pub mod like;
pub mod logging;
pub mod notify;
pub mod password;
pub mod remove;
pub mod request;
pub mod transport;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
