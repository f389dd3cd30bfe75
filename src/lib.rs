//! AWS cost breakdown by service with currency conversion, status
//! notifications, and HTML/spreadsheet/PDF rendering.

pub mod api;
pub mod billing;
pub mod config;
pub mod currency;
pub mod error;
pub mod models;
pub mod notify;
pub mod render;
pub mod service;
pub mod validate;

pub use config::AppConfig;
pub use error::AppError;
