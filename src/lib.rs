//! Desktop dashboard for the chemical equipment backend: upload a CSV of
//! equipment readings, inspect the returned summary, browse past uploads
//! and save the PDF report.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

pub use app::Dashboard;
pub use config::Settings;
