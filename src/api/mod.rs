mod client;
mod types;

pub use client::{ApiClient, HISTORY_PATH, REPORT_PATH, UPLOAD_PATH};
pub use types::{ErrorBody, HistoryEntry, Report, TypeDistribution, UploadSummary};
