use crate::api::{HistoryEntry, UploadSummary};
use crate::error::ApiError;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

pub const NO_FILE_MESSAGE: &str = "Please select a CSV file first.";
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Upload successful!";
pub const UPLOAD_FAILED_MESSAGE: &str = "An unexpected error occurred during upload.";
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Failed to download PDF report. Ensure backend is running.";

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: Option<u64>,
}

/// The one action allowed in flight at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Uploading,
    Downloading,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    /// The save dialog was dismissed.
    Cancelled,
    Failed,
}

#[derive(Debug, Default)]
pub struct DashboardState {
    pub selected_file: Option<SelectedFile>,
    pub summary: Option<UploadSummary>,
    pub history: Vec<HistoryEntry>,
    pub pending: Option<PendingAction>,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
    pub last_report: Option<PathBuf>,
    /// Number of the newest history request applied so far.
    history_request: u64,
}

impl DashboardState {
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn can_upload(&self) -> bool {
        !self.is_loading() && self.selected_file.is_some()
    }

    pub fn can_download(&self) -> bool {
        !self.is_loading()
    }

    pub fn clear_messages(&mut self) {
        self.error_message = None;
        self.success_message = None;
        self.last_report = None;
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        info!("Selected {}", file.path.display());
        self.selected_file = Some(file);
        self.clear_messages();
    }

    /// Starts an upload. Returns the file to send, or `None` when nothing
    /// should go over the wire (no file chosen, or another action running).
    pub fn begin_upload(&mut self) -> Option<SelectedFile> {
        if self.is_loading() {
            return None;
        }

        let Some(file) = self.selected_file.clone() else {
            self.success_message = None;
            self.error_message = Some(NO_FILE_MESSAGE.to_string());
            return None;
        };

        self.clear_messages();
        self.summary = None;
        self.pending = Some(PendingAction::Uploading);
        Some(file)
    }

    /// Applies the upload response. Returns `true` when history should be
    /// fetched again.
    pub fn finish_upload(&mut self, result: Result<UploadSummary, ApiError>) -> bool {
        self.pending = None;
        match result {
            Ok(summary) => {
                self.summary = Some(summary);
                self.success_message = Some(UPLOAD_SUCCESS_MESSAGE.to_string());
                true
            }
            Err(e) => {
                error!("Upload failed: {}", e);
                self.error_message = Some(upload_error_message(&e));
                false
            }
        }
    }

    pub fn begin_download(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        self.clear_messages();
        self.pending = Some(PendingAction::Downloading);
        true
    }

    pub fn finish_download(&mut self, outcome: DownloadOutcome) {
        self.pending = None;
        match outcome {
            DownloadOutcome::Saved(path) => {
                self.success_message = Some(format!("Report saved to {}", path.display()));
                self.last_report = Some(path);
            }
            DownloadOutcome::Cancelled => {}
            DownloadOutcome::Failed => {
                self.error_message = Some(DOWNLOAD_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// Applies a history listing unless a newer request already landed.
    /// Failures are logged only; the table keeps its last contents.
    pub fn apply_history(&mut self, request: u64, result: Result<Vec<HistoryEntry>, ApiError>) {
        if request <= self.history_request {
            debug!("Dropping stale history response {}", request);
            return;
        }
        self.history_request = request;

        match result {
            Ok(history) => self.history = history,
            Err(e) => warn!("Failed to fetch history: {}", e),
        }
    }

    /// One `(type, count)` per distribution key, in backend order.
    pub fn chart_categories(&self) -> Vec<(&str, u64)> {
        self.summary
            .as_ref()
            .map(|summary| summary.type_distribution.iter().collect())
            .unwrap_or_default()
    }
}

/// The backend's own `error` string when it sent one.
pub fn upload_error_message(error: &ApiError) -> String {
    error
        .backend_message()
        .unwrap_or(UPLOAD_FAILED_MESSAGE)
        .to_string()
}
