mod state;
mod ui;

use crate::api::{ApiClient, HistoryEntry, Report, UploadSummary};
use crate::config::{DownloadConfig, Settings};
use crate::error::{ApiError, Result as ApiResult};
use crate::utils::downloads::save_without_overwrite;
use anyhow::Context;
use derivative::Derivative;
use eframe::{egui, App};
use rfd::FileDialog;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self as std_mpsc, Receiver, Sender};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, error, info};

pub use state::{
    upload_error_message, DashboardState, DownloadOutcome, PendingAction, SelectedFile,
    DOWNLOAD_FAILED_MESSAGE, NO_FILE_MESSAGE, UPLOAD_FAILED_MESSAGE, UPLOAD_SUCCESS_MESSAGE,
};

/// Results posted back to the UI thread by background requests.
#[derive(Debug)]
pub enum DashboardEvent {
    /// Tagged with the request number so stale listings can be dropped.
    HistoryLoaded(u64, ApiResult<Vec<HistoryEntry>>),
    UploadFinished(ApiResult<UploadSummary>),
    ReportDownloaded(ApiResult<Report>),
}

/// Called by background tasks after posting an event so the UI redraws.
pub type RepaintFn = Arc<dyn Fn() + Send + Sync>;

#[derive(Derivative)]
#[derivative(Debug)]
pub struct Dashboard {
    state: DashboardState,
    client: ApiClient,
    downloads: DownloadConfig,
    history_requests: u64,
    #[derivative(Debug = "ignore")]
    runtime: Runtime,
    #[derivative(Debug = "ignore")]
    sender: Sender<DashboardEvent>,
    #[derivative(Debug = "ignore")]
    receiver: Receiver<DashboardEvent>,
    #[derivative(Debug = "ignore")]
    repaint: RepaintFn,
}

impl Dashboard {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = ApiClient::new(&settings.server, &settings.auth)
            .context("Failed to create HTTP client")?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("dashboard-io")
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;
        let (sender, receiver) = std_mpsc::channel();

        info!("Dashboard using backend {}", client.active_base_url());

        Ok(Self {
            state: DashboardState::default(),
            client,
            downloads: settings.downloads.clone(),
            history_requests: 0,
            runtime,
            sender,
            receiver,
            repaint: Arc::new(|| {}),
        })
    }

    pub fn set_repaint(&mut self, repaint: RepaintFn) {
        self.repaint = repaint;
    }

    /// Wakes the egui event loop whenever a background request finishes.
    pub fn attach_context(&mut self, ctx: egui::Context) {
        self.set_repaint(Arc::new(move || ctx.request_repaint()));
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    fn spawn_request<F>(&self, request: F)
    where
        F: std::future::Future<Output = DashboardEvent> + Send + 'static,
    {
        let sender = self.sender.clone();
        let repaint = Arc::clone(&self.repaint);
        self.runtime.spawn(async move {
            let event = request.await;
            // The receiver only goes away when the dashboard is dropped.
            if sender.send(event).is_ok() {
                repaint();
            }
        });
    }

    /// Fetches the upload history in the background. Failures are logged
    /// and otherwise ignored.
    pub fn load_history(&mut self) {
        self.history_requests += 1;
        let request = self.history_requests;
        debug!("Loading history (request {})", request);
        let client = self.client.clone();
        self.spawn_request(async move {
            DashboardEvent::HistoryLoaded(request, client.fetch_history().await)
        });
    }

    pub fn refresh_history(&mut self) {
        info!("History refresh requested");
        self.load_history();
    }

    pub fn select_file(&mut self, path: PathBuf) {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let size = fs::metadata(&path).ok().map(|meta| meta.len());

        self.state.select_file(SelectedFile { path, name, size });
    }

    /// Opens the native CSV picker.
    pub fn pick_file(&mut self) {
        if let Some(path) = FileDialog::new()
            .add_filter("CSV files", &["csv"])
            .set_title("Select CSV File")
            .pick_file()
        {
            self.select_file(path);
        }
    }

    pub fn submit_upload(&mut self) {
        let Some(file) = self.state.begin_upload() else {
            return;
        };

        info!("Uploading {}", file.path.display());
        let client = self.client.clone();
        self.spawn_request(async move {
            let result = match tokio::fs::read(&file.path).await {
                Ok(bytes) => client.upload_csv(&file.name, bytes).await,
                Err(e) => Err(ApiError::Io(e)),
            };
            DashboardEvent::UploadFinished(result)
        });
    }

    pub fn download_report(&mut self) {
        if !self.state.begin_download() {
            return;
        }

        info!("Requesting PDF report");
        let client = self.client.clone();
        self.spawn_request(async move {
            DashboardEvent::ReportDownloaded(client.download_report().await)
        });
    }

    /// Applies every finished request. Returns how many were handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.receiver.try_recv() {
            handled += 1;
            self.handle_event(event);
        }
        handled
    }

    fn handle_event(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::HistoryLoaded(request, result) => {
                self.state.apply_history(request, result)
            }
            DashboardEvent::UploadFinished(result) => {
                if self.state.finish_upload(result) {
                    self.load_history();
                }
            }
            DashboardEvent::ReportDownloaded(Ok(report)) => {
                let outcome = self.store_report(&report);
                self.state.finish_download(outcome);
            }
            DashboardEvent::ReportDownloaded(Err(e)) => {
                error!("Report download failed: {}", e);
                self.state.finish_download(DownloadOutcome::Failed);
            }
        }
    }

    fn store_report(&self, report: &Report) -> DownloadOutcome {
        let directory = self.downloads.resolved_directory();

        let saved = if self.downloads.ask_location {
            let Some(path) = FileDialog::new()
                .add_filter("PDF files", &["pdf"])
                .set_directory(&directory)
                .set_file_name(&report.file_name)
                .set_title("Save PDF Report")
                .save_file()
            else {
                info!("Report save cancelled");
                return DownloadOutcome::Cancelled;
            };
            fs::write(&path, &report.bytes).map(|_| path)
        } else {
            save_without_overwrite(&directory, &report.file_name, &report.bytes)
        };

        match saved {
            Ok(path) => {
                info!("Report saved to {}", path.display());
                DownloadOutcome::Saved(path)
            }
            Err(e) => {
                error!("Failed to save report {}: {}", report.file_name, e);
                DownloadOutcome::Failed
            }
        }
    }
}

impl App for Dashboard {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_events();
        self.render(ctx);
    }
}
