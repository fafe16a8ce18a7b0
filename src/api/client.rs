use crate::api::types::{ErrorBody, HistoryEntry, Report, UploadSummary};
use crate::config::{AuthConfig, ServerConfig};
use crate::error::{ApiError, Result};
use crate::utils::content_disposition::filename_from_content_disposition;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const HISTORY_PATH: &str = "/api/history/";
pub const UPLOAD_PATH: &str = "/api/upload/";
pub const REPORT_PATH: &str = "/api/report/";

/// Authenticated client for the equipment backend.
///
/// Cheap to clone; clones share the connection pool and the currently
/// active base URL.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_urls: Arc<Vec<String>>,
    active: Arc<AtomicUsize>,
    username: String,
    password: String,
}

impl ApiClient {
    pub fn new(server: &ServerConfig, auth: &AuthConfig) -> Result<Self> {
        let base_urls = server.base_urls();
        if base_urls.is_empty() {
            return Err(ApiError::NoBaseUrl);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = server.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_urls: Arc::new(base_urls),
            active: Arc::new(AtomicUsize::new(0)),
            username: auth.username.clone(),
            password: auth.password.clone(),
        })
    }

    /// The base URL requests go to first.
    pub fn active_base_url(&self) -> &str {
        &self.base_urls[self.active.load(Ordering::Relaxed) % self.base_urls.len()]
    }

    pub async fn fetch_history(&self) -> Result<Vec<HistoryEntry>> {
        let response = self
            .send(HISTORY_PATH, |http, url| Ok(http.get(url)))
            .await?;
        let body = Self::check_status(response).await?.bytes().await?;
        let history: Vec<HistoryEntry> = serde_json::from_slice(&body)?;
        debug!("Fetched {} history entries", history.len());
        Ok(history)
    }

    /// Sends the CSV as multipart field `file`.
    pub async fn upload_csv(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadSummary> {
        let response = self
            .send(UPLOAD_PATH, |http, url| {
                let part = Part::bytes(bytes.clone())
                    .file_name(file_name.to_string())
                    .mime_str("text/csv")?;
                Ok(http.post(url).multipart(Form::new().part("file", part)))
            })
            .await?;
        let body = Self::check_status(response).await?.bytes().await?;
        let summary: UploadSummary = serde_json::from_slice(&body)?;
        info!(
            "Uploaded {}: {} items, {} types",
            file_name,
            summary.total_count,
            summary.type_distribution.len()
        );
        Ok(summary)
    }

    pub async fn download_report(&self) -> Result<Report> {
        let response = self
            .send(REPORT_PATH, |http, url| Ok(http.get(url)))
            .await?;
        let response = Self::check_status(response).await?;

        let file_name = filename_from_content_disposition(
            response
                .headers()
                .get(CONTENT_DISPOSITION)
                .and_then(|value| value.to_str().ok()),
        );
        let bytes = response.bytes().await?.to_vec();
        info!("Downloaded report {} ({} bytes)", file_name, bytes.len());

        Ok(Report { file_name, bytes })
    }

    /// Sends a request built by `build`, starting at the active base URL and
    /// moving on to the next one when the connection is refused.
    async fn send<F>(&self, path: &str, build: F) -> Result<Response>
    where
        F: Fn(&Client, String) -> Result<RequestBuilder>,
    {
        let count = self.base_urls.len();
        let start = self.active.load(Ordering::Relaxed) % count;
        let mut last_error = None;

        for offset in 0..count {
            let index = (start + offset) % count;
            let url = format!("{}{}", self.base_urls[index], path);
            debug!("Sending request to {}", url);

            let request = build(&self.http, url.clone())?
                .basic_auth(&self.username, Some(&self.password));

            match request.send().await {
                Ok(response) => {
                    if index != start {
                        info!("Switching backend to {}", self.base_urls[index]);
                        self.active.store(index, Ordering::Relaxed);
                    }
                    return Ok(response);
                }
                Err(e) if e.is_connect() => {
                    warn!("Could not connect to {}: {}", url, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_error.map(ApiError::from).unwrap_or(ApiError::NoBaseUrl))
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.error);
        warn!(
            "Backend returned {}: {}",
            status,
            message.as_deref().unwrap_or("<no error field>")
        );

        Err(ApiError::Backend { status, message })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_urls", &self.base_urls)
            .field("active", &self.active_base_url())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
