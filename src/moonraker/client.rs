//! Async HTTP client for the Moonraker API.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::MoonrakerConfig;
use crate::moonraker::error::{MoonrakerError, MoonrakerResult};
use crate::moonraker::{Envelope, FileEntry, PrinterInfo, StatusQuery, STATUS_OBJECTS};

/// Read-only Moonraker client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct MoonrakerClient {
    http: reqwest::Client,
    base: Url,
}

impl MoonrakerClient {
    /// Creates a client for the configured Moonraker instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable or the HTTP client
    /// cannot be built.
    pub fn new(config: &MoonrakerConfig) -> MoonrakerResult<Self> {
        let base = Url::parse(&config.url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| MoonrakerError::invalid_url(&config.url))?;

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("klipper-mcp/", env!("CARGO_PKG_VERSION")))
            // Moonraker lives on the local network.
            .no_proxy()
            .build()
            .map_err(|source| MoonrakerError::Client { source })?;

        Ok(Self { http, base })
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Fetches the raw text of a file in the `config` root.
    ///
    /// # Errors
    ///
    /// Returns [`MoonrakerError::NotFound`], [`MoonrakerError::AccessDenied`]
    /// or [`MoonrakerError::Unreachable`] as appropriate.
    pub async fn get_config_file(&self, filename: &str) -> MoonrakerResult<String> {
        let filename = checked_filename(filename)?;
        let segments = ["server", "files", "config"].into_iter().chain(filename.split('/'));
        self.get_text(self.endpoint(segments)?).await
    }

    /// Lists the files in the `config` root.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn list_config_files(&self) -> MoonrakerResult<Vec<FileEntry>> {
        let mut url = self.endpoint(["server", "files", "list"])?;
        url.set_query(Some("root=config"));
        self.get_json(url).await
    }

    /// Fetches the raw text of a file in the `logs` root.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_log_file(&self, filename: &str) -> MoonrakerResult<String> {
        let filename = checked_filename(filename)?;
        let segments = ["server", "files", "logs"].into_iter().chain(filename.split('/'));
        self.get_text(self.endpoint(segments)?).await
    }

    /// Fetches Klippy host information.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn printer_info(&self) -> MoonrakerResult<PrinterInfo> {
        let url = self.endpoint(["printer", "info"])?;
        self.get_json(url).await
    }

    /// Queries heater, toolhead and print status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn query_status(&self) -> MoonrakerResult<StatusQuery> {
        let mut url = self.endpoint(["printer", "objects", "query"])?;
        url.set_query(Some(&STATUS_OBJECTS.join("&")));
        self.get_json(url).await
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint<'a, I>(&self, segments: I) -> MoonrakerResult<Url>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| MoonrakerError::invalid_url(self.base.as_str()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_text(&self, url: Url) -> MoonrakerResult<String> {
        let response = self.send(url).await?;
        response
            .text()
            .await
            .map_err(|e| MoonrakerError::invalid_response(format!("failed to read body: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> MoonrakerResult<T> {
        let path = url.path().to_string();
        let response = self.send(url).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| MoonrakerError::invalid_response(format!("{path}: {e}")))?;
        Ok(envelope.result)
    }

    async fn send(&self, url: Url) -> MoonrakerResult<reqwest::Response> {
        debug!(url = %url, "Moonraker request");
        let path = url.path().to_string();

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| MoonrakerError::Unreachable {
                url: url.to_string(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(MoonrakerError::not_found(path)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(MoonrakerError::access_denied(path))
            }
            status => Err(MoonrakerError::http_status(path, status.as_u16())),
        }
    }
}

/// Rejects empty names and names that climb out of the file root.
fn checked_filename(filename: &str) -> MoonrakerResult<&str> {
    let filename = filename.trim().trim_start_matches('/');
    if filename.is_empty() {
        return Err(MoonrakerError::not_found("<empty filename>"));
    }
    if filename.split(['/', '\\']).any(|part| part == "..") {
        return Err(MoonrakerError::access_denied(filename));
    }
    Ok(filename)
}
