use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::paging::Limit;
use crate::render::TableResponse;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("request failed: {source}")]
    Http {
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned {status}: {}", .messages.join(", "))]
    Server { status: u16, messages: Vec<String> },

    #[error("failed to decode response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build http client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid header '{header}', expected 'Key: Value'")]
    InvalidHeader { header: String },
}

impl TransportError {
    /// The user-facing error lines handed to the dialog collaborator: the
    /// server's error list when one was returned, otherwise the error itself.
    pub fn messages(&self) -> Vec<String> {
        match self {
            TransportError::Server { messages, .. } if !messages.is_empty() => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// Fetches one page of table data. The shipped implementation speaks HTTP;
/// hosts may substitute anything that produces a `TableResponse`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(
        &self,
        action: &str,
        page: u64,
        limit: Limit,
    ) -> Result<TableResponse, TransportError>;
}

#[derive(Clone, Debug)]
pub struct HttpTransportOptions {
    pub hostname: String,
    pub timeout: Duration,
    pub proxy: Option<String>,
    pub header: Option<String>,
}

impl HttpTransportOptions {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            timeout: DEFAULT_TIMEOUT,
            proxy: None,
            header: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    hostname: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(options: HttpTransportOptions) -> Result<Self, TransportError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        if let Some(raw) = options.header.as_deref().filter(|h| !h.trim().is_empty()) {
            let (name, value) = parse_header(raw)?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::none())
            .timeout(options.timeout);

        if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| TransportError::ProxySetup {
                proxy: proxy.to_string(),
                source: e,
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::HttpClientBuild { source: e })?;

        Ok(Self {
            client,
            hostname: options.hostname.trim_end_matches('/').to_string(),
            timeout: options.timeout,
        })
    }

    fn page_url(&self, action: &str, page: u64, limit: Limit) -> String {
        let action = action.trim_matches('/');
        format!("{}/{}.json?page={}&limit={}", self.hostname, action, page, limit)
    }
}

fn parse_header(
    raw: &str,
) -> Result<(reqwest::header::HeaderName, reqwest::header::HeaderValue), TransportError> {
    let invalid = || TransportError::InvalidHeader {
        header: raw.to_string(),
    };
    let (name, value) = raw.split_once(':').ok_or_else(invalid)?;
    let name = reqwest::header::HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|_| invalid())?;
    let value =
        reqwest::header::HeaderValue::from_str(value.trim()).map_err(|_| invalid())?;
    Ok((name, value))
}

/// Error payload shape returned by the endpoint on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(
        &self,
        action: &str,
        page: u64,
        limit: Limit,
    ) -> Result<TableResponse, TransportError> {
        let url = self.page_url(action, page, limit);
        log::debug!("fetching {url}");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    timeout: self.timeout,
                }
            } else {
                TransportError::Http { source: e }
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Http { source: e })?;

        if !status.is_success() {
            let messages = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.errors)
                .unwrap_or_default();
            let messages = if messages.is_empty() {
                vec![format!("request to {url} failed with status {status}")]
            } else {
                messages
            };
            return Err(TransportError::Server {
                status: status.as_u16(),
                messages,
            });
        }

        serde_json::from_str::<TableResponse>(&body)
            .map_err(|e| TransportError::Decode { source: e })
    }
}
