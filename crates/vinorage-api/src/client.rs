// Device HTTP client
//
// Wraps a host-supplied `reqwest::Client` with Vinorage URL construction,
// per-request timeouts and error classification. The operations themselves
// live in `status.rs` and `control.rs` as inherent methods, keeping this
// module focused on transport mechanics.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{DEFAULT_TIMEOUT, TransportConfig};

/// The device operation a request belongs to. Used for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Operation {
    #[strum(to_string = "fetching information")]
    FetchStatus,
    #[strum(to_string = "setting LED brightness")]
    SetLedBrightness,
    #[strum(to_string = "controlling actuator")]
    ControlActuator,
}

/// HTTP client for a single Vinorage controller.
///
/// Holds only the connection identity (host + base URL) and a handle to a
/// shared `reqwest::Client`; cloning is cheap.
#[derive(Debug, Clone)]
pub struct VinorageClient {
    http: reqwest::Client,
    host: String,
    base_url: Url,
    timeout: Duration,
}

impl VinorageClient {
    /// Create a client with its own `reqwest::Client` built from `transport`.
    pub fn new(host: impl Into<String>, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, host)?.with_timeout(transport.timeout))
    }

    /// Create a client on top of an existing, host-owned `reqwest::Client`.
    ///
    /// `host` is a bare host name or address, optionally with a port
    /// (`192.0.2.5`, `cellar.local:8080`). The base URL is always
    /// `http://<host>/`.
    pub fn with_client(http: reqwest::Client, host: impl Into<String>) -> Result<Self, Error> {
        let host = host.into().trim().to_owned();
        let base_url = base_url_for(&host)?;
        Ok(Self {
            http,
            host,
            base_url,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the per-request time budget (10 seconds by default).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured host, as given.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The device base URL (`http://<host>/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The per-request time budget.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── URL builders ─────────────────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|source| Error::InvalidHost {
                host: self.host.clone(),
                source,
            })
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and return the body of a 2xx response.
    pub(crate) async fn get_text(&self, path: &str, operation: Operation) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!(host = %self.host, "GET {}", url);

        let resp = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| self.classify(e, operation))?;

        resp.text().await.map_err(|e| self.classify(e, operation))
    }

    /// Send a form-encoded POST request, succeeding on any 2xx status.
    pub(crate) async fn post_form<F>(
        &self,
        path: &str,
        form: &F,
        operation: Operation,
    ) -> Result<(), Error>
    where
        F: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        debug!(host = %self.host, "POST {}", url);

        self.http
            .post(url)
            .timeout(self.timeout)
            .form(form)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| self.classify(e, operation))?;

        Ok(())
    }

    fn classify(&self, err: reqwest::Error, operation: Operation) -> Error {
        Error::from_reqwest(err, &self.host, operation, self.timeout)
    }
}

fn base_url_for(host: &str) -> Result<Url, Error> {
    let url = Url::parse(&format!("http://{host}/")).map_err(|source| Error::InvalidHost {
        host: host.to_owned(),
        source,
    })?;

    let bare = url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none()
        && url.username().is_empty()
        && url.password().is_none();

    if bare {
        Ok(url)
    } else {
        Err(Error::InvalidArgument {
            message: format!("host must be a bare host name or address, got '{host}'"),
        })
    }
}
