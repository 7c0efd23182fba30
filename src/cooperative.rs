//! The cooperative (async) dispatcher.
//!
//! Verb calls suspend the calling task at the point of network I/O. All calls
//! go through one externally owned [`Session`], attached to a client at most
//! once. The client never closes the session; its owner does.

use crate::{
    client::{check_status, AsyncClient, ClientBuilder},
    error::TransportError,
    request::RequestOptions,
    transport::Session,
    Error, Response, Result,
};
use http::Method;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// The cooperative execution model: a single-assignment session slot.
///
/// Derived clients copy the slot as it is at derivation time.
#[derive(Clone, Default)]
pub struct Cooperative {
    session: OnceLock<Arc<dyn Session>>,
}

impl fmt::Debug for Cooperative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cooperative")
            .field("session_attached", &self.session.get().is_some())
            .finish()
    }
}

impl AsyncClient {
    /// Creates an async client for `host` with default configuration and no
    /// session attached.
    ///
    /// # Errors
    ///
    /// Returns an error if `host` is not an absolute URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use restpath::AsyncClient;
    ///
    /// let client = AsyncClient::new("https://api.example.com").unwrap();
    /// assert!(!client.has_session());
    /// ```
    pub fn new(host: impl AsRef<str>) -> Result<Self> {
        ClientBuilder::new().host(host)?.build_async()
    }

    /// Attaches the connection session used for every call from this client.
    ///
    /// A session can be attached exactly once. Clients derived afterwards
    /// inherit it; clients derived before keep their own slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionAlreadySet`] if a session is already attached.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use restpath::{Client, RequestOptions};
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> Result<(), restpath::Error> {
    /// let session = Arc::new(reqwest::Client::new());
    ///
    /// let client = Client::builder()
    ///     .host("https://api.example.com")?
    ///     .build_async()?;
    /// client.attach_session(session.clone())?;
    ///
    /// let response = client.path("users").get(RequestOptions::default()).await?;
    /// println!("{}", response.body);
    /// # Ok(())
    /// # }
    /// ```
    pub fn attach_session(&self, session: Arc<dyn Session>) -> Result<()> {
        self.mode
            .session
            .set(session)
            .map_err(|_| Error::SessionAlreadySet)
    }

    /// Returns `true` if a session is attached.
    pub fn has_session(&self) -> bool {
        self.mode.session.get().is_some()
    }

    /// Sends a request with any method to the URL of this client.
    ///
    /// When a timeout is in effect, the whole exchange is bounded by it and
    /// expiry is reported as a transport timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::SessionRequired`] if no session is attached, before any I/O
    /// - [`Error::Http`] if the response status is 400 or above
    /// - [`Error::Transport`] if the session failed or the timeout expired
    ///
    /// # Panics
    ///
    /// Panics if a timeout is in effect and the call is not polled inside a
    /// tokio runtime with the time driver enabled.
    pub async fn request(&self, method: Method, options: RequestOptions) -> Result<Response> {
        let session = self.mode.session.get().ok_or(Error::SessionRequired)?;
        let request = self.prepare(method, options)?;

        let method = request.method.clone();
        let url = request.url.clone();
        let timeout = request.timeout;

        tracing::debug!(method = %method, url = %url, "Executing HTTP request");

        let start_time = Instant::now();
        let result = match timeout {
            Some(timeout) => tokio::time::timeout(timeout, session.send(request))
                .await
                .unwrap_or(Err(TransportError::Timeout)),
            None => session.send(request).await,
        };

        let response = result.map_err(|e| {
            tracing::warn!(error = %e, method = %method, url = %url, "Transport failed");
            e
        })?;

        tracing::debug!(
            status = response.status_code.as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "Received HTTP response"
        );

        check_status(response)
    }

    /// Sends a GET request.
    pub async fn get(&self, options: RequestOptions) -> Result<Response> {
        self.request(Method::GET, options).await
    }

    /// Sends a POST request.
    pub async fn post(&self, options: RequestOptions) -> Result<Response> {
        self.request(Method::POST, options).await
    }

    /// Sends a PUT request.
    pub async fn put(&self, options: RequestOptions) -> Result<Response> {
        self.request(Method::PUT, options).await
    }

    /// Sends a PATCH request.
    pub async fn patch(&self, options: RequestOptions) -> Result<Response> {
        self.request(Method::PATCH, options).await
    }

    /// Sends a DELETE request.
    pub async fn delete(&self, options: RequestOptions) -> Result<Response> {
        self.request(Method::DELETE, options).await
    }
}
