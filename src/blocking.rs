//! The blocking dispatcher.
//!
//! Each verb call occupies the calling thread until the transport returns or
//! the timeout expires. There is no shared mutable state between calls.

use crate::{
    client::{check_status, Client},
    request::{Request, RequestOptions},
    transport::Transport,
    Response, Result,
};
use http::Method;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// The blocking execution model: dispatches through a [`Transport`].
#[derive(Clone)]
pub struct Blocking {
    transport: Arc<dyn Transport>,
}

impl Blocking {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

impl fmt::Debug for Blocking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blocking").finish_non_exhaustive()
    }
}

impl Client {
    /// Sends a request with any method to the URL of this client.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`](crate::Error::Http) if the response status is 400 or above
    /// - [`Error::Transport`](crate::Error::Transport) if the transport failed or timed out
    /// - a configuration error if the URL could not be built
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use restpath::{Client, RequestOptions};
    /// use http::Method;
    ///
    /// # fn example() -> Result<(), restpath::Error> {
    /// let client = Client::new("https://api.example.com")?;
    /// let response = client.path("users").request(Method::HEAD, RequestOptions::default())?;
    /// println!("{:?}", response.headers);
    /// # Ok(())
    /// # }
    /// ```
    pub fn request(&self, method: Method, options: RequestOptions) -> Result<Response> {
        let request = self.prepare(method, options)?;
        dispatch(self.mode.transport.as_ref(), request)
    }

    /// Sends a GET request.
    pub fn get(&self, options: RequestOptions) -> Result<Response> {
        self.request(Method::GET, options)
    }

    /// Sends a POST request.
    pub fn post(&self, options: RequestOptions) -> Result<Response> {
        self.request(Method::POST, options)
    }

    /// Sends a PUT request.
    pub fn put(&self, options: RequestOptions) -> Result<Response> {
        self.request(Method::PUT, options)
    }

    /// Sends a PATCH request.
    pub fn patch(&self, options: RequestOptions) -> Result<Response> {
        self.request(Method::PATCH, options)
    }

    /// Sends a DELETE request.
    pub fn delete(&self, options: RequestOptions) -> Result<Response> {
        self.request(Method::DELETE, options)
    }
}

fn dispatch(transport: &dyn Transport, request: Request) -> Result<Response> {
    let method = request.method.clone();
    let url = request.url.clone();

    tracing::debug!(method = %method, url = %url, "Executing HTTP request");

    let start_time = Instant::now();
    let response = transport.send(request).map_err(|e| {
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
