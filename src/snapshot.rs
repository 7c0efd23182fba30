//! Saving and restoring client state.
//!
//! A [`ClientSnapshot`] holds everything that defines where a client points and
//! how it calls: host, version, path, headers, timeout and trailing-slash
//! policy. Transports and sessions are never part of it; an async client
//! restored from a snapshot needs its session attached again.

use crate::{client::ClientBuilder, request::parse_header, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The serializable state of a [`Client`](crate::Client).
///
/// # Examples
///
/// ```
/// use restpath::{Client, ClientSnapshot};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("http://api.test")?.with_version(2).path("users");
///
/// let saved = serde_json::to_string(&client.snapshot())?;
/// let restored = Client::restore(serde_json::from_str::<ClientSnapshot>(&saved)?)?;
///
/// assert_eq!(restored.build_url(&[]), client.build_url(&[]));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSnapshot {
    /// The host URL.
    pub host: String,
    /// The API version, if set.
    pub version: Option<String>,
    /// The accumulated path segments.
    pub url_path: Vec<String>,
    /// Inherited headers as `(name, value)` pairs; repeated names keep all values.
    pub request_headers: Vec<(String, String)>,
    /// The default timeout, if set.
    pub timeout: Option<Duration>,
    /// Whether composed URLs end with `/`.
    pub append_slash: bool,
}

impl ClientSnapshot {
    /// Turns the snapshot back into a builder, ready to produce either
    /// execution model.
    ///
    /// # Errors
    ///
    /// Returns an error if the host or a header in the snapshot is invalid.
    pub fn into_builder(self) -> Result<ClientBuilder> {
        let mut headers = http::HeaderMap::new();
        for (name, value) in &self.request_headers {
            let (name, value) = parse_header(name, value)?;
            headers.append(name, value);
        }

        let mut builder = ClientBuilder::new()
            .host(&self.host)?
            .headers(headers)
            .append_slash(self.append_slash)
            .url_path(self.url_path);

        if let Some(version) = self.version {
            builder = builder.version(version);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder)
    }
}
