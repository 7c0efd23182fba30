//! Per-call options and the request descriptor handed to transports.

use crate::Error;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Options for a single verb call.
///
/// Everything here applies to one dispatch only; headers are merged on top of
/// the client's inherited headers and the timeout overrides the client's.
///
/// # Examples
///
/// ```
/// use restpath::RequestOptions;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), restpath::Error> {
/// let options = RequestOptions::new()
///     .query("page", "2")
///     .header("X-Trace", "abc")?
///     .json(&serde_json::json!({ "name": "Alice" }))?
///     .timeout(Duration::from_secs(5));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub(crate) query_params: Vec<(String, String)>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Bytes>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) json: bool,
}

impl RequestOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a query parameter. Repeated keys are kept in insertion order.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    /// Adds several query parameters.
    pub fn query_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query_params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Adds a header for this call.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self, Error> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds headers for this call, replacing earlier values for the same names.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        merge_headers(&mut self.headers, headers);
        self
    }

    /// Sets an opaque request body, sent as is.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self.json = false;
        self
    }

    /// Serializes `value` as the JSON request body.
    ///
    /// `Content-Type: application/json` is sent unless a content type was set
    /// explicitly, either on this call or on the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, Error> {
        let body = serde_json::to_vec(value).map_err(|e| Error::SerializationFailed(e.to_string()))?;
        self.body = Some(Bytes::from(body));
        self.json = true;
        Ok(self)
    }

    /// Sets the timeout for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A fully built request, ready for dispatch.
///
/// Built by the client immediately before a call and handed to the transport
/// by value.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method.
    pub method: Method,

    /// The absolute URL, including the query string.
    pub url: Url,

    /// The merged request headers.
    pub headers: HeaderMap,

    /// The request body, if any.
    pub body: Option<Bytes>,

    /// The effective timeout, if any.
    pub timeout: Option<Duration>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        url: Url,
        inherited: &HeaderMap,
        options: RequestOptions,
        default_timeout: Option<Duration>,
    ) -> Self {
        let mut headers = inherited.clone();
        merge_headers(&mut headers, options.headers);

        if options.json && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Self {
            method,
            url,
            headers,
            body: options.body,
            timeout: options.timeout.or(default_timeout),
        }
    }
}

pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), Error> {
    let name = HeaderName::try_from(name)
        .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
    let value = HeaderValue::try_from(value)
        .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
    Ok((name, value))
}

/// Merges `overrides` into `base`. Every name present in `overrides` replaces
/// all of its values in `base`; multi-valued headers in `overrides` survive.
pub(crate) fn merge_headers(base: &mut HeaderMap, overrides: HeaderMap) {
    let mut current = None;
    for (name, value) in overrides {
        match name {
            Some(name) => {
                base.insert(name.clone(), value);
                current = Some(name);
            }
            // `None` means another value for the previous name.
            None => {
                if let Some(name) = &current {
                    base.append(name.clone(), value);
                }
            }
        }
    }
}
