//! Error types for path-built REST calls.
//!
//! Failures fall into three groups that never overlap:
//!
//! - configuration errors ([`Error::SessionRequired`], [`Error::SessionAlreadySet`],
//!   [`Error::ConfigurationError`], ...) are raised before any network I/O,
//! - transport errors ([`Error::Transport`]) come from the layer that opens sockets,
//! - classified HTTP errors ([`Error::Http`]) are raised for every response with a
//!   status code of 400 or above.

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

/// The kind of a classified HTTP error, one tag per recognized status code.
///
/// Unrecognized 4xx/5xx codes map to [`HttpErrorKind::Other`].
///
/// # Examples
///
/// ```
/// use restpath::HttpErrorKind;
/// use http::StatusCode;
///
/// assert_eq!(HttpErrorKind::from_status(StatusCode::NOT_FOUND), HttpErrorKind::NotFound);
/// assert_eq!(HttpErrorKind::from_status(StatusCode::IM_A_TEAPOT), HttpErrorKind::Other);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpErrorKind {
    /// 400
    BadRequest,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 405
    MethodNotAllowed,
    /// 413
    PayloadTooLarge,
    /// 415
    UnsupportedMediaType,
    /// 429
    TooManyRequests,
    /// 500
    InternalServerError,
    /// 503
    ServiceUnavailable,
    /// 504
    GatewayTimeout,
    /// Any other status code of 400 or above.
    Other,
}

impl HttpErrorKind {
    /// Maps a status code to its error kind.
    ///
    /// This is a pure table lookup; it does not decide whether the status is an
    /// error at all. Use [`classify`] for that.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            413 => Self::PayloadTooLarge,
            415 => Self::UnsupportedMediaType,
            429 => Self::TooManyRequests,
            500 => Self::InternalServerError,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            _ => Self::Other,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::BadRequest => "bad request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::MethodNotAllowed => "method not allowed",
            Self::PayloadTooLarge => "payload too large",
            Self::UnsupportedMediaType => "unsupported media type",
            Self::TooManyRequests => "too many requests",
            Self::InternalServerError => "internal server error",
            Self::ServiceUnavailable => "service unavailable",
            Self::GatewayTimeout => "gateway timeout",
            Self::Other => "http error",
        }
    }
}

impl std::fmt::Display for HttpErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A response whose status code is 400 or above.
///
/// The full response is preserved so callers can branch on [`HttpError::kind`]
/// or inspect the body and headers directly.
#[derive(thiserror::Error, Debug, Clone)]
#[error("HTTP {status_code} ({kind}): {body}")]
pub struct HttpError {
    /// The classified kind of the error.
    pub kind: HttpErrorKind,
    /// The HTTP status code.
    pub status_code: StatusCode,
    /// The raw response body.
    pub body: String,
    /// The response headers.
    pub headers: HeaderMap,
}

impl HttpError {
    pub(crate) fn from_parts(status_code: StatusCode, body: String, headers: HeaderMap) -> Self {
        Self {
            kind: HttpErrorKind::from_status(status_code),
            status_code,
            body,
            headers,
        }
    }

    /// Returns the canonical reason phrase for the status code, if it has one.
    pub fn reason(&self) -> Option<&'static str> {
        self.status_code.canonical_reason()
    }

    /// Deserializes the error body as JSON.
    ///
    /// Many APIs describe their failures in a JSON document; this gives access
    /// to it without losing the raw body on a parse failure.
    pub fn to_json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}

/// Classifies a response into a typed HTTP error.
///
/// Returns `None` for every status code below 400 and `Some` for every status
/// code of 400 or above, including exactly 400.
///
/// # Examples
///
/// ```
/// use restpath::{classify, HttpErrorKind};
/// use http::{HeaderMap, StatusCode};
///
/// let err = classify(StatusCode::BAD_REQUEST, "nope".into(), HeaderMap::new()).unwrap();
/// assert_eq!(err.kind, HttpErrorKind::BadRequest);
///
/// assert!(classify(StatusCode::OK, String::new(), HeaderMap::new()).is_none());
/// ```
pub fn classify(status_code: StatusCode, body: String, headers: HeaderMap) -> Option<HttpError> {
    is_error_status(status_code).then(|| HttpError::from_parts(status_code, body, headers))
}

/// The error threshold: every status code of 400 or above.
pub(crate) fn is_error_status(status_code: StatusCode) -> bool {
    status_code.as_u16() >= 400
}

/// A failure reported by the layer that actually performs network I/O.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// The request did not complete within the effective timeout.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established (refused, DNS failure, ...).
    #[error("connection failed: {0}")]
    Connection(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Other(Box::new(err))
        }
    }
}

/// The main error type.
///
/// # Examples
///
/// ```no_run
/// use restpath::{Client, Error, HttpErrorKind, RequestOptions};
///
/// # fn example() -> Result<(), Error> {
/// let client = Client::new("https://api.example.com")?;
///
/// match client.path("users").segment(42).get(RequestOptions::default()) {
///     Ok(response) => println!("{}", response.body),
///     Err(Error::Http(err)) if err.kind == HttpErrorKind::NotFound => {
///         eprintln!("no such user: {}", err.body);
///     }
///     Err(Error::Http(err)) => eprintln!("HTTP error {}: {}", err.status_code, err.body),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The server answered with a status code of 400 or above.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The transport failed before a complete response was read.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// An async call was made on a client without an attached session.
    #[error("a connection session is required before dispatching")]
    SessionRequired,

    /// A session was attached to a client that already has one.
    #[error("a connection session has already been set")]
    SessionAlreadySet,

    /// Invalid configuration, such as a missing host or an invalid header.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The request body could not be serialized.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// The composed URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns the HTTP status code for classified HTTP errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http(err) => Some(err.status_code),
            _ => None,
        }
    }

    /// Returns the raw response body for classified HTTP errors.
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::Http(err) => Some(&err.body),
            _ => None,
        }
    }

    /// Returns the error kind for classified HTTP errors.
    pub fn http_kind(&self) -> Option<HttpErrorKind> {
        match self {
            Error::Http(err) => Some(err.kind),
            _ => None,
        }
    }

    /// Returns `true` if the error was raised before any network I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::SessionRequired
                | Error::SessionAlreadySet
                | Error::ConfigurationError(_)
                | Error::SerializationFailed(_)
                | Error::InvalidUrl(_)
        )
    }

    /// Returns `true` for transport failures, including timeouts.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Returns `true` if the transport gave up because the timeout expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport(TransportError::Timeout))
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> StatusCode {
        StatusCode::from_u16(code).unwrap()
    }

    #[test]
    fn test_classification_table() {
        let table = [
            (400, HttpErrorKind::BadRequest),
            (401, HttpErrorKind::Unauthorized),
            (403, HttpErrorKind::Forbidden),
            (404, HttpErrorKind::NotFound),
            (405, HttpErrorKind::MethodNotAllowed),
            (413, HttpErrorKind::PayloadTooLarge),
            (415, HttpErrorKind::UnsupportedMediaType),
            (429, HttpErrorKind::TooManyRequests),
            (500, HttpErrorKind::InternalServerError),
            (503, HttpErrorKind::ServiceUnavailable),
            (504, HttpErrorKind::GatewayTimeout),
        ];

        for (code, kind) in table {
            let err = classify(status(code), "body".into(), HeaderMap::new()).unwrap();
            assert_eq!(err.kind, kind, "status {code}");
            assert_eq!(err.status_code.as_u16(), code);
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(classify(status(399), String::new(), HeaderMap::new()).is_none());
        assert!(classify(status(304), String::new(), HeaderMap::new()).is_none());
        assert!(classify(status(200), String::new(), HeaderMap::new()).is_none());

        let err = classify(status(400), String::new(), HeaderMap::new()).unwrap();
        assert_eq!(err.kind, HttpErrorKind::BadRequest);
    }

    #[test]
    fn test_unmapped_status_is_generic() {
        let err = classify(status(418), "teapot".into(), HeaderMap::new()).unwrap();
        assert_eq!(err.kind, HttpErrorKind::Other);
        assert_eq!(err.status_code.as_u16(), 418);

        let err = classify(status(502), String::new(), HeaderMap::new()).unwrap();
        assert_eq!(err.kind, HttpErrorKind::Other);
    }

    #[test]
    fn test_payload_is_preserved() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", "30".parse().unwrap());

        let err = classify(status(429), "slow down".into(), headers).unwrap();
        assert_eq!(err.body, "slow down");
        assert_eq!(err.headers.get("retry-after").unwrap(), "30");
        assert_eq!(err.reason(), Some("Too Many Requests"));
    }

    #[test]
    fn test_error_body_as_json() {
        #[derive(serde::Deserialize)]
        struct Problem {
            message: String,
        }

        let err = classify(status(422), r#"{"message":"bad field"}"#.into(), HeaderMap::new())
            .unwrap();
        let problem: Problem = err.to_json().unwrap();
        assert_eq!(problem.message, "bad field");
    }

    #[test]
    fn test_error_helpers() {
        let err = Error::from(classify(status(404), "missing".into(), HeaderMap::new()).unwrap());
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.body(), Some("missing"));
        assert_eq!(err.http_kind(), Some(HttpErrorKind::NotFound));
        assert!(!err.is_configuration());

        assert!(Error::SessionRequired.is_configuration());
        assert!(Error::SessionAlreadySet.is_configuration());
        assert_eq!(Error::SessionRequired.status(), None);

        let err = Error::from(TransportError::Timeout);
        assert!(err.is_transport());
        assert!(err.is_timeout());
        assert_eq!(err.http_kind(), None);
    }
}
