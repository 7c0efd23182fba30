//! Normalized HTTP responses.
//!
//! Whatever transport performed the call, its result is reduced to a
//! [`Response`]: a status code, the body text and the headers. A `Response` is
//! built once, after the body has been fully read, and never modified.

use crate::error::{is_error_status, HttpError, TransportError};
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

/// A snapshot of a completed HTTP response.
///
/// # Examples
///
/// ```no_run
/// use restpath::{Client, RequestOptions};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("https://api.example.com")?;
/// let response = client.path("users").segment(123).get(RequestOptions::default())?;
///
/// println!("Status: {}", response.status_code);
/// let user: User = response.to_json()?;
/// println!("User: {}", user.name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code.
    pub status_code: StatusCode,

    /// The response body as text.
    pub body: String,

    /// The response headers.
    pub headers: HeaderMap,
}

impl Response {
    /// Creates a new `Response`.
    pub fn new(status_code: StatusCode, body: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            status_code,
            body: body.into(),
            headers,
        }
    }

    /// Reads a blocking `reqwest` response to completion.
    pub fn from_blocking(response: reqwest::blocking::Response) -> Result<Self, TransportError> {
        let status_code = response.status();
        let headers = response.headers().clone();
        let body = response.text()?;
        Ok(Self::new(status_code, body, headers))
    }

    /// Reads an async `reqwest` response to completion.
    pub async fn from_reqwest(response: reqwest::Response) -> Result<Self, TransportError> {
        let status_code = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(Self::new(status_code, body, headers))
    }

    /// Turns the response into a classified [`HttpError`] if its status is 400
    /// or above.
    ///
    /// # Examples
    ///
    /// ```
    /// # use restpath::{HttpErrorKind, Response};
    /// # use http::{HeaderMap, StatusCode};
    /// let ok = Response::new(StatusCode::OK, "fine", HeaderMap::new());
    /// assert!(ok.error_for_status().is_ok());
    ///
    /// let bad = Response::new(StatusCode::BAD_REQUEST, "nope", HeaderMap::new());
    /// let err = bad.error_for_status().unwrap_err();
    /// assert_eq!(err.kind, HttpErrorKind::BadRequest);
    /// ```
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if !self.is_error() {
            return Ok(self);
        }

        Err(HttpError::from_parts(self.status_code, self.body, self.headers))
    }

    /// Returns `true` if the status code is 400 or above.
    pub fn is_error(&self) -> bool {
        is_error_status(self.status_code)
    }

    /// Deserializes the body as JSON.
    pub fn to_json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }

    /// Returns a header value by name, if present and valid text.
    ///
    /// # Examples
    ///
    /// ```
    /// # use restpath::Response;
    /// # use http::{HeaderMap, HeaderValue, StatusCode};
    /// let mut headers = HeaderMap::new();
    /// headers.insert("content-type", HeaderValue::from_static("application/json"));
    ///
    /// let response = Response::new(StatusCode::OK, "{}", headers);
    /// assert_eq!(response.header("Content-Type"), Some("application/json"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::classify;

    #[test]
    fn test_redirect_status_is_not_an_error() {
        let response = Response::new(StatusCode::NOT_MODIFIED, "", HeaderMap::new());
        assert!(!response.is_error());
        assert!(response.error_for_status().is_ok());
    }

    #[test]
    fn test_error_for_status_keeps_payload() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", "abc".parse().unwrap());

        let response = Response::new(StatusCode::SERVICE_UNAVAILABLE, "down", headers);
        let err = response.error_for_status().unwrap_err();
        assert_eq!(err.body, "down");
        assert_eq!(err.headers.get("x-request-id").unwrap(), "abc");
    }

    #[test]
    fn test_error_for_status_agrees_with_classify() {
        for code in [200, 204, 304, 399, 400, 404, 418, 429, 500, 599] {
            let status = StatusCode::from_u16(code).unwrap();
            let classified = classify(status, "body".into(), HeaderMap::new());
            let response = Response::new(status, "body", HeaderMap::new());

            assert_eq!(response.is_error(), classified.is_some(), "status {code}");
            match (response.error_for_status(), classified) {
                (Ok(response), None) => assert_eq!(response.status_code, status),
                (Err(err), Some(expected)) => {
                    assert_eq!(err.kind, expected.kind, "status {code}");
                    assert_eq!(err.status_code, expected.status_code);
                    assert_eq!(err.body, expected.body);
                }
                (result, classified) => panic!(
                    "status {code}: error_for_status {:?}, classify {:?}",
                    result.is_err(),
                    classified.is_some()
                ),
            }
        }
    }

    #[test]
    fn test_to_json() {
        let response = Response::new(StatusCode::OK, r#"{"id": 7}"#, HeaderMap::new());
        let value: serde_json::Value = response.to_json().unwrap();
        assert_eq!(value["id"], 7);

        let response = Response::new(StatusCode::OK, "not json", HeaderMap::new());
        assert!(response.to_json::<serde_json::Value>().is_err());
    }
}
