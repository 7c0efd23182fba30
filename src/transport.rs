//! The seams between the client and the code that actually performs I/O.
//!
//! [`Transport`] is the blocking seam, used by [`Client`](crate::Client).
//! [`Session`] is the cooperative seam, used by [`AsyncClient`](crate::AsyncClient);
//! a session is owned by the caller and shared with clients through an `Arc`.
//!
//! Both return a [`Response`] for every status code. Classification of error
//! statuses happens in the client, so transports stay free of HTTP policy.

use crate::error::TransportError;
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;

/// A blocking transport.
///
/// Implementations perform exactly one HTTP exchange per call and must not
/// retry.
pub trait Transport: Send + Sync {
    /// Sends the request and reads the full response.
    fn send(&self, request: Request) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: Request) -> Result<Response, TransportError> {
        (**self).send(request)
    }
}

/// An externally owned connection session for the cooperative model.
///
/// The session is the only shared mutable resource between concurrent calls;
/// implementations are expected to be safe to use from many tasks at once.
#[async_trait]
pub trait Session: Send + Sync {
    /// Sends the request and reads the full response.
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}

/// The default blocking transport.
///
/// Builds a fresh `reqwest::blocking::Client` for every call, so no connection
/// state is kept between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransport;

impl Transport for HttpTransport {
    fn send(&self, request: Request) -> Result<Response, TransportError> {
        let client = reqwest::blocking::Client::builder().build()?;
        Transport::send(&client, request)
    }
}

impl Transport for reqwest::blocking::Client {
    fn send(&self, request: Request) -> Result<Response, TransportError> {
        let mut builder = self
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send()?;
        Response::from_blocking(response)
    }
}

#[async_trait]
impl Session for reqwest::Client {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let mut builder = self
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        Response::from_reqwest(response).await
    }
}
