//! # restpath - an immutable path-building REST client
//!
//! restpath builds request URLs by chaining path segments onto a client value,
//! dispatches the request either blocking or async, and turns error statuses
//! into typed errors.
//!
//! ## Quick Start
//!
//! ```no_run
//! use restpath::{Client, RequestOptions};
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Serialize)]
//! struct CreateUser {
//!     name: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::builder()
//!         .host("https://api.example.com")?
//!         .version(3)
//!         .header("Authorization", "Bearer token")?
//!         .timeout(Duration::from_secs(30))
//!         .build()?;
//!
//!     // GET https://api.example.com/v3/users/42
//!     let user: User = client.path("users").segment(42).get(RequestOptions::default())?.to_json()?;
//!     println!("User: {}", user.name);
//!
//!     // POST https://api.example.com/v3/users
//!     let body = CreateUser { name: "Alice".to_string() };
//!     let created = client.path("users").post(RequestOptions::new().json(&body)?)?;
//!     println!("Created: {}", created.body);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Execution models
//!
//! - [`Client`] dispatches through a blocking [`Transport`]. The default,
//!   [`HttpTransport`], keeps no state between calls.
//! - [`AsyncClient`] dispatches through a [`Session`] that the caller owns and
//!   attaches exactly once, e.g. a shared `reqwest::Client`.
//!
//! Both share the same path-building API, the same [`RequestOptions`] and the
//! same [`Response`].
//!
//! ## Error Handling
//!
//! Every response with a status of 400 or above becomes [`Error::Http`] carrying
//! an [`HttpError`] whose [`kind`](HttpError::kind) names the status:
//!
//! ```no_run
//! use restpath::{Client, Error, HttpErrorKind, RequestOptions};
//!
//! # fn example() -> Result<(), Error> {
//! # let client = Client::new("https://api.example.com")?;
//! match client.path("users").segment(99).get(RequestOptions::default()) {
//!     Ok(response) => println!("Found: {}", response.body),
//!     Err(Error::Http(err)) if err.kind == HttpErrorKind::NotFound => {
//!         eprintln!("Missing: {}", err.body);
//!     }
//!     Err(Error::Http(err)) => eprintln!("HTTP error {}: {}", err.status_code, err.body),
//!     Err(e) if e.is_timeout() => eprintln!("Timed out"),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Nothing is retried: a failed dispatch is returned to the caller once.

pub mod blocking;
mod client;
pub mod cooperative;
mod error;
mod request;
mod response;
mod snapshot;
pub mod transport;

pub use blocking::Blocking;
pub use client::{AsyncClient, Client, ClientBuilder, PathClient};
pub use cooperative::Cooperative;
pub use error::{classify, Error, HttpError, HttpErrorKind, Result, TransportError};
pub use request::{Request, RequestOptions};
pub use response::Response;
pub use snapshot::ClientSnapshot;
pub use transport::{HttpTransport, Session, Transport};
