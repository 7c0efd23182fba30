//! The immutable path-building client.
//!
//! A [`Client`] is a value: every call that extends the path or changes the
//! configuration returns a new client and leaves the original untouched. This
//! makes it safe to branch many paths off one shared root.
//!
//! Building a path never performs I/O. I/O only happens in the verb methods,
//! which live next to their dispatcher: [`blocking`](crate::blocking) for
//! [`Client`] and [`cooperative`](crate::cooperative) for [`AsyncClient`].

use crate::{
    blocking::Blocking,
    cooperative::Cooperative,
    request::{merge_headers, parse_header, Request, RequestOptions},
    snapshot::ClientSnapshot,
    transport::{HttpTransport, Session, Transport},
    Error, Response, Result,
};
use http::{HeaderMap, Method};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A REST client positioned at some path below a host.
///
/// The type parameter selects the execution model. [`Client`] ([`Blocking`])
/// occupies the calling thread during a call; [`AsyncClient`] ([`Cooperative`])
/// suspends the calling task and dispatches through an attached [`Session`].
///
/// # Examples
///
/// ```no_run
/// use restpath::{Client, RequestOptions};
///
/// # fn example() -> Result<(), restpath::Error> {
/// let client = Client::builder()
///     .host("https://api.example.com")?
///     .version(3)
///     .header("Authorization", "Bearer token")?
///     .build()?;
///
/// // GET https://api.example.com/v3/users/42
/// let users = client.path("users");
/// let response = users.segment(42).get(RequestOptions::default())?;
/// println!("{}", response.body);
///
/// // `users` is unchanged and can be reused.
/// let response = users.get(RequestOptions::new().query("page", "2"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PathClient<M> {
    host: String,
    version: Option<String>,
    url_path: Vec<String>,
    request_headers: HeaderMap,
    timeout: Option<Duration>,
    append_slash: bool,
    pub(crate) mode: M,
}

/// A client that dispatches through a blocking [`Transport`].
pub type Client = PathClient<Blocking>;

/// A client that dispatches through an attached [`Session`].
pub type AsyncClient = PathClient<Cooperative>;

impl Client {
    /// Creates a new `ClientBuilder` for configuring a root client.
    ///
    /// The builder produces either execution model; see
    /// [`ClientBuilder::build`] and [`ClientBuilder::build_async`].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a blocking root client for `host` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `host` is not an absolute URL.
    pub fn new(host: impl AsRef<str>) -> Result<Self> {
        ClientBuilder::new().host(host)?.build()
    }

    /// Restores a blocking client from a snapshot, using the default transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot holds an invalid host or header.
    pub fn restore(snapshot: ClientSnapshot) -> Result<Self> {
        snapshot.into_builder()?.build()
    }
}

impl<M: Clone> PathClient<M> {
    fn derive(&self, f: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        f(&mut next);
        next
    }

    /// Returns a client with `name` appended to the path.
    ///
    /// `name` is split on `/` and every non-empty piece becomes one segment,
    /// so `path("users")` adds one segment and `path("admin/users")` adds two.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn example() -> Result<(), restpath::Error> {
    /// let root = restpath::Client::new("http://api.test")?;
    /// assert_eq!(root.path("admin/users").url_path(), ["admin", "users"]);
    /// assert!(root.url_path().is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn path(&self, name: impl AsRef<str>) -> Self {
        self.derive(|next| {
            next.url_path.extend(
                name.as_ref()
                    .split('/')
                    .filter(|piece| !piece.is_empty())
                    .map(str::to_string),
            );
        })
    }

    /// Returns a client with `value` appended to the path as exactly one
    /// segment, unmodified. An empty value leaves the path as it is.
    ///
    /// Use this for numeric ids and names that are not plain identifiers.
    /// `?` and `#` inside the value are percent-encoded when the URL is
    /// composed, so they stay part of the segment.
    pub fn segment(&self, value: impl fmt::Display) -> Self {
        let value = value.to_string();
        self.derive(|next| {
            if !value.is_empty() {
                next.url_path.push(value);
            }
        })
    }

    /// Returns a client that prefixes the path with `/v{version}`.
    pub fn with_version(&self, version: impl fmt::Display) -> Self {
        let version = version.to_string();
        self.derive(|next| next.version = Some(version))
    }

    /// Returns a client with one more inherited header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(&self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        Ok(self.derive(|next| {
            next.request_headers.insert(name, value);
        }))
    }

    /// Returns a client whose inherited headers are merged with `headers`;
    /// the new values win on collision.
    pub fn with_headers(&self, headers: HeaderMap) -> Self {
        self.derive(|next| merge_headers(&mut next.request_headers, headers))
    }

    /// Returns a client with a different default timeout.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.derive(|next| next.timeout = Some(timeout))
    }

    /// Returns a client with a different trailing-slash policy.
    pub fn with_append_slash(&self, append_slash: bool) -> Self {
        self.derive(|next| next.append_slash = append_slash)
    }

    /// The host every derived client shares.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The API version, if set.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The path segments accumulated so far.
    pub fn url_path(&self) -> &[String] {
        &self.url_path
    }

    /// The headers sent with every call from this client.
    pub fn request_headers(&self) -> &HeaderMap {
        &self.request_headers
    }

    /// The default timeout, if set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Whether composed URLs end with `/`.
    pub fn append_slash(&self) -> bool {
        self.append_slash
    }

    /// Composes the full URL for this client.
    ///
    /// The layout is `{host}[/v{version}]/{segment}/...[/][?{query}]`. Query
    /// parameters are sorted by key; repeated keys keep their relative order.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn example() -> Result<(), restpath::Error> {
    /// let client = restpath::Client::builder()
    ///     .host("http://api.test")?
    ///     .version(3)
    ///     .build()?;
    ///
    /// assert_eq!(client.build_url(&[]), "http://api.test/v3");
    /// assert_eq!(
    ///     client.path("users").build_url(&[("b".into(), "2".into()), ("a".into(), "1".into())]),
    ///     "http://api.test/v3/users?a=1&b=2",
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn build_url(&self, query_params: &[(String, String)]) -> String {
        let mut url = self.host.clone();

        if let Some(version) = &self.version {
            url.push_str("/v");
            url.push_str(version);
        }

        for segment in &self.url_path {
            url.push('/');
            url.push_str(&escape_segment(segment));
        }

        if self.append_slash {
            url.push('/');
        }

        if !query_params.is_empty() {
            let mut sorted: Vec<_> = query_params.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(&b.0));

            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(sorted)
                .finish();
            url.push('?');
            url.push_str(&query);
        }

        url
    }

    /// Captures the client's state, excluding any transport or session.
    pub fn snapshot(&self) -> ClientSnapshot {
        ClientSnapshot {
            host: self.host.clone(),
            version: self.version.clone(),
            url_path: self.url_path.clone(),
            request_headers: self
                .request_headers
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect(),
            timeout: self.timeout,
            append_slash: self.append_slash,
        }
    }

    /// Builds the request descriptor for one call.
    ///
    /// Dot segments are rejected: URL parsing would resolve them against the
    /// preceding segments and the call would reach a different resource.
    pub(crate) fn prepare(&self, method: Method, options: RequestOptions) -> Result<Request> {
        if let Some(segment) = self.url_path.iter().find(|s| is_dot_segment(s)) {
            return Err(Error::ConfigurationError(format!(
                "Dot segment cannot be sent as a path segment: {:?}",
                segment
            )));
        }

        let url = Url::parse(&self.build_url(&options.query_params))?;
        Ok(Request::new(
            method,
            url,
            &self.request_headers,
            options,
            self.timeout,
        ))
    }
}

impl<M: fmt::Debug> fmt::Debug for PathClient<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host)
            .field("version", &self.version)
            .field("url_path", &self.url_path)
            .field("request_headers", &self.request_headers)
            .field("timeout", &self.timeout)
            .field("append_slash", &self.append_slash)
            .field("mode", &self.mode)
            .finish()
    }
}

/// Percent-encodes the characters that would end the path part of a URL.
fn escape_segment(segment: &str) -> Cow<'_, str> {
    if !segment.contains(['?', '#']) {
        return Cow::Borrowed(segment);
    }
    Cow::Owned(segment.replace('?', "%3F").replace('#', "%23"))
}

/// `.` and `..`, including the percent-encoded spellings URL parsing treats
/// the same way.
fn is_dot_segment(segment: &str) -> bool {
    let lowered = segment.to_ascii_lowercase();
    matches!(
        lowered.as_str(),
        "." | "%2e" | ".." | ".%2e" | "%2e." | "%2e%2e"
    )
}

/// Classifies a completed response, logging error statuses.
pub(crate) fn check_status(response: Response) -> Result<Response> {
    response.error_for_status().map_err(|err| {
        tracing::warn!(
            status = err.status_code.as_u16(),
            kind = %err.kind,
            response = %err.body,
            "HTTP error response"
        );
        Error::Http(err)
    })
}

/// Builder for configuring a root [`Client`] or [`AsyncClient`].
///
/// # Examples
///
/// ```no_run
/// use restpath::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), restpath::Error> {
/// let client = ClientBuilder::new()
///     .host("https://api.example.com")?
///     .version(3)
///     .timeout(Duration::from_secs(30))
///     .header("User-Agent", "my-app/1.0")?
///     .append_slash(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    host: Option<String>,
    version: Option<String>,
    url_path: Vec<String>,
    headers: HeaderMap,
    timeout: Option<Duration>,
    append_slash: bool,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host all URLs are built on.
    ///
    /// The host is kept verbatim; it is only checked to be an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not an absolute URL.
    pub fn host(mut self, host: impl AsRef<str>) -> Result<Self> {
        let host = host.as_ref();
        if Url::parse(host)?.cannot_be_a_base() {
            return Err(Error::ConfigurationError(format!(
                "Host cannot carry a path: {}",
                host
            )));
        }
        self.host = Some(host.to_string());
        Ok(self)
    }

    /// Sets the API version injected as `/v{version}`.
    pub fn version(mut self, version: impl fmt::Display) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Adds a header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds headers that will be included in all requests.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        merge_headers(&mut self.headers, headers);
        self
    }

    /// Sets the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets whether composed URLs end with `/`.
    pub fn append_slash(mut self, append_slash: bool) -> Self {
        self.append_slash = append_slash;
        self
    }

    pub(crate) fn url_path(mut self, url_path: Vec<String>) -> Self {
        self.url_path = url_path;
        self
    }

    fn finish<M>(self, mode: M) -> Result<PathClient<M>> {
        let host = self
            .host
            .ok_or_else(|| Error::ConfigurationError("Host is required".to_string()))?;

        Ok(PathClient {
            host,
            version: self.version,
            url_path: self.url_path,
            request_headers: self.headers,
            timeout: self.timeout,
            append_slash: self.append_slash,
            mode,
        })
    }

    /// Builds a blocking client using [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns an error if no host was provided.
    pub fn build(self) -> Result<Client> {
        self.build_with_transport(HttpTransport)
    }

    /// Builds a blocking client that dispatches through `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if no host was provided.
    pub fn build_with_transport(self, transport: impl Transport + 'static) -> Result<Client> {
        self.finish(Blocking::new(Arc::new(transport)))
    }

    /// Builds an async client without a session.
    ///
    /// A session must be attached with [`AsyncClient::attach_session`] before
    /// the first call.
    ///
    /// # Errors
    ///
    /// Returns an error if no host was provided.
    pub fn build_async(self) -> Result<AsyncClient> {
        self.finish(Cooperative::default())
    }

    /// Builds an async client with `session` already attached.
    ///
    /// # Errors
    ///
    /// Returns an error if no host was provided.
    pub fn build_async_with_session(self, session: Arc<dyn Session>) -> Result<AsyncClient> {
        let client = self.build_async()?;
        client.attach_session(session)?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Client {
        Client::new("http://api.test").unwrap()
    }

    fn q(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_root_url() {
        assert_eq!(root().build_url(&[]), "http://api.test");
        assert_eq!(root().with_append_slash(true).build_url(&[]), "http://api.test/");
    }

    #[test]
    fn test_version_prefix() {
        let client = root().with_version(3);
        assert_eq!(client.build_url(&[]), "http://api.test/v3");
        assert_eq!(
            client.with_append_slash(true).build_url(&[]),
            "http://api.test/v3/"
        );
        assert_eq!(client.path("users").build_url(&[]), "http://api.test/v3/users");
    }

    #[test]
    fn test_path_and_segment_compose_identically() {
        let by_path = root().path("a").path("b");
        let by_segment = root().segment("a").segment("b");
        assert_eq!(by_path.build_url(&[]), by_segment.build_url(&[]));
        assert_eq!(by_path.build_url(&[]), "http://api.test/a/b");
    }

    #[test]
    fn test_segment_is_verbatim() {
        let client = root().path("files").segment("a/b").segment(42);
        assert_eq!(client.url_path(), ["files", "a/b", "42"]);
    }

    #[test]
    fn test_empty_segment_is_skipped() {
        let client = root().path("users").segment("").segment("x");
        assert_eq!(client.url_path(), ["users", "x"]);
        assert_eq!(client.build_url(&[]), "http://api.test/users/x");
    }

    #[test]
    fn test_query_and_fragment_characters_stay_in_segment() {
        let client = root().path("files").segment("#frag").segment("a?b");
        assert_eq!(client.url_path(), ["files", "#frag", "a?b"]);
        assert_eq!(client.build_url(&[]), "http://api.test/files/%23frag/a%3Fb");

        let request = client
            .prepare(Method::GET, RequestOptions::new().query("q", "1"))
            .unwrap();
        assert_eq!(request.url.path(), "/files/%23frag/a%3Fb");
        assert_eq!(request.url.query(), Some("q=1"));
        assert_eq!(request.url.fragment(), None);
    }

    #[test]
    fn test_dot_segments_are_rejected() {
        for dots in [".", "..", "%2E%2e", ".%2E"] {
            let client = root().path("files").segment(dots);
            let err = client
                .prepare(Method::GET, RequestOptions::default())
                .unwrap_err();
            assert!(matches!(err, Error::ConfigurationError(_)), "segment {dots}");
        }

        let err = root()
            .path("files/../admin")
            .prepare(Method::GET, RequestOptions::default())
            .unwrap_err();
        assert!(err.is_configuration());

        // Dots inside a longer segment are ordinary characters.
        let request = root()
            .path("files")
            .segment("..config")
            .prepare(Method::GET, RequestOptions::default())
            .unwrap();
        assert_eq!(request.url.as_str(), "http://api.test/files/..config");
    }

    #[test]
    fn test_path_splits_on_slash() {
        let client = root().path("/admin//users/");
        assert_eq!(client.url_path(), ["admin", "users"]);
    }

    #[test]
    fn test_query_string_sorted_after_slash() {
        let client = root().path("users").with_append_slash(true);
        let url = client.build_url(&q(&[("limit", "10"), ("filter", "a b"), ("limit", "20")]));
        assert_eq!(url, "http://api.test/users/?filter=a+b&limit=10&limit=20");
    }

    #[test]
    fn test_derivation_never_mutates_parent() {
        let parent = root()
            .path("users")
            .with_header("X-Root", "1")
            .unwrap()
            .with_timeout(Duration::from_secs(5));

        let child = parent
            .segment(7)
            .with_header("X-Root", "2")
            .unwrap()
            .with_header("X-Child", "yes")
            .unwrap()
            .with_timeout(Duration::from_secs(1));

        assert_eq!(parent.url_path(), ["users"]);
        assert_eq!(parent.request_headers().get("x-root").unwrap(), "1");
        assert!(parent.request_headers().get("x-child").is_none());
        assert_eq!(parent.timeout(), Some(Duration::from_secs(5)));

        assert_eq!(child.url_path(), ["users", "7"]);
        assert_eq!(child.request_headers().get("x-root").unwrap(), "2");
        assert_eq!(child.timeout(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_siblings_are_independent() {
        let users = root().path("users");
        let first = users.segment(1);
        let second = users.segment(2);
        assert_eq!(first.build_url(&[]), "http://api.test/users/1");
        assert_eq!(second.build_url(&[]), "http://api.test/users/2");
        assert_eq!(users.build_url(&[]), "http://api.test/users");
    }

    #[test]
    fn test_derived_client_inherits_configuration() {
        let original = Client::builder()
            .host("http://api.test")
            .unwrap()
            .version(1)
            .append_slash(true)
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        let produced = original.path("path");
        assert_eq!(produced.host(), "http://api.test");
        assert_eq!(produced.version(), Some("1"));
        assert_eq!(produced.url_path(), ["path"]);
        assert!(produced.append_slash());
        assert_eq!(produced.timeout(), Some(Duration::from_secs(60)));
        assert!(produced.request_headers().is_empty());
    }

    #[test]
    fn test_builder_requires_host() {
        let err = ClientBuilder::new().build().unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));

        let err = ClientBuilder::new().host("not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));

        let err = ClientBuilder::new().host("mailto:someone@example.com").unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));
    }

    #[test]
    fn test_prepare_builds_descriptor() {
        let client = root()
            .with_header("Accept", "application/json")
            .unwrap()
            .with_timeout(Duration::from_secs(9))
            .path("search");

        let request = client
            .prepare(
                Method::GET,
                RequestOptions::new().query("q", "rust").header("Accept", "text/plain").unwrap(),
            )
            .unwrap();

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url.as_str(), "http://api.test/search?q=rust");
        assert_eq!(request.headers.get("accept").unwrap(), "text/plain");
        assert_eq!(request.timeout, Some(Duration::from_secs(9)));
        assert!(request.body.is_none());
    }
}
