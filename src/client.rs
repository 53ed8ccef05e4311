//! Nekos API client.
//!
//! Low-level HTTP client that merges query defaults, dispatches requests and
//! decodes JSON answers. Resource-specific operations are implemented via
//! traits on model types.

use std::env;
use std::future::Future;
use std::sync::Arc;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::endpoints::DEFAULT_DOMAIN;
use crate::error::{NekosError, Result};
use crate::query::{resolve, Query};

const USER_AGENT: &str = concat!("nekosapi/", env!("CARGO_PKG_VERSION"));

/// Low-level Nekos API client.
///
/// Holds the API domain, a default query merged into every request and the
/// HTTP transport. Entity-specific operations are implemented via the `Get`
/// and `List` traits on model types.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool. The default query is copy-on-write, so changing it on
/// one clone never affects another.
///
/// # Example
///
/// ```no_run
/// use nekosapi::{NekosClient, Query};
///
/// # fn example() -> nekosapi::Result<()> {
/// // Create from environment variables
/// let client = NekosClient::from_env()?;
///
/// // Or configure manually, only asking for safe images by default
/// let client = NekosClient::new("https://api.nekosapi.com/v3")?
///     .with_default_query(Query::safe());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NekosClient {
    http: Client,
    domain: Arc<str>,
    default_query: Arc<Query>,
}

impl std::fmt::Debug for NekosClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NekosClient")
            .field("domain", &&*self.domain)
            .field("default_query", &self.default_query)
            .finish_non_exhaustive()
    }
}

impl NekosClient {
    /// Create a client from environment variables.
    ///
    /// Uses `NEKOS_API_URL` for the domain if set, otherwise
    /// `https://api.nekosapi.com/v3`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured domain is not a valid URL.
    pub fn from_env() -> Result<Self> {
        let domain = env::var("NEKOS_API_URL").unwrap_or_else(|_| DEFAULT_DOMAIN.to_string());
        Self::new(&domain)
    }

    /// Create a new client for the given domain (e.g. `https://api.nekosapi.com/v3`).
    ///
    /// No request timeout is configured; use the `_with_cancel` variants to
    /// bound a call.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is invalid or the HTTP client can't be built.
    pub fn new(domain: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(NekosError::HttpError)?;

        Self::with_http_client(http, domain)
    }

    /// Create a client over a caller-configured transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is not an absolute `http(s)` URL.
    pub fn with_http_client(http: Client, domain: &str) -> Result<Self> {
        // Paths are appended verbatim, so drop the trailing slash
        let domain = domain.trim_end_matches('/');

        let parsed = Url::parse(domain)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NekosError::Config(format!(
                "unsupported scheme '{}' in domain {domain}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            http,
            domain: Arc::from(domain),
            default_query: Arc::new(Query::new()),
        })
    }

    /// Get the API domain.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Query merged into every request made through this client.
    pub fn default_query(&self) -> &Query {
        &self.default_query
    }

    /// Replace the default query.
    pub fn set_default_query(&mut self, query: Query) {
        self.default_query = Arc::new(query);
    }

    /// Mutable access to the default query, cloned first if shared with another client.
    pub fn default_query_mut(&mut self) -> &mut Query {
        Arc::make_mut(&mut self.default_query)
    }

    /// Derive a client that uses `query` as its default query.
    #[must_use]
    pub fn with_default_query(mut self, query: Query) -> Self {
        self.set_default_query(query);
        self
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Build the full request URL: domain, path, and the merged query if non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting URL doesn't parse.
    pub fn request_url(&self, path: &str, query: Option<&Query>) -> Result<Url> {
        let encoded = resolve(query, Some(&*self.default_query));

        let mut url = format!("{}{}", self.domain, path);
        if !encoded.is_empty() {
            url.push('?');
            url.push_str(&encoded);
        }

        Ok(Url::parse(&url)?)
    }

    /// Make a GET request and decode the JSON answer.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Option<&Query>) -> Result<T> {
        self.call(Method::GET, path, query).await
    }

    /// Make a cancellable GET request and decode the JSON answer.
    pub async fn get_with_cancel<T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        path: &str,
        query: Option<&Query>,
    ) -> Result<T> {
        self.call_with_cancel(cancel, Method::GET, path, query)
            .await
    }

    /// Make a POST request and decode the JSON answer.
    pub async fn post<T: DeserializeOwned>(&self, path: &str, query: Option<&Query>) -> Result<T> {
        self.call(Method::POST, path, query).await
    }

    /// Make a cancellable POST request and decode the JSON answer.
    pub async fn post_with_cancel<T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        path: &str,
        query: Option<&Query>,
    ) -> Result<T> {
        self.call_with_cancel(cancel, Method::POST, path, query)
            .await
    }

    /// Make a request and decode the JSON answer into `T`.
    ///
    /// Runs until the server answers or the transport fails; dropping the
    /// returned future aborts the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the transport fails, the body
    /// can't be read, or the body doesn't decode as `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Query>,
    ) -> Result<T> {
        self.dispatch(None, method, path, query, decode_json).await
    }

    /// Same as [`NekosClient::call`], aborting with [`NekosError::Cancelled`]
    /// as soon as `cancel` fires.
    pub async fn call_with_cancel<T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        method: Method,
        path: &str,
        query: Option<&Query>,
    ) -> Result<T> {
        self.dispatch(Some(cancel), method, path, query, decode_json)
            .await
    }

    /// Make a request whose answer body is irrelevant.
    ///
    /// The body is still read to completion and released, but never decoded.
    pub async fn send(&self, method: Method, path: &str, query: Option<&Query>) -> Result<()> {
        self.dispatch(None, method, path, query, |_| Ok(())).await
    }

    /// Cancellable form of [`NekosClient::send`].
    pub async fn send_with_cancel(
        &self,
        cancel: &CancellationToken,
        method: Method,
        path: &str,
        query: Option<&Query>,
    ) -> Result<()> {
        self.dispatch(Some(cancel), method, path, query, |_| Ok(()))
            .await
    }

    #[tracing::instrument(skip(self, cancel, decode))]
    async fn dispatch<T, F>(
        &self,
        cancel: Option<&CancellationToken>,
        method: Method,
        path: &str,
        query: Option<&Query>,
        decode: F,
    ) -> Result<T>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        let url = self.request_url(path, query)?;
        tracing::debug!(%url, "dispatching request");

        let round_trip = async {
            let response = self
                .http
                .request(method, url)
                .send()
                .await
                .map_err(NekosError::HttpError)?;
            tracing::debug!(status = %response.status(), "received response");

            response.bytes().await.map_err(NekosError::BodyRead)
        };

        let body = with_cancel(cancel, round_trip).await?;
        decode(&body[..])
    }
}

/// Decode into a fresh value so a failed decode never leaves partial state behind.
fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(body)?)
}

/// Run `fut` unless `cancel` fires first.
///
/// An already-cancelled token returns before `fut` is polled, so no request
/// goes out. The future is dropped on cancellation, which releases any
/// response it was holding.
pub(crate) async fn with_cancel<F, T>(cancel: Option<&CancellationToken>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let Some(token) = cancel else {
        return fut.await;
    };

    if token.is_cancelled() {
        tracing::debug!("token already cancelled, skipping request");
        return Err(NekosError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => {
            tracing::debug!("request cancelled");
            Err(NekosError::Cancelled)
        }
        result = fut => result,
    }
}
