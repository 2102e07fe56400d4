//! NCBI E-utilities API client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff
//! - Rate limiting (3 req/s, 10 req/s with an API key)
//! - `api_key`, `email` and `tool` attached to every request

mod middleware;

pub use middleware::{RateLimitMiddleware, RateLimiter};

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use url::Url;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::eutils::{ELinkResponse, ESearchResponse, ESummaryResponse};

/// E-utilities endpoints.
mod endpoint {
    pub const ESEARCH: &str = "esearch.fcgi";
    pub const ESUMMARY: &str = "esummary.fcgi";
    pub const ELINK: &str = "elink.fcgi";
    pub const EFETCH: &str = "efetch.fcgi";
}

type Params = Vec<(&'static str, String)>;

/// PubMed E-utilities client.
#[derive(Clone)]
pub struct PubMedClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// E-utilities base URL, always ending in `/`.
    base_url: Url,

    /// API key (optional).
    api_key: Option<String>,

    /// Contact email (optional).
    email: Option<String>,

    /// Limiter shared with the middleware chain.
    limiter: Arc<RateLimiter>,

    /// Upper bound for one search page.
    max_results: u32,
}

impl PubMedClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let base_url = Url::parse(&format!("{}/", config.eutils_base_url.trim_end_matches('/')))?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
            .build_with_max_retries(config.max_retries);

        let limiter = Arc::new(RateLimiter::new(config.min_request_interval));

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .with(RateLimitMiddleware::new(Arc::clone(&limiter)))
            .build();

        tracing::debug!(
            base_url = %base_url,
            interval_ms = config.min_request_interval.as_millis(),
            max_results = config.max_results,
            "PubMed client ready"
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
            email: config.email,
            limiter,
            max_results: config.max_results,
        })
    }

    /// Check if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Check if a contact email is configured.
    #[must_use]
    pub fn has_email(&self) -> bool {
        self.email.is_some()
    }

    /// Largest page a search may request.
    #[must_use]
    pub const fn max_results(&self) -> u32 {
        self.max_results
    }

    /// The limiter every request passes through.
    #[must_use]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Search PubMed, returning one page of PMIDs in relevance order.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn esearch(
        &self,
        term: &str,
        retstart: u64,
        retmax: u32,
    ) -> ClientResult<ESearchResponse> {
        let params = vec![
            ("db", "pubmed".to_string()),
            ("term", term.to_string()),
            ("retmode", "json".to_string()),
            ("retmax", retmax.to_string()),
            ("retstart", retstart.to_string()),
            ("sort", "relevance".to_string()),
            ("usehistory", "y".to_string()),
        ];

        let response: ESearchResponse = self.get_json(endpoint::ESEARCH, params).await?;
        if let Some(message) = response.error.clone() {
            return Err(ClientError::api(message));
        }
        Ok(response)
    }

    /// Resolve a history-server set (from elink) into PMIDs.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn esearch_history(
        &self,
        webenv: &str,
        query_key: &str,
        retmax: u32,
    ) -> ClientResult<ESearchResponse> {
        let params = vec![
            ("db", "pubmed".to_string()),
            ("term", String::new()),
            ("WebEnv", webenv.to_string()),
            ("query_key", query_key.to_string()),
            ("retmode", "json".to_string()),
            ("retmax", retmax.to_string()),
        ];

        let response: ESearchResponse = self.get_json(endpoint::ESEARCH, params).await?;
        if let Some(message) = response.error.clone() {
            return Err(ClientError::api(message));
        }
        Ok(response)
    }

    /// Fetch document summaries for a batch of PMIDs.
    ///
    /// Callers keep batches at or below [`api::SUMMARY_BATCH_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn esummary(&self, pmids: &[String]) -> ClientResult<ESummaryResponse> {
        let params = vec![
            ("db", "pubmed".to_string()),
            ("id", pmids.join(",")),
            ("retmode", "json".to_string()),
        ];

        let response: ESummaryResponse = self.get_json(endpoint::ESUMMARY, params).await?;
        if let Some(message) = response.error.clone() {
            return Err(ClientError::api(message));
        }
        Ok(response)
    }

    /// Related articles ranked by PubMed's neighbour score.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn elink_similar(&self, pmid: u64, retmax: u32) -> ClientResult<ELinkResponse> {
        let params = vec![
            ("dbfrom", "pubmed".to_string()),
            ("db", "pubmed".to_string()),
            ("cmd", "neighbor_score".to_string()),
            ("id", pmid.to_string()),
            ("linkname", "pubmed_pubmed".to_string()),
            ("retmode", "json".to_string()),
            ("retmax", retmax.to_string()),
        ];

        self.get_elink(params).await
    }

    /// Store a link set on the history server and return its handle.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn elink_history(&self, pmid: u64, linkname: &str) -> ClientResult<ELinkResponse> {
        let params = vec![
            ("dbfrom", "pubmed".to_string()),
            ("db", "pubmed".to_string()),
            ("cmd", "neighbor_history".to_string()),
            ("id", pmid.to_string()),
            ("linkname", linkname.to_string()),
            ("retmode", "json".to_string()),
        ];

        self.get_elink(params).await
    }

    /// LinkOut URLs for an article (used to detect a PMC copy).
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn elink_llinks(&self, pmid: u64) -> ClientResult<ELinkResponse> {
        let params = vec![
            ("dbfrom", "pubmed".to_string()),
            ("db", "pubmed".to_string()),
            ("cmd", "llinks".to_string()),
            ("id", pmid.to_string()),
            ("retmode", "json".to_string()),
        ];

        self.get_elink(params).await
    }

    /// PubMed XML record with abstract.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn efetch_abstract(&self, pmid: u64) -> ClientResult<String> {
        let params = vec![
            ("db", "pubmed".to_string()),
            ("id", pmid.to_string()),
            ("retmode", "xml".to_string()),
            ("rettype", "abstract".to_string()),
        ];

        self.get_text(endpoint::EFETCH, params).await
    }

    /// Full-text JATS XML from PubMed Central.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn efetch_pmc(&self, pmcid: &str) -> ClientResult<String> {
        let params = vec![
            ("db", "pmc".to_string()),
            ("id", pmcid.to_string()),
            ("retmode", "xml".to_string()),
            ("rettype", "full".to_string()),
        ];

        self.get_text(endpoint::EFETCH, params).await
    }

    async fn get_elink(&self, params: Params) -> ClientResult<ELinkResponse> {
        let response: ELinkResponse = self.get_json(endpoint::ELINK, params).await?;
        if let Some(message) = response.error.clone() {
            return Err(ClientError::api(message));
        }
        Ok(response)
    }

    /// Make a GET request and decode a JSON body.
    async fn get_json<T>(&self, endpoint: &str, params: Params) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.send(endpoint, params).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(ClientError::from)
    }

    /// Make a GET request and return the body as text.
    async fn get_text(&self, endpoint: &str, params: Params) -> ClientResult<String> {
        let response = self.send(endpoint, params).await?;
        Ok(response.text().await?)
    }

    async fn send(&self, endpoint: &str, mut params: Params) -> ClientResult<reqwest::Response> {
        let url = self
            .base_url
            .join(endpoint)
            .map_err(|e| ClientError::bad_request(format!("invalid endpoint {endpoint}: {e}")))?;

        self.attach_identity(&mut params);

        tracing::debug!(endpoint, "E-utilities request");

        let response = self.client.get(url).query(&params).send().await?;
        self.handle_response(response).await
    }

    /// Append the key, email and tool name NCBI uses to identify callers.
    fn attach_identity(&self, params: &mut Params) {
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        if let Some(email) = &self.email {
            params.push(("email", email.clone()));
        }
        params.push(("tool", api::TOOL_NAME.to_string()));
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1);

                Err(ClientError::rate_limited(retry_after))
            }
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::not_found(text))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus {
                    status: status.as_u16(),
                    message: text,
                })
            }
        }
    }
}

impl std::fmt::Debug for PubMedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubMedClient")
            .field("base_url", &self.base_url.as_str())
            .field("has_api_key", &self.has_api_key())
            .field("has_email", &self.has_email())
            .field("interval", &self.limiter.interval())
            .finish()
    }
}
