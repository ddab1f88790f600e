use std::sync::{Arc, Once, OnceLock};
use std::time::Duration;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::config::ClientConfig;
use crate::error::ClientError;

static RUSTLS_PROVIDER_INIT: Once = Once::new();
const PARSED_ENDPOINT_CACHE_MAX_ENTRIES: usize = 256;

/// HTTP transport for talking to the chat backend.
///
/// One lazily-built `reqwest::Client` with a shared cookie jar, so the
/// session cookie issued at login rides along on every later call —
/// including the streaming message sends. No request is retried here;
/// resubmission is the caller's decision.
pub struct HttpTransport {
    client: OnceLock<Arc<reqwest::Client>>,
    parsed_url_cache: RwLock<FxHashMap<String, Arc<url::Url>>>,
    pool_max_idle_per_host: usize,
    pool_idle_timeout: Option<Duration>,
    connect_timeout: Duration,
    timeout: Duration,
    use_env_proxy: bool,
}

impl HttpTransport {
    /// Create a new transport with connection pooling and timeouts from the
    /// given client config.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        RUSTLS_PROVIDER_INIT.call_once(|| {
            let _ = rustls::crypto::ring::default_provider().install_default();
        });

        let pool_idle_timeout = if config.http_pool_idle_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(config.http_pool_idle_timeout_secs))
        };

        Self {
            client: OnceLock::new(),
            parsed_url_cache: RwLock::new(FxHashMap::default()),
            pool_max_idle_per_host: config.http_pool_max_idle_per_host.max(1),
            pool_idle_timeout,
            connect_timeout: Duration::from_secs(config.connect_timeout),
            timeout: Duration::from_secs(config.timeout),
            use_env_proxy: config.http_use_env_proxy,
        }
    }

    fn build_client(&self) -> Result<reqwest::Client, ClientError> {
        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .pool_idle_timeout(self.pool_idle_timeout)
            .tcp_nodelay(true)
            .connect_timeout(self.connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .timeout(self.timeout);

        if !self.use_env_proxy {
            builder = builder.no_proxy();
        }

        builder
            .build()
            .map_err(|err| ClientError::Transport(format!("Failed to build HTTP client: {err}")))
    }

    fn client(&self) -> Arc<reqwest::Client> {
        if let Some(existing) = self.client.get() {
            return existing.clone();
        }

        let built = match self.build_client() {
            Ok(client) => Arc::new(client),
            Err(err) => {
                tracing::error!(error = %err, "failed to build configured HTTP client, falling back to default client");
                Arc::new(reqwest::Client::new())
            }
        };
        let _ = self.client.set(built.clone());
        self.client.get().cloned().unwrap_or(built)
    }

    /// Parse an endpoint URL through a bounded cache.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when the URL does not parse.
    pub fn parsed_url(&self, url: &str) -> Result<Arc<url::Url>, ClientError> {
        if let Some(cached) = self.parsed_url_cache.read().get(url) {
            return Ok(cached.clone());
        }

        let parsed = url::Url::parse(url)
            .map_err(|e| ClientError::Transport(format!("Invalid endpoint URL: {e}")))?;

        let mut cache = self.parsed_url_cache.write();
        if let Some(existing) = cache.get(url) {
            return Ok(existing.clone());
        }
        if cache.len() >= PARSED_ENDPOINT_CACHE_MAX_ENTRIES {
            cache.clear();
        }
        let parsed = Arc::new(parsed);
        cache.insert(url.to_string(), parsed.clone());
        Ok(parsed)
    }

    /// Send a request with an optional JSON body.
    ///
    /// Returns the raw response; status handling is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when URL parsing or request
    /// execution fails.
    pub async fn send_json(
        &self,
        method: http::Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let parsed_url = self.parsed_url(url)?;
        let client = self.client();
        let mut request = client.request(method, parsed_url.as_ref().clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        request
            .send()
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))
    }

    /// Send a streaming request; the caller reads the response body as a
    /// byte stream.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when URL parsing or request
    /// execution fails.
    pub async fn send_stream(
        &self,
        method: http::Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ClientError> {
        self.send_json(method, url, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_is_lazy() {
        let transport = HttpTransport::new(&ClientConfig::default());
        assert!(transport.client.get().is_none());
        let _ = transport.client();
        assert!(transport.client.get().is_some());
    }

    #[test]
    fn test_parsed_url_cache_hit() {
        let transport = HttpTransport::new(&ClientConfig::default());
        let url = "http://localhost:4000/chats";

        let first = transport.parsed_url(url).unwrap();
        let second = transport.parsed_url(url).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(transport.parsed_url_cache.read().len(), 1);
    }

    #[test]
    fn test_parsed_url_cache_is_bounded() {
        let transport = HttpTransport::new(&ClientConfig::default());

        for idx in 0..(PARSED_ENDPOINT_CACHE_MAX_ENTRIES + 32) {
            let url = format!("http://localhost:4000/chats/{idx}/messages");
            let _ = transport.parsed_url(&url).unwrap();
        }

        assert!(transport.parsed_url_cache.read().len() <= PARSED_ENDPOINT_CACHE_MAX_ENTRIES);
    }

    #[test]
    fn test_parsed_url_invalid() {
        let transport = HttpTransport::new(&ClientConfig::default());
        let err = transport.parsed_url("://bad-url").unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[test]
    fn test_zero_idle_timeout_means_forever() {
        let mut config = ClientConfig::default();
        config.http_pool_idle_timeout_secs = 0;
        let transport = HttpTransport::new(&config);
        assert!(transport.pool_idle_timeout.is_none());
    }
}
