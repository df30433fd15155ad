//! Async HTTP fetch client wrapping reqwest.
//!
//! One GET per call with a rotated browser identity and a bounded timeout.
//! There is no retry here; every transport problem comes back as a
//! `FetchFailure` and the caller decides what to do with it.

use std::time::Duration;

use rand::seq::SliceRandom;

/// Identity strings rotated across requests.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:130.0) Gecko/20100101 Firefox/130.0",
];

const ACCEPT_LANGUAGE: &str = "en-IN,en;q=0.9";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Why a single request failed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailureReason {
    #[error("timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("unreadable body: {0}")]
    Body(String),
}

/// A failed request, tagged with the URL it was for.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("fetch {url} failed: {reason}")]
pub struct FetchFailure {
    pub url: String,
    pub reason: FetchFailureReason,
}

impl FetchFailure {
    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            FetchFailureReason::Timeout
        } else if let Some(status) = err.status() {
            FetchFailureReason::Status(status.as_u16())
        } else {
            FetchFailureReason::Network(err.to_string())
        };
        Self {
            url: url.to_string(),
            reason,
        }
    }
}

/// HTTP client for one source. Each collector owns its own instance, so
/// identity rotation is never shared between sources.
#[derive(Clone)]
pub struct FetchClient {
    client: reqwest::Client,
    user_agents: Vec<String>,
    timeout: Duration,
}

impl FetchClient {
    /// Create a client with the default identity pool.
    pub fn new(timeout: Duration) -> Self {
        Self::with_user_agents(
            timeout,
            DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Create a client rotating through `user_agents`.
    pub fn with_user_agents(timeout: Duration, user_agents: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .unwrap_or_default();

        Self {
            client,
            user_agents,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Pick an identity for the next request.
    pub fn pick_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENTS[0])
    }

    /// GET `url` with optional query parameters and return the body text.
    ///
    /// Non-2xx statuses, timeouts, and connection errors are all failures.
    pub async fn fetch(&self, url: &str, query: &[(&str, &str)]) -> Result<String, FetchFailure> {
        let user_agent = self.pick_user_agent().to_string();

        let mut builder = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(reqwest::header::USER_AGENT, user_agent)
            .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .header(reqwest::header::ACCEPT, ACCEPT);
        if !query.is_empty() {
            builder = builder.query(query);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| FetchFailure::from_reqwest(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchFailure {
                url: url.to_string(),
                reason: FetchFailureReason::Status(status.as_u16()),
            });
        }

        resp.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchFailure {
                    url: url.to_string(),
                    reason: FetchFailureReason::Timeout,
                }
            } else {
                FetchFailure {
                    url: url.to_string(),
                    reason: FetchFailureReason::Body(e.to_string()),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_pick_user_agent_from_pool() {
        let client = FetchClient::new(Duration::from_secs(5));
        for _ in 0..20 {
            assert!(DEFAULT_USER_AGENTS.contains(&client.pick_user_agent()));
        }
    }

    #[test]
    fn test_empty_pool_falls_back() {
        let client = FetchClient::with_user_agents(Duration::from_secs(5), Vec::new());
        assert_eq!(client.pick_user_agent(), DEFAULT_USER_AGENTS[0]);
    }

    #[tokio::test]
    async fn test_fetch_sends_query_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s"))
            .and(query_param("k", "Samsung Galaxy S24"))
            .and(header_exists("accept-language"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = FetchClient::new(Duration::from_secs(5));
        let body = client
            .fetch(&format!("{}/s", server.uri()), &[("k", "Samsung Galaxy S24")])
            .await
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_non_success_status_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = FetchClient::new(Duration::from_secs(5));
        let url = format!("{}/search", server.uri());
        let err = client.fetch(&url, &[]).await.unwrap_err();
        assert_eq!(err.reason, FetchFailureReason::Status(503));
        assert_eq!(err.url, url);
    }

    #[tokio::test]
    async fn test_timeout_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = FetchClient::new(Duration::from_millis(50));
        let err = client.fetch(&server.uri(), &[]).await.unwrap_err();
        assert_eq!(err.reason, FetchFailureReason::Timeout);
    }

    #[tokio::test]
    async fn test_connection_refused_is_failure() {
        let client = FetchClient::new(Duration::from_secs(2));
        let err = client.fetch("http://127.0.0.1:1/", &[]).await.unwrap_err();
        assert!(matches!(err.reason, FetchFailureReason::Network(_)));
    }
}
