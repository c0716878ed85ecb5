//! Resilient HTTP fetching with status-aware retry and backoff

use super::retry::{AttemptOutcome, RetryDecision, RetryPolicy};
use crate::error::AppError;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Source of the waits between attempts and between organizations.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Performs GET requests under a [`RetryPolicy`].
///
/// Holds no state between calls apart from the client's connection pool.
#[derive(Debug, Clone)]
pub struct ResilientFetcher<S = TokioSleeper> {
    client: Client,
    policy: RetryPolicy,
    sleeper: S,
}

impl ResilientFetcher<TokioSleeper> {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self::with_sleeper(client, policy, TokioSleeper)
    }
}

impl<S: Sleeper> ResilientFetcher<S> {
    pub fn with_sleeper(client: Client, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            client,
            policy,
            sleeper,
        }
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Fetches `url` and returns the response body.
    ///
    /// * `Ok(Some(body))` - the server answered 200
    /// * `Ok(None)` - 404, a non-retryable transport failure, or the retry budget ran out.
    ///   Reading the body of a 200 counts towards the attempt, so a body that
    ///   times out is retried like a request that timed out
    /// * `Err(_)` - a status code outside the retry policy (e.g. 400, 403)
    ///
    /// `context` names the request in log lines (usually the organization).
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str, context: &str) -> Result<Option<String>, AppError> {
        let max_attempts = self.policy.max_attempts();

        for attempt in 1..=max_attempts {
            debug!("GET {url} (attempt {attempt}/{max_attempts})");
            let (outcome, failure) = match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    let outcome = AttemptOutcome::Status(status.as_u16());
                    if self.policy.decide(outcome, attempt) == RetryDecision::Succeed {
                        // The body is part of the attempt: a stalled or cut
                        // body is classified like a failed request
                        match response.text().await {
                            Ok(body) => {
                                debug!("Response length: {} bytes", body.len());
                                return Ok(Some(body));
                            }
                            Err(e) => (AttemptOutcome::from_error(&e), request_error(e, url)),
                        }
                    } else {
                        (outcome, status_error(status, url))
                    }
                }
                Err(e) => (AttemptOutcome::from_error(&e), request_error(e, url)),
            };

            match self.policy.decide(outcome, attempt) {
                RetryDecision::RetryAfter(wait) => {
                    warn!(
                        "{context}: {failure}. Retrying in {}s (attempt {attempt}/{max_attempts})",
                        wait.as_secs()
                    );
                    self.sleeper.sleep(wait).await;
                }
                RetryDecision::Fail => {
                    error!("{context}: {failure}");
                    return Err(failure);
                }
                RetryDecision::GiveUp | RetryDecision::Succeed => {
                    error!("{context}: {failure} (giving up after attempt {attempt}/{max_attempts})");
                    return Ok(None);
                }
            }
        }

        Ok(None)
    }
}

fn status_error(status: StatusCode, url: &str) -> AppError {
    let code = status.as_u16();
    let reason = status.canonical_reason().unwrap_or("Unknown error");
    match code {
        404 => AppError::api_not_found(url),
        429 => AppError::api_rate_limit(reason, url),
        503 => AppError::api_service_unavailable(code, reason, url),
        500..=599 => AppError::api_server_error(code, reason, url),
        _ => AppError::api_client_error(code, reason, url),
    }
}

fn request_error(error: reqwest::Error, url: &str) -> AppError {
    if error.is_timeout() {
        AppError::network_timeout(url)
    } else if error.is_connect() {
        AppError::network_connection(url, error.to_string())
    } else {
        AppError::ApiFetch(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::api::http_client::{
        create_http_client_with_timeout, create_test_http_client,
    };
    use crate::testing_utils::RecordingSleeper;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn fetcher(max_attempts: u32) -> (ResilientFetcher<RecordingSleeper>, RecordingSleeper) {
        let sleeper = RecordingSleeper::new();
        let fetcher = ResilientFetcher::with_sleeper(
            create_test_http_client(),
            RetryPolicy::new(max_attempts, secs(10)),
            sleeper.clone(),
        );
        (fetcher, sleeper)
    }

    async fn request_count(server: &MockServer) -> usize {
        server.received_requests().await.unwrap().len()
    }

    #[tokio::test]
    async fn test_rate_limited_twice_then_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/matches.json"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/matches.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let (fetcher, sleeper) = fetcher(3);
        let url = format!("{}/matches.json", server.uri());
        let body = fetcher.fetch(&url, "LeagueA").await.unwrap();

        assert_eq!(body.as_deref(), Some("[]"));
        assert_eq!(sleeper.recorded(), vec![secs(10), secs(20)]);
        assert_eq!(request_count(&server).await, 3);
    }

    #[tokio::test]
    async fn test_not_found_returns_none_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (fetcher, sleeper) = fetcher(3);
        let body = fetcher
            .fetch(&format!("{}/matches.json", server.uri()), "LeagueA")
            .await
            .unwrap();

        assert!(body.is_none());
        assert!(sleeper.recorded().is_empty());
        assert_eq!(request_count(&server).await, 1);
    }

    #[tokio::test]
    async fn test_service_unavailable_exhausts_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let (fetcher, sleeper) = fetcher(3);
        let body = fetcher
            .fetch(&format!("{}/matches.json", server.uri()), "LeagueA")
            .await
            .unwrap();

        assert!(body.is_none());
        assert_eq!(sleeper.recorded(), vec![secs(10), secs(20)]);
        assert_eq!(request_count(&server).await, 3);
    }

    #[tokio::test]
    async fn test_server_error_then_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"id": 1}]"#))
            .mount(&server)
            .await;

        let (fetcher, sleeper) = fetcher(3);
        let body = fetcher
            .fetch(&format!("{}/matches.json", server.uri()), "LeagueA")
            .await
            .unwrap();

        assert_eq!(body.as_deref(), Some(r#"[{"id": 1}]"#));
        assert_eq!(sleeper.recorded(), vec![secs(10)]);
    }

    #[tokio::test]
    async fn test_unexpected_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let (fetcher, sleeper) = fetcher(3);
        let result = fetcher
            .fetch(&format!("{}/matches.json", server.uri()), "LeagueA")
            .await;

        match result {
            Err(AppError::ApiClientError { status, .. }) => assert_eq!(status, 400),
            other => panic!("Expected client error, got {other:?}"),
        }
        assert!(sleeper.recorded().is_empty());
        assert_eq!(request_count(&server).await, 1);
    }

    #[tokio::test]
    async fn test_single_attempt_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let (fetcher, sleeper) = fetcher(1);
        let body = fetcher
            .fetch(&format!("{}/matches.json", server.uri()), "LeagueA")
            .await
            .unwrap();

        assert!(body.is_none());
        assert!(sleeper.recorded().is_empty());
        assert_eq!(request_count(&server).await, 1);
    }

    #[tokio::test]
    async fn test_timeout_retries_with_fixed_delay() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("[]")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::new();
        let fetcher = ResilientFetcher::with_sleeper(
            create_http_client_with_timeout(Duration::from_millis(100)).unwrap(),
            RetryPolicy::new(2, secs(10)),
            sleeper.clone(),
        );
        let body = fetcher
            .fetch(&format!("{}/matches.json", server.uri()), "LeagueA")
            .await
            .unwrap();

        assert!(body.is_none());
        assert_eq!(sleeper.recorded(), vec![secs(10)]);
    }

    #[tokio::test]
    async fn test_stalled_body_is_retried_as_timeout() {
        // First connection sends the headers of a 200 and then stalls the body
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/matches.json", listener.local_addr().unwrap());
        tokio::spawn(async move {
            for connection in 0u32.. {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(async move {
                    let mut request = [0u8; 4096];
                    let _ = socket.read(&mut request).await;
                    if connection == 0 {
                        let _ = socket
                            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\n")
                            .await;
                        tokio::time::sleep(Duration::from_secs(3)).await;
                    } else {
                        let _ = socket
                            .write_all(
                                b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n[]",
                            )
                            .await;
                    }
                });
            }
        });

        let sleeper = RecordingSleeper::new();
        let fetcher = ResilientFetcher::with_sleeper(
            create_http_client_with_timeout(Duration::from_millis(300)).unwrap(),
            RetryPolicy::new(3, secs(10)),
            sleeper.clone(),
        );
        let body = fetcher.fetch(&url, "LeagueA").await.unwrap();

        assert_eq!(body.as_deref(), Some("[]"));
        assert_eq!(sleeper.recorded(), vec![secs(10)]);
    }

    #[tokio::test]
    async fn test_connection_refused_retries_with_fixed_delay() {
        // Bind and release a port so nothing is listening on it
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/matches.json", listener.local_addr().unwrap());
        drop(listener);

        let (fetcher, sleeper) = fetcher(3);
        let body = fetcher.fetch(&url, "LeagueA").await.unwrap();

        assert!(body.is_none());
        assert_eq!(sleeper.recorded(), vec![secs(10), secs(10)]);
    }

    #[test]
    fn test_status_error_mapping() {
        let url = "https://api.example.com";
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, url),
            AppError::ApiNotFound { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, url),
            AppError::ApiRateLimit { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, url),
            AppError::ApiServiceUnavailable { status: 503, .. }
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, url),
            AppError::ApiServerError { status: 500, .. }
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, url),
            AppError::ApiClientError { status: 403, .. }
        ));
    }
}
