use crate::core::error::{AttemptError, RetrievalError, RetrievalOutcome};
use crate::core::validate::{Shape, validate};
use anyhow::Result;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Fetches a JSON payload from a primary mirror, falling back to a second mirror once.
///
/// A mirror attempt fails when the request errors or times out, the status is not 2xx,
/// the body is not JSON, or the payload does not match the expected [`Shape`].
/// The fallback is only contacted after the primary attempt has failed.
#[derive(Clone)]
pub struct FailoverFetcher {
    client: reqwest::Client,
}

impl FailoverFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxconv/0.1")
            .timeout(timeout)
            .build()?;
        Ok(FailoverFetcher { client })
    }

    #[instrument(name = "FailoverFetch", skip(self, shape))]
    pub async fn fetch(
        &self,
        primary_url: &str,
        fallback_url: &str,
        shape: &Shape,
    ) -> RetrievalOutcome<Value> {
        let primary = match self.attempt(primary_url, shape).await {
            Ok(payload) => return Ok(payload),
            Err(e) => e,
        };
        warn!(error = %primary, "Primary source failed, trying fallback");

        match self.attempt(fallback_url, shape).await {
            Ok(payload) => Ok(payload),
            Err(fallback) => {
                error!(%primary, %fallback, "Both sources failed");
                Err(RetrievalError::BothSourcesUnavailable { primary, fallback })
            }
        }
    }

    async fn attempt(&self, url: &str, shape: &Shape) -> Result<Value, AttemptError> {
        debug!("Requesting {}", url);
        let transport = |e: reqwest::Error| AttemptError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(AttemptError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let text = response.text().await.map_err(transport)?;
        let payload: Value = serde_json::from_str(&text).map_err(|e| AttemptError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        validate(&payload, shape).map_err(|source| AttemptError::Shape {
            url: url.to_string(),
            source,
        })?;

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ShapeError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, response: ResponseTemplate, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/v1/currencies.json"))
            .respond_with(response)
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    fn url(server: &MockServer) -> String {
        format!("{}/v1/currencies.json", server.uri())
    }

    fn fetcher() -> FailoverFetcher {
        FailoverFetcher::new(Duration::from_millis(500)).unwrap()
    }

    #[tokio::test]
    async fn test_valid_primary_skips_fallback() {
        let primary = MockServer::start().await;
        let fallback = MockServer::start().await;
        mount(
            &primary,
            ResponseTemplate::new(200).set_body_string(r#"{"eur": "Euro"}"#),
            1,
        )
        .await;
        mount(&fallback, ResponseTemplate::new(200), 0).await;

        let payload = fetcher()
            .fetch(&url(&primary), &url(&fallback), &Shape::NonEmptyObject)
            .await
            .unwrap();
        assert_eq!(payload["eur"], "Euro");
    }

    #[tokio::test]
    async fn test_server_error_falls_back_once() {
        let primary = MockServer::start().await;
        let fallback = MockServer::start().await;
        mount(&primary, ResponseTemplate::new(500), 1).await;
        mount(
            &fallback,
            ResponseTemplate::new(200).set_body_string(r#"{"usd": "US Dollar"}"#),
            1,
        )
        .await;

        let payload = fetcher()
            .fetch(&url(&primary), &url(&fallback), &Shape::NonEmptyObject)
            .await
            .unwrap();
        assert_eq!(payload["usd"], "US Dollar");
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let primary = MockServer::start().await;
        let fallback = MockServer::start().await;
        mount(
            &primary,
            ResponseTemplate::new(200)
                .set_body_string(r#"{"eur": "Euro"}"#)
                .set_delay(Duration::from_secs(3)),
            1,
        )
        .await;
        mount(
            &fallback,
            ResponseTemplate::new(200).set_body_string(r#"{"gbp": "Pound"}"#),
            1,
        )
        .await;

        let payload = fetcher()
            .fetch(&url(&primary), &url(&fallback), &Shape::NonEmptyObject)
            .await
            .unwrap();
        assert_eq!(payload["gbp"], "Pound");
    }

    #[tokio::test]
    async fn test_both_sources_failing() {
        let primary = MockServer::start().await;
        let fallback = MockServer::start().await;
        mount(
            &primary,
            ResponseTemplate::new(200).set_body_string("not json"),
            1,
        )
        .await;
        mount(&fallback, ResponseTemplate::new(200).set_body_string("{}"), 1).await;

        let err = fetcher()
            .fetch(&url(&primary), &url(&fallback), &Shape::NonEmptyObject)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "both sources unavailable");
        match err {
            RetrievalError::BothSourcesUnavailable { primary, fallback } => {
                assert!(matches!(primary, AttemptError::Decode { .. }));
                assert!(matches!(
                    fallback,
                    AttemptError::Shape {
                        source: ShapeError::EmptyMapping,
                        ..
                    }
                ));
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_primary() {
        let fallback = MockServer::start().await;
        mount(
            &fallback,
            ResponseTemplate::new(200).set_body_string(r#"{"eur": "Euro"}"#),
            1,
        )
        .await;

        let payload = fetcher()
            .fetch(
                "http://127.0.0.1:1/v1/currencies.json",
                &url(&fallback),
                &Shape::NonEmptyObject,
            )
            .await
            .unwrap();
        assert_eq!(payload["eur"], "Euro");
    }
}
