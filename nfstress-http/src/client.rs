//! reqwest-backed remote executor

use async_trait::async_trait;
use nfstress_core::{ExecStatus, FailureReason, RemoteExecutor, RequestPayload};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, trace};

use crate::config::HttpExecutorConfig;
use crate::errors::HttpError;
use crate::types::{header_map, to_reqwest_method};

/// Issues requests directly from this host
///
/// One client (and connection pool) is shared by every job of a run.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    pub fn new(config: HttpExecutorConfig) -> Result<Self, HttpError> {
        debug!(
            "Creating HttpExecutor (http2_prior_knowledge={})",
            config.http2_prior_knowledge
        );

        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .redirect(reqwest::redirect::Policy::none());
        if config.http2_prior_knowledge {
            builder = builder.http2_prior_knowledge();
        }

        let client = builder.build().map_err(HttpError::ClientBuild)?;
        Ok(Self { client })
    }

    async fn send(&self, payload: &RequestPayload, timeout: Duration) -> ExecStatus {
        let headers = match header_map(&payload.headers) {
            Ok(headers) => headers,
            Err(e) => return ExecStatus::Failed(FailureReason::Connection(e.to_string())),
        };

        let mut request = self
            .client
            .request(to_reqwest_method(payload.method), &payload.url)
            .headers(headers)
            .timeout(timeout);
        if let Some(body) = &payload.body {
            request = request.body(body.clone());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return failure_from(e),
        };

        let status = response.status().as_u16();
        // Drain the body so the connection can go back to the pool
        if let Err(e) = response.bytes().await {
            if e.is_timeout() {
                return ExecStatus::Failed(FailureReason::Timeout);
            }
            trace!("Discarding unreadable response body: {}", e);
        }

        ExecStatus::Responded(status)
    }
}

fn failure_from(error: reqwest::Error) -> ExecStatus {
    if error.is_timeout() {
        ExecStatus::Failed(FailureReason::Timeout)
    } else {
        ExecStatus::Failed(FailureReason::Connection(error.to_string()))
    }
}

#[async_trait]
impl RemoteExecutor for HttpExecutor {
    async fn execute(
        &self,
        context: &str,
        payload: &RequestPayload,
        timeout: Duration,
    ) -> ExecStatus {
        trace!(
            context,
            method = %payload.method,
            url = %payload.url,
            "Sending request"
        );
        let status = self.send(payload, timeout).await;
        debug!(context, url = %payload.url, status = %status.code_label(), "Request finished");
        status
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfstress_core::HttpMethod;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn executor() -> HttpExecutor {
        HttpExecutor::new(HttpExecutorConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_created_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(
                "/nudm-ueau/v1/imsi-208950000000045/security-information/generate-auth-data",
            ))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"servingNetworkName": "5G:mnc095.mcc208.3gppnetwork.org"})))
            .respond_with(ResponseTemplate::new(201).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let payload = RequestPayload::new(
            HttpMethod::Post,
            format!(
                "{}/nudm-ueau/v1/imsi-208950000000045/security-information/generate-auth-data",
                mock_server.uri()
            ),
        )
        .with_json(json!({"servingNetworkName": "5G:mnc095.mcc208.3gppnetwork.org"}));

        let status = executor()
            .execute("oai-ausf", &payload, Duration::from_secs(5))
            .await;
        assert_eq!(status, ExecStatus::Responded(201));
    }

    #[tokio::test]
    async fn test_error_status_is_reported_verbatim() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/nnrf-disc/v1/nf-instances"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let payload = RequestPayload::new(
            HttpMethod::Get,
            format!(
                "{}/nnrf-disc/v1/nf-instances?target-nf-type=UDM&requester-nf-type=AMF",
                mock_server.uri()
            ),
        );

        let status = executor()
            .execute("oai-amf", &payload, Duration::from_secs(5))
            .await;
        assert_eq!(status, ExecStatus::Responded(404));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let payload = RequestPayload::new(
            HttpMethod::Put,
            format!("{}/nnrf-nfm/v1/nf-instances/abc", mock_server.uri()),
        );

        let status = executor()
            .execute("oai-smf", &payload, Duration::from_millis(200))
            .await;
        assert_eq!(status, ExecStatus::Failed(FailureReason::Timeout));
    }

    #[tokio::test]
    async fn test_refused_connection_is_connection_failure() {
        // Bind then drop to get a port nothing listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let payload = RequestPayload::new(
            HttpMethod::Get,
            format!("http://127.0.0.1:{}/nudr-dr/v1/subscription-data", port),
        );

        let status = executor()
            .execute("oai-udm", &payload, Duration::from_secs(2))
            .await;
        assert!(matches!(
            status,
            ExecStatus::Failed(FailureReason::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_header_fails_without_sending() {
        let mut payload = RequestPayload::new(HttpMethod::Get, "http://127.0.0.1:1/");
        payload
            .headers
            .insert("Bad Header".to_string(), "x".to_string());

        let status = executor()
            .execute("oai-udm", &payload, Duration::from_secs(1))
            .await;
        assert!(matches!(
            status,
            ExecStatus::Failed(FailureReason::Connection(_))
        ));
    }
}
