//! Conversions from external errors into pipeline failures and domain errors.

use indexdesk_domain::IndexDeskError;
use reqwest::Error as HttpError;

use super::{RequestFailure, TransportKind};

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RequestFailure */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for RequestFailure {
    fn from(err: HttpError) -> Self {
        if err.is_builder() {
            return Self::Setup(format!("invalid request: {err}"));
        }

        if err.is_timeout() {
            return Self::Transport {
                kind: TransportKind::Timeout,
                message: "HTTP request timed out".into(),
            };
        }

        #[cfg(not(target_arch = "wasm32"))]
        if err.is_connect() {
            return Self::Transport {
                kind: TransportKind::Connect,
                message: format!("HTTP connection failure: {err}"),
            };
        }

        Self::Transport { kind: TransportKind::Other, message: err.to_string() }
    }
}

/* -------------------------------------------------------------------------- */
/* RequestFailure → IndexDeskError */
/* -------------------------------------------------------------------------- */

impl From<RequestFailure> for IndexDeskError {
    fn from(failure: RequestFailure) -> Self {
        match failure {
            RequestFailure::Setup(message) => Self::InvalidInput(message),
            RequestFailure::Status { status: 401 | 403, .. }
            | RequestFailure::Refresh(_)
            | RequestFailure::RefreshAbandoned { .. } => Self::Auth(failure.to_string()),
            RequestFailure::Transport { .. } | RequestFailure::Status { .. } => {
                Self::Network(failure.to_string())
            }
            RequestFailure::Decode { .. } => Self::Internal(failure.to_string()),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::Client;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::errors::RefreshError;

    #[tokio::test]
    async fn test_http_timeout_maps_to_timeout_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client
            .get(server.uri())
            .timeout(Duration::from_millis(50))
            .send()
            .await
            .unwrap_err();

        let failure = RequestFailure::from(error);
        assert!(matches!(failure, RequestFailure::Transport { kind: TransportKind::Timeout, .. }));
    }

    #[tokio::test]
    async fn test_http_refused_connection_maps_to_connect_transport() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}/")).send().await.unwrap_err();

        let failure = RequestFailure::from(error);
        assert_eq!(failure.code(), Some("CONNECT"));
    }

    #[test]
    fn test_unauthorized_maps_to_auth_error() {
        let mapped = IndexDeskError::from(RequestFailure::Status { status: 401, body: None });
        assert!(matches!(mapped, IndexDeskError::Auth(msg) if msg.contains("401")));
    }

    #[test]
    fn test_refresh_failure_maps_to_auth_error() {
        let mapped = IndexDeskError::from(RequestFailure::from(RefreshError::new("expired")));
        assert_eq!(mapped, IndexDeskError::Auth("expired".into()));
    }

    #[test]
    fn test_server_error_maps_to_network_error() {
        let mapped = IndexDeskError::from(RequestFailure::Status { status: 503, body: None });
        assert!(matches!(mapped, IndexDeskError::Network(_)));
    }
}
