//! Optional local backend behind the Mock adapters.
//!
//! Every call returns `None` on any failure (no client configured, transport
//! error, non-2xx status, undecodable body). Mock adapters then serve their
//! canned default, so network conditions never fail a mock operation.

use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::config::ProviderSettings;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::types::ProviderIdentity;

#[derive(Clone)]
pub struct MockBackend {
    provider: ProviderIdentity,
    http_client: Option<Arc<dyn HttpClient>>,
    base_url: String,
    timeout: Duration,
}

impl MockBackend {
    pub fn new(
        provider: ProviderIdentity,
        http_client: Option<Arc<dyn HttpClient>>,
        settings: &ProviderSettings,
    ) -> Self {
        Self {
            provider,
            http_client,
            base_url: settings.mock_base_url.trim_end_matches('/').to_string(),
            timeout: settings.mock_timeout,
        }
    }

    /// Backend that always answers `None`.
    pub fn offline(provider: ProviderIdentity) -> Self {
        Self::new(provider, None, &ProviderSettings::google_pay())
    }

    /// `{base}/{provider}/{path}`
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            self.provider.slug(),
            path.trim_start_matches('/')
        )
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        self.send(HttpRequest::get(self.url(path))).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Option<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = match HttpRequest::post(self.url(path)).json(body) {
            Ok(request) => request,
            Err(e) => {
                warn!(provider = %self.provider, path, error = %e, "Could not encode mock request");
                return None;
            }
        };
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> Option<T> {
        let client = self.http_client.as_ref()?;
        let url = request.url.clone();

        let response = match client.execute(request.timeout(self.timeout)).await {
            Ok(response) => response,
            Err(e) => {
                debug!(provider = %self.provider, %url, error = %e, "Mock backend unreachable; using canned data");
                return None;
            }
        };

        if !response.is_success() {
            debug!(provider = %self.provider, %url, status = response.status, "Mock backend refused; using canned data");
            return None;
        }

        match response.json() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(provider = %self.provider, %url, error = %e, "Mock backend sent an unexpected body");
                None
            }
        }
    }
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("has_client", &self.http_client.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::http::HttpResponse;
    use bridge_traits::BridgeError;
    use mockall::mock;
    use serde_json::{json, Value};

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> bridge_traits::error::Result<HttpResponse>;
        }
    }

    fn backend(client: MockHttpClient) -> MockBackend {
        let settings = ProviderSettings::samsung_pay()
            .with_mock_base_url("http://127.0.0.1:4000/")
            .with_mock_timeout(Duration::from_millis(250));
        MockBackend::new(ProviderIdentity::SamsungPay, Some(Arc::new(client)), &settings)
    }

    #[test]
    fn test_url_layout() {
        let backend = backend(MockHttpClient::new());
        assert_eq!(
            backend.url("/wallet-info"),
            "http://127.0.0.1:4000/samsung-pay/wallet-info"
        );
    }

    #[tokio::test]
    async fn test_success_is_decoded() {
        let mut client = MockHttpClient::new();
        client
            .expect_execute()
            .withf(|request| {
                request.url.ends_with("/samsung-pay/cards")
                    && request.timeout == Some(Duration::from_millis(250))
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"count":2}"#)));

        let value: Option<Value> = backend(client).get("cards").await;
        assert_eq!(value, Some(json!({ "count": 2 })));
    }

    #[tokio::test]
    async fn test_failures_become_none() {
        let mut client = MockHttpClient::new();
        let mut calls = 0;
        client.expect_execute().times(3).returning(move |_| {
            calls += 1;
            match calls {
                1 => Err(BridgeError::OperationFailed("connection refused".into())),
                2 => Ok(HttpResponse::new(500, "oops")),
                _ => Ok(HttpResponse::new(200, "not json")),
            }
        });

        let backend = backend(client);
        for _ in 0..3 {
            let value: Option<Value> = backend.post("provision", &json!({})).await;
            assert!(value.is_none());
        }
    }

    #[tokio::test]
    async fn test_offline_never_calls_out() {
        let value: Option<Value> = MockBackend::offline(ProviderIdentity::GooglePay)
            .get("wallet-id")
            .await;
        assert!(value.is_none());
    }
}
