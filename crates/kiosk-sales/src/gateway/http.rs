//! HTTP payment gateway client.
//!
//! Talks to a Snap-style REST API: a session endpoint returning a token +
//! redirect URL, a status endpoint keyed by order id, and a cancel
//! endpoint. Authentication is HTTP basic with the server key as username.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::gateway::{
    GatewayError, GatewayNotification, PaymentGateway, PaymentSession, SessionRequest,
};

/// Payment gateway client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    config: GatewayConfig,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    token: String,
    redirect_url: Option<String>,
}

impl HttpGateway {
    /// Creates a new client from configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        Ok(HttpGateway { client, config })
    }

    /// Creates a client with configuration loaded from the environment.
    pub fn from_env() -> Result<Self, GatewayError> {
        let config = GatewayConfig::from_env()
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;
        Self::new(config)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl PaymentGateway for HttpGateway {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<PaymentSession, GatewayError> {
        debug!(order_id = %request.order_id, "Creating gateway payment session");

        let body = json!({
            "transaction_details": {
                "order_id": request.order_id,
                "gross_amount": request.gross_amount,
            },
            "item_details": request.items,
            "customer_details": request.customer,
        });

        let response = self
            .client
            .post(self.url("/snap/v1/transactions"))
            .basic_auth(&self.config.server_key, Some(""))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let session: SessionResponse = response
                    .json()
                    .await
                    .map_err(|e| GatewayError::ResponseParseFailed(e.to_string()))?;
                Ok(PaymentSession {
                    token: session.token,
                    redirect_url: session.redirect_url,
                })
            }
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(GatewayError::ApiError {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn fetch_status(&self, order_id: &str) -> Result<GatewayNotification, GatewayError> {
        debug!(order_id, "Polling gateway status");

        let response = self
            .client
            .get(self.url(&format!("/v2/{order_id}/status")))
            .basic_auth(&self.config.server_key, Some(""))
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        match response.status() {
            StatusCode::OK => response
                .json::<GatewayNotification>()
                .await
                .map_err(|e| GatewayError::ResponseParseFailed(e.to_string())),
            StatusCode::NOT_FOUND => Err(GatewayError::OrderNotFound(order_id.to_string())),
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(GatewayError::ApiError {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn cancel(&self, order_id: &str) -> Result<(), GatewayError> {
        debug!(order_id, "Cancelling order on gateway");

        let response = self
            .client
            .post(self.url(&format!("/v2/{order_id}/cancel")))
            .basic_auth(&self.config.server_key, Some(""))
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => Err(GatewayError::OrderNotFound(order_id.to_string())),
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(GatewayError::ApiError {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}
