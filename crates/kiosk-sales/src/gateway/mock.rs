//! In-memory payment gateway for tests.
//!
//! Scripted: tests set the status the gateway should report per order id,
//! or flip the whole gateway into an unavailable state to exercise the
//! degraded reconciliation path.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::gateway::{
    GatewayError, GatewayNotification, PaymentGateway, PaymentSession, SessionRequest,
};

#[derive(Default)]
struct MockState {
    /// Scripted status per order id.
    statuses: HashMap<String, GatewayNotification>,
    /// Orders for which a session was created.
    sessions: HashSet<String>,
    /// Orders cancelled through the gateway.
    cancelled: HashSet<String>,
    /// When true, every call fails with a network-style error.
    unavailable: bool,
}

/// Scripted in-memory gateway double.
#[derive(Default)]
pub struct MockGateway {
    state: Mutex<MockState>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the status the gateway reports for an order.
    pub fn set_status(&self, order_id: &str, transaction_status: &str, fraud_status: Option<&str>) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.statuses.insert(
            order_id.to_string(),
            GatewayNotification {
                order_id: order_id.to_string(),
                transaction_status: transaction_status.to_string(),
                fraud_status: fraud_status.map(str::to_string),
            },
        );
    }

    /// Makes every gateway call fail (network-style outage).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().expect("mock state poisoned").unavailable = unavailable;
    }

    /// Whether a session was created for this order.
    pub fn has_session(&self, order_id: &str) -> bool {
        self.state
            .lock()
            .expect("mock state poisoned")
            .sessions
            .contains(order_id)
    }

    /// Whether the order was cancelled through the gateway.
    pub fn was_cancelled(&self, order_id: &str) -> bool {
        self.state
            .lock()
            .expect("mock state poisoned")
            .cancelled
            .contains(order_id)
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<PaymentSession, GatewayError> {
        let mut state = self.state.lock().expect("mock state poisoned");
        if state.unavailable {
            return Err(GatewayError::RequestFailed("gateway unavailable".into()));
        }

        state.sessions.insert(request.order_id.clone());
        // A freshly created session reports pending until scripted otherwise.
        state
            .statuses
            .entry(request.order_id.clone())
            .or_insert_with(|| GatewayNotification {
                order_id: request.order_id.clone(),
                transaction_status: "pending".to_string(),
                fraud_status: None,
            });

        Ok(PaymentSession {
            token: format!("mock-token-{}", request.order_id),
            redirect_url: Some(format!("https://mock.gateway.test/pay/{}", request.order_id)),
        })
    }

    async fn fetch_status(&self, order_id: &str) -> Result<GatewayNotification, GatewayError> {
        let state = self.state.lock().expect("mock state poisoned");
        if state.unavailable {
            return Err(GatewayError::RequestFailed("gateway unavailable".into()));
        }

        state
            .statuses
            .get(order_id)
            .cloned()
            .ok_or_else(|| GatewayError::OrderNotFound(order_id.to_string()))
    }

    async fn cancel(&self, order_id: &str) -> Result<(), GatewayError> {
        let mut state = self.state.lock().expect("mock state poisoned");
        if state.unavailable {
            return Err(GatewayError::RequestFailed("gateway unavailable".into()));
        }

        if !state.statuses.contains_key(order_id) {
            return Err(GatewayError::OrderNotFound(order_id.to_string()));
        }

        state.cancelled.insert(order_id.to_string());
        state.statuses.insert(
            order_id.to_string(),
            GatewayNotification {
                order_id: order_id.to_string(),
                transaction_status: "cancel".to_string(),
                fraud_status: None,
            },
        );

        Ok(())
    }
}
