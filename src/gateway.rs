//! Remote order store collaborator.
//!
//! The service commits every change locally first and then mirrors it through an
//! [`OrderGateway`]. [`LocalGateway`] is the pure in-memory setup (nothing to mirror);
//! [`HttpGateway`] speaks to a remote order resource over HTTP with its own timeout
//! and retry policy:
//!
//! - `POST {base}/orders/import`: create (body: the order)
//! - `GET {base}/orders`: list
//! - `PATCH {base}/orders/{id}`: status patch (body: `{"status": ...}`)

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use reqwest::StatusCode;

use crate::error::TransportError;
use crate::types::{Order, OrderId, OrderStatus};

/// Create/list/patch over a remote order resource.
pub trait OrderGateway: Send + Sync {
    /// Store a newly created order remotely.
    fn push_order(&self, order: &Order) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// All remotely stored orders, or `None` when there is no remote store and local
    /// history is authoritative.
    fn fetch_orders(&self) -> impl Future<Output = Result<Option<Vec<Order>>, TransportError>> + Send;

    /// Patch an order's status. `Ok(false)` when the remote does not know the order
    /// or refuses the change.
    fn patch_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<bool, TransportError>> + Send;
}

/// No remote store: every call succeeds immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalGateway;

impl OrderGateway for LocalGateway {
    async fn push_order(&self, _order: &Order) -> Result<(), TransportError> {
        Ok(())
    }

    async fn fetch_orders(&self) -> Result<Option<Vec<Order>>, TransportError> {
        Ok(None)
    }

    async fn patch_status(&self, _order_id: OrderId, _status: OrderStatus) -> Result<bool, TransportError> {
        Ok(true)
    }
}

/// Endpoint and retry policy for [`HttpGateway`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL without trailing slash, e.g. `http://orders.internal/api`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Extra attempts after the first failure.
    pub retries: u32,
    /// Backoff before attempt `n + 1` is `backoff × n`.
    pub backoff: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(5000),
            retries: 2,
            backoff: Duration::from_millis(200),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
pub(crate) struct StatusPatch {
    pub(crate) status: OrderStatus,
}

/// Order resource over HTTP (reqwest).
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpGateway {
    pub fn new(config: RemoteConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn map_send_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.config.timeout)
        } else {
            TransportError::Http(e)
        }
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the retry
    /// budget is spent.
    async fn with_retry<T, F, Fut>(&self, action: &'static str, mut op: F) -> Result<T, TransportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let attempts = self.config.retries + 1;
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    warn!(
                        "remote {} failed attempt={}/{} error={}",
                        action, attempt, attempts, e
                    );
                    tokio::time::sleep(self.config.backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) if e.is_retryable() && attempt > 1 => {
                    return Err(TransportError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn push_once(&self, order: &Order) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.url("/orders/import"))
            .json(order)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        match response.status() {
            s if s.is_success() => Ok(()),
            // Already stored, e.g. an earlier attempt landed but its response was lost.
            StatusCode::CONFLICT => {
                debug!("remote already has order_id={}", order.id());
                Ok(())
            }
            s => Err(TransportError::Status(s.as_u16())),
        }
    }

    async fn fetch_once(&self) -> Result<Vec<Order>, TransportError> {
        let response = self
            .client
            .get(self.url("/orders"))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(response.json::<Vec<Order>>().await?)
    }

    async fn patch_once(&self, order_id: OrderId, status: OrderStatus) -> Result<bool, TransportError> {
        let response = self
            .client
            .patch(self.url(&format!("/orders/{}", order_id)))
            .json(&StatusPatch { status })
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND | StatusCode::CONFLICT => Ok(false),
            s => Err(TransportError::Status(s.as_u16())),
        }
    }
}

impl OrderGateway for HttpGateway {
    async fn push_order(&self, order: &Order) -> Result<(), TransportError> {
        self.with_retry("push_order", || self.push_once(order)).await
    }

    async fn fetch_orders(&self) -> Result<Option<Vec<Order>>, TransportError> {
        self.with_retry("fetch_orders", || self.fetch_once())
            .await
            .map(Some)
    }

    async fn patch_status(&self, order_id: OrderId, status: OrderStatus) -> Result<bool, TransportError> {
        self.with_retry("patch_status", || self.patch_once(order_id, status))
            .await
    }
}

/// Either gateway, chosen at startup from configuration.
#[derive(Clone, Debug)]
pub enum Gateway {
    Local(LocalGateway),
    Http(HttpGateway),
}

impl Gateway {
    pub fn is_remote(&self) -> bool {
        matches!(self, Gateway::Http(_))
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Gateway::Local(LocalGateway)
    }
}

impl OrderGateway for Gateway {
    async fn push_order(&self, order: &Order) -> Result<(), TransportError> {
        match self {
            Gateway::Local(g) => g.push_order(order).await,
            Gateway::Http(g) => g.push_order(order).await,
        }
    }

    async fn fetch_orders(&self) -> Result<Option<Vec<Order>>, TransportError> {
        match self {
            Gateway::Local(g) => g.fetch_orders().await,
            Gateway::Http(g) => g.fetch_orders().await,
        }
    }

    async fn patch_status(&self, order_id: OrderId, status: OrderStatus) -> Result<bool, TransportError> {
        match self {
            Gateway::Local(g) => g.patch_status(order_id, status).await,
            Gateway::Http(g) => g.patch_status(order_id, status).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn gateway(retries: u32) -> HttpGateway {
        let mut config = RemoteConfig::new("http://127.0.0.1:9/");
        config.retries = retries;
        config.backoff = Duration::from_millis(1);
        HttpGateway::new(config).unwrap()
    }

    #[test]
    fn remote_config_trims_trailing_slash() {
        let config = RemoteConfig::new("http://orders.local/api/");
        assert_eq!(config.base_url, "http://orders.local/api");
        assert_eq!(config.retries, 2);
    }

    #[tokio::test]
    async fn local_gateway_has_no_remote_history() {
        let g = Gateway::default();
        assert!(!g.is_remote());
        assert!(g.fetch_orders().await.unwrap().is_none());
        assert!(g.patch_status(OrderId(1), OrderStatus::Shipped).await.unwrap());
    }

    #[tokio::test]
    async fn retry_stops_after_budget() {
        let g = gateway(2);
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = g
            .with_retry("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TransportError::Status(503)) }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(TransportError::RetriesExhausted { attempts: 3, .. })));
    }

    #[tokio::test]
    async fn retry_does_not_repeat_client_errors() {
        let g = gateway(5);
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = g
            .with_retry("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TransportError::Status(400)) }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(TransportError::Status(400))));
    }

    #[tokio::test]
    async fn retry_returns_first_success() {
        let g = gateway(3);
        let calls = AtomicU32::new(0);
        let result = g
            .with_retry("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(TransportError::Status(502))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 1);
    }
}
