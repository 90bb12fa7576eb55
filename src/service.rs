//! Shared order service: one [`OrderManager`] behind a lock, mirrored to a gateway.
//!
//! Writers take the lock exclusively, readers share it, and no lock is held across
//! an `.await`. Each mutation is committed locally in one critical section before
//! the gateway is called, so dropping a suspended call (or a remote failure) never
//! leaves the cart or history half-changed. Remote failures are logged and absorbed.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{info, warn};

use crate::audit::{AuditAction, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink};
use crate::cart::CartSnapshot;
use crate::error::OrderError;
use crate::gateway::{LocalGateway, OrderGateway};
use crate::history::OrderStats;
use crate::manager::OrderManager;
use crate::types::{CustomerDetails, Order, OrderId, OrderStatus, Product, ProductId};

/// Cloneable handle to one session's cart and order history.
pub struct OrderService<G = LocalGateway> {
    state: Arc<RwLock<OrderManager>>,
    gateway: Arc<G>,
    audit: Arc<dyn AuditSink>,
}

impl<G> Clone for OrderService<G> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            gateway: Arc::clone(&self.gateway),
            audit: Arc::clone(&self.audit),
        }
    }
}

impl OrderService<LocalGateway> {
    /// In-memory service with strict transitions and an in-memory audit trail.
    pub fn in_memory() -> Self {
        Self::new(OrderManager::new(), LocalGateway, Arc::new(InMemoryAuditSink::new()))
    }
}

impl<G: OrderGateway> OrderService<G> {
    pub fn new(manager: OrderManager, gateway: G, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            state: Arc::new(RwLock::new(manager)),
            gateway: Arc::new(gateway),
            audit,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn read(&self) -> RwLockReadGuard<'_, OrderManager> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, OrderManager> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(
        &self,
        action: AuditAction,
        order_id: Option<OrderId>,
        detail: serde_json::Value,
        outcome: AuditOutcome,
    ) {
        self.audit
            .emit(&AuditEvent::now(action, order_id, Some(detail), outcome));
    }

    /// Runs `f` against a consistent view of cart and history.
    pub fn view<R>(&self, f: impl FnOnce(&OrderManager) -> R) -> R {
        f(&self.read())
    }

    pub fn add_to_cart(&self, product: &Product, quantity: u32) {
        self.write().add_to_cart(product, quantity);
    }

    pub fn remove_from_cart(&self, product_id: ProductId) -> bool {
        self.write().remove_from_cart(product_id)
    }

    pub fn update_quantity(&self, product_id: ProductId, quantity: i64) -> bool {
        self.write().update_quantity(product_id, quantity)
    }

    pub fn clear_cart(&self) {
        let dropped = {
            let mut manager = self.write();
            let lines = manager.cart().len();
            manager.clear_cart();
            lines
        };
        self.record(
            AuditAction::CartCleared,
            None,
            serde_json::json!({ "lines": dropped }),
            AuditOutcome::Success,
        );
    }

    pub fn cart(&self) -> CartSnapshot {
        self.read().cart_snapshot()
    }

    /// Places the cart as an order, then mirrors it to the gateway.
    ///
    /// The local order stands even if the mirror fails.
    pub async fn create_order(&self, customer: CustomerDetails) -> Result<Order, OrderError> {
        let created = {
            let mut manager = self.write();
            manager.create_order(customer)
        };
        let order = match created {
            Ok(order) => order,
            Err(e) => {
                warn!("order rejected error={}", e);
                self.record(
                    AuditAction::OrderCreated,
                    None,
                    serde_json::json!({ "reason": e.to_string() }),
                    AuditOutcome::Rejected,
                );
                return Err(e);
            }
        };
        self.record(
            AuditAction::OrderCreated,
            Some(order.id()),
            serde_json::json!({
                "lines": order.items().len(),
                "total": order.total_amount().to_string(),
            }),
            AuditOutcome::Success,
        );
        if let Err(e) = self.gateway.push_order(&order).await {
            warn!("remote create failed order_id={} error={}", order.id(), e);
        }
        Ok(order)
    }

    /// Moves an order to `status` locally, then mirrors the change.
    /// Returns the previous status.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<OrderStatus, OrderError> {
        let changed = {
            let mut manager = self.write();
            manager.update_status(order_id, status)
        };
        let action = if status == OrderStatus::Cancelled {
            AuditAction::OrderCancelled
        } else {
            AuditAction::OrderStatusChanged
        };
        let from = match changed {
            Ok(from) => from,
            Err(e) => {
                warn!("status change rejected order_id={} error={}", order_id, e);
                self.record(
                    action,
                    Some(order_id),
                    serde_json::json!({ "to": status, "reason": e.to_string() }),
                    AuditOutcome::Rejected,
                );
                return Err(e);
            }
        };
        self.record(
            action,
            Some(order_id),
            serde_json::json!({ "from": from, "to": status }),
            AuditOutcome::Success,
        );
        match self.gateway.patch_status(order_id, status).await {
            Ok(true) => {}
            Ok(false) => warn!("remote refused status order_id={} status={}", order_id, status),
            Err(e) => warn!("remote status patch failed order_id={} error={}", order_id, e),
        }
        Ok(from)
    }

    pub async fn cancel_order(&self, order_id: OrderId) -> Result<OrderStatus, OrderError> {
        self.update_status(order_id, OrderStatus::Cancelled).await
    }

    /// Records an order created elsewhere. Not mirrored.
    pub fn import_order(&self, order: Order) -> Result<(), OrderError> {
        let id = order.id();
        let lines = order.items().len();
        let imported = self.write().import_order(order);
        let outcome = match &imported {
            Ok(()) => AuditOutcome::Success,
            Err(_) => AuditOutcome::Rejected,
        };
        self.record(
            AuditAction::OrderImported,
            Some(id),
            serde_json::json!({ "lines": lines }),
            outcome,
        );
        imported
    }

    pub fn order(&self, order_id: OrderId) -> Option<Order> {
        self.read().order(order_id).cloned()
    }

    /// Every order, newest first.
    pub fn order_history(&self) -> Vec<Order> {
        self.read().order_history()
    }

    pub fn recent_orders(&self, n: usize) -> Vec<Order> {
        self.read().recent_orders(n)
    }

    pub fn stats(&self) -> OrderStats {
        self.read().stats()
    }

    /// Order history as the gateway's store sees it, newest first.
    ///
    /// Local history when there is no remote store; empty when the remote cannot
    /// be reached.
    pub async fn store_history(&self) -> Vec<Order> {
        match self.gateway.fetch_orders().await {
            Ok(Some(mut orders)) => {
                orders.sort_by(|a, b| (b.created_at(), b.id()).cmp(&(a.created_at(), a.id())));
                info!("remote history fetched orders={}", orders.len());
                orders
            }
            Ok(None) => self.order_history(),
            Err(e) => {
                warn!("remote history unavailable error={}", e);
                Vec::new()
            }
        }
    }
}
