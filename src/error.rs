//! Error types for the order core and the remote order store.
//!
//! [`OrderError`] covers the only failures the core can report: validation and
//! not-found outcomes plus rejected status transitions. [`TransportError`] never
//! leaves the service layer; it is logged and degraded there.

use std::time::Duration;

use crate::types::{OrderId, OrderStatus, ProductId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("order {0} not found")]
    NotFound(OrderId),
    #[error("order {order_id} cannot move from {from} to {to}")]
    IllegalTransition {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },
    #[error("order {0} already exists")]
    DuplicateOrder(OrderId),
    #[error("line for product {0} has zero quantity")]
    InvalidQuantity(ProductId),
    #[error("order {0} leaves no room for later order ids")]
    IdOutOfRange(OrderId),
    #[error("product {0} appears on more than one line")]
    DuplicateLine(ProductId),
    #[error("line for product {0} carries a snapshot of another product")]
    ProductMismatch(ProductId),
    #[error("line for product {0} has a negative unit price")]
    NegativePrice(ProductId),
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote returned status {0}")]
    Status(u16),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<TransportError>,
    },
}

impl TransportError {
    /// Connection failures, timeouts and 5xx responses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            TransportError::Status(code) => *code >= 500,
            TransportError::Timeout(_) => true,
            TransportError::RetriesExhausted { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_order() {
        let err = OrderError::IllegalTransition {
            order_id: OrderId(1001),
            from: OrderStatus::Delivered,
            to: OrderStatus::Pending,
        };
        assert_eq!(err.to_string(), "order 1001 cannot move from Delivered to Pending");
        assert_eq!(OrderError::NotFound(OrderId(7)).to_string(), "order 7 not found");
    }

    #[test]
    fn server_errors_are_retryable_client_errors_are_not() {
        assert!(TransportError::Status(503).is_retryable());
        assert!(!TransportError::Status(404).is_retryable());
        assert!(TransportError::Timeout(Duration::from_millis(10)).is_retryable());
        let exhausted = TransportError::RetriesExhausted {
            attempts: 3,
            last: Box::new(TransportError::Status(500)),
        };
        assert!(!exhausted.is_retryable());
    }
}
