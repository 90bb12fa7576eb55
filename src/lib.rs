//! # Storefront Orders
//!
//! Cart aggregation and order lifecycle core for a storefront: one customer
//! session's cart, order placement with monotonically increasing ids, and a status
//! state machine over the order history.
//!
//! ## Entry points
//!
//! [`OrderManager`] is the synchronous in-memory core. [`OrderService`] wraps it for
//! shared use (single writer, concurrent readers) and mirrors changes to an
//! [`OrderGateway`]. [`api::create_router`] exposes the service over HTTP.
//!
//! ## Example
//!
//! ```rust
//! use storefront_orders::{CategoryId, CustomerDetails, OrderId, OrderManager, Product, ProductId};
//! use rust_decimal::Decimal;
//!
//! let mut manager = OrderManager::new();
//! let roll = Product {
//!     id: ProductId(1),
//!     name: "California Roll".into(),
//!     description: String::new(),
//!     price: Decimal::new(850, 2),
//!     category_id: CategoryId(1),
//!     stock_quantity: 15,
//!     image_url: String::new(),
//! };
//! manager.add_to_cart(&roll, 2);
//! let order = manager
//!     .create_order(CustomerDetails::new("Jan", "jan@x.com", "Main St 1"))
//!     .unwrap();
//! assert_eq!(order.id(), OrderId(1001));
//! assert_eq!(order.total_amount(), Decimal::from(17));
//! assert!(manager.cart().is_empty());
//! ```

pub mod api;
pub mod audit;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod history;
pub mod lifecycle;
pub mod manager;
pub mod service;
pub mod types;
pub mod workload;

pub use audit::{AuditAction, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink, StdoutAuditSink};
pub use cart::{Cart, CartSnapshot};
pub use catalog::{CatalogProvider, StaticCatalog};
pub use config::ServiceConfig;
pub use error::{OrderError, TransportError};
pub use gateway::{Gateway, HttpGateway, LocalGateway, OrderGateway, RemoteConfig};
pub use history::{OrderHistory, OrderStats, DEFAULT_RECENT_ORDERS, FIRST_ORDER_ID};
pub use lifecycle::TransitionPolicy;
pub use manager::OrderManager;
pub use service::OrderService;
pub use types::{Category, CategoryId, CustomerDetails, LineItem, Order, OrderId, OrderStatus, Product, ProductId};
pub use workload::{apply_action, replay_into_manager, CartAction, Workload, WorkloadConfig};
