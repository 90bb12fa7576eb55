//! Core types and IDs for the storefront (catalog records, line items, orders).
//!
//! All identifiers are newtype wrappers. [`Product`] and [`Category`] are read-only
//! catalog data; [`LineItem`], [`Order`] and [`OrderStatus`] belong to the order core.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::OrderError;

/// Catalog product identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ProductId(pub u64);

/// Catalog category identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct CategoryId(pub u64);

/// Order identifier. Allocated by the order history, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog product (reference data, never mutated by the core).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub category_id: CategoryId,
    pub stock_quantity: u32,
    #[serde(default)]
    pub image_url: String,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// Catalog category.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One product/quantity/price triple in a cart or an order.
///
/// The unit price is captured when the line is created and never changes, so a
/// later catalog price change cannot alter a cart line or a placed order.
/// Quantity is at least 1 for every line the core produces.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LineItem {
    product_id: ProductId,
    product: Product,
    quantity: u32,
    unit_price: Decimal,
}

impl LineItem {
    /// New line for `product` at its current price.
    pub fn new(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            product: product.clone(),
            quantity,
            unit_price: product.price,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Product as it looked when the line was created.
    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// `quantity × unit_price`.
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }
}

/// Fulfillment status of an order.
///
/// `Pending → Processing → Shipped → Delivered`, with `Cancelled` reachable from any
/// non-terminal state. See [`crate::lifecycle`] for the transition table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

/// Customer and delivery details required to place an order.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CustomerDetails {
    pub customer_name: String,
    pub customer_email: String,
    pub delivery_address: String,
}

impl CustomerDetails {
    pub fn new(
        customer_name: impl Into<String>,
        customer_email: impl Into<String>,
        delivery_address: impl Into<String>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            customer_email: customer_email.into(),
            delivery_address: delivery_address.into(),
        }
    }

    /// Every field must contain something other than whitespace.
    pub fn validate(&self) -> Result<(), OrderError> {
        let fields = [
            ("customer_name", &self.customer_name),
            ("customer_email", &self.customer_email),
            ("delivery_address", &self.delivery_address),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(OrderError::MissingField(name));
            }
        }
        Ok(())
    }
}

/// Placed order: an immutable snapshot of the cart plus customer details.
///
/// Only `status` changes after creation, and only through the order manager.
/// The total is always derived from the items; it is never stored.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Order {
    id: OrderId,
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    customer: CustomerDetails,
    items: Vec<LineItem>,
    status: OrderStatus,
}

impl Order {
    pub(crate) fn new(
        id: OrderId,
        customer: CustomerDetails,
        items: Vec<LineItem>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            created_at,
            customer,
            items,
            status: OrderStatus::Pending,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn customer(&self) -> &CustomerDetails {
        &self.customer
    }

    pub fn customer_name(&self) -> &str {
        &self.customer.customer_name
    }

    pub fn customer_email(&self) -> &str {
        &self.customer.customer_email
    }

    pub fn delivery_address(&self) -> &str {
        &self.customer.delivery_address
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Sum of line subtotals.
    pub fn total_amount(&self) -> Decimal {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Sum of line quantities.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity())).sum()
    }

    pub(crate) fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    /// Checks an order that arrived from outside the core (import, remote store).
    pub(crate) fn validate(&self) -> Result<(), OrderError> {
        self.customer.validate()?;
        if self.items.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        let mut seen = HashSet::new();
        for line in &self.items {
            let id = line.product_id();
            if line.quantity() == 0 {
                return Err(OrderError::InvalidQuantity(id));
            }
            if line.product().id != id {
                return Err(OrderError::ProductMismatch(id));
            }
            if line.unit_price() < Decimal::ZERO {
                return Err(OrderError::NegativePrice(id));
            }
            if !seen.insert(id) {
                return Err(OrderError::DuplicateLine(id));
            }
        }
        Ok(())
    }
}
