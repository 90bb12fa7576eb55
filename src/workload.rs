//! Synthetic cart activity generator.
//!
//! Deterministic, configurable stream of cart actions for replay tests and benches.
//! Same seed ⇒ same products and same sequence of actions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::manager::OrderManager;
use crate::types::{CategoryId, CustomerDetails, Order, Product, ProductId};

/// One shopper action. Products are addressed by index into [`Workload::products`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartAction {
    Add { product: usize, quantity: u32 },
    Remove { product: usize },
    /// Quantity may be zero or negative (removal).
    Update { product: usize, quantity: i64 },
    /// Catalog price change; lines already in the cart keep their price.
    Reprice { product: usize, price_cents: i64 },
    Clear,
    Checkout,
}

/// Configuration for the generator. Ratios are checked in order
/// add → remove → update → reprice → clear; the remainder is checkout.
#[derive(Clone, Debug)]
pub struct WorkloadConfig {
    /// RNG seed. Same seed ⇒ same stream.
    pub seed: u64,
    /// Number of actions produced by [`Workload::all_actions`].
    pub num_actions: usize,
    /// Size of the generated product set.
    pub num_products: usize,
    pub add_ratio: f64,
    pub remove_ratio: f64,
    pub update_ratio: f64,
    pub reprice_ratio: f64,
    pub clear_ratio: f64,
    /// Quantity range for adds (inclusive, at least 1).
    pub max_quantity: u32,
    /// Price range in cents (inclusive).
    pub price_min_cents: i64,
    pub price_max_cents: i64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            num_actions: 500,
            num_products: 12,
            add_ratio: 0.5,
            remove_ratio: 0.1,
            update_ratio: 0.15,
            reprice_ratio: 0.1,
            clear_ratio: 0.03,
            max_quantity: 5,
            price_min_cents: 100,
            price_max_cents: 2500,
        }
    }
}

/// Deterministic action stream. Create with [`Workload::new`]; iterate to get actions.
pub struct Workload {
    rng: StdRng,
    config: WorkloadConfig,
    products: Vec<Product>,
}

impl Workload {
    pub fn new(config: WorkloadConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let products = (0..config.num_products.max(1))
            .map(|i| {
                let cents = rng.gen_range(config.price_min_cents..=config.price_max_cents);
                Product {
                    id: ProductId(i as u64 + 1),
                    name: format!("item-{}", i + 1),
                    description: String::new(),
                    price: Decimal::new(cents, 2),
                    category_id: CategoryId(1),
                    stock_quantity: 100,
                    image_url: String::new(),
                }
            })
            .collect();
        Self {
            rng,
            config,
            products,
        }
    }

    /// Product set at generation time (before any reprice is applied).
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn next_action(&mut self) -> CartAction {
        let product = self.rng.gen_range(0..self.products.len());
        let c = &self.config;
        let mut r = self.rng.gen::<f64>();
        if r < c.add_ratio {
            let quantity = self.rng.gen_range(1..=c.max_quantity.max(1));
            return CartAction::Add { product, quantity };
        }
        r -= c.add_ratio;
        if r < c.remove_ratio {
            return CartAction::Remove { product };
        }
        r -= c.remove_ratio;
        if r < c.update_ratio {
            let max = i64::from(c.max_quantity.max(1));
            let quantity = self.rng.gen_range(-2..=max);
            return CartAction::Update { product, quantity };
        }
        r -= c.update_ratio;
        if r < c.reprice_ratio {
            let price_cents = self.rng.gen_range(c.price_min_cents..=c.price_max_cents);
            return CartAction::Reprice {
                product,
                price_cents,
            };
        }
        r -= c.reprice_ratio;
        if r < c.clear_ratio {
            return CartAction::Clear;
        }
        CartAction::Checkout
    }

    /// `config.num_actions` actions.
    pub fn all_actions(&mut self) -> Vec<CartAction> {
        (0..self.config.num_actions)
            .map(|_| self.next_action())
            .collect()
    }
}

impl Iterator for Workload {
    type Item = CartAction;

    fn next(&mut self) -> Option<CartAction> {
        Some(self.next_action())
    }
}

/// Applies one action. `products` is the live catalog; reprices mutate it.
/// Returns the order a successful checkout placed.
pub fn apply_action(
    manager: &mut OrderManager,
    products: &mut [Product],
    action: &CartAction,
) -> Option<Order> {
    match *action {
        CartAction::Add { product, quantity } => {
            let p = products.get(product)?;
            manager.add_to_cart(p, quantity);
            None
        }
        CartAction::Remove { product } => {
            let id = products.get(product)?.id;
            manager.remove_from_cart(id);
            None
        }
        CartAction::Update { product, quantity } => {
            let id = products.get(product)?.id;
            manager.update_quantity(id, quantity);
            None
        }
        CartAction::Reprice {
            product,
            price_cents,
        } => {
            let p = products.get_mut(product)?;
            p.price = Decimal::new(price_cents, 2);
            None
        }
        CartAction::Clear => {
            manager.clear_cart();
            None
        }
        CartAction::Checkout => manager
            .create_order(CustomerDetails::new(
                "Load Test",
                "load@example.com",
                "1 Bench Street",
            ))
            .ok(),
    }
}

/// Replays every action into `manager` and returns the placed orders.
pub fn replay_into_manager(
    manager: &mut OrderManager,
    products: &mut [Product],
    actions: &[CartAction],
) -> Vec<Order> {
    actions
        .iter()
        .filter_map(|a| apply_action(manager, products, a))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let config = WorkloadConfig {
            seed: 7,
            num_actions: 50,
            ..Default::default()
        };
        let mut a = Workload::new(config.clone());
        let mut b = Workload::new(config);
        assert_eq!(a.products(), b.products());
        assert_eq!(a.all_actions(), b.all_actions());
    }

    #[test]
    fn adds_only_stream_never_checks_out() {
        let config = WorkloadConfig {
            seed: 1,
            num_actions: 100,
            add_ratio: 1.0,
            ..Default::default()
        };
        let mut workload = Workload::new(config);
        let actions = workload.all_actions();
        assert!(actions.iter().all(|a| matches!(a, CartAction::Add { quantity, .. } if *quantity >= 1)));
    }

    #[test]
    fn replay_places_orders_on_checkout() {
        let mut products = Workload::new(WorkloadConfig::default()).products().to_vec();
        let actions = vec![
            CartAction::Add { product: 0, quantity: 2 },
            CartAction::Checkout,
            CartAction::Checkout,
            CartAction::Add { product: 1, quantity: 1 },
            CartAction::Checkout,
        ];
        let mut manager = OrderManager::new();
        let orders = replay_into_manager(&mut manager, &mut products, &actions);
        assert_eq!(orders.len(), 2);
        assert_eq!(manager.total_orders_count(), 2);
    }

    #[test]
    fn out_of_range_product_is_skipped() {
        let mut products = Vec::new();
        let mut manager = OrderManager::new();
        let placed = apply_action(&mut manager, &mut products, &CartAction::Add { product: 3, quantity: 1 });
        assert!(placed.is_none());
        assert!(manager.cart().is_empty());
    }
}
