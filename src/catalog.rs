//! Catalog provider: read-only products and categories.
//!
//! The core only ever reads catalog data. [`StaticCatalog`] serves a fixed set,
//! by default the storefront's bundled menu (`data/catalog.json`).

use crate::types::{Category, CategoryId, Product, ProductId};

const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");

/// Source of catalog data.
pub trait CatalogProvider: Send + Sync {
    fn categories(&self) -> Vec<Category>;

    fn products(&self) -> Vec<Product>;

    fn products_by_category(&self, category_id: CategoryId) -> Vec<Product> {
        self.products()
            .into_iter()
            .filter(|p| p.category_id == category_id)
            .collect()
    }

    fn product(&self, product_id: ProductId) -> Option<Product> {
        self.products().into_iter().find(|p| p.id == product_id)
    }
}

/// Fixed in-memory catalog.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct StaticCatalog {
    categories: Vec<Category>,
    products: Vec<Product>,
}

impl StaticCatalog {
    pub fn new(categories: Vec<Category>, products: Vec<Product>) -> Self {
        Self {
            categories,
            products,
        }
    }

    /// Parse `{"categories": [...], "products": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The menu shipped with the crate.
    pub fn bundled() -> Result<Self, serde_json::Error> {
        Self::from_json(BUNDLED_CATALOG)
    }
}

impl CatalogProvider for StaticCatalog {
    fn categories(&self) -> Vec<Category> {
        self.categories.clone()
    }

    fn products(&self) -> Vec<Product> {
        self.products.clone()
    }

    fn products_by_category(&self, category_id: CategoryId) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| p.category_id == category_id)
            .cloned()
            .collect()
    }

    fn product(&self, product_id: ProductId) -> Option<Product> {
        self.products.iter().find(|p| p.id == product_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn bundled_catalog_has_five_categories_of_five() {
        let catalog = StaticCatalog::bundled().unwrap();
        assert_eq!(catalog.categories().len(), 5);
        assert_eq!(catalog.products().len(), 25);
        for category in catalog.categories() {
            assert_eq!(catalog.products_by_category(category.id).len(), 5);
        }
    }

    #[test]
    fn bundled_prices_and_stock() {
        let catalog = StaticCatalog::bundled().unwrap();
        let roll = catalog.product(ProductId(1)).unwrap();
        assert_eq!(roll.name, "California Roll");
        assert_eq!(roll.price, Decimal::from_str("8.50").unwrap());
        assert!(roll.in_stock());
        assert!(!catalog.product(ProductId(3)).unwrap().in_stock());
        assert!(catalog.product(ProductId(99)).is_none());
    }

    #[test]
    fn from_json_defaults_optional_fields() {
        let json = r#"{
            "categories": [{ "id": 1, "name": "Drinks" }],
            "products": [{ "id": 7, "name": "Tea", "price": "2.50", "category_id": 1, "stock_quantity": 3 }]
        }"#;
        let catalog = StaticCatalog::from_json(json).unwrap();
        let tea = catalog.product(ProductId(7)).unwrap();
        assert!(tea.description.is_empty());
        assert_eq!(catalog.categories()[0].description, "");
    }
}
