//! Catalog provider facade
//!
//! The engine never owns products; it snapshots whatever the catalog hands
//! it. This in-memory facade is the synchronous face of whichever product
//! source the host application wires in.

use crate::models::Product;

/// In-memory product catalog
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Products currently offered for sale.
    pub fn available_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.is_available)
    }

    /// Look up a product by id, available or not.
    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Replace the catalog contents (e.g. after a settings-screen edit).
    pub fn replace(&mut self, products: Vec<Product>) {
        self.products = products;
    }
}
