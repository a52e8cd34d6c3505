// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin product catalog. Process-local; lost on restart.

use crate::error::AppError;
use crate::models::{Product, ProductForm};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use validator::Validate;

pub struct ProductCatalog {
    products: DashMap<u64, Product>,
    last_id: AtomicU64,
}

impl ProductCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self {
            products: DashMap::new(),
            last_id: AtomicU64::new(0),
        }
    }

    /// Catalog holding the two starter products.
    pub fn seeded() -> Self {
        let catalog = Self::new();
        for (id, name, price) in [(1, "Product A", 100.0), (2, "Product B", 200.0)] {
            catalog.products.insert(
                id,
                Product {
                    id,
                    name: name.to_string(),
                    price,
                },
            );
        }
        catalog.last_id.store(2, Ordering::SeqCst);
        catalog
    }

    /// All products, by id.
    pub fn list(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self.products.iter().map(|e| e.value().clone()).collect();
        products.sort_by_key(|p| p.id);
        products
    }

    pub fn add(&self, form: ProductForm) -> Result<Product, AppError> {
        form.validate()?;
        let product = Product {
            id: self.next_id(),
            name: form.name.trim().to_string(),
            price: form.price,
        };
        self.products.insert(product.id, product.clone());
        tracing::info!(product_id = product.id, "Product added");
        Ok(product)
    }

    pub fn update(&self, id: u64, form: ProductForm) -> Result<Product, AppError> {
        form.validate()?;
        let mut entry = self
            .products
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Product {}", id)))?;
        entry.name = form.name.trim().to_string();
        entry.price = form.price;
        tracing::info!(product_id = id, "Product updated");
        Ok(entry.clone())
    }

    /// Remove a product. Removing a missing id is not an error.
    pub fn delete(&self, id: u64) {
        if self.products.remove(&id).is_some() {
            tracing::info!(product_id = id, "Product deleted");
        }
    }

    /// Millisecond timestamp, bumped past the previous id when two adds
    /// land in the same millisecond.
    fn next_id(&self) -> u64 {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let mut prev = self.last_id.load(Ordering::SeqCst);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last_id
                .compare_exchange(prev, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}
