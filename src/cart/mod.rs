//! Per-table shopping carts.
//!
//! [`CartState`] holds the plain arithmetic; [`CartService`] owns one state,
//! persists it after every mutation, and serves it to [`crate::clients::CartClient`]s.

mod error;
pub mod service;
pub mod storage;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{CartItem, DiscountType, LineIdentity, Promo};

pub use error::*;
pub use service::CartService;
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};

/// Carts and promos of every table, keyed by table identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    #[serde(default)]
    items: BTreeMap<String, Vec<CartItem>>,
    #[serde(default)]
    promos: BTreeMap<String, Promo>,
}

/// Everything a checkout or a cart view needs about one table.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSummary {
    pub items: Vec<CartItem>,
    pub promo: Option<Promo>,
    pub item_count: u32,
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
}

impl CartState {
    /// Merges into an existing line with the same identity, otherwise appends.
    /// A zero quantity is ignored so no line is ever stored with quantity 0.
    pub fn add_item(&mut self, item: CartItem, table: &str) {
        if item.quantity == 0 {
            return;
        }
        let identity = item.identity();
        let lines = self.items.entry(table.to_string()).or_default();
        match lines.iter_mut().find(|line| line.identity() == identity) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => lines.push(item),
        }
    }

    /// `None` customizations match the plain, uncustomized line.
    pub fn remove_item(&mut self, product_id: &str, table: &str, customization_ids: Option<&[String]>) {
        let identity = LineIdentity::new(product_id, customization_ids.unwrap_or_default().iter().cloned());
        if let Some(lines) = self.items.get_mut(table) {
            lines.retain(|line| line.identity() != identity);
            if lines.is_empty() {
                self.items.remove(table);
            }
        }
    }

    pub fn update_quantity(
        &mut self,
        product_id: &str,
        quantity: i64,
        table: &str,
        customization_ids: Option<&[String]>,
    ) {
        if quantity <= 0 {
            self.remove_item(product_id, table, customization_ids);
            return;
        }
        let identity = LineIdentity::new(product_id, customization_ids.unwrap_or_default().iter().cloned());
        if let Some(line) = self
            .items
            .get_mut(table)
            .and_then(|lines| lines.iter_mut().find(|line| line.identity() == identity))
        {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    pub fn clear_cart(&mut self, table: &str) {
        self.items.remove(table);
        self.promos.remove(table);
    }

    /// Takes the submitted quantities out of the table's cart and drops its promo.
    /// Anything added while the order was being placed stays behind.
    pub fn clear_submitted(&mut self, table: &str, submitted: &[CartItem]) {
        if let Some(lines) = self.items.get_mut(table) {
            for item in submitted {
                let identity = item.identity();
                if let Some(line) = lines.iter_mut().find(|line| line.identity() == identity) {
                    line.quantity = line.quantity.saturating_sub(item.quantity);
                }
            }
            lines.retain(|line| line.quantity > 0);
            if lines.is_empty() {
                self.items.remove(table);
            }
        }
        self.promos.remove(table);
    }

    /// Replaces whatever promo the table had. Validation happens before this call.
    pub fn apply_promo_code(&mut self, table: &str, code: &str, discount_type: DiscountType, value: f64) {
        self.promos.insert(table.to_string(), Promo::new(code, discount_type, value));
    }

    pub fn remove_promo_code(&mut self, table: &str) {
        self.promos.remove(table);
    }

    pub fn get_table_items(&self, table: &str) -> &[CartItem] {
        self.items.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn promo(&self, table: &str) -> Option<&Promo> {
        self.promos.get(table)
    }

    pub fn item_count(&self, table: &str) -> u32 {
        self.get_table_items(table).iter().map(|item| item.quantity).sum()
    }

    pub fn subtotal(&self, table: &str) -> f64 {
        self.get_table_items(table).iter().map(CartItem::line_total).sum()
    }

    pub fn discount(&self, table: &str) -> f64 {
        let subtotal = self.subtotal(table);
        self.promo(table).map_or(0.0, |promo| promo.discount_for(subtotal))
    }

    pub fn total(&self, table: &str) -> f64 {
        (self.subtotal(table) - self.discount(table)).max(0.0)
    }

    pub fn summary(&self, table: &str) -> CartSummary {
        CartSummary {
            items: self.get_table_items(table).to_vec(),
            promo: self.promo(table).cloned(),
            item_count: self.item_count(table),
            subtotal: self.subtotal(table),
            discount: self.discount(table),
            total: self.total(table),
        }
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }
}
