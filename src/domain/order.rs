use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cart::{CartItem, Customization};

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Served,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
        OrderStatus::Cancelled,
    ];

    /// Orders still on the barista's board.
    pub fn is_active(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Preparing | OrderStatus::Ready)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown order status: {}", s))
    }
}

/// A placed order, with its lines aggregated inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub table_number: String,
    pub user_id: Option<String>,
    pub status: OrderStatus,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub total: f64,
    pub promo_code: Option<String>,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub served_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Short human-friendly reference shown to customers and baristas.
    pub fn reference(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}

/// One product entry within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub correlation_key: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub customizations: Vec<Customization>,
}

/// Line as submitted at checkout; the correlation key ties it back to the cart item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineCreate {
    pub correlation_key: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub customizations: Vec<Customization>,
}

impl OrderLineCreate {
    pub fn from_cart_item(item: &CartItem) -> Self {
        Self {
            correlation_key: Uuid::new_v4(),
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            customizations: item.customizations.clone(),
        }
    }
}

/// Everything needed to place an order in one step.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderCreate {
    pub table_number: String,
    pub user_id: Option<String>,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub total: f64,
    pub promo_code: Option<String>,
    pub lines: Vec<OrderLineCreate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub table_number: Option<String>,
}

impl OrderPatch {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Preparing".parse::<OrderStatus>(), Ok(OrderStatus::Preparing));
        assert_eq!(" served ".parse::<OrderStatus>(), Ok(OrderStatus::Served));
        assert!("brewing".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn only_open_orders_are_active() {
        let active: Vec<OrderStatus> = OrderStatus::ALL.into_iter().filter(|s| s.is_active()).collect();
        assert_eq!(active, vec![OrderStatus::Pending, OrderStatus::Preparing, OrderStatus::Ready]);
    }

    #[test]
    fn line_create_gets_fresh_correlation_keys() {
        let item = CartItem::new("p1", "Mocha", 4.5, 1);
        let a = OrderLineCreate::from_cart_item(&item);
        let b = OrderLineCreate::from_cart_item(&item);
        assert_ne!(a.correlation_key, b.correlation_key);
        assert_eq!(a.product_id, "p1");
    }
}
