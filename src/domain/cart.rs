use serde::{Deserialize, Serialize};

/// An option chosen for one cart line (milk, syrup, extra shot...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customization {
    pub id: String,
    pub name: String,
    pub price: f64,
}

impl Customization {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

/// One line in a table's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub customizations: Vec<Customization>,
}

impl CartItem {
    pub fn new(product_id: impl Into<String>, product_name: impl Into<String>, unit_price: f64, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            unit_price,
            quantity,
            image_url: None,
            customizations: Vec::new(),
        }
    }

    pub fn with_customization(mut self, customization: Customization) -> Self {
        self.customizations.push(customization);
        self
    }

    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn identity(&self) -> LineIdentity {
        LineIdentity::new(&self.product_id, self.customizations.iter().map(|c| c.id.clone()))
    }

    /// Price of a single unit including its customizations.
    pub fn unit_total(&self) -> f64 {
        self.unit_price + self.customizations.iter().map(|c| c.price).sum::<f64>()
    }

    pub fn line_total(&self) -> f64 {
        self.unit_total() * f64::from(self.quantity)
    }
}

/// Merge key of a cart line: the product plus the *set* of chosen customization IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineIdentity {
    product_id: String,
    customization_ids: Vec<String>,
}

impl LineIdentity {
    pub fn new(product_id: impl Into<String>, customization_ids: impl IntoIterator<Item = String>) -> Self {
        let mut customization_ids: Vec<String> = customization_ids.into_iter().collect();
        customization_ids.sort();
        customization_ids.dedup();
        Self {
            product_id: product_id.into(),
            customization_ids,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// The promo applied to one table's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promo {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
}

impl Promo {
    pub fn new(code: impl Into<String>, discount_type: DiscountType, discount_value: f64) -> Self {
        Self {
            code: code.into(),
            discount_type,
            discount_value,
        }
    }

    /// Discount for `subtotal`, never below zero and never above the subtotal.
    pub fn discount_for(&self, subtotal: f64) -> f64 {
        discount_for(self.discount_type, self.discount_value, subtotal)
    }
}

/// A non-finite discount value gives no discount.
pub fn discount_for(discount_type: DiscountType, value: f64, subtotal: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let raw = match discount_type {
        DiscountType::Percentage => subtotal * value / 100.0,
        DiscountType::Fixed => value,
    };
    raw.clamp(0.0, subtotal.max(0.0))
}

/// Rounds a money amount to cents.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
