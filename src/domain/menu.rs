use serde::{Deserialize, Serialize};

use super::cart::{CartItem, Customization};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub sort_order: i32,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct CategoryCreate {
    pub name: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

/// A product on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub available: bool,
    /// Customization options offered for this item.
    pub customization_ids: Vec<String>,
}

impl MenuItem {
    /// Builds a cart line for this item with the chosen options.
    pub fn to_cart_item(&self, quantity: u32, chosen: &[CustomizationOption]) -> CartItem {
        CartItem {
            product_id: self.id.clone(),
            product_name: self.name.clone(),
            unit_price: self.price,
            quantity,
            image_url: self.image_url.clone(),
            customizations: chosen.iter().map(CustomizationOption::to_customization).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuItemCreate {
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub customization_ids: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MenuItemPatch {
    pub category_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub available: Option<bool>,
    pub customization_ids: Option<Vec<String>>,
}

/// A selectable extra such as a milk alternative or a syrup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomizationOption {
    pub id: String,
    pub name: String,
    pub group: String,
    pub price: f64,
    pub active: bool,
}

impl CustomizationOption {
    pub fn to_customization(&self) -> Customization {
        Customization::new(self.id.clone(), self.name.clone(), self.price)
    }
}

#[derive(Debug, Clone)]
pub struct CustomizationOptionCreate {
    pub name: String,
    pub group: String,
    pub price: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CustomizationOptionPatch {
    pub name: Option<String>,
    pub group: Option<String>,
    pub price: Option<f64>,
    pub active: Option<bool>,
}

/// A category with its orderable items, as shown to customers.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuSection {
    pub category: Category,
    pub items: Vec<MenuItem>,
}
