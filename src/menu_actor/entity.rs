use crate::actor_framework::Entity;
use crate::domain::{
    Category, CategoryCreate, CategoryPatch, CustomizationOption, CustomizationOptionCreate,
    CustomizationOptionPatch, MenuItem, MenuItemCreate, MenuItemPatch,
};

fn require_name(name: &str, what: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("{} name is required", what));
    }
    Ok(name.to_string())
}

fn require_price(price: f64) -> Result<f64, String> {
    if !price.is_finite() || price < 0.0 {
        return Err(format!("Invalid price: {}", price));
    }
    Ok(price)
}

impl Entity for Category {
    type Id = String;
    type CreateParams = CategoryCreate;
    type Patch = CategoryPatch;
    type Action = ();
    type ActionResult = ();

    const TABLE: &'static str = "categories";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: CategoryCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            name: require_name(&params.name, "Category")?,
            sort_order: params.sort_order,
            active: true,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.name.to_lowercase())
    }

    fn on_update(&mut self, patch: CategoryPatch) -> Result<(), String> {
        if let Some(name) = patch.name {
            self.name = require_name(&name, "Category")?;
        }
        if let Some(sort_order) = patch.sort_order {
            self.sort_order = sort_order;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}

impl Entity for MenuItem {
    type Id = String;
    type CreateParams = MenuItemCreate;
    type Patch = MenuItemPatch;
    type Action = ();
    type ActionResult = ();

    const TABLE: &'static str = "menu_items";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: MenuItemCreate) -> Result<Self, String> {
        if params.category_id.is_empty() {
            return Err("Menu item needs a category".to_string());
        }
        Ok(Self {
            id,
            category_id: params.category_id,
            name: require_name(&params.name, "Menu item")?,
            description: params.description,
            price: require_price(params.price)?,
            image_url: None,
            available: true,
            customization_ids: params.customization_ids,
        })
    }

    fn on_update(&mut self, patch: MenuItemPatch) -> Result<(), String> {
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(name) = patch.name {
            self.name = require_name(&name, "Menu item")?;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = require_price(price)?;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(available) = patch.available {
            self.available = available;
        }
        if let Some(customization_ids) = patch.customization_ids {
            self.customization_ids = customization_ids;
        }
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}

impl Entity for CustomizationOption {
    type Id = String;
    type CreateParams = CustomizationOptionCreate;
    type Patch = CustomizationOptionPatch;
    type Action = ();
    type ActionResult = ();

    const TABLE: &'static str = "customization_options";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: CustomizationOptionCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            name: require_name(&params.name, "Customization")?,
            group: params.group.trim().to_string(),
            price: require_price(params.price)?,
            active: true,
        })
    }

    fn on_update(&mut self, patch: CustomizationOptionPatch) -> Result<(), String> {
        if let Some(name) = patch.name {
            self.name = require_name(&name, "Customization")?;
        }
        if let Some(group) = patch.group {
            self.group = group.trim().to_string();
        }
        if let Some(price) = patch.price {
            self.price = require_price(price)?;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}
