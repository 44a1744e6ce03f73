use crate::actor_framework::Entity;
use crate::domain::{
    DiscountType, PromoCode, PromoCodeCreate, PromoCodePatch, Promotion, PromotionCreate, PromotionPatch,
};
use super::actions::{PromoCodeAction, PromoCodeActionResult};

fn check_discount(discount_type: DiscountType, value: f64) -> Result<(), String> {
    let valid = match discount_type {
        DiscountType::Percentage => (0.0..=100.0).contains(&value),
        DiscountType::Fixed => value.is_finite() && value >= 0.0,
    };
    if !valid {
        return Err(format!("Invalid discount value {} for {:?}", value, discount_type));
    }
    Ok(())
}

impl Entity for PromoCode {
    type Id = String;
    type CreateParams = PromoCodeCreate;
    type Patch = PromoCodePatch;
    type Action = PromoCodeAction;
    type ActionResult = PromoCodeActionResult;

    const TABLE: &'static str = "promo_codes";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: PromoCodeCreate) -> Result<Self, String> {
        let code = PromoCode::normalize(&params.code);
        if code.is_empty() {
            return Err("Promo code is required".to_string());
        }
        check_discount(params.discount_type, params.discount_value)?;
        Ok(Self {
            id,
            code,
            description: params.description,
            discount_type: params.discount_type,
            discount_value: params.discount_value,
            min_order_value: params.min_order_value,
            max_uses: params.max_uses,
            used_count: 0,
            starts_at: params.starts_at,
            expires_at: params.expires_at,
            active: true,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.code.clone())
    }

    fn on_update(&mut self, patch: PromoCodePatch) -> Result<(), String> {
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(discount_type) = patch.discount_type {
            self.discount_type = discount_type;
        }
        if let Some(discount_value) = patch.discount_value {
            self.discount_value = discount_value;
        }
        if let Some(min_order_value) = patch.min_order_value {
            self.min_order_value = min_order_value;
        }
        if let Some(max_uses) = patch.max_uses {
            self.max_uses = max_uses;
        }
        if let Some(starts_at) = patch.starts_at {
            self.starts_at = starts_at;
        }
        if let Some(expires_at) = patch.expires_at {
            self.expires_at = expires_at;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        check_discount(self.discount_type, self.discount_value)
    }

    fn handle_action(&mut self, action: PromoCodeAction) -> Result<PromoCodeActionResult, String> {
        match action {
            PromoCodeAction::IncrementUsage => {
                if self.max_uses.is_some_and(|max| self.used_count >= max) {
                    return Err(format!("Promo code {} has reached its usage limit", self.code));
                }
                self.used_count += 1;
                Ok(PromoCodeActionResult::IncrementUsage { used_count: self.used_count })
            }
        }
    }
}

impl Entity for Promotion {
    type Id = String;
    type CreateParams = PromotionCreate;
    type Patch = PromotionPatch;
    type Action = ();
    type ActionResult = ();

    const TABLE: &'static str = "promotions";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: PromotionCreate) -> Result<Self, String> {
        if params.title.trim().is_empty() {
            return Err("Promotion title is required".to_string());
        }
        Ok(Self {
            id,
            title: params.title.trim().to_string(),
            description: params.description,
            image_url: params.image_url,
            starts_at: params.starts_at,
            ends_at: params.ends_at,
            active: true,
        })
    }

    fn on_update(&mut self, patch: PromotionPatch) -> Result<(), String> {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(starts_at) = patch.starts_at {
            self.starts_at = starts_at;
        }
        if let Some(ends_at) = patch.ends_at {
            self.ends_at = ends_at;
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
