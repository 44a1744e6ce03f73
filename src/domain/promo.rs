use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cart::DiscountType;

/// A redeemable discount code managed by admins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoCode {
    pub id: String,
    /// Stored upper-case; lookups are case-insensitive.
    pub code: String,
    pub description: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub min_order_value: Option<f64>,
    pub max_uses: Option<u32>,
    pub used_count: u32,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
}

/// Why a promo code cannot be applied right now.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PromoRejection {
    #[error("This promo code is not active")]
    Inactive,
    #[error("This promo code is not valid yet")]
    NotStarted,
    #[error("This promo code has expired")]
    Expired,
    #[error("This promo code has reached its usage limit")]
    UsageLimitReached,
    #[error("Minimum order of {minimum:.2} required for this promo code")]
    BelowMinimum { minimum: f64 },
}

impl PromoCode {
    pub fn normalize(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Checks the code against the current time and the order subtotal.
    pub fn check(&self, subtotal: f64, now: DateTime<Utc>) -> Result<(), PromoRejection> {
        if !self.active {
            return Err(PromoRejection::Inactive);
        }
        if self.starts_at.is_some_and(|starts| now < starts) {
            return Err(PromoRejection::NotStarted);
        }
        if self.expires_at.is_some_and(|expires| now > expires) {
            return Err(PromoRejection::Expired);
        }
        if self.max_uses.is_some_and(|max| self.used_count >= max) {
            return Err(PromoRejection::UsageLimitReached);
        }
        if let Some(minimum) = self.min_order_value {
            if subtotal < minimum {
                return Err(PromoRejection::BelowMinimum { minimum });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PromoCodeCreate {
    pub code: String,
    pub description: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub min_order_value: Option<f64>,
    pub max_uses: Option<u32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl PromoCodeCreate {
    pub fn new(code: impl Into<String>, discount_type: DiscountType, discount_value: f64) -> Self {
        Self {
            code: code.into(),
            description: String::new(),
            discount_type,
            discount_value,
            min_order_value: None,
            max_uses: None,
            starts_at: None,
            expires_at: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromoCodePatch {
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<f64>,
    pub min_order_value: Option<Option<f64>>,
    pub max_uses: Option<Option<u32>>,
    pub starts_at: Option<Option<DateTime<Utc>>>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub active: Option<bool>,
}

/// A banner promotion shown on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl Promotion {
    pub fn is_running(&self, now: DateTime<Utc>) -> bool {
        self.active
            && self.starts_at.map_or(true, |starts| starts <= now)
            && self.ends_at.map_or(true, |ends| now <= ends)
    }
}

#[derive(Debug, Clone)]
pub struct PromotionCreate {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct PromotionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub starts_at: Option<Option<DateTime<Utc>>>,
    pub ends_at: Option<Option<DateTime<Utc>>>,
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn code() -> PromoCode {
        PromoCode {
            id: "promo_1".into(),
            code: "SPRING".into(),
            description: String::new(),
            discount_type: DiscountType::Percentage,
            discount_value: 10.0,
            min_order_value: Some(8.0),
            max_uses: Some(2),
            used_count: 0,
            starts_at: None,
            expires_at: None,
            active: true,
        }
    }

    #[test]
    fn accepts_a_valid_code() {
        assert_eq!(code().check(10.0, Utc::now()), Ok(()));
    }

    #[test]
    fn rejects_by_each_rule() {
        let now = Utc::now();

        let inactive = PromoCode { active: false, ..code() };
        assert_eq!(inactive.check(10.0, now), Err(PromoRejection::Inactive));

        let future = PromoCode { starts_at: Some(now + Duration::days(1)), ..code() };
        assert_eq!(future.check(10.0, now), Err(PromoRejection::NotStarted));

        let expired = PromoCode { expires_at: Some(now - Duration::hours(1)), ..code() };
        assert_eq!(expired.check(10.0, now), Err(PromoRejection::Expired));

        let exhausted = PromoCode { used_count: 2, ..code() };
        assert_eq!(exhausted.check(10.0, now), Err(PromoRejection::UsageLimitReached));

        assert_eq!(code().check(7.99, now), Err(PromoRejection::BelowMinimum { minimum: 8.0 }));
    }

    #[test]
    fn normalizes_codes() {
        assert_eq!(PromoCode::normalize("  spring "), "SPRING");
    }

    #[test]
    fn promotion_window() {
        let now = Utc::now();
        let banner = Promotion {
            id: "b1".into(),
            title: "Happy hour".into(),
            description: String::new(),
            image_url: None,
            starts_at: Some(now - Duration::hours(1)),
            ends_at: Some(now + Duration::hours(1)),
            active: true,
        };
        assert!(banner.is_running(now));
        assert!(!banner.is_running(now + Duration::hours(2)));
    }
}
