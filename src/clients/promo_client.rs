use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::clients::CartClient;
use crate::domain::{PromoCode, PromoCodeCreate, PromoCodePatch, Promotion, PromotionCreate, PromotionPatch};
use crate::promo_actor::{PromoCodeAction, PromoCodeActionResult, PromoError};

/// Client for promo codes and banner promotions.
#[derive(Clone)]
pub struct PromoClient {
    codes: ResourceClient<PromoCode>,
    promotions: ResourceClient<Promotion>,
}

impl PromoClient {
    pub fn new(codes: ResourceClient<PromoCode>, promotions: ResourceClient<Promotion>) -> Self {
        Self { codes, promotions }
    }

    /// Case-insensitive lookup.
    #[instrument(skip(self))]
    pub async fn find_by_code(&self, code: &str) -> Result<Option<PromoCode>, PromoError> {
        debug!("Sending request");
        let wanted = PromoCode::normalize(code);
        let matches = self.codes.query(move |promo| promo.code == wanted).await?;
        Ok(matches.into_iter().next())
    }

    /// Looks the code up and checks it is usable for an order of `subtotal` at `now`.
    #[instrument(skip(self))]
    pub async fn validate(&self, code: &str, subtotal: f64, now: DateTime<Utc>) -> Result<PromoCode, PromoError> {
        let promo = self
            .find_by_code(code)
            .await?
            .ok_or_else(|| PromoError::NotFound(PromoCode::normalize(code)))?;
        if let Err(rejection) = promo.check(subtotal, now) {
            warn!(code = %promo.code, reason = %rejection, "Promo code rejected");
            return Err(rejection.into());
        }
        Ok(promo)
    }

    /// Validates `code` against the table's current subtotal and, if it passes,
    /// sets it as the table's promo.
    #[instrument(skip(self, cart))]
    pub async fn apply_promo(&self, cart: &CartClient, table: &str, code: &str) -> Result<PromoCode, PromoError> {
        let subtotal = cart.summary(table.to_string()).await?.subtotal;
        let promo = self.validate(code, subtotal, Utc::now()).await?;
        cart.apply_promo_code(table, &promo.code, promo.discount_type, promo.discount_value)
            .await?;
        info!(code = %promo.code, "Promo code applied");
        Ok(promo)
    }

    /// Server-side procedure; refuses once `max_uses` is reached.
    #[instrument(skip(self))]
    pub async fn increment_usage(&self, id: String) -> Result<u32, PromoError> {
        debug!("Sending request");
        match self.codes.perform_action(id, PromoCodeAction::IncrementUsage).await? {
            PromoCodeActionResult::IncrementUsage { used_count } => Ok(used_count),
        }
    }

    #[instrument(skip(self))]
    pub async fn active_promotions(&self, now: DateTime<Utc>) -> Result<Vec<Promotion>, PromoError> {
        debug!("Sending request");
        Ok(self.promotions.query(move |promotion| promotion.is_running(now)).await?)
    }
}

impl_client_methods!(PromoClient, codes, PromoCode, PromoError, promo_code, promo_codes);
impl_write_methods!(PromoClient, codes, PromoCode, PromoCodeCreate, PromoCodePatch, PromoError, promo_code);
impl_client_methods!(PromoClient, promotions, Promotion, PromoError, promotion, promotions);
impl_write_methods!(PromoClient, promotions, Promotion, PromotionCreate, PromotionPatch, PromoError, promotion);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::{uuid_ids, ResourceActor};
    use crate::cart::{CartService, MemoryStorage};
    use crate::domain::{CartItem, DiscountType, PromoRejection};
    use chrono::Duration;

    fn spawn_promos() -> PromoClient {
        let (codes_actor, codes) = ResourceActor::<PromoCode>::new(8, uuid_ids());
        let (promotions_actor, promotions) = ResourceActor::<Promotion>::new(8, uuid_ids());
        tokio::spawn(codes_actor.run());
        tokio::spawn(promotions_actor.run());
        PromoClient::new(codes, promotions)
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive_and_codes_are_unique() {
        let promos = spawn_promos();
        promos
            .create_promo_code(PromoCodeCreate::new("spring10", DiscountType::Percentage, 10.0))
            .await
            .unwrap();

        let found = promos.find_by_code(" Spring10 ").await.unwrap().unwrap();
        assert_eq!(found.code, "SPRING10");

        let err = promos
            .create_promo_code(PromoCodeCreate::new("SPRING10", DiscountType::Fixed, 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, PromoError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn validate_rejects_unusable_codes() {
        let promos = spawn_promos();
        let now = Utc::now();

        let mut expired = PromoCodeCreate::new("OLD", DiscountType::Fixed, 1.0);
        expired.expires_at = Some(now - Duration::days(1));
        promos.create_promo_code(expired).await.unwrap();

        let mut minimum = PromoCodeCreate::new("BIG", DiscountType::Fixed, 5.0);
        minimum.min_order_value = Some(20.0);
        promos.create_promo_code(minimum).await.unwrap();

        let mut single = PromoCodeCreate::new("ONCE", DiscountType::Percentage, 50.0);
        single.max_uses = Some(1);
        let single = promos.create_promo_code(single).await.unwrap();
        assert_eq!(promos.increment_usage(single.id.clone()).await.unwrap(), 1);
        assert!(promos.increment_usage(single.id).await.is_err());

        let off = promos
            .create_promo_code(PromoCodeCreate::new("OFF", DiscountType::Fixed, 1.0))
            .await
            .unwrap();
        promos
            .update_promo_code(off.id, PromoCodePatch { active: Some(false), ..Default::default() })
            .await
            .unwrap();

        assert_eq!(promos.validate("old", 10.0, now).await, Err(PromoError::Rejected(PromoRejection::Expired)));
        assert_eq!(
            promos.validate("big", 10.0, now).await,
            Err(PromoError::Rejected(PromoRejection::BelowMinimum { minimum: 20.0 }))
        );
        assert!(promos.validate("big", 25.0, now).await.is_ok());
        assert_eq!(
            promos.validate("once", 10.0, now).await,
            Err(PromoError::Rejected(PromoRejection::UsageLimitReached))
        );
        assert_eq!(promos.validate("off", 10.0, now).await, Err(PromoError::Rejected(PromoRejection::Inactive)));
        assert_eq!(promos.validate("nope", 10.0, now).await, Err(PromoError::NotFound("NOPE".to_string())));
    }

    #[tokio::test]
    async fn apply_promo_sets_cart_promo_only_when_valid() {
        let promos = spawn_promos();
        let (service, cart) = CartService::new(8, MemoryStorage::new());
        tokio::spawn(service.run());

        let mut tenner = PromoCodeCreate::new("TENNER", DiscountType::Fixed, 10.0);
        tenner.min_order_value = Some(15.0);
        promos.create_promo_code(tenner).await.unwrap();

        cart.add_item("2".to_string(), CartItem::new("p1", "Latte", 5.0, 2)).await.unwrap();
        assert!(promos.apply_promo(&cart, "2", "tenner").await.is_err());
        assert!(cart.summary("2".to_string()).await.unwrap().promo.is_none());

        cart.add_item("2".to_string(), CartItem::new("p1", "Latte", 5.0, 1)).await.unwrap();
        promos.apply_promo(&cart, "2", "tenner").await.unwrap();
        let summary = cart.summary("2".to_string()).await.unwrap();
        assert_eq!(summary.promo.map(|p| p.code), Some("TENNER".to_string()));
        assert_eq!(summary.total, 5.0);
    }

    #[tokio::test]
    async fn only_running_promotions_are_active() {
        let promos = spawn_promos();
        let now = Utc::now();
        let banner = |title: &str, ends_at| PromotionCreate {
            title: title.to_string(),
            description: String::new(),
            image_url: None,
            starts_at: None,
            ends_at,
        };
        promos.create_promotion(banner("Live", None)).await.unwrap();
        promos.create_promotion(banner("Over", Some(now - Duration::hours(1)))).await.unwrap();

        let active = promos.active_promotions(now).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "Live");
    }
}
