use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{
    ActivityCreate, ActivityEntry, Feedback, FeedbackCreate, LoyaltyReward, LoyaltyRewardCreate, LoyaltyRewardPatch,
    Notification, NotificationCreate, SettingsPatch, StoreSettings, StoredObject, StoredObjectCreate,
};
use super::actions::{NotificationAction, NotificationActionResult};

const MAX_COMMENT_LEN: usize = 1000;

impl Entity for StoreSettings {
    type Id = String;
    type CreateParams = String;
    type Patch = SettingsPatch;
    type Action = ();
    type ActionResult = ();

    const TABLE: &'static str = "store_settings";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(_id: String, store_name: String) -> Result<Self, String> {
        Ok(StoreSettings::new(store_name))
    }

    fn on_update(&mut self, patch: SettingsPatch) -> Result<(), String> {
        if let Some(store_name) = patch.store_name {
            if store_name.trim().is_empty() {
                return Err("Store name is required".to_string());
            }
            self.store_name = store_name.trim().to_string();
        }
        if let Some(currency) = patch.currency {
            if currency.len() != 3 {
                return Err(format!("Invalid currency code: {}", currency));
            }
            self.currency = currency.to_uppercase();
        }
        if let Some(accepting_orders) = patch.accepting_orders {
            self.accepting_orders = accepting_orders;
        }
        if let Some(opening_hours) = patch.opening_hours {
            self.opening_hours = opening_hours;
        }
        if let Some(points) = patch.loyalty_points_per_unit {
            self.loyalty_points_per_unit = points;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    fn on_delete(&self) -> Result<(), String> {
        Err("Store settings cannot be deleted".to_string())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}

impl Entity for LoyaltyReward {
    type Id = String;
    type CreateParams = LoyaltyRewardCreate;
    type Patch = LoyaltyRewardPatch;
    type Action = ();
    type ActionResult = ();

    const TABLE: &'static str = "loyalty_rewards";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: LoyaltyRewardCreate) -> Result<Self, String> {
        if params.name.trim().is_empty() {
            return Err("Reward name is required".to_string());
        }
        if params.points_required == 0 {
            return Err("A reward must cost at least one point".to_string());
        }
        Ok(Self {
            id,
            name: params.name.trim().to_string(),
            points_required: params.points_required,
            active: true,
        })
    }

    fn on_update(&mut self, patch: LoyaltyRewardPatch) -> Result<(), String> {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(points_required) = patch.points_required {
            if points_required == 0 {
                return Err("A reward must cost at least one point".to_string());
            }
            self.points_required = points_required;
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

impl Entity for Feedback {
    type Id = String;
    type CreateParams = FeedbackCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();

    const TABLE: &'static str = "feedback";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: FeedbackCreate) -> Result<Self, String> {
        if !(1..=5).contains(&params.rating) {
            return Err(format!("Rating must be between 1 and 5, got {}", params.rating));
        }
        if params.comment.chars().count() > MAX_COMMENT_LEN {
            return Err(format!("Comment is longer than {} characters", MAX_COMMENT_LEN));
        }
        Ok(Self {
            id,
            order_id: params.order_id,
            table_number: params.table_number,
            user_id: params.user_id,
            rating: params.rating,
            comment: params.comment.trim().to_string(),
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Err("Feedback cannot be edited".to_string())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}

impl Entity for Notification {
    type Id = String;
    type CreateParams = NotificationCreate;
    type Patch = ();
    type Action = NotificationAction;
    type ActionResult = NotificationActionResult;

    const TABLE: &'static str = "notifications";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: NotificationCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            user_id: params.user_id,
            title: params.title,
            message: params.message,
            read: false,
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Ok(())
    }

    fn handle_action(&mut self, action: NotificationAction) -> Result<NotificationActionResult, String> {
        match action {
            NotificationAction::MarkRead => {
                let was_unread = !self.read;
                self.read = true;
                Ok(NotificationActionResult::MarkRead(was_unread))
            }
        }
    }
}

impl Entity for ActivityEntry {
    type Id = String;
    type CreateParams = ActivityCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();

    const TABLE: &'static str = "activity_log";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: ActivityCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            actor_id: params.actor_id,
            action: params.action,
            detail: params.detail,
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Err("Activity entries are append-only".to_string())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}

impl Entity for StoredObject {
    type Id = String;
    type CreateParams = StoredObjectCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();

    const TABLE: &'static str = "objects";

    fn id(&self) -> &String {
        &self.key
    }

    fn from_create_params(key: String, params: StoredObjectCreate) -> Result<Self, String> {
        if params.bytes.is_empty() {
            return Err("Cannot store an empty object".to_string());
        }
        if params.bucket.trim().is_empty() {
            return Err("Bucket is required".to_string());
        }
        Ok(Self {
            key,
            bucket: params.bucket,
            content_type: params.content_type,
            bytes: params.bytes,
            uploaded_at: Utc::now(),
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Err("Stored objects are immutable".to_string())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_rating_must_be_one_to_five() {
        let create = |rating| FeedbackCreate {
            order_id: None,
            table_number: "4".into(),
            user_id: None,
            rating,
            comment: "Lovely".into(),
        };
        assert!(Feedback::from_create_params("f1".into(), create(5)).is_ok());
        assert!(Feedback::from_create_params("f1".into(), create(0)).is_err());
        assert!(Feedback::from_create_params("f1".into(), create(6)).is_err());
    }

    #[test]
    fn settings_validate_currency() {
        let mut settings = StoreSettings::new("Corner Café");
        let patch = SettingsPatch { currency: Some("euro".into()), ..Default::default() };
        assert!(settings.on_update(patch).is_err());

        let patch = SettingsPatch { currency: Some("eur".into()), ..Default::default() };
        settings.on_update(patch).unwrap();
        assert_eq!(settings.currency, "EUR");
    }

    #[test]
    fn mark_read_reports_previous_state() {
        let mut note = Notification::from_create_params(
            "n1".into(),
            NotificationCreate { user_id: "u1".into(), title: "Hi".into(), message: "Ready".into() },
        )
        .unwrap();
        assert_eq!(note.handle_action(NotificationAction::MarkRead), Ok(NotificationActionResult::MarkRead(true)));
        assert_eq!(note.handle_action(NotificationAction::MarkRead), Ok(NotificationActionResult::MarkRead(false)));
    }
}
