use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Singleton record with store-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub id: String,
    pub store_name: String,
    pub currency: String,
    pub accepting_orders: bool,
    pub opening_hours: String,
    /// Loyalty points earned per currency unit spent.
    pub loyalty_points_per_unit: u32,
    pub updated_at: DateTime<Utc>,
}

impl StoreSettings {
    pub const SINGLETON_ID: &'static str = "store";

    pub fn new(store_name: impl Into<String>) -> Self {
        Self {
            id: Self::SINGLETON_ID.to_string(),
            store_name: store_name.into(),
            currency: "USD".to_string(),
            accepting_orders: true,
            opening_hours: "07:00-18:00".to_string(),
            loyalty_points_per_unit: 1,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub store_name: Option<String>,
    pub currency: Option<String>,
    pub accepting_orders: Option<bool>,
    pub opening_hours: Option<String>,
    pub loyalty_points_per_unit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyReward {
    pub id: String,
    pub name: String,
    pub points_required: u32,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct LoyaltyRewardCreate {
    pub name: String,
    pub points_required: u32,
}

#[derive(Debug, Clone, Default)]
pub struct LoyaltyRewardPatch {
    pub name: Option<String>,
    pub points_required: Option<u32>,
    pub active: Option<bool>,
}

/// Customer feedback left after an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub order_id: Option<String>,
    pub table_number: String,
    pub user_id: Option<String>,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FeedbackCreate {
    pub order_id: Option<String>,
    pub table_number: String,
    pub user_id: Option<String>,
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationCreate {
    pub user_id: String,
    pub title: String,
    pub message: String,
}

/// Audit trail entry for admin operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub actor_id: Option<String>,
    pub action: String,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityCreate {
    pub actor_id: Option<String>,
    pub action: String,
    pub detail: String,
}

impl ActivityCreate {
    pub fn new(actor_id: Option<&str>, action: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.map(str::to_string),
            action: action.into(),
            detail: detail.into(),
        }
    }
}

/// Uploaded binary object (menu photos, QR payload images).
#[derive(Clone, PartialEq)]
pub struct StoredObject {
    pub key: String,
    pub bucket: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub uploaded_at: DateTime<Utc>,
}

impl StoredObject {
    pub fn public_url(&self) -> String {
        format!("/storage/{}/{}", self.bucket, self.key)
    }
}

impl fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredObject")
            .field("key", &self.key)
            .field("bucket", &self.bucket)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Clone)]
pub struct StoredObjectCreate {
    pub bucket: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for StoredObjectCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredObjectCreate")
            .field("bucket", &self.bucket)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
