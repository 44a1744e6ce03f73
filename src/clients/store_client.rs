use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{
    ActivityEntry, Feedback, FeedbackCreate, LoyaltyReward, LoyaltyRewardCreate, LoyaltyRewardPatch, Notification,
    SettingsPatch, StoreSettings,
};
use crate::store_actor::{NotificationAction, NotificationActionResult, StoreError};

/// Store settings, loyalty rewards, feedback, notifications and the activity log.
#[derive(Clone)]
pub struct StoreClient {
    settings: ResourceClient<StoreSettings>,
    rewards: ResourceClient<LoyaltyReward>,
    feedback: ResourceClient<Feedback>,
    notifications: ResourceClient<Notification>,
    activity: ResourceClient<ActivityEntry>,
}

impl StoreClient {
    pub fn new(
        settings: ResourceClient<StoreSettings>,
        rewards: ResourceClient<LoyaltyReward>,
        feedback: ResourceClient<Feedback>,
        notifications: ResourceClient<Notification>,
        activity: ResourceClient<ActivityEntry>,
    ) -> Self {
        Self {
            settings,
            rewards,
            feedback,
            notifications,
            activity,
        }
    }

    #[instrument(skip(self))]
    pub async fn settings(&self) -> Result<StoreSettings, StoreError> {
        debug!("Sending request");
        self.settings
            .get(StoreSettings::SINGLETON_ID.to_string())
            .await?
            .ok_or_else(|| StoreError::NotFound(StoreSettings::SINGLETON_ID.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<StoreSettings, StoreError> {
        debug!("Sending request");
        let settings = self
            .settings
            .update(StoreSettings::SINGLETON_ID.to_string(), patch)
            .await?;
        info!(store_name = %settings.store_name, "Store settings updated");
        Ok(settings)
    }

    #[instrument(skip(self))]
    pub async fn active_rewards(&self) -> Result<Vec<LoyaltyReward>, StoreError> {
        debug!("Sending request");
        let mut rewards = self.rewards.query(|reward| reward.active).await?;
        rewards.sort_by_key(|reward| reward.points_required);
        Ok(rewards)
    }

    #[instrument(skip(self))]
    pub async fn submit_feedback(&self, feedback: FeedbackCreate) -> Result<Feedback, StoreError> {
        debug!("Sending request");
        let feedback = self.feedback.create(feedback).await?;
        info!(feedback_id = %feedback.id, rating = feedback.rating, "Feedback received");
        Ok(feedback)
    }

    #[instrument(skip(self))]
    pub async fn list_feedback(&self) -> Result<Vec<Feedback>, StoreError> {
        debug!("Sending request");
        Ok(self.feedback.list().await?)
    }

    /// Mean rating across all feedback; `None` when there is none yet.
    pub async fn average_rating(&self) -> Result<Option<f64>, StoreError> {
        let feedback = self.list_feedback().await?;
        if feedback.is_empty() {
            return Ok(None);
        }
        let sum: u32 = feedback.iter().map(|f| u32::from(f.rating)).sum();
        Ok(Some(f64::from(sum) / feedback.len() as f64))
    }

    /// Newest first.
    #[instrument(skip(self))]
    pub async fn notifications_for(&self, user_id: String) -> Result<Vec<Notification>, StoreError> {
        debug!("Sending request");
        let mut notes = self.notifications.query(move |note| note.user_id == user_id).await?;
        notes.reverse();
        Ok(notes)
    }

    /// Returns whether the notification was unread before.
    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: String) -> Result<bool, StoreError> {
        debug!("Sending request");
        match self.notifications.perform_action(id, NotificationAction::MarkRead).await? {
            NotificationActionResult::MarkRead(was_unread) => Ok(was_unread),
        }
    }

    /// The latest `limit` entries, newest first.
    #[instrument(skip(self))]
    pub async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityEntry>, StoreError> {
        debug!("Sending request");
        let entries = self.activity.list().await?;
        Ok(entries.into_iter().rev().take(limit).collect())
    }
}

impl_client_methods!(StoreClient, rewards, LoyaltyReward, StoreError, loyalty_reward, loyalty_rewards);
impl_write_methods!(StoreClient, rewards, LoyaltyReward, LoyaltyRewardCreate, LoyaltyRewardPatch, StoreError, loyalty_reward);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::{uuid_ids, ResourceActor};
    use crate::domain::{ActivityCreate, NotificationCreate};

    struct Tables {
        store: StoreClient,
        notifications: ResourceClient<Notification>,
        activity: ResourceClient<ActivityEntry>,
    }

    fn spawn_store() -> Tables {
        let (settings_actor, settings) =
            ResourceActor::with_records(4, uuid_ids(), vec![StoreSettings::new("Corner Café")]);
        let (rewards_actor, rewards) = ResourceActor::<LoyaltyReward>::new(4, uuid_ids());
        let (feedback_actor, feedback) = ResourceActor::<Feedback>::new(4, uuid_ids());
        let (notes_actor, notifications) = ResourceActor::<Notification>::new(4, uuid_ids());
        let (activity_actor, activity) = ResourceActor::<ActivityEntry>::new(4, uuid_ids());
        tokio::spawn(settings_actor.run());
        tokio::spawn(rewards_actor.run());
        tokio::spawn(feedback_actor.run());
        tokio::spawn(notes_actor.run());
        tokio::spawn(activity_actor.run());
        Tables {
            store: StoreClient::new(settings, rewards, feedback, notifications.clone(), activity.clone()),
            notifications,
            activity,
        }
    }

    fn feedback(rating: u8) -> FeedbackCreate {
        FeedbackCreate {
            order_id: None,
            table_number: "7".to_string(),
            user_id: None,
            rating,
            comment: String::new(),
        }
    }

    #[tokio::test]
    async fn settings_singleton_is_seeded_and_updatable() {
        let tables = spawn_store();
        assert_eq!(tables.store.settings().await.unwrap().store_name, "Corner Café");

        let patch = SettingsPatch { accepting_orders: Some(false), ..Default::default() };
        let updated = tables.store.update_settings(patch).await.unwrap();
        assert!(!updated.accepting_orders);
    }

    #[tokio::test]
    async fn average_rating_over_all_feedback() {
        let tables = spawn_store();
        assert_eq!(tables.store.average_rating().await.unwrap(), None);

        tables.store.submit_feedback(feedback(5)).await.unwrap();
        tables.store.submit_feedback(feedback(2)).await.unwrap();
        assert_eq!(tables.store.average_rating().await.unwrap(), Some(3.5));
        assert!(tables.store.submit_feedback(feedback(9)).await.is_err());
    }

    #[tokio::test]
    async fn active_rewards_sorted_by_cost() {
        let tables = spawn_store();
        let store = &tables.store;
        let cake = store
            .create_loyalty_reward(LoyaltyRewardCreate { name: "Cake".into(), points_required: 80 })
            .await
            .unwrap();
        store
            .create_loyalty_reward(LoyaltyRewardCreate { name: "Coffee".into(), points_required: 50 })
            .await
            .unwrap();
        store
            .create_loyalty_reward(LoyaltyRewardCreate { name: "Mug".into(), points_required: 200 })
            .await
            .unwrap();
        let retired = LoyaltyRewardPatch { active: Some(false), ..Default::default() };
        store.update_loyalty_reward(cake.id, retired).await.unwrap();

        let names: Vec<_> = store.active_rewards().await.unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Coffee", "Mug"]);
    }

    #[tokio::test]
    async fn notifications_and_activity_newest_first() {
        let tables = spawn_store();
        for title in ["First", "Second"] {
            tables
                .notifications
                .create(NotificationCreate { user_id: "u1".into(), title: title.into(), message: String::new() })
                .await
                .unwrap();
        }
        let notes = tables.store.notifications_for("u1".to_string()).await.unwrap();
        assert_eq!(notes[0].title, "Second");
        assert!(tables.store.mark_read(notes[0].id.clone()).await.unwrap());
        assert!(!tables.store.mark_read(notes[0].id.clone()).await.unwrap());

        for action in ["a", "b", "c"] {
            tables.activity.create(ActivityCreate::new(None, action, "")).await.unwrap();
        }
        let recent: Vec<_> = tables
            .store
            .recent_activity(2)
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.action)
            .collect();
        assert_eq!(recent, vec!["c", "b"]);
    }
}
