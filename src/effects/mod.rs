//! Best-effort background effects.
//!
//! Side effects of a checkout or an admin operation (promo usage bookkeeping,
//! notifications, the activity log) must never fail the operation that caused them.
//! Callers hand them to an [`EffectClient`]; the [`EffectWorker`] runs each one with
//! a bounded number of attempts and logs what could not be done.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::domain::{ActivityCreate, ActivityEntry, Notification, NotificationCreate, PromoCode};
use crate::promo_actor::PromoCodeAction;

#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundEffect {
    IncrementPromoUsage { promo_id: String },
    Notify(NotificationCreate),
    LogActivity(ActivityCreate),
}

impl BackgroundEffect {
    pub fn name(&self) -> &'static str {
        match self {
            BackgroundEffect::IncrementPromoUsage { .. } => "increment_promo_usage",
            BackgroundEffect::Notify(_) => "notify",
            BackgroundEffect::LogActivity(_) => "log_activity",
        }
    }
}

/// Attempts per effect and the linear backoff step between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Wait after the `attempt`-th failure.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(250),
        }
    }
}

/// Tables the worker writes to.
#[derive(Clone)]
pub struct EffectTargets {
    pub promo_codes: ResourceClient<PromoCode>,
    pub notifications: ResourceClient<Notification>,
    pub activity: ResourceClient<ActivityEntry>,
}

pub struct EffectWorker {
    receiver: mpsc::Receiver<BackgroundEffect>,
    targets: EffectTargets,
    policy: RetryPolicy,
}

impl EffectWorker {
    pub fn new(buffer_size: usize, policy: RetryPolicy, targets: EffectTargets) -> (Self, EffectClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let worker = Self {
            receiver,
            targets,
            policy,
        };
        (worker, EffectClient { sender })
    }

    /// Runs effects concurrently until every [`EffectClient`] is dropped, then
    /// waits for the ones still in flight.
    pub async fn run(mut self) {
        info!(max_attempts = self.policy.max_attempts, "EffectWorker starting");
        let mut in_flight = JoinSet::new();
        loop {
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(effect) => {
                        in_flight.spawn(execute(self.targets.clone(), self.policy, effect));
                    }
                    None => break,
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Effect task panicked");
                    }
                }
            }
        }
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Effect task panicked");
            }
        }
        info!("EffectWorker stopped");
    }
}

#[instrument(name = "effect", skip(targets, policy), fields(kind = effect.name()))]
async fn execute(targets: EffectTargets, policy: RetryPolicy, effect: BackgroundEffect) {
    let max_attempts = policy.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        match apply(&targets, &effect).await {
            Ok(()) => {
                debug!(attempt, "Effect applied");
                return;
            }
            Err(e) if is_transient(&e) && attempt < max_attempts => {
                warn!(attempt, error = %e, "Effect failed, retrying");
                tokio::time::sleep(policy.delay_for(attempt)).await;
            }
            Err(e) => {
                error!(attempt, error = %e, "Effect dropped");
                return;
            }
        }
    }
}

// A rejection or a missing row will fail the same way on every attempt.
fn is_transient(err: &FrameworkError) -> bool {
    matches!(err, FrameworkError::ActorClosed | FrameworkError::ActorDropped)
}

async fn apply(targets: &EffectTargets, effect: &BackgroundEffect) -> Result<(), FrameworkError> {
    match effect {
        BackgroundEffect::IncrementPromoUsage { promo_id } => {
            targets
                .promo_codes
                .perform_action(promo_id.clone(), PromoCodeAction::IncrementUsage)
                .await?;
        }
        BackgroundEffect::Notify(notification) => {
            targets.notifications.create(notification.clone()).await?;
        }
        BackgroundEffect::LogActivity(entry) => {
            targets.activity.create(entry.clone()).await?;
        }
    }
    Ok(())
}

/// Producer side of the queue. Enqueueing never fails the caller.
#[derive(Clone)]
pub struct EffectClient {
    sender: mpsc::Sender<BackgroundEffect>,
}

impl EffectClient {
    pub fn new(sender: mpsc::Sender<BackgroundEffect>) -> Self {
        Self { sender }
    }

    pub async fn enqueue(&self, effect: BackgroundEffect) {
        debug!(kind = effect.name(), "Enqueueing effect");
        if let Err(e) = self.sender.send(effect).await {
            warn!(kind = e.0.name(), "Effect queue closed, effect dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::{uuid_ids, ResourceActor};
    use crate::domain::{DiscountType, PromoCodeCreate};
    use crate::mock_framework::{create_mock_client, expect_create};
    use chrono::Utc;

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(1),
        }
    }

    fn spawn_tables() -> EffectTargets {
        let (codes_actor, promo_codes) = ResourceActor::<PromoCode>::new(8, uuid_ids());
        let (notes_actor, notifications) = ResourceActor::<Notification>::new(8, uuid_ids());
        let (activity_actor, activity) = ResourceActor::<ActivityEntry>::new(8, uuid_ids());
        tokio::spawn(codes_actor.run());
        tokio::spawn(notes_actor.run());
        tokio::spawn(activity_actor.run());
        EffectTargets {
            promo_codes,
            notifications,
            activity,
        }
    }

    #[test]
    fn backoff_is_linear() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for(3), Duration::from_millis(750));
    }

    #[tokio::test]
    async fn effects_land_in_their_tables() {
        let targets = spawn_tables();
        let promo = targets
            .promo_codes
            .create(PromoCodeCreate::new("TEN", DiscountType::Percentage, 10.0))
            .await
            .unwrap();

        let (worker, effects) = EffectWorker::new(8, fast(), targets.clone());
        let handle = tokio::spawn(worker.run());
        effects
            .enqueue(BackgroundEffect::IncrementPromoUsage { promo_id: promo.id.clone() })
            .await;
        effects
            .enqueue(BackgroundEffect::Notify(NotificationCreate {
                user_id: "u1".into(),
                title: "Order placed".into(),
                message: "Thanks".into(),
            }))
            .await;
        effects
            .enqueue(BackgroundEffect::LogActivity(ActivityCreate::new(Some("admin"), "staff.create", "Bo")))
            .await;
        drop(effects);
        handle.await.unwrap();

        let promo = targets.promo_codes.get(promo.id).await.unwrap().unwrap();
        assert_eq!(promo.used_count, 1);
        assert_eq!(targets.notifications.list().await.unwrap().len(), 1);
        assert_eq!(targets.activity.list().await.unwrap()[0].action, "staff.create");
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let targets = spawn_tables();
        let (worker, effects) = EffectWorker::new(8, fast(), targets.clone());
        let handle = tokio::spawn(worker.run());

        effects
            .enqueue(BackgroundEffect::IncrementPromoUsage { promo_id: "missing".into() })
            .await;
        drop(effects);
        handle.await.unwrap();
        assert!(targets.promo_codes.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn transient_failure_is_retried() {
        let mut targets = spawn_tables();
        let (notifications, mut notes_rx) = create_mock_client::<Notification>(8);
        targets.notifications = notifications;

        let (worker, effects) = EffectWorker::new(8, fast(), targets);
        let handle = tokio::spawn(worker.run());
        let create = NotificationCreate {
            user_id: "u1".into(),
            title: "Ready".into(),
            message: "Your order is ready".into(),
        };
        effects.enqueue(BackgroundEffect::Notify(create.clone())).await;

        let (first, responder) = expect_create(&mut notes_rx).await.expect("Expected first attempt");
        assert_eq!(first, create);
        responder.send(Err(FrameworkError::ActorDropped)).unwrap();

        let (second, responder) = expect_create(&mut notes_rx).await.expect("Expected a retry");
        assert_eq!(second, create);
        responder
            .send(Ok(Notification {
                id: "n1".into(),
                user_id: second.user_id,
                title: second.title,
                message: second.message,
                read: false,
                created_at: Utc::now(),
            }))
            .unwrap();

        drop(effects);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn retries_stop_at_max_attempts() {
        let mut targets = spawn_tables();
        let (activity, mut activity_rx) = create_mock_client::<ActivityEntry>(8);
        targets.activity = activity;

        let policy = RetryPolicy {
            max_attempts: 2,
            backoff: Duration::from_millis(1),
        };
        let (worker, effects) = EffectWorker::new(8, policy, targets);
        let handle = tokio::spawn(worker.run());
        effects
            .enqueue(BackgroundEffect::LogActivity(ActivityCreate::new(None, "menu.update", "")))
            .await;
        drop(effects);

        for _ in 0..2 {
            let (_, responder) = expect_create(&mut activity_rx).await.expect("Expected an attempt");
            responder.send(Err(FrameworkError::ActorClosed)).unwrap();
        }
        handle.await.unwrap();
        assert!(activity_rx.try_recv().is_err());
    }
}
