use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Params, and Actions)
// =============================================================================

/// Trait that any backend record must implement to be served by a [`ResourceActor`].
///
/// Each implementor is one "table" of the backend: it gets insert/select/update/delete,
/// a realtime change feed, and server-side actions (the RPC surface).
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;

    // --- Custom Actions (server-side procedures) ---
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    /// Table name, used in logs, errors and change events.
    const TABLE: &'static str;

    fn id(&self) -> &Self::Id;

    /// Construct the full record from the generated ID and the insert params.
    /// Records keyed by something in the params (a profile keyed by its identity)
    /// may ignore the generated ID.
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, String>;

    /// Key that must be unique across the table, if any.
    fn unique_key(&self) -> Option<String> {
        None
    }

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), String> {
        Ok(())
    }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), String>;
    fn on_delete(&self) -> Result<(), String> {
        Ok(())
    }

    // --- Action Handler ---

    /// Handle a custom domain-specific action. Runs against a copy of the record;
    /// the copy is committed only when this returns `Ok`.
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, String>;
}

/// Errors surfaced by the generic backend layer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
    #[error("{table} not found: {id}")]
    NotFound { table: &'static str, id: String },
    #[error("{table} already contains {key}")]
    Conflict { table: &'static str, key: String },
    #[error("{0}")]
    Rejected(String),
}

// =============================================================================
// 2. CHANGE FEED
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Insert => write!(f, "INSERT"),
            ChangeKind::Update => write!(f, "UPDATE"),
            ChangeKind::Delete => write!(f, "DELETE"),
        }
    }
}

/// One realtime event: `new` is absent for deletes, `old` is absent for inserts.
#[derive(Debug, Clone)]
pub struct ChangeEvent<T> {
    pub kind: ChangeKind,
    pub new: Option<T>,
    pub old: Option<T>,
}

impl<T: Entity> ChangeEvent<T> {
    /// ID of the record this event is about.
    pub fn record_id(&self) -> Option<&T::Id> {
        self.new.as_ref().or(self.old.as_ref()).map(|item| item.id())
    }
}

// =============================================================================
// 3. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Row filter for select queries.
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Query {
        filter: Filter<T>,
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

impl<T: Entity> Debug for ResourceRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceRequest::Create { params, .. } => {
                f.debug_struct("Create").field("params", params).finish_non_exhaustive()
            }
            ResourceRequest::Get { id, .. } => f.debug_struct("Get").field("id", id).finish_non_exhaustive(),
            ResourceRequest::List { .. } => f.debug_struct("List").finish_non_exhaustive(),
            ResourceRequest::Query { .. } => f.debug_struct("Query").finish_non_exhaustive(),
            ResourceRequest::Update { id, patch, .. } => f
                .debug_struct("Update")
                .field("id", id)
                .field("patch", patch)
                .finish_non_exhaustive(),
            ResourceRequest::Delete { id, .. } => f.debug_struct("Delete").field("id", id).finish_non_exhaustive(),
            ResourceRequest::Action { id, action, .. } => f
                .debug_struct("Action")
                .field("id", id)
                .field("action", action)
                .finish_non_exhaustive(),
        }
    }
}

// =============================================================================
// 4. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    // Insertion order, so selects come back stable.
    sequence: Vec<T::Id>,
    changes: broadcast::Sender<ChangeEvent<T>>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        Self::with_records(buffer_size, next_id_fn, Vec::new())
    }

    /// Same as [`ResourceActor::new`], with the table pre-populated.
    pub fn with_records(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
        records: Vec<T>,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (changes, _) = broadcast::channel(buffer_size.max(16));
        let mut actor = Self {
            receiver,
            store: HashMap::new(),
            sequence: Vec::new(),
            changes: changes.clone(),
            next_id_fn: Box::new(next_id_fn),
        };
        for record in records {
            actor.sequence.push(record.id().clone());
            actor.store.insert(record.id().clone(), record);
        }
        let client = ResourceClient::new(sender, changes);
        (actor, client)
    }

    pub async fn run(mut self) {
        info!(table = T::TABLE, "ResourceActor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { respond_to } => {
                    let _ = respond_to.send(Ok(self.select(|_| true)));
                }
                ResourceRequest::Query { filter, respond_to } => {
                    let _ = respond_to.send(Ok(self.select(filter)));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action));
                }
            }
        }
        info!(table = T::TABLE, "ResourceActor stopped");
    }

    fn select(&self, filter: impl Fn(&T) -> bool) -> Vec<T> {
        self.sequence
            .iter()
            .filter_map(|id| self.store.get(id))
            .filter(|item| filter(*item))
            .cloned()
            .collect()
    }

    fn handle_create(&mut self, params: T::CreateParams) -> Result<T, FrameworkError> {
        let generated = (self.next_id_fn)();
        let mut item = T::from_create_params(generated, params).map_err(FrameworkError::Rejected)?;
        item.on_create().map_err(FrameworkError::Rejected)?;

        let id = item.id().clone();
        if self.store.contains_key(&id) {
            return Err(FrameworkError::Conflict { table: T::TABLE, key: id.to_string() });
        }
        self.ensure_unique(&item)?;

        debug!(table = T::TABLE, id = %id, "Record inserted");
        self.store.insert(id.clone(), item.clone());
        self.sequence.push(id);
        self.publish(ChangeKind::Insert, Some(item.clone()), None);
        Ok(item)
    }

    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        let current = self.find(&id)?.clone();
        let mut next = current.clone();
        next.on_update(patch).map_err(FrameworkError::Rejected)?;
        self.ensure_unique(&next)?;

        self.store.insert(id, next.clone());
        self.publish(ChangeKind::Update, Some(next.clone()), Some(current));
        Ok(next)
    }

    fn handle_delete(&mut self, id: T::Id) -> Result<(), FrameworkError> {
        self.find(&id)?.on_delete().map_err(FrameworkError::Rejected)?;
        let removed = self.store.remove(&id);
        self.sequence.retain(|existing| existing != &id);
        debug!(table = T::TABLE, id = %id, "Record deleted");
        self.publish(ChangeKind::Delete, None, removed);
        Ok(())
    }

    fn handle_action(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        let current = self.find(&id)?.clone();
        let mut next = current.clone();
        let result = next.handle_action(action).map_err(FrameworkError::Rejected)?;

        self.store.insert(id, next.clone());
        self.publish(ChangeKind::Update, Some(next), Some(current));
        Ok(result)
    }

    fn find(&self, id: &T::Id) -> Result<&T, FrameworkError> {
        self.store
            .get(id)
            .ok_or_else(|| FrameworkError::NotFound { table: T::TABLE, id: id.to_string() })
    }

    fn ensure_unique(&self, item: &T) -> Result<(), FrameworkError> {
        let Some(key) = item.unique_key() else {
            return Ok(());
        };
        let taken = self
            .store
            .values()
            .any(|other| other.id() != item.id() && other.unique_key().as_deref() == Some(key.as_str()));
        if taken {
            warn!(table = T::TABLE, key = %key, "Unique key already taken");
            return Err(FrameworkError::Conflict { table: T::TABLE, key });
        }
        Ok(())
    }

    fn publish(&self, kind: ChangeKind, new: Option<T>, old: Option<T>) {
        // No subscribers is not an error.
        let _ = self.changes.send(ChangeEvent { kind, new, old });
    }
}

// =============================================================================
// 5. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
    changes: broadcast::Sender<ChangeEvent<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>, changes: broadcast::Sender<ChangeEvent<T>>) -> Self {
        Self { sender, changes }
    }

    async fn call<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        self.call(|respond_to| ResourceRequest::List { respond_to }).await
    }

    pub async fn query(
        &self,
        filter: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<Vec<T>, FrameworkError> {
        let filter: Filter<T> = Box::new(filter);
        self.call(|respond_to| ResourceRequest::Query { filter, respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.call(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }

    /// Subscribe to the table's realtime change feed. Drop the receiver to unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent<T>> {
        self.changes.subscribe()
    }
}

/// ID generator producing random UUID strings, the way the backend keys its rows.
pub fn uuid_ids() -> impl Fn() -> String + Send + Sync + 'static {
    || uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// 6. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Tab {
        id: String,
        label: String,
        stamps: u32,
    }

    #[derive(Debug)]
    struct TabCreate {
        label: String,
    }

    #[derive(Debug)]
    struct TabPatch {
        label: Option<String>,
    }

    #[derive(Debug)]
    enum TabAction {
        Stamp,
        Redeem(u32),
    }

    impl Entity for Tab {
        type Id = String;
        type CreateParams = TabCreate;
        type Patch = TabPatch;
        type Action = TabAction;
        type ActionResult = u32;

        const TABLE: &'static str = "tabs";

        fn id(&self) -> &String {
            &self.id
        }

        fn from_create_params(id: String, params: TabCreate) -> Result<Self, String> {
            Ok(Self { id, label: params.label, stamps: 0 })
        }

        fn unique_key(&self) -> Option<String> {
            Some(self.label.clone())
        }

        fn on_create(&mut self) -> Result<(), String> {
            if self.label.is_empty() {
                return Err("label is required".to_string());
            }
            Ok(())
        }

        fn on_update(&mut self, patch: TabPatch) -> Result<(), String> {
            if let Some(label) = patch.label {
                self.label = label;
            }
            Ok(())
        }

        fn handle_action(&mut self, action: TabAction) -> Result<u32, String> {
            match action {
                TabAction::Stamp => {
                    self.stamps += 1;
                    Ok(self.stamps)
                }
                TabAction::Redeem(cost) => {
                    // Mutate first, then fail: the actor must discard the copy.
                    self.stamps = self.stamps.saturating_sub(cost);
                    if self.stamps == 0 {
                        return Err(format!("not enough stamps for {}", cost));
                    }
                    Ok(self.stamps)
                }
            }
        }
    }

    fn counter_ids() -> impl Fn() -> String + Send + Sync + 'static {
        let counter = Arc::new(AtomicU64::new(1));
        move || format!("tab_{}", counter.fetch_add(1, Ordering::SeqCst))
    }

    fn spawn_tabs() -> ResourceClient<Tab> {
        let (actor, client) = ResourceActor::new(10, counter_ids());
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_resource_actor_with_actions() {
        let client = spawn_tabs();

        let tab = client.create(TabCreate { label: "window".into() }).await.unwrap();
        assert_eq!(tab.id, "tab_1");

        let stamps = client.perform_action(tab.id.clone(), TabAction::Stamp).await.unwrap();
        assert_eq!(stamps, 1);

        let stored = client.get(tab.id.clone()).await.unwrap().unwrap();
        assert_eq!(stored.stamps, 1);
    }

    #[tokio::test]
    async fn failed_action_leaves_record_untouched() {
        let client = spawn_tabs();
        let tab = client.create(TabCreate { label: "bar".into() }).await.unwrap();
        client.perform_action(tab.id.clone(), TabAction::Stamp).await.unwrap();

        let err = client.perform_action(tab.id.clone(), TabAction::Redeem(5)).await.unwrap_err();
        assert!(matches!(err, FrameworkError::Rejected(_)));

        let stored = client.get(tab.id).await.unwrap().unwrap();
        assert_eq!(stored.stamps, 1);
    }

    #[tokio::test]
    async fn rejects_invalid_and_duplicate_records() {
        let client = spawn_tabs();

        let err = client.create(TabCreate { label: String::new() }).await.unwrap_err();
        assert_eq!(err, FrameworkError::Rejected("label is required".to_string()));

        client.create(TabCreate { label: "patio".into() }).await.unwrap();
        let err = client.create(TabCreate { label: "patio".into() }).await.unwrap_err();
        assert!(matches!(err, FrameworkError::Conflict { table: "tabs", .. }));
        assert_eq!(client.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_records_report_not_found() {
        let client = spawn_tabs();
        let err = client.update("tab_9".into(), TabPatch { label: None }).await.unwrap_err();
        assert_eq!(err, FrameworkError::NotFound { table: "tabs", id: "tab_9".into() });
        assert!(client.delete("tab_9".into()).await.is_err());
    }

    #[tokio::test]
    async fn query_and_list_keep_insertion_order() {
        let client = spawn_tabs();
        for label in ["a", "b", "c"] {
            client.create(TabCreate { label: label.into() }).await.unwrap();
        }
        client.delete("tab_2".into()).await.unwrap();

        let labels: Vec<String> = client.list().await.unwrap().into_iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["a", "c"]);

        let only_c = client.query(|t: &Tab| t.label == "c").await.unwrap();
        assert_eq!(only_c.len(), 1);
    }

    #[tokio::test]
    async fn change_feed_reports_insert_update_delete() {
        let client = spawn_tabs();
        let mut feed = client.subscribe();

        let tab = client.create(TabCreate { label: "door".into() }).await.unwrap();
        client.update(tab.id.clone(), TabPatch { label: Some("front door".into()) }).await.unwrap();
        client.delete(tab.id.clone()).await.unwrap();

        let insert = feed.recv().await.unwrap();
        assert_eq!(insert.kind, ChangeKind::Insert);
        assert!(insert.old.is_none());

        let update = feed.recv().await.unwrap();
        assert_eq!(update.kind, ChangeKind::Update);
        assert_eq!(update.old.unwrap().label, "door");
        assert_eq!(update.new.unwrap().label, "front door");

        let delete = feed.recv().await.unwrap();
        assert_eq!(delete.kind, ChangeKind::Delete);
        assert_eq!(delete.record_id(), Some(&tab.id));
    }

    #[tokio::test]
    async fn seeded_records_are_served() {
        let seed = Tab { id: "house".into(), label: "house".into(), stamps: 3 };
        let (actor, client) = ResourceActor::with_records(4, || "house".to_string(), vec![seed.clone()]);
        tokio::spawn(actor.run());

        assert_eq!(client.get("house".into()).await.unwrap(), Some(seed));
        let err = client.create(TabCreate { label: "other".into() }).await.unwrap_err();
        assert!(matches!(err, FrameworkError::Conflict { .. }));
    }
}
