use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::actor_framework::{ChangeEvent, ChangeKind};
use crate::clients::OrderClient;
use crate::domain::Order;
use crate::order_actor::OrderError;

/// Live set of active orders for the barista dashboard.
pub struct BaristaBoard {
    orders: Arc<RwLock<HashMap<String, Order>>>,
    version: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl BaristaBoard {
    pub async fn start(client: &OrderClient) -> Result<Self, OrderError> {
        let feed = client.subscribe();
        let initial: HashMap<_, _> = client
            .active_orders()
            .await?
            .into_iter()
            .map(|order| (order.id.clone(), order))
            .collect();
        info!(active = initial.len(), "Barista board loaded");

        let orders = Arc::new(RwLock::new(initial));
        let (bump, version) = watch::channel(0);
        let task = tokio::spawn(follow(feed, Arc::clone(&orders), bump));
        Ok(Self { orders, version, task })
    }

    /// Active orders, oldest first.
    pub fn snapshot(&self) -> Vec<Order> {
        let mut orders: Vec<_> = self.orders.read().values().cloned().collect();
        orders.sort_by_key(|order| order.created_at);
        orders
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }

    /// Waits until another event has been applied. Returns `false` once the feed has closed.
    pub async fn changed(&mut self) -> bool {
        self.version.changed().await.is_ok()
    }
}

impl Drop for BaristaBoard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Inserts, overwrites or removes per event. Orders that leave the active statuses
/// drop off the board.
pub fn apply_to_board(board: &mut HashMap<String, Order>, event: ChangeEvent<Order>) {
    match (event.kind, event.new, event.old) {
        (ChangeKind::Insert | ChangeKind::Update, Some(order), _) => {
            if order.status.is_active() {
                board.insert(order.id.clone(), order);
            } else {
                board.remove(&order.id);
            }
        }
        (ChangeKind::Delete, _, Some(old)) => {
            board.remove(&old.id);
        }
        (kind, _, _) => debug!(%kind, "Ignoring change event without a record"),
    }
}

async fn follow(
    mut feed: broadcast::Receiver<ChangeEvent<Order>>,
    orders: Arc<RwLock<HashMap<String, Order>>>,
    bump: watch::Sender<u64>,
) {
    loop {
        match feed.recv().await {
            Ok(event) => {
                apply_to_board(&mut orders.write(), event);
                bump.send_modify(|version| *version += 1);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Barista board lagged behind the order feed");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    debug!("Barista board feed closed");
}
