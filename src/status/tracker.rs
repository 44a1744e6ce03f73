use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::actor_framework::{ChangeEvent, ChangeKind};
use crate::clients::OrderClient;
use crate::domain::{Order, OrderStatus};
use crate::order_actor::OrderError;

/// Follows one order for the customer's tracking page.
///
/// Dropping the tracker unsubscribes from the feed.
pub struct OrderTracker {
    order_id: String,
    state: watch::Receiver<Option<Order>>,
    task: JoinHandle<()>,
}

impl OrderTracker {
    /// Subscribes before loading the order so no update falls in between.
    pub async fn start(orders: &OrderClient, order_id: String) -> Result<Self, OrderError> {
        let feed = orders.subscribe();
        let initial = orders.get_order(order_id.clone()).await?;
        let (sender, state) = watch::channel(initial);
        let task = tokio::spawn(follow(feed, order_id.clone(), sender));
        info!(order_id = %order_id, "Tracking order");
        Ok(Self { order_id, state, task })
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// Latest known state; `None` if the order does not exist or was deleted.
    pub fn current(&self) -> Option<Order> {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> Option<OrderStatus> {
        self.state.borrow().as_ref().map(|order| order.status)
    }

    /// Waits for the next update. Returns `false` once the feed has closed.
    pub async fn changed(&mut self) -> bool {
        self.state.changed().await.is_ok()
    }
}

impl Drop for OrderTracker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn follow(mut feed: broadcast::Receiver<ChangeEvent<Order>>, order_id: String, state: watch::Sender<Option<Order>>) {
    loop {
        match feed.recv().await {
            Ok(event) => {
                if event.record_id() != Some(&order_id) {
                    continue;
                }
                debug!(order_id = %order_id, kind = %event.kind, "Order changed");
                let next = match event.kind {
                    ChangeKind::Delete => None,
                    ChangeKind::Insert | ChangeKind::Update => event.new,
                };
                state.send_replace(next);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(order_id = %order_id, skipped, "Order feed lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    debug!(order_id = %order_id, "Order feed closed");
}
