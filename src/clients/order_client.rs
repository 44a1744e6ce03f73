use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

use crate::actor_framework::{ChangeEvent, ResourceClient};
use crate::domain::{Order, OrderCreate, OrderPatch, OrderStatus};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};

/// Client for the orders table.
///
/// Placement is a single create of the whole aggregate, so an order never exists
/// without its lines. Status writes are unconstrained; staff may correct any mistake.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    #[instrument(fields(table = %params.table_number, lines = params.lines.len()), skip(self, params))]
    pub async fn place_order(&self, params: OrderCreate) -> Result<Order, OrderError> {
        debug!("Sending request");
        let order = self.inner.create(params).await?;
        info!(order_id = %order.id, total = order.total, "Order placed");
        Ok(order)
    }

    /// Orders still on the barista board, oldest first.
    #[instrument(skip(self))]
    pub async fn active_orders(&self) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        Ok(self.inner.query(|order| order.status.is_active()).await?)
    }

    #[instrument(skip(self))]
    pub async fn orders_for_table(&self, table: String) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        Ok(self.inner.query(move |order| order.table_number == table).await?)
    }

    #[instrument(skip(self))]
    pub async fn orders_for_user(&self, user_id: String) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        Ok(self
            .inner
            .query(move |order| order.user_id.as_deref() == Some(user_id.as_str()))
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, id: String, status: OrderStatus) -> Result<Order, OrderError> {
        debug!("Sending request");
        let order = self.inner.update(id, OrderPatch::status(status)).await?;
        info!(order_id = %order.id, status = %order.status, "Order status updated");
        Ok(order)
    }

    pub async fn cancel_order(&self, id: String) -> Result<Order, OrderError> {
        self.update_status(id, OrderStatus::Cancelled).await
    }

    /// Server-side procedure: sets `served` and stamps the time. Serving twice keeps the first stamp.
    #[instrument(skip(self))]
    pub async fn mark_served(&self, id: String) -> Result<DateTime<Utc>, OrderError> {
        debug!("Sending request");
        match self.inner.perform_action(id, OrderAction::MarkServed).await? {
            OrderActionResult::MarkServed { served_at } => Ok(served_at),
        }
    }

    /// Realtime feed of every change to the orders table.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent<Order>> {
        self.inner.subscribe()
    }
}

impl_client_methods!(OrderClient, inner, Order, OrderError, order, orders);
