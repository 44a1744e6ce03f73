use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::cart::CartSummary;
use crate::clients::{CartClient, OrderClient, PromoClient};
use crate::domain::{discount_for, NotificationCreate, Order, OrderCreate, OrderLineCreate, PromoCode, Session};
use crate::effects::{BackgroundEffect, EffectClient};
use crate::error::CheckoutError;

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub order: Order,
    /// Correlation key of each submitted cart item mapped to the ID of its order line.
    pub line_ids: HashMap<Uuid, String>,
    /// How long the confirmation stays up before moving to the tracking page.
    pub redirect_after: Duration,
}

impl CheckoutReceipt {
    pub fn tracking_route(&self) -> String {
        format!("/order/{}", self.order.id)
    }

    /// Sleeps for the redirect delay and returns the route to move to.
    pub async fn wait_for_redirect(&self) -> String {
        tokio::time::sleep(self.redirect_after).await;
        self.tracking_route()
    }
}

/// Root client that turns a table's cart into a placed order.
///
/// It coordinates the cart service, the orders table and the promo table, and
/// hands bookkeeping to the effect queue.
#[derive(Clone)]
pub struct CheckoutClient {
    cart: CartClient,
    orders: OrderClient,
    promos: PromoClient,
    effects: EffectClient,
    in_flight: Arc<Mutex<HashSet<String>>>,
    redirect_delay: Duration,
}

impl CheckoutClient {
    pub fn new(
        cart: CartClient,
        orders: OrderClient,
        promos: PromoClient,
        effects: EffectClient,
        redirect_delay: Duration,
    ) -> Self {
        Self {
            cart,
            orders,
            promos,
            effects,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            redirect_delay,
        }
    }

    /// Places the table's cart as one order.
    ///
    /// Validation failures make no backend call. A placement failure surfaces the
    /// backend's message and leaves the cart untouched so the customer can retry.
    /// Once the order exists, nothing that follows can fail the submission.
    #[instrument(skip(self, session), fields(user_id = ?session.user_id()))]
    pub async fn submit_order(&self, session: &Session, table: &str) -> Result<CheckoutReceipt, CheckoutError> {
        let table = table.trim();
        if table.is_empty() {
            return Err(CheckoutError::Validation("Table number is required".to_string()));
        }
        let _guard = InFlight::claim(&self.in_flight, table)?;

        let cart = self.cart.summary(table.to_string()).await?;
        if cart.items.is_empty() {
            return Err(CheckoutError::Validation("Your cart is empty".to_string()));
        }
        info!(items = cart.items.len(), subtotal = cart.subtotal, "Submitting order");

        // Step 1: resolve the user
        let user_id = session.user_id().map(str::to_string);

        // Step 2: re-check the promo against the backend
        let promo = self.refetch_promo(&cart).await;
        let discount = promo
            .as_ref()
            .map_or(0.0, |promo| discount_for(promo.discount_type, promo.discount_value, cart.subtotal));

        // Steps 3-5: order, lines and customizations in one placement
        let lines: Vec<OrderLineCreate> = cart.items.iter().map(OrderLineCreate::from_cart_item).collect();
        let params = OrderCreate {
            table_number: table.to_string(),
            user_id: user_id.clone(),
            subtotal: cart.subtotal,
            discount_amount: discount,
            total: (cart.subtotal - discount).max(0.0),
            promo_code: promo.as_ref().map(|promo| promo.code.clone()),
            lines,
        };
        let order = self.orders.place_order(params).await.map_err(|e| {
            error!(error = %e, "Order placement failed, cart kept");
            CheckoutError::Placement(e)
        })?;

        // Step 6: promo usage
        if let Some(promo) = &promo {
            self.effects
                .enqueue(BackgroundEffect::IncrementPromoUsage { promo_id: promo.id.clone() })
                .await;
        }

        // Step 7: notify the customer
        if let Some(user_id) = user_id {
            self.effects
                .enqueue(BackgroundEffect::Notify(NotificationCreate {
                    user_id,
                    title: "Order placed".to_string(),
                    message: format!(
                        "Order #{} for table {} has been received. Total: {:.2}",
                        order.reference(),
                        order.table_number,
                        order.total
                    ),
                }))
                .await;
        }

        // Step 8: take the submitted lines out of the cart
        if let Err(e) = self.cart.clear_submitted(table.to_string(), cart.items).await {
            warn!(order_id = %order.id, error = %e, "Order placed but cart could not be cleared");
        }

        // Step 9: hand back what the confirmation screen needs
        let line_ids = order
            .lines
            .iter()
            .map(|line| (line.correlation_key, line.id.clone()))
            .collect();
        info!(order_id = %order.id, total = order.total, "Order submitted");
        Ok(CheckoutReceipt {
            order,
            line_ids,
            redirect_after: self.redirect_delay,
        })
    }

    /// Current promo parameters, or `None` when the cart has no promo or the code
    /// can no longer be found. Lookup errors are logged, never surfaced.
    async fn refetch_promo(&self, cart: &CartSummary) -> Option<PromoCode> {
        let applied = cart.promo.as_ref()?;
        match self.promos.find_by_code(&applied.code).await {
            Ok(Some(promo)) => {
                debug!(code = %promo.code, "Promo re-fetched");
                Some(promo)
            }
            Ok(None) => {
                warn!(code = %applied.code, "Promo code no longer exists, no discount applied");
                None
            }
            Err(e) => {
                warn!(code = %applied.code, error = %e, "Promo lookup failed, no discount applied");
                None
            }
        }
    }
}

/// Marks a table as submitting until dropped.
struct InFlight {
    tables: Arc<Mutex<HashSet<String>>>,
    table: String,
}

impl InFlight {
    fn claim(tables: &Arc<Mutex<HashSet<String>>>, table: &str) -> Result<Self, CheckoutError> {
        if !tables.lock().insert(table.to_string()) {
            warn!(table, "Submission already in progress");
            return Err(CheckoutError::SubmissionInProgress(table.to_string()));
        }
        Ok(Self {
            tables: Arc::clone(tables),
            table: table.to_string(),
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.tables.lock().remove(&self.table);
    }
}
