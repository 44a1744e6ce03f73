use chrono::Utc;
use uuid::Uuid;

use crate::actor_framework::Entity;
use crate::domain::{round_currency, Order, OrderCreate, OrderLine, OrderPatch, OrderStatus};
use super::actions::{OrderAction, OrderActionResult};

impl Entity for Order {
    type Id = String;
    type CreateParams = OrderCreate;
    type Patch = OrderPatch;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;

    const TABLE: &'static str = "orders";

    fn id(&self) -> &String {
        &self.id
    }

    /// Places the order and all of its lines in one step.
    ///
    /// Every line gets its own ID here; the caller's correlation key is kept on the
    /// line so the caller can match lines back to cart items without relying on order.
    /// The order always starts out `pending`.
    fn from_create_params(id: String, params: OrderCreate) -> Result<Self, String> {
        if params.table_number.trim().is_empty() {
            return Err("Table number is required".to_string());
        }
        if params.lines.is_empty() {
            return Err("An order needs at least one item".to_string());
        }
        if let Some(line) = params.lines.iter().find(|line| line.quantity == 0) {
            return Err(format!("Invalid quantity for {}", line.product_name));
        }
        if params.total < 0.0 || params.subtotal < 0.0 || params.discount_amount < 0.0 {
            return Err("Order amounts cannot be negative".to_string());
        }

        let lines = params
            .lines
            .into_iter()
            .map(|line| OrderLine {
                id: Uuid::new_v4().to_string(),
                correlation_key: line.correlation_key,
                product_id: line.product_id,
                product_name: line.product_name,
                unit_price: line.unit_price,
                quantity: line.quantity,
                customizations: line.customizations,
            })
            .collect();

        let now = Utc::now();
        Ok(Self {
            id,
            table_number: params.table_number.trim().to_string(),
            user_id: params.user_id,
            status: OrderStatus::Pending,
            subtotal: round_currency(params.subtotal),
            discount_amount: round_currency(params.discount_amount),
            total: round_currency(params.total),
            promo_code: params.promo_code,
            lines,
            created_at: now,
            updated_at: now,
            served_at: None,
        })
    }

    /// Any status may follow any other; staff use this to correct mistakes.
    fn on_update(&mut self, patch: OrderPatch) -> Result<(), String> {
        if let Some(status) = patch.status {
            self.status = status;
            if status == OrderStatus::Served && self.served_at.is_none() {
                self.served_at = Some(Utc::now());
            }
        }
        if let Some(table_number) = patch.table_number {
            if table_number.trim().is_empty() {
                return Err("Table number is required".to_string());
            }
            self.table_number = table_number.trim().to_string();
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, String> {
        match action {
            OrderAction::MarkServed => {
                if self.status == OrderStatus::Cancelled {
                    return Err(format!("Order {} was cancelled", self.id));
                }
                let served_at = *self.served_at.get_or_insert_with(Utc::now);
                self.status = OrderStatus::Served;
                self.updated_at = Utc::now();
                Ok(OrderActionResult::MarkServed { served_at })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CartItem, OrderLineCreate};

    fn params() -> OrderCreate {
        let item = CartItem::new("p1", "Cortado", 3.5, 2);
        OrderCreate {
            table_number: " 7 ".into(),
            user_id: None,
            subtotal: 7.0,
            discount_amount: 0.0,
            total: 7.0,
            promo_code: None,
            lines: vec![OrderLineCreate::from_cart_item(&item)],
        }
    }

    #[test]
    fn placed_orders_start_pending_with_line_ids() {
        let params = params();
        let key = params.lines[0].correlation_key;
        let order = Order::from_create_params("o1".into(), params).unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.table_number, "7");
        assert_eq!(order.lines[0].correlation_key, key);
        assert!(!order.lines[0].id.is_empty());
    }

    #[test]
    fn rejects_empty_orders() {
        let empty = OrderCreate { lines: Vec::new(), ..params() };
        assert!(Order::from_create_params("o1".into(), empty).is_err());

        let no_table = OrderCreate { table_number: "  ".into(), ..params() };
        assert!(Order::from_create_params("o1".into(), no_table).is_err());
    }

    #[test]
    fn status_can_move_backwards() {
        let mut order = Order::from_create_params("o1".into(), params()).unwrap();
        order.on_update(OrderPatch::status(OrderStatus::Ready)).unwrap();
        order.on_update(OrderPatch::status(OrderStatus::Preparing)).unwrap();
        assert_eq!(order.status, OrderStatus::Preparing);
    }

    #[test]
    fn mark_served_is_idempotent_and_refuses_cancelled() {
        let mut order = Order::from_create_params("o1".into(), params()).unwrap();
        let OrderActionResult::MarkServed { served_at } = order.handle_action(OrderAction::MarkServed).unwrap();
        let OrderActionResult::MarkServed { served_at: again } = order.handle_action(OrderAction::MarkServed).unwrap();
        assert_eq!(served_at, again);
        assert_eq!(order.status, OrderStatus::Served);

        order.status = OrderStatus::Cancelled;
        assert!(order.handle_action(OrderAction::MarkServed).is_err());
    }
}
