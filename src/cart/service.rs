use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::clients::CartClient;
use crate::domain::{CartItem, Promo};
use crate::messages::{CartRequest, ServiceResponse};
use super::storage::{load_state, save_state, CartStorage};
use super::{CartError, CartState};

// =============================================================================
// CART SERVICE
// =============================================================================

/// Owns every table's cart. Mutations are applied one message at a time and the
/// whole state is written to storage after each of them.
pub struct CartService {
    receiver: mpsc::Receiver<CartRequest>,
    state: CartState,
    storage: Box<dyn CartStorage>,
}

impl CartService {
    /// Rehydrates from `storage` and returns the service with its client.
    pub fn new(buffer_size: usize, storage: impl CartStorage) -> (Self, CartClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let state = load_state(&storage);
        let service = Self {
            receiver,
            state,
            storage: Box::new(storage),
        };
        (service, CartClient::new(sender))
    }

    #[instrument(name = "cart_service", skip(self))]
    pub async fn run(mut self) {
        info!(tables = self.state.tables().count(), "CartService starting");
        while let Some(mut msg) = self.receiver.recv().await {
            // Tables are keyed by their trimmed identifier
            let table = msg.table_mut();
            *table = table.trim().to_string();
            match msg {
                CartRequest::AddItem { table, item, respond_to } => {
                    self.handle_add_item(table, item, respond_to);
                }
                CartRequest::RemoveItem { table, product_id, customization_ids, respond_to } => {
                    self.handle_remove_item(table, product_id, customization_ids, respond_to);
                }
                CartRequest::UpdateQuantity { table, product_id, quantity, customization_ids, respond_to } => {
                    self.handle_update_quantity(table, product_id, quantity, customization_ids, respond_to);
                }
                CartRequest::ClearCart { table, respond_to } => {
                    self.handle_clear_cart(table, respond_to);
                }
                CartRequest::ClearSubmitted { table, items, respond_to } => {
                    self.handle_clear_submitted(table, items, respond_to);
                }
                CartRequest::ApplyPromoCode { table, promo, respond_to } => {
                    self.handle_apply_promo(table, promo, respond_to);
                }
                CartRequest::RemovePromoCode { table, respond_to } => {
                    self.handle_remove_promo(table, respond_to);
                }
                CartRequest::GetTableItems { table, respond_to } => {
                    let _ = respond_to.send(Ok(self.state.get_table_items(&table).to_vec()));
                }
                CartRequest::Summary { table, respond_to } => {
                    let _ = respond_to.send(Ok(self.state.summary(&table)));
                }
            }
        }
        info!("CartService stopped");
    }

    #[instrument(fields(table = %table, product_id = %item.product_id), skip(self, table, item, respond_to))]
    fn handle_add_item(&mut self, table: String, item: CartItem, respond_to: ServiceResponse<Vec<CartItem>, CartError>) {
        debug!(quantity = item.quantity, "Processing add_item request");
        if let Err(e) = require_table(&table) {
            let _ = respond_to.send(Err(e));
            return;
        }
        self.state.add_item(item, &table);
        self.persist();
        let _ = respond_to.send(Ok(self.state.get_table_items(&table).to_vec()));
    }

    #[instrument(fields(table = %table, product_id = %product_id), skip(self, table, product_id, customization_ids, respond_to))]
    fn handle_remove_item(
        &mut self,
        table: String,
        product_id: String,
        customization_ids: Option<Vec<String>>,
        respond_to: ServiceResponse<Vec<CartItem>, CartError>,
    ) {
        debug!("Processing remove_item request");
        self.state.remove_item(&product_id, &table, customization_ids.as_deref());
        self.persist();
        let _ = respond_to.send(Ok(self.state.get_table_items(&table).to_vec()));
    }

    #[instrument(fields(table = %table, product_id = %product_id), skip(self, table, product_id, customization_ids, respond_to))]
    fn handle_update_quantity(
        &mut self,
        table: String,
        product_id: String,
        quantity: i64,
        customization_ids: Option<Vec<String>>,
        respond_to: ServiceResponse<Vec<CartItem>, CartError>,
    ) {
        debug!("Processing update_quantity request");
        self.state
            .update_quantity(&product_id, quantity, &table, customization_ids.as_deref());
        self.persist();
        let _ = respond_to.send(Ok(self.state.get_table_items(&table).to_vec()));
    }

    #[instrument(fields(table = %table), skip(self, table, respond_to))]
    fn handle_clear_cart(&mut self, table: String, respond_to: ServiceResponse<(), CartError>) {
        debug!("Processing clear_cart request");
        self.state.clear_cart(&table);
        self.persist();
        let _ = respond_to.send(Ok(()));
    }

    #[instrument(fields(table = %table, lines = items.len()), skip(self, table, items, respond_to))]
    fn handle_clear_submitted(&mut self, table: String, items: Vec<CartItem>, respond_to: ServiceResponse<(), CartError>) {
        debug!("Processing clear_submitted request");
        self.state.clear_submitted(&table, &items);
        self.persist();
        let _ = respond_to.send(Ok(()));
    }

    #[instrument(fields(table = %table, code = %promo.code), skip(self, table, promo, respond_to))]
    fn handle_apply_promo(&mut self, table: String, promo: Promo, respond_to: ServiceResponse<(), CartError>) {
        debug!("Processing apply_promo_code request");
        if let Err(e) = require_table(&table) {
            let _ = respond_to.send(Err(e));
            return;
        }
        self.state
            .apply_promo_code(&table, &promo.code, promo.discount_type, promo.discount_value);
        self.persist();
        let _ = respond_to.send(Ok(()));
    }

    #[instrument(fields(table = %table), skip(self, table, respond_to))]
    fn handle_remove_promo(&mut self, table: String, respond_to: ServiceResponse<(), CartError>) {
        debug!("Processing remove_promo_code request");
        self.state.remove_promo_code(&table);
        self.persist();
        let _ = respond_to.send(Ok(()));
    }

    /// A failed write is logged; the in-memory cart stays authoritative.
    fn persist(&mut self) {
        if let Err(e) = save_state(self.storage.as_mut(), &self.state) {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

fn require_table(table: &str) -> Result<(), CartError> {
    if table.is_empty() {
        return Err(CartError::MissingTable);
    }
    Ok(())
}
