use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use crate::cart::{CartError, CartSummary};
use crate::domain::{CartItem, DiscountType, Promo};
use crate::messages::CartRequest;

/// Handle to the [`crate::cart::CartService`]. Cheap to clone.
#[derive(Clone)]
pub struct CartClient {
    sender: mpsc::Sender<CartRequest>,
}

impl CartClient {
    pub fn new(sender: mpsc::Sender<CartRequest>) -> Self {
        Self { sender }
    }

    /// Sets the table's promo, replacing any previous one. Callers validate the code first,
    /// see [`crate::clients::PromoClient::apply_promo`].
    #[instrument(skip(self))]
    pub async fn apply_promo_code(
        &self,
        table: &str,
        code: &str,
        discount_type: DiscountType,
        discount_value: f64,
    ) -> Result<(), CartError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CartRequest::ApplyPromoCode {
                table: table.to_string(),
                promo: Promo::new(code, discount_type, discount_value),
                respond_to,
            })
            .await
            .map_err(|_| CartError::ActorCommunicationError("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| CartError::ActorCommunicationError("Actor dropped".to_string()))?
    }

    /// Grand total after discount.
    pub async fn total(&self, table: String) -> Result<f64, CartError> {
        Ok(self.summary(table).await?.total)
    }
}

client_method!(CartClient => fn add_item(table: String, item: CartItem) -> Vec<CartItem> as CartRequest::AddItem, Error = CartError);
client_method!(CartClient => fn remove_item(table: String, product_id: String, customization_ids: Option<Vec<String>>) -> Vec<CartItem> as CartRequest::RemoveItem, Error = CartError);
client_method!(CartClient => fn update_quantity(table: String, product_id: String, quantity: i64, customization_ids: Option<Vec<String>>) -> Vec<CartItem> as CartRequest::UpdateQuantity, Error = CartError);
client_method!(CartClient => fn clear_cart(table: String) -> () as CartRequest::ClearCart, Error = CartError);
client_method!(CartClient => fn clear_submitted(table: String, items: Vec<CartItem>) -> () as CartRequest::ClearSubmitted, Error = CartError);
client_method!(CartClient => fn remove_promo_code(table: String) -> () as CartRequest::RemovePromoCode, Error = CartError);
client_method!(CartClient => fn get_table_items(table: String) -> Vec<CartItem> as CartRequest::GetTableItems, Error = CartError);
client_method!(CartClient => fn summary(table: String) -> CartSummary as CartRequest::Summary, Error = CartError);
