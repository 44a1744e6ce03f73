use tokio::sync::oneshot;

use crate::cart::{CartError, CartSummary};
use crate::domain::{CartItem, Promo};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed messages for the cart service. Each variant includes parameters
/// and a oneshot channel for responses.
#[derive(Debug)]
pub enum CartRequest {
    AddItem {
        table: String,
        item: CartItem,
        respond_to: ServiceResponse<Vec<CartItem>, CartError>,
    },
    RemoveItem {
        table: String,
        product_id: String,
        customization_ids: Option<Vec<String>>,
        respond_to: ServiceResponse<Vec<CartItem>, CartError>,
    },
    UpdateQuantity {
        table: String,
        product_id: String,
        quantity: i64,
        customization_ids: Option<Vec<String>>,
        respond_to: ServiceResponse<Vec<CartItem>, CartError>,
    },
    ClearCart {
        table: String,
        respond_to: ServiceResponse<(), CartError>,
    },
    ClearSubmitted {
        table: String,
        items: Vec<CartItem>,
        respond_to: ServiceResponse<(), CartError>,
    },
    ApplyPromoCode {
        table: String,
        promo: Promo,
        respond_to: ServiceResponse<(), CartError>,
    },
    RemovePromoCode {
        table: String,
        respond_to: ServiceResponse<(), CartError>,
    },
    GetTableItems {
        table: String,
        respond_to: ServiceResponse<Vec<CartItem>, CartError>,
    },
    Summary {
        table: String,
        respond_to: ServiceResponse<CartSummary, CartError>,
    },
}

impl CartRequest {
    /// Table key the request targets.
    pub fn table_mut(&mut self) -> &mut String {
        match self {
            CartRequest::AddItem { table, .. }
            | CartRequest::RemoveItem { table, .. }
            | CartRequest::UpdateQuantity { table, .. }
            | CartRequest::ClearCart { table, .. }
            | CartRequest::ClearSubmitted { table, .. }
            | CartRequest::ApplyPromoCode { table, .. }
            | CartRequest::RemovePromoCode { table, .. }
            | CartRequest::GetTableItems { table, .. }
            | CartRequest::Summary { table, .. } => table,
        }
    }
}
