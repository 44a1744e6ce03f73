//! Typed clients over the cart service and the backend tables.

#[macro_use]
mod macros;

pub mod auth_client;
pub mod cart_client;
pub mod checkout_client;
pub mod menu_client;
pub mod object_client;
pub mod order_client;
pub mod promo_client;
pub mod staff_client;
pub mod store_client;

pub use auth_client::AuthClient;
pub use cart_client::CartClient;
pub use checkout_client::{CheckoutClient, CheckoutReceipt};
pub use menu_client::{MenuClient, MENU_IMAGE_BUCKET};
pub use object_client::ObjectClient;
pub use order_client::OrderClient;
pub use promo_client::PromoClient;
pub use staff_client::StaffClient;
pub use store_client::StoreClient;
