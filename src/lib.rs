//! # Café Orders
//!
//! Backend for a table-service café: customers build a cart per table, apply a promo
//! code and place an order; baristas watch the live board and move orders along.
//!
//! ## Terminology
//!
//! - **Service** (e.g. [`cart::CartService`]) owns state and handles one message at a time
//! - **Client** (e.g. [`clients::CartClient`]) is the cheap, cloneable handle used to talk to a service
//! - **Table** is one backend collection served by a generic [`actor_framework::ResourceActor`]
//!
//! ## Layout
//!
//! - **Foundation**
//!     - **Domain types** - Plain data, no actor concerns → [`domain`]
//!     - **Resource actors** - Insert/select/update/delete, change feed, server-side actions → [`actor_framework`]
//!     - **Entities** - One module per backend area → [`order_actor`], [`menu_actor`], [`promo_actor`], [`account_actor`], [`store_actor`]
//! - **Services**
//!     - **Cart** - Per-table carts persisted after every mutation → [`cart`]
//!     - **Effects** - Retried background bookkeeping after an order is placed → [`effects`]
//! - **Clients**
//!     - **Checkout** - Turns a cart into one placed order → [`clients::CheckoutClient`]
//!     - **Status** - Live tracker and barista board over the order feed → [`status`]
//! - **System**
//!     - **Wiring and shutdown** → [`app_system::CafeSystem`]
//!     - **Configuration** → [`app_system::Config`]
//!     - **Tracing setup** → [`app_system::setup_tracing`]

pub mod account_actor;
pub mod actor_framework;
pub mod app_system;
pub mod cart;
pub mod clients;
pub mod domain;
pub mod effects;
pub mod error;
pub mod menu_actor;
pub mod messages;
pub mod order_actor;
pub mod promo_actor;
pub mod status;
pub mod store_actor;

#[cfg(test)]
mod mock_framework;
