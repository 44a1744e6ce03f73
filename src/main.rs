use chrono::Utc;
use tracing::{error, info, Instrument};

use cafe_orders::app_system::{setup_tracing, CafeSystem, Config};
use cafe_orders::domain::{
    CategoryCreate, CustomizationOptionCreate, DiscountType, FeedbackCreate, MenuItemCreate, OrderStatus,
    PromoCodeCreate,
};
use cafe_orders::status::{BaristaBoard, OrderTracker};

const TABLE: &str = "7";

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = Config::load().map_err(|e| e.to_string())?;
    info!(?config, "Starting cafe backend");

    // Create the entire cafe system (starts all services)
    let system = CafeSystem::new(&config);

    // Staff side: an admin and a small menu
    let span = tracing::info_span!("menu_setup");
    let (latte, oat_milk) = async {
        let admin = system
            .auth
            .bootstrap_admin("owner@cafe.test", "espresso-all-day", "Olive Owner")
            .await
            .map_err(|e| e.to_string())?;
        info!(admin = ?admin.user_id(), "Admin ready");

        let coffee = system
            .menu
            .create_category(CategoryCreate { name: "Coffee".to_string(), sort_order: 1 })
            .await
            .map_err(|e| e.to_string())?;
        let oat_milk = system
            .menu
            .create_customization(CustomizationOptionCreate {
                name: "Oat milk".to_string(),
                group: "Milk".to_string(),
                price: 0.5,
            })
            .await
            .map_err(|e| e.to_string())?;
        let latte = system
            .menu
            .create_menu_item(MenuItemCreate {
                category_id: coffee.id.clone(),
                name: "Latte".to_string(),
                description: "Double shot, steamed milk".to_string(),
                price: 4.0,
                customization_ids: vec![oat_milk.id.clone()],
            })
            .await
            .map_err(|e| e.to_string())?;
        system
            .promos
            .create_promo_code(PromoCodeCreate::new("WELCOME10", DiscountType::Percentage, 10.0))
            .await
            .map_err(|e| e.to_string())?;
        Ok::<_, String>((latte, oat_milk))
    }
    .instrument(span)
    .await?;

    let menu = system.menu.menu().await.map_err(|e| e.to_string())?;
    info!(sections = menu.len(), "Menu loaded");

    // Customer side: cart, promo and checkout
    let customer = system
        .auth
        .sign_up("ada@example.com", "flat-white", "Ada")
        .await
        .map_err(|e| e.to_string())?;

    let mut board = BaristaBoard::start(&system.orders).await.map_err(|e| e.to_string())?;

    let span = tracing::info_span!("checkout", table = TABLE);
    let receipt = async {
        system
            .cart
            .add_item(TABLE.to_string(), latte.to_cart_item(2, &[oat_milk.clone()]))
            .await
            .map_err(|e| e.to_string())?;
        system
            .cart
            .add_item(TABLE.to_string(), latte.to_cart_item(1, &[]))
            .await
            .map_err(|e| e.to_string())?;
        system
            .promos
            .apply_promo(&system.cart, TABLE, "welcome10")
            .await
            .map_err(|e| e.to_string())?;
        let total = system.cart.total(TABLE.to_string()).await.map_err(|e| e.to_string())?;
        info!(total, "Cart ready");

        system.checkout.submit_order(&customer, TABLE).await.map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    let order_id = receipt.order.id.clone();
    info!(order_id = %order_id, total = receipt.order.total, lines = receipt.line_ids.len(), "Order placed");
    info!(route = %receipt.wait_for_redirect().await, "Redirecting");

    // Barista moves the order along while the customer watches
    let mut tracker = OrderTracker::start(&system.orders, order_id.clone())
        .await
        .map_err(|e| e.to_string())?;
    for status in [OrderStatus::Preparing, OrderStatus::Ready] {
        system
            .orders
            .update_status(order_id.clone(), status)
            .await
            .map_err(|e| e.to_string())?;
        if tracker.changed().await {
            if let Some(status) = tracker.status() {
                let badge = status.badge();
                info!(label = badge.label, step = ?status.progress_step(), "Tracking page updated");
            }
        }
    }
    match system.orders.mark_served(order_id.clone()).await {
        Ok(served_at) => info!(%served_at, "Order served"),
        Err(e) => error!(error = %e, "Could not mark order as served"),
    }
    board.changed().await;
    info!(active = board.len(), "Barista board");

    system
        .store
        .submit_feedback(FeedbackCreate {
            order_id: Some(order_id),
            table_number: TABLE.to_string(),
            user_id: customer.user_id().map(str::to_string),
            rating: 5,
            comment: "Lovely latte".to_string(),
        })
        .await
        .map_err(|e| e.to_string())?;
    if let Some(user_id) = customer.user_id() {
        let inbox = system
            .store
            .notifications_for(user_id.to_string())
            .await
            .map_err(|e| e.to_string())?;
        info!(notifications = inbox.len(), "Customer inbox");
    }
    let promotions = system.promos.active_promotions(Utc::now()).await.map_err(|e| e.to_string())?;
    info!(promotions = promotions.len(), "Running promotions");

    // Shutdown system gracefully
    drop(tracker);
    drop(board);
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
