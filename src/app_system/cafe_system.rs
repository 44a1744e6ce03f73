use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::actor_framework::{uuid_ids, Entity, ResourceActor, ResourceClient};
use crate::app_system::Config;
use crate::cart::{CartService, FileStorage, MemoryStorage};
use crate::clients::{
    AuthClient, CartClient, CheckoutClient, MenuClient, ObjectClient, OrderClient, PromoClient, StaffClient,
    StoreClient,
};
use crate::domain::{
    ActivityEntry, Category, CustomizationOption, Feedback, Identity, LoyaltyReward, MenuItem, Notification, Order,
    Profile, PromoCode, Promotion, StaffMember, StoreSettings, StoredObject,
};
use crate::effects::{EffectTargets, EffectWorker};

/// The whole café backend: every table actor, the cart service and the effect worker.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
/// Nothing here is global; construct one and pass its clients to whoever needs them.
pub struct CafeSystem {
    pub cart: CartClient,
    pub checkout: CheckoutClient,
    pub orders: OrderClient,
    pub menu: MenuClient,
    pub promos: PromoClient,
    pub auth: AuthClient,
    pub staff: StaffClient,
    pub store: StoreClient,
    pub objects: ObjectClient,
    handles: Vec<JoinHandle<()>>,
}

impl CafeSystem {
    /// Spawns everything on the current Tokio runtime.
    pub fn new(config: &Config) -> Self {
        let buffer = config.channel_buffer;
        let mut handles = Vec::new();

        // 1. Backend tables
        let orders = spawn_table::<Order>(buffer, &mut handles);
        let categories = spawn_table::<Category>(buffer, &mut handles);
        let menu_items = spawn_table::<MenuItem>(buffer, &mut handles);
        let options = spawn_table::<CustomizationOption>(buffer, &mut handles);
        let promo_codes = spawn_table::<PromoCode>(buffer, &mut handles);
        let promotions = spawn_table::<Promotion>(buffer, &mut handles);
        let identities = spawn_table::<Identity>(buffer, &mut handles);
        let profiles = spawn_table::<Profile>(buffer, &mut handles);
        let staff = spawn_table::<StaffMember>(buffer, &mut handles);
        let rewards = spawn_table::<LoyaltyReward>(buffer, &mut handles);
        let feedback = spawn_table::<Feedback>(buffer, &mut handles);
        let notifications = spawn_table::<Notification>(buffer, &mut handles);
        let activity = spawn_table::<ActivityEntry>(buffer, &mut handles);
        let objects = spawn_table::<StoredObject>(buffer, &mut handles);

        let (settings_actor, settings) =
            ResourceActor::with_records(buffer, uuid_ids(), vec![StoreSettings::new(config.store_name.clone())]);
        handles.push(tokio::spawn(settings_actor.run()));

        // 2. Cart service
        let cart = match &config.cart_path {
            Some(path) => {
                let (service, client) = CartService::new(buffer, FileStorage::new(path));
                handles.push(tokio::spawn(service.run()));
                client
            }
            None => {
                let (service, client) = CartService::new(buffer, MemoryStorage::new());
                handles.push(tokio::spawn(service.run()));
                client
            }
        };

        // 3. Effect queue
        let targets = EffectTargets {
            promo_codes: promo_codes.clone(),
            notifications: notifications.clone(),
            activity: activity.clone(),
        };
        let (worker, effects) = EffectWorker::new(buffer, config.effect_retry, targets);
        handles.push(tokio::spawn(worker.run()));

        // 4. Clients
        let objects = ObjectClient::new(objects);
        let orders = OrderClient::new(orders);
        let promos = PromoClient::new(promo_codes, promotions);
        let auth = AuthClient::new(identities, profiles);
        let checkout = CheckoutClient::new(
            cart.clone(),
            orders.clone(),
            promos.clone(),
            effects.clone(),
            config.redirect_delay,
        );

        info!(actors = handles.len(), "Cafe system started");
        Self {
            cart,
            checkout,
            orders,
            menu: MenuClient::new(categories, menu_items, options, objects.clone()),
            promos,
            staff: StaffClient::new(auth.clone(), staff, effects),
            auth,
            store: StoreClient::new(settings, rewards, feedback, notifications, activity),
            objects,
            handles,
        }
    }

    /// Drops every client held here and waits for all actors to stop. Clones handed
    /// out earlier must be dropped first, or their actors keep running.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        let Self {
            cart,
            checkout,
            orders,
            menu,
            promos,
            auth,
            staff,
            store,
            objects,
            handles,
        } = self;
        // Dropping the senders closes each actor's channel
        drop((cart, checkout, orders, menu, promos, auth, staff, store, objects));

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

fn spawn_table<T: Entity<Id = String>>(buffer: usize, handles: &mut Vec<JoinHandle<()>>) -> ResourceClient<T> {
    let (actor, client) = ResourceActor::<T>::new(buffer, uuid_ids());
    handles.push(tokio::spawn(actor.run()));
    client
}
