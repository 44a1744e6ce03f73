use tracing::{debug, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::clients::ObjectClient;
use crate::domain::{
    Category, CategoryCreate, CategoryPatch, CustomizationOption, CustomizationOptionCreate, CustomizationOptionPatch,
    MenuItem, MenuItemCreate, MenuItemPatch, MenuSection,
};
use crate::menu_actor::MenuError;

/// Bucket that holds menu photos.
pub const MENU_IMAGE_BUCKET: &str = "menu-images";

/// Client for categories, menu items and customization options.
#[derive(Clone)]
pub struct MenuClient {
    categories: ResourceClient<Category>,
    items: ResourceClient<MenuItem>,
    options: ResourceClient<CustomizationOption>,
    objects: ObjectClient,
}

impl MenuClient {
    pub fn new(
        categories: ResourceClient<Category>,
        items: ResourceClient<MenuItem>,
        options: ResourceClient<CustomizationOption>,
        objects: ObjectClient,
    ) -> Self {
        Self {
            categories,
            items,
            options,
            objects,
        }
    }

    /// The customer-facing menu: active categories by `sort_order`, each with its
    /// available items. Empty categories are left out.
    #[instrument(skip(self))]
    pub async fn menu(&self) -> Result<Vec<MenuSection>, MenuError> {
        debug!("Sending request");
        let mut categories = self.categories.query(|category| category.active).await?;
        categories.sort_by_key(|category| category.sort_order);
        let items = self.items.query(|item| item.available).await?;

        Ok(categories
            .into_iter()
            .map(|category| {
                let items = items
                    .iter()
                    .filter(|item| item.category_id == category.id)
                    .cloned()
                    .collect();
                MenuSection { category, items }
            })
            .filter(|section| !section.items.is_empty())
            .collect())
    }

    /// Active options offered for one menu item.
    #[instrument(skip(self))]
    pub async fn customizations_for(&self, item_id: String) -> Result<Vec<CustomizationOption>, MenuError> {
        debug!("Sending request");
        let item = self
            .items
            .get(item_id.clone())
            .await?
            .ok_or(MenuError::NotFound(item_id))?;
        let offered = item.customization_ids;
        Ok(self
            .options
            .query(move |option| option.active && offered.contains(&option.id))
            .await?)
    }

    /// Stores the photo under a random key and points the item at it. The object is
    /// removed again when the item cannot be updated.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn upload_item_image(
        &self,
        item_id: String,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<MenuItem, MenuError> {
        let object = self.objects.upload(MENU_IMAGE_BUCKET, content_type, bytes).await?;
        let patch = MenuItemPatch {
            image_url: Some(object.public_url()),
            ..Default::default()
        };
        match self.items.update(item_id, patch).await {
            Ok(item) => {
                info!(item_id = %item.id, key = %object.key, "Menu image attached");
                Ok(item)
            }
            Err(e) => {
                if let Err(cleanup) = self.objects.remove(object.key.clone()).await {
                    warn!(key = %object.key, error = %cleanup, "Failed to remove orphaned image");
                }
                Err(e.into())
            }
        }
    }
}

impl_client_methods!(MenuClient, categories, Category, MenuError, category, categories);
impl_write_methods!(MenuClient, categories, Category, CategoryCreate, CategoryPatch, MenuError, category);
impl_client_methods!(MenuClient, items, MenuItem, MenuError, menu_item, menu_items);
impl_write_methods!(MenuClient, items, MenuItem, MenuItemCreate, MenuItemPatch, MenuError, menu_item);
impl_client_methods!(MenuClient, options, CustomizationOption, MenuError, customization, customizations);
impl_write_methods!(
    MenuClient,
    options,
    CustomizationOption,
    CustomizationOptionCreate,
    CustomizationOptionPatch,
    MenuError,
    customization
);
