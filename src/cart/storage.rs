//! Local durable storage for the cart document.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use super::CartState;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Cart serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Where the serialized cart document lives between runs.
pub trait CartStorage: Send + 'static {
    /// Returns `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn save(&mut self, payload: &str) -> Result<(), StorageError>;
}

/// JSON document on disk, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CartStorage for FileStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, payload: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory slot. Clones share the slot, so a test can keep a handle and inspect it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(payload.into()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.lock().clone())
    }

    fn save(&mut self, payload: &str) -> Result<(), StorageError> {
        *self.slot.lock() = Some(payload.to_string());
        Ok(())
    }
}

/// Rehydrates the cart. Missing, unreadable or corrupt documents all yield an empty cart.
pub fn load_state(storage: &dyn CartStorage) -> CartState {
    let payload = match storage.load() {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            debug!("No stored cart found, starting empty");
            return CartState::default();
        }
        Err(e) => {
            warn!(error = %e, "Failed to read stored cart, starting empty");
            return CartState::default();
        }
    };
    match serde_json::from_str(&payload) {
        Ok(state) => state,
        Err(e) => {
            warn!(error = %e, "Stored cart is corrupt, starting empty");
            CartState::default()
        }
    }
}

/// Writes the whole cart document.
pub fn save_state(storage: &mut dyn CartStorage, state: &CartState) -> Result<(), StorageError> {
    let payload = serde_json::to_string(state)?;
    storage.save(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CartItem, Customization, DiscountType};
    use tempfile::tempdir;

    fn sample_state() -> CartState {
        let mut state = CartState::default();
        state.add_item(
            CartItem::new("p1", "Latte", 4.0, 2).with_customization(Customization::new("oat", "Oat milk", 0.5)),
            "12",
        );
        state.apply_promo_code("12", "TEN", DiscountType::Percentage, 10.0);
        state
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested").join("cart.json"));

        assert_eq!(load_state(&storage), CartState::default());

        let state = sample_state();
        save_state(&mut storage, &state).unwrap();
        assert_eq!(load_state(&storage), state);
    }

    #[test]
    fn corrupt_payload_loads_as_empty_cart() {
        let storage = MemoryStorage::with_payload("{\"items\": [not json");
        assert_eq!(load_state(&storage), CartState::default());

        let wrong_shape = MemoryStorage::with_payload("{\"items\": {\"1\": 7}}");
        assert_eq!(load_state(&wrong_shape), CartState::default());
    }

    #[test]
    fn memory_storage_clones_share_the_slot() {
        let storage = MemoryStorage::new();
        let mut writer = storage.clone();
        save_state(&mut writer, &sample_state()).unwrap();
        assert!(storage.contents().unwrap().contains("\"TEN\""));
    }
}
