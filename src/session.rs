use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Key the bearer token is stored under.
pub const TOKEN_KEY: &str = "inat_networks_jwt_token";

/// Session-scoped key/value storage. Lives as long as the process and is
/// never written to disk; clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct SessionStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: &str) {
        if let Ok(mut items) = self.items.lock() {
            items.insert(key.to_string(), value.to_string());
        }
    }

    pub fn remove_item(&self, key: &str) {
        if let Ok(mut items) = self.items.lock() {
            items.remove(key);
        }
    }

    pub fn token(&self) -> Option<String> {
        self.get_item(TOKEN_KEY)
    }

    pub fn set_token(&self, token: &str) {
        self.set_item(TOKEN_KEY, token);
    }

    pub fn clear_token(&self) {
        self.remove_item(TOKEN_KEY);
    }
}
