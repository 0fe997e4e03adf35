use std::collections::HashMap;
use std::sync::{Mutex, mpsc};

use crate::error::FeedError;
use crate::store::schema::{ProfileChange, ProfileKey};
use crate::store::{Subscribers, UserProfileStore};

/// Non-persistent store for tests and `--ephemeral` runs.
#[derive(Default)]
pub struct MemoryProfileStore {
    values: Mutex<HashMap<ProfileKey, String>>,
    subscribers: Subscribers,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserProfileStore for MemoryProfileStore {
    fn get(&self, key: ProfileKey) -> Option<String> {
        self.values.lock().ok()?.get(&key).cloned()
    }

    fn set(&self, key: ProfileKey, value: &str) -> Result<(), FeedError> {
        let previous = self
            .values
            .lock()
            .map_err(|e| FeedError::Store(e.to_string()))?
            .insert(key, value.to_string());
        if previous.as_deref() == Some(value) {
            return Ok(());
        }
        self.subscribers.publish(ProfileChange {
            key,
            value: Some(value.to_string()),
        });
        Ok(())
    }

    fn remove(&self, key: ProfileKey) -> Result<(), FeedError> {
        let removed = self
            .values
            .lock()
            .map_err(|e| FeedError::Store(e.to_string()))?
            .remove(&key);
        if removed.is_some() {
            self.subscribers.publish(ProfileChange { key, value: None });
        }
        Ok(())
    }

    fn subscribe(&self) -> mpsc::Receiver<ProfileChange> {
        self.subscribers.subscribe()
    }
}
