pub mod json_store;
pub mod memory_store;
pub mod schema;

use std::sync::Mutex;
use std::sync::mpsc;

use tracing::warn;

use crate::error::FeedError;
use crate::store::schema::{PendingPersonalization, ProfileChange, ProfileKey, UserLocation};

/// String-valued user state, injected into the components that need it.
pub trait UserProfileStore: Send + Sync {
    fn get(&self, key: ProfileKey) -> Option<String>;

    fn set(&self, key: ProfileKey, value: &str) -> Result<(), FeedError>;

    fn remove(&self, key: ProfileKey) -> Result<(), FeedError>;

    /// Receive a `ProfileChange` for every subsequent write that changes a
    /// value. Rewriting the same value or removing a missing key is silent.
    fn subscribe(&self) -> mpsc::Receiver<ProfileChange>;
}

/// Typed accessors over the raw key/value interface.
pub trait ProfileStoreExt: UserProfileStore {
    fn points(&self) -> u64 {
        self.get(ProfileKey::Points)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    fn set_points(&self, points: u64) -> Result<(), FeedError> {
        self.set(ProfileKey::Points, &points.to_string())
    }

    fn onboarding_seen(&self) -> bool {
        self.get(ProfileKey::OnboardingSeen).as_deref() == Some("true")
    }

    fn mark_onboarding_seen(&self) -> Result<(), FeedError> {
        self.set(ProfileKey::OnboardingSeen, "true")
    }

    fn user_location(&self) -> Option<UserLocation> {
        load_json(self, ProfileKey::UserLocation)
    }

    fn set_user_location(&self, location: &UserLocation) -> Result<(), FeedError> {
        self.set(ProfileKey::UserLocation, &serde_json::to_string(location)?)
    }

    fn pending_personalization(&self) -> Option<PendingPersonalization> {
        load_json(self, ProfileKey::PendingPersonalization)
    }

    fn set_pending_personalization(
        &self,
        pending: &PendingPersonalization,
    ) -> Result<(), FeedError> {
        self.set(
            ProfileKey::PendingPersonalization,
            &serde_json::to_string(pending)?,
        )
    }

    fn clear_pending_personalization(&self) -> Result<(), FeedError> {
        self.remove(ProfileKey::PendingPersonalization)
    }
}

impl<T: UserProfileStore + ?Sized> ProfileStoreExt for T {}

fn load_json<S, T>(store: &S, key: ProfileKey) -> Option<T>
where
    S: UserProfileStore + ?Sized,
    T: serde::de::DeserializeOwned,
{
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = key.as_str(), error = %e, "ignoring unreadable profile value");
            None
        }
    }
}

/// Fan-out of change notifications; disconnected receivers are pruned on publish.
#[derive(Default)]
pub struct Subscribers {
    senders: Mutex<Vec<mpsc::Sender<ProfileChange>>>,
}

impl Subscribers {
    pub fn subscribe(&self) -> mpsc::Receiver<ProfileChange> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut senders) = self.senders.lock() {
            senders.push(tx);
        }
        rx
    }

    pub fn publish(&self, change: ProfileChange) {
        if let Ok(mut senders) = self.senders.lock() {
            senders.retain(|tx| tx.send(change.clone()).is_ok());
        }
    }
}
