use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, mpsc};

use anyhow::Result;
use tracing::warn;

use crate::error::FeedError;
use crate::store::schema::{ProfileChange, ProfileData, ProfileKey};
use crate::store::{Subscribers, UserProfileStore};

const PROFILE_FILE: &str = "profile.json";

/// Profile values persisted as one JSON document, rewritten atomically on
/// every change.
pub struct JsonProfileStore {
    base_dir: PathBuf,
    data: Mutex<ProfileData>,
    subscribers: Subscribers,
}

impl JsonProfileStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ecofeed");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        let data = Self::load(&base_dir.join(PROFILE_FILE));
        Ok(Self {
            base_dir,
            data: Mutex::new(data),
            subscribers: Subscribers::default(),
        })
    }

    fn file_path(&self) -> PathBuf {
        self.base_dir.join(PROFILE_FILE)
    }

    fn load(path: &Path) -> ProfileData {
        if !path.exists() {
            return ProfileData::default();
        }
        let parsed = fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str::<ProfileData>(&content).ok());
        match parsed {
            Some(data) if !data.needs_reset() => data,
            Some(_) => {
                warn!(path = %path.display(), "profile schema changed, starting fresh");
                ProfileData::default()
            }
            None => {
                warn!(path = %path.display(), "profile unreadable, starting fresh");
                ProfileData::default()
            }
        }
    }

    fn save(&self, data: &ProfileData) -> Result<()> {
        let path = self.file_path();
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn update(&self, key: ProfileKey, value: Option<&str>) -> Result<bool, FeedError> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| FeedError::Store(e.to_string()))?;
        let mut next = data.clone();
        let changed = match value {
            Some(v) => {
                let previous = next.values.insert(key.as_str().to_string(), v.to_string());
                previous.as_deref() != Some(v)
            }
            None => next.values.remove(key.as_str()).is_some(),
        };
        if !changed {
            return Ok(false);
        }
        self.save(&next)
            .map_err(|e| FeedError::Store(format!("failed to write profile: {e}")))?;
        *data = next;
        Ok(true)
    }
}

impl UserProfileStore for JsonProfileStore {
    fn get(&self, key: ProfileKey) -> Option<String> {
        self.data.lock().ok()?.values.get(key.as_str()).cloned()
    }

    fn set(&self, key: ProfileKey, value: &str) -> Result<(), FeedError> {
        if self.update(key, Some(value))? {
            self.subscribers.publish(ProfileChange {
                key,
                value: Some(value.to_string()),
            });
        }
        Ok(())
    }

    fn remove(&self, key: ProfileKey) -> Result<(), FeedError> {
        if self.update(key, None)? {
            self.subscribers.publish(ProfileChange { key, value: None });
        }
        Ok(())
    }

    fn subscribe(&self) -> mpsc::Receiver<ProfileChange> {
        self.subscribers.subscribe()
    }
}
