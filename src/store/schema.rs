use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProfileKey {
    Points,
    UserLocation,
    OnboardingSeen,
    PendingPersonalization,
}

impl ProfileKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileKey::Points => "points",
            ProfileKey::UserLocation => "user_location",
            ProfileKey::OnboardingSeen => "onboarding_seen",
            ProfileKey::PendingPersonalization => "pending_personalization",
        }
    }
}

/// Published to subscribers after every write that changed a value.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileChange {
    pub key: ProfileKey,
    pub value: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub place_name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl UserLocation {
    pub fn named(place_name: &str) -> Self {
        Self {
            place_name: place_name.to_string(),
            ..Self::default()
        }
    }
}

/// Onboarding answers about the user's daily habits.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InterestAnswers {
    #[serde(default)]
    pub drink: Option<String>,
    #[serde(default)]
    pub walking_place: Option<String>,
    #[serde(default)]
    pub other_habit: Option<String>,
}

/// An issued generation request whose artifact has not been seen yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingPersonalization {
    pub video_path: String,
    pub location: String,
    pub interests: InterestAnswers,
    pub requested_at: DateTime<Utc>,
}

/// On-disk layout of the JSON profile store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileData {
    pub schema_version: u32,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            values: BTreeMap::new(),
        }
    }
}

impl ProfileData {
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
