pub mod http;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::FeedError;

/// A generated video as listed by `GET /api/videos`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawVideo {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle_url: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub filename: Option<String>,
}

impl RawVideo {
    /// Year the artifact was produced, falling back to `fallback` when the
    /// timestamp is missing or unparseable.
    pub fn created_year(&self, fallback: i32) -> i32 {
        let ts = self.created_at.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
            return dt.year();
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
            return dt.year();
        }
        ts.get(..4)
            .and_then(|y| y.parse().ok())
            .unwrap_or(fallback)
    }

    /// Last path segment of the served URL, used when the backend omits `filename`.
    pub fn file_name(&self) -> &str {
        match &self.filename {
            Some(name) if !name.is_empty() => name,
            _ => self.url.rsplit('/').next().unwrap_or(&self.url),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub videos: Vec<RawVideo>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GenerateRequest {
    pub location: String,
    pub theme: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub video_path: Option<String>,
    #[serde(default)]
    pub image_paths: Option<Vec<String>>,
    #[serde(default)]
    pub script_text: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ValidateRequest {
    pub image: String,
    #[serde(rename = "challengeType")]
    pub challenge_type: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Remote service that lists, generates and validates content.
pub trait ContentSource: Send + Sync {
    fn try_fetch_videos(&self) -> Result<Vec<RawVideo>, FeedError>;

    fn generate_story(&self, request: &GenerateRequest) -> Result<GenerateResponse, FeedError>;

    fn validate_challenge(&self, request: &ValidateRequest)
    -> Result<ValidateResponse, FeedError>;

    /// Video listing that never fails: any error yields an empty list.
    fn fetch_videos(&self) -> Vec<RawVideo> {
        match self.try_fetch_videos() {
            Ok(videos) => videos,
            Err(e) => {
                warn!(error = %e, "video listing unavailable, continuing without backend videos");
                Vec::new()
            }
        }
    }
}

pub fn current_year() -> i32 {
    Utc::now().year()
}
