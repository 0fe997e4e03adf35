use std::time::Duration;

use tracing::debug;

use crate::backend::{
    ContentSource, GenerateRequest, GenerateResponse, RawVideo, ValidateRequest, ValidateResponse,
};
use crate::config::Config;
use crate::error::FeedError;

/// Story backend reached over plain HTTP.
pub struct HttpBackend {
    base_url: String,
    fetch_timeout: Duration,
    generation_timeout: Duration,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            fetch_timeout: config.fetch_timeout(),
            generation_timeout: config.generation_timeout(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(feature = "network")]
fn client(timeout: Duration) -> Result<reqwest::blocking::Client, FeedError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FeedError::Network(e.to_string()))
}

#[cfg(feature = "network")]
fn network_error(e: reqwest::Error) -> FeedError {
    if e.is_decode() {
        FeedError::Decode(e.to_string())
    } else {
        FeedError::Network(e.to_string())
    }
}

#[cfg(feature = "network")]
fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, FeedError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FeedError::Http {
            status: status.as_u16(),
        })
    }
}

#[cfg(feature = "network")]
impl ContentSource for HttpBackend {
    fn try_fetch_videos(&self) -> Result<Vec<RawVideo>, FeedError> {
        let url = self.endpoint("/api/videos");
        debug!(%url, "listing backend videos");
        let response = client(self.fetch_timeout)?
            .get(&url)
            .send()
            .map_err(network_error)?;
        let list: crate::backend::VideoList =
            check_status(response)?.json().map_err(network_error)?;
        Ok(list.videos)
    }

    fn generate_story(&self, request: &GenerateRequest) -> Result<GenerateResponse, FeedError> {
        let url = self.endpoint("/api/generate-story");
        debug!(%url, theme = %request.theme, "requesting personalized story");
        let response = client(self.generation_timeout)?
            .post(&url)
            .json(request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    FeedError::GenerationTimedOut(self.generation_timeout.as_secs())
                } else {
                    network_error(e)
                }
            })?;
        check_status(response)?.json().map_err(network_error)
    }

    fn validate_challenge(
        &self,
        request: &ValidateRequest,
    ) -> Result<ValidateResponse, FeedError> {
        let url = self.endpoint("/api/validate-challenge");
        debug!(%url, challenge_type = %request.challenge_type, "validating challenge evidence");
        let response = client(self.fetch_timeout)?
            .post(&url)
            .json(request)
            .send()
            .map_err(network_error)?;
        check_status(response)?.json().map_err(network_error)
    }
}

#[cfg(not(feature = "network"))]
impl ContentSource for HttpBackend {
    fn try_fetch_videos(&self) -> Result<Vec<RawVideo>, FeedError> {
        debug!(base = %self.base_url, "network feature disabled, no backend videos");
        Err(FeedError::Network("built without network support".to_string()))
    }

    fn generate_story(&self, _request: &GenerateRequest) -> Result<GenerateResponse, FeedError> {
        Err(FeedError::Network("built without network support".to_string()))
    }

    fn validate_challenge(
        &self,
        _request: &ValidateRequest,
    ) -> Result<ValidateResponse, FeedError> {
        Err(FeedError::Network("built without network support".to_string()))
    }
}
