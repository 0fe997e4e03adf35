use tracing::{debug, info};

use crate::backend::{ContentSource, ValidateRequest};
use crate::error::FeedError;
use crate::feed::item::Challenge;

#[derive(Clone, Debug, PartialEq)]
pub struct ChallengeOutcome {
    pub challenge_id: String,
    pub points: u32,
    /// True when the evidence was checked by the backend.
    pub validated: bool,
    pub message: Option<String>,
}

/// Submit evidence for `challenge`. Photo-checked challenges go through the
/// backend; a rejection leaves the challenge open for another attempt.
pub fn submit_challenge(
    source: &dyn ContentSource,
    challenge: &Challenge,
    image_data_url: &str,
) -> Result<ChallengeOutcome, FeedError> {
    if image_data_url.trim().is_empty() {
        return Err(FeedError::ValidationRejected {
            message: "Please attach a photo to complete this challenge.".to_string(),
        });
    }

    if !challenge.validation_kind.needs_photo_check() {
        debug!(challenge = %challenge.id, "accepting challenge without backend check");
        return Ok(ChallengeOutcome {
            challenge_id: challenge.id.clone(),
            points: challenge.points_awarded,
            validated: false,
            message: None,
        });
    }

    let request = ValidateRequest {
        image: image_data_url.to_string(),
        challenge_type: challenge.validation_kind.as_str().to_string(),
    };
    let response = source.validate_challenge(&request)?;
    if !response.valid {
        return Err(FeedError::ValidationRejected {
            message: response.message.unwrap_or_else(|| {
                "Challenge validation failed. Please upload a valid image.".to_string()
            }),
        });
    }

    info!(challenge = %challenge.id, points = challenge.points_awarded, "challenge validated");
    Ok(ChallengeOutcome {
        challenge_id: challenge.id.clone(),
        points: challenge.points_awarded,
        validated: true,
        message: response.message,
    })
}
