pub mod poller;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::backend::{ContentSource, GenerateRequest, GenerateResponse, RawVideo, current_year};
use crate::config::Config;
use crate::error::FeedError;
use crate::feed::composer::{FeedComposer, placeholder_thumbnail};
use crate::feed::item::{FeedItem, Video, VideoLocation};
use crate::store::schema::{InterestAnswers, PendingPersonalization};
use crate::store::{ProfileStoreExt, UserProfileStore};

pub const SLOT_ID: &str = "personalized-slot";
pub const PERSONALIZED_VIDEO_ID: &str = "personalized-video";

#[derive(Clone, Debug, PartialEq)]
pub enum PersonalizationState {
    Absent,
    Generating,
    Ready(Video),
    Failed(String),
}

impl PersonalizationState {
    pub fn is_generating(&self) -> bool {
        matches!(self, PersonalizationState::Generating)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PersonalizationState::Ready(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            PersonalizationState::Absent => "absent",
            PersonalizationState::Generating => "generating",
            PersonalizationState::Ready(_) => "ready",
            PersonalizationState::Failed(_) => "failed",
        }
    }

    /// Item shown in the reserved feed position for this state.
    pub fn slot_item(&self) -> FeedItem {
        match self {
            PersonalizationState::Absent => FeedItem::PersonalizedPrompt {
                id: SLOT_ID.to_string(),
                text: "Tell us about your day to unlock a story made for you".to_string(),
            },
            PersonalizationState::Failed(reason) => FeedItem::PersonalizedPrompt {
                id: SLOT_ID.to_string(),
                text: format!("We couldn't finish your story ({reason}). Tap to try again"),
            },
            PersonalizationState::Generating => FeedItem::Loading {
                id: SLOT_ID.to_string(),
                text: "Creating your personalized story...".to_string(),
            },
            PersonalizationState::Ready(video) => FeedItem::Video(video.clone()),
        }
    }
}

/// Proof that a generation request was started. Results carrying a ticket
/// from before the latest reset are discarded.
#[derive(Clone, Debug)]
pub struct GenerationTicket {
    pub token: u64,
    pub request: GenerateRequest,
    pub place_name: String,
    pub interests: InterestAnswers,
}

pub struct PersonalizationManager {
    store: Arc<dyn UserProfileStore>,
    composer: FeedComposer,
    theme: String,
    timeout: Duration,
    state: PersonalizationState,
    token: u64,
    pending: Option<PendingPersonalization>,
    generating_since: Option<DateTime<Utc>>,
}

impl PersonalizationManager {
    /// Resumes in `Generating` when the store holds an unfinished request.
    pub fn new(config: &Config, store: Arc<dyn UserProfileStore>) -> Self {
        let pending = store.pending_personalization();
        let (state, generating_since) = match &pending {
            Some(p) => {
                info!(video_path = %p.video_path, "resuming pending personalized video");
                (PersonalizationState::Generating, Some(p.requested_at))
            }
            None => (PersonalizationState::Absent, None),
        };
        Self {
            store,
            composer: FeedComposer::new(&config.backend_url),
            theme: config.theme.clone(),
            timeout: config.generation_timeout(),
            state,
            token: 0,
            pending,
            generating_since,
        }
    }

    pub fn state(&self) -> &PersonalizationState {
        &self.state
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn slot_item(&self) -> FeedItem {
        self.state.slot_item()
    }

    pub fn begin_generation(
        &mut self,
        place_name: &str,
        interests: &InterestAnswers,
    ) -> Result<GenerationTicket, FeedError> {
        match self.state {
            PersonalizationState::Generating => return Err(FeedError::GenerationInFlight),
            PersonalizationState::Ready(_) => return Err(FeedError::AlreadyPersonalized),
            PersonalizationState::Absent | PersonalizationState::Failed(_) => {}
        }
        self.token += 1;
        self.state = PersonalizationState::Generating;
        self.pending = None;
        self.generating_since = Some(Utc::now());
        debug!(token = self.token, "personalized generation started");

        Ok(GenerationTicket {
            token: self.token,
            request: GenerateRequest {
                location: prompt::build_prompt(place_name, interests),
                theme: self.theme.clone(),
            },
            place_name: place_name.to_string(),
            interests: interests.clone(),
        })
    }

    /// Apply the outcome of the request started by `ticket`. Stale tickets
    /// are ignored and report success.
    pub fn finish_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<GenerateResponse, FeedError>,
    ) -> Result<(), FeedError> {
        if ticket.token != self.token || !self.state.is_generating() {
            debug!(
                ticket = ticket.token,
                current = self.token,
                "dropping stale generation response"
            );
            return Ok(());
        }

        let response = match result {
            Ok(response) => response,
            Err(e @ FeedError::GenerationTimedOut(_)) => {
                warn!(error = %e, "personalized generation timed out");
                self.fail(e.to_string());
                return Err(e);
            }
            Err(e) => {
                warn!(error = %e, "personalized generation request failed");
                self.state = PersonalizationState::Absent;
                self.generating_since = None;
                return Err(e);
            }
        };

        let Some(video_path) = response.video_path.filter(|p| !p.is_empty()) else {
            self.state = PersonalizationState::Absent;
            self.generating_since = None;
            return Err(FeedError::Decode(
                "generation response has no video_path".to_string(),
            ));
        };

        let pending = PendingPersonalization {
            video_path,
            location: ticket.place_name,
            interests: ticket.interests,
            requested_at: self.generating_since.unwrap_or_else(Utc::now),
        };
        if let Err(e) = self.store.set_pending_personalization(&pending) {
            warn!(error = %e, "could not persist pending personalization");
        }
        info!(video_path = %pending.video_path, "personalized video requested, waiting for artifact");
        self.pending = Some(pending);
        Ok(())
    }

    /// Issue a generation request and wait for the backend to acknowledge it.
    pub fn request_generation(
        &mut self,
        source: &dyn ContentSource,
        place_name: &str,
        interests: &InterestAnswers,
    ) -> Result<(), FeedError> {
        let ticket = self.begin_generation(place_name, interests)?;
        let result = source.generate_story(&ticket.request);
        self.finish_generation(ticket, result)
    }

    /// Check the backend listing once for the pending artifact.
    pub fn poll(&mut self, source: &dyn ContentSource) -> &PersonalizationState {
        if !self.state.is_generating() {
            return &self.state;
        }
        let token = self.token;
        let videos = source.try_fetch_videos();
        self.apply_poll(token, videos)
    }

    /// Apply a listing fetched on behalf of `token`. Listing errors count as
    /// "not ready yet".
    pub fn apply_poll(
        &mut self,
        token: u64,
        videos: Result<Vec<RawVideo>, FeedError>,
    ) -> &PersonalizationState {
        if token != self.token {
            debug!(token, current = self.token, "dropping stale poll response");
            return &self.state;
        }
        if !self.state.is_generating() {
            return &self.state;
        }

        match videos {
            Ok(videos) => {
                if let Some(video) = self.find_artifact(&videos) {
                    info!(url = %video.url, "personalized video is ready");
                    let ready = self.ready_video(video);
                    self.state = PersonalizationState::Ready(ready);
                    self.pending = None;
                    self.generating_since = None;
                    if let Err(e) = self.store.clear_pending_personalization() {
                        warn!(error = %e, "could not clear pending personalization");
                    }
                    return &self.state;
                }
            }
            Err(e) => debug!(error = %e, "poll failed, treating as not ready"),
        }

        self.expire_if_overdue(Utc::now());
        &self.state
    }

    /// Move a stuck `Generating` state to `Failed` once the timeout elapses.
    pub fn expire_if_overdue(&mut self, now: DateTime<Utc>) -> bool {
        let Some(since) = self.generating_since else {
            return false;
        };
        if !self.state.is_generating() {
            return false;
        }
        let elapsed = (now - since).to_std().unwrap_or(Duration::ZERO);
        if elapsed < self.timeout {
            return false;
        }
        let reason = FeedError::GenerationTimedOut(self.timeout.as_secs()).to_string();
        warn!(%reason, "giving up on personalized video");
        self.fail(reason);
        true
    }

    /// Back to `Absent`; in-flight responses become stale.
    pub fn reset(&mut self) {
        self.token += 1;
        self.state = PersonalizationState::Absent;
        self.pending = None;
        self.generating_since = None;
        if let Err(e) = self.store.clear_pending_personalization() {
            warn!(error = %e, "could not clear pending personalization");
        }
        debug!(token = self.token, "personalization reset");
    }

    /// Invalidate outstanding responses without changing state.
    pub fn invalidate(&mut self) {
        self.token += 1;
    }

    fn fail(&mut self, reason: String) {
        self.token += 1;
        self.state = PersonalizationState::Failed(reason);
        self.pending = None;
        self.generating_since = None;
        if let Err(e) = self.store.clear_pending_personalization() {
            warn!(error = %e, "could not clear pending personalization");
        }
    }

    fn find_artifact<'a>(&self, videos: &'a [RawVideo]) -> Option<&'a RawVideo> {
        let pending = self.pending.as_ref()?;
        videos
            .iter()
            .find(|v| matches_artifact(&pending.video_path, v))
    }

    fn ready_video(&self, raw: &RawVideo) -> Video {
        let place = self
            .pending
            .as_ref()
            .map(|p| p.location.clone())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "Your Location".to_string());
        Video {
            id: PERSONALIZED_VIDEO_ID.to_string(),
            title: "✨ Your Personalized Story".to_string(),
            description: "A sustainability story created just for you based on your daily habits"
                .to_string(),
            media_url: Some(self.composer.resolve_url(&raw.url)),
            subtitle_url: raw
                .subtitle_url
                .as_deref()
                .map(|s| self.composer.resolve_url(s)),
            thumbnail_url: placeholder_thumbnail("personalized"),
            creator: "AI Personalized".to_string(),
            location: VideoLocation {
                name: place,
                region: "Personalized".to_string(),
            },
            year: current_year(),
            category: "personalized".to_string(),
            is_personalized: true,
            likes: 0,
            comments: 0,
        }
    }
}

/// A listed video is the pending artifact when its URL equals the returned
/// path or the path names its file.
pub fn matches_artifact(video_path: &str, video: &RawVideo) -> bool {
    if video.url == video_path {
        return true;
    }
    let name = video.file_name();
    !name.is_empty() && video_path.contains(name)
}
