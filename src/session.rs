use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use crate::backend::{ContentSource, RawVideo};
use crate::config::Config;
use crate::error::FeedError;
use crate::event::{EventHandler, FeedEvent, Ticker};
use crate::feed::composer::FeedComposer;
use crate::feed::item::FeedItem;
use crate::feed::splice_slot;
use crate::feed::viewport::ViewportController;
use crate::personalize::poller::Poller;
use crate::personalize::{PersonalizationManager, PersonalizationState};
use crate::store::schema::{InterestAnswers, ProfileChange, UserLocation};
use crate::store::{ProfileStoreExt, UserProfileStore};

/// One scroll session. All state lives on the thread that owns the session;
/// network work runs on worker threads that report back through `events`.
pub struct FeedSession {
    config: Config,
    source: Arc<dyn ContentSource>,
    store: Arc<dyn UserProfileStore>,
    composer: FeedComposer,
    rng: SmallRng,
    base_feed: Vec<FeedItem>,
    personalization: PersonalizationManager,
    viewport: ViewportController,
    events: EventHandler,
    poller: Option<Poller>,
    ticker: Option<Ticker>,
    torn_down: bool,
}

impl FeedSession {
    pub fn new(
        config: Config,
        source: Arc<dyn ContentSource>,
        store: Arc<dyn UserProfileStore>,
    ) -> Self {
        Self::with_rng(config, source, store, SmallRng::from_entropy())
    }

    pub fn with_rng(
        config: Config,
        source: Arc<dyn ContentSource>,
        store: Arc<dyn UserProfileStore>,
        rng: SmallRng,
    ) -> Self {
        let personalization = PersonalizationManager::new(&config, store.clone());
        Self {
            composer: FeedComposer::new(&config.backend_url),
            viewport: ViewportController::new(config.visibility_threshold, 0),
            events: EventHandler::new(),
            config,
            source,
            store,
            rng,
            base_feed: Vec::new(),
            personalization,
            poller: None,
            ticker: None,
            torn_down: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn personalization(&self) -> &PersonalizationState {
        self.personalization.state()
    }

    pub fn base_feed(&self) -> &[FeedItem] {
        &self.base_feed
    }

    /// Base feed with the personalization slot spliced in.
    pub fn composed_feed(&self) -> Vec<FeedItem> {
        splice_slot(
            &self.base_feed,
            self.config.personalization_slot,
            self.personalization.slot_item(),
        )
    }

    /// Index of the personalization slot in `composed_feed`.
    pub fn slot_index(&self) -> usize {
        self.config.personalization_slot.min(self.base_feed.len())
    }

    /// Fetch backend videos on the calling thread and compose the feed.
    pub fn load_feed(&mut self) {
        let videos = self.source.fetch_videos();
        self.set_videos(videos);
    }

    /// Fetch backend videos on a worker thread; the result arrives as
    /// `FeedEvent::VideosFetched`.
    pub fn start(&mut self) {
        let source = self.source.clone();
        let tx = self.events.sender();
        thread::spawn(move || {
            let _ = tx.send(FeedEvent::VideosFetched(source.fetch_videos()));
        });
        self.ensure_polling();
    }

    pub fn set_videos(&mut self, videos: Vec<RawVideo>) {
        self.base_feed = self.composer.compose(&videos, &mut self.rng);
        self.viewport.reset(self.base_feed.len() + 1);
        info!(items = self.base_feed.len(), backend_videos = videos.len(), "feed composed");

        // The same listing answers an outstanding personalization check
        if self.personalization.state().is_generating() {
            let token = self.personalization.token();
            self.personalization.apply_poll(token, Ok(videos));
            self.sync_poller();
        }
    }

    /// Start generating a personalized video in the background.
    pub fn request_personalization(
        &mut self,
        location: &UserLocation,
        interests: &InterestAnswers,
    ) -> Result<(), FeedError> {
        let ticket = self
            .personalization
            .begin_generation(&location.place_name, interests)?;
        if let Err(e) = self.store.set_user_location(location) {
            warn!(error = %e, "could not remember user location");
        }
        if let Err(e) = self.store.mark_onboarding_seen() {
            warn!(error = %e, "could not record onboarding");
        }

        self.ensure_ticking();
        let source = self.source.clone();
        let tx = self.events.sender();
        thread::spawn(move || {
            let result = source.generate_story(&ticket.request);
            let _ = tx.send(FeedEvent::GenerationFinished { ticket, result });
        });
        Ok(())
    }

    /// The user declined location access: finish onboarding without
    /// personalization.
    pub fn location_denied(&mut self) -> Result<(), FeedError> {
        info!("location access denied, continuing without personalization");
        self.store.mark_onboarding_seen()
    }

    pub fn reset_personalization(&mut self) {
        self.poller = None;
        self.ticker = None;
        self.personalization.reset();
    }

    /// Apply one worker result. Generation failures are returned so the
    /// caller can show them; everything else degrades silently.
    pub fn handle_event(&mut self, event: FeedEvent) -> Result<(), FeedError> {
        if self.torn_down {
            debug!("session closed, dropping event");
            return Ok(());
        }
        match event {
            FeedEvent::VideosFetched(videos) => self.set_videos(videos),
            FeedEvent::GenerationFinished { ticket, result } => {
                let outcome = self.personalization.finish_generation(ticket, result);
                self.sync_poller();
                outcome?;
            }
            FeedEvent::PollResult { token, videos } => {
                self.personalization.apply_poll(token, videos);
                self.sync_poller();
            }
            FeedEvent::Tick => {
                if self.personalization.expire_if_overdue(Utc::now()) {
                    self.sync_poller();
                }
            }
        }
        Ok(())
    }

    /// Wait up to `timeout` for the next worker result and apply it.
    /// Returns `Ok(false)` when nothing arrived.
    pub fn pump(&mut self, timeout: Duration) -> Result<bool, FeedError> {
        match self.events.next_timeout(timeout) {
            Some(event) => self.handle_event(event).map(|()| true),
            None => Ok(false),
        }
    }

    pub fn observe_visibility(&mut self, index: usize, visible_fraction: f64) -> Option<usize> {
        self.viewport.observe(index, visible_fraction)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.viewport.active()
    }

    pub fn active_item(&self) -> Option<FeedItem> {
        let index = self.viewport.active()?;
        self.composed_feed().into_iter().nth(index)
    }

    pub fn subscribe_profile(&self) -> mpsc::Receiver<ProfileChange> {
        self.store.subscribe()
    }

    /// Stop polling and drop any response still in flight.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.poller = None;
        self.ticker = None;
        self.personalization.invalidate();
        debug!("feed session torn down");
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    /// Token that current worker results must carry to be applied.
    pub fn generation_token(&self) -> u64 {
        self.personalization.token()
    }

    fn ensure_polling(&mut self) {
        if self.torn_down || !self.personalization.state().is_generating() {
            return;
        }
        self.ensure_ticking();
        let token = self.personalization.token();
        if self.poller.as_ref().is_some_and(|p| p.token() == token) {
            return;
        }
        self.poller = Some(Poller::spawn(
            self.source.clone(),
            token,
            self.config.poll_interval(),
            self.events.sender(),
        ));
    }

    fn sync_poller(&mut self) {
        if self.personalization.state().is_generating() {
            self.ensure_polling();
        } else {
            self.ticker = None;
            if self.poller.take().is_some() {
                debug!(state = self.personalization.state().label(), "polling stopped");
            }
        }
    }

    /// Ticks drive the generation timeout and only run while a story is
    /// being generated.
    fn ensure_ticking(&mut self) {
        if self.ticker.is_none() && !self.torn_down {
            self.ticker = Some(self.events.start_ticks(self.config.poll_interval()));
        }
    }
}

impl Drop for FeedSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
