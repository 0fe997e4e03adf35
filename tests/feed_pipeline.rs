use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use ecofeed::backend::{
    ContentSource, GenerateRequest, GenerateResponse, RawVideo, ValidateRequest, ValidateResponse,
};
use ecofeed::config::Config;
use ecofeed::error::FeedError;
use ecofeed::event::FeedEvent;
use ecofeed::feed::item::{FeedItem, FeedKind};
use ecofeed::personalize::{PERSONALIZED_VIDEO_ID, PersonalizationState, SLOT_ID};
use ecofeed::session::FeedSession;
use ecofeed::store::json_store::JsonProfileStore;
use ecofeed::store::memory_store::MemoryProfileStore;
use ecofeed::store::schema::{InterestAnswers, ProfileKey, UserLocation};
use ecofeed::store::{ProfileStoreExt, UserProfileStore};

/// In-process stand-in for the story backend.
#[derive(Default)]
struct StubBackend {
    videos: Mutex<Vec<RawVideo>>,
    listing_down: Mutex<bool>,
    generated_path: Mutex<Option<String>>,
    prompts: Mutex<Vec<String>>,
}

impl StubBackend {
    fn with_videos(n: usize) -> Self {
        let backend = Self::default();
        *backend.videos.lock().unwrap() = (0..n).map(|i| video(&format!("gen-{i}"))).collect();
        backend
    }

    fn publish(&self, id: &str) {
        self.videos.lock().unwrap().push(video(id));
    }
}

impl ContentSource for StubBackend {
    fn try_fetch_videos(&self) -> Result<Vec<RawVideo>, FeedError> {
        if *self.listing_down.lock().unwrap() {
            return Err(FeedError::Http { status: 503 });
        }
        Ok(self.videos.lock().unwrap().clone())
    }

    fn generate_story(&self, request: &GenerateRequest) -> Result<GenerateResponse, FeedError> {
        self.prompts.lock().unwrap().push(request.location.clone());
        match self.generated_path.lock().unwrap().clone() {
            Some(path) => Ok(GenerateResponse {
                video_path: Some(path),
                ..GenerateResponse::default()
            }),
            None => Err(FeedError::Http { status: 500 }),
        }
    }

    fn validate_challenge(&self, _: &ValidateRequest) -> Result<ValidateResponse, FeedError> {
        Ok(ValidateResponse {
            valid: true,
            message: None,
        })
    }
}

fn video(id: &str) -> RawVideo {
    RawVideo {
        id: id.to_string(),
        url: format!("/api/video/{id}.mp4"),
        title: Some(format!("Story {id}")),
        subtitle_url: None,
        created_at: "2031-03-01T09:30:00".to_string(),
        filename: Some(format!("{id}.mp4")),
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.poll_interval_secs = 1;
    config
}

fn session_with(backend: Arc<StubBackend>, store: Arc<dyn UserProfileStore>) -> FeedSession {
    FeedSession::with_rng(test_config(), backend, store, SmallRng::seed_from_u64(7))
}

fn ids(feed: &[FeedItem]) -> Vec<&str> {
    feed.iter().map(|i| i.id()).collect()
}

/// Pump events until `done` holds or the deadline passes.
fn pump_until(session: &mut FeedSession, done: impl Fn(&FeedSession) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !done(session) {
        assert!(Instant::now() < deadline, "timed out waiting for session state");
        let _ = session.pump(Duration::from_millis(100));
    }
}

#[test]
fn five_backend_videos_with_prompt_slot() {
    let backend = Arc::new(StubBackend::with_videos(5));
    let mut session = session_with(backend, Arc::new(MemoryProfileStore::new()));
    session.load_feed();

    assert_eq!(
        ids(session.base_feed()),
        vec!["gen-0", "gen-1", "quiz-0", "gen-2", "gen-3", "challenge-0", "gen-4"]
    );
    let feed = session.composed_feed();
    assert_eq!(
        ids(&feed),
        vec!["gen-0", "gen-1", "quiz-0", SLOT_ID, "gen-2", "gen-3", "challenge-0", "gen-4"]
    );
    assert_eq!(feed[3].kind(), FeedKind::PersonalizedPrompt);
}

#[test]
fn unreachable_backend_uses_offline_feed() {
    let backend = Arc::new(StubBackend::default());
    *backend.listing_down.lock().unwrap() = true;
    let mut session = session_with(backend, Arc::new(MemoryProfileStore::new()));
    session.load_feed();

    assert_eq!(session.base_feed().len(), 18);
    let feed = session.composed_feed();
    assert_eq!(feed.len(), 19);
    assert_eq!(feed[session.slot_index()].id(), SLOT_ID);
    assert_eq!(
        feed.iter().filter(|i| i.kind() == FeedKind::Video).count(),
        12
    );
}

#[test]
fn background_fetch_composes_feed() {
    let backend = Arc::new(StubBackend::with_videos(3));
    let mut session = session_with(backend, Arc::new(MemoryProfileStore::new()));
    assert!(session.base_feed().is_empty());
    session.start();
    pump_until(&mut session, |s| !s.base_feed().is_empty());
    assert_eq!(ids(session.base_feed()), vec!["gen-0", "gen-1", "quiz-0", "gen-2"]);
    // Slot clamps to the end of a short feed
    assert_eq!(session.slot_index(), 3);
    assert_eq!(session.composed_feed().len(), 5);
}

#[test]
fn personalization_flows_from_prompt_to_video() {
    let backend = Arc::new(StubBackend::with_videos(6));
    *backend.generated_path.lock().unwrap() = Some("data/videos/mine.mp4".to_string());
    let store = Arc::new(MemoryProfileStore::new());
    let mut session = session_with(backend.clone(), store.clone());
    session.load_feed();
    let base_len = session.base_feed().len();

    let interests = InterestAnswers {
        drink: Some("Coffee".to_string()),
        walking_place: Some("Cubbon Park".to_string()),
        other_habit: None,
    };
    session
        .request_personalization(&UserLocation::named("Bengaluru"), &interests)
        .unwrap();
    assert_eq!(session.composed_feed()[3].kind(), FeedKind::Loading);
    assert!(store.onboarding_seen());
    assert_eq!(store.user_location().unwrap().place_name, "Bengaluru");

    pump_until(&mut session, |s| s.is_polling());
    assert!(store.pending_personalization().is_some());
    let prompts = backend.prompts.lock().unwrap().clone();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].starts_with("Location: Bengaluru"));

    backend.publish("mine");
    pump_until(&mut session, |s| s.personalization().is_ready());

    let feed = session.composed_feed();
    assert_eq!(feed.len(), base_len + 1);
    match &feed[3] {
        FeedItem::Video(v) => {
            assert_eq!(v.id, PERSONALIZED_VIDEO_ID);
            assert!(v.is_personalized);
        }
        other => panic!("expected personalized video, got {:?}", other.kind()),
    }
    assert!(!session.is_polling());
    assert!(store.pending_personalization().is_none());
}

#[test]
fn second_request_while_generating_is_rejected() {
    let backend = Arc::new(StubBackend::with_videos(2));
    *backend.generated_path.lock().unwrap() = Some("/api/video/x.mp4".to_string());
    let mut session = session_with(backend.clone(), Arc::new(MemoryProfileStore::new()));
    let here = UserLocation::named("Jaipur");
    session
        .request_personalization(&here, &InterestAnswers::default())
        .unwrap();
    let err = session
        .request_personalization(&here, &InterestAnswers::default())
        .unwrap_err();
    assert!(matches!(err, FeedError::GenerationInFlight));

    pump_until(&mut session, |s| s.is_polling());
    assert_eq!(backend.prompts.lock().unwrap().len(), 1);
}

#[test]
fn failed_generation_surfaces_and_reverts() {
    let backend = Arc::new(StubBackend::with_videos(2));
    let mut session = session_with(backend, Arc::new(MemoryProfileStore::new()));
    session
        .request_personalization(&UserLocation::named("Surat"), &InterestAnswers::default())
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    let err = loop {
        assert!(Instant::now() < deadline, "no generation result");
        if let Err(e) = session.pump(Duration::from_millis(100)) {
            break e;
        }
    };
    assert!(matches!(err, FeedError::Http { status: 500 }));
    assert_eq!(session.personalization(), &PersonalizationState::Absent);
    assert!(!session.is_polling());
}

#[test]
fn reset_discards_late_generation_result() {
    let backend = Arc::new(StubBackend::with_videos(4));
    *backend.generated_path.lock().unwrap() = Some("/api/video/late.mp4".to_string());
    let store = Arc::new(MemoryProfileStore::new());
    let mut session = session_with(backend.clone(), store.clone());
    session.load_feed();
    session
        .request_personalization(&UserLocation::named("Agra"), &InterestAnswers::default())
        .unwrap();
    session.reset_personalization();
    backend.publish("late");

    // Let the worker deliver its now-stale acknowledgement
    let deadline = Instant::now() + Duration::from_millis(1500);
    while Instant::now() < deadline {
        session.pump(Duration::from_millis(100)).unwrap();
    }
    assert_eq!(session.personalization(), &PersonalizationState::Absent);
    assert!(!session.is_polling());
    assert!(store.pending_personalization().is_none());
    assert_eq!(session.composed_feed()[3].kind(), FeedKind::PersonalizedPrompt);
}

#[test]
fn events_after_teardown_are_dropped() {
    let backend = Arc::new(StubBackend::with_videos(2));
    let mut session = session_with(backend, Arc::new(MemoryProfileStore::new()));
    session.load_feed();
    let before = ids(session.base_feed()).join(",");

    session.teardown();
    session
        .handle_event(FeedEvent::VideosFetched(vec![video("ghost")]))
        .unwrap();
    assert_eq!(ids(session.base_feed()).join(","), before);
}

#[test]
fn late_poll_after_teardown_keeps_slot_generating() {
    let backend = Arc::new(StubBackend::with_videos(3));
    *backend.generated_path.lock().unwrap() = Some("/api/video/after.mp4".to_string());
    let mut session = session_with(backend.clone(), Arc::new(MemoryProfileStore::new()));
    session.load_feed();
    session
        .request_personalization(&UserLocation::named("Kochi"), &InterestAnswers::default())
        .unwrap();
    pump_until(&mut session, |s| s.is_polling());
    let token = session.generation_token();

    session.teardown();
    assert!(!session.is_polling());
    session
        .handle_event(FeedEvent::PollResult {
            token,
            videos: Ok(vec![video("after")]),
        })
        .unwrap();
    assert!(session.personalization().is_generating());
    assert_eq!(session.composed_feed()[3].kind(), FeedKind::Loading);
}

#[test]
fn idle_session_emits_no_events() {
    let backend = Arc::new(StubBackend::with_videos(2));
    let mut session = session_with(backend, Arc::new(MemoryProfileStore::new()));
    session.load_feed();
    // Poll interval is one second; an idle session must stay quiet past it
    assert!(!session.pump(Duration::from_millis(1500)).unwrap());
}

#[test]
fn ticks_stop_once_generation_settles() {
    let backend = Arc::new(StubBackend::with_videos(2));
    *backend.generated_path.lock().unwrap() = Some("/api/video/quick.mp4".to_string());
    backend.publish("quick");
    let mut session = session_with(backend, Arc::new(MemoryProfileStore::new()));
    session
        .request_personalization(&UserLocation::named("Ooty"), &InterestAnswers::default())
        .unwrap();
    pump_until(&mut session, |s| s.personalization().is_ready());

    // Drain anything queued before the workers stopped
    while session.pump(Duration::from_millis(1100)).unwrap() {}
    assert!(!session.pump(Duration::from_millis(1500)).unwrap());
}

#[test]
fn stores_share_change_notification_rule() {
    let dir = TempDir::new().unwrap();
    let stores: Vec<Arc<dyn UserProfileStore>> = vec![
        Arc::new(MemoryProfileStore::new()),
        Arc::new(JsonProfileStore::with_base_dir(dir.path().to_path_buf()).unwrap()),
    ];
    for store in stores {
        let changes = store.subscribe();
        store.mark_onboarding_seen().unwrap();
        store.mark_onboarding_seen().unwrap();
        store.remove(ProfileKey::Points).unwrap();
        store.set_points(20).unwrap();
        store.remove(ProfileKey::Points).unwrap();

        let seen: Vec<(ProfileKey, Option<String>)> =
            changes.try_iter().map(|c| (c.key, c.value)).collect();
        assert_eq!(
            seen,
            vec![
                (ProfileKey::OnboardingSeen, Some("true".to_string())),
                (ProfileKey::Points, Some("20".to_string())),
                (ProfileKey::Points, None),
            ]
        );
    }
}

#[test]
fn pending_request_resumes_in_new_session() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(StubBackend::with_videos(4));
    *backend.generated_path.lock().unwrap() = Some("/api/video/resume.mp4".to_string());

    {
        let store = Arc::new(JsonProfileStore::with_base_dir(dir.path().to_path_buf()).unwrap());
        let mut session = session_with(backend.clone(), store);
        session
            .request_personalization(&UserLocation::named("Shimla"), &InterestAnswers::default())
            .unwrap();
        pump_until(&mut session, |s| s.is_polling());
    }

    let store = Arc::new(JsonProfileStore::with_base_dir(dir.path().to_path_buf()).unwrap());
    assert!(store.get(ProfileKey::PendingPersonalization).is_some());
    let mut session = session_with(backend.clone(), store);
    assert!(session.personalization().is_generating());

    backend.publish("resume");
    // The initial listing doubles as the first poll
    session.load_feed();
    assert!(session.personalization().is_ready());
}

#[test]
fn viewport_tracks_latest_visible_item() {
    let backend = Arc::new(StubBackend::with_videos(5));
    let mut session = session_with(backend, Arc::new(MemoryProfileStore::new()));
    session.load_feed();
    assert_eq!(session.active_index(), Some(0));

    session.observe_visibility(2, 0.6);
    session.observe_visibility(3, 0.7);
    assert_eq!(session.active_index(), Some(3));
    assert_eq!(session.active_item().unwrap().id(), SLOT_ID);

    assert_eq!(session.observe_visibility(4, 0.3), None);
    assert_eq!(session.active_index(), Some(3));
}

#[test]
fn location_denied_marks_onboarding_only() {
    let store = Arc::new(MemoryProfileStore::new());
    let changes = store.subscribe();
    let mut session = session_with(Arc::new(StubBackend::default()), store.clone());
    session.location_denied().unwrap();

    assert!(store.onboarding_seen());
    assert!(store.user_location().is_none());
    assert_eq!(session.personalization(), &PersonalizationState::Absent);
    let change = changes.try_recv().unwrap();
    assert_eq!(change.key, ProfileKey::OnboardingSeen);
}
