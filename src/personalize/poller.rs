use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::backend::ContentSource;
use crate::event::FeedEvent;

/// Background thread that lists backend videos every `interval` and reports
/// them tagged with the generation token it was started for. Dropping the
/// poller stops the thread at its next wake-up.
pub struct Poller {
    token: u64,
    _stop: mpsc::Sender<()>,
}

impl Poller {
    pub fn spawn(
        source: Arc<dyn ContentSource>,
        token: u64,
        interval: Duration,
        events: mpsc::Sender<FeedEvent>,
    ) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        thread::spawn(move || {
            debug!(token, ?interval, "personalization poller started");
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
                let videos = source.try_fetch_videos();
                // Cancelled while the request was in flight
                if matches!(stop_rx.try_recv(), Err(mpsc::TryRecvError::Disconnected)) {
                    break;
                }
                if events.send(FeedEvent::PollResult { token, videos }).is_err() {
                    break;
                }
            }
            debug!(token, "personalization poller stopped");
        });
        Self {
            token,
            _stop: stop_tx,
        }
    }

    pub fn token(&self) -> u64 {
        self.token
    }
}
