use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::backend::{GenerateResponse, RawVideo};
use crate::error::FeedError;
use crate::personalize::GenerationTicket;

/// Results delivered from worker threads to the session thread.
pub enum FeedEvent {
    VideosFetched(Vec<RawVideo>),
    GenerationFinished {
        ticket: GenerationTicket,
        result: Result<GenerateResponse, FeedError>,
    },
    PollResult {
        token: u64,
        videos: Result<Vec<RawVideo>, FeedError>,
    },
    Tick,
}

pub struct EventHandler {
    rx: mpsc::Receiver<FeedEvent>,
    tx: mpsc::Sender<FeedEvent>,
}

/// Keeps a tick thread alive. Dropping it stops the ticks.
pub struct Ticker {
    _stop: mpsc::Sender<()>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { rx, tx }
    }

    /// Emit `Tick` every `tick_rate` until the returned `Ticker` is dropped.
    pub fn start_ticks(&self, tick_rate: Duration) -> Ticker {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let tx = self.tx.clone();
        thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(tick_rate) {
                    Err(RecvTimeoutError::Timeout) => {
                        if tx.send(FeedEvent::Tick).is_err() {
                            return;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                }
            }
        });
        Ticker { _stop: stop_tx }
    }

    pub fn sender(&self) -> mpsc::Sender<FeedEvent> {
        self.tx.clone()
    }

    pub fn next_timeout(&self, timeout: Duration) -> Option<FeedEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
