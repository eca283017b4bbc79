//! Running score while the learner is still speaking.
//!
//! A [`LiveAnalysisLoop`] moves through `Idle → Listening → Finalizing → Idle`.
//! While listening, a background ticker re-scores the current (possibly
//! partial) transcript every [`LiveParams::tick_interval`] and publishes only
//! the overall score. The full [`PronunciationResult`](crate::PronunciationResult)
//! is built once, by [`LiveAnalysisLoop::finish`], from the final transcript.
//!
//! ```no_run
//! use std::sync::Arc;
//! use pronounce_rs::history::{History, MemoryStore};
//! use pronounce_rs::live::{LiveAnalysisLoop, SharedTranscript};
//! use pronounce_rs::SessionAnalyzer;
//!
//! let transcript = SharedTranscript::new();
//! let mut live = LiveAnalysisLoop::new(
//!     Arc::new(SessionAnalyzer::new()),
//!     Arc::new(transcript.clone()),
//!     History::new(Box::new(MemoryStore::default())),
//! );
//!
//! live.start("good morning")?;
//! transcript.set("good");
//! // ... speech recognizer keeps updating the transcript ...
//! transcript.set("good morning");
//! let recorded = live.finish()?;
//! println!("final score: {}", recorded.result.overall_score);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use derive_builder::Builder;
use parking_lot::{Mutex, RwLock};

use crate::error::PronounceError;
use crate::history::{History, RecordedResult};
use crate::scoring::SessionAnalyzer;

/// Supplies the latest transcript of the current utterance.
pub trait TranscriptSource: Send + Sync {
    fn current_transcript(&self) -> String;
}

impl<F> TranscriptSource for F
where
    F: Fn() -> String + Send + Sync,
{
    fn current_transcript(&self) -> String {
        self()
    }
}

/// Transcript buffer shared between a speech recognizer and the live loop.
///
/// Clones refer to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedTranscript {
    text: Arc<RwLock<String>>,
}

impl SharedTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, text: impl Into<String>) {
        *self.text.write() = text.into();
    }

    pub fn clear(&self) {
        self.text.write().clear();
    }
}

impl TranscriptSource for SharedTranscript {
    fn current_transcript(&self) -> String {
        self.text.read().clone()
    }
}

/// Parameters for the live loop.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct LiveParams {
    /// Time between two running-score ticks.
    #[builder(default = "LiveParams::DEFAULT_TICK_INTERVAL")]
    pub tick_interval: Duration,
}

impl LiveParams {
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
}

impl Default for LiveParams {
    fn default() -> Self {
        Self {
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
        }
    }
}

impl LiveParamsBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.tick_interval {
            Some(interval) if interval.is_zero() => {
                Err("tick_interval must be greater than zero".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Listening,
    Finalizing,
}

/// Called with every running score. Runs on the ticker thread while the
/// session lock is held, so it must not call back into the loop.
pub type ScoreListener = Arc<dyn Fn(u8) + Send + Sync>;

#[derive(Debug)]
struct SessionShared {
    state: SessionState,
    /// Bumped whenever a session starts or ends; ticks carrying an older
    /// value are discarded.
    generation: u64,
    target: String,
    running_score: Option<u8>,
}

struct Ticker {
    stop: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Drives one listening session at a time.
pub struct LiveAnalysisLoop {
    analyzer: Arc<SessionAnalyzer>,
    source: Arc<dyn TranscriptSource>,
    history: History,
    params: LiveParams,
    listener: Option<ScoreListener>,
    shared: Arc<Mutex<SessionShared>>,
    ticker: Option<Ticker>,
}

impl LiveAnalysisLoop {
    pub fn new(
        analyzer: Arc<SessionAnalyzer>,
        source: Arc<dyn TranscriptSource>,
        history: History,
    ) -> Self {
        Self::with_params(analyzer, source, history, LiveParams::default())
    }

    pub fn with_params(
        analyzer: Arc<SessionAnalyzer>,
        source: Arc<dyn TranscriptSource>,
        history: History,
        params: LiveParams,
    ) -> Self {
        Self {
            analyzer,
            source,
            history,
            params,
            listener: None,
            shared: Arc::new(Mutex::new(SessionShared {
                state: SessionState::Idle,
                generation: 0,
                target: String::new(),
                running_score: None,
            })),
            ticker: None,
        }
    }

    /// Register a callback for running scores. Applies from the next `start`.
    pub fn on_score(&mut self, listener: impl Fn(u8) + Send + Sync + 'static) {
        self.listener = Some(Arc::new(listener));
    }

    pub fn state(&self) -> SessionState {
        self.shared.lock().state
    }

    /// Latest running score of the open session, if a tick has completed.
    pub fn running_score(&self) -> Option<u8> {
        self.shared.lock().running_score
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Open a listening session for `target`.
    ///
    /// A session that is still open is cancelled first, so at most one
    /// ticker runs at any time.
    pub fn start(&mut self, target: impl Into<String>) -> Result<(), PronounceError> {
        if self.state() != SessionState::Idle {
            log::info!("Cancelling open session before starting a new one");
            self.reset();
        }

        let target = target.into();
        let generation = {
            let mut shared = self.shared.lock();
            shared.generation += 1;
            shared.state = SessionState::Listening;
            shared.target = target.clone();
            shared.running_score = None;
            shared.generation
        };

        match self.spawn_ticker(generation) {
            Ok(ticker) => {
                self.ticker = Some(ticker);
                log::info!("Listening session started for {target:?}");
                Ok(())
            }
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    /// Close the session and score the final transcript once.
    ///
    /// The ticker is stopped before the final transcript is read. Failing to
    /// persist the result is reported in [`RecordedResult::persist_error`].
    pub fn finish(&mut self) -> Result<RecordedResult, PronounceError> {
        let target = {
            let mut shared = self.shared.lock();
            if shared.state != SessionState::Listening {
                return Err(PronounceError::SessionNotActive);
            }
            shared.state = SessionState::Finalizing;
            shared.generation += 1;
            std::mem::take(&mut shared.target)
        };
        self.stop_ticker();

        let transcript = self.source.current_transcript();
        let recorded = self
            .analyzer
            .analyze_and_record(&transcript, &target, &mut self.history);

        {
            let mut shared = self.shared.lock();
            shared.state = SessionState::Idle;
            shared.running_score = None;
        }
        log::info!(
            "Listening session finished: score {} for {target:?}",
            recorded.result.overall_score
        );
        Ok(recorded)
    }

    /// Abandon the open session, if any, without producing a result.
    pub fn reset(&mut self) {
        {
            let mut shared = self.shared.lock();
            if shared.state != SessionState::Idle {
                log::debug!("Resetting session in state {:?}", shared.state);
            }
            shared.generation += 1;
            shared.state = SessionState::Idle;
            shared.target.clear();
            shared.running_score = None;
        }
        self.stop_ticker();
    }

    fn spawn_ticker(&self, generation: u64) -> Result<Ticker, PronounceError> {
        let (stop, stop_rx) = mpsc::channel::<()>();
        let analyzer = Arc::clone(&self.analyzer);
        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.shared);
        let listener = self.listener.clone();
        let interval = self.params.tick_interval;

        let handle = thread::Builder::new()
            .name("live-analysis".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        // Stop requested or the loop was dropped.
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }

                    let target = {
                        let session = shared.lock();
                        if session.generation != generation {
                            break;
                        }
                        session.target.clone()
                    };

                    let transcript = source.current_transcript();
                    let score = analyzer.score(&transcript, &target);

                    let mut session = shared.lock();
                    if session.generation != generation
                        || session.state != SessionState::Listening
                    {
                        log::debug!("Discarding tick from a closed session");
                        break;
                    }
                    session.running_score = Some(score);
                    log::debug!("Running score {score} for {transcript:?}");
                    if let Some(listener) = &listener {
                        listener(score);
                    }
                }
                log::debug!("Live analysis ticker stopped");
            })?;

        Ok(Ticker { stop, handle })
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            // The worker may already have exited; a failed send is fine.
            let _ = ticker.stop.send(());
            if ticker.handle.join().is_err() {
                log::warn!("Live analysis ticker panicked");
            }
        }
    }
}

impl Drop for LiveAnalysisLoop {
    fn drop(&mut self) {
        self.reset();
    }
}
