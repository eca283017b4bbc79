//! Speech output contract.
//!
//! Playback itself belongs to the host (browser voices, an OS synthesizer, a
//! TTS engine). The crate only describes what to say and how.
//!
//! ```
//! use pronounce_rs::speech::SpeechRequestBuilder;
//!
//! let request = SpeechRequestBuilder::default()
//!     .text("Nice to meet you")
//!     .rate(0.8)
//!     .voice("en-GB")
//!     .build()?;
//! assert_eq!(request.pitch, 1.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Slowest accepted speech rate multiplier.
pub const MIN_RATE: f32 = 0.1;
/// Fastest accepted speech rate multiplier.
pub const MAX_RATE: f32 = 10.0;
/// Accepted pitch range, inclusive.
pub const PITCH_RANGE: (f32, f32) = (0.0, 2.0);

/// Text plus playback parameters handed to a [`SpeechOutput`].
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SpeechRequest {
    #[builder(setter(into))]
    pub text: String,
    /// Speed multiplier, 1.0 is normal speed.
    #[builder(default = "1.0")]
    pub rate: f32,
    #[builder(default = "1.0")]
    pub pitch: f32,
    /// Host-specific voice identifier. `None` lets the host choose.
    #[builder(setter(into, strip_option), default)]
    pub voice: Option<String>,
}

impl SpeechRequest {
    /// Request with default rate, pitch and voice.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rate: 1.0,
            pitch: 1.0,
            voice: None,
        }
    }
}

impl SpeechRequestBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(text) = &self.text {
            if text.trim().is_empty() {
                return Err("text must not be empty".to_string());
            }
        }
        if let Some(rate) = self.rate {
            if !(MIN_RATE..=MAX_RATE).contains(&rate) {
                return Err(format!(
                    "rate {rate} outside [{MIN_RATE}, {MAX_RATE}]"
                ));
            }
        }
        if let Some(pitch) = self.pitch {
            let (lo, hi) = PITCH_RANGE;
            if !(lo..=hi).contains(&pitch) {
                return Err(format!("pitch {pitch} outside [{lo}, {hi}]"));
            }
        }
        Ok(())
    }
}

/// Fire-and-forget speech playback.
pub trait SpeechOutput {
    fn speak(&mut self, request: &SpeechRequest);

    /// Stop any playback in progress. Hosts without cancellation can ignore it.
    fn cancel(&mut self) {}
}

/// Speech output that only logs what it would say.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSpeechOutput;

impl SpeechOutput for LogSpeechOutput {
    fn speak(&mut self, request: &SpeechRequest) {
        log::info!(
            "speak {:?} (rate {}, pitch {}, voice {})",
            request.text,
            request.rate,
            request.pitch,
            request.voice.as_deref().unwrap_or("default")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        spoken: Vec<SpeechRequest>,
        cancelled: bool,
    }

    impl SpeechOutput for Recorder {
        fn speak(&mut self, request: &SpeechRequest) {
            self.spoken.push(request.clone());
        }

        fn cancel(&mut self) {
            self.cancelled = true;
        }
    }

    #[test]
    fn builder_applies_defaults() {
        let request = SpeechRequestBuilder::default()
            .text("hello")
            .build()
            .expect("valid request");
        assert_eq!(request, SpeechRequest::new("hello"));
    }

    #[test]
    fn builder_requires_text() {
        assert!(SpeechRequestBuilder::default().rate(1.2).build().is_err());
        assert!(SpeechRequestBuilder::default().text("   ").build().is_err());
    }

    #[test]
    fn builder_rejects_out_of_range_parameters() {
        assert!(SpeechRequestBuilder::default()
            .text("hi")
            .rate(0.0)
            .build()
            .is_err());
        assert!(SpeechRequestBuilder::default()
            .text("hi")
            .pitch(2.5)
            .build()
            .is_err());
        assert!(SpeechRequestBuilder::default()
            .text("hi")
            .rate(0.5)
            .pitch(0.0)
            .voice("en-US")
            .build()
            .is_ok());
    }

    #[test]
    fn outputs_receive_requests() {
        let mut recorder = Recorder::default();
        recorder.speak(&SpeechRequest::new("good morning"));
        recorder.cancel();
        LogSpeechOutput.speak(&SpeechRequest::new("good morning"));
        assert_eq!(recorder.spoken.len(), 1);
        assert_eq!(recorder.spoken[0].text, "good morning");
        assert!(recorder.cancelled);
    }
}
