//! # pronounce-rs
//!
//! A Rust library for scoring a learner's spoken attempt at a phrase.
//!
//! ## Features
//!
//! - **Word-level scoring**: edit-distance similarity per aligned word, with feedback labels
//! - **Phonetic hints**: IPA-style transcriptions from a replaceable dictionary
//! - **Session feedback**: overall score, feedback text and practice suggestions
//! - **Live scoring**: running score while the transcript is still growing
//! - **History**: capped, newest-first result history over a pluggable store
//!
//! Speech recognition and synthesis stay with the host application; the crate
//! consumes a transcript string and describes speech requests.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! pronounce-rs = "2026.10"
//! ```
//!
//! ```rust
//! use pronounce_rs::history::{History, MemoryStore};
//! use pronounce_rs::SessionAnalyzer;
//!
//! let analyzer = SessionAnalyzer::new();
//! let mut history = History::new(Box::new(MemoryStore::default()));
//!
//! let recorded = analyzer.analyze_and_record("halo wurld", "hello world", &mut history);
//! for word in &recorded.result.word_breakdown {
//!     println!("{} [{}]: {} ({})", word.word, word.expected, word.score, word.feedback);
//! }
//! println!("{}: {}", recorded.result.overall_score, recorded.result.feedback);
//! ```

pub mod error;
pub mod history;
pub mod live;
pub mod scoring;
pub mod speech;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use error::PronounceError;
pub use history::{History, HistoryStore, RecordedResult};
pub use live::{LiveAnalysisLoop, LiveParams, SessionState, TranscriptSource};
pub use scoring::{
    similarity, AnalyzerParams, PhoneticDictionary, SessionAnalyzer, WordAligner, WordFeedback,
};
pub use speech::{SpeechOutput, SpeechRequest};

/// Score and feedback for one aligned position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordAnalysis {
    /// Target token, empty for an extra spoken word.
    pub word: String,
    /// Phonetic form of the target token.
    pub expected: String,
    /// Spoken token, empty for a missing word.
    pub spoken: String,
    /// 0 to 100.
    pub score: u8,
    pub feedback: WordFeedback,
}

/// The outcome of analyzing one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PronunciationResult {
    /// Rounded mean of the word scores, 0 to 100.
    pub overall_score: u8,
    pub word_breakdown: Vec<WordAnalysis>,
    pub feedback: String,
    pub suggestions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
