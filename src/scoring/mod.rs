//! Text-based pronunciation scoring.
//!
//! Scoring works purely on words: a recognized transcript is compared with
//! the target phrase token by token, with no acoustic analysis involved.
//!
//! # Pipeline
//!
//! 1. [`tokenize`] lower-cases both strings and splits them on whitespace.
//! 2. An [`AlignmentStrategy`] pairs spoken tokens with target tokens.
//!    [`PositionalAlignment`] (the default) pairs them by index;
//!    [`SequenceAlignment`] re-synchronises after skipped or extra words.
//! 3. Each pair is scored with the normalized edit-distance [`similarity`]
//!    and labelled with a [`WordFeedback`].
//! 4. [`SessionAnalyzer`] averages the word scores and picks sentence-level
//!    feedback and suggestions from the same score bands.
//!
//! # Word Scores
//!
//! | Situation | Score | Feedback |
//! |---|---|---|
//! | target word not spoken | 0 | Missing word |
//! | spoken word with no target | 20 | Extra word |
//! | identical tokens | 100 | Perfect match |
//! | similarity ≥ 90 | similarity | Excellent pronunciation |
//! | similarity ≥ 75 | similarity | Good pronunciation |
//! | similarity ≥ 60 | similarity | Needs improvement |
//! | similarity ≥ 40 | similarity | Significant difference |
//! | otherwise | similarity | Very different from target |
//!
//! # Example
//!
//! ```rust
//! use pronounce_rs::scoring::SessionAnalyzer;
//!
//! let analyzer = SessionAnalyzer::new();
//! let result = analyzer.analyze("hello", "hello world");
//! assert_eq!(result.overall_score, 50);
//! assert_eq!(result.word_breakdown[1].feedback.label(), "Missing word");
//! ```

pub mod aligner;
pub mod analyzer;
pub mod phonetics;
pub mod similarity;

pub use aligner::{
    score_word, tokenize, AlignmentKind, AlignmentStrategy, PositionalAlignment, ScoreBand,
    SequenceAlignment, TokenPair, WordAligner, WordFeedback,
};
pub use analyzer::{AnalyzerParams, SessionAnalyzer};
pub use phonetics::PhoneticDictionary;
pub use similarity::{edit_distance, similarity};
