use std::fmt;

use serde::{Deserialize, Serialize};

use super::phonetics::PhoneticDictionary;
use super::similarity::similarity;
use crate::WordAnalysis;

/// Score for a spoken word that has no target counterpart.
pub const EXTRA_WORD_SCORE: u8 = 20;

/// Lower-case `text` and split it on runs of whitespace.
///
/// Punctuation stays attached to its token.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Score bands shared by word-level and sentence-level feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScoreBand {
    /// Below 40.
    Poor,
    /// 40..60
    Weak,
    /// 60..75
    Fair,
    /// 75..90
    Good,
    /// 90 and above.
    Excellent,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Self::Excellent,
            75..=89 => Self::Good,
            60..=74 => Self::Fair,
            40..=59 => Self::Weak,
            _ => Self::Poor,
        }
    }
}

/// Feedback label attached to a single aligned position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WordFeedback {
    #[serde(rename = "Perfect match")]
    PerfectMatch,
    #[serde(rename = "Excellent pronunciation")]
    Excellent,
    #[serde(rename = "Good pronunciation")]
    Good,
    #[serde(rename = "Needs improvement")]
    NeedsImprovement,
    #[serde(rename = "Significant difference")]
    SignificantDifference,
    #[serde(rename = "Very different from target")]
    VeryDifferent,
    #[serde(rename = "Missing word")]
    MissingWord,
    #[serde(rename = "Extra word")]
    ExtraWord,
}

impl WordFeedback {
    pub fn label(self) -> &'static str {
        match self {
            Self::PerfectMatch => "Perfect match",
            Self::Excellent => "Excellent pronunciation",
            Self::Good => "Good pronunciation",
            Self::NeedsImprovement => "Needs improvement",
            Self::SignificantDifference => "Significant difference",
            Self::VeryDifferent => "Very different from target",
            Self::MissingWord => "Missing word",
            Self::ExtraWord => "Extra word",
        }
    }
}

impl From<ScoreBand> for WordFeedback {
    fn from(band: ScoreBand) -> Self {
        match band {
            ScoreBand::Excellent => Self::Excellent,
            ScoreBand::Good => Self::Good,
            ScoreBand::Fair => Self::NeedsImprovement,
            ScoreBand::Weak => Self::SignificantDifference,
            ScoreBand::Poor => Self::VeryDifferent,
        }
    }
}

impl fmt::Display for WordFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score one spoken token against one target token. Either may be empty.
pub fn score_word(spoken: &str, target: &str) -> (u8, WordFeedback) {
    if !target.is_empty() && spoken.is_empty() {
        (0, WordFeedback::MissingWord)
    } else if !spoken.is_empty() && target.is_empty() {
        (EXTRA_WORD_SCORE, WordFeedback::ExtraWord)
    } else if spoken == target {
        (100, WordFeedback::PerfectMatch)
    } else {
        let score = (similarity(spoken, target) * 100.0).round() as u8;
        (score, ScoreBand::from_score(score).into())
    }
}

/// One aligned position: indices into the spoken and target token lists.
/// At least one side is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPair {
    pub spoken: Option<usize>,
    pub target: Option<usize>,
}

/// Strategy that decides which spoken token is compared with which target token.
pub trait AlignmentStrategy: Send + Sync + fmt::Debug {
    fn pair(&self, spoken: &[String], target: &[String]) -> Vec<TokenPair>;
}

/// Pairs tokens strictly by index.
///
/// An inserted or skipped word shifts every later comparison; the output
/// always has `max(spoken.len(), target.len())` pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalAlignment;

impl AlignmentStrategy for PositionalAlignment {
    fn pair(&self, spoken: &[String], target: &[String]) -> Vec<TokenPair> {
        let len = spoken.len().max(target.len());
        (0..len)
            .map(|i| TokenPair {
                spoken: (i < spoken.len()).then_some(i),
                target: (i < target.len()).then_some(i),
            })
            .collect()
    }
}

/// Token-level edit-distance alignment.
///
/// Substituting one word for another costs `1 - similarity`, skipping or
/// inserting a word costs 1, so the pairing re-synchronises after a missing
/// or extra word.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceAlignment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Start,
    Pair,
    Extra,
    Missing,
}

impl AlignmentStrategy for SequenceAlignment {
    fn pair(&self, spoken: &[String], target: &[String]) -> Vec<TokenPair> {
        let rows = spoken.len() + 1;
        let cols = target.len() + 1;
        let mut cost = vec![vec![0f64; cols]; rows];
        let mut steps = vec![vec![Step::Start; cols]; rows];

        for i in 1..rows {
            cost[i][0] = i as f64;
            steps[i][0] = Step::Extra;
        }
        for j in 1..cols {
            cost[0][j] = j as f64;
            steps[0][j] = Step::Missing;
        }

        for i in 1..rows {
            for j in 1..cols {
                let (s, t) = (&spoken[i - 1], &target[j - 1]);
                let sub = if s == t { 0.0 } else { 1.0 - similarity(s, t) };

                let mut best = (cost[i - 1][j - 1] + sub, Step::Pair);
                let missing = cost[i][j - 1] + 1.0;
                if missing < best.0 {
                    best = (missing, Step::Missing);
                }
                let extra = cost[i - 1][j] + 1.0;
                if extra < best.0 {
                    best = (extra, Step::Extra);
                }

                cost[i][j] = best.0;
                steps[i][j] = best.1;
            }
        }

        let mut pairs = Vec::with_capacity(rows.max(cols));
        let (mut i, mut j) = (spoken.len(), target.len());
        while i > 0 || j > 0 {
            match steps[i][j] {
                Step::Pair => {
                    i -= 1;
                    j -= 1;
                    pairs.push(TokenPair {
                        spoken: Some(i),
                        target: Some(j),
                    });
                }
                Step::Missing => {
                    j -= 1;
                    pairs.push(TokenPair {
                        spoken: None,
                        target: Some(j),
                    });
                }
                Step::Extra => {
                    i -= 1;
                    pairs.push(TokenPair {
                        spoken: Some(i),
                        target: None,
                    });
                }
                Step::Start => break,
            }
        }
        pairs.reverse();
        pairs
    }
}

/// Selects one of the built-in alignment strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentKind {
    #[default]
    Positional,
    Sequence,
}

impl AlignmentKind {
    pub fn strategy(self) -> Box<dyn AlignmentStrategy> {
        match self {
            Self::Positional => Box::new(PositionalAlignment),
            Self::Sequence => Box::new(SequenceAlignment),
        }
    }
}

/// Aligns a spoken transcript with a target phrase and scores every position.
#[derive(Debug)]
pub struct WordAligner {
    dictionary: PhoneticDictionary,
    strategy: Box<dyn AlignmentStrategy>,
}

impl Default for WordAligner {
    fn default() -> Self {
        Self::new(PhoneticDictionary::builtin(), Box::new(PositionalAlignment))
    }
}

impl WordAligner {
    pub fn new(dictionary: PhoneticDictionary, strategy: Box<dyn AlignmentStrategy>) -> Self {
        Self {
            dictionary,
            strategy,
        }
    }

    pub fn dictionary(&self) -> &PhoneticDictionary {
        &self.dictionary
    }

    pub fn align(&self, spoken: &str, target: &str) -> Vec<WordAnalysis> {
        let spoken_tokens = tokenize(spoken);
        let target_tokens = tokenize(target);
        let phonetics = self.dictionary.breakdown(target);

        self.strategy
            .pair(&spoken_tokens, &target_tokens)
            .into_iter()
            .map(|pair| {
                let s = pair.spoken.map_or("", |i| spoken_tokens[i].as_str());
                let t = pair.target.map_or("", |j| target_tokens[j].as_str());
                let p = pair
                    .target
                    .and_then(|j| phonetics.get(j))
                    .map_or("", String::as_str);
                let (score, feedback) = score_word(s, t);

                WordAnalysis {
                    word: t.to_string(),
                    expected: p.to_string(),
                    spoken: s.to_string(),
                    score,
                    feedback,
                }
            })
            .collect()
    }
}
