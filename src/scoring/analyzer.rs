use std::path::PathBuf;

use chrono::Utc;

use super::aligner::{AlignmentKind, ScoreBand, WordAligner};
use super::phonetics::PhoneticDictionary;
use crate::error::PronounceError;
use crate::history::{History, RecordedResult};
use crate::{PronunciationResult, WordAnalysis};

/// Parameters for building a [`SessionAnalyzer`].
#[derive(Debug, Clone, Default)]
pub struct AnalyzerParams {
    /// JSON phonetic dictionary layered over the built-in table.
    /// `None` uses the built-in table alone.
    pub dictionary_path: Option<PathBuf>,
    /// How spoken tokens are paired with target tokens.
    pub alignment: AlignmentKind,
}

/// Runs one full analysis pass: word breakdown, overall score and feedback.
///
/// Holds no mutable state, so a single analyzer can be shared between
/// callers (and threads) freely.
#[derive(Debug, Default)]
pub struct SessionAnalyzer {
    aligner: WordAligner,
}

impl SessionAnalyzer {
    /// Analyzer with the built-in dictionary and positional alignment.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: AnalyzerParams) -> Result<Self, PronounceError> {
        let mut dictionary = PhoneticDictionary::builtin();
        if let Some(path) = params.dictionary_path.as_deref() {
            dictionary.extend(PhoneticDictionary::load(path)?);
        }
        log::debug!(
            "Session analyzer ready: {} phonetic entries, {:?} alignment",
            dictionary.len(),
            params.alignment
        );
        Ok(Self::with_aligner(WordAligner::new(
            dictionary,
            params.alignment.strategy(),
        )))
    }

    pub fn with_aligner(aligner: WordAligner) -> Self {
        Self { aligner }
    }

    pub fn aligner(&self) -> &WordAligner {
        &self.aligner
    }

    /// Overall score only, without feedback text. Used for running scores.
    pub fn score(&self, spoken: &str, target: &str) -> u8 {
        overall_score(&self.aligner.align(spoken, target))
    }

    pub fn analyze(&self, spoken: &str, target: &str) -> PronunciationResult {
        let word_breakdown = self.aligner.align(spoken, target);
        let overall_score = overall_score(&word_breakdown);
        let band = ScoreBand::from_score(overall_score);

        PronunciationResult {
            overall_score,
            word_breakdown,
            feedback: sentence_feedback(band).to_string(),
            suggestions: suggestions(band).iter().map(|s| s.to_string()).collect(),
            timestamp: Utc::now(),
        }
    }

    /// Analyze and append the result to `history`.
    ///
    /// A failing store never loses the score: the error is returned next to
    /// the result instead.
    pub fn analyze_and_record(
        &self,
        spoken: &str,
        target: &str,
        history: &mut History,
    ) -> RecordedResult {
        let result = self.analyze(spoken, target);
        let persist_error = history.append(result.clone()).err();
        if let Some(e) = &persist_error {
            log::warn!("Pronunciation result not persisted: {e}");
        }
        RecordedResult {
            result,
            persist_error,
        }
    }
}

/// Rounded mean of the word scores; an empty breakdown scores 0.
fn overall_score(breakdown: &[WordAnalysis]) -> u8 {
    let total: u32 = breakdown.iter().map(|w| u32::from(w.score)).sum();
    let count = breakdown.len().max(1) as f64;
    (total as f64 / count).round() as u8
}

fn sentence_feedback(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Excellent => "Excellent! Your pronunciation is clear and accurate.",
        ScoreBand::Good => {
            "Good job! Your pronunciation is mostly clear with a few small differences."
        }
        ScoreBand::Fair => "Fair attempt. Some words need more practice.",
        ScoreBand::Weak => {
            "Keep practicing. Several words differ noticeably from the target phrase."
        }
        ScoreBand::Poor => {
            "Let's work on the basics. Your speech was very different from the target phrase."
        }
    }
}

/// Lower bands get more, and more basic, suggestions.
fn suggestions(band: ScoreBand) -> &'static [&'static str] {
    match band {
        ScoreBand::Excellent => &["Keep practicing with longer or faster phrases to stay sharp"],
        ScoreBand::Good => &[
            "Focus on the words marked for improvement",
            "Listen to the target phrase again and copy its rhythm",
        ],
        ScoreBand::Fair => &[
            "Slow down and pronounce each word clearly",
            "Listen to the phrase at a slower speech rate",
            "Practice the lowest-scoring words one at a time",
        ],
        ScoreBand::Weak => &[
            "Break the phrase into single words and practice each one",
            "Use the phonetic transcriptions as a guide",
            "Listen to the phrase again before recording yourself",
        ],
        ScoreBand::Poor => &[
            "Listen to the target phrase several times before speaking",
            "Start with single words before attempting the full phrase",
            "Check that your microphone picks up your voice clearly",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HistoryStore, MemoryStore};
    use crate::WordFeedback;
    use std::io::Write;

    #[test]
    fn perfect_phrase_scores_100() {
        let result = SessionAnalyzer::new().analyze("hello world", "hello world");
        assert_eq!(result.overall_score, 100);
        assert_eq!(result.word_breakdown.len(), 2);
        assert!(!result.suggestions.is_empty());
    }

    #[test]
    fn missing_word_halves_the_score() {
        let result = SessionAnalyzer::new().analyze("hello", "hello world");
        assert_eq!(result.overall_score, 50);
        assert_eq!(result.word_breakdown[1].feedback, WordFeedback::MissingWord);
    }

    #[test]
    fn extra_word_is_averaged_in() {
        let result = SessionAnalyzer::new().analyze("hello world extra", "hello world");
        assert_eq!(result.word_breakdown.len(), 3);
        // (100 + 100 + 20) / 3 = 73.3
        assert_eq!(result.overall_score, 73);
    }

    #[test]
    fn misspoken_words_score_between_bounds() {
        let result = SessionAnalyzer::new().analyze("halo wurld", "hello world");
        for word in &result.word_breakdown {
            assert!(word.score > 0 && word.score < 100, "{word:?}");
        }
        assert_eq!(result.word_breakdown[0].score, 60);
        assert_eq!(result.word_breakdown[1].score, 80);
        assert!((40..=90).contains(&result.overall_score));
        assert!(!result.suggestions.is_empty());
    }

    #[test]
    fn empty_inputs_are_not_errors() {
        let analyzer = SessionAnalyzer::new();
        let both_empty = analyzer.analyze("", "");
        assert_eq!(both_empty.overall_score, 0);
        assert!(both_empty.word_breakdown.is_empty());

        let silent = analyzer.analyze("", "good morning");
        assert_eq!(silent.overall_score, 0);
        assert_eq!(silent.word_breakdown.len(), 2);

        let no_target = analyzer.analyze("good morning", "");
        assert_eq!(no_target.overall_score, 20);
    }

    #[test]
    fn overall_score_is_rounded_mean_of_breakdown() {
        let analyzer = SessionAnalyzer::new();
        for (spoken, target) in [
            ("the wether is beautifull today", "the weather is beautiful today"),
            ("thank", "thank you please"),
            ("sorry sorry sorry", "sorry"),
        ] {
            let result = analyzer.analyze(spoken, target);
            let n = result.word_breakdown.len().max(1) as f64;
            let mean: f64 =
                result.word_breakdown.iter().map(|w| w.score as f64).sum::<f64>() / n;
            assert_eq!(result.overall_score, mean.round() as u8);
            assert!(result.word_breakdown.iter().all(|w| w.score <= 100));
        }
    }

    #[test]
    fn analysis_is_deterministic_apart_from_timestamp() {
        let analyzer = SessionAnalyzer::new();
        let first = analyzer.analyze("good mornin", "good morning");
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = analyzer.analyze("good mornin", "good morning");
        assert_eq!(first.word_breakdown, second.word_breakdown);
        assert_eq!(first.overall_score, second.overall_score);
        assert_ne!(first.timestamp, second.timestamp);
    }

    #[test]
    fn lower_bands_give_more_suggestions() {
        assert_eq!(suggestions(ScoreBand::Excellent).len(), 1);
        assert_eq!(suggestions(ScoreBand::Good).len(), 2);
        assert_eq!(suggestions(ScoreBand::Poor).len(), 3);
        assert_ne!(
            sentence_feedback(ScoreBand::Good),
            sentence_feedback(ScoreBand::Fair)
        );
    }

    #[test]
    fn score_matches_full_analysis() {
        let analyzer = SessionAnalyzer::new();
        assert_eq!(
            analyzer.score("nice to meat you", "nice to meet you"),
            analyzer.analyze("nice to meat you", "nice to meet you").overall_score
        );
    }

    #[test]
    fn params_layer_dictionary_file_and_alignment() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"gracias": "ˈɡɾasjas"}}"#).expect("write json");

        let analyzer = SessionAnalyzer::with_params(AnalyzerParams {
            dictionary_path: Some(file.path().to_path_buf()),
            alignment: AlignmentKind::Sequence,
        })
        .expect("analyzer");

        let result = analyzer.analyze("hello um gracias", "hello gracias");
        assert_eq!(result.word_breakdown.len(), 3);
        assert_eq!(result.word_breakdown[2].expected, "ˈɡɾasjas");
        assert_eq!(result.word_breakdown[2].score, 100);
        assert_eq!(result.word_breakdown[1].feedback, WordFeedback::ExtraWord);
    }

    #[test]
    fn missing_dictionary_file_is_an_error() {
        let params = AnalyzerParams {
            dictionary_path: Some(PathBuf::from("/nonexistent/phonetics.json")),
            ..Default::default()
        };
        assert!(matches!(
            SessionAnalyzer::with_params(params),
            Err(PronounceError::Io(_))
        ));
    }

    #[derive(Debug)]
    struct BrokenStore;

    impl HistoryStore for BrokenStore {
        fn load(&self) -> Result<Vec<PronunciationResult>, PronounceError> {
            Ok(Vec::new())
        }

        fn save(&mut self, _results: &[PronunciationResult]) -> Result<(), PronounceError> {
            Err(PronounceError::HistoryUnavailable("disk full".to_string()))
        }
    }

    #[test]
    fn persistence_failure_still_returns_result() {
        let mut history = History::new(Box::new(BrokenStore));
        let recorded =
            SessionAnalyzer::new().analyze_and_record("hello world", "hello world", &mut history);
        assert_eq!(recorded.result.overall_score, 100);
        assert!(matches!(
            recorded.persist_error,
            Some(PronounceError::HistoryUnavailable(_))
        ));
        assert!(!recorded.is_persisted());
    }

    #[test]
    fn recorded_results_land_in_history() {
        let mut history = History::new(Box::new(MemoryStore::default()));
        let recorded = SessionAnalyzer::new().analyze_and_record("hello", "hello", &mut history);
        assert!(recorded.is_persisted());
        let entries = history.entries().expect("load");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], recorded.result);
    }
}
