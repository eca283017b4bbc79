use std::collections::HashMap;
use std::path::Path;

use crate::error::PronounceError;

/// Lookup table from lower-case words to IPA-style transcriptions.
///
/// The table is not expected to be complete: words it does not know are
/// passed through as their cleaned spelling.
#[derive(Debug, Clone, Default)]
pub struct PhoneticDictionary {
    entries: HashMap<String, String>,
}

impl PhoneticDictionary {
    /// Load a dictionary from a JSON file.
    ///
    /// The file must hold a single object mapping words to transcription
    /// strings. Keys are lower-cased on load.
    pub fn load(path: &Path) -> Result<Self, PronounceError> {
        let content = std::fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| PronounceError::Dictionary(format!("Failed to parse JSON: {e}")))?;

        let obj = json
            .as_object()
            .ok_or_else(|| PronounceError::Dictionary("top level must be an object".to_string()))?;

        let mut entries = HashMap::with_capacity(obj.len());
        for (word, value) in obj {
            if word.trim().is_empty() {
                return Err(PronounceError::Dictionary(format!(
                    "Empty word key in dictionary: {word:?}"
                )));
            }
            let ipa = value.as_str().ok_or_else(|| {
                PronounceError::Dictionary(format!("Non-string transcription for {word:?}"))
            })?;
            entries.insert(word.trim().to_lowercase(), ipa.to_string());
        }

        log::info!(
            "Loaded {} phonetic entries from {}",
            entries.len(),
            path.display()
        );
        Ok(Self { entries })
    }

    /// Build a dictionary from arbitrary `(word, transcription)` pairs.
    pub fn from_entries<I, W, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (W, P)>,
        W: AsRef<str>,
        P: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(w, p)| (w.as_ref().to_lowercase(), p.into()))
                .collect(),
        }
    }

    /// Built-in hand-curated table of common practice words.
    pub fn builtin() -> Self {
        let entries: &[(&str, &str)] = &[
            ("hello", "həˈloʊ"),
            ("world", "wɜːrld"),
            ("good", "ɡʊd"),
            ("morning", "ˈmɔːrnɪŋ"),
            ("evening", "ˈiːvnɪŋ"),
            ("night", "naɪt"),
            ("thank", "θæŋk"),
            ("you", "juː"),
            ("please", "pliːz"),
            ("sorry", "ˈsɑːri"),
            ("water", "ˈwɔːtər"),
            ("the", "ðə"),
            ("a", "ə"),
            ("is", "ɪz"),
            ("are", "ɑːr"),
            ("how", "haʊ"),
            ("what", "wʌt"),
            ("where", "wɛr"),
            ("name", "neɪm"),
            ("my", "maɪ"),
            ("nice", "naɪs"),
            ("to", "tuː"),
            ("meet", "miːt"),
            ("weather", "ˈwɛðər"),
            ("beautiful", "ˈbjuːtɪfəl"),
            ("today", "təˈdeɪ"),
            ("pronunciation", "prəˌnʌnsiˈeɪʃən"),
            ("language", "ˈlæŋɡwɪdʒ"),
            ("learning", "ˈlɜːrnɪŋ"),
            ("practice", "ˈpræktɪs"),
            ("speak", "spiːk"),
            ("english", "ˈɪŋɡlɪʃ"),
            ("three", "θriː"),
            ("through", "θruː"),
            ("thought", "θɔːt"),
            ("comfortable", "ˈkʌmftərbəl"),
            ("vegetable", "ˈvɛdʒtəbəl"),
            ("schedule", "ˈskɛdʒuːl"),
        ];
        Self::from_entries(entries.iter().copied())
    }

    /// Layer `other` on top of this dictionary. Entries in `other` win.
    pub fn extend(&mut self, other: PhoneticDictionary) {
        self.entries.extend(other.entries);
    }

    /// Transcription for an already-cleaned, lower-case word.
    pub fn lookup(&self, word: &str) -> Option<&str> {
        self.entries.get(word).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One transcription per whitespace-delimited token of `phrase`.
    ///
    /// Tokens are lower-cased and stripped of non-word characters before the
    /// lookup. Unknown tokens come back as the cleaned token itself.
    pub fn breakdown(&self, phrase: &str) -> Vec<String> {
        phrase
            .to_lowercase()
            .split_whitespace()
            .map(|token| {
                let cleaned = clean_token(token);
                match self.lookup(&cleaned) {
                    Some(ipa) => ipa.to_string(),
                    None => cleaned,
                }
            })
            .collect()
    }
}

/// Drop every character that is not alphanumeric or `_`.
fn clean_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}
