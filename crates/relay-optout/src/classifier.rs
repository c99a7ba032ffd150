// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashSet;
use std::sync::LazyLock;

use relay_config::model::OptOutConfig;
use tracing::debug;

use crate::dictionary::{KEYWORD_SET, PHRASES};

const TRAILING_PUNCTUATION: &[char] = &['?', '!', '.', ','];

static BUILT_IN: LazyLock<OptOutClassifier> = LazyLock::new(OptOutClassifier::new);

/// Reports whether `text` asks to stop receiving messages, using the
/// built-in dictionary only.
pub fn is_opt_out_text(text: &str) -> bool {
    BUILT_IN.is_opt_out(text)
}

/// Opt-out matcher over the built-in dictionary plus configured extras.
#[derive(Debug, Clone, Default)]
pub struct OptOutClassifier {
    extra_keywords: HashSet<String>,
    extra_phrases: Vec<String>,
}

impl OptOutClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extends the built-in dictionary. Entries are lower-cased; blank
    /// ones are ignored.
    pub fn with_extra<K, P>(keywords: K, phrases: P) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let normalize = |s: &str| {
            let s = s.trim().to_lowercase();
            (!s.is_empty()).then_some(s)
        };
        Self {
            extra_keywords: keywords
                .into_iter()
                .filter_map(|k| normalize(k.as_ref()))
                .collect(),
            extra_phrases: phrases
                .into_iter()
                .filter_map(|p| normalize(p.as_ref()))
                .collect(),
        }
    }

    pub fn from_config(config: &OptOutConfig) -> Self {
        Self::with_extra(&config.extra_keywords, &config.extra_phrases)
    }

    /// Token match first, then phrase match.
    ///
    /// Text is lower-cased and split on single spaces; each token loses
    /// trailing `? ! . ,` before lookup. Phrases are searched in the whole
    /// lower-cased text.
    pub fn is_opt_out(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();

        let keyword = lowered
            .split(' ')
            .map(|token| token.trim_end_matches(TRAILING_PUNCTUATION))
            .find(|token| KEYWORD_SET.contains(token) || self.extra_keywords.contains(*token));
        if let Some(keyword) = keyword {
            debug!(keyword, "opt-out keyword matched");
            return true;
        }

        let phrase = PHRASES
            .iter()
            .copied()
            .chain(self.extra_phrases.iter().map(String::as_str))
            .find(|phrase| lowered.contains(phrase));
        if let Some(phrase) = phrase {
            debug!(phrase, "opt-out phrase matched");
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_matches_any_case() {
        assert!(is_opt_out_text("STOP"));
        assert!(is_opt_out_text("stop"));
        assert!(is_opt_out_text("Stop!"));
        assert!(is_opt_out_text("please stop."));
        assert!(is_opt_out_text("Unsubscribe?!"));
    }

    #[test]
    fn keyword_needs_token_boundary() {
        assert!(!is_opt_out_text("nonstop"));
        assert!(!is_opt_out_text("stopping by later"));
        assert!(!is_opt_out_text("endless"));
    }

    #[test]
    fn only_trailing_punctuation_is_stripped() {
        assert!(!is_opt_out_text("s.top"));
        assert!(!is_opt_out_text("?stop"));
        assert!(is_opt_out_text("stop..."));
    }

    #[test]
    fn tokens_split_on_single_spaces_only() {
        assert!(!is_opt_out_text("ok\nstop"));
        assert!(is_opt_out_text("ok  stop"));
    }

    #[test]
    fn phrase_matches_as_substring() {
        assert!(is_opt_out_text("please take me off this list"));
        assert!(is_opt_out_text("I want to OPT OUT now"));
        assert!(is_opt_out_text("Lose my number, thanks"));
    }

    #[test]
    fn non_latin_keywords() {
        assert!(is_opt_out_text("退订"));
        assert!(is_opt_out_text("구독취소"));
        assert!(is_opt_out_text("xin dừng"));
    }

    #[test]
    fn ordinary_text_is_not_opt_out() {
        assert!(!is_opt_out_text(""));
        assert!(!is_opt_out_text("hello, what time do you open?"));
        assert!(!is_opt_out_text("yes please"));
    }

    #[test]
    fn extras_extend_the_dictionary() {
        let classifier = OptOutClassifier::with_extra(["Baja", " "], ["No More Texts"]);
        assert!(classifier.is_opt_out("BAJA!"));
        assert!(classifier.is_opt_out("no more texts please"));
        assert!(classifier.is_opt_out("stop"));
        assert!(!is_opt_out_text("baja"));
    }

    #[test]
    fn from_config_uses_configured_extras() {
        let config = OptOutConfig {
            extra_keywords: vec!["arrete".to_string()],
            extra_phrases: vec![],
        };
        assert!(OptOutClassifier::from_config(&config).is_opt_out("Arrete."));
    }
}
