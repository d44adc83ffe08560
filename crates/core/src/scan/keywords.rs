use regex::Regex;
use tracing::debug;

use crate::{
    config::KeywordThresholds,
    error::Result,
    scan::vocabulary::{
        self, ELONGATED_VOWEL_PATTERN, INAPPROPRIATE_TERMS, SCREAM_PATTERNS, WordPattern,
    },
    types::FlagList,
};

/// Whole-word vocabulary match plus a raw scream tally over the transcript.
/// Shared by the quick and the full speech scans.
pub struct KeywordScanner {
    terms: Vec<WordPattern>,
    screams: Vec<Regex>,
    config: KeywordThresholds,
}

impl KeywordScanner {
    pub fn new(config: KeywordThresholds) -> Result<Self> {
        let mut screams = vocabulary::compile_all(SCREAM_PATTERNS)?;
        screams.push(Regex::new(ELONGATED_VOWEL_PATTERN)?);

        Ok(Self {
            terms: vocabulary::word_patterns(INAPPROPRIATE_TERMS)?,
            screams,
            config,
        })
    }

    pub fn scan(&self, text: &str) -> FlagList {
        let text = text.to_lowercase();
        let mut flags = FlagList::new();

        flags.extend(
            self.terms
                .iter()
                .filter(|p| p.regex.is_match(&text))
                .map(|p| format!("inappropriate language: {}", p.term)),
        );

        let screams = self.scream_count(&text);
        debug!("Counted {} scream matches", screams);
        if screams >= self.config.scream_count {
            flags.push(format!("screams detected in audio ({} instances)", screams));
        }

        flags
    }

    /// Every non-overlapping match of every scream pattern
    pub fn scream_count(&self, text: &str) -> usize {
        self.screams.iter().map(|re| re.find_iter(text).count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> KeywordScanner {
        KeywordScanner::new(KeywordThresholds::default()).unwrap()
    }

    #[test]
    fn test_terms_match_whole_words_only() {
        let flags = scanner().scan("We filed a class action about the assessment.");
        assert!(flags.is_empty());
    }

    #[test]
    fn test_terms_are_reported_in_vocabulary_order() {
        let flags = scanner().scan("I will KILL you, damn it.");
        assert_eq!(
            flags.as_slice(),
            ["inappropriate language: kill", "inappropriate language: damn"]
        );
    }

    #[test]
    fn test_phrases_match() {
        let flags = scanner().scan("sometimes i want to end my life");
        assert_eq!(flags.as_slice(), ["inappropriate language: end my life"]);
    }

    #[test]
    fn test_scream_threshold() {
        let s = scanner();
        assert_eq!(s.scream_count("ahhh noooo"), 2);
        assert!(s.scan("ahhh noooo").is_empty());

        let flags = s.scan("Ahhh! Noooo! Help me! Eeee!");
        assert_eq!(flags.as_slice(), ["screams detected in audio (4 instances)"]);
    }

    #[test]
    fn test_matches_are_counted_per_occurrence() {
        assert_eq!(scanner().scream_count("ahh ahh ahh"), 3);
    }

    #[test]
    fn test_repeated_scans_are_stable() {
        let s = scanner();
        let text = "Ahhh! Noooo! I will kill you. Help me! Eeee!";

        let first = s.scan(text);
        assert_eq!(first.len(), 2);
        assert_eq!(first, s.scan(text));
    }
}
