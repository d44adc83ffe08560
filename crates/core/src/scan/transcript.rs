use regex::Regex;
use tracing::debug;

use crate::{
    config::TranscriptThresholds,
    error::Result,
    scan::vocabulary::{
        self, DANGER_INDICATORS, DISTRESS_INDICATORS, ESCALATION_HORROR_KEYWORDS,
        HORROR_KEYWORDS, NEUTRAL_INDICATORS, SCREAM_PATTERNS, VIOLENT_VERBS, WEAPON_KEYWORDS,
        WordPattern, contains_any,
    },
    types::FlagList,
};

/// Split on runs of sentence punctuation, dropping empty pieces
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Raw accumulator values for one transcript
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscriptAnalysis {
    pub scream_count: u32,
    pub horror_score: u32,
    pub weapon_count: u32,
    pub escalation_count: u32,
    pub danger_score: u32,
}

/// Context-weighted scoring of a full transcript, sentence by sentence
pub struct TranscriptAnalyzer {
    screams: Vec<Regex>,
    horror: Vec<WordPattern>,
    weapons: Vec<WordPattern>,
    config: TranscriptThresholds,
}

impl TranscriptAnalyzer {
    pub fn new(config: TranscriptThresholds) -> Result<Self> {
        Ok(Self {
            screams: vocabulary::compile_all(SCREAM_PATTERNS)?,
            horror: vocabulary::word_patterns(HORROR_KEYWORDS)?,
            weapons: vocabulary::word_patterns(WEAPON_KEYWORDS)?,
            config,
        })
    }

    pub fn analyze(&self, text: &str) -> TranscriptAnalysis {
        let lower = text.to_lowercase();
        let sentences = split_sentences(&lower);
        let cfg = &self.config;

        let mut analysis = TranscriptAnalysis::default();
        for sentence in &sentences {
            analysis.scream_count += self.scream_sentence_score(sentence);
            analysis.horror_score += self.horror_sentence_score(sentence);
            analysis.weapon_count += self.weapon_sentence_score(sentence);
            if self.is_escalation(sentence) {
                analysis.escalation_count += 1;
            }
        }

        for tripped in [
            analysis.scream_count > cfg.scream_count,
            analysis.horror_score > cfg.horror_score,
            analysis.weapon_count > cfg.weapon_count,
        ] {
            if tripped {
                analysis.danger_score += cfg.danger_weight;
            }
        }

        debug!("Transcript of {} sentences: {:?}", sentences.len(), analysis);
        analysis
    }

    pub fn flags(&self, text: &str) -> FlagList {
        let analysis = self.analyze(text);
        let cfg = &self.config;
        let mut flags = FlagList::new();

        if analysis.scream_count > cfg.scream_count {
            flags.push(format!(
                "excessive screams detected ({} instances) - context suggests distress",
                analysis.scream_count
            ));
        }
        if analysis.horror_score > cfg.horror_score {
            flags.push(format!(
                "horror content detected (severity score: {}) - context suggests violent/horror themes",
                analysis.horror_score
            ));
        }
        if analysis.weapon_count > cfg.weapon_count {
            flags.push(format!(
                "weapons mentioned in dangerous contexts ({} weighted mentions)",
                analysis.weapon_count
            ));
        }
        if analysis.escalation_count > cfg.escalation_count {
            flags.push(format!(
                "escalation patterns detected ({} instances of combined danger elements)",
                analysis.escalation_count
            ));
        }
        if analysis.danger_score >= cfg.danger_score {
            flags.push(
                "high danger score: multiple concerning elements detected with dangerous context (screams, horror, weapons)",
            );
        }

        flags
    }

    /// One point per matching scream pattern, two in a distressed sentence
    pub fn scream_sentence_score(&self, sentence: &str) -> u32 {
        let weight = if contains_any(sentence, DISTRESS_INDICATORS) { 2 } else { 1 };
        self.screams.iter().filter(|re| re.is_match(sentence)).count() as u32 * weight
    }

    /// Distinct horror words, doubled alongside a violent verb
    pub fn horror_sentence_score(&self, sentence: &str) -> u32 {
        let hits = self.horror.iter().filter(|p| p.regex.is_match(sentence)).count() as u32;
        if hits > 0 && contains_any(sentence, VIOLENT_VERBS) {
            hits * 2
        } else {
            hits
        }
    }

    /// Per weapon word: 2 in a threatening sentence, 1 when neutral-free,
    /// nothing when the sentence reads as cooking, crafts or education
    pub fn weapon_sentence_score(&self, sentence: &str) -> u32 {
        if contains_any(sentence, NEUTRAL_INDICATORS) {
            return 0;
        }

        let weight = if contains_any(sentence, DANGER_INDICATORS) { 2 } else { 1 };
        self.weapons.iter().filter(|p| p.regex.is_match(sentence)).count() as u32 * weight
    }

    fn is_escalation(&self, sentence: &str) -> bool {
        let scream = self.screams.iter().any(|re| re.is_match(sentence));
        let weapon = self.weapons.iter().any(|p| p.regex.is_match(sentence));
        let horror = self.horror[..ESCALATION_HORROR_KEYWORDS]
            .iter()
            .any(|p| p.regex.is_match(sentence));

        [scream, weapon, horror].iter().filter(|&&hit| hit).count() >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> TranscriptAnalyzer {
        TranscriptAnalyzer::new(TranscriptThresholds::default()).unwrap()
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("Hello there!! How are you?... fine.  "),
            ["Hello there", "How are you", "fine"]
        );
        assert!(split_sentences("  ...  ").is_empty());
    }

    #[test]
    fn test_weapon_context_weighting() {
        let a = analyzer();
        assert_eq!(a.weapon_sentence_score("i used a knife to cook dinner"), 0);
        assert_eq!(a.weapon_sentence_score("he attacked me with a knife"), 2);
        assert_eq!(a.weapon_sentence_score("there was a knife on the table"), 1);
        assert_eq!(a.weapon_sentence_score("guns and knives everywhere"), 2);
    }

    #[test]
    fn test_scream_weighting() {
        let a = analyzer();
        assert_eq!(a.scream_sentence_score("ahhh help"), 2);
        assert_eq!(a.scream_sentence_score("ahhh help i am scared"), 4);
        assert_eq!(a.scream_sentence_score("nothing to see"), 0);
    }

    #[test]
    fn test_horror_counts_distinct_words() {
        let a = analyzer();
        assert_eq!(a.horror_sentence_score("the ghost and the demon"), 2);
        assert_eq!(a.horror_sentence_score("ghost ghost ghost"), 1);
        assert_eq!(a.horror_sentence_score("the demon will kill"), 4);
        assert_eq!(a.horror_sentence_score("ghostly"), 0);
    }

    #[test]
    fn test_calm_transcript_has_no_flags() {
        let a = analyzer();
        let text = "Today we bake bread. Mix the flour and water. Let it rest overnight.";
        assert!(a.flags(text).is_empty());
    }

    #[test]
    fn test_screams_alone_trip_one_category() {
        let a = analyzer();
        let text = "Ahhh! Help! Noooo! Ahhh help me! Somebody help! Ahhh!";
        let analysis = a.analyze(text);
        assert!(analysis.scream_count > 5);
        assert_eq!(analysis.danger_score, 2);

        let flags = a.flags(text);
        assert_eq!(flags.len(), 1);
        assert!(flags.as_slice()[0].starts_with("excessive screams detected"));
    }

    #[test]
    fn test_combined_danger_flags_in_order() {
        let a = analyzer();
        let text = "He attacked with a knife, ahhh! The monster will murder us with a blade. \
                    A scary demon wants to kill with a gun. A ghost appeared, help!";
        let analysis = a.analyze(text);
        assert_eq!(analysis.weapon_count, 6);
        assert_eq!(analysis.horror_score, 11);
        assert_eq!(analysis.scream_count, 2);
        assert_eq!(analysis.escalation_count, 4);
        assert_eq!(analysis.danger_score, 4);

        let flags = a.flags(text).into_vec();
        assert!(flags[0].starts_with("horror content detected"));
        assert_eq!(flags[1], "weapons mentioned in dangerous contexts (6 weighted mentions)");
        assert_eq!(
            flags[2],
            "escalation patterns detected (4 instances of combined danger elements)"
        );
        assert!(flags[3].starts_with("high danger score"));
    }

    #[test]
    fn test_repeated_analysis_is_stable() {
        let a = analyzer();
        let text = "He attacked with a knife, ahhh! The monster will murder us with a blade.";

        assert_eq!(a.analyze(text), a.analyze(text));
        assert_eq!(a.flags(text), a.flags(text));
    }
}
