//! Fixed word lists and the regex families built from them.

use regex::Regex;

use crate::error::Result;

/// Substrings of detector labels that count as weapons
pub const DANGEROUS_OBJECTS: &[&str] = &[
    "knife", "gun", "pistol", "rifle", "weapon", "firearm", "sword", "machete", "axe", "scissors",
    "blade", "handgun",
];

pub const SCARY_ANIMALS: &[&str] = &["bear", "wolf", "dog", "snake", "spider"];

/// Substrings of classifier labels that indicate unsafe content
pub const DANGEROUS_CONTENT: &[&str] =
    &["nsfw", "violence", "gore", "blood", "horror", "scary", "weapon"];

pub const SCREAM_PATTERNS: &[&str] = &[
    r"\b(ah+|ahh+|ahhh+|ahhhh+|aah+|aaah+|aaaah+)\b",
    r"\b(no+|noo+|nooo+|noooo+)\b",
    r"\b(help|help me|somebody help|someone help)\b",
    r"\b(scream|screaming|screamed|screams)\b",
];

/// Drawn-out vowels, only counted by the keyword scanners
pub const ELONGATED_VOWEL_PATTERN: &str = r"\b(aa+|ee+|ii+|oo+|uu+)\b";

pub const DISTRESS_INDICATORS: &[&str] = &[
    "fear", "scared", "afraid", "terrified", "panic", "danger", "hurt", "pain",
];

/// The first ten entries double as the escalation vocabulary
pub const HORROR_KEYWORDS: &[&str] = &[
    "horror", "horrifying", "terrifying", "scary", "frightening", "ghost", "ghosts", "demon",
    "demons", "monster", "monsters", "haunted", "haunting", "killer", "killers", "murderer",
    "murderers", "psycho", "psychopath", "blood", "bloody", "gore", "gory", "guts", "corpse",
    "corpses", "death", "dying", "kill", "killing", "murder", "murdered", "torture", "tortured",
    "torturing", "pain", "suffering", "nightmare", "nightmares", "terror", "terrorize", "fear",
];

pub const ESCALATION_HORROR_KEYWORDS: usize = 10;

pub const VIOLENT_VERBS: &[&str] = &[
    "kill", "murder", "torture", "hurt", "attack", "stab", "shoot", "cut",
];

pub const WEAPON_KEYWORDS: &[&str] = &[
    "knife", "knives", "blade", "blades", "gun", "guns", "pistol", "pistols", "rifle", "rifles",
    "weapon", "weapons", "firearm", "firearms", "machete", "machetes", "scissors",
];

pub const DANGER_INDICATORS: &[&str] = &[
    "kill", "murder", "attack", "stab", "shoot", "hurt", "threat", "danger", "weapon", "fight",
    "violence",
];

pub const NEUTRAL_INDICATORS: &[&str] = &[
    "cook", "cooking", "kitchen", "tool", "cutting", "food", "recipe", "craft", "art", "museum",
    "history", "educational",
];

/// Profanity, drugs, violence and self-harm terms for the keyword scanners
pub const INAPPROPRIATE_TERMS: &[&str] = &[
    "fuck", "fucking", "fucked", "shit", "shitting", "sex", "sexual", "cocaine", "marijuana",
    "weed", "drug", "kill", "killing", "killed", "pedo", "pedophile", "ass", "bitch", "damn",
    "hell", "porn", "pornography", "nude", "naked", "violence", "violent", "gun", "shoot",
    "shooting", "murder", "death", "die", "suicide", "suicidal", "kill myself", "end my life",
    "self harm", "self-harm", "cutting", "cut myself", "hang myself", "overdose", "overdosing",
];

/// Title terms, matched as plain substrings of the lowercased title
pub const STRONG_BAD_TERMS: &[&str] = &[
    // violence and self-harm
    "gore", "gory", "blood", "bloody", "decapitated", "beheaded", "disemboweled", "torture",
    "tortured", "torturing", "execution", "brutal", "violent", "violence", "kill", "killing",
    "murder", "slaughter", "massacre", "suicide", "self harm", "self-harm", "hang myself",
    "kill myself", "end my life",
    // horror
    "horror", "terrifying", "scary", "nightmare", "nightmare fuel", "creepypasta", "creepy",
    "disturbing", "cursed", "jumpscare", "jump scare", "killer clown", "serial killer", "zombie",
    "zombies", "demon", "demons", "possession", "exorcism", "haunted", "poltergeist",
    // weapons
    "gun", "guns", "shooting", "school shooting", "mass shooting", "knife", "knives", "machete",
    "chainsaw", "beheading",
    // adult
    "nsfw", "18+", "not for kids", "not for children", "adults only", "sex", "sexual", "porn",
    "nude", "naked",
];

/// True if any of `needles` occurs anywhere in `haystack`
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// A term paired with its whole-word pattern
pub struct WordPattern {
    pub term: &'static str,
    pub regex: Regex,
}

pub fn word_patterns(terms: &[&'static str]) -> Result<Vec<WordPattern>> {
    terms
        .iter()
        .map(|&term| {
            Ok(WordPattern {
                term,
                regex: Regex::new(&format!(r"\b{}\b", regex::escape(term)))?,
            })
        })
        .collect()
}

pub fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Ok(Regex::new(p)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_patterns_respect_boundaries() {
        let patterns = word_patterns(&["ass", "self-harm"]).unwrap();
        assert!(!patterns[0].regex.is_match("class action"));
        assert!(patterns[0].regex.is_match("what an ass."));
        assert!(patterns[1].regex.is_match("talk about self-harm openly"));
    }

    #[test]
    fn test_scream_family_compiles() {
        let screams = compile_all(SCREAM_PATTERNS).unwrap();
        assert!(screams[0].is_match("ahhhh"));
        assert!(screams[1].is_match("noooo way"));
        assert!(!screams[1].is_match("nothing"));
        assert!(screams[2].is_match("somebody help"));
    }

    #[test]
    fn test_escalation_vocabulary_is_the_horror_head() {
        assert_eq!(HORROR_KEYWORDS[ESCALATION_HORROR_KEYWORDS - 1], "monster");
    }
}
