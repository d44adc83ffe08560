use tracing::debug;

use crate::{config::TitleThresholds, scan::vocabulary::STRONG_BAD_TERMS, types::FlagList};

/// Substring scan of a video title. Overlapping terms are each reported,
/// so "killing" hits both "kill" and "killing".
pub struct TitleScanner {
    config: TitleThresholds,
}

impl TitleScanner {
    pub fn new(config: TitleThresholds) -> Self {
        Self { config }
    }

    pub fn scan(&self, title: &str) -> FlagList {
        let title = title.to_lowercase();
        let mut flags = FlagList::new();

        flags.extend(
            STRONG_BAD_TERMS
                .iter()
                .filter(|term| title.contains(*term))
                .map(|term| format!("title contains dangerous term: \"{}\"", term)),
        );

        debug!("Title matched {} terms", flags.len());
        if flags.len() >= self.config.summary_hits {
            flags.push("title strongly suggests horror/gore/violent or adult content");
        }

        flags
    }
}
