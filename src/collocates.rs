// File: src/collocates.rs
//! Distributional "collocates": embedding neighbours of a main word that
//! survive the substring, spelling and multi-word filters.

use crate::config::CollocateSettings;
use crate::embedding::EmbeddingModel;
use crate::error::{Result, TabooError};
use crate::fuzzy::levenshtein::is_distinct_spelling;
use crate::lexical::{LexicalDatabase, Lemmatizer};
use std::collections::{BTreeSet, HashSet};

/// Widening nearest-neighbour search. Each attempt asks the model for
/// `widen_step` more neighbours than the last, up to `max_attempts`.
#[derive(Debug, Clone)]
pub struct CollocateSearch {
    settings: CollocateSettings,
}

impl CollocateSearch {
    pub fn new(settings: CollocateSettings) -> Self {
        Self { settings }
    }

    /// Returns at least `min_count` collocates of `word`, none of which is in
    /// `forbidden`, contains `word`, or is a near-spelling of it.
    ///
    /// # Errors
    ///
    /// - [`TabooError::Vocabulary`] if the model has no vector for `word`.
    /// - [`TabooError::ExhaustedSearch`] if the attempt ceiling is reached or
    ///   the model runs out of neighbours first; the error carries the
    ///   partial set.
    pub fn collocates<E, L>(
        &self,
        word: &str,
        forbidden: &HashSet<String>,
        model: &E,
        lexicon: &L,
        min_count: usize,
    ) -> Result<BTreeSet<String>>
    where
        E: EmbeddingModel + ?Sized,
        L: LexicalDatabase + ?Sized,
    {
        let lemmatizer = Lemmatizer::new(lexicon);
        let mut check = self.settings.initial_check;
        let mut filtered = BTreeSet::new();

        for attempt in 1..=self.settings.max_attempts {
            let neighbours = model.most_similar(word, check)?;
            let exhausted = neighbours.len() < check;

            filtered = neighbours
                .iter()
                .map(|(candidate, _)| lemmatizer.lemmatize(candidate))
                .filter(|candidate| self.accepts(word, candidate, forbidden))
                .collect();

            log::debug!(
                "collocates('{}'): attempt {} checked {} neighbours, {} kept",
                word,
                attempt,
                neighbours.len(),
                filtered.len()
            );

            if filtered.len() >= min_count {
                return Ok(filtered);
            }
            if exhausted {
                return Err(TabooError::ExhaustedSearch {
                    word: word.to_string(),
                    attempts: attempt,
                    found: filtered,
                });
            }
            check += self.settings.widen_step;
        }

        Err(TabooError::ExhaustedSearch {
            word: word.to_string(),
            attempts: self.settings.max_attempts,
            found: filtered,
        })
    }

    fn accepts(&self, word: &str, candidate: &str, forbidden: &HashSet<String>) -> bool {
        !candidate.to_lowercase().contains(word)
            && !forbidden.contains(candidate)
            && is_distinct_spelling(word, candidate, self.settings.min_edit_distance)
            && !candidate.contains(self.settings.multiword_marker.as_str())
    }
}

impl Default for CollocateSearch {
    fn default() -> Self {
        Self::new(CollocateSettings::default())
    }
}
