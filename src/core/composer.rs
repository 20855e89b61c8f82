// File: src/core/composer.rs
use crate::collocates::CollocateSearch;
use crate::core::sampler::{draw_categories, reconcile, CategoryDistribution};
use crate::core::types::{Card, Category, CategoryCounts, NotInVocabulary};
use crate::embedding::EmbeddingModel;
use crate::error::TabooError;
use crate::lexical::{relations, LexicalDatabase};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeSet, HashSet};

/// Builds cards from lexical relations, topped up with embedding collocates.
/// Both resources are borrowed read-only for the composer's lifetime.
pub struct CardComposer<'a, L: ?Sized, E: ?Sized> {
    lexicon: &'a L,
    embeddings: &'a E,
    search: &'a CollocateSearch,
}

impl<'a, L, E> CardComposer<'a, L, E>
where
    L: LexicalDatabase + ?Sized,
    E: EmbeddingModel + ?Sized,
{
    pub fn new(lexicon: &'a L, embeddings: &'a E, search: &'a CollocateSearch) -> Self {
        Self {
            lexicon,
            embeddings,
            search,
        }
    }

    /// Composes a card for `word`.
    ///
    /// The card holds fewer than five words only when the embedding model
    /// cannot supply enough collocates; see [`Card::shortfall`].
    pub fn compose<R: Rng + ?Sized>(
        &self,
        word: &str,
        dist: &CategoryDistribution,
        rng: &mut R,
    ) -> Result<Card, NotInVocabulary> {
        let drawn = draw_categories(dist, rng);
        self.compose_with_counts(word, drawn, rng)
    }

    /// Composes a card from an already drawn slot plan, which is reconciled
    /// against the word's relations first.
    pub fn compose_with_counts<R: Rng + ?Sized>(
        &self,
        word: &str,
        drawn: CategoryCounts,
        rng: &mut R,
    ) -> Result<Card, NotInVocabulary> {
        if !self.embeddings.contains(word) {
            log::warn!("'{}' is not in the embedding vocabulary", word);
            return Err(NotInVocabulary {
                word: word.to_string(),
            });
        }

        let profile = relations(self.lexicon, word);
        let counts = reconcile(drawn, &profile);
        log::debug!("slot plan for '{}': {:?}", word, counts);

        let mut taboo_words: Vec<String> = Vec::with_capacity(counts.total());
        for category in Category::RELATIONS {
            let wanted = counts.get(category);
            if wanted == 0 {
                continue;
            }
            // Reconciliation guarantees wanted <= available.
            let pool: Vec<&String> = profile.get(category).iter().collect();
            taboo_words.extend(pool.choose_multiple(rng, wanted).map(|w| (*w).clone()));
        }

        let need = counts.get(Category::Collocation);
        if need > 0 {
            let mut forbidden: HashSet<String> = taboo_words.iter().cloned().collect();
            forbidden.insert(word.to_string());

            let pool = self.collocate_pool(word, &forbidden, need);
            let pool: Vec<String> = pool.into_iter().collect();
            if pool.len() > need {
                taboo_words.extend(pool.choose_multiple(rng, need).cloned());
            } else {
                taboo_words.extend(pool);
            }
        }

        let card = Card::new(word, taboo_words);
        if card.is_complete() {
            log::info!("card for '{}': {:?}", word, card.taboo_words);
        } else {
            log::warn!(
                "card for '{}' is {} word(s) short: {:?}",
                word,
                card.shortfall(),
                card.taboo_words
            );
        }
        Ok(card)
    }

    /// Collocate candidates; search failures degrade to whatever was found.
    fn collocate_pool(&self, word: &str, forbidden: &HashSet<String>, need: usize) -> BTreeSet<String> {
        match self
            .search
            .collocates(word, forbidden, self.embeddings, self.lexicon, need)
        {
            Ok(pool) => pool,
            Err(TabooError::ExhaustedSearch { attempts, found, .. }) => {
                log::warn!(
                    "collocate search for '{}' gave up after {} attempts with {} of {}",
                    word,
                    attempts,
                    found.len(),
                    need
                );
                found
            }
            Err(e) => {
                log::warn!("no collocates for '{}': {}", word, e);
                BTreeSet::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CARD_SIZE;
    use crate::embedding::VectorTable;
    use crate::lexical::tests::victory_store;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn collocation_only() -> CategoryDistribution {
        CategoryDistribution::from_counts(&BTreeMap::from([(Category::Collocation, 1.0)])).unwrap()
    }

    fn embeddings() -> VectorTable {
        let mut t = VectorTable::new();
        t.insert("victory", vec![1.0, 0.0, 0.0]);
        for (i, w) in ["champion", "medal", "podium", "glory", "trophy", "conquest"]
            .iter()
            .enumerate()
        {
            t.insert(*w, vec![1.0, 0.1 * (i + 1) as f32, 0.0]);
        }
        t.insert("triumph", vec![1.0, 0.05, 0.0]);
        t
    }

    #[test]
    fn test_not_in_vocabulary() {
        let db = victory_store();
        let model = embeddings();
        let search = CollocateSearch::default();
        let composer = CardComposer::new(&db, &model, &search);
        let result = composer.compose("xyzzy", &collocation_only(), &mut StdRng::seed_from_u64(0));
        assert_eq!(
            result,
            Err(NotInVocabulary {
                word: "xyzzy".to_string()
            })
        );
    }

    #[test]
    fn test_collocation_only_card_is_full_and_clean() {
        let db = victory_store();
        let model = embeddings();
        let search = CollocateSearch::default();
        let composer = CardComposer::new(&db, &model, &search);
        let card = composer
            .compose("victory", &collocation_only(), &mut StdRng::seed_from_u64(4))
            .unwrap();
        assert_eq!(card.taboo_words.len(), CARD_SIZE);
        let unique: BTreeSet<_> = card.taboo_words.iter().collect();
        assert_eq!(unique.len(), CARD_SIZE);
        assert!(!card.taboo_words.iter().any(|w| w.contains("victory")));
    }

    #[test]
    fn test_relation_words_are_not_repeated_as_collocates() {
        let db = victory_store();
        let model = embeddings();
        let search = CollocateSearch::default();
        let composer = CardComposer::new(&db, &model, &search);
        let dist = CategoryDistribution::from_counts(&BTreeMap::from([(Category::Synonym, 1.0)])).unwrap();
        let card = composer
            .compose("victory", &dist, &mut StdRng::seed_from_u64(8))
            .unwrap();
        // One synonym available, the other four slots become collocates.
        assert_eq!(card.taboo_words.len(), CARD_SIZE);
        assert_eq!(
            card.taboo_words.iter().filter(|w| w.as_str() == "triumph").count(),
            1
        );
    }

    #[test]
    fn test_short_embedding_pool_yields_shortfall() {
        let db = victory_store();
        let mut model = VectorTable::new();
        model.insert("victory", vec![1.0, 0.0]);
        model.insert("champion", vec![1.0, 0.1]);
        let search = CollocateSearch::default();
        let composer = CardComposer::new(&db, &model, &search);
        let card = composer
            .compose("victory", &collocation_only(), &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(card.taboo_words, vec!["champion".to_string()]);
        assert_eq!(card.shortfall(), 4);
    }
}
