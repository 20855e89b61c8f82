// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Number of taboo words on a finished card.
pub const CARD_SIZE: usize = 5;

/// A unique identifier for a word in a sequence model's vocabulary.
pub type WordId = usize;

/// The label attached to one taboo-word slot.
///
/// Declaration order is also the reconciliation order: the four lexical
/// relations first, then the embedding fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Synonym,
    Antonym,
    Hypernym,
    Hyponym,
    /// Distributional neighbour from the embedding model.
    Collocation,
}

impl Category {
    /// The relation categories that a lexical database can populate.
    pub const RELATIONS: [Category; 4] = [
        Category::Synonym,
        Category::Antonym,
        Category::Hypernym,
        Category::Hyponym,
    ];

    pub const ALL: [Category; 5] = [
        Category::Synonym,
        Category::Antonym,
        Category::Hypernym,
        Category::Hyponym,
        Category::Collocation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Synonym => "synonym",
            Category::Antonym => "antonym",
            Category::Hypernym => "hypernym",
            Category::Hyponym => "hyponym",
            Category::Collocation => "collocation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Words standing in each lexical relation to one main word, across all of
/// its senses. Never contains the main word or anything containing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationProfile {
    pub synonyms: BTreeSet<String>,
    pub antonyms: BTreeSet<String>,
    pub hypernyms: BTreeSet<String>,
    pub hyponyms: BTreeSet<String>,
}

impl RelationProfile {
    /// The word set for a relation. Collocations are never part of a profile,
    /// so that category maps to an empty set.
    pub fn get(&self, category: Category) -> &BTreeSet<String> {
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        match category {
            Category::Synonym => &self.synonyms,
            Category::Antonym => &self.antonyms,
            Category::Hypernym => &self.hypernyms,
            Category::Hyponym => &self.hyponyms,
            Category::Collocation => &EMPTY,
        }
    }

    pub(crate) fn get_mut(&mut self, category: Category) -> Option<&mut BTreeSet<String>> {
        match category {
            Category::Synonym => Some(&mut self.synonyms),
            Category::Antonym => Some(&mut self.antonyms),
            Category::Hypernym => Some(&mut self.hypernyms),
            Category::Hyponym => Some(&mut self.hyponyms),
            Category::Collocation => None,
        }
    }

    pub fn available(&self, category: Category) -> usize {
        self.get(category).len()
    }

    pub fn is_empty(&self) -> bool {
        Category::RELATIONS.iter().all(|&c| self.get(c).is_empty())
    }
}

/// How many card slots each category should fill. Labels that were never
/// drawn are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts(BTreeMap<Category, usize>);

impl CategoryCounts {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, category: Category) -> usize {
        self.0.get(&category).copied().unwrap_or(0)
    }

    pub fn set(&mut self, category: Category, count: usize) {
        self.0.insert(category, count);
    }

    pub fn add(&mut self, category: Category, count: usize) {
        *self.0.entry(category).or_insert(0) += count;
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0.contains_key(&category)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        self.0.iter().map(|(&c, &n)| (c, n))
    }
}

impl FromIterator<(Category, usize)> for CategoryCounts {
    fn from_iter<I: IntoIterator<Item = (Category, usize)>>(iter: I) -> Self {
        let mut counts = CategoryCounts::new();
        for (category, n) in iter {
            counts.add(category, n);
        }
        counts
    }
}

/// A main word together with the words a describer may not say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub main_word: String,
    pub taboo_words: Vec<String>,
}

impl Card {
    pub fn new(main_word: impl Into<String>, taboo_words: Vec<String>) -> Self {
        Self {
            main_word: main_word.into(),
            taboo_words,
        }
    }

    /// How many slots are missing when the embedding pool came up short.
    pub fn shortfall(&self) -> usize {
        CARD_SIZE.saturating_sub(self.taboo_words.len())
    }

    pub fn is_complete(&self) -> bool {
        self.shortfall() == 0
    }
}

/// Sentinel returned instead of a card when the main word has no embedding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no card can be generated for '{word}'")]
pub struct NotInVocabulary {
    pub word: String,
}
