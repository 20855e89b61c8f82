// File: src/lexical.rs
//! Lexical-semantic relations (synonym, antonym, hypernym, hyponym) drawn
//! from a WordNet-style database of senses.

use crate::core::types::{Category, RelationProfile};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read-only access to a sense inventory.
///
/// A word maps to zero or more senses; a sense exposes the surface form of its
/// first lemma and its direct relations. Implementations must be
/// deterministic: the same query always yields the same answer.
pub trait LexicalDatabase {
    type Sense: Clone;

    /// All senses the word participates in. Empty for unknown words.
    fn senses(&self, word: &str) -> Vec<Self::Sense>;

    fn first_lemma(&self, sense: &Self::Sense) -> Option<String>;

    /// Antonym lemma names registered on the sense's first lemma.
    fn antonym_lemmas(&self, sense: &Self::Sense) -> Vec<String>;

    fn hypernyms(&self, sense: &Self::Sense) -> Vec<Self::Sense>;

    fn hyponyms(&self, sense: &Self::Sense) -> Vec<Self::Sense>;

    fn knows(&self, word: &str) -> bool {
        !self.senses(word).is_empty()
    }
}

/// Synonyms of `word`: the lowercased first lemma of every sense, minus the
/// word itself and anything containing it.
pub fn synonyms<L: LexicalDatabase + ?Sized>(db: &L, word: &str) -> BTreeSet<String> {
    db.senses(word)
        .iter()
        .filter_map(|sense| db.first_lemma(sense))
        .map(|lemma| lemma.to_lowercase())
        .filter(|syn| !syn.contains(word))
        .collect()
}

/// Builds the full relation profile for a main word. Words without senses
/// yield an empty profile rather than an error.
pub fn relations<L: LexicalDatabase + ?Sized>(db: &L, word: &str) -> RelationProfile {
    let mut profile = RelationProfile {
        synonyms: synonyms(db, word),
        ..RelationProfile::default()
    };

    for sense in db.senses(word) {
        let antonyms = db.antonym_lemmas(&sense);
        let hypernyms = db
            .hypernyms(&sense)
            .iter()
            .filter_map(|s| db.first_lemma(s))
            .collect::<Vec<_>>();
        let hyponyms = db
            .hyponyms(&sense)
            .iter()
            .filter_map(|s| db.first_lemma(s))
            .collect::<Vec<_>>();

        for (category, words) in [
            (Category::Antonym, antonyms),
            (Category::Hypernym, hypernyms),
            (Category::Hyponym, hyponyms),
        ] {
            if let Some(set) = profile.get_mut(category) {
                set.extend(words.into_iter().filter(|w| !w.contains(word)));
            }
        }
    }

    log::debug!(
        "relations for '{}': {} syn, {} ant, {} hyper, {} hypo",
        word,
        profile.synonyms.len(),
        profile.antonyms.len(),
        profile.hypernyms.len(),
        profile.hyponyms.len()
    );
    profile
}

/// One sense in the in-memory store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synset {
    /// Lemma names, first one is the canonical surface form.
    pub lemmas: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
    /// Synset ids of direct hypernyms.
    #[serde(default)]
    pub hypernyms: Vec<String>,
    #[serde(default)]
    pub hyponyms: Vec<String>,
}

/// A WordNet-shaped lexical database held in memory, keyed by synset id
/// (e.g. `"victory.n.01"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordNetStore {
    synsets: BTreeMap<String, Synset>,
    /// Lowercased lemma -> synset ids. Rebuilt after deserialisation.
    #[serde(skip)]
    index: HashMap<String, Vec<String>>,
}

impl WordNetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a synset and indexes its lemmas.
    pub fn insert(&mut self, id: impl Into<String>, synset: Synset) {
        let id = id.into();
        if let Some(old) = self.synsets.insert(id.clone(), synset) {
            self.unindex(&id, &old);
        }
        let lemmas = self.synsets[&id].lemmas.clone();
        for lemma in lemmas {
            let ids = self.index.entry(lemma.to_lowercase()).or_default();
            if !ids.contains(&id) {
                ids.push(id.clone());
            }
        }
    }

    fn unindex(&mut self, id: &str, old: &Synset) {
        for lemma in &old.lemmas {
            if let Some(ids) = self.index.get_mut(&lemma.to_lowercase()) {
                ids.retain(|existing| existing != id);
            }
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (id, synset) in &self.synsets {
            for lemma in &synset.lemmas {
                let ids = self.index.entry(lemma.to_lowercase()).or_default();
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
        }
    }

    /// Loads a store from a JSON document of the form
    /// `{"synsets": {"<id>": {"lemmas": [...], ...}}}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut store: WordNetStore = serde_json::from_reader(reader)?;
        store.reindex();
        log::info!("loaded {} synsets from {:?}", store.synsets.len(), path);
        Ok(store)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut store: WordNetStore = serde_json::from_str(json)?;
        store.reindex();
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.synsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synsets.is_empty()
    }
}

impl LexicalDatabase for WordNetStore {
    type Sense = String;

    fn senses(&self, word: &str) -> Vec<String> {
        self.index
            .get(&word.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    fn first_lemma(&self, sense: &String) -> Option<String> {
        self.synsets.get(sense)?.lemmas.first().cloned()
    }

    fn antonym_lemmas(&self, sense: &String) -> Vec<String> {
        self.synsets
            .get(sense)
            .map(|s| s.antonyms.clone())
            .unwrap_or_default()
    }

    fn hypernyms(&self, sense: &String) -> Vec<String> {
        self.synsets
            .get(sense)
            .map(|s| s.hypernyms.clone())
            .unwrap_or_default()
    }

    fn hyponyms(&self, sense: &String) -> Vec<String> {
        self.synsets
            .get(sense)
            .map(|s| s.hyponyms.clone())
            .unwrap_or_default()
    }
}

/// Noun detachment rules applied by the lemmatiser, in the morphy style.
const NOUN_SUFFIX_RULES: [(&str, &str); 8] = [
    ("s", ""),
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

/// Strips plural inflection using the lexical database as the dictionary of
/// valid base forms.
pub struct Lemmatizer<'a, L: ?Sized> {
    db: &'a L,
}

impl<'a, L: LexicalDatabase + ?Sized> Lemmatizer<'a, L> {
    pub fn new(db: &'a L) -> Self {
        Self { db }
    }

    /// Returns the shortest known form among the word and its rule-based
    /// detachments, or the word unchanged when none is known.
    pub fn lemmatize(&self, word: &str) -> String {
        let mut candidates = vec![word.to_string()];
        for (suffix, replacement) in NOUN_SUFFIX_RULES {
            if let Some(stem) = word.strip_suffix(suffix) {
                candidates.push(format!("{}{}", stem, replacement));
            }
        }

        candidates
            .into_iter()
            .filter(|c| !c.is_empty() && self.db.knows(c))
            .min_by_key(|c| c.chars().count())
            .unwrap_or_else(|| word.to_string())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn synset(lemmas: &[&str], antonyms: &[&str], hypernyms: &[&str], hyponyms: &[&str]) -> Synset {
        let own = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
        Synset {
            lemmas: own(lemmas),
            antonyms: own(antonyms),
            hypernyms: own(hypernyms),
            hyponyms: own(hyponyms),
        }
    }

    /// Small store around "victory" shared with the composer tests.
    pub(crate) fn victory_store() -> WordNetStore {
        let mut db = WordNetStore::new();
        db.insert(
            "victory.n.01",
            synset(&["victory", "triumph"], &[], &["success.n.01"], &["romp.n.01"]),
        );
        db.insert("triumph.n.01", synset(&["triumph", "victory"], &[], &[], &[]));
        db.insert("success.n.01", synset(&["winning", "success"], &[], &[], &[]));
        db.insert("romp.n.01", synset(&["romp", "blowout"], &[], &[], &[]));
        db.insert(
            "victory_lap.n.01",
            synset(&["victory_lap"], &[], &[], &[]),
        );
        db
    }

    #[test]
    fn test_victory_profile() {
        let db = victory_store();
        let profile = relations(&db, "victory");
        assert_eq!(profile.synonyms, BTreeSet::from(["triumph".to_string()]));
        assert!(profile.antonyms.is_empty());
        assert_eq!(profile.hypernyms, BTreeSet::from(["winning".to_string()]));
        assert_eq!(profile.hyponyms, BTreeSet::from(["romp".to_string()]));
    }

    #[test]
    fn test_profile_excludes_main_word_substrings() {
        let mut db = WordNetStore::new();
        db.insert("cat.n.01", synset(&["cat"], &[], &["feline.n.01"], &["catbird.n.01", "tom.n.01"]));
        db.insert("cat.n.02", synset(&["cattle", "cat"], &[], &[], &[]));
        db.insert("feline.n.01", synset(&["feline"], &[], &[], &[]));
        db.insert("catbird.n.01", synset(&["catbird"], &[], &[], &[]));
        db.insert("tom.n.01", synset(&["tom"], &[], &[], &[]));

        let profile = relations(&db, "cat");
        for category in Category::RELATIONS {
            for w in profile.get(category) {
                assert!(!w.contains("cat"), "{} leaked into {}", w, category);
            }
        }
        assert_eq!(profile.hyponyms, BTreeSet::from(["tom".to_string()]));
    }

    #[test]
    fn test_antonyms_filtered() {
        let mut db = WordNetStore::new();
        db.insert("good.a.01", synset(&["good"], &["bad", "goodless"], &[], &[]));
        let profile = relations(&db, "good");
        assert_eq!(profile.antonyms, BTreeSet::from(["bad".to_string()]));
    }

    #[test]
    fn test_unknown_word_has_empty_profile() {
        let db = victory_store();
        let profile = relations(&db, "xyzzy");
        assert!(profile.is_empty());
    }

    #[test]
    fn test_relations_are_idempotent() {
        let db = victory_store();
        assert_eq!(relations(&db, "victory"), relations(&db, "victory"));
    }

    #[test]
    fn test_json_roundtrip_rebuilds_index() {
        let json = r#"{"synsets": {"dog.n.01": {"lemmas": ["dog", "domestic_dog"], "hypernyms": ["canine.n.02"]},
                                   "canine.n.02": {"lemmas": ["canine"]}}}"#;
        let db = WordNetStore::from_json_str(json).unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.senses("dog"), vec!["dog.n.01".to_string()]);
        let profile = relations(&db, "dog");
        assert_eq!(profile.hypernyms, BTreeSet::from(["canine".to_string()]));
    }

    #[test]
    fn test_lemmatizer_prefers_known_base_form() {
        let mut db = WordNetStore::new();
        db.insert("box.n.01", synset(&["box"], &[], &[], &[]));
        db.insert("city.n.01", synset(&["city"], &[], &[], &[]));
        db.insert("woman.n.01", synset(&["woman"], &[], &[], &[]));
        let lemmatizer = Lemmatizer::new(&db);
        assert_eq!(lemmatizer.lemmatize("boxes"), "box");
        assert_eq!(lemmatizer.lemmatize("cities"), "city");
        assert_eq!(lemmatizer.lemmatize("women"), "woman");
        assert_eq!(lemmatizer.lemmatize("glass"), "glass");
    }
}
