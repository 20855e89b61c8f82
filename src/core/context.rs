// File: src/core/context.rs
use crate::core::types::WordId;
use crate::error::{Result, TabooError};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A pretrained word-sequence model that can continue a prompt.
pub trait SequenceGenerator {
    /// Returns `prime` followed by `length` sampled words, space separated.
    /// Lower temperatures sharpen the distribution over next words.
    fn generate<R: Rng + ?Sized>(
        &self,
        prime: &str,
        length: usize,
        temperature: f32,
        rng: &mut R,
    ) -> Result<String>;

    fn knows(&self, word: &str) -> bool;
}

/// Word n-gram model conditioning on the last two words of the context,
/// backing off to one word and then to unigram frequency.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NgramModel {
    vocab: Vec<String>,
    #[serde(skip)]
    ids: HashMap<String, WordId>,
    unigrams: Vec<u64>,
    /// Maps prev_word_id -> next_word_id -> frequency
    bigrams: HashMap<WordId, HashMap<WordId, u64>>,
    /// Maps (prev2, prev1) -> next_word_id -> frequency
    trigrams: HashMap<(WordId, WordId), HashMap<WordId, u64>>,
}

impl NgramModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every sentence (one per line) of a plain-text corpus.
    pub fn from_corpus_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut model = NgramModel::new();
        for line in reader.lines() {
            model.add_sentence(&line?);
        }
        log::info!("counted corpus {:?}: {} word types", path, model.vocab.len());
        Ok(model)
    }

    pub fn from_sentences<'a, I: IntoIterator<Item = &'a str>>(sentences: I) -> Self {
        let mut model = NgramModel::new();
        for sentence in sentences {
            model.add_sentence(sentence);
        }
        model
    }

    fn intern(&mut self, word: &str) -> WordId {
        if let Some(&id) = self.ids.get(word) {
            return id;
        }
        let id = self.vocab.len();
        self.vocab.push(word.to_string());
        self.unigrams.push(0);
        self.ids.insert(word.to_string(), id);
        id
    }

    /// Adds one sentence's unigram, bigram and trigram counts.
    /// O(n) in the sentence length.
    pub fn add_sentence(&mut self, sentence: &str) {
        let ids: Vec<WordId> = sentence
            .split_whitespace()
            .map(|w| self.intern(&w.to_lowercase()))
            .collect();

        for (i, &id) in ids.iter().enumerate() {
            self.unigrams[id] += 1;
            if i >= 1 {
                *self.bigrams.entry(ids[i - 1]).or_default().entry(id).or_insert(0) += 1;
            }
            if i >= 2 {
                *self
                    .trigrams
                    .entry((ids[i - 2], ids[i - 1]))
                    .or_default()
                    .entry(id)
                    .or_insert(0) += 1;
            }
        }
    }

    /// Rebuilds the word index; call after deserialising.
    pub fn reindex(&mut self) {
        self.ids = self
            .vocab
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();
    }

    pub fn vocab_len(&self) -> usize {
        self.vocab.len()
    }

    /// Next-word counts for the context, from the most specific n-gram table
    /// that has an entry for it.
    fn candidates(&self, context: &[Option<WordId>]) -> Vec<(WordId, u64)> {
        if let [.., Some(a), Some(b)] = context {
            if let Some(next) = self.trigrams.get(&(*a, *b)) {
                return next.iter().map(|(&id, &n)| (id, n)).collect();
            }
        }
        if let [.., Some(b)] = context {
            if let Some(next) = self.bigrams.get(b) {
                return next.iter().map(|(&id, &n)| (id, n)).collect();
            }
        }
        self.unigrams
            .iter()
            .enumerate()
            .filter(|(_, &n)| n > 0)
            .map(|(id, &n)| (id, n))
            .collect()
    }

    /// Temperature-scaled multinomial draw: weight = count^(1/T), which is a
    /// softmax over log-counts divided by T.
    fn sample_next<R: Rng + ?Sized>(
        &self,
        context: &[Option<WordId>],
        temperature: f32,
        rng: &mut R,
    ) -> Result<WordId> {
        let mut candidates = self.candidates(context);
        if candidates.is_empty() {
            return Err(TabooError::EmptyGenerator);
        }
        // HashMap order is unstable; sort so a seeded rng is reproducible.
        candidates.sort_unstable_by_key(|&(id, _)| id);

        // Scaled by the max count first so low temperatures cannot overflow.
        let inv_t = 1.0 / f64::from(temperature.max(0.01));
        let max = candidates.iter().map(|&(_, n)| n).max().unwrap_or(1) as f64;
        let weights: Vec<f64> = candidates
            .iter()
            .map(|&(_, n)| (n as f64 / max).powf(inv_t))
            .collect();
        let index = WeightedIndex::new(&weights).map_err(|_| TabooError::EmptyGenerator)?;
        Ok(candidates[index.sample(rng)].0)
    }
}

impl SequenceGenerator for NgramModel {
    fn generate<R: Rng + ?Sized>(
        &self,
        prime: &str,
        length: usize,
        temperature: f32,
        rng: &mut R,
    ) -> Result<String> {
        if self.vocab.is_empty() {
            return Err(TabooError::EmptyGenerator);
        }
        let mut context: Vec<Option<WordId>> = prime
            .split_whitespace()
            .map(|w| self.ids.get(&w.to_lowercase()).copied())
            .collect();

        let mut output = prime.trim().to_string();
        for _ in 0..length {
            let next = self.sample_next(&context, temperature, rng)?;
            if !output.is_empty() {
                output.push(' ');
            }
            output.push_str(&self.vocab[next]);
            context.push(Some(next));
        }
        Ok(output)
    }

    fn knows(&self, word: &str) -> bool {
        self.ids.contains_key(word)
    }
}
