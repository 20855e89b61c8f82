// File: src/embedding.rs
//! Word-embedding capability and an in-memory cosine-similarity table.

use crate::error::{Result, TabooError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read-only nearest-neighbour access to a distributional model.
pub trait EmbeddingModel {
    fn contains(&self, word: &str) -> bool;

    /// The `topn` words most similar to `word`, best first, excluding the word
    /// itself. May return fewer than `topn` when the vocabulary runs out.
    ///
    /// # Errors
    ///
    /// Returns [`TabooError::Vocabulary`] if `word` has no vector.
    fn most_similar(&self, word: &str, topn: usize) -> Result<Vec<(String, f32)>>;

    fn vocab_len(&self) -> usize;
}

/// Dense vectors for a fixed vocabulary. Vectors are stored unit-normalised
/// so similarity is a dot product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorTable {
    words: Vec<String>,
    vectors: Vec<Vec<f32>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl VectorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a word with its raw vector. A zero vector is kept but never
    /// similar to anything.
    pub fn insert(&mut self, word: impl Into<String>, vector: Vec<f32>) {
        let word = word.into();
        let vector = normalize(vector);
        match self.index.get(&word) {
            Some(&i) => self.vectors[i] = vector,
            None => {
                self.index.insert(word.clone(), self.words.len());
                self.words.push(word);
                self.vectors.push(vector);
            }
        }
    }

    /// Rebuilds the word index; call after deserialising.
    pub fn reindex(&mut self) {
        self.index = self
            .words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();
    }

    /// Reads the word2vec text format: an optional `<count> <dim>` header,
    /// then one `word v1 v2 ... vd` line per entry. Lines whose dimension
    /// disagrees with the first vector are skipped.
    pub fn from_word2vec_text(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut table = VectorTable::new();
        let mut dim: Option<usize> = None;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else { continue };
            let values: Vec<f32> = fields.filter_map(|v| v.parse().ok()).collect();

            if line_no == 0 && values.len() == 1 && word.parse::<usize>().is_ok() {
                continue; // header
            }
            match dim {
                None => dim = Some(values.len()),
                Some(d) if d != values.len() => {
                    log::warn!("skipping '{}' on line {}: expected {} dims", word, line_no + 1, d);
                    continue;
                }
                _ => {}
            }
            table.insert(word, values);
        }

        log::info!("loaded {} vectors from {:?}", table.len(), path);
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        let va = self.vector(a)?;
        let vb = self.vector(b)?;
        Ok(dot(va, vb))
    }

    fn vector(&self, word: &str) -> Result<&[f32]> {
        self.index
            .get(word)
            .map(|&i| self.vectors[i].as_slice())
            .ok_or_else(|| TabooError::Vocabulary {
                word: word.to_string(),
            })
    }
}

impl EmbeddingModel for VectorTable {
    fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Brute-force scan over the vocabulary.
    /// Complexity: O(V * d + V log V).
    fn most_similar(&self, word: &str, topn: usize) -> Result<Vec<(String, f32)>> {
        let query = self.vector(word)?;
        let mut scored: Vec<(String, f32)> = self
            .words
            .iter()
            .zip(&self.vectors)
            .filter(|(w, _)| w.as_str() != word)
            .map(|(w, v)| (w.clone(), dot(query, v)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(topn);
        Ok(scored)
    }

    fn vocab_len(&self) -> usize {
        self.words.len()
    }
}

fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
