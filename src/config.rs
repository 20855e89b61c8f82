// File: src/config.rs
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for the widening collocate search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollocateSettings {
    /// Neighbours requested on the first attempt.
    pub initial_check: usize,
    /// Extra neighbours requested on each further attempt.
    pub widen_step: usize,
    /// Hard ceiling on attempts; the search fails past it.
    pub max_attempts: usize,
    /// Candidates must be strictly farther than this from the main word.
    pub min_edit_distance: usize,
    /// Marker joining the parts of a multi-word unit in the vocabulary.
    pub multiword_marker: String,
}

impl Default for CollocateSettings {
    fn default() -> Self {
        Self {
            initial_check: 10,
            widen_step: 3,
            max_attempts: 100,
            min_edit_distance: 4,
            multiword_marker: "_".to_string(),
        }
    }
}

/// Tunables for the description refiner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinerSettings {
    pub seeds: usize,
    pub iterations: usize,
    /// Any requested iteration budget is clamped to this.
    pub max_iterations: usize,
    pub temperature: f32,
    /// Replaces the main word in cleaned descriptions.
    pub placeholder: String,
}

impl Default for RefinerSettings {
    fn default() -> Self {
        Self {
            seeds: 3,
            iterations: 10,
            max_iterations: 1000,
            temperature: 1.0,
            placeholder: "The main word".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub collocates: CollocateSettings,
    pub refiner: RefinerSettings,
}

impl Settings {
    /// Loads settings from JSON. Keys that are absent keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
