//! Error types for card composition and description generation.

use crate::core::types::NotInVocabulary;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors raised by the relation, sampling and generation components.
#[derive(Debug, Error)]
pub enum TabooError {
    /// The word has no vector in the embedding model.
    #[error("'{word}' is not in the embedding vocabulary")]
    Vocabulary { word: String },

    /// The widening collocate search hit its attempt ceiling or ran out of
    /// neighbours before enough candidates survived filtering.
    #[error("collocate search for '{word}' exhausted after {attempts} attempts ({} found)", found.len())]
    ExhaustedSearch {
        word: String,
        attempts: usize,
        found: BTreeSet<String>,
    },

    /// Card composition refused the word; raised when a caller needs a card
    /// to continue, as description generation does.
    #[error(transparent)]
    NotInVocabulary(#[from] NotInVocabulary),

    #[error("invalid category distribution: {0}")]
    InvalidDistribution(String),

    /// Only two- and three-segment seed plans exist.
    #[error("unsupported seed count {0} (expected 2 or 3)")]
    InvalidSeedCount(usize),

    #[error("sequence generator has an empty vocabulary")]
    EmptyGenerator,

    #[error("gold-standard table is missing the '{0}' column")]
    MissingGoldColumn(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, TabooError>;
