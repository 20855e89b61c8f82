// File: src/gold.rs
//! Gold-standard annotations: one row per (main word, taboo word) pair with a
//! 0/1 column per relation label. Only the column sums are used downstream.

use crate::core::sampler::CategoryDistribution;
use crate::core::types::Category;
use crate::error::{Result, TabooError};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Labels annotated in the source data that never enter the distribution.
pub const EXCLUDED_LABELS: [&str; 2] = ["cultural_ref", "other"];

/// Column sums of an annotated gold-standard table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoldStandard {
    counts: BTreeMap<Category, f64>,
    excluded: BTreeMap<String, f64>,
    rows: usize,
}

fn column_category(header: &str) -> Option<Category> {
    match header.trim().to_lowercase().trim_start_matches("semrel_") {
        "synonym" => Some(Category::Synonym),
        "antonym" => Some(Category::Antonym),
        "hypernym" => Some(Category::Hypernym),
        "hyponym" => Some(Category::Hyponym),
        "collocation" => Some(Category::Collocation),
        _ => None,
    }
}

impl GoldStandard {
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let gold = Self::from_csv_reader(File::open(path)?)?;
        log::info!("read {} gold-standard rows from {:?}", gold.rows, path);
        for label in EXCLUDED_LABELS {
            log::debug!("'{}' annotations left out: {}", label, gold.excluded(label));
        }
        Ok(gold)
    }

    /// Sums every label column. Empty or unparsable cells count as 0.
    ///
    /// # Errors
    ///
    /// Returns [`TabooError::MissingGoldColumn`] if any of the five sampled
    /// labels has no column.
    pub fn from_csv_reader<R: Read>(input: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(input);
        let headers = reader.headers()?.clone();

        let mut columns: Vec<(usize, Category)> = Vec::new();
        let mut excluded_columns: Vec<(usize, String)> = Vec::new();
        for (i, header) in headers.iter().enumerate() {
            let name = header.trim().to_lowercase();
            if let Some(category) = column_category(&name) {
                columns.push((i, category));
            } else if EXCLUDED_LABELS.contains(&name.as_str()) {
                excluded_columns.push((i, name));
            }
        }

        for category in Category::ALL {
            if !columns.iter().any(|&(_, c)| c == category) {
                return Err(TabooError::MissingGoldColumn(category.as_str().to_string()));
            }
        }

        let mut gold = GoldStandard::default();
        for result in reader.records() {
            let record = result?;
            gold.rows += 1;
            for &(i, category) in &columns {
                *gold.counts.entry(category).or_insert(0.0) += cell_value(record.get(i));
            }
            for (i, name) in &excluded_columns {
                *gold.excluded.entry(name.clone()).or_insert(0.0) += cell_value(record.get(*i));
            }
        }
        Ok(gold)
    }

    pub fn count(&self, category: Category) -> f64 {
        self.counts.get(&category).copied().unwrap_or(0.0)
    }

    /// Column sum of a label that never enters the distribution.
    pub fn excluded(&self, label: &str) -> f64 {
        self.excluded.get(label).copied().unwrap_or(0.0)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Normalises the relation and collocation sums. Excluded labels are
    /// dropped before normalising.
    pub fn distribution(&self) -> Result<CategoryDistribution> {
        CategoryDistribution::from_counts(&self.counts)
    }
}

fn cell_value(cell: Option<&str>) -> f64 {
    cell.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
