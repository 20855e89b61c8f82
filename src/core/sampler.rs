// File: src/core/sampler.rs
//! Drawing a card's category mixture and reconciling it with what the
//! lexical database can actually supply.

use crate::core::types::{Category, CategoryCounts, RelationProfile, CARD_SIZE};
use crate::error::{Result, TabooError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolerance for probability comparisons.
pub const PROB_TOLERANCE: f64 = 1e-6;

/// Probability of each slot label, estimated from gold-standard annotation
/// counts. Only the four relations and "collocation" can appear.
///
/// Invariants:
/// - All probabilities are non-negative
/// - Probabilities sum to 1 (within tolerance)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDistribution {
    probs: BTreeMap<Category, f64>,
}

impl CategoryDistribution {
    /// Normalises per-category observation counts into a distribution.
    ///
    /// # Errors
    ///
    /// Returns an error if any count is negative or not finite, or if all
    /// counts are zero.
    pub fn from_counts(counts: &BTreeMap<Category, f64>) -> Result<Self> {
        if counts.values().any(|&c| c < 0.0 || !c.is_finite()) {
            return Err(TabooError::InvalidDistribution(
                "negative or non-finite count".to_string(),
            ));
        }
        let sum: f64 = counts.values().sum();
        if sum <= 0.0 {
            return Err(TabooError::InvalidDistribution(
                "all category counts are zero".to_string(),
            ));
        }

        let probs = counts
            .iter()
            .filter(|(_, &c)| c > 0.0)
            .map(|(&cat, &c)| (cat, c / sum))
            .collect();
        Ok(Self { probs })
    }

    /// Uses already-normalised probabilities as given.
    pub fn new(probs: BTreeMap<Category, f64>) -> Result<Self> {
        if probs.values().any(|&p| p < -PROB_TOLERANCE) {
            return Err(TabooError::InvalidDistribution(
                "negative probability".to_string(),
            ));
        }
        let sum: f64 = probs.values().sum();
        if (sum - 1.0).abs() > PROB_TOLERANCE {
            return Err(TabooError::InvalidDistribution(format!(
                "probabilities sum to {} (expected 1.0)",
                sum
            )));
        }
        Ok(Self { probs })
    }

    pub fn prob(&self, category: Category) -> f64 {
        self.probs.get(&category).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.probs.iter().map(|(&c, &p)| (c, p))
    }

    /// Inverse transform sampling from a uniform value in [0, 1).
    pub fn sample(&self, u: f64) -> Category {
        let mut cumsum = 0.0;
        let mut last = Category::Collocation;
        for (&category, &p) in &self.probs {
            if p <= 0.0 {
                continue;
            }
            cumsum += p;
            last = category;
            if u < cumsum {
                return category;
            }
        }
        // u close to 1.0 and rounding
        last
    }
}

/// Draws one label per card slot, with replacement, and tallies them.
pub fn draw_categories<R: Rng + ?Sized>(dist: &CategoryDistribution, rng: &mut R) -> CategoryCounts {
    (0..CARD_SIZE)
        .map(|_| (dist.sample(rng.gen::<f64>()), 1))
        .collect()
}

/// Clamps every relation count to what `profile` can supply and moves the
/// shortfall onto "collocation". The total is preserved.
///
/// Relations are processed in [`Category::RELATIONS`] order.
pub fn reconcile(mut counts: CategoryCounts, profile: &RelationProfile) -> CategoryCounts {
    let mut deficit = 0;
    for category in Category::RELATIONS {
        let requested = counts.get(category);
        let available = profile.available(category);
        if requested > available {
            deficit += requested - available;
            counts.set(category, available);
        }
    }
    if deficit > 0 || counts.contains(Category::Collocation) {
        counts.add(Category::Collocation, deficit);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn gold_like() -> CategoryDistribution {
        CategoryDistribution::from_counts(&BTreeMap::from([
            (Category::Synonym, 40.0),
            (Category::Antonym, 5.0),
            (Category::Hypernym, 20.0),
            (Category::Hyponym, 10.0),
            (Category::Collocation, 125.0),
        ]))
        .unwrap()
    }

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn victory_profile() -> RelationProfile {
        RelationProfile {
            synonyms: set(&["triumph"]),
            antonyms: BTreeSet::new(),
            hypernyms: set(&["winning"]),
            hyponyms: set(&["romp"]),
        }
    }

    #[test]
    fn test_from_counts_normalises() {
        let dist = gold_like();
        let total: f64 = dist.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < PROB_TOLERANCE);
        assert!((dist.prob(Category::Collocation) - 0.625).abs() < PROB_TOLERANCE);
    }

    #[test]
    fn test_zero_counts_rejected() {
        let result = CategoryDistribution::from_counts(&BTreeMap::from([(Category::Synonym, 0.0)]));
        assert!(matches!(result, Err(TabooError::InvalidDistribution(_))));
    }

    #[test]
    fn test_new_requires_normalised() {
        let result = CategoryDistribution::new(BTreeMap::from([
            (Category::Synonym, 0.3),
            (Category::Hyponym, 0.6),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_sample_inverse_transform() {
        let dist = CategoryDistribution::new(BTreeMap::from([
            (Category::Synonym, 0.3),
            (Category::Collocation, 0.7),
        ]))
        .unwrap();
        assert_eq!(dist.sample(0.0), Category::Synonym);
        assert_eq!(dist.sample(0.29), Category::Synonym);
        assert_eq!(dist.sample(0.31), Category::Collocation);
        assert_eq!(dist.sample(0.999_999_9), Category::Collocation);
    }

    #[test]
    fn test_draw_fills_every_slot() {
        let dist = gold_like();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let counts = draw_categories(&dist, &mut rng);
            assert_eq!(counts.total(), CARD_SIZE);
        }
    }

    #[test]
    fn test_victory_reconciliation() {
        let drawn: CategoryCounts = [
            (Category::Synonym, 2),
            (Category::Antonym, 1),
            (Category::Hypernym, 1),
            (Category::Hyponym, 1),
        ]
        .into_iter()
        .collect();

        let reconciled = reconcile(drawn, &victory_profile());
        assert_eq!(reconciled.get(Category::Synonym), 1);
        assert_eq!(reconciled.get(Category::Antonym), 0);
        assert_eq!(reconciled.get(Category::Hypernym), 1);
        assert_eq!(reconciled.get(Category::Hyponym), 1);
        assert_eq!(reconciled.get(Category::Collocation), 2);
        assert_eq!(reconciled.total(), CARD_SIZE);
    }

    #[test]
    fn test_empty_profile_pushes_everything_to_collocation() {
        let dist = gold_like();
        let mut rng = StdRng::seed_from_u64(11);
        let reconciled = reconcile(draw_categories(&dist, &mut rng), &RelationProfile::default());
        assert_eq!(reconciled.get(Category::Collocation), CARD_SIZE);
    }

    #[test]
    fn test_reconciled_counts_never_exceed_availability() {
        let dist = gold_like();
        let profile = victory_profile();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let reconciled = reconcile(draw_categories(&dist, &mut rng), &profile);
            assert_eq!(reconciled.total(), CARD_SIZE);
            for category in Category::RELATIONS {
                assert!(reconciled.get(category) <= profile.available(category));
            }
        }
    }
}
