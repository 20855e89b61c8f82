// File: src/core/engine.rs
use crate::collocates::CollocateSearch;
use crate::config::Settings;
use crate::core::composer::CardComposer;
use crate::core::context::{NgramModel, SequenceGenerator};
use crate::core::sampler::CategoryDistribution;
use crate::core::types::{Card, NotInVocabulary};
use crate::embedding::{EmbeddingModel, VectorTable};
use crate::error::Result;
use crate::gold::GoldStandard;
use crate::lexical::{relations, LexicalDatabase, WordNetStore};
use crate::persistence::{load_ngram_model, load_vector_table};
use crate::refiner::{clean, target_vocabulary, DescriptionRefiner};
use rand::Rng;
use serde::Serialize;
use std::path::PathBuf;

/// Locations of the resources an engine is built from.
#[derive(Debug, Clone)]
pub struct DataPaths {
    /// WordNet synsets as JSON.
    pub wordnet: PathBuf,
    /// word2vec text, or a `.bin` checkpoint.
    pub embeddings: PathBuf,
    /// One sentence per line, or a `.bin` checkpoint.
    pub corpus: PathBuf,
    /// Annotated gold-standard CSV.
    pub gold: PathBuf,
}

/// A card together with the description generated for it.
#[derive(Debug, Clone, Serialize)]
pub struct Description {
    pub card: Card,
    pub targets: Vec<String>,
    pub raw: String,
    pub cleaned: String,
    pub scores: Vec<i64>,
}

// Owns every loaded resource. All of them are read-only after construction,
// so one engine can serve any number of requests.
pub struct TabooEngine<L, E, G> {
    pub lexicon: L,
    pub embeddings: E,
    pub generator: G,
    distribution: CategoryDistribution,
    search: CollocateSearch,
    settings: Settings,
}

impl<L, E, G> TabooEngine<L, E, G>
where
    L: LexicalDatabase,
    E: EmbeddingModel,
    G: SequenceGenerator,
{
    pub fn new(lexicon: L, embeddings: E, generator: G, distribution: CategoryDistribution, settings: Settings) -> Self {
        Self {
            lexicon,
            embeddings,
            generator,
            distribution,
            search: CollocateSearch::new(settings.collocates.clone()),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn distribution(&self) -> &CategoryDistribution {
        &self.distribution
    }

    pub fn draw_card<R: Rng>(&self, word: &str, rng: &mut R) -> std::result::Result<Card, NotInVocabulary> {
        CardComposer::new(&self.lexicon, &self.embeddings, &self.search).compose(word, &self.distribution, rng)
    }

    /// Draws a card for `word`, then refines a description that mentions as
    /// much of the card's vocabulary as the generator allows and hides the
    /// main and taboo words in a cleaned copy.
    pub fn describe<R: Rng>(&self, word: &str, seeds: usize, iterations: usize, rng: &mut R) -> Result<Description> {
        let card = self.draw_card(word, rng)?;
        let profile = relations(&self.lexicon, word);
        let targets = target_vocabulary(&card, &profile, &self.generator);
        log::debug!("target vocabulary for '{}': {:?}", word, targets);

        let refiner = DescriptionRefiner::new(&self.generator, &self.settings.refiner);
        let refinement = refiner.refine(word, seeds, iterations, &targets, rng)?;
        let cleaned = clean(
            &refinement.sentence,
            &card,
            &self.lexicon,
            &self.settings.refiner.placeholder,
            rng,
        );

        Ok(Description {
            card,
            targets,
            raw: refinement.sentence,
            cleaned,
            scores: refinement.scores,
        })
    }
}

impl TabooEngine<WordNetStore, VectorTable, NgramModel> {
    /// Loads every resource named in `paths`.
    pub fn from_paths(paths: &DataPaths, settings: Settings) -> Result<Self> {
        let lexicon = WordNetStore::from_json_file(&paths.wordnet)?;
        let embeddings = load_vector_table(&paths.embeddings)?;
        let generator = load_ngram_model(&paths.corpus)?;
        let distribution = GoldStandard::from_csv_path(&paths.gold)?.distribution()?;
        log::info!(
            "engine ready: {} synsets, {} vectors, {} generator words",
            lexicon.len(),
            embeddings.vocab_len(),
            generator.vocab_len()
        );
        Ok(Self::new(lexicon, embeddings, generator, distribution, settings))
    }
}
