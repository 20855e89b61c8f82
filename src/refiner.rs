// File: src/refiner.rs
//! Steers a sequence generator towards a target vocabulary by regenerating
//! sentence segments that have not yet contributed a target word.

use crate::config::RefinerSettings;
use crate::core::context::SequenceGenerator;
use crate::core::types::{Card, RelationProfile};
use crate::error::{Result, TabooError};
use crate::lexical::{synonyms, LexicalDatabase};
use rand::seq::IteratorRandom;
use rand::Rng;
use std::collections::{BTreeSet, HashMap};

/// Grammatical frame that opens one sentence segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedFrame {
    Means,
    Is,
    CanBeFound,
}

impl SeedFrame {
    pub fn prompt(self, main_word: &str) -> String {
        match self {
            SeedFrame::Means => format!("{} means", main_word),
            SeedFrame::Is => format!("{} is", main_word),
            SeedFrame::CanBeFound => format!("{} can be found", main_word),
        }
    }
}

/// Frames and generated-token budgets for a given seed count.
pub fn seed_plan(seeds: usize) -> Result<Vec<(SeedFrame, usize)>> {
    match seeds {
        3 => Ok(vec![
            (SeedFrame::Means, 7),
            (SeedFrame::Is, 7),
            (SeedFrame::CanBeFound, 5),
        ]),
        2 => Ok(vec![(SeedFrame::Means, 11), (SeedFrame::Is, 12)]),
        n => Err(TabooError::InvalidSeedCount(n)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub frame: SeedFrame,
    /// Words generated after the frame.
    pub new_tokens: usize,
    pub text: String,
    /// Set once a target word found here was credited; never regenerated after.
    pub covered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Seeded,
    Iterating(usize),
    Done,
}

/// Everything the refiner tracks about the sentence under construction.
#[derive(Debug, Clone)]
pub struct SentenceState {
    pub segments: Vec<Segment>,
    /// (segment, token offset) pairs already counted towards the score.
    pub credited: BTreeSet<(usize, usize)>,
    /// Occurrences per target word, main word discounted by the seed count.
    pub score_vector: Vec<i64>,
    pub score: i64,
    pub phase: Phase,
}

impl SentenceState {
    pub fn sentence(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Every token with its segment index and offset inside that segment.
    fn positioned_tokens(&self) -> Vec<(usize, usize, &str)> {
        self.segments
            .iter()
            .enumerate()
            .flat_map(|(seg, s)| {
                s.text
                    .split_whitespace()
                    .enumerate()
                    .map(move |(off, tok)| (seg, off, tok))
            })
            .collect()
    }

    fn count_targets(&self, targets: &[String], main_word: &str, discount: i64) -> Vec<i64> {
        let mut counts: HashMap<&str, i64> = HashMap::new();
        for (_, _, tok) in self.positioned_tokens() {
            *counts.entry(tok).or_insert(0) += 1;
        }
        targets
            .iter()
            .map(|t| {
                let n = counts.get(t.as_str()).copied().unwrap_or(0);
                if t == main_word {
                    n - discount
                } else {
                    n
                }
            })
            .collect()
    }

    /// Credits one not-yet-credited occurrence of `word` and returns its
    /// segment. A new occurrence can only come from an uncovered segment, so
    /// those are searched first; covered ones and then already credited
    /// occurrences are the fallbacks.
    fn credit(&mut self, word: &str) -> Option<usize> {
        let occurrences: Vec<(usize, usize)> = self
            .positioned_tokens()
            .into_iter()
            .filter(|(_, _, tok)| *tok == word)
            .map(|(seg, off, _)| (seg, off))
            .collect();
        let uncredited = |p: &&(usize, usize)| !self.credited.contains(*p);
        let pick = occurrences
            .iter()
            .filter(uncredited)
            .find(|(seg, _)| !self.segments[*seg].covered)
            .or_else(|| occurrences.iter().find(uncredited))
            .or_else(|| occurrences.first())
            .copied()?;
        self.credited.insert(pick);
        Some(pick.0)
    }
}

/// Outcome of a refinement run.
#[derive(Debug, Clone)]
pub struct Refinement {
    pub sentence: String,
    /// Score after each iteration.
    pub scores: Vec<i64>,
    pub state: SentenceState,
}

pub struct DescriptionRefiner<'a, G: ?Sized> {
    generator: &'a G,
    settings: &'a RefinerSettings,
}

impl<'a, G: SequenceGenerator + ?Sized> DescriptionRefiner<'a, G> {
    pub fn new(generator: &'a G, settings: &'a RefinerSettings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    fn fresh<R: Rng>(&self, frame: SeedFrame, n: usize, main_word: &str, rng: &mut R) -> Result<String> {
        self.generator
            .generate(&frame.prompt(main_word), n, self.settings.temperature, rng)
    }

    /// Generates the segment with the previous segment's text as leading
    /// context, then strips that context from the output.
    fn chained<R: Rng>(
        &self,
        previous: &str,
        frame: SeedFrame,
        n: usize,
        main_word: &str,
        rng: &mut R,
    ) -> Result<String> {
        let prime = format!("{} {}", previous.trim(), frame.prompt(main_word));
        let out = self
            .generator
            .generate(&prime, n, self.settings.temperature, rng)?;
        let skip = previous.split_whitespace().count();
        Ok(out.split_whitespace().skip(skip).collect::<Vec<_>>().join(" "))
    }

    /// Runs the full iteration budget (clamped to `max_iterations`) and
    /// returns the final sentence. There is no early stop.
    pub fn refine<R: Rng>(
        &self,
        main_word: &str,
        seeds: usize,
        iterations: usize,
        targets: &[String],
        rng: &mut R,
    ) -> Result<Refinement> {
        let plan = seed_plan(seeds)?;
        let discount = if targets.iter().any(|t| t == main_word) {
            seeds as i64
        } else {
            0
        };

        let mut segments = Vec::with_capacity(plan.len());
        for &(frame, n) in &plan {
            segments.push(Segment {
                frame,
                new_tokens: n,
                text: self.fresh(frame, n, main_word, rng)?,
                covered: false,
            });
        }
        let mut state = SentenceState {
            // The seed's own main word opens every segment.
            credited: (0..segments.len()).map(|seg| (seg, 0)).collect(),
            segments,
            score_vector: Vec::new(),
            score: 0,
            phase: Phase::Seeded,
        };
        state.score_vector = state.count_targets(targets, main_word, discount);
        state.score = state.score_vector.iter().sum();
        log::debug!("seeded '{}' (score {}): {}", main_word, state.score, state.sentence());

        let budget = iterations.min(self.settings.max_iterations);
        if budget < iterations {
            log::warn!("iteration budget {} clamped to {}", iterations, budget);
        }

        let mut scores = Vec::with_capacity(budget);
        for i in 0..budget {
            state.phase = Phase::Iterating(i);
            let current = state.count_targets(targets, main_word, discount);
            let improved = current
                .iter()
                .zip(&state.score_vector)
                .position(|(new, old)| new > old);

            match improved {
                Some(t) => {
                    if let Some(seg) = state.credit(&targets[t]) {
                        state.segments[seg].covered = true;
                        log::debug!("iteration {}: '{}' credited in segment {}", i, targets[t], seg);
                        for other in 0..state.segments.len() {
                            if other == seg || state.segments[other].covered {
                                continue;
                            }
                            let s = &state.segments[other];
                            let text = self.fresh(s.frame, s.new_tokens, main_word, rng)?;
                            state.segments[other].text = text;
                        }
                    }
                }
                None => {
                    for seg in 0..state.segments.len() {
                        if state.segments[seg].covered {
                            continue;
                        }
                        let (frame, n) = (state.segments[seg].frame, state.segments[seg].new_tokens);
                        let text = match seg.checked_sub(1).map(|p| &state.segments[p]) {
                            Some(prev) if prev.covered => {
                                self.chained(&prev.text, frame, n, main_word, rng)?
                            }
                            _ => self.fresh(frame, n, main_word, rng)?,
                        };
                        state.segments[seg].text = text;
                    }
                }
            }

            state.score_vector = current;
            state.score = state.score_vector.iter().sum();
            scores.push(state.score);
        }

        state.phase = Phase::Done;
        let sentence = state.sentence();
        log::info!("description for '{}' after {} iterations: {}", main_word, budget, sentence);
        Ok(Refinement {
            sentence,
            scores,
            state,
        })
    }
}

/// Words the description should try to contain: the card's taboo words, the
/// main word, and its synonyms, hypernyms and hyponyms. Antonyms are left out.
/// Only words the generator can produce are kept.
pub fn target_vocabulary<G: SequenceGenerator + ?Sized>(
    card: &Card,
    profile: &RelationProfile,
    generator: &G,
) -> Vec<String> {
    let words: BTreeSet<String> = card
        .taboo_words
        .iter()
        .chain(std::iter::once(&card.main_word))
        .chain(&profile.synonyms)
        .chain(&profile.hypernyms)
        .chain(&profile.hyponyms)
        .map(|w| w.to_lowercase())
        .filter(|w| generator.knows(w))
        .collect();
    words.into_iter().collect()
}

/// Hides the answer: every literal occurrence of the main word becomes the
/// placeholder, and each taboo word present as a token is swapped for a random
/// synonym (left as is when it has none).
pub fn clean<L, R>(sentence: &str, card: &Card, lexicon: &L, placeholder: &str, rng: &mut R) -> String
where
    L: LexicalDatabase + ?Sized,
    R: Rng,
{
    let replaced = sentence.replace(&card.main_word, placeholder);
    let mut tokens: Vec<String> = replaced.split_whitespace().map(str::to_string).collect();

    for taboo in &card.taboo_words {
        if !tokens.iter().any(|t| t == taboo) {
            continue;
        }
        let choice = synonyms(lexicon, taboo)
            .into_iter()
            .filter(|s| !s.contains(&card.main_word))
            .choose(rng);
        if let Some(synonym) = choice {
            log::debug!("replacing taboo word '{}' with '{}'", taboo, synonym);
            for t in tokens.iter_mut().filter(|t| *t == taboo) {
                *t = synonym.clone();
            }
        }
    }
    tokens.join(" ")
}
