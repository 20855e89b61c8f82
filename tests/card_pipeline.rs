use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeSet, HashSet};
use std::io::Write;
use taboo_core::collocates::CollocateSearch;
use taboo_core::core::composer::CardComposer;
use taboo_core::config::Settings;
use taboo_core::core::context::{NgramModel, SequenceGenerator};
use taboo_core::core::sampler::reconcile;
use taboo_core::core::types::{CategoryCounts, CARD_SIZE};
use taboo_core::display::{render_outcome, NO_CARD_MESSAGE};
use taboo_core::embedding::{EmbeddingModel, VectorTable};
use taboo_core::gold::GoldStandard;
use taboo_core::lexical::{relations, WordNetStore};
use taboo_core::{Category, TabooEngine, TabooError};

const WORDNET: &str = r#"{
  "synsets": {
    "victory.n.01": { "lemmas": ["victory", "triumph"], "hypernyms": ["success.n.01"], "hyponyms": ["romp.n.01"] },
    "triumph.n.01": { "lemmas": ["triumph", "victory"] },
    "success.n.01": { "lemmas": ["winning", "success"] },
    "romp.n.01": { "lemmas": ["romp", "blowout"] }
  }
}"#;

const GOLD: &str = "\
mw,tw,semrel_synonym,semrel_antonym,semrel_hypernym,semrel_hyponym,collocation,cultural_ref,other
victory,triumph,1,,,,,,
victory,defeat,,1,,,,,
victory,success,,,1,,,,
victory,romp,,,,1,,,
victory,medal,,,,,1,,
victory,trophy,,,,,1,,
victory,olympics,,,,,,1,
";

fn lexicon() -> WordNetStore {
    WordNetStore::from_json_str(WORDNET).unwrap()
}

fn victory_embeddings() -> VectorTable {
    let mut table = VectorTable::new();
    table.insert("victory", vec![1.0, 0.0, 0.0]);
    let neighbours = [
        "champion", "medal", "podium", "trophy", "parade", "celebration", "winner", "tournament",
        "crowd", "cheering", "conquest", "battle",
    ];
    for (i, w) in neighbours.iter().enumerate() {
        table.insert(*w, vec![1.0, 0.05 * (i + 1) as f32, 0.01]);
    }
    table
}

fn engine() -> TabooEngine<WordNetStore, VectorTable, NgramModel> {
    let mut gold_file = tempfile::NamedTempFile::new().unwrap();
    gold_file.write_all(GOLD.as_bytes()).unwrap();
    let distribution = GoldStandard::from_csv_path(gold_file.path())
        .unwrap()
        .distribution()
        .unwrap();
    let generator = NgramModel::from_sentences([
        "victory means winning the final battle",
        "victory is a triumph celebrated with a parade",
        "victory can be found on the podium with a medal",
        "the champion lifted the trophy before the crowd",
    ]);
    TabooEngine::new(lexicon(), victory_embeddings(), generator, distribution, Settings::default())
}

#[test]
fn victory_reconciliation_moves_deficit_to_collocation() {
    let profile = relations(&lexicon(), "victory");
    let drawn: CategoryCounts = [
        (Category::Synonym, 2),
        (Category::Antonym, 1),
        (Category::Hypernym, 1),
        (Category::Hyponym, 1),
    ]
    .into_iter()
    .collect();

    let counts = reconcile(drawn, &profile);
    assert_eq!(counts.get(Category::Synonym), 1);
    assert_eq!(counts.get(Category::Antonym), 0);
    assert_eq!(counts.get(Category::Hypernym), 1);
    assert_eq!(counts.get(Category::Hyponym), 1);
    assert_eq!(counts.get(Category::Collocation), 2);
}

#[test]
fn victory_card_holds_every_relation_and_two_collocates() {
    let lexicon = lexicon();
    let embeddings = victory_embeddings();
    let search = CollocateSearch::default();
    let composer = CardComposer::new(&lexicon, &embeddings, &search);
    let relation_words = ["triumph", "winning", "romp"];

    for seed in 0..10 {
        let drawn: CategoryCounts = [
            (Category::Synonym, 2),
            (Category::Antonym, 1),
            (Category::Hypernym, 1),
            (Category::Hyponym, 1),
        ]
        .into_iter()
        .collect();
        let card = composer
            .compose_with_counts("victory", drawn, &mut StdRng::seed_from_u64(seed))
            .unwrap();

        assert_eq!(card.taboo_words.len(), CARD_SIZE);
        for word in relation_words {
            assert!(card.taboo_words.iter().any(|w| w == word), "{} missing: {:?}", word, card.taboo_words);
        }
        let collocates: Vec<&String> = card
            .taboo_words
            .iter()
            .filter(|w| !relation_words.contains(&w.as_str()))
            .collect();
        assert_eq!(collocates.len(), 2);
        assert!(collocates.iter().all(|w| embeddings.contains(w) && !w.contains("victory")));
    }
}

#[test]
fn victory_cards_are_full_and_never_leak_the_main_word() {
    let engine = engine();
    let relation_words: BTreeSet<&str> = ["triumph", "winning", "romp"].into_iter().collect();

    for seed in 0..25 {
        let card = engine
            .draw_card("victory", &mut StdRng::seed_from_u64(seed))
            .unwrap();
        assert_eq!(card.taboo_words.len(), CARD_SIZE, "seed {}", seed);

        let unique: BTreeSet<&str> = card.taboo_words.iter().map(String::as_str).collect();
        assert_eq!(unique.len(), CARD_SIZE, "duplicate on seed {}: {:?}", seed, card.taboo_words);
        assert!(card.taboo_words.iter().all(|w| !w.contains("victory")));

        // No antonyms exist, so at most the three relation words appear.
        let relational = unique.intersection(&relation_words).count();
        assert!(relational <= 3);
    }
}

#[test]
fn xyzzy_gets_the_apology() {
    let engine = engine();
    let outcome = engine.draw_card("xyzzy", &mut StdRng::seed_from_u64(0));
    assert!(outcome.is_err());
    assert_eq!(render_outcome(&outcome), NO_CARD_MESSAGE);
}

#[test]
fn cat_collocates_are_spelled_apart() {
    let mut model = VectorTable::new();
    model.insert("cat", vec![1.0, 0.0]);
    let neighbours = [
        "cats", "catnip", "kitten", "dog", "whiskers", "mouse", "purring", "feline", "pet",
        "litter_box", "tabby", "meow",
    ];
    for (i, w) in neighbours.iter().enumerate() {
        model.insert(*w, vec![1.0, 0.02 * (i + 1) as f32]);
    }

    let search = CollocateSearch::default();
    let found = search
        .collocates("cat", &HashSet::new(), &model, &WordNetStore::new(), 5)
        .unwrap();

    let expected: BTreeSet<String> = ["feline", "kitten", "mouse", "purring", "whiskers"]
        .iter()
        .map(|w| w.to_string())
        .collect();
    assert_eq!(found, expected);
}

#[test]
fn victory_description_hides_the_answer() {
    let engine = engine();
    let description = engine
        .describe("victory", 3, 30, &mut StdRng::seed_from_u64(12))
        .unwrap();

    assert_eq!(description.scores.len(), 30);
    assert!(description.raw.starts_with("victory means"));
    assert!(description.raw.contains("victory can be found"));
    assert!(!description.cleaned.contains("victory"));
    assert!(description.cleaned.contains("The main word"));
    for target in &description.targets {
        assert!(engine.generator.knows(target));
    }
}

#[test]
fn description_needs_a_card() {
    let engine = engine();
    let result = engine.describe("xyzzy", 2, 5, &mut StdRng::seed_from_u64(0));
    assert!(matches!(result, Err(TabooError::NotInVocabulary(_))));
}
