use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{stdin, stdout, Write};
use std::path::{Path, PathBuf};
use taboo_core::config::Settings;
use taboo_core::display::{render_card, NO_CARD_MESSAGE};
use taboo_core::persistence::{load_ngram_model, load_vector_table, save_to_disk};
use taboo_core::{DataPaths, TabooEngine, TabooError};

#[derive(Parser, Debug)]
#[command(name = "taboo", version, about = "Taboo card and description generator")]
struct Cli {
    /// WordNet synsets (JSON)
    #[arg(long, default_value = "data/wordnet.json")]
    wordnet: PathBuf,

    /// Word embeddings: word2vec text, or a .bin checkpoint
    #[arg(long, default_value = "data/vectors.txt")]
    embeddings: PathBuf,

    /// Generator corpus, one sentence per line, or a .bin checkpoint
    #[arg(long, default_value = "data/corpus.txt")]
    corpus: PathBuf,

    /// Annotated gold-standard CSV
    #[arg(long, default_value = "data/gold_standard.csv")]
    gold: PathBuf,

    /// JSON file overriding the default settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a card for each word
    Card {
        #[arg(required = true)]
        words: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Generate a description of a word that avoids its taboo words
    Describe {
        word: String,
        #[arg(long)]
        seeds: Option<usize>,
        #[arg(long)]
        iterations: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Read words from stdin and print a card for each; `exit` quits
    Interactive,
    /// Write bincode checkpoints of the embeddings and the generator
    Checkpoint {
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,
    },
}

type Engine = TabooEngine<taboo_core::lexical::WordNetStore, taboo_core::embedding::VectorTable, taboo_core::core::context::NgramModel>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger_builder = env_logger::Builder::from_default_env();
    logger_builder.filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn));
    logger_builder.init();

    let mut settings = match &cli.settings {
        Some(path) => Settings::from_json_file(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?,
        None => Settings::default(),
    };

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match &cli.command {
        Command::Checkpoint { out_dir } => write_checkpoints(&cli, out_dir)?,
        Command::Card { words, json } => {
            let engine = load_engine(&cli, settings)?;
            for word in words {
                print_card(&engine, word, *json, &mut rng)?;
            }
        }
        Command::Describe {
            word,
            seeds,
            iterations,
            json,
        } => {
            if let Some(seeds) = seeds {
                settings.refiner.seeds = *seeds;
            }
            if let Some(iterations) = iterations {
                settings.refiner.iterations = *iterations;
            }
            let engine = load_engine(&cli, settings)?;
            let refiner = &engine.settings().refiner;
            match engine.describe(word, refiner.seeds, refiner.iterations, &mut rng) {
                Ok(description) if *json => println!("{}", serde_json::to_string_pretty(&description)?),
                Ok(description) => {
                    println!("{}", render_card(&description.card));
                    println!("\n{}", description.cleaned.bold());
                }
                Err(TabooError::NotInVocabulary(_)) => println!("{}", NO_CARD_MESSAGE.yellow()),
                Err(e) => return Err(e).context("Failed to describe word"),
            }
        }
        Command::Interactive => {
            let engine = load_engine(&cli, settings)?;
            interactive(&engine, &mut rng)?;
        }
    }
    Ok(())
}

fn load_engine(cli: &Cli, settings: Settings) -> Result<Engine> {
    let paths = DataPaths {
        wordnet: cli.wordnet.clone(),
        embeddings: cli.embeddings.clone(),
        corpus: cli.corpus.clone(),
        gold: cli.gold.clone(),
    };
    let engine = TabooEngine::from_paths(&paths, settings).context("Failed to load the taboo engine")?;
    info!("Configuration: {:?}", engine.settings());
    Ok(engine)
}

fn print_card(engine: &Engine, word: &str, json: bool, rng: &mut StdRng) -> Result<()> {
    match engine.draw_card(word, rng) {
        Ok(card) if json => println!("{}", serde_json::to_string(&card)?),
        Ok(card) => println!("{}", render_card(&card)),
        Err(_) if json => println!("{}", serde_json::json!({ "main_word": word, "error": NO_CARD_MESSAGE })),
        Err(_) => println!("{}", NO_CARD_MESSAGE.yellow()),
    }
    Ok(())
}

fn interactive(engine: &Engine, rng: &mut StdRng) -> Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    println!("{}", "Taboo card generator. Type a word, or 'exit' to quit.".bold().cyan());
    println!("---------------------------------------------------------------");

    loop {
        print!("\n> ");
        out.flush()?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        match input.trim() {
            "exit" => break,
            "" => continue,
            word => print_card(engine, word, false, rng)?,
        }
    }
    Ok(())
}

fn write_checkpoints(cli: &Cli, out_dir: &Path) -> Result<()> {
    let embeddings = load_vector_table(&cli.embeddings)
        .with_context(|| format!("Failed to load embeddings from {:?}", cli.embeddings))?;
    let target = out_dir.join("vectors.bin");
    save_to_disk(&embeddings, &target).with_context(|| format!("Failed to write {:?}", target))?;
    println!("Embeddings saved to {:?}", target);

    let generator = load_ngram_model(&cli.corpus)
        .with_context(|| format!("Failed to load corpus from {:?}", cli.corpus))?;
    let target = out_dir.join("ngram.bin");
    save_to_disk(&generator, &target).with_context(|| format!("Failed to write {:?}", target))?;
    println!("Generator saved to {:?}", target);
    Ok(())
}
