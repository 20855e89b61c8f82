// File: src/persistence.rs
//! Binary checkpoints of the loaded models, so large text resources only
//! need to be parsed once.

use crate::core::context::NgramModel;
use crate::embedding::VectorTable;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// File extension that marks a bincode checkpoint.
pub const CHECKPOINT_EXT: &str = "bin";

/// Writes `value` to `path` atomically: the data goes to a temporary file in
/// the same directory, which then replaces the target.
pub fn save_to_disk<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let parent_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    let mut writer = BufWriter::new(&temp_file);
    bincode::serialize_into(&mut writer, value)?;
    // Flush here, a drop-time flush error is lost.
    writer.flush()?;
    drop(writer);

    temp_file.persist(path).map_err(|e| e.error)?;
    log::info!("checkpoint written to {:?}", path);
    Ok(())
}

pub fn load_from_disk<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(reader)?)
}

fn is_checkpoint(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(CHECKPOINT_EXT)
}

/// Loads embeddings from a checkpoint or, for any other extension, from
/// word2vec text.
pub fn load_vector_table(path: &Path) -> Result<VectorTable> {
    if is_checkpoint(path) {
        let mut table: VectorTable = load_from_disk(path)?;
        table.reindex();
        Ok(table)
    } else {
        VectorTable::from_word2vec_text(path)
    }
}

/// Loads the generator from a checkpoint or, for any other extension, counts
/// it from a one-sentence-per-line corpus.
pub fn load_ngram_model(path: &Path) -> Result<NgramModel> {
    if is_checkpoint(path) {
        let mut model: NgramModel = load_from_disk(path)?;
        model.reindex();
        Ok(model)
    } else {
        NgramModel::from_corpus_file(path)
    }
}
