// src/lib.rs

pub mod collocates;
pub mod config;
pub mod core;
pub mod display;
pub mod embedding;
pub mod error;
pub mod fuzzy;
pub mod gold;
pub mod lexical;
pub mod persistence;
pub mod refiner;

pub use crate::core::engine::{DataPaths, Description, TabooEngine};
pub use crate::core::types::{Card, Category, NotInVocabulary};
pub use crate::error::{Result, TabooError};
