// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while turning a dstat CSV into a [`crate::ResultTable`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("category mappings not initialized; decode the category row before the subcategory row")]
    MappingsNotInitialized,

    #[error("category row has already been decoded")]
    CategoriesAlreadySet,

    #[error("subcategory row has already been decoded")]
    SubcategoriesAlreadySet,

    #[error("category {0:?} appears more than once in the category row")]
    DuplicateCategory(String),

    #[error(
        "subcategory row has {width} columns but category {category:?} starts at column {start}"
    )]
    HeaderWidthMismatch {
        category: String,
        start: usize,
        width: usize,
    },

    #[error("data row at line {row} has {width} columns, column {column} is required")]
    ShortRow { row: u64, column: usize, width: usize },

    #[error("row at line {row} is not valid UTF-8 (column {column})")]
    InvalidUtf8 { row: u64, column: usize },

    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid parser config: {0}")]
    Config(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ParseError>;
