//! Reads dstat's CSV output into an in-memory table keyed by the two header rows:
//! category → subcategory → values.
pub mod config;
pub mod error;
pub mod parse;
pub mod plot;

pub use config::ParserConfig;
pub use error::ParseError;
pub use parse::{parse_reader, read_csv, ColumnMap, ResultTable};
