// src/parse/mod.rs
use csv::{ByteRecord, ReaderBuilder};
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info, warn};

use crate::config::ParserConfig;
use crate::error::{ParseError, Result};

pub mod column_map;
pub mod table;

pub use column_map::{CategoryColumns, ColumnMap, ColumnSpan, SubcategoryColumn};
pub use table::{CategorySeries, ResultTable, Series};

/// Where the parser is in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Skipping banner rows until the first row that is not one.
    Ignoring,
    ReadingCategoryHeader,
    ReadingSubcategoryHeader,
    /// Terminal: every remaining row is data.
    ReadingData,
}

/// What a single row turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Metadata,
    CategoryHeader,
    SubcategoryHeader,
    Data,
}

/// Single-pass row classifier that builds the [`ColumnMap`] from the two header rows and
/// then fills a [`ResultTable`] with every data row.
pub struct DstatParser<'c> {
    config: &'c ParserConfig,
    state: ParseState,
    columns: ColumnMap,
    table: ResultTable,
}

impl<'c> DstatParser<'c> {
    pub fn new(config: &'c ParserConfig) -> Self {
        Self {
            config,
            state: ParseState::Ignoring,
            columns: ColumnMap::new(),
            table: ResultTable::default(),
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Decide what `record` is given the current state, without consuming it.
    pub fn classify(&self, record: &ByteRecord) -> RowKind {
        match self.state {
            ParseState::Ignoring if self.is_metadata(record) => RowKind::Metadata,
            ParseState::Ignoring | ParseState::ReadingCategoryHeader => RowKind::CategoryHeader,
            ParseState::ReadingSubcategoryHeader => RowKind::SubcategoryHeader,
            ParseState::ReadingData => RowKind::Data,
        }
    }

    /// Feed one record. `line` is the 1-based line the record starts on, used in logs and errors.
    pub fn feed_record(&mut self, line: u64, record: &ByteRecord) -> Result<RowKind> {
        let kind = self.classify(record);
        match kind {
            RowKind::Metadata => {
                debug!(line, "skipping metadata row");
            }
            RowKind::CategoryHeader => {
                if self.state == ParseState::Ignoring {
                    info!(line, "found headers starting at row {}", line);
                    self.state = ParseState::ReadingCategoryHeader;
                }
                let cells = text_cells(line, record)?;
                self.columns.set_categories(&cells)?;
                self.state = ParseState::ReadingSubcategoryHeader;
            }
            RowKind::SubcategoryHeader => {
                let cells = text_cells(line, record)?;
                self.columns.set_subcategories(&cells)?;
                self.table = ResultTable::allocate(&self.columns)?;
                self.state = ParseState::ReadingData;
                let unmapped = self.columns.unmapped_columns();
                if !unmapped.is_empty() {
                    debug!(?unmapped, "columns before the first category are not mapped");
                }
                info!(
                    categories = self.columns.categories().count(),
                    width = cells.len(),
                    "finished parsing headers"
                );
            }
            RowKind::Data => {
                let cells = text_cells(line, record)?;
                self.table.append_row(line, &cells)?;
            }
        }
        Ok(kind)
    }

    /// Hand back the table. A stream that ended before both header rows yields an empty table.
    pub fn finish(self) -> ResultTable {
        if self.state != ParseState::ReadingData {
            warn!(state = ?self.state, "input ended before the header rows were complete");
        }
        self.table
    }

    // Rows with no usable first cell count as metadata.
    fn is_metadata(&self, record: &ByteRecord) -> bool {
        match record.get(0).map(std::str::from_utf8) {
            Some(Ok(first)) => self.config.is_ignored(first),
            Some(Err(e)) => {
                debug!(error = %e, "first cell is not text; treating row as metadata");
                true
            }
            None => true,
        }
    }
}

fn text_cells(line: u64, record: &ByteRecord) -> Result<Vec<&str>> {
    record
        .iter()
        .enumerate()
        .map(|(column, field)| {
            std::str::from_utf8(field).map_err(|_| ParseError::InvalidUtf8 { row: line, column })
        })
        .collect()
}

/// Parse a dstat CSV file. The file handle is dropped on every return path.
#[tracing::instrument(level = "info", skip(path, config), fields(path = %path.as_ref().display()))]
pub fn read_csv<P: AsRef<Path>>(path: P, config: &ParserConfig) -> Result<ResultTable> {
    let file = File::open(&path).map_err(|source| ParseError::Open {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    let table = parse_reader(file, config)?;
    info!(
        categories = table.categories().count(),
        rows = table.row_count(),
        "parsed dstat output"
    );
    Ok(table)
}

/// Parse dstat CSV output from any reader.
pub fn parse_reader<R: Read>(reader: R, config: &ParserConfig) -> Result<ResultTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // banner rows and data rows have different field counts
        .from_reader(reader);

    let mut parser = DstatParser::new(config);
    let mut record = ByteRecord::new();
    while rdr.read_byte_record(&mut record)? {
        let line = record.position().map_or(0, |pos| pos.line());
        parser.feed_record(line, &record)?;
    }
    Ok(parser.finish())
}
