// src/parse/table.rs
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::column_map::ColumnMap;
use crate::error::{ParseError, Result};

/// Raw values of one (category, subcategory) pair, in row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub subcategory: String,
    /// Column the values were read from.
    pub column: usize,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySeries {
    pub name: String,
    pub series: Vec<Series>,
}

impl CategorySeries {
    pub fn get(&self, subcategory: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.subcategory == subcategory)
    }

    pub fn subcategories(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.subcategory.as_str())
    }
}

/// category → subcategory → values, in header order. Values are kept as the text
/// found in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    categories: Vec<CategorySeries>,
    rows: usize,
    /// Every data row must reach at least this column.
    required_width: usize,
}

impl ResultTable {
    /// Allocate one empty sequence per (category, subcategory) pair of a decoded map.
    pub fn allocate(columns: &ColumnMap) -> Result<Self> {
        if !columns.is_complete() {
            return Err(ParseError::MappingsNotInitialized);
        }

        let categories = columns
            .iter()
            .map(|category| CategorySeries {
                name: category.name.clone(),
                series: category
                    .subcategories
                    .iter()
                    .map(|sub| Series {
                        subcategory: sub.name.clone(),
                        column: sub.column,
                        values: Vec::new(),
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            categories,
            rows: 0,
            required_width: columns.max_column().map_or(0, |max| max + 1),
        })
    }

    /// Append one data row. The row is checked before anything is pushed, so a short
    /// row leaves every sequence untouched.
    pub fn append_row<S: AsRef<str>>(&mut self, line: u64, row: &[S]) -> Result<()> {
        if row.len() < self.required_width {
            return Err(ParseError::ShortRow {
                row: line,
                column: self.required_width - 1,
                width: row.len(),
            });
        }

        for category in &mut self.categories {
            for series in &mut category.series {
                series.values.push(row[series.column].as_ref().to_string());
            }
        }
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows appended.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// True once the header rows produced at least one category, regardless of data rows.
    pub fn has_categories(&self) -> bool {
        !self.categories.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn category(&self, name: &str) -> Option<&CategorySeries> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn subcategories(&self, category: &str) -> Option<impl Iterator<Item = &str>> {
        self.category(category).map(|c| c.subcategories())
    }

    pub fn series(&self, category: &str, subcategory: &str) -> Option<&Series> {
        self.category(category)?.get(subcategory)
    }

    pub fn get(&self, category: &str, subcategory: &str) -> Option<&[String]> {
        self.series(category, subcategory)
            .map(|s| s.values.as_slice())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategorySeries> {
        self.categories.iter()
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a CategorySeries;
    type IntoIter = std::slice::Iter<'a, CategorySeries>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Serialized as nested objects: {"category": {"subcategory": ["v", ...]}}
impl Serialize for ResultTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for category in &self.categories {
            map.serialize_entry(&category.name, category)?;
        }
        map.end()
    }
}

impl Serialize for CategorySeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.series.len()))?;
        for series in &self.series {
            map.serialize_entry(&series.subcategory, &series.values)?;
        }
        map.end()
    }
}
