// src/parse/column_map.rs
use std::ops::Range;

use crate::error::{ParseError, Result};

/// Inclusive column range a category covers in the header rows.
/// `end` stays `None` for the last category until the subcategory row is seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpan {
    pub start: usize,
    pub end: Option<usize>,
}

impl ColumnSpan {
    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    /// Number of columns covered, once closed.
    pub fn width(&self) -> Option<usize> {
        self.end.map(|end| end + 1 - self.start)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcategoryColumn {
    pub name: String,
    pub column: usize,
}

/// One category and the subcategory → column assignments inside its span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryColumns {
    pub name: String,
    pub span: ColumnSpan,
    pub subcategories: Vec<SubcategoryColumn>,
}

impl CategoryColumns {
    fn open(name: &str, start: usize) -> Self {
        Self {
            name: name.to_string(),
            span: ColumnSpan { start, end: None },
            subcategories: Vec::new(),
        }
    }

    pub fn column(&self, subcategory: &str) -> Option<usize> {
        self.subcategories
            .iter()
            .find(|s| s.name == subcategory)
            .map(|s| s.column)
    }

    // A label seen twice keeps its first slot and points at the later column.
    fn assign(&mut self, label: &str, column: usize) {
        match self.subcategories.iter_mut().find(|s| s.name == label) {
            Some(existing) => existing.column = column,
            None => self.subcategories.push(SubcategoryColumn {
                name: label.to_string(),
                column,
            }),
        }
    }
}

/// Resolves dstat's two header rows into (category, subcategory) → column index.
///
/// Built in two steps: [`ColumnMap::set_categories`] with the first header row, then
/// [`ColumnMap::set_subcategories`] with the second. Calls out of that order are errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    categories: Vec<CategoryColumns>,
    categories_set: bool,
    /// Width of the subcategory row, set once it has been decoded.
    width: Option<usize>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the category row. Every non-empty cell opens a new span and closes the
    /// previous one at the column before it. The last span is left open.
    pub fn set_categories<S: AsRef<str>>(&mut self, row: &[S]) -> Result<()> {
        if self.categories_set {
            return Err(ParseError::CategoriesAlreadySet);
        }

        let mut categories: Vec<CategoryColumns> = Vec::new();
        for (col, cell) in row.iter().enumerate() {
            let name = cell.as_ref();
            if name.is_empty() {
                continue;
            }
            if categories.iter().any(|c| c.name == name) {
                return Err(ParseError::DuplicateCategory(name.to_string()));
            }
            if let Some(prev) = categories.last_mut() {
                prev.span.end = Some(col - 1);
            }
            categories.push(CategoryColumns::open(name, col));
        }

        self.categories = categories;
        self.categories_set = true;
        Ok(())
    }

    /// Decode the subcategory row. Closes the last category at `row.len() - 1`, then
    /// records `row[col]` for every column of every span. Empty labels are kept as `""`.
    pub fn set_subcategories<S: AsRef<str>>(&mut self, row: &[S]) -> Result<()> {
        if !self.categories_set || self.categories.is_empty() {
            return Err(ParseError::MappingsNotInitialized);
        }
        if self.width.is_some() {
            return Err(ParseError::SubcategoriesAlreadySet);
        }

        let width = row.len();
        // spans are ordered, so the last one is the only one that can overrun the row
        if let Some(last) = self.categories.last() {
            if last.span.start >= width {
                return Err(ParseError::HeaderWidthMismatch {
                    category: last.name.clone(),
                    start: last.span.start,
                    width,
                });
            }
        }
        let last_col = width - 1;
        if let Some(last) = self.categories.last_mut() {
            last.span.end = Some(last_col);
        }

        for category in &mut self.categories {
            let start = category.span.start;
            let end = category.span.end.unwrap_or(last_col);
            for col in start..=end {
                category.assign(row[col].as_ref(), col);
            }
        }

        self.width = Some(width);
        Ok(())
    }

    /// Both header rows have been decoded.
    pub fn is_complete(&self) -> bool {
        self.width.is_some()
    }

    pub fn width(&self) -> Option<usize> {
        self.width
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn category(&self, name: &str) -> Option<&CategoryColumns> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryColumns> {
        self.categories.iter()
    }

    pub fn span(&self, category: &str) -> Option<ColumnSpan> {
        self.category(category).map(|c| c.span)
    }

    pub fn subcategories(&self, category: &str) -> Option<&[SubcategoryColumn]> {
        self.category(category).map(|c| c.subcategories.as_slice())
    }

    pub fn column(&self, category: &str, subcategory: &str) -> Option<usize> {
        self.category(category)?.column(subcategory)
    }

    /// Columns left of the first category. No category claims them; dstat layouts that
    /// start the category row with an empty cell leave column 0 here.
    pub fn unmapped_columns(&self) -> Range<usize> {
        match self.categories.first() {
            Some(first) => 0..first.span.start,
            None => 0..0,
        }
    }

    /// Highest column index any subcategory reads from.
    pub fn max_column(&self) -> Option<usize> {
        self.categories
            .iter()
            .flat_map(|c| c.subcategories.iter().map(|s| s.column))
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn sparse_category_row_partitions_columns() -> Result<()> {
        let mut map = ColumnMap::new();
        map.set_categories(&["", "cat1", "", "cat2", ""])?;
        map.set_subcategories(&["a", "b", "c", "d", "e"])?;

        assert_eq!(map.categories().collect::<Vec<_>>(), vec!["cat1", "cat2"]);
        assert_eq!(map.column("cat1", "b"), Some(1));
        assert_eq!(map.column("cat1", "c"), Some(2));
        assert_eq!(map.column("cat2", "d"), Some(3));
        assert_eq!(map.column("cat2", "e"), Some(4));
        assert_eq!(map.column("cat1", "a"), None);
        assert_eq!(map.unmapped_columns(), 0..1);
        assert_eq!(map.width(), Some(5));
        Ok(())
    }

    #[test]
    fn last_span_closes_only_after_subcategory_row() -> Result<()> {
        let mut map = ColumnMap::new();
        map.set_categories(&["first", "", "second"])?;

        assert_eq!(
            map.span("first"),
            Some(ColumnSpan {
                start: 0,
                end: Some(1)
            })
        );
        let second = map.span("second").expect("second category");
        assert_eq!(second.start, 2);
        assert!(!second.is_closed());
        assert!(!map.is_complete());

        // subcategory row is wider than the category row
        map.set_subcategories(&["a", "b", "c", "d", "e"])?;
        let second = map.span("second").expect("second category");
        assert_eq!(second.end, Some(4));
        assert_eq!(second.width(), Some(3));
        assert!(map.is_complete());
        Ok(())
    }

    #[test]
    fn categories_are_declared_before_subcategories() -> Result<()> {
        let mut map = ColumnMap::new();
        map.set_categories(&["cpu", "", "mem"])?;
        assert_eq!(map.subcategories("cpu").map(|s| s.len()), Some(0));
        assert_eq!(map.subcategories("mem").map(|s| s.len()), Some(0));
        assert!(map.subcategories("net").is_none());
        Ok(())
    }

    #[test]
    fn subcategories_before_categories_is_rejected() {
        let mut map = ColumnMap::new();
        let err = map.set_subcategories(&["usr", "sys"]).unwrap_err();
        assert!(matches!(err, ParseError::MappingsNotInitialized));
    }

    #[test]
    fn all_empty_category_row_leaves_mappings_uninitialized() -> Result<()> {
        let mut map = ColumnMap::new();
        map.set_categories(&["", "", ""])?;
        let err = map.set_subcategories(&["a", "b", "c"]).unwrap_err();
        assert!(matches!(err, ParseError::MappingsNotInitialized));
        Ok(())
    }

    #[test]
    fn headers_cannot_be_decoded_twice() -> Result<()> {
        let mut map = ColumnMap::new();
        map.set_categories(&["cpu"])?;
        assert!(matches!(
            map.set_categories(&["mem"]).unwrap_err(),
            ParseError::CategoriesAlreadySet
        ));
        map.set_subcategories(&["usr"])?;
        assert!(matches!(
            map.set_subcategories(&["usr"]).unwrap_err(),
            ParseError::SubcategoriesAlreadySet
        ));
        Ok(())
    }

    #[test]
    fn duplicate_category_names_are_rejected() {
        let mut map = ColumnMap::new();
        let err = map
            .set_categories(&["system", "cpu", "", "system", ""])
            .unwrap_err();
        assert!(matches!(err, ParseError::DuplicateCategory(name) if name == "system"));
    }

    #[test]
    fn narrow_subcategory_row_is_a_width_mismatch() -> Result<()> {
        let mut map = ColumnMap::new();
        map.set_categories(&["cpu", "", "", "mem"])?;
        let err = map.set_subcategories(&["usr", "sys", "idl"]).unwrap_err();
        match err {
            ParseError::HeaderWidthMismatch {
                category,
                start,
                width,
            } => {
                assert_eq!(category, "mem");
                assert_eq!(start, 3);
                assert_eq!(width, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }

    #[test]
    fn single_column_category_keeps_empty_label() -> Result<()> {
        let mut map = ColumnMap::new();
        map.set_categories(&["load", "", "", "procs"])?;
        map.set_subcategories(&["1m", "5m", "15m", ""])?;

        let procs = map.subcategories("procs").expect("procs category");
        assert_eq!(procs.len(), 1);
        assert_eq!(procs[0].name, "");
        assert_eq!(procs[0].column, 3);
        assert_eq!(map.column("procs", ""), Some(3));
        Ok(())
    }

    #[test]
    fn labels_are_scoped_per_category() -> Result<()> {
        let mut map = ColumnMap::new();
        map.set_categories(&["dsk/sda", "", "dsk/sdb", ""])?;
        map.set_subcategories(&["read", "writ", "read", "writ"])?;
        assert_eq!(map.column("dsk/sda", "read"), Some(0));
        assert_eq!(map.column("dsk/sdb", "read"), Some(2));
        assert_eq!(map.column("dsk/sdb", "writ"), Some(3));
        Ok(())
    }

    #[test]
    fn repeated_label_inside_a_category_points_at_last_column() -> Result<()> {
        let mut map = ColumnMap::new();
        map.set_categories(&["odd", "", ""])?;
        map.set_subcategories(&["x", "y", "x"])?;
        let subs = map.subcategories("odd").expect("odd category");
        let names: Vec<_> = subs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(map.column("odd", "x"), Some(2));
        Ok(())
    }

    #[test]
    fn column_space_is_partitioned_without_gaps() -> Result<()> {
        let categories = [
            "system", "total cpu usage", "", "", "", "", "", "dsk/total", "", "net/total", "",
        ];
        let subcategories = [
            "time", "usr", "sys", "idl", "wai", "hiq", "siq", "read", "writ", "recv", "send",
        ];
        let mut map = ColumnMap::new();
        map.set_categories(&categories)?;
        map.set_subcategories(&subcategories)?;

        let non_empty = categories.iter().filter(|c| !c.is_empty()).count();
        assert_eq!(map.categories().count(), non_empty);

        let mut columns: Vec<usize> = map
            .iter()
            .flat_map(|c| c.subcategories.iter().map(|s| s.column))
            .collect();
        columns.sort_unstable();
        assert_eq!(columns, (0..subcategories.len()).collect::<Vec<_>>());
        assert_eq!(map.max_column(), Some(subcategories.len() - 1));
        Ok(())
    }
}
