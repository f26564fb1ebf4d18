use bridge_traits::database::{QueryRow, QueryValue};
use std::collections::HashMap;

use super::translator::ColumnNameTranslator;
use crate::error::{CatalogError, Result};

/// One entity's slice of a flattened row, keyed by local column names.
///
/// Only the columns the translator accepts are visible; `b.id` is read as
/// `id` through a view built for alias `b`. Errors name the physical column
/// and the row index so a failing query can be traced back to its result set.
pub struct RowView<'r> {
    columns: HashMap<String, &'r QueryValue>,
    row_index: usize,
    translator: &'r dyn ColumnNameTranslator,
}

impl<'r> RowView<'r> {
    pub fn new(
        row: &'r QueryRow,
        row_index: usize,
        translator: &'r dyn ColumnNameTranslator,
    ) -> Result<Self> {
        let mut columns = HashMap::new();
        for (raw, value) in row.iter().filter(|(raw, _)| translator.accepts(raw)) {
            columns.insert(translator.translate(raw)?, value);
        }

        Ok(Self {
            columns,
            row_index,
            translator,
        })
    }

    pub fn row_index(&self) -> usize {
        self.row_index
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Raw value of a local column
    pub fn value(&self, column: &str) -> Result<&'r QueryValue> {
        self.columns
            .get(column)
            .copied()
            .ok_or_else(|| self.error(column, "missing column in result set".to_string()))
    }

    pub fn i64(&self, column: &str) -> Result<i64> {
        self.optional_i64(column)?
            .ok_or_else(|| self.error(column, "unexpected NULL".to_string()))
    }

    /// Integer column that may be NULL. An absent column is still an error.
    pub fn optional_i64(&self, column: &str) -> Result<Option<i64>> {
        match self.value(column)? {
            QueryValue::Null => Ok(None),
            QueryValue::Integer(value) => Ok(Some(*value)),
            other => Err(self.mismatch(column, "integer", other)),
        }
    }

    pub fn string(&self, column: &str) -> Result<String> {
        self.optional_string(column)?
            .ok_or_else(|| self.error(column, "unexpected NULL".to_string()))
    }

    pub fn optional_string(&self, column: &str) -> Result<Option<String>> {
        match self.value(column)? {
            QueryValue::Null => Ok(None),
            QueryValue::Text(value) => Ok(Some(value.clone())),
            other => Err(self.mismatch(column, "text", other)),
        }
    }

    fn mismatch(&self, column: &str, expected: &str, found: &QueryValue) -> CatalogError {
        self.error(
            column,
            format!("expected {}, found {}", expected, found.type_name()),
        )
    }

    fn error(&self, column: &str, message: String) -> CatalogError {
        CatalogError::Mapping {
            column: self.translator.qualify(column),
            row: self.row_index,
            message,
        }
    }
}
