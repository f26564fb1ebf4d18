//! Column name translation between flattened join rows and entity mappers.

use crate::error::{CatalogError, Result};

/// Maps physical result-set column names to the local names a mapper reads.
///
/// A joined query labels each column with its table alias (`b.id`, `g.name`);
/// the mapper for one entity only wants to see `id` and `name`.
pub trait ColumnNameTranslator: Send + Sync {
    /// Whether `raw` belongs to the entity this translator serves
    fn accepts(&self, raw: &str) -> bool;

    /// Strip the physical column name down to its local name.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Translation` when `raw` is not accepted or the
    /// local part is empty.
    fn translate(&self, raw: &str) -> Result<String>;

    /// Inverse of [`translate`](ColumnNameTranslator::translate)
    fn qualify(&self, local: &str) -> String;
}

/// Cuts a fixed prefix such as `"b."` from column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixCutTranslator {
    prefix: String,
}

impl PrefixCutTranslator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Translator for columns of a table aliased as `alias` (`"g"` → `"g."`)
    pub fn for_alias(alias: &str) -> Self {
        Self::new(format!("{}.", alias))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl ColumnNameTranslator for PrefixCutTranslator {
    fn accepts(&self, raw: &str) -> bool {
        raw.len() > self.prefix.len() && raw.starts_with(&self.prefix)
    }

    fn translate(&self, raw: &str) -> Result<String> {
        match raw.strip_prefix(&self.prefix) {
            Some(local) if !local.is_empty() => Ok(local.to_string()),
            _ => Err(CatalogError::Translation {
                column: raw.to_string(),
                prefix: self.prefix.clone(),
            }),
        }
    }

    fn qualify(&self, local: &str) -> String {
        format!("{}{}", self.prefix, local)
    }
}

/// Passes unqualified column names through, for single-table queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityTranslator;

impl ColumnNameTranslator for IdentityTranslator {
    fn accepts(&self, raw: &str) -> bool {
        !raw.is_empty() && !raw.contains('.')
    }

    fn translate(&self, raw: &str) -> Result<String> {
        if self.accepts(raw) {
            Ok(raw.to_string())
        } else {
            Err(CatalogError::Translation {
                column: raw.to_string(),
                prefix: String::new(),
            })
        }
    }

    fn qualify(&self, local: &str) -> String {
        local.to_string()
    }
}
