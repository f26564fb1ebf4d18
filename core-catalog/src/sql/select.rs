use serde::{Deserialize, Serialize};
use tracing::trace;

use super::schema::TableSchema;
use crate::error::{CatalogError, Result};

/// How filter placeholders are spelled in the generated SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamStyle {
    /// `:field`
    #[default]
    Named,
    /// `?1`, `?2`, ... in filter field order; what the SQLite adapter binds
    Numbered,
}

impl ParamStyle {
    fn placeholder(&self, index: usize, field: &str) -> String {
        match self {
            ParamStyle::Named => format!(":{}", field),
            ParamStyle::Numbered => format!("?{}", index + 1),
        }
    }
}

#[derive(Debug, Clone)]
struct Projection {
    alias: String,
    columns: Vec<String>,
}

/// Builds a `SELECT` over one primary table, its joins and an equality filter.
///
/// Every configuration call consumes the builder and returns it, and
/// [`build`](SelectQueryBuilder::build) consumes it for good, so a builder is
/// configured once and rendered once.
///
/// Selected columns are labelled with their alias (`b.id AS "b.id"`), which
/// is the shape the row mappers expect.
///
/// ```ignore
/// let sql = SelectQueryBuilder::new(&BOOKS)
///     .use_alias("b")
///     .join(BOOK_GENRES_JOIN)
///     .project("g", &["id", "name"])
///     .use_filter_fields(["isbn"])
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct SelectQueryBuilder {
    schema: &'static TableSchema,
    alias: Option<String>,
    joins: Vec<String>,
    projections: Vec<Projection>,
    filter_fields: Vec<String>,
    order_by: Option<String>,
    limit: Option<u64>,
    param_style: ParamStyle,
}

impl SelectQueryBuilder {
    pub fn new(schema: &'static TableSchema) -> Self {
        Self {
            schema,
            alias: None,
            joins: Vec::new(),
            projections: Vec::new(),
            filter_fields: Vec::new(),
            order_by: None,
            limit: None,
            param_style: ParamStyle::default(),
        }
    }

    /// Alias of the primary table; required
    pub fn use_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Append a literal join clause. Joins render in call order.
    pub fn join(mut self, clause: impl Into<String>) -> Self {
        self.joins.push(clause.into());
        self
    }

    /// Select `columns` of the joined table aliased as `alias`
    pub fn project(mut self, alias: impl Into<String>, columns: &[&str]) -> Self {
        self.projections.push(Projection {
            alias: alias.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    /// Fields compared for equality in the WHERE clause, AND-combined.
    ///
    /// Replaces any previously set fields. An empty set means no WHERE clause.
    pub fn use_filter_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Order results by a column of the primary table
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    /// Cap the number of primary rows.
    ///
    /// The primary table is limited in a sub-select before the joins apply,
    /// so every joined row of a selected primary row is still returned.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn param_style(mut self, style: ParamStyle) -> Self {
        self.param_style = style;
        self
    }

    /// Render the query.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Configuration` if the alias is missing, a filter
    /// or order field is not known for the table, a filter field repeats, or
    /// a projection reuses the primary alias.
    pub fn build(self) -> Result<String> {
        let alias = self.validated_alias()?;
        self.validate_filters()?;
        self.validate_projections(alias)?;
        if let Some(column) = &self.order_by {
            if !self.schema.has_column(column) {
                return Err(CatalogError::Configuration(format!(
                    "unknown order column '{}' for table {}",
                    column, self.schema.name
                )));
            }
        }

        let mut sql = String::from("SELECT ");
        sql.push_str(&self.select_list(alias).join(", "));
        sql.push_str(" FROM ");

        let where_clause = self.where_clause(alias);
        match self.limit {
            Some(limit) => {
                // Limit the primary table alone so its joined rows stay complete.
                sql.push('(');
                sql.push_str(&format!("SELECT * FROM {} {}", self.schema.name, alias));
                if let Some(clause) = &where_clause {
                    sql.push_str(" WHERE ");
                    sql.push_str(clause);
                }
                let order = self.order_by.as_deref().unwrap_or(self.schema.primary_key);
                sql.push_str(&format!(" ORDER BY {}.{} LIMIT {}) {}", alias, order, limit, alias));
                for join in &self.joins {
                    sql.push(' ');
                    sql.push_str(join);
                }
            }
            None => {
                sql.push_str(&format!("{} {}", self.schema.name, alias));
                for join in &self.joins {
                    sql.push(' ');
                    sql.push_str(join);
                }
                if let Some(clause) = &where_clause {
                    sql.push_str(" WHERE ");
                    sql.push_str(clause);
                }
            }
        }

        if let Some(column) = &self.order_by {
            sql.push_str(&format!(" ORDER BY {}.{}", alias, column));
        }

        trace!(table = self.schema.name, sql = %sql, "Built select query");
        Ok(sql)
    }

    fn validated_alias(&self) -> Result<&str> {
        let alias = self
            .alias
            .as_deref()
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
            .ok_or_else(|| {
                CatalogError::Configuration(format!(
                    "no alias set for table {}",
                    self.schema.name
                ))
            })?;

        if !is_identifier(alias) {
            return Err(CatalogError::Configuration(format!(
                "invalid table alias '{}'",
                alias
            )));
        }
        Ok(alias)
    }

    fn validate_filters(&self) -> Result<()> {
        for (index, field) in self.filter_fields.iter().enumerate() {
            if !self.schema.is_filterable(field) {
                return Err(CatalogError::Configuration(format!(
                    "unknown filter field '{}' for table {}",
                    field, self.schema.name
                )));
            }
            if self.filter_fields[..index].contains(field) {
                return Err(CatalogError::Configuration(format!(
                    "duplicate filter field '{}'",
                    field
                )));
            }
        }
        Ok(())
    }

    fn validate_projections(&self, alias: &str) -> Result<()> {
        for projection in &self.projections {
            if projection.alias == alias {
                return Err(CatalogError::Configuration(format!(
                    "projection alias '{}' is the primary table alias",
                    projection.alias
                )));
            }
            if !is_identifier(&projection.alias) {
                return Err(CatalogError::Configuration(format!(
                    "invalid projection alias '{}'",
                    projection.alias
                )));
            }
        }
        Ok(())
    }

    fn select_list(&self, alias: &str) -> Vec<String> {
        let primary = self
            .schema
            .columns
            .iter()
            .map(|column| labelled(alias, column));
        let projected = self.projections.iter().flat_map(|projection| {
            projection
                .columns
                .iter()
                .map(|column| labelled(&projection.alias, column))
        });
        primary.chain(projected).collect()
    }

    fn where_clause(&self, alias: &str) -> Option<String> {
        if self.filter_fields.is_empty() {
            return None;
        }

        let predicates: Vec<String> = self
            .filter_fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let placeholder = self.param_style.placeholder(index, field);
                match self.schema.link(field) {
                    Some(link) => format!(
                        "{}.{} IN (SELECT {} FROM {} WHERE {} = {})",
                        alias,
                        self.schema.primary_key,
                        link.owner_column,
                        link.table,
                        link.target_column,
                        placeholder
                    ),
                    None => format!("{}.{} = {}", alias, field, placeholder),
                }
            })
            .collect();

        Some(predicates.join(" AND "))
    }
}

fn labelled(alias: &str, column: &str) -> String {
    format!("{alias}.{column} AS \"{alias}.{column}\"")
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
