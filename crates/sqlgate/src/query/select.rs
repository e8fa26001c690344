//! SELECT query builder.

use super::{BuiltQuery, QueryCore, QueryKind, SqlQuery, push_clause};
use crate::clause::{JoinFlags, JoinOn, Limit, OrderSpec, WhereEntry, WhereSpec};
use crate::error::GateResult;
use crate::name::format_name_list;
use crate::value::Value;

/// SELECT query builder.
///
/// Renders `SELECT cols FROM table [JOIN] [WHERE] [ORDER BY] [LIMIT]`.
#[derive(Clone, Debug, Default)]
pub struct SelectQuery {
    core: QueryCore,
    /// SELECT columns (default `*`)
    columns: Vec<String>,
}

impl SelectQuery {
    /// Builder with no table yet; set it with [`from`](Self::from).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the FROM table, optionally aliased (`"users u"`).
    pub fn from(mut self, table: &str) -> Self {
        self.core.set_table(table);
        self
    }

    // ==================== SELECT columns ====================

    /// Replace the SELECT columns. Each entry is a name expression.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Append one SELECT column.
    pub fn column(mut self, column: &str) -> Self {
        self.columns.push(column.to_string());
        self
    }

    // ==================== JOIN ====================

    /// Add a join with explicit type flags.
    pub fn join(mut self, table: &str, on: impl Into<JoinOn>, flags: impl Into<JoinFlags>) -> Self {
        self.core.add_join(table, on.into(), flags.into());
        self
    }

    /// Add `LEFT JOIN`.
    pub fn left_join(self, table: &str, on: impl Into<JoinOn>) -> Self {
        self.join(table, on, JoinFlags::left())
    }

    /// Add `INNER JOIN`.
    pub fn inner_join(self, table: &str, on: impl Into<JoinOn>) -> Self {
        self.join(table, on, JoinFlags::inner())
    }

    // ==================== WHERE ====================

    /// Append conditions. Requires the table to be set first.
    pub fn filter(mut self, spec: impl Into<WhereSpec>) -> Self {
        self.core.add_where(spec.into());
        self
    }

    /// Append a named equality condition.
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.core
            .add_where_entry(WhereEntry::Eq(column.to_string(), value.into()));
        self
    }

    // ==================== ORDER / LIMIT ====================

    /// Append `column direction` to ORDER BY.
    pub fn order_by(mut self, column: &str, direction: &str) -> Self {
        self.core.add_order(OrderSpec::new().by(column, direction));
        self
    }

    /// Append sort terms.
    pub fn order(mut self, spec: impl Into<OrderSpec>) -> Self {
        self.core.add_order(spec.into());
        self
    }

    /// Set LIMIT: a count, or `(offset, count)`.
    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.core.set_limit(limit.into());
        self
    }

    /// Clear the table, columns, conditions, joins, ordering and limit.
    pub fn reset(mut self) -> Self {
        self.core.reset();
        self.columns.clear();
        self
    }
}

impl SqlQuery for SelectQuery {
    fn build(&self) -> GateResult<BuiltQuery> {
        self.validate()?;

        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            format_name_list(&self.columns)
        };
        let mut sql = format!("SELECT {} FROM {}", columns, self.core.table_sql()?);
        push_clause(&mut sql, &self.core.joins_sql());
        let conditions = self.core.append_tail(&mut sql, None)?;

        self.core
            .built(QueryKind::Select, sql, Vec::new(), conditions)
    }

    fn validate(&self) -> GateResult<()> {
        self.core.validate()
    }
}
