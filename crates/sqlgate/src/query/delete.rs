//! DELETE query builder.

use super::{BuiltQuery, QueryCore, QueryKind, SqlQuery};
use crate::clause::{Limit, OrderSpec, WhereEntry, WhereSpec};
use crate::error::GateResult;
use crate::value::Value;

/// DELETE query builder.
///
/// Renders `DELETE FROM table WHERE … [ORDER BY] [LIMIT]`.
/// A WHERE clause is mandatory.
#[derive(Clone, Debug, Default)]
pub struct DeleteQuery {
    core: QueryCore,
}

impl DeleteQuery {
    /// Builder with no table yet; set it with [`from`](Self::from).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, table: &str) -> Self {
        self.core.set_table(table);
        self
    }

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

    pub fn order(mut self, spec: impl Into<OrderSpec>) -> Self {
        self.core.add_order(spec.into());
        self
    }

    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.core.set_limit(limit.into());
        self
    }

    /// Clear the table, conditions, ordering and limit.
    pub fn reset(mut self) -> Self {
        self.core.reset();
        self
    }
}

impl SqlQuery for DeleteQuery {
    fn build(&self) -> GateResult<BuiltQuery> {
        self.validate()?;
        let mut sql = format!("DELETE FROM {}", self.core.table_sql()?);
        let conditions = self.core.append_tail(&mut sql, Some(QueryKind::Delete))?;
        self.core
            .built(QueryKind::Delete, sql, Vec::new(), conditions)
    }

    fn validate(&self) -> GateResult<()> {
        self.core.validate()
    }
}
