//! UPDATE query builder.

use super::{BuiltQuery, QueryCore, QueryKind, SqlQuery};
use crate::clause::{Limit, OrderSpec, PreparedColumn, WhereEntry, WhereSpec};
use crate::error::{GateError, GateResult};
use crate::name::NameExpression;
use crate::value::{Record, Value};

/// UPDATE query builder.
///
/// Renders `UPDATE table SET col = ?, … WHERE … [ORDER BY] [LIMIT]`.
/// A WHERE clause is mandatory.
#[derive(Clone, Debug, Default)]
pub struct UpdateQuery {
    core: QueryCore,
    set: Record,
}

impl UpdateQuery {
    /// Builder with no table yet; set it with [`table`](Self::table).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: &str) -> Self {
        self.core.set_table(table);
        self
    }

    /// Set one column.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.set.insert(column, value);
        self
    }

    /// Set every entry of `record`.
    pub fn set_all(mut self, record: &Record) -> Self {
        for (column, value) in record.iter() {
            self.set.insert(column, value.clone());
        }
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

    /// Clear the table, SET columns, conditions, ordering and limit.
    pub fn reset(mut self) -> Self {
        self.core.reset();
        self.set = Record::new();
        self
    }
}

impl SqlQuery for UpdateQuery {
    fn build(&self) -> GateResult<BuiltQuery> {
        self.validate()?;
        let table = self.core.table_sql()?;
        if self.set.is_empty() {
            return Err(GateError::Other("UPDATE requires at least one column".to_string()));
        }

        let mut assignments = Vec::with_capacity(self.set.len());
        let mut values = Vec::with_capacity(self.set.len());
        for (column, value) in self.set.iter() {
            let expr = NameExpression::parse(column);
            let Some(name) = expr.first().cloned() else {
                return Err(GateError::malformed(format!("empty SET column {column:?}")));
            };
            assignments.push(format!("{expr} = ?"));
            values.push(PreparedColumn::new(name, value.clone()));
        }

        let mut sql = format!("UPDATE {table} SET {}", assignments.join(", "));
        let conditions = self.core.append_tail(&mut sql, Some(QueryKind::Update))?;

        self.core.built(QueryKind::Update, sql, values, conditions)
    }

    fn validate(&self) -> GateResult<()> {
        self.core.validate()
    }
}
