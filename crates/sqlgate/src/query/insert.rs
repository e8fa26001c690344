//! INSERT query builder.

use super::{BuiltQuery, QueryCore, QueryKind, SqlQuery};
use crate::clause::{PreparedColumn, placeholders};
use crate::error::{GateError, GateResult};
use crate::name::{NameRef, format_name};
use crate::value::{Record, Value};

/// How duplicates are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertMode {
    /// Plain `INSERT INTO`.
    #[default]
    Default,
    /// `INSERT IGNORE INTO`.
    Ignore,
    /// `INSERT … ON DUPLICATE KEY UPDATE` every declared column.
    Upsert,
}

/// INSERT query builder.
///
/// Declare the columns once, then call [`values`](Self::values) per row.
#[derive(Clone, Debug, Default)]
pub struct InsertQuery {
    core: QueryCore,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    mode: InsertMode,
}

impl InsertQuery {
    /// Builder with no table yet; set it with [`into_table`](Self::into_table).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the INTO table.
    pub fn into_table(mut self, table: &str) -> Self {
        self.core.set_table(table);
        self
    }

    /// Declare the inserted columns.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Declare the inserted columns from the keys of `record`.
    pub fn columns_from(mut self, record: &Record) -> Self {
        self.columns = record.keys().map(str::to_string).collect();
        self
    }

    /// Add one row.
    ///
    /// Each declared column is taken from `record` by name; missing columns are
    /// NULL. With no declared columns the record's keys are declared. Use
    /// [`row`](Self::row) for positional values.
    pub fn values(mut self, record: &Record) -> Self {
        if self.columns.is_empty() {
            self.columns = record.keys().map(str::to_string).collect();
        }
        let row = self
            .columns
            .iter()
            .map(|name| record.get(name).cloned().unwrap_or(Value::Null))
            .collect();
        self.rows.push(row);
        self
    }

    /// Add one row by position; missing trailing values are NULL.
    pub fn row<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut row: Vec<Value> = values.into_iter().map(Into::into).collect();
        row.resize(self.columns.len().max(row.len()), Value::Null);
        self.rows.push(row);
        self
    }

    pub fn mode(mut self, mode: InsertMode) -> Self {
        self.mode = mode;
        self
    }

    /// `INSERT IGNORE`.
    pub fn ignore(self) -> Self {
        self.mode(InsertMode::Ignore)
    }

    /// `ON DUPLICATE KEY UPDATE` every declared column.
    pub fn upsert(self) -> Self {
        self.mode(InsertMode::Upsert)
    }

    /// Number of rows added so far.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Clear the table, columns, rows and mode.
    pub fn reset(mut self) -> Self {
        self.core.reset();
        self.columns.clear();
        self.rows.clear();
        self.mode = InsertMode::Default;
        self
    }
}

impl SqlQuery for InsertQuery {
    fn build(&self) -> GateResult<BuiltQuery> {
        self.validate()?;
        let table = self.core.table_sql()?;
        if self.rows.is_empty() || self.columns.is_empty() {
            return Err(GateError::EmptyInsert);
        }

        let width = self.columns.len();
        let group = format!("({})", placeholders(width));
        let groups = vec![group.as_str(); self.rows.len()].join(", ");
        let columns: Vec<String> = self.columns.iter().map(|c| format_name(c)).collect();

        let verb = match self.mode {
            InsertMode::Ignore => "INSERT IGNORE INTO",
            InsertMode::Default | InsertMode::Upsert => "INSERT INTO",
        };
        let mut sql = format!("{verb} {table} ({}) VALUES {groups}", columns.join(", "));
        if self.mode == InsertMode::Upsert {
            let updates: Vec<String> = columns.iter().map(|c| format!("{c} = VALUES({c})")).collect();
            sql.push_str(" ON DUPLICATE KEY UPDATE ");
            sql.push_str(&updates.join(", "));
        }

        let mut values = Vec::with_capacity(width * self.rows.len());
        for row in &self.rows {
            for (i, name) in self.columns.iter().enumerate() {
                let value = row.get(i).cloned().unwrap_or(Value::Null);
                values.push(PreparedColumn::new(bare_column(name), value));
            }
        }

        self.core.built(QueryKind::Insert, sql, values, Vec::new())
    }

    fn validate(&self) -> GateResult<()> {
        self.core.validate()
    }
}

/// Insert targets are always columns of the main table.
fn bare_column(name: &str) -> NameRef {
    let column = name.rsplit('.').next().unwrap_or(name).replace('`', "");
    NameRef::new(None, column)
}
