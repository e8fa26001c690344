use super::catalog::CatalogRow;
use super::column::{Column, DataType, IndexMembership};
use crate::error::{GateError, GateResult};
use crate::value::{Record, Value, WireType};
use chrono::{DateTime, Utc};

/// Index name the store reserves for the primary key.
pub const PRIMARY_INDEX: &str = "PRIMARY";

/// An index of one table with its columns in sequence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub unique: bool,
    pub columns: Vec<String>,
}

/// Column and index metadata for one table.
#[derive(Debug, Clone)]
pub struct TableSchema {
    schema: String,
    table: String,
    columns: Vec<Column>,
    indexes: Vec<Index>,
    fetched_at: DateTime<Utc>,
}

/// A primary key argument: either a single scalar or a set of named columns.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyInput {
    Scalar(Value),
    Columns(Record),
}

impl From<Record> for KeyInput {
    fn from(record: Record) -> Self {
        KeyInput::Columns(record)
    }
}

impl From<&Record> for KeyInput {
    fn from(record: &Record) -> Self {
        KeyInput::Columns(record.clone())
    }
}

impl From<Value> for KeyInput {
    fn from(value: Value) -> Self {
        KeyInput::Scalar(value)
    }
}

macro_rules! key_input_scalar {
    ($($t:ty),*) => {$(
        impl From<$t> for KeyInput {
            fn from(v: $t) -> Self {
                KeyInput::Scalar(Value::from(v))
            }
        }
    )*};
}

key_input_scalar!(i32, i64, u32, u64, &str, String);

impl TableSchema {
    /// Build from raw catalog rows (one per column/index membership).
    pub fn from_rows(
        schema: impl Into<String>,
        table: impl Into<String>,
        rows: &[CatalogRow],
        fetched_at: DateTime<Utc>,
    ) -> GateResult<Self> {
        let schema = schema.into();
        let table = table.into();
        if rows.is_empty() {
            return Err(GateError::TableNotFound { schema, table });
        }

        let mut columns: Vec<Column> = Vec::new();
        let mut indexes: Vec<(Index, Vec<(u32, String)>)> = Vec::new();

        for row in rows {
            let pos = match columns.iter().position(|c| c.name == row.column_name) {
                Some(pos) => pos,
                None => {
                    columns.push(column_from_row(&schema, &table, row));
                    columns.len() - 1
                }
            };

            let Some(index_name) = row.index_name.as_deref().filter(|n| !n.is_empty()) else {
                continue;
            };
            let seq = row.seq_in_index.unwrap_or(1);
            let unique = !row.non_unique.unwrap_or(true);

            let column = &mut columns[pos];
            if column.index(index_name).is_none() {
                column.indexes.push(IndexMembership {
                    index_name: index_name.to_string(),
                    seq,
                    unique,
                });
            }

            match indexes.iter_mut().find(|(i, _)| i.name == index_name) {
                Some((_, members)) => members.push((seq, row.column_name.clone())),
                None => indexes.push((
                    Index {
                        name: index_name.to_string(),
                        unique,
                        columns: Vec::new(),
                    },
                    vec![(seq, row.column_name.clone())],
                )),
            }
        }

        let indexes = indexes
            .into_iter()
            .map(|(mut index, mut members)| {
                members.sort_by_key(|(seq, _)| *seq);
                members.dedup_by(|a, b| a.1 == b.1);
                index.columns = members.into_iter().map(|(_, name)| name).collect();
                index
            })
            .collect();

        Ok(Self {
            schema,
            table,
            columns,
            indexes,
            fetched_at,
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Columns in catalog order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Look up a column, failing with [`GateError::ColumnNotFound`].
    pub fn require_column(&self, name: &str) -> GateResult<&Column> {
        self.column(name).ok_or_else(|| GateError::ColumnNotFound {
            schema: self.schema.clone(),
            table: self.table.clone(),
            column: name.to_string(),
        })
    }

    /// Indexes in the order the catalog first reported them.
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Key columns: `PRIMARY`, else the first unique index, else the first index.
    ///
    /// Empty when the table has no index at all.
    pub fn primary_key_columns(&self) -> &[String] {
        self.index(PRIMARY_INDEX)
            .or_else(|| self.indexes.iter().find(|i| i.unique))
            .or_else(|| self.indexes.first())
            .map(|i| i.columns.as_slice())
            .unwrap_or(&[])
    }

    /// Bind a key argument to the key columns.
    ///
    /// A scalar goes to the first key column. Every other key column is taken
    /// from the key record, then from `fallback`, and is NULL when absent from both.
    pub fn extract_primary_key(&self, key: &KeyInput, fallback: &Record) -> Record {
        let mut out = Record::new();
        for (i, name) in self.primary_key_columns().iter().enumerate() {
            let from_key = match key {
                KeyInput::Scalar(v) if i == 0 => Some(v),
                KeyInput::Scalar(_) => None,
                KeyInput::Columns(record) => record.get(name).filter(|v| !v.is_null()),
            };
            let value = from_key
                .or_else(|| fallback.get(name).filter(|v| !v.is_null()))
                .cloned()
                .unwrap_or(Value::Null);
            out.insert(name.clone(), value);
        }
        out
    }

    /// Whether `key` binds a non-null value to every key column.
    pub fn has_complete_primary_key(&self, key: &KeyInput) -> bool {
        let pk = self.primary_key_columns();
        if pk.is_empty() {
            return false;
        }
        match key {
            KeyInput::Scalar(v) => pk.len() == 1 && !v.is_null(),
            KeyInput::Columns(record) => pk
                .iter()
                .all(|name| record.get(name).is_some_and(|v| !v.is_null())),
        }
    }

    /// Names of columns that must be given a value on insert.
    pub fn required_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_required())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Entries of `record` whose column belongs to any index.
    pub fn extract_index_columns(&self, record: &Record) -> Record {
        record
            .iter()
            .filter(|(name, _)| self.column(name).is_some_and(|c| !c.indexes.is_empty()))
            .map(|(name, value)| (name, value.clone()))
            .collect()
    }

    /// Validate every entry of `record`, stopping at the first failure.
    ///
    /// Checks this snapshot only: an unknown column fails without a refresh.
    /// [`SchemaCache::test_row`](super::SchemaCache::test_row) retries once.
    pub fn test_row(&self, record: &Record) -> GateResult<()> {
        for (name, value) in record.iter() {
            let column = self.require_column(name)?;
            column
                .test_value(value)
                .map_err(|reason| GateError::validation(name, reason, value.text()))?;
        }
        Ok(())
    }

    /// Wire type string for the entries of `record`, from this snapshot only.
    pub fn param_types(&self, record: &Record) -> GateResult<String> {
        record
            .iter()
            .map(|(name, value)| {
                self.require_column(name)
                    .map(|c| c.param_type(value).as_char())
            })
            .collect()
    }

    /// Wire type of one value bound to `column`, from this snapshot only.
    pub fn param_type(&self, column: &str, value: &Value) -> GateResult<WireType> {
        Ok(self.require_column(column)?.param_type(value))
    }
}

fn column_from_row(schema: &str, table: &str, row: &CatalogRow) -> Column {
    Column {
        schema: schema.to_string(),
        table: table.to_string(),
        name: row.column_name.clone(),
        data_type: DataType::parse(&row.data_type),
        column_type: row.column_type.clone(),
        nullable: row.is_nullable,
        max_length: row.character_maximum_length,
        numeric_precision: row.numeric_precision,
        numeric_scale: row.numeric_scale,
        default_value: row.column_default.clone(),
        column_key: row.column_key.clone(),
        extra: row.extra.clone(),
        indexes: Vec::new(),
    }
}
