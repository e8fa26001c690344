use crate::error::GateResult;
use crate::value::Row;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column/index metadata query against `information_schema`.
///
/// Yields one row per (column, index membership) pair; columns with no index
/// appear once with NULL index fields. Binds `(schema, table)` as `ss`.
pub const CATALOG_SQL: &str = "SELECT \
`COLUMNS`.`COLUMN_NAME`, \
`COLUMNS`.`DATA_TYPE`, \
`COLUMNS`.`COLUMN_TYPE`, \
`COLUMNS`.`COLUMN_DEFAULT`, \
`COLUMNS`.`COLUMN_KEY`, \
`COLUMNS`.`EXTRA`, \
`COLUMNS`.`IS_NULLABLE`, \
`COLUMNS`.`CHARACTER_MAXIMUM_LENGTH`, \
`COLUMNS`.`NUMERIC_PRECISION`, \
`COLUMNS`.`NUMERIC_SCALE`, \
`STATISTICS`.`INDEX_NAME`, \
`STATISTICS`.`SEQ_IN_INDEX`, \
`STATISTICS`.`NON_UNIQUE` \
FROM `information_schema`.`COLUMNS` \
LEFT JOIN `information_schema`.`STATISTICS` ON \
`STATISTICS`.`TABLE_SCHEMA` = `COLUMNS`.`TABLE_SCHEMA` AND \
`STATISTICS`.`TABLE_NAME` = `COLUMNS`.`TABLE_NAME` AND \
`STATISTICS`.`COLUMN_NAME` = `COLUMNS`.`COLUMN_NAME` \
WHERE `COLUMNS`.`TABLE_SCHEMA` = ? AND `COLUMNS`.`TABLE_NAME` = ? \
ORDER BY `COLUMNS`.`ORDINAL_POSITION`, `STATISTICS`.`INDEX_NAME`, `STATISTICS`.`SEQ_IN_INDEX`";

/// Parameter types for [`CATALOG_SQL`].
pub const CATALOG_PARAM_TYPES: &str = "ss";

/// One raw catalog row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub column_name: String,
    pub data_type: String,
    pub column_type: String,
    pub column_default: Option<String>,
    pub column_key: Option<String>,
    pub extra: Option<String>,
    pub is_nullable: bool,
    pub character_maximum_length: Option<u64>,
    pub numeric_precision: Option<u32>,
    pub numeric_scale: Option<u32>,
    pub index_name: Option<String>,
    pub seq_in_index: Option<u32>,
    pub non_unique: Option<bool>,
}

impl CatalogRow {
    /// Decode a row returned by [`CATALOG_SQL`].
    pub fn from_row(row: &Row) -> GateResult<Self> {
        Ok(Self {
            column_name: row.try_get_column("COLUMN_NAME")?,
            data_type: row.try_get_column("DATA_TYPE")?,
            column_type: row
                .try_get_column::<Option<String>>("COLUMN_TYPE")?
                .unwrap_or_default(),
            column_default: row.try_get_column("COLUMN_DEFAULT")?,
            column_key: row
                .try_get_column::<Option<String>>("COLUMN_KEY")?
                .filter(|k| !k.is_empty()),
            extra: row
                .try_get_column::<Option<String>>("EXTRA")?
                .filter(|e| !e.is_empty()),
            is_nullable: row
                .try_get_column::<Option<bool>>("IS_NULLABLE")?
                .unwrap_or(true),
            character_maximum_length: row.try_get_column("CHARACTER_MAXIMUM_LENGTH")?,
            numeric_precision: row.try_get_column("NUMERIC_PRECISION")?,
            numeric_scale: row.try_get_column("NUMERIC_SCALE")?,
            index_name: row.try_get_column("INDEX_NAME")?,
            seq_in_index: row.try_get_column("SEQ_IN_INDEX")?,
            non_unique: row.try_get_column("NON_UNIQUE")?,
        })
    }

    /// Encode back into a row shaped like a [`CATALOG_SQL`] result.
    pub fn to_row(&self) -> Row {
        Row::new()
            .with("COLUMN_NAME", self.column_name.as_str())
            .with("DATA_TYPE", self.data_type.as_str())
            .with("COLUMN_TYPE", self.column_type.as_str())
            .with("COLUMN_DEFAULT", self.column_default.clone())
            .with("COLUMN_KEY", self.column_key.clone())
            .with("EXTRA", self.extra.clone())
            .with("IS_NULLABLE", if self.is_nullable { "YES" } else { "NO" })
            .with("CHARACTER_MAXIMUM_LENGTH", self.character_maximum_length)
            .with("NUMERIC_PRECISION", self.numeric_precision)
            .with("NUMERIC_SCALE", self.numeric_scale)
            .with("INDEX_NAME", self.index_name.clone())
            .with("SEQ_IN_INDEX", self.seq_in_index)
            .with("NON_UNIQUE", self.non_unique.map(u8::from))
    }
}

/// What the schema cache stores under `schema.table.column_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub rows: Vec<CatalogRow>,
}

pub(crate) fn decode_rows(rows: &[Row]) -> GateResult<Vec<CatalogRow>> {
    rows.iter().map(CatalogRow::from_row).collect()
}
