use super::catalog::{CATALOG_PARAM_TYPES, CATALOG_SQL, CatalogSnapshot, decode_rows};
use super::column::Column;
use super::table::TableSchema;
use crate::client::{Cache, Connection};
use crate::error::{GateError, GateResult};
use crate::value::{Record, Value};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Per-table metadata memoized in the external cache.
///
/// Entries live under `"{schema}.{table}.column_data"` as a JSON
/// [`CatalogSnapshot`]. A zero TTL means entries never expire.
///
/// Concurrent misses on the same table each fetch and overwrite the entry.
#[derive(Clone)]
pub struct SchemaCache {
    conn: Arc<dyn Connection>,
    cache: Arc<dyn Cache>,
    schema: String,
    ttl: Duration,
}

impl std::fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCache")
            .field("schema", &self.schema)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SchemaCache {
    pub fn new(
        conn: Arc<dyn Connection>,
        cache: Arc<dyn Cache>,
        schema: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            conn,
            cache,
            schema: schema.into(),
            ttl,
        }
    }

    /// Database name used for catalog lookups.
    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn cache_key(&self, table: &str) -> String {
        format!("{}.{}.column_data", self.schema, table)
    }

    /// Metadata for `table`, from the cache or freshly fetched.
    pub async fn get(&self, table: &str) -> GateResult<Arc<TableSchema>> {
        let key = self.cache_key(table);

        if let Some(raw) = self.cache.get(&key).await? {
            match serde_json::from_str::<CatalogSnapshot>(&raw) {
                Ok(snapshot) => {
                    tracing::debug!(target: "sqlgate.schema", table, "schema cache hit");
                    return self.build(table, snapshot);
                }
                Err(e) => {
                    tracing::warn!(
                        target: "sqlgate.schema",
                        table,
                        error = %e,
                        "discarding unreadable schema cache entry"
                    );
                }
            }
        }

        let snapshot = self.fetch(table).await?;
        let raw = serde_json::to_string(&snapshot)?;
        self.cache.set(&key, raw, self.ttl).await?;
        self.build(table, snapshot)
    }

    /// Evict `table` and fetch it again.
    pub async fn reload(&self, table: &str) -> GateResult<Arc<TableSchema>> {
        self.cache.delete(&self.cache_key(table)).await?;
        tracing::info!(target: "sqlgate.schema", table, "schema cache evicted");
        self.get(table).await
    }

    /// Evict and re-fetch `table`, reporting whether `column` now exists.
    pub async fn refresh(&self, table: &str, column: &str) -> GateResult<bool> {
        Ok(self.reload(table).await?.has_column(column))
    }

    /// Column metadata, with one forced refresh before giving up.
    pub async fn column(&self, table: &str, name: &str) -> GateResult<Column> {
        SchemaLookup::new(self).column(table, name).await
    }

    /// Validate every entry of `record` against `table`, stopping at the first
    /// failure. Unknown columns get the same single refresh as [`column`](Self::column).
    pub async fn test_row(&self, table: &str, record: &Record) -> GateResult<()> {
        SchemaLookup::new(self).test_row(table, record).await
    }

    /// Like [`column`](Self::column) but never fails.
    pub async fn column_exists(&self, table: &str, name: &str) -> bool {
        self.column(table, name).await.is_ok()
    }

    async fn fetch(&self, table: &str) -> GateResult<CatalogSnapshot> {
        tracing::debug!(target: "sqlgate.schema", schema = %self.schema, table, "fetching catalog");

        let params = [
            Value::Text(self.schema.clone()),
            Value::Text(table.to_string()),
        ];
        let rows = self
            .conn
            .fetch_all_assoc(CATALOG_SQL, &params, CATALOG_PARAM_TYPES)
            .await?;
        if rows.is_empty() {
            return Err(GateError::TableNotFound {
                schema: self.schema.clone(),
                table: table.to_string(),
            });
        }

        Ok(CatalogSnapshot {
            fetched_at: Utc::now(),
            rows: decode_rows(&rows)?,
        })
    }

    fn build(&self, table: &str, snapshot: CatalogSnapshot) -> GateResult<Arc<TableSchema>> {
        TableSchema::from_rows(&self.schema, table, &snapshot.rows, snapshot.fetched_at).map(Arc::new)
    }
}

/// Tables loaded while building or binding one statement.
///
/// Each table is fetched from the [`SchemaCache`] at most once, except for the
/// single forced refresh when a column is missing.
#[derive(Debug)]
pub struct SchemaLookup<'a> {
    cache: &'a SchemaCache,
    loaded: HashMap<String, Arc<TableSchema>>,
}

impl<'a> SchemaLookup<'a> {
    pub fn new(cache: &'a SchemaCache) -> Self {
        Self {
            cache,
            loaded: HashMap::new(),
        }
    }

    pub async fn table(&mut self, table: &str) -> GateResult<Arc<TableSchema>> {
        if let Some(schema) = self.loaded.get(table) {
            return Ok(Arc::clone(schema));
        }
        let schema = self.cache.get(table).await?;
        self.loaded.insert(table.to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Resolve a column, refreshing the table once if it is unknown.
    pub async fn column(&mut self, table: &str, name: &str) -> GateResult<Column> {
        let schema = self.table(table).await?;
        if let Some(column) = schema.column(name) {
            return Ok(column.clone());
        }

        tracing::info!(
            target: "sqlgate.schema",
            table,
            column = name,
            "unknown column, refreshing schema"
        );
        let schema = self.cache.reload(table).await?;
        self.loaded.insert(table.to_string(), Arc::clone(&schema));
        schema.require_column(name).cloned()
    }

    /// Validate `record` column by column; see [`SchemaCache::test_row`].
    pub async fn test_row(&mut self, table: &str, record: &Record) -> GateResult<()> {
        for (name, value) in record.iter() {
            let column = self.column(table, name).await?;
            column
                .test_value(value)
                .map_err(|reason| GateError::validation(name, reason, value.text()))?;
        }
        Ok(())
    }
}
