//! Execution context: connection, schema cache and configuration.

use crate::client::{Cache, Connection, Statement};
use crate::error::{GateError, GateResult};
use crate::gateway::Gateway;
use crate::name::format_sql;
use crate::query::QueryKind;
use crate::schema::SchemaCache;
use crate::value::{Row, Value, guess_param_type};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable holding the database name.
pub const ENV_SCHEMA: &str = "SQLGATE_SCHEMA";
/// Environment variable holding the schema cache TTL in seconds.
pub const ENV_SCHEMA_TTL: &str = "SQLGATE_SCHEMA_TTL_SECS";

/// Configuration for [`Db`].
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database name used for catalog lookups and cache keys.
    pub schema: String,
    /// Lifetime of cached table metadata. Zero means never expire.
    pub schema_ttl: Duration,
    /// Also remove spaces around commas in executed SQL.
    pub compact_sql: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            schema: String::new(),
            schema_ttl: Duration::from_secs(3600),
            compact_sql: false,
        }
    }
}

impl DbConfig {
    /// Create a new configuration with defaults (one hour schema TTL).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the database name.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Set the schema cache TTL.
    pub fn with_schema_ttl(mut self, ttl: Duration) -> Self {
        self.schema_ttl = ttl;
        self
    }

    /// Enable or disable compact SQL.
    pub fn compact_sql(mut self, enabled: bool) -> Self {
        self.compact_sql = enabled;
        self
    }

    /// Read `SQLGATE_SCHEMA` and `SQLGATE_SCHEMA_TTL_SECS`.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> GateResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> GateResult<Self> {
        let mut config = Self::default();
        if let Some(schema) = lookup(ENV_SCHEMA) {
            config.schema = schema;
        }
        if let Some(raw) = lookup(ENV_SCHEMA_TTL) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                GateError::Other(format!("{ENV_SCHEMA_TTL} must be a number of seconds, got {raw:?}"))
            })?;
            config.schema_ttl = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// Everything a statement needs at execution time.
///
/// Cheap to clone; the connection and cache are shared.
#[derive(Clone)]
pub struct Db {
    conn: Arc<dyn Connection>,
    schemas: SchemaCache,
    config: DbConfig,
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("schemas", &self.schemas)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Db {
    pub fn new(conn: Arc<dyn Connection>, cache: Arc<dyn Cache>, config: DbConfig) -> Self {
        let schemas = SchemaCache::new(
            Arc::clone(&conn),
            cache,
            config.schema.clone(),
            config.schema_ttl,
        );
        Self {
            conn,
            schemas,
            config,
        }
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.conn
    }

    pub fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// CRUD helper bound to `table`.
    pub fn gateway(&self, table: &str) -> Gateway<'_> {
        Gateway::new(self, table)
    }

    /// Execute raw SQL.
    ///
    /// An empty `types` string is filled in with [`guess_param_type`] per parameter.
    pub async fn execute(&self, sql: &str, params: &[Value], types: &str) -> GateResult<Statement> {
        let types = resolve_types(params, types);
        self.conn.execute(sql, params, &types).await
    }

    /// Execute raw SQL and return every row.
    pub async fn fetch_all_assoc(
        &self,
        sql: &str,
        params: &[Value],
        types: &str,
    ) -> GateResult<Vec<Row>> {
        let types = resolve_types(params, types);
        self.conn.fetch_all_assoc(sql, params, &types).await
    }

    pub(crate) async fn run(
        &self,
        kind: QueryKind,
        sql: &str,
        params: &[Value],
        types: &str,
    ) -> GateResult<Statement> {
        let sql = if self.config.compact_sql {
            format_sql(sql, true)
        } else {
            sql.to_string()
        };
        tracing::debug!(
            target: "sqlgate.sql",
            kind = %kind,
            param_count = params.len(),
            types,
            sql = %sql,
            "executing statement"
        );
        self.conn.execute(&sql, params, types).await
    }
}

fn resolve_types(params: &[Value], types: &str) -> String {
    if types.is_empty() {
        params.iter().map(|v| guess_param_type(v).as_char()).collect()
    } else {
        types.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn config_builder() {
        let config = DbConfig::new()
            .with_schema("shop")
            .with_schema_ttl(Duration::ZERO)
            .compact_sql(true);
        assert_eq!(config.schema, "shop");
        assert!(config.schema_ttl.is_zero());
        assert!(config.compact_sql);
    }

    #[test]
    fn config_from_lookup() {
        let vars: HashMap<&str, &str> =
            HashMap::from([(ENV_SCHEMA, "shop"), (ENV_SCHEMA_TTL, " 120 ")]);
        let config = DbConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.schema, "shop");
        assert_eq!(config.schema_ttl, Duration::from_secs(120));

        let config = DbConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.schema_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn missing_types_are_guessed() {
        let params = [Value::from(1), Value::from("x"), Value::from(1.5)];
        assert_eq!(resolve_types(&params, ""), "isf");
        assert_eq!(resolve_types(&params, "sss"), "sss");
    }

    #[test]
    fn config_rejects_bad_ttl() {
        let err = DbConfig::from_lookup(|k| (k == ENV_SCHEMA_TTL).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, GateError::Other(msg) if msg.contains(ENV_SCHEMA_TTL)));
    }
}
