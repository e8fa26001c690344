//! Scripted connection shared by the integration tests.

#![allow(dead_code)]

use sqlgate::client::{Connection, MemoryCache, Statement};
use sqlgate::schema::{CATALOG_SQL, CatalogRow};
use sqlgate::{Db, DbConfig, GateResult, Row, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One statement the connection received.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub sql: String,
    pub params: Vec<Value>,
    pub types: String,
}

/// Answers catalog queries from in-memory table definitions and records every
/// other statement.
#[derive(Debug, Default)]
pub struct ScriptedConnection {
    tables: Mutex<HashMap<String, Vec<CatalogRow>>>,
    executed: Mutex<Vec<Executed>>,
    catalog_calls: AtomicUsize,
    rows: Mutex<Vec<Row>>,
    insert_id: Mutex<Option<u64>>,
    affected: Mutex<Option<u64>>,
}

impl ScriptedConnection {
    /// Connection knowing `users`, `orders` and `order_items`.
    pub fn new() -> Self {
        let conn = Self::default();
        conn.set_table("users", users());
        conn.set_table("orders", orders());
        conn.set_table("order_items", order_items());
        conn
    }

    pub fn set_table(&self, table: &str, rows: Vec<CatalogRow>) {
        self.tables.lock().unwrap().insert(table.to_string(), rows);
    }

    pub fn add_column(&self, table: &str, row: CatalogRow) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    /// Rows returned by every non-catalog statement.
    pub fn set_rows(&self, rows: Vec<Row>) {
        *self.rows.lock().unwrap() = rows;
    }

    pub fn set_insert_id(&self, id: Option<u64>) {
        *self.insert_id.lock().unwrap() = id;
    }

    pub fn set_affected(&self, affected: u64) {
        *self.affected.lock().unwrap() = Some(affected);
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.executed.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Executed> {
        self.executed.lock().unwrap().last().cloned()
    }

    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Connection for ScriptedConnection {
    async fn execute(&self, sql: &str, params: &[Value], types: &str) -> GateResult<Statement> {
        if sql == CATALOG_SQL {
            self.catalog_calls.fetch_add(1, Ordering::SeqCst);
            let table = params.get(1).and_then(Value::as_str).unwrap_or_default();
            let rows = self
                .tables
                .lock()
                .unwrap()
                .get(table)
                .map(|rows| rows.iter().map(CatalogRow::to_row).collect())
                .unwrap_or_default();
            return Ok(Statement::with_rows(rows));
        }

        self.executed.lock().unwrap().push(Executed {
            sql: sql.to_string(),
            params: params.to_vec(),
            types: types.to_string(),
        });

        let mut statement = Statement::with_rows(self.rows.lock().unwrap().clone());
        if let Some(id) = *self.insert_id.lock().unwrap() {
            statement = statement.with_insert_id(id);
        }
        if let Some(affected) = *self.affected.lock().unwrap() {
            statement = statement.with_affected_rows(affected);
        }
        Ok(statement)
    }
}

/// A `Db` over a fresh [`ScriptedConnection`] and [`MemoryCache`].
pub fn setup() -> (Arc<ScriptedConnection>, Db) {
    setup_with(DbConfig::new().with_schema("shop"))
}

pub fn setup_with(config: DbConfig) -> (Arc<ScriptedConnection>, Db) {
    let conn = Arc::new(ScriptedConnection::new());
    let db = Db::new(conn.clone(), Arc::new(MemoryCache::new()), config);
    (conn, db)
}

pub fn short_ttl() -> DbConfig {
    DbConfig::new()
        .with_schema("shop")
        .with_schema_ttl(Duration::from_millis(30))
}

// ==================== catalog fixtures ====================

pub fn column(name: &str, data_type: &str, column_type: &str) -> CatalogRow {
    CatalogRow {
        column_name: name.to_string(),
        data_type: data_type.to_string(),
        column_type: column_type.to_string(),
        is_nullable: false,
        ..Default::default()
    }
}

pub fn nullable(mut row: CatalogRow) -> CatalogRow {
    row.is_nullable = true;
    row
}

pub fn indexed(mut row: CatalogRow, index: &str, seq: u32, unique: bool) -> CatalogRow {
    row.index_name = Some(index.to_string());
    row.seq_in_index = Some(seq);
    row.non_unique = Some(!unique);
    row
}

fn integer(name: &str, data_type: &str, column_type: &str, precision: u32) -> CatalogRow {
    let mut row = column(name, data_type, column_type);
    row.numeric_precision = Some(precision);
    row.numeric_scale = Some(0);
    row
}

fn varchar(name: &str, len: u64) -> CatalogRow {
    let mut row = column(name, "varchar", &format!("varchar({len})"));
    row.character_maximum_length = Some(len);
    row
}

fn decimal(name: &str, precision: u32, scale: u32) -> CatalogRow {
    let mut row = column(name, "decimal", &format!("decimal({precision},{scale})"));
    row.numeric_precision = Some(precision);
    row.numeric_scale = Some(scale);
    row
}

/// `id` auto-increment key, unique `email`, `status` with a default,
/// nullable `score` and `bio`.
pub fn users() -> Vec<CatalogRow> {
    let mut id = indexed(integer("id", "int", "int(10) unsigned", 10), "PRIMARY", 1, true);
    id.extra = Some("auto_increment".to_string());
    let email = indexed(varchar("email", 64), "uniq_email", 1, true);
    let mut status = varchar("status", 16);
    status.column_default = Some("active".to_string());
    let score = nullable(decimal("score", 5, 2));
    let bio = nullable(column("bio", "text", "text"));
    let avatar = nullable(column("avatar", "blob", "blob"));
    vec![id, email, status, score, bio, avatar]
}

pub fn orders() -> Vec<CatalogRow> {
    let mut id = indexed(integer("id", "bigint", "bigint(20) unsigned", 20), "PRIMARY", 1, true);
    id.extra = Some("auto_increment".to_string());
    let user_id = indexed(integer("user_id", "int", "int(10) unsigned", 10), "idx_user", 1, false);
    let total = decimal("total", 10, 2);
    vec![id, user_id, total]
}

/// Composite key `(order_id, line_no)`.
pub fn order_items() -> Vec<CatalogRow> {
    vec![
        indexed(integer("order_id", "bigint", "bigint(20) unsigned", 20), "PRIMARY", 1, true),
        indexed(integer("line_no", "smallint", "smallint(5) unsigned", 5), "PRIMARY", 2, true),
        integer("qty", "tinyint", "tinyint(3) unsigned", 3),
    ]
}
