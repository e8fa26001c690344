//! # sqlgate
//!
//! Schema-aware SQL construction and parameter binding for MySQL-style SQL
//! (backtick-quoted identifiers, `?` placeholders).
//!
//! ## Features
//!
//! - **Name expressions**: `"count(o.id) total"` renders as ``COUNT(`o`.`id`) AS `total` ``
//! - **Condition trees**: nested AND/OR conditions compiled from plain descriptors
//! - **Schema cache**: per-table column and index metadata, memoized with a TTL
//! - **Typed binding**: every `?` gets a wire type (`i`, `f`, `b`, `s`) from its column
//! - **Validation**: values are checked against the column before they are written
//! - **Safe defaults**: UPDATE and DELETE require WHERE; key-addressed writes require a full key
//!
//! ## Query builders
//!
//! ```ignore
//! use sqlgate::query::{self, SqlQuery};
//! use sqlgate::{Db, DbConfig, MemoryCache, Record, WhereSpec};
//!
//! let db = Db::new(conn, Arc::new(MemoryCache::new()), DbConfig::new().with_schema("shop"));
//!
//! // SELECT
//! let rows = query::select("users")
//!     .filter(WhereSpec::new().eq("status", "active").expr("age >= 18"))
//!     .order_by("created_at", "desc")
//!     .limit(10)
//!     .execute(&db)
//!     .await?
//!     .into_rows();
//!
//! // DELETE
//! query::delete("users").eq("id", 7).execute(&db).await?;
//! ```
//!
//! ## Gateway
//!
//! ```ignore
//! let users = db.gateway("users");
//! let key = users.insert(&Record::from([("email", "a@example.com")]), InsertMode::Default).await?;
//! let row = users.fetch_row(key).await?;
//! ```

pub mod clause;
pub mod client;
pub mod db;
pub mod error;
pub mod gateway;
pub mod name;
pub mod query;
pub mod schema;
pub mod value;

pub use clause::{JoinFlags, JoinOn, Limit, OrderSpec, WhereEntry, WhereSpec};
pub use client::{Cache, Connection, MemoryCache, Statement};
pub use db::{Db, DbConfig};
pub use error::{GateError, GateResult};
pub use gateway::Gateway;
pub use name::{NameExpression, NameRef, format_name, format_sql, parse_name};
pub use query::{
    BoundParams, BuiltQuery, DeleteQuery, InsertMode, InsertQuery, QueryKind, SelectQuery,
    SqlQuery, UpdateQuery, delete, insert, select, update,
};
pub use schema::{Column, DataType, KeyInput, SchemaCache, TableSchema, ValidationReason};
pub use value::{FromValue, Record, Row, Value, WireType};
