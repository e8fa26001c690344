//! CRUD operations for one table.
//!
//! Writes are validated against the table schema before any SQL is sent, and
//! key-addressed operations refuse to run on an incomplete primary key.
//!
//! ```ignore
//! let users = db.gateway("users");
//!
//! let key = users
//!     .insert(&Record::from([("email", "a@example.com")]), InsertMode::Default)
//!     .await?;
//! let row = users.fetch_row(key.clone()).await?;
//! users.update(key.clone(), &Record::from([("status", "disabled")])).await?;
//! users.delete(key).await?;
//! ```

use crate::clause::{Limit, OrderSpec, WhereSpec};
use crate::db::Db;
use crate::error::{GateError, GateResult};
use crate::query::{self, InsertMode, SqlQuery};
use crate::schema::{KeyInput, TableSchema};
use crate::value::{Record, Row};
use std::sync::Arc;

/// CRUD helper bound to one table of a [`Db`].
#[derive(Debug, Clone)]
pub struct Gateway<'a> {
    db: &'a Db,
    table: String,
}

impl<'a> Gateway<'a> {
    pub fn new(db: &'a Db, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
        }
    }

    pub fn db(&self) -> &'a Db {
        self.db
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Metadata of the table.
    pub async fn schema(&self) -> GateResult<Arc<TableSchema>> {
        self.db.schemas().get(&self.table).await
    }

    /// Rows matching `filter`.
    pub async fn find(
        &self,
        filter: impl Into<WhereSpec>,
        order: impl Into<OrderSpec>,
        limit: Option<Limit>,
    ) -> GateResult<Vec<Row>> {
        let mut select = query::select(&self.table).filter(filter).order(order);
        if let Some(limit) = limit {
            select = select.limit(limit);
        }
        Ok(select.execute(self.db).await?.into_rows())
    }

    /// First row matching `filter`.
    pub async fn find_one(
        &self,
        filter: impl Into<WhereSpec>,
        order: impl Into<OrderSpec>,
    ) -> GateResult<Option<Row>> {
        let rows = self.find(filter, order, Some(Limit::Count(1))).await?;
        Ok(rows.into_iter().next())
    }

    /// The row addressed by `key`.
    pub async fn fetch_row(&self, key: impl Into<KeyInput>) -> GateResult<Option<Row>> {
        let key = self.complete_key(key.into()).await?;
        let statement = query::select(&self.table)
            .filter(key)
            .execute(self.db)
            .await?;
        Ok(statement.into_rows().into_iter().next())
    }

    /// Bind `key` to the key columns; see [`TableSchema::extract_primary_key`].
    pub async fn extract_primary_key(
        &self,
        key: impl Into<KeyInput>,
        fallback: &Record,
    ) -> GateResult<Record> {
        Ok(self.schema().await?.extract_primary_key(&key.into(), fallback))
    }

    pub async fn has_complete_primary_key(&self, key: impl Into<KeyInput>) -> GateResult<bool> {
        Ok(self.schema().await?.has_complete_primary_key(&key.into()))
    }

    /// Validate and insert `row`, returning its primary key.
    ///
    /// The key takes the generated id when there is one, and the row's own
    /// values otherwise.
    pub async fn insert(&self, row: &Record, mode: InsertMode) -> GateResult<Record> {
        self.db.schemas().test_row(&self.table, row).await?;

        let statement = query::insert(&self.table)
            .columns_from(row)
            .values(row)
            .mode(mode)
            .execute(self.db)
            .await?;

        let key = match statement.insert_id() {
            Some(id) => KeyInput::from(id),
            None => KeyInput::Columns(Record::new()),
        };
        Ok(self.schema().await?.extract_primary_key(&key, row))
    }

    /// Validate `columns` and write them to the row addressed by `key`.
    ///
    /// Returns the number of affected rows; nothing is sent when `columns` is empty.
    pub async fn update(&self, key: impl Into<KeyInput>, columns: &Record) -> GateResult<u64> {
        let key = self.complete_key(key.into()).await?;
        if columns.is_empty() {
            return Ok(0);
        }
        self.db.schemas().test_row(&self.table, columns).await?;

        let statement = query::update(&self.table)
            .set_all(columns)
            .filter(key)
            .execute(self.db)
            .await?;
        Ok(statement.affected_rows())
    }

    /// Delete the row addressed by `key`, returning the number of affected rows.
    pub async fn delete(&self, key: impl Into<KeyInput>) -> GateResult<u64> {
        let key = self.complete_key(key.into()).await?;
        let statement = query::delete(&self.table)
            .filter(key)
            .execute(self.db)
            .await?;
        Ok(statement.affected_rows())
    }

    async fn complete_key(&self, key: KeyInput) -> GateResult<Record> {
        let schema = self.schema().await?;
        let bound = schema.extract_primary_key(&key, &Record::new());
        if !schema.has_complete_primary_key(&KeyInput::Columns(bound.clone())) {
            return Err(GateError::IncompletePrimaryKey(self.table.clone()));
        }
        Ok(bound)
    }
}
