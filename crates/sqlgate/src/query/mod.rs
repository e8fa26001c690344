//! Statement builders: SELECT, INSERT, UPDATE and DELETE.
//!
//! Builders are consuming (`self -> Self`) and collect construction errors
//! instead of panicking; the first error is reported by [`SqlQuery::validate`],
//! [`SqlQuery::build`] and [`SqlQuery::execute`].
//!
//! Building yields a [`BuiltQuery`]: the SQL text plus the values to bind,
//! grouped as SET/VALUES values, WHERE values and LIMIT values. Binding
//! resolves every value against the [`SchemaCache`] to pick its wire type and
//! validates written values against their column.
//!
//! # Usage
//!
//! ```ignore
//! use sqlgate::query::{self, SqlQuery};
//! use sqlgate::clause::WhereSpec;
//!
//! let rows = query::select("users u")
//!     .columns(&["u.id", "u.name", "count(o.id) orders"])
//!     .join("orders o", [("o.user_id", "u.id")], "left")
//!     .filter(WhereSpec::new().eq("u.status", "active"))
//!     .order_by("u.name", "asc")
//!     .limit(20)
//!     .execute(&db)
//!     .await?
//!     .into_rows();
//!
//! query::insert("users")
//!     .columns(&["name", "email"])
//!     .values(&Record::from([("name", "alice"), ("email", "alice@example.com")]))
//!     .execute(&db)
//!     .await?;
//!
//! query::update("users")
//!     .set("status", "inactive")
//!     .filter(WhereSpec::new().eq("id", 7))
//!     .execute(&db)
//!     .await?;
//! ```
//!
//! [`SchemaCache`]: crate::schema::SchemaCache

mod delete;
mod insert;
mod select;
mod update;


pub use delete::DeleteQuery;
pub use insert::{InsertMode, InsertQuery};
pub use select::SelectQuery;
pub use update::UpdateQuery;

use crate::client::Statement;
use crate::clause::{
    JoinClause, JoinFlags, JoinOn, Limit, OrderByClause, OrderSpec, PreparedColumn, WhereClause,
    WhereEntry, WhereSpec,
};
use crate::db::Db;
use crate::error::{GateError, GateResult};
use crate::name::{NameExpression, NameRef};
use crate::schema::{SchemaCache, SchemaLookup};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;

/// Create a SELECT builder for `table` (optionally aliased, `"users u"`).
pub fn select(table: &str) -> SelectQuery {
    SelectQuery::new().from(table)
}

/// Create an INSERT builder for `table`.
pub fn insert(table: &str) -> InsertQuery {
    InsertQuery::new().into_table(table)
}

/// Create an UPDATE builder for `table`.
pub fn update(table: &str) -> UpdateQuery {
    UpdateQuery::new().table(table)
}

/// Create a DELETE builder for `table`.
pub fn delete(table: &str) -> DeleteQuery {
    DeleteQuery::new().from(table)
}

/// Statement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl QueryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::Select => "SELECT",
            QueryKind::Insert => "INSERT",
            QueryKind::Update => "UPDATE",
            QueryKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values ready for the connection: one wire type character per value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParams {
    pub values: Vec<Value>,
    pub types: String,
}

impl BoundParams {
    fn push(&mut self, value: Value, wire: char) {
        self.values.push(value);
        self.types.push(wire);
    }
}

/// A rendered statement and its unbound values.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub kind: QueryKind,
    pub sql: String,
    /// Main table.
    pub table: String,
    /// Alias to table, for the main table and every join.
    pub aliases: HashMap<String, String>,
    /// SET/VALUES values, validated on bind.
    pub values: Vec<PreparedColumn>,
    /// WHERE values.
    pub conditions: Vec<PreparedColumn>,
    pub limit: Option<Limit>,
}

impl BuiltQuery {
    /// Number of values the statement binds, including LIMIT values.
    pub fn param_count(&self) -> usize {
        self.values.len()
            + self.conditions.len()
            + self.limit.map_or(0, |l| l.params().len())
    }

    /// Table a prepared name belongs to: unqualified names go to the main
    /// table, aliases map to their table.
    pub fn resolve_table<'a>(&'a self, name: &'a NameRef) -> &'a str {
        match name.table.as_deref() {
            None => &self.table,
            Some(t) => {
                let t = t.rsplit('.').next().unwrap_or(t);
                self.aliases.get(t).map(String::as_str).unwrap_or(t)
            }
        }
    }

    /// Resolve wire types and validate written values.
    ///
    /// Order: SET/VALUES values, WHERE values, LIMIT values.
    pub async fn bind(&self, schemas: &SchemaCache) -> GateResult<BoundParams> {
        let mut lookup = SchemaLookup::new(schemas);
        let mut bound = BoundParams::default();

        for prepared in &self.values {
            let table = self.resolve_table(&prepared.name);
            let column = lookup.column(table, &prepared.name.column).await?;
            column.test_value(&prepared.value).map_err(|reason| {
                GateError::validation(&column.name, reason, prepared.value.text())
            })?;
            bound.push(prepared.value.clone(), column.param_type(&prepared.value).as_char());
        }

        for prepared in &self.conditions {
            let table = self.resolve_table(&prepared.name);
            let column = lookup.column(table, &prepared.name.column).await?;
            bound.push(prepared.value.clone(), column.param_type(&prepared.value).as_char());
        }

        if let Some(limit) = &self.limit {
            for (value, wire) in limit.params().into_iter().zip(limit.types().chars()) {
                bound.push(value, wire);
            }
        }

        Ok(bound)
    }

    /// Bind against the schema cache and run on the connection.
    pub async fn execute(&self, db: &Db) -> GateResult<Statement> {
        let bound = self.bind(db.schemas()).await?;
        db.run(self.kind, &self.sql, &bound.values, &bound.types)
            .await
    }
}

/// Common interface of the statement builders.
pub trait SqlQuery: Sync {
    /// Render the statement.
    fn build(&self) -> GateResult<BuiltQuery>;

    /// First construction error, if any.
    fn validate(&self) -> GateResult<()>;

    /// Debug helper to get the SQL string.
    fn to_sql(&self) -> GateResult<String> {
        Ok(self.build()?.sql)
    }

    /// Build, bind and execute.
    fn execute(
        &self,
        db: &Db,
    ) -> impl std::future::Future<Output = GateResult<Statement>> + Send {
        async move {
            let built = self.build()?;
            built.execute(db).await
        }
    }
}

/// Target table, joins, conditions, ordering and limit shared by the builders.
#[derive(Debug, Clone, Default)]
pub(crate) struct QueryCore {
    table: Option<NameExpression>,
    joins: JoinClause,
    where_spec: WhereSpec,
    order: OrderSpec,
    limit: Option<Limit>,
    build_error: Option<GateError>,
}

impl QueryCore {
    pub(crate) fn set_table(&mut self, table: &str) {
        let expr = NameExpression::parse(table);
        if expr.first().is_none() {
            self.fail(GateError::NoTableSpecified);
            return;
        }
        self.table = Some(expr);
    }

    /// Record a construction error; the first one wins.
    pub(crate) fn fail(&mut self, err: GateError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    pub(crate) fn validate(&self) -> GateResult<()> {
        match &self.build_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub(crate) fn add_where(&mut self, spec: WhereSpec) {
        if self.table.is_none() {
            self.fail(GateError::NoTableSpecified);
            return;
        }
        for entry in spec.entries() {
            self.where_spec.push(entry.clone());
        }
    }

    pub(crate) fn add_where_entry(&mut self, entry: WhereEntry) {
        self.add_where(WhereSpec::from(vec![entry]));
    }

    pub(crate) fn add_join(&mut self, table: &str, on: JoinOn, flags: JoinFlags) {
        if let Err(err) = self.joins.join(table, on, flags) {
            self.fail(err);
        }
    }

    pub(crate) fn add_order(&mut self, spec: OrderSpec) {
        self.order = std::mem::take(&mut self.order).extend(spec);
    }

    pub(crate) fn set_limit(&mut self, limit: Limit) {
        self.limit = Some(limit);
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Real name of the main table.
    pub(crate) fn table_name(&self) -> GateResult<&str> {
        self.table
            .as_ref()
            .and_then(NameExpression::first)
            .map(|n| n.column.as_str())
            .ok_or(GateError::NoTableSpecified)
    }

    /// Main table as rendered in FROM/INTO/UPDATE, alias included.
    pub(crate) fn table_sql(&self) -> GateResult<String> {
        match &self.table {
            Some(expr) => Ok(expr.to_string()),
            None => Err(GateError::NoTableSpecified),
        }
    }

    pub(crate) fn aliases(&self) -> HashMap<String, String> {
        let mut aliases = HashMap::new();
        if let (Ok(table), Some(alias)) = (
            self.table_name(),
            self.table.as_ref().and_then(|t| t.alias.as_deref()),
        ) {
            aliases.insert(alias.to_string(), table.to_string());
        }
        for (alias, table) in self.joins.aliases() {
            aliases.insert(alias.to_string(), table.to_string());
        }
        aliases
    }

    pub(crate) fn joins_sql(&self) -> String {
        self.joins.to_sql()
    }

    pub(crate) fn where_clause(&self) -> GateResult<WhereClause> {
        WhereClause::build(&self.where_spec)
    }

    pub(crate) fn order_clause(&self) -> GateResult<OrderByClause> {
        OrderByClause::build(&self.order)
    }

    /// Assemble the trailing `[WHERE] [ORDER BY] [LIMIT]` clauses onto `sql`.
    ///
    /// Returns the WHERE values.
    pub(crate) fn append_tail(
        &self,
        sql: &mut String,
        require_where: Option<QueryKind>,
    ) -> GateResult<Vec<PreparedColumn>> {
        let where_clause = self.where_clause()?;
        if where_clause.is_empty() {
            if let Some(kind) = require_where {
                return Err(GateError::MissingWhere(kind.as_str().to_string()));
            }
        }
        push_clause(sql, &where_clause.to_sql());
        push_clause(sql, &self.order_clause()?.to_sql());
        if let Some(limit) = &self.limit {
            push_clause(sql, limit.to_sql());
        }
        Ok(where_clause.prepared().to_vec())
    }

    pub(crate) fn built(
        &self,
        kind: QueryKind,
        sql: String,
        values: Vec<PreparedColumn>,
        conditions: Vec<PreparedColumn>,
    ) -> GateResult<BuiltQuery> {
        Ok(BuiltQuery {
            kind,
            sql,
            table: self.table_name()?.to_string(),
            aliases: self.aliases(),
            values,
            conditions,
            limit: self.limit,
        })
    }
}

pub(crate) fn push_clause(sql: &mut String, clause: &str) {
    if !clause.is_empty() {
        sql.push(' ');
        sql.push_str(clause);
    }
}
