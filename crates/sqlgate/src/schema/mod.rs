//! Table metadata: columns, indexes, primary keys and value validation.
//!
//! Metadata is read from `information_schema` through the [`Connection`]
//! collaborator and memoized by [`SchemaCache`] in the [`Cache`] collaborator.
//!
//! ```ignore
//! let users = db.schemas().get("users").await?;
//! assert_eq!(users.primary_key_columns(), ["id"]);
//!
//! let key = users.extract_primary_key(&42.into(), &Record::new());
//! assert!(users.has_complete_primary_key(&key.into()));
//! ```
//!
//! [`Connection`]: crate::client::Connection
//! [`Cache`]: crate::client::Cache

mod cache;
mod catalog;
mod column;
mod table;
mod validate;


pub use cache::{SchemaCache, SchemaLookup};
pub use catalog::{CATALOG_PARAM_TYPES, CATALOG_SQL, CatalogRow, CatalogSnapshot};
pub use column::{Column, DataType, IndexMembership};
pub use table::{Index, KeyInput, PRIMARY_INDEX, TableSchema};
pub use validate::ValidationReason;
