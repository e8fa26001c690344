//! Clause builders: WHERE condition trees, joins, ORDER BY and LIMIT.
//!
//! Each builder compiles a caller-supplied spec into SQL text. WHERE and LIMIT
//! also produce the values to bind, in placeholder order.

mod join;
mod limit;
mod order;
mod where_clause;

#[cfg(test)]
mod tests;

pub use join::{JoinClause, JoinFlags, JoinOn, JoinSpec, OnItem};
pub use limit::Limit;
pub use order::{Direction, OrderByClause, OrderSpec};
pub use where_clause::{
    Comparison, ConditionNode, Connective, OPERATORS, Operand, PreparedColumn, WhereClause,
    WhereEntry, WhereSpec,
};

pub(crate) use where_clause::placeholders;
