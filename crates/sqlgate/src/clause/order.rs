use crate::error::{GateError, GateResult};
use crate::name::format_name;
use std::str::FromStr;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            _ => Err(GateError::InvalidOrderDirection(s.to_string())),
        }
    }
}

/// Sort spec: columns with an explicit direction and/or plain columns.
///
/// Directions are checked when the clause is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSpec {
    items: Vec<(String, Option<String>)>,
}

impl OrderSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort by `column` in `direction` (`"asc"`/`"desc"`, any case).
    pub fn by(mut self, column: impl Into<String>, direction: impl Into<String>) -> Self {
        self.items.push((column.into(), Some(direction.into())));
        self
    }

    /// Sort by `column` with the default direction.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.items.push((column.into(), None));
        self
    }

    /// Append the terms of `other`.
    pub fn extend(mut self, other: OrderSpec) -> Self {
        self.items.extend(other.items);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for OrderSpec {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs
            .into_iter()
            .fold(OrderSpec::new(), |spec, (c, d)| spec.by(c, d))
    }
}

impl From<&str> for OrderSpec {
    fn from(column: &str) -> Self {
        OrderSpec::new().column(column)
    }
}

/// A compiled ORDER BY clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderByClause {
    terms: Vec<(String, Option<Direction>)>,
}

impl OrderByClause {
    pub fn build(spec: &OrderSpec) -> GateResult<Self> {
        let terms = spec
            .items
            .iter()
            .map(|(column, direction)| {
                let direction = direction.as_deref().map(str::parse::<Direction>).transpose()?;
                Ok((format_name(column), direction))
            })
            .collect::<GateResult<Vec<_>>>()?;
        Ok(Self { terms })
    }

    /// `ORDER BY …`, or empty.
    pub fn to_sql(&self) -> String {
        if self.terms.is_empty() {
            return String::new();
        }
        let terms: Vec<String> = self
            .terms
            .iter()
            .map(|(column, direction)| match direction {
                Some(d) => format!("{column} {}", d.as_str()),
                None => column.clone(),
            })
            .collect();
        format!("ORDER BY {}", terms.join(", "))
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
