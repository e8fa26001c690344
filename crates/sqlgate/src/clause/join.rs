use super::where_clause::{is_column_ref, operator, tokenize};
use crate::error::{GateError, GateResult};
use crate::name::{NameExpression, format_name};

/// Join type keywords, collapsed into one canonical phrase.
///
/// Priority: `STRAIGHT_JOIN` alone, then `INNER`/`CROSS` (INNER wins), then an
/// optional `NATURAL` prefix with `LEFT`/`RIGHT` (RIGHT wins) and an optional
/// `OUTER`. Unknown keywords are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinFlags {
    pub straight: bool,
    pub inner: bool,
    pub cross: bool,
    pub natural: bool,
    pub left: bool,
    pub right: bool,
    pub outer: bool,
}

impl JoinFlags {
    /// Plain `JOIN`.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn left() -> Self {
        Self {
            left: true,
            ..Self::default()
        }
    }

    pub fn inner() -> Self {
        Self {
            inner: true,
            ..Self::default()
        }
    }

    /// Collect flags from keywords, case-insensitively.
    pub fn from_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags = Self::default();
        for keyword in keywords {
            match keyword.as_ref().trim().to_ascii_uppercase().as_str() {
                "STRAIGHT_JOIN" => flags.straight = true,
                "INNER" => flags.inner = true,
                "CROSS" => flags.cross = true,
                "NATURAL" => flags.natural = true,
                "LEFT" => flags.left = true,
                "RIGHT" => flags.right = true,
                "OUTER" => flags.outer = true,
                _ => {}
            }
        }
        flags
    }

    /// Space or comma separated keywords, e.g. `"left outer"`.
    pub fn parse(keywords: &str) -> Self {
        Self::from_keywords(keywords.split([' ', ',']).filter(|k| !k.is_empty()))
    }

    /// The canonical join phrase, e.g. `NATURAL RIGHT OUTER JOIN`.
    pub fn phrase(&self) -> String {
        if self.straight {
            return "STRAIGHT_JOIN".to_string();
        }
        if self.inner {
            return "INNER JOIN".to_string();
        }
        if self.cross {
            return "CROSS JOIN".to_string();
        }

        let mut words = Vec::with_capacity(4);
        if self.natural {
            words.push("NATURAL");
        }
        if self.right {
            words.push("RIGHT");
        } else if self.left {
            words.push("LEFT");
        }
        if self.outer && (self.left || self.right) {
            words.push("OUTER");
        }
        words.push("JOIN");
        words.join(" ")
    }
}

impl From<&str> for JoinFlags {
    fn from(keywords: &str) -> Self {
        Self::parse(keywords)
    }
}

impl<const N: usize> From<[&str; N]> for JoinFlags {
    fn from(keywords: [&str; N]) -> Self {
        Self::from_keywords(keywords)
    }
}

impl From<&[&str]> for JoinFlags {
    fn from(keywords: &[&str]) -> Self {
        Self::from_keywords(keywords)
    }
}

impl From<Vec<String>> for JoinFlags {
    fn from(keywords: Vec<String>) -> Self {
        Self::from_keywords(keywords)
    }
}

/// One item of a list-form ON predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum OnItem {
    /// `"a.col = b.col"`; several triples in one string are AND-joined.
    Compare(String),
    /// Join-type override.
    Flags(JoinFlags),
}

/// ON predicate of a join.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum JoinOn {
    /// No ON clause.
    #[default]
    None,
    /// `left = right` pairs, AND-joined.
    Columns(Vec<(String, String)>),
    /// Comparisons and type overrides, in order.
    Items(Vec<OnItem>),
}

impl JoinOn {
    /// Single `left = right` pair.
    pub fn eq(left: impl Into<String>, right: impl Into<String>) -> Self {
        JoinOn::Columns(vec![(left.into(), right.into())])
    }
}

impl From<&str> for JoinOn {
    fn from(compare: &str) -> Self {
        JoinOn::Items(vec![OnItem::Compare(compare.to_string())])
    }
}

impl From<String> for JoinOn {
    fn from(compare: String) -> Self {
        JoinOn::Items(vec![OnItem::Compare(compare)])
    }
}

impl<const N: usize> From<[(&str, &str); N]> for JoinOn {
    fn from(pairs: [(&str, &str); N]) -> Self {
        JoinOn::Columns(
            pairs
                .into_iter()
                .map(|(l, r)| (l.to_string(), r.to_string()))
                .collect(),
        )
    }
}

impl From<Vec<OnItem>> for JoinOn {
    fn from(items: Vec<OnItem>) -> Self {
        JoinOn::Items(items)
    }
}

/// One join: target table, predicate, type.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    pub table: NameExpression,
    pub on: JoinOn,
    pub flags: JoinFlags,
}

impl JoinSpec {
    /// Real table name of the join target.
    pub fn table_name(&self) -> Option<&str> {
        self.table.first().map(|n| n.column.as_str())
    }

    pub fn alias(&self) -> Option<&str> {
        self.table.alias.as_deref()
    }

    fn render(&self) -> GateResult<String> {
        let mut flags = self.flags;
        let mut predicates = Vec::new();

        match &self.on {
            JoinOn::None => {}
            JoinOn::Columns(pairs) => {
                for (left, right) in pairs {
                    predicates.push(format!("{} = {}", format_name(left), format_name(right)));
                }
            }
            JoinOn::Items(items) => {
                for item in items {
                    match item {
                        OnItem::Compare(text) => predicates.extend(render_compare(text)?),
                        OnItem::Flags(over) => flags = *over,
                    }
                }
            }
        }

        let mut sql = format!("{} {}", flags.phrase(), self.table);
        if !flags.natural && !predicates.is_empty() {
            sql.push_str(" ON ");
            sql.push_str(&predicates.join(" AND "));
        }
        Ok(sql)
    }
}

fn render_compare(text: &str) -> GateResult<Vec<String>> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() || tokens.len() % 3 != 0 {
        return Err(GateError::malformed(format!(
            "expected `left OP right` triples in join predicate {text:?}"
        )));
    }
    tokens
        .chunks(3)
        .map(|t| {
            let rhs = if t[2].parse::<f64>().is_ok() && !is_column_ref(&t[2]) {
                t[2].clone()
            } else if t[2].starts_with(['\'', '"']) {
                return Err(GateError::malformed(format!(
                    "join predicates compare columns, got literal {}",
                    t[2]
                )));
            } else {
                format_name(&t[2])
            };
            Ok(format!("{} {} {}", format_name(&t[0]), operator(&t[1])?, rhs))
        })
        .collect()
}

/// Ordered list of joins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinClause {
    joins: Vec<JoinSpec>,
    rendered: Vec<String>,
}

impl JoinClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one join; `table` may carry an alias (`"orders o"`).
    pub fn join(
        &mut self,
        table: &str,
        on: impl Into<JoinOn>,
        flags: impl Into<JoinFlags>,
    ) -> GateResult<()> {
        let spec = JoinSpec {
            table: NameExpression::parse(table),
            on: on.into(),
            flags: flags.into(),
        };
        if spec.table_name().is_none() {
            return Err(GateError::malformed(format!("empty join target {table:?}")));
        }
        self.rendered.push(spec.render()?);
        self.joins.push(spec);
        Ok(())
    }

    pub fn joins(&self) -> &[JoinSpec] {
        &self.joins
    }

    /// `(alias, table)` pairs registered by the joins.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.joins
            .iter()
            .filter_map(|j| Some((j.alias()?, j.table_name()?)))
    }

    pub fn to_sql(&self) -> String {
        self.rendered.join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }
}
