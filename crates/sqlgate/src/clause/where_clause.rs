//! WHERE condition trees.
//!
//! A [`WhereSpec`] is an ordered list of entries, each either positional
//! (a `"name OP value"` string or a nested group) or named (a column bound to a
//! value or a list of values). It compiles into a [`ConditionNode`] tree, which
//! renders to SQL text plus the bound values in placeholder order.
//!
//! Connectives between consecutive entries: `AND` when either side is named,
//! `OR` when both are positional.
//!
//! ```ignore
//! let spec = WhereSpec::new()
//!     .eq("status", "active")
//!     .group(WhereSpec::new().expr("age > 18").expr("vip = 1"));
//! let clause = WhereClause::build(&spec)?;
//! assert_eq!(clause.to_sql(), "WHERE `status` = ? AND (`age` > ? OR `vip` = ?)");
//! ```

use crate::error::{GateError, GateResult};
use crate::name::{NameExpression, NameRef};
use crate::value::{Record, Value};

/// Comparison operators accepted in string conditions and join predicates.
pub const OPERATORS: &[&str] = &[
    "=", "!=", "<>", "<", "<=", ">", ">=", "<=>", "LIKE", "REGEXP", "RLIKE",
];

/// One entry of a condition spec.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereEntry {
    /// Positional string: one or more `name OP value` triples, AND-joined.
    Expr(String),
    /// Positional nested group.
    Group(WhereSpec),
    /// Named column equal to a value (`IS NULL` for NULL).
    Eq(String, Value),
    /// Named column in a list of values.
    In(String, Vec<Value>),
}

impl WhereEntry {
    pub fn is_named(&self) -> bool {
        matches!(self, WhereEntry::Eq(..) | WhereEntry::In(..))
    }
}

/// Ordered condition spec.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereSpec {
    entries: Vec<WhereEntry>,
}

impl WhereSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a positional `"name OP value"` condition.
    pub fn expr(mut self, condition: impl Into<String>) -> Self {
        self.entries.push(WhereEntry::Expr(condition.into()));
        self
    }

    /// Add a named equality condition.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push(WhereEntry::Eq(column.into(), value.into()));
        self
    }

    /// Add a named membership condition.
    pub fn in_list<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.entries.push(WhereEntry::In(
            column.into(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Add a nested group.
    pub fn group(mut self, group: WhereSpec) -> Self {
        self.entries.push(WhereEntry::Group(group));
        self
    }

    pub fn push(&mut self, entry: WhereEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[WhereEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Record> for WhereSpec {
    fn from(record: Record) -> Self {
        Self {
            entries: record
                .into_iter()
                .map(|(name, value)| WhereEntry::Eq(name, value))
                .collect(),
        }
    }
}

impl From<&Record> for WhereSpec {
    fn from(record: &Record) -> Self {
        Self::from(record.clone())
    }
}

impl From<&str> for WhereSpec {
    fn from(condition: &str) -> Self {
        Self::new().expr(condition)
    }
}

impl From<String> for WhereSpec {
    fn from(condition: String) -> Self {
        Self::new().expr(condition)
    }
}

impl From<Vec<WhereEntry>> for WhereSpec {
    fn from(entries: Vec<WhereEntry>) -> Self {
        Self { entries }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    Values(Vec<Value>),
    Column(NameExpression),
    Null,
}

/// `column OP rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub column: NameExpression,
    pub op: String,
    pub rhs: Operand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn as_str(self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }

    fn between(left: &WhereEntry, right: &WhereEntry) -> Self {
        if left.is_named() || right.is_named() {
            Connective::And
        } else {
            Connective::Or
        }
    }
}

/// Compiled condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    Leaf(Comparison),
    Group {
        children: Vec<ConditionNode>,
        /// `connectives[i]` joins `children[i]` and `children[i + 1]`.
        connectives: Vec<Connective>,
        /// Came from a positional group rather than a top-level spec or a
        /// multi-comparison string.
        nested: bool,
    },
}

/// A bound value and the name its type is resolved from.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedColumn {
    pub name: NameRef,
    pub value: Value,
}

impl PreparedColumn {
    pub fn new(name: NameRef, value: impl Into<Value>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

impl ConditionNode {
    /// Compile a spec. The result is a non-nested group.
    pub fn compile(spec: &WhereSpec) -> GateResult<Self> {
        Self::compile_group(spec, false)
    }

    fn compile_group(spec: &WhereSpec, nested: bool) -> GateResult<Self> {
        let mut kept: Vec<(&WhereEntry, ConditionNode)> = Vec::with_capacity(spec.len());
        for entry in spec.entries() {
            if let Some(node) = Self::compile_entry(entry)? {
                kept.push((entry, node));
            }
        }

        let connectives = kept
            .windows(2)
            .map(|pair| Connective::between(pair[0].0, pair[1].0))
            .collect();

        Ok(ConditionNode::Group {
            children: kept.into_iter().map(|(_, node)| node).collect(),
            connectives,
            nested,
        })
    }

    fn compile_entry(entry: &WhereEntry) -> GateResult<Option<Self>> {
        match entry {
            WhereEntry::Group(group) => {
                let node = Self::compile_group(group, true)?;
                Ok((!node.is_empty()).then_some(node))
            }
            WhereEntry::Expr(text) => parse_condition(text).map(Some),
            WhereEntry::Eq(column, value) => {
                let rhs = if value.is_null() {
                    Operand::Null
                } else {
                    Operand::Value(value.clone())
                };
                Ok(Some(ConditionNode::Leaf(Comparison {
                    column: named_column(column)?,
                    op: "=".to_string(),
                    rhs,
                })))
            }
            WhereEntry::In(column, values) => Ok(Some(ConditionNode::Leaf(Comparison {
                column: named_column(column)?,
                op: "IN".to_string(),
                rhs: Operand::Values(values.clone()),
            }))),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ConditionNode::Leaf(_) => false,
            ConditionNode::Group { children, .. } => children.is_empty(),
        }
    }

    /// True when every connective in this group is `OR`.
    pub fn is_disjunction(&self) -> bool {
        match self {
            ConditionNode::Leaf(_) => false,
            ConditionNode::Group { connectives, .. } => {
                !connectives.is_empty() && connectives.iter().all(|c| *c == Connective::Or)
            }
        }
    }

    /// Render to SQL, appending bound values in placeholder order.
    pub fn render(&self, prepared: &mut Vec<PreparedColumn>) -> String {
        match self {
            ConditionNode::Leaf(cmp) => render_comparison(cmp, prepared),
            ConditionNode::Group {
                children,
                connectives,
                nested,
            } => {
                let mut sql = String::new();
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        let joiner = connectives.get(i - 1).copied().unwrap_or(Connective::And);
                        sql.push(' ');
                        sql.push_str(joiner.as_str());
                        sql.push(' ');
                    }
                    sql.push_str(&child.render(prepared));
                }
                if *nested && children.len() > 1 {
                    format!("({sql})")
                } else {
                    sql
                }
            }
        }
    }
}

fn render_comparison(cmp: &Comparison, prepared: &mut Vec<PreparedColumn>) -> String {
    let column = cmp.column.to_string();
    match &cmp.rhs {
        Operand::Value(value) => {
            prepared.push(PreparedColumn::new(bind_name(&cmp.column), value.clone()));
            format!("{column} {} ?", cmp.op)
        }
        Operand::Values(values) if values.is_empty() => "1=0".to_string(),
        Operand::Values(values) => {
            let name = bind_name(&cmp.column);
            for value in values {
                prepared.push(PreparedColumn::new(name.clone(), value.clone()));
            }
            format!("{column} {} ({})", cmp.op, placeholders(values.len()))
        }
        Operand::Column(other) => format!("{column} {} {other}", cmp.op),
        Operand::Null => match cmp.op.as_str() {
            "=" => format!("{column} IS NULL"),
            "!=" | "<>" => format!("{column} IS NOT NULL"),
            op => format!("{column} {op} NULL"),
        },
    }
}

/// Name a bound value's type is resolved from: the first column of the expression.
fn bind_name(expr: &NameExpression) -> NameRef {
    expr.first()
        .cloned()
        .unwrap_or_else(|| NameRef::new(None, expr.to_string()))
}

/// `?, ?, ?`
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn named_column(column: &str) -> GateResult<NameExpression> {
    let expr = NameExpression::parse(column);
    if expr.names.is_empty() {
        return Err(GateError::malformed(format!("empty column name in {column:?}")));
    }
    Ok(expr)
}

/// Parse a positional string condition into a leaf or an AND group of leaves.
fn parse_condition(text: &str) -> GateResult<ConditionNode> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() || tokens.len() % 3 != 0 {
        return Err(GateError::malformed(format!(
            "expected `name OP value` triples in {text:?}"
        )));
    }

    let mut leaves = tokens
        .chunks(3)
        .map(|triple| {
            Ok(ConditionNode::Leaf(Comparison {
                column: named_column(&triple[0])?,
                op: operator(&triple[1])?,
                rhs: operand(&triple[2]),
            }))
        })
        .collect::<GateResult<Vec<_>>>()?;

    if leaves.len() == 1 {
        return Ok(leaves.remove(0));
    }
    Ok(ConditionNode::Group {
        connectives: vec![Connective::And; leaves.len() - 1],
        children: leaves,
        nested: false,
    })
}

/// Validate and uppercase a comparison operator.
pub(crate) fn operator(token: &str) -> GateResult<String> {
    let op = token.to_ascii_uppercase();
    if OPERATORS.contains(&op.as_str()) {
        Ok(op)
    } else {
        Err(GateError::malformed(format!("unsupported operator {token:?}")))
    }
}

/// Classify a right-hand token: quoted literal, column reference, NULL or number.
fn operand(token: &str) -> Operand {
    if let Some(inner) = unquote(token, '\'').or_else(|| unquote(token, '"')) {
        return Operand::Value(Value::Text(inner.to_string()));
    }
    if is_column_ref(token) {
        return Operand::Column(NameExpression::parse(token));
    }
    if token.eq_ignore_ascii_case("null") {
        return Operand::Null;
    }
    match token.parse::<i64>() {
        Ok(n) => Operand::Value(Value::Int(n)),
        Err(_) => Operand::Value(Value::Text(token.to_string())),
    }
}

fn unquote(token: &str, quote: char) -> Option<&str> {
    token
        .strip_prefix(quote)
        .and_then(|t| t.strip_suffix(quote))
        .filter(|_| token.len() >= 2)
}

/// Backtick-quoted, or a dotted identifier such as `orders.user_id`.
pub(crate) fn is_column_ref(token: &str) -> bool {
    if token.starts_with('`') {
        return true;
    }
    let mut parts = token.split('.');
    let is_ident = |p: &str| {
        p.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && p.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    };
    match (parts.next(), parts.next()) {
        (Some(first), Some(second)) => is_ident(first) && is_ident(second) && parts.all(is_ident),
        _ => false,
    }
}

/// Split on whitespace, keeping quoted runs (`'…'`, `"…"`, `` `…` ``) whole.
pub(crate) fn tokenize(text: &str) -> GateResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in text.chars() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => {
                if matches!(ch, '\'' | '"' | '`') {
                    quote = Some(ch);
                }
                current.push(ch);
            }
        }
    }
    if let Some(q) = quote {
        return Err(GateError::malformed(format!("unterminated {q} in {text:?}")));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

/// A compiled WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    node: ConditionNode,
    sql: String,
    prepared: Vec<PreparedColumn>,
}

impl WhereClause {
    pub fn build(spec: &WhereSpec) -> GateResult<Self> {
        let node = ConditionNode::compile(spec)?;
        let mut prepared = Vec::new();
        let sql = node.render(&mut prepared);
        Ok(Self {
            node,
            sql,
            prepared,
        })
    }

    /// `WHERE …`, or empty when there are no conditions.
    pub fn to_sql(&self) -> String {
        if self.sql.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.sql)
        }
    }

    /// The condition text without the `WHERE` keyword.
    pub fn condition_sql(&self) -> &str {
        &self.sql
    }

    pub fn prepared(&self) -> &[PreparedColumn] {
        &self.prepared
    }

    pub fn node(&self) -> &ConditionNode {
        &self.node
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}
