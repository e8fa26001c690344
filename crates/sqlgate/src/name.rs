//! Name expressions: `table.column`, `func(table.column)`, with an optional alias.
//!
//! Every identifier the builders render goes through [`NameExpression`]:
//!
//! ```ignore
//! use sqlgate::name::{format_name, NameExpression};
//!
//! assert_eq!(format_name("u.id"), "`u`.`id`");
//! assert_eq!(format_name("count(o.id) total"), "COUNT(`o`.`id`) AS `total`");
//!
//! let parsed = NameExpression::parse("max(a, b) AS m");
//! assert_eq!(parsed.function.as_deref(), Some("max"));
//! assert_eq!(parsed.alias.as_deref(), Some("m"));
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// One `(table, column)` pair of a name expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameRef {
    pub table: Option<String>,
    pub column: String,
}

impl NameRef {
    pub fn new(table: Option<&str>, column: impl Into<String>) -> Self {
        Self {
            table: table.map(str::to_string),
            column: column.into(),
        }
    }

    /// `table.column`, or the bare column.
    pub fn qualified(&self) -> String {
        match &self.table {
            Some(t) => format!("{t}.{}", self.column),
            None => self.column.clone(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.column == "*"
    }
}

impl fmt::Display for NameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(table) = &self.table {
            for part in table.split('.') {
                write!(f, "`{part}`.")?;
            }
        }
        if self.is_wildcard() {
            f.write_str("*")
        } else {
            write!(f, "`{}`", self.column)
        }
    }
}

/// Parsed form of a name token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameExpression {
    pub function: Option<String>,
    pub names: Vec<NameRef>,
    pub alias: Option<String>,
}

impl NameExpression {
    /// The bare `*`.
    pub fn wildcard() -> Self {
        Self {
            function: None,
            names: vec![NameRef::new(None, "*")],
            alias: None,
        }
    }

    /// Parse a name token.
    ///
    /// Whitespace is collapsed first. A `(` that appears before the first space
    /// and has a matching `)` makes the text in front of it a function name; the
    /// text after the `)` is the alias tail. Otherwise the token is split at the
    /// first space, and the last word of the remainder is the alias when it is
    /// a plain identifier.
    pub fn parse(token: &str) -> Self {
        let data = format_sql(token, true);
        if data == "*" {
            return Self::wildcard();
        }

        let space = data.find(' ');
        let call = data
            .find('(')
            .filter(|open| space.is_none_or(|s| *open < s))
            .and_then(|open| matching_paren(&data, open).map(|close| (open, close)));

        let (function, name_part, tail) = match call {
            Some((open, close)) => {
                let function = data[..open].trim();
                (
                    (!function.is_empty()).then(|| function.to_string()),
                    &data[open + 1..close],
                    &data[close + 1..],
                )
            }
            None => match space {
                Some(s) => (None, &data[..s], &data[s + 1..]),
                None => (None, data.as_str(), ""),
            },
        };

        let names = name_part
            .split(',')
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(parse_dotted)
            .collect();

        let alias = tail
            .split_whitespace()
            .last()
            .filter(|w| !w.eq_ignore_ascii_case("as"))
            .map(|w| w.replace('`', ""))
            .filter(|w| is_identifier(w));

        Self {
            function,
            names,
            alias,
        }
    }

    /// First name of the expression, if any.
    pub fn first(&self) -> Option<&NameRef> {
        self.names.first()
    }

    pub fn is_wildcard(&self) -> bool {
        self.function.is_none() && self.names.len() == 1 && self.names[0].is_wildcard()
    }

    /// Qualified name of the first column, used to resolve a bound value's type.
    pub fn qualified_name(&self) -> Option<String> {
        self.first().map(NameRef::qualified)
    }
}

impl fmt::Display for NameExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(function) = &self.function {
            write!(f, "{}(", function.to_uppercase())?;
        }
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}")?;
        }
        if self.function.is_some() {
            f.write_str(")")?;
        }
        if let Some(alias) = &self.alias {
            write!(f, " AS `{alias}`")?;
        }
        Ok(())
    }
}

fn parse_dotted(word: &str) -> NameRef {
    let cleaned = word.replace('`', "");
    match cleaned.rsplit_once('.') {
        Some((table, column)) if !table.is_empty() => NameRef::new(Some(table), column),
        _ => NameRef::new(None, cleaned.trim_start_matches('.')),
    }
}

/// Aliases are plain identifiers; anything else in the tail is dropped.
fn is_identifier(word: &str) -> bool {
    static IDENT_RE: OnceLock<Regex> = OnceLock::new();
    IDENT_RE
        .get_or_init(|| Regex::new(r"^[\w$]+$").expect("invalid built-in identifier regex"))
        .is_match(word)
}

fn matching_paren(data: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in data[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a name token. Shorthand for [`NameExpression::parse`].
pub fn parse_name(token: &str) -> NameExpression {
    NameExpression::parse(token)
}

/// Render a name token with backtick quoting.
pub fn format_name(token: &str) -> String {
    NameExpression::parse(token).to_string()
}

/// Render several name tokens, comma separated.
pub fn format_name_list<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| format_name(t.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collapse whitespace runs to one space and trim.
///
/// In compact mode whitespace around commas is dropped as well.
pub fn format_sql(sql: &str, compact: bool) -> String {
    static WS_RE: OnceLock<Regex> = OnceLock::new();
    static COMMA_RE: OnceLock<Regex> = OnceLock::new();

    let ws = WS_RE.get_or_init(|| Regex::new(r"\s+").expect("invalid built-in whitespace regex"));
    let collapsed = ws.replace_all(sql.trim(), " ");
    if !compact {
        return collapsed.into_owned();
    }
    let comma =
        COMMA_RE.get_or_init(|| Regex::new(r"\s*,\s*").expect("invalid built-in comma regex"));
    comma.replace_all(&collapsed, ",").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_dotted_names() {
        let plain = NameExpression::parse("id");
        assert_eq!(plain.names, vec![NameRef::new(None, "id")]);
        assert_eq!(plain.to_string(), "`id`");

        let dotted = NameExpression::parse("users.id");
        assert_eq!(dotted.names, vec![NameRef::new(Some("users"), "id")]);
        assert_eq!(dotted.to_string(), "`users`.`id`");
    }

    #[test]
    fn wildcard_is_not_quoted() {
        assert!(NameExpression::parse(" * ").is_wildcard());
        assert_eq!(format_name("*"), "*");
        assert_eq!(format_name("u.*"), "`u`.*");
        assert_eq!(format_name("count(*)"), "COUNT(*)");
    }

    #[test]
    fn parses_function_and_alias() {
        let expr = NameExpression::parse("sum(o.total)  AS  revenue");
        assert_eq!(expr.function.as_deref(), Some("sum"));
        assert_eq!(expr.names, vec![NameRef::new(Some("o"), "total")]);
        assert_eq!(expr.alias.as_deref(), Some("revenue"));
        assert_eq!(expr.to_string(), "SUM(`o`.`total`) AS `revenue`");
    }

    #[test]
    fn alias_without_as_keyword() {
        let expr = NameExpression::parse("users.name  author");
        assert_eq!(expr.alias.as_deref(), Some("author"));
        assert_eq!(expr.to_string(), "`users`.`name` AS `author`");
    }

    #[test]
    fn function_with_several_arguments() {
        let expr = NameExpression::parse("concat(u.first , u.last) full_name");
        assert_eq!(expr.names.len(), 2);
        assert_eq!(
            expr.to_string(),
            "CONCAT(`u`.`first`, `u`.`last`) AS `full_name`"
        );
    }

    #[test]
    fn paren_after_space_is_not_a_function() {
        let expr = NameExpression::parse("total (x)");
        assert_eq!(expr.function, None);
        assert_eq!(expr.names, vec![NameRef::new(None, "total")]);
        assert_eq!(expr.alias, None);
        assert_eq!(expr.to_string(), "`total`");
    }

    #[test]
    fn alias_must_be_an_identifier() {
        assert_eq!(format_name("o.total t$1"), "`o`.`total` AS `t$1`");
        assert_eq!(format_name("o.total 'x'"), "`o`.`total`");
    }

    #[test]
    fn backticks_in_input_are_stripped() {
        assert_eq!(format_name("`users`.`id`"), "`users`.`id`");
        assert_eq!(
            NameExpression::parse("`users`.`id`").qualified_name().as_deref(),
            Some("users.id")
        );
    }

    #[test]
    fn schema_qualified_name_keeps_table_path() {
        let expr = NameExpression::parse("shop.users.id");
        assert_eq!(expr.names[0].table.as_deref(), Some("shop.users"));
        assert_eq!(expr.to_string(), "`shop`.`users`.`id`");
    }

    #[test]
    fn format_sql_collapses_whitespace() {
        assert_eq!(format_sql("SELECT  a,\n  b\tFROM t ", false), "SELECT a, b FROM t");
        assert_eq!(format_sql("SELECT a , b FROM t", true), "SELECT a,b FROM t");
    }

    #[test]
    fn format_name_list_joins_with_commas() {
        assert_eq!(format_name_list(&["a", "t.b"]), "`a`, `t`.`b`");
    }
}
