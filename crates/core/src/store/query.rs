//! Search-expression compiler.
//!
//! Translates a list of shell-tokenized search terms into a parameterized
//! query over the films table. The token grammar is deliberately small:
//! bare tokens are free-text matches, `key:value` tokens are field-scoped,
//! `(` `)` `and` `or` (and the German `und`/`oder`) are structure, and a
//! leading `select` hands the whole term list through verbatim as a
//! trusted escape hatch. Everything except the escape hatch binds values
//! as parameters.
//!
//! Structural validity (balanced parentheses, dangling connectors) is not
//! checked; a malformed expression surfaces as a query execution error.

use chrono::NaiveDate;
use thiserror::Error;

use super::sqlite::FILM_COLUMNS;

/// First-token keyword that switches to raw passthrough.
const RAW_QUERY_KEYWORD: &str = "select";

/// Boolean connector between predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    fn sql(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// Comparison operator of a `date:` predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOp {
    Eq,
    Gt,
    Lt,
    Ge,
    Le,
}

impl DateOp {
    fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
        }
    }
}

/// One node of the parsed search expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchNode {
    /// Bare token: substring match across station, topic, title and
    /// description.
    FreeText(String),
    /// `key:value` token: substring match on one column.
    Field {
        column: &'static str,
        value: String,
    },
    DateCompare {
        op: DateOp,
        date: String,
    },
    /// `date:A-B`, both bounds inclusive.
    DateRange {
        from: String,
        to: String,
    },
    Connector(Connector),
    GroupOpen,
    GroupClose,
}

/// A parsed search expression: either a node list or a raw passthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchExpr {
    nodes: Vec<SearchNode>,
    raw: Option<String>,
}

impl SearchExpr {
    pub fn nodes(&self) -> &[SearchNode] {
        &self.nodes
    }

    pub fn is_raw(&self) -> bool {
        self.raw.is_some()
    }
}

/// A rendered query ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unknown search field: {0}")]
    UnknownField(String),
}

/// Maps a user-facing field key (English or German) to its column.
fn resolve_field(key: &str) -> Option<&'static str> {
    match key.to_ascii_lowercase().as_str() {
        "station" | "sender" => Some("station"),
        "topic" | "thema" => Some("topic"),
        "title" | "titel" => Some("title"),
        "description" | "beschreibung" => Some("description"),
        "date" | "datum" => Some("date"),
        _ => None,
    }
}

/// Parses a token list into a [`SearchExpr`].
pub fn parse_terms(terms: &[String]) -> Result<SearchExpr, QueryError> {
    if let Some(first) = terms.first() {
        if first.to_ascii_lowercase().starts_with(RAW_QUERY_KEYWORD) {
            return Ok(SearchExpr {
                nodes: Vec::new(),
                raw: Some(terms.join(" ")),
            });
        }
    }

    let mut nodes = Vec::new();
    for token in terms {
        let node = match token.as_str() {
            "(" => SearchNode::GroupOpen,
            ")" => SearchNode::GroupClose,
            t if t.eq_ignore_ascii_case("and") || t.eq_ignore_ascii_case("und") => {
                SearchNode::Connector(Connector::And)
            }
            t if t.eq_ignore_ascii_case("or") || t.eq_ignore_ascii_case("oder") => {
                SearchNode::Connector(Connector::Or)
            }
            t => match t.split_once(':') {
                None => SearchNode::FreeText(t.to_string()),
                Some((key, value)) => {
                    let column = resolve_field(key)
                        .ok_or_else(|| QueryError::UnknownField(key.to_string()))?;
                    if column == "date" {
                        parse_date_predicate(value)
                    } else {
                        SearchNode::Field {
                            column,
                            value: value.to_string(),
                        }
                    }
                }
            },
        };
        nodes.push(node);
    }
    Ok(SearchExpr { nodes, raw: None })
}

/// Compiles a token list straight to executable SQL.
pub fn compile_terms(terms: &[String]) -> Result<CompiledQuery, QueryError> {
    Ok(render(&parse_terms(terms)?))
}

/// `date:` value forms: `=X`, `>X`, `<X`, `>=X`, `<=X`, `A-B`, bare `X`.
fn parse_date_predicate(value: &str) -> SearchNode {
    let bytes = value.as_bytes();
    if matches!(bytes.first(), Some(b'=' | b'<' | b'>')) {
        let (op, rest) = if bytes.len() >= 2 && bytes[1] == b'=' && bytes[0] != b'=' {
            let op = if bytes[0] == b'>' { DateOp::Ge } else { DateOp::Le };
            (op, &value[2..])
        } else {
            let op = match bytes[0] {
                b'>' => DateOp::Gt,
                b'<' => DateOp::Lt,
                _ => DateOp::Eq,
            };
            (op, &value[1..])
        };
        return SearchNode::DateCompare {
            op,
            date: normalize_date(rest),
        };
    }

    if let Some((from, to)) = split_date_range(value) {
        return SearchNode::DateRange {
            from: normalize_date(from),
            to: normalize_date(to),
        };
    }

    SearchNode::DateCompare {
        op: DateOp::Eq,
        date: normalize_date(value),
    }
}

/// Finds the `-` separating two dates. Tried position by position because
/// ISO dates contain dashes themselves.
fn split_date_range(value: &str) -> Option<(&str, &str)> {
    for (idx, _) in value.match_indices('-') {
        let (from, to) = (&value[..idx], &value[idx + 1..]);
        if parse_flexible_date(from).is_some() && parse_flexible_date(to).is_some() {
            return Some((from, to));
        }
    }
    None
}

/// Accepts `D.M.Y` (two-digit years are 2000s) and ISO `Y-M-D`.
fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    if value.contains('.') {
        let mut parts = value.splitn(3, '.');
        let day: u32 = parts.next()?.parse().ok()?;
        let month: u32 = parts.next()?.parse().ok()?;
        let year_raw = parts.next()?;
        let mut year: i32 = year_raw.parse().ok()?;
        if year_raw.len() == 2 {
            year += 2000;
        }
        NaiveDate::from_ymd_opt(year, month, day)
    } else {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
    }
}

/// Best-effort normalization to the stored ISO form. Unparseable input is
/// passed through as-is; it is still bound as a parameter and simply
/// matches nothing.
fn normalize_date(value: &str) -> String {
    parse_flexible_date(value)
        .map(|d| d.to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Renders the expression into SQL.
///
/// The default connector is AND between field predicates and OR between
/// free-text predicates; an explicit connector token overrides the next
/// pairing.
fn render(expr: &SearchExpr) -> CompiledQuery {
    if let Some(raw) = &expr.raw {
        return CompiledQuery {
            sql: raw.clone(),
            params: Vec::new(),
        };
    }

    let base = format!("SELECT {FILM_COLUMNS} FROM films");
    if expr.nodes.is_empty() {
        return CompiledQuery {
            sql: base,
            params: Vec::new(),
        };
    }

    let mut clause = String::new();
    let mut params = Vec::new();
    let mut pending: Option<Connector> = None;
    let mut needs_joiner = false;

    for node in &expr.nodes {
        match node {
            SearchNode::Connector(c) => pending = Some(*c),
            SearchNode::GroupOpen => {
                if needs_joiner {
                    clause.push_str(pending.take().unwrap_or(Connector::And).sql());
                }
                clause.push('(');
                needs_joiner = false;
            }
            SearchNode::GroupClose => {
                clause.push(')');
                needs_joiner = true;
            }
            predicate => {
                if needs_joiner {
                    let default = match predicate {
                        SearchNode::FreeText(_) => Connector::Or,
                        _ => Connector::And,
                    };
                    clause.push_str(pending.take().unwrap_or(default).sql());
                }
                pending = None;
                render_predicate(predicate, &mut clause, &mut params);
                needs_joiner = true;
            }
        }
    }

    CompiledQuery {
        sql: format!("{base} WHERE {clause}"),
        params,
    }
}

fn render_predicate(node: &SearchNode, clause: &mut String, params: &mut Vec<String>) {
    match node {
        SearchNode::FreeText(text) => {
            clause.push_str(
                "(station LIKE ? OR topic LIKE ? OR title LIKE ? OR description LIKE ?)",
            );
            let pattern = format!("%{text}%");
            params.extend(std::iter::repeat_n(pattern, 4));
        }
        SearchNode::Field { column, value } => {
            clause.push_str(&format!("({column} LIKE ?)"));
            params.push(format!("%{value}%"));
        }
        SearchNode::DateCompare { op, date } => {
            clause.push_str(&format!("(date {} ?)", op.sql()));
            params.push(date.clone());
        }
        SearchNode::DateRange { from, to } => {
            clause.push_str("(date >= ? AND date <= ?)");
            params.push(from.clone());
            params.push(to.clone());
        }
        SearchNode::Connector(_) | SearchNode::GroupOpen | SearchNode::GroupClose => {
            unreachable!("structural nodes are handled by render")
        }
    }
}
