use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Comparison used by a range query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeOperator {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Display for RangeOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            RangeOperator::Lt => "<",
            RangeOperator::Le => "<=",
            RangeOperator::Gt => ">",
            RangeOperator::Ge => ">=",
            RangeOperator::Eq => "=",
            RangeOperator::Ne => "!=",
        };
        write!(f, "{}", symbol)
    }
}

/// A structured query evaluated by the store.
///
/// Property names are paths into the JSON content, with `.` separating
/// nested object keys. A path that reaches an array matches when any of its
/// elements matches.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredQuery {
    /// Matches every document
    All,
    And(Vec<StructuredQuery>),
    Or(Vec<StructuredQuery>),
    Not(Box<StructuredQuery>),
    /// Exact match of a property against any of `values`
    Value { property: String, values: Vec<Value> },
    Range {
        property: String,
        operator: RangeOperator,
        value: Value,
    },
    /// Case-insensitive word match; `*` and `?` act as wildcards. Without a
    /// property every string in the document is searched.
    Word { property: Option<String>, text: String },
    /// Documents tagged with any of the collections
    Collection(Vec<String>),
    /// Documents whose URI starts with `path`; unless `infinite`, only
    /// immediate children match
    Directory { path: String, infinite: bool },
    /// Documents with one of the URIs
    Document(Vec<String>),
    /// Free-text query in the store's string query grammar
    Text(String),
}

impl StructuredQuery {
    /// Combines with `other` so that both must match. Nested conjunctions are
    /// flattened and `All` operands are dropped.
    pub fn and(self, other: StructuredQuery) -> StructuredQuery {
        match (self, other) {
            (StructuredQuery::All, q) | (q, StructuredQuery::All) => q,
            (StructuredQuery::And(mut left), StructuredQuery::And(right)) => {
                left.extend(right);
                StructuredQuery::And(left)
            }
            (StructuredQuery::And(mut left), q) => {
                left.push(q);
                StructuredQuery::And(left)
            }
            (q, StructuredQuery::And(mut right)) => {
                right.insert(0, q);
                StructuredQuery::And(right)
            }
            (left, right) => StructuredQuery::And(vec![left, right]),
        }
    }

    pub fn or(self, other: StructuredQuery) -> StructuredQuery {
        match (self, other) {
            (StructuredQuery::Or(mut left), StructuredQuery::Or(right)) => {
                left.extend(right);
                StructuredQuery::Or(left)
            }
            (StructuredQuery::Or(mut left), q) => {
                left.push(q);
                StructuredQuery::Or(left)
            }
            (left, right) => StructuredQuery::Or(vec![left, right]),
        }
    }

    pub fn negate(self) -> StructuredQuery {
        match self {
            StructuredQuery::Not(inner) => *inner,
            q => StructuredQuery::Not(Box::new(q)),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, StructuredQuery::All)
    }
}

impl Default for StructuredQuery {
    fn default() -> Self {
        StructuredQuery::All
    }
}

fn join(f: &mut Formatter<'_>, queries: &[StructuredQuery], separator: &str) -> std::fmt::Result {
    write!(f, "(")?;
    for (i, q) in queries.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", separator)?;
        }
        write!(f, "{}", q)?;
    }
    write!(f, ")")
}

impl Display for StructuredQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StructuredQuery::All => write!(f, "*"),
            StructuredQuery::And(queries) => join(f, queries, "AND"),
            StructuredQuery::Or(queries) => join(f, queries, "OR"),
            StructuredQuery::Not(q) => write!(f, "NOT {}", q),
            StructuredQuery::Value { property, values } => {
                let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{} in [{}]", property, values.join(", "))
            }
            StructuredQuery::Range {
                property,
                operator,
                value,
            } => write!(f, "{} {} {}", property, operator, value),
            StructuredQuery::Word { property, text } => match property {
                Some(p) => write!(f, "{} ~ \"{}\"", p, text),
                None => write!(f, "~ \"{}\"", text),
            },
            StructuredQuery::Collection(names) => write!(f, "collection({})", names.join(", ")),
            StructuredQuery::Directory { path, infinite } => {
                write!(f, "directory({}{})", path, if *infinite { ", infinite" } else { "" })
            }
            StructuredQuery::Document(uris) => write!(f, "document({})", uris.join(", ")),
            StructuredQuery::Text(text) => write!(f, "text(\"{}\")", text),
        }
    }
}
