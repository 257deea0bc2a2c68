use super::query_text;
use crate::client::{RawFacet, StoreError, StoreResult, StoredDocument, CODE_QUERY_SYNTAX};
use crate::domain::{Sort, SortOrder};
use crate::query::{FacetSpec, RangeOperator, StructuredQuery};
use indexmap::IndexMap;
use itertools::Itertools;
use regex::Regex;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashSet;

/// A structured query prepared for repeated evaluation against documents.
///
/// String queries are parsed and word patterns compiled once, so matching a
/// document never fails.
#[derive(Debug)]
pub(crate) enum Matcher {
    All,
    And(Vec<Matcher>),
    Or(Vec<Matcher>),
    Not(Box<Matcher>),
    Value {
        path: String,
        values: Vec<Value>,
    },
    Range {
        path: String,
        operator: RangeOperator,
        value: Value,
    },
    Word {
        path: Option<String>,
        pattern: Regex,
    },
    Collection(Vec<String>),
    Directory {
        path: String,
        infinite: bool,
    },
    Document(Vec<String>),
}

impl Matcher {
    pub(crate) fn compile(query: &StructuredQuery) -> StoreResult<Matcher> {
        let matcher = match query {
            StructuredQuery::All => Matcher::All,
            StructuredQuery::And(queries) => {
                Matcher::And(queries.iter().map(Matcher::compile).collect::<StoreResult<_>>()?)
            }
            StructuredQuery::Or(queries) => {
                Matcher::Or(queries.iter().map(Matcher::compile).collect::<StoreResult<_>>()?)
            }
            StructuredQuery::Not(inner) => Matcher::Not(Box::new(Matcher::compile(inner)?)),
            StructuredQuery::Value { property, values } => Matcher::Value {
                path: property.clone(),
                values: values.clone(),
            },
            StructuredQuery::Range {
                property,
                operator,
                value,
            } => Matcher::Range {
                path: property.clone(),
                operator: *operator,
                value: value.clone(),
            },
            StructuredQuery::Word { property, text } => Matcher::Word {
                path: property.clone(),
                pattern: word_pattern(text)?,
            },
            StructuredQuery::Collection(names) => Matcher::Collection(names.clone()),
            StructuredQuery::Directory { path, infinite } => Matcher::Directory {
                path: if path.ends_with('/') {
                    path.clone()
                } else {
                    format!("{}/", path)
                },
                infinite: *infinite,
            },
            StructuredQuery::Document(uris) => Matcher::Document(uris.clone()),
            StructuredQuery::Text(text) => Matcher::compile(&query_text::parse(text)?)?,
        };
        Ok(matcher)
    }

    pub(crate) fn matches(&self, document: &StoredDocument) -> bool {
        match self {
            Matcher::All => true,
            Matcher::And(matchers) => matchers.iter().all(|m| m.matches(document)),
            Matcher::Or(matchers) => matchers.iter().any(|m| m.matches(document)),
            Matcher::Not(inner) => !inner.matches(document),
            Matcher::Value { path, values } => values_at(&document.content, path)
                .into_iter()
                .any(|found| values.iter().any(|v| values_equal(found, v))),
            Matcher::Range {
                path,
                operator,
                value,
            } => values_at(&document.content, path)
                .into_iter()
                .any(|found| in_range(found, *operator, value)),
            Matcher::Word { path, pattern } => {
                let candidates = match path {
                    Some(path) => values_at(&document.content, path),
                    None => vec![&document.content],
                };
                let mut strings = Vec::new();
                for candidate in candidates {
                    collect_strings(candidate, &mut strings);
                }
                strings.into_iter().any(|s| pattern.is_match(s))
            }
            Matcher::Collection(names) => names.iter().any(|n| document.in_collection(n)),
            Matcher::Directory { path, infinite } => {
                match document.uri.strip_prefix(path.as_str()) {
                    Some(rest) => *infinite || !rest.contains('/'),
                    None => false,
                }
            }
            Matcher::Document(uris) => uris.iter().any(|u| *u == document.uri),
        }
    }
}

fn word_pattern(text: &str) -> StoreResult<Regex> {
    let text = text.trim();
    if text.is_empty() {
        log::error!("Word query has no text");
        return Err(StoreError::with_code(CODE_QUERY_SYNTAX, "Empty word query"));
    }

    let escaped = regex::escape(text)
        .replace(r"\*", r"\w*")
        .replace(r"\?", r"\w");
    let words = escaped.split_whitespace().join(r"\s+");
    match Regex::new(&format!(r"(?i)\b{}\b", words)) {
        Ok(pattern) => Ok(pattern),
        Err(err) => {
            log::error!("Invalid word query {:?}: {}", text, err);
            Err(StoreError::with_code(
                CODE_QUERY_SYNTAX,
                format!("Invalid word query {:?}", text),
            ))
        }
    }
}

/// Every value found under a dot-separated path; arrays along the way and at
/// the end are flattened.
pub(crate) fn values_at<'a>(content: &'a Value, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut found = Vec::new();
    collect_at(content, &segments, &mut found);
    found
}

fn collect_at<'a>(value: &'a Value, segments: &[&str], found: &mut Vec<&'a Value>) {
    if let Value::Array(items) = value {
        for item in items {
            collect_at(item, segments, found);
        }
        return;
    }
    match segments.split_first() {
        None => found.push(value),
        Some((head, rest)) => {
            if let Some(child) = value.get(*head) {
                collect_at(child, rest, found);
            }
        }
    }
}

fn collect_strings<'a>(value: &'a Value, strings: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => strings.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, strings)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, strings)),
        _ => {}
    }
}

/// Orders two scalars of the same JSON type; numbers compare numerically
/// regardless of their integer or float representation.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match compare_values(a, b) {
        Some(ordering) => ordering == Ordering::Equal,
        None => a == b,
    }
}

fn in_range(found: &Value, operator: RangeOperator, bound: &Value) -> bool {
    match operator {
        RangeOperator::Eq => values_equal(found, bound),
        RangeOperator::Ne => !values_equal(found, bound),
        _ => match compare_values(found, bound) {
            Some(ordering) => match operator {
                RangeOperator::Lt => ordering == Ordering::Less,
                RangeOperator::Le => ordering != Ordering::Greater,
                RangeOperator::Gt => ordering == Ordering::Greater,
                RangeOperator::Ge => ordering != Ordering::Less,
                RangeOperator::Eq | RangeOperator::Ne => false,
            },
            None => false,
        },
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn total_order(a: &Value, b: &Value) -> Ordering {
    compare_values(a, b).unwrap_or_else(|| type_rank(a).cmp(&type_rank(b)))
}

/// Sorts documents by each order in turn. Documents without a value for a
/// sort property go last in either direction.
pub(crate) fn sort_documents(documents: &mut [StoredDocument], sort: &Sort) {
    if !sort.is_sorted() {
        return;
    }
    documents.sort_by(|a, b| {
        for order in sort {
            let left = values_at(&a.content, order.property()).into_iter().next();
            let right = values_at(&b.content, order.property()).into_iter().next();
            let ordering = match (left, right) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(x), Some(y)) => match order.direction() {
                    SortOrder::Ascending => total_order(x, y),
                    SortOrder::Descending => total_order(y, x),
                },
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn facet_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Counts the distinct values of each facet property across `documents`.
///
/// A document counts once per distinct value it holds. Values are reported
/// in ascending order and truncated to the facet's value limit.
pub(crate) fn compute_facets(documents: &[StoredDocument], specs: &[FacetSpec]) -> Vec<RawFacet> {
    specs
        .iter()
        .map(|spec| {
            let mut counts: IndexMap<String, (Value, u64)> = IndexMap::new();
            for document in documents {
                let mut seen = HashSet::new();
                for value in values_at(&document.content, spec.property()) {
                    let Some(label) = facet_label(value) else {
                        continue;
                    };
                    if seen.insert(label.clone()) {
                        counts.entry(label).or_insert_with(|| (value.clone(), 0)).1 += 1;
                    }
                }
            }

            let values = counts
                .into_iter()
                .sorted_by(|(la, (va, _)), (lb, (vb, _))| {
                    total_order(va, vb).then_with(|| la.cmp(lb))
                })
                .map(|(label, (_, count))| (label, count))
                .take(spec.value_limit().unwrap_or(usize::MAX))
                .collect();
            RawFacet::new(spec.name(), values)
        })
        .collect()
}

/// Builds a projection of `content` holding only the given dot paths.
/// Paths that do not resolve are skipped.
pub(crate) fn extract(content: &Value, paths: &[String]) -> Value {
    let mut projection = Map::new();
    for path in paths {
        let segments: Vec<&str> = path.split('.').collect();
        let mut current = content;
        let mut resolved = true;
        for segment in &segments {
            match current.get(*segment) {
                Some(child) => current = child,
                None => {
                    resolved = false;
                    break;
                }
            }
        }
        if resolved {
            insert_at(&mut projection, &segments, current.clone());
        }
    }
    Value::Object(projection)
}

fn insert_at(target: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            target.insert(last.to_string(), value);
        }
        [head, rest @ ..] => {
            let child = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                insert_at(map, rest, value);
            }
        }
    }
}
