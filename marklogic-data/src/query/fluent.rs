use super::{RangeOperator, StructuredQuery};
use serde_json::Value;

/// Creates a fluent query builder for the specified property path.
///
/// # Examples
///
/// ```rust,ignore
/// use marklogic_data::query::property;
///
/// let query = property("color").eq("red").and(property("price").lt(20_000));
/// ```
pub fn property(name: &str) -> PropertyQuery {
    PropertyQuery {
        property: name.to_string(),
    }
}

/// Matches every document.
pub fn all() -> StructuredQuery {
    StructuredQuery::All
}

/// Matches documents matching every one of `queries`.
pub fn and(queries: Vec<StructuredQuery>) -> StructuredQuery {
    queries.into_iter().fold(StructuredQuery::All, StructuredQuery::and)
}

/// Matches documents matching at least one of `queries`.
pub fn or(queries: Vec<StructuredQuery>) -> StructuredQuery {
    StructuredQuery::Or(queries)
}

pub fn not(query: StructuredQuery) -> StructuredQuery {
    query.negate()
}

/// Case-insensitive word match anywhere in the document.
pub fn term(text: &str) -> StructuredQuery {
    StructuredQuery::Word {
        property: None,
        text: text.to_string(),
    }
}

pub fn collection(names: &[&str]) -> StructuredQuery {
    StructuredQuery::Collection(names.iter().map(|n| n.to_string()).collect())
}

pub fn directory(path: &str, infinite: bool) -> StructuredQuery {
    StructuredQuery::Directory {
        path: path.to_string(),
        infinite,
    }
}

pub fn document(uris: &[&str]) -> StructuredQuery {
    StructuredQuery::Document(uris.iter().map(|u| u.to_string()).collect())
}

/// A query in the store's string query grammar, e.g.
/// `color:red -status:sold (fast OR cheap)`.
pub fn text(query: &str) -> StructuredQuery {
    StructuredQuery::Text(query.to_string())
}

/// A fluent builder for constructing queries on a specific property.
pub struct PropertyQuery {
    property: String,
}

impl PropertyQuery {
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> StructuredQuery {
        StructuredQuery::Value {
            property: self.property,
            values: vec![value.into()],
        }
    }

    #[inline]
    pub fn ne<T: Into<Value>>(self, value: T) -> StructuredQuery {
        self.range(RangeOperator::Ne, value.into())
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> StructuredQuery {
        self.range(RangeOperator::Lt, value.into())
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> StructuredQuery {
        self.range(RangeOperator::Le, value.into())
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> StructuredQuery {
        self.range(RangeOperator::Gt, value.into())
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> StructuredQuery {
        self.range(RangeOperator::Ge, value.into())
    }

    /// Matches when the property equals any of `values`.
    pub fn in_array<T: Into<Value>>(self, values: Vec<T>) -> StructuredQuery {
        StructuredQuery::Value {
            property: self.property,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Inclusive range match.
    pub fn between<T: Into<Value>>(self, lower: T, upper: T) -> StructuredQuery {
        let upper_query = StructuredQuery::Range {
            property: self.property.clone(),
            operator: RangeOperator::Le,
            value: upper.into(),
        };
        self.range(RangeOperator::Ge, lower.into()).and(upper_query)
    }

    /// Case-insensitive word match within the property.
    pub fn word(self, text: &str) -> StructuredQuery {
        StructuredQuery::Word {
            property: Some(self.property),
            text: text.to_string(),
        }
    }

    fn range(self, operator: RangeOperator, value: Value) -> StructuredQuery {
        StructuredQuery::Range {
            property: self.property,
            operator,
            value,
        }
    }
}
