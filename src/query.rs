use serde_json::{json, Value};
use std::fmt;

/// Default number of search results
pub const DEFAULT_SIZE: usize = 5;

/// A field with its relevance multiplier, rendered as `name^boost`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBoost {
    pub field: String,
    pub boost: f64,
}

impl FieldBoost {
    pub fn new(field: &str, boost: f64) -> Self {
        Self {
            field: field.to_string(),
            boost,
        }
    }
}

impl fmt::Display for FieldBoost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.boost == 1.0 {
            write!(f, "{}", self.field)
        } else {
            write!(f, "{}^{}", self.field, self.boost)
        }
    }
}

/// Relevance query matching the same text against several fields
#[derive(Debug, Clone, PartialEq)]
pub struct MultiMatchQuery {
    pub query: String,
    pub fields: Vec<FieldBoost>,
    pub size: usize,
}

impl MultiMatchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            fields: Vec::new(),
            size: DEFAULT_SIZE,
        }
    }

    /// Book search: `title` boosted twice over `author`
    pub fn books(query: impl Into<String>, size: usize) -> Self {
        Self::new(query)
            .field("title", 2.0)
            .field("author", 1.0)
            .with_size(size)
    }

    pub fn field(mut self, field: &str, boost: f64) -> Self {
        self.fields.push(FieldBoost::new(field, boost));
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Render the `_search` request body
    pub fn to_body(&self) -> Value {
        let fields: Vec<String> = self.fields.iter().map(|f| f.to_string()).collect();

        json!({
            "size": self.size,
            "query": {
                "multi_match": {
                    "query": self.query,
                    "fields": fields,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_books_query_body() {
        let body = MultiMatchQuery::books("dune", 5).to_body();

        assert_eq!(
            body,
            json!({
                "size": 5,
                "query": {
                    "multi_match": {
                        "query": "dune",
                        "fields": ["title^2", "author"],
                    }
                }
            })
        );
    }

    #[test]
    fn test_fractional_boost() {
        assert_eq!(FieldBoost::new("title", 1.5).to_string(), "title^1.5");
    }

    #[test]
    fn test_default_size() {
        assert_eq!(MultiMatchQuery::new("x").size, DEFAULT_SIZE);
    }
}
