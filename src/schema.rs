use serde_json::{json, Map, Value};

/// Name of the index holding book documents
pub const BOOKS_INDEX: &str = "books";

/// Field type as understood by the search engine mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Full-text analyzed
    Text,
    /// Exact-match, not analyzed
    Keyword,
    /// 32-bit integer
    Integer,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Keyword => "keyword",
            FieldType::Integer => "integer",
        }
    }

    pub fn is_analyzed(&self) -> bool {
        matches!(self, FieldType::Text)
    }
}

/// Index settings plus field mappings
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSchema {
    pub shards: u32,
    pub replicas: u32,
    fields: Vec<(String, FieldType)>,
}

impl IndexSchema {
    pub fn new(shards: u32, replicas: u32) -> Self {
        Self {
            shards,
            replicas,
            fields: Vec::new(),
        }
    }

    /// Schema for the `books` index: one shard, no replicas, four typed fields
    pub fn books() -> Self {
        Self::new(1, 0)
            .with_field("title", FieldType::Text)
            .with_field("author", FieldType::Text)
            .with_field("year", FieldType::Integer)
            .with_field("tags", FieldType::Keyword)
    }

    pub fn with_field(mut self, name: &str, field_type: FieldType) -> Self {
        self.fields.retain(|(existing, _)| existing != name);
        self.fields.push((name.to_string(), field_type));
        self
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, field_type)| *field_type)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Names of the full-text fields, in mapping order
    pub fn text_fields(&self) -> Vec<&str> {
        self.fields()
            .filter(|(_, ty)| ty.is_analyzed())
            .map(|(name, _)| name)
            .collect()
    }

    /// Render the create-index request body
    pub fn to_body(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields()
            .map(|(name, ty)| (name.to_string(), json!({ "type": ty.as_str() })))
            .collect();

        json!({
            "settings": {
                "index": {
                    "number_of_shards": self.shards,
                    "number_of_replicas": self.replicas,
                }
            },
            "mappings": {
                "properties": properties,
            }
        })
    }
}
