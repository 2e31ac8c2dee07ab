//! In-process search engine implementing [`SearchBackend`].
//!
//! Mirrors the engine behaviour the service relies on: full-replace writes
//! that are immediately visible, not-found as `None`, and best-fields BM25
//! scoring over analyzed `text` fields. Used by the test suite and by
//! `--backend memory` for running without an engine.

use crate::backend::{
    ClusterInfo, EngineError, Result, SearchBackend, SearchHit, StoredDocument,
    WriteResult,
};
use crate::index::FieldIndex;
use crate::query::MultiMatchQuery;
use crate::ranking::{rank_documents, WeightedField};
use crate::schema::{FieldType, IndexSchema};
use crate::tokenizer::Tokenizer;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

const CLUSTER_NAME: &str = "memory";

struct MemoryIndex {
    schema: IndexSchema,
    documents: BTreeMap<String, Value>,
    fields: HashMap<String, FieldIndex>,
}

impl MemoryIndex {
    fn new(schema: IndexSchema) -> Self {
        Self {
            schema,
            documents: BTreeMap::new(),
            fields: HashMap::new(),
        }
    }

    /// Map string fields the schema does not know yet as `text`
    fn map_dynamic_fields(&mut self, source: &Value) {
        let Some(object) = source.as_object() else {
            return;
        };

        for (name, value) in object {
            if self.schema.field_type(name).is_none() && is_textual(value) {
                tracing::debug!(field = %name, "dynamically mapping field as text");
                self.schema = self.schema.clone().with_field(name, FieldType::Text);
            }
        }
    }

    fn upsert(&mut self, id: &str, source: Value, tokenizer: &Tokenizer) -> WriteResult {
        self.map_dynamic_fields(&source);

        for field in self.fields.values_mut() {
            field.remove_document(id);
        }

        for name in self.schema.text_fields() {
            if let Some(text) = field_text(&source, name) {
                let tokens = tokenizer.analyze(&text);
                self.fields
                    .entry(name.to_string())
                    .or_default()
                    .add_document(id, &tokens);
            }
        }

        match self.documents.insert(id.to_string(), source) {
            Some(_) => WriteResult::Updated,
            None => WriteResult::Created,
        }
    }
}

fn is_textual(value: &Value) -> bool {
    match value {
        Value::String(_) => true,
        Value::Array(items) => !items.is_empty() && items.iter().all(Value::is_string),
        _ => false,
    }
}

/// Text of a field, with array values joined
fn field_text(source: &Value, field: &str) -> Option<String> {
    match source.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        _ => None,
    }
}

/// In-memory search engine
#[derive(Default)]
pub struct MemoryBackend {
    indices: RwLock<HashMap<String, MemoryIndex>>,
    tokenizer: Tokenizer,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapped field types of an index, if it exists
    pub async fn schema(&self, index: &str) -> Option<IndexSchema> {
        self.indices
            .read()
            .await
            .get(index)
            .map(|idx| idx.schema.clone())
    }

    pub async fn document_count(&self, index: &str) -> usize {
        self.indices
            .read()
            .await
            .get(index)
            .map(|idx| idx.documents.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    async fn cluster_info(&self) -> Result<ClusterInfo> {
        Ok(ClusterInfo {
            cluster_name: Some(CLUSTER_NAME.to_string()),
        })
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        Ok(self.indices.read().await.contains_key(index))
    }

    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<()> {
        let mut indices = self.indices.write().await;
        if !indices.contains_key(index) {
            indices.insert(index.to_string(), MemoryIndex::new(schema.clone()));
        }
        Ok(())
    }

    async fn index_document(&self, index: &str, id: &str, source: &Value) -> Result<WriteResult> {
        if !source.is_object() {
            return Err(EngineError::Status {
                status: 400,
                body: "document source must be an object".to_string(),
            });
        }

        let mut indices = self.indices.write().await;
        let idx = indices
            .entry(index.to_string())
            .or_insert_with(|| MemoryIndex::new(IndexSchema::new(1, 1)));

        Ok(idx.upsert(id, source.clone(), &self.tokenizer))
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Option<StoredDocument>> {
        let indices = self.indices.read().await;
        let document = indices
            .get(index)
            .and_then(|idx| idx.documents.get(id))
            .map(|source| StoredDocument {
                id: id.to_string(),
                source: source.clone(),
            });
        Ok(document)
    }

    async fn search(&self, index: &str, query: &MultiMatchQuery) -> Result<Vec<SearchHit>> {
        let indices = self.indices.read().await;
        let idx = indices
            .get(index)
            .ok_or_else(|| EngineError::IndexNotFound(index.to_string()))?;

        let terms = self.tokenizer.analyze(&query.query);
        if terms.is_empty() || query.size == 0 {
            return Ok(Vec::new());
        }

        let fields: Vec<WeightedField<'_>> = query
            .fields
            .iter()
            .filter_map(|f| {
                idx.fields.get(&f.field).map(|field_index| WeightedField {
                    index: field_index,
                    boost: f.boost,
                })
            })
            .collect();

        let hits = rank_documents(&terms, &fields)
            .into_iter()
            .take(query.size)
            .filter_map(|scored| {
                idx.documents.get(&scored.doc_id).map(|source| SearchHit {
                    id: scored.doc_id,
                    score: Some(scored.score),
                    source: source.clone(),
                })
            })
            .collect();

        Ok(hits)
    }
}
