use crate::backend::{Result, SearchBackend};
use crate::schema::IndexSchema;

/// Whether provisioning had to create the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    AlreadyExists,
}

/// Create `index` with `schema` unless it already exists.
///
/// An existing index is left untouched, mappings included, so running this
/// on every startup is safe.
pub async fn ensure_index(
    backend: &dyn SearchBackend,
    index: &str,
    schema: &IndexSchema,
) -> Result<Provisioned> {
    if backend.index_exists(index).await? {
        tracing::info!(index, "index already exists");
        return Ok(Provisioned::AlreadyExists);
    }

    backend.create_index(index, schema).await?;
    tracing::info!(
        index,
        shards = schema.shards,
        replicas = schema.replicas,
        "created index"
    );
    Ok(Provisioned::Created)
}
