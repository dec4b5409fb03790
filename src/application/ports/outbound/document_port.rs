//! Document port - Interface to the host's document store
//!
//! The host runtime owns every persistent document (actors, class items,
//! roll tables). Services read and patch them through this port and never
//! see the storage behind it.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::domain::value_objects::DocumentRef;

/// A host document resolved across the boundary.
///
/// `data` is the host's own shape; services only read the properties they
/// were told about and pass the rest through untouched.
#[derive(Debug, Clone)]
pub struct HostDocument {
    pub reference: DocumentRef,
    pub name: String,
    pub data: Value,
}

impl HostDocument {
    pub fn new(reference: DocumentRef, name: impl Into<String>, data: Value) -> Self {
        Self {
            reference,
            name: name.into(),
            data,
        }
    }
}

/// One document patch inside a batched update.
#[derive(Debug, Clone)]
pub struct DocumentUpdate {
    pub reference: DocumentRef,
    pub patch: Value,
}

impl DocumentUpdate {
    pub fn new(reference: DocumentRef, patch: Value) -> Self {
        Self { reference, patch }
    }
}

/// Port for reading and updating host documents
///
/// Updates are partial: the patch only names the properties being changed.
/// A batch handed to [`DocumentPort::update_documents`] is one persistence
/// round trip; callers rely on that when a state change spans documents.
#[async_trait]
pub trait DocumentPort: Send + Sync {
    /// Apply a partial update to a single document.
    async fn update_document(&self, reference: &DocumentRef, patch: Value) -> Result<()>;

    /// Apply several partial updates in one round trip.
    async fn update_documents(&self, updates: &[DocumentUpdate]) -> Result<()>;

    /// Resolve a reference to the document behind it, if it still exists.
    async fn resolve_reference(&self, reference: &str) -> Result<Option<HostDocument>>;

    /// Read a single property off a document by dotted path.
    ///
    /// Returns `Ok(None)` when the document or the path does not resolve.
    async fn read_property(&self, reference: &DocumentRef, path: &str) -> Result<Option<Value>>;
}
