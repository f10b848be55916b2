use async_trait::async_trait;
use serde_json::Value;

use crate::core::{
    errors::WishlistResult,
    models::{Document, Fields},
    paths::{CollectionPath, DocumentPath},
};

/// Asynchronous key-document store addressed by collection/document paths.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn init(&self) -> WishlistResult<()>;

    async fn get_document(&self, path: &DocumentPath) -> WishlistResult<Option<Document>>;

    /// Creates or fully overwrites the document.
    async fn set_document(&self, path: &DocumentPath, fields: &Fields) -> WishlistResult<()>;

    /// Sets a single top-level field. Fails with `NotFound` when the document is absent.
    async fn update_field(&self, path: &DocumentPath, key: &str, value: Value)
    -> WishlistResult<()>;

    /// Stores a new document under a generated id and returns that id.
    async fn add_document(
        &self,
        collection: &CollectionPath,
        fields: &Fields,
    ) -> WishlistResult<String>;

    /// Removing an absent document succeeds.
    async fn delete_document(&self, path: &DocumentPath) -> WishlistResult<()>;

    async fn get_collection(&self, collection: &CollectionPath) -> WishlistResult<Vec<Document>>;
}
