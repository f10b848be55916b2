use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::core::{
    errors::{WishlistError, WishlistResult},
    models::{Document, Fields},
    paths::{CollectionPath, DocumentPath, generate_document_id},
};
use crate::storage::r#trait::DocumentStore;

type Collections = BTreeMap<String, BTreeMap<String, Fields>>;

/// Process-local store. Collections list their documents in id order, like
/// the hosted document stores do.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn document_count(&self, collection: &CollectionPath) -> usize {
        self.collections
            .read()
            .await
            .get(&collection.canonical_string())
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn init(&self) -> WishlistResult<()> {
        Ok(())
    }

    async fn get_document(&self, path: &DocumentPath) -> WishlistResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&path.parent().canonical_string())
            .and_then(|documents| documents.get(path.id()))
            .map(|fields| Document {
                id: path.id().to_owned(),
                fields: fields.clone(),
            }))
    }

    async fn set_document(&self, path: &DocumentPath, fields: &Fields) -> WishlistResult<()> {
        self.collections
            .write()
            .await
            .entry(path.parent().canonical_string())
            .or_default()
            .insert(path.id().to_owned(), fields.clone());
        Ok(())
    }

    async fn update_field(
        &self,
        path: &DocumentPath,
        key: &str,
        value: Value,
    ) -> WishlistResult<()> {
        let mut collections = self.collections.write().await;
        let fields = collections
            .get_mut(&path.parent().canonical_string())
            .and_then(|documents| documents.get_mut(path.id()))
            .ok_or(WishlistError::NotFound)?;
        fields.insert(key.to_owned(), value);
        Ok(())
    }

    async fn add_document(
        &self,
        collection: &CollectionPath,
        fields: &Fields,
    ) -> WishlistResult<String> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.canonical_string()).or_default();

        let mut id = generate_document_id();
        while documents.contains_key(&id) {
            id = generate_document_id();
        }
        documents.insert(id.clone(), fields.clone());
        Ok(id)
    }

    async fn delete_document(&self, path: &DocumentPath) -> WishlistResult<()> {
        let mut collections = self.collections.write().await;
        if let Some(documents) = collections.get_mut(&path.parent().canonical_string()) {
            documents.remove(path.id());
        }
        Ok(())
    }

    async fn get_collection(&self, collection: &CollectionPath) -> WishlistResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection.canonical_string())
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::MemoryDocumentStore;
    use crate::core::{
        errors::WishlistError,
        models::Fields,
        paths::{item_document, items_collection},
    };
    use crate::storage::r#trait::DocumentStore;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().expect("object")
    }

    #[tokio::test]
    async fn add_then_update_writes_generated_id_back() {
        let store = MemoryDocumentStore::new();
        let items = items_collection("u1").expect("path");

        let id = store
            .add_document(&items, &fields(json!({"name": "Kite"})))
            .await
            .expect("add");
        let path = items.doc(&id).expect("path");
        store
            .update_field(&path, "id", json!(id))
            .await
            .expect("update");

        let document = store.get_document(&path).await.expect("get").expect("exists");
        assert_eq!(document.fields.get("id"), Some(&json!(id)));
        assert_eq!(store.document_count(&items).await, 1);
    }

    #[tokio::test]
    async fn update_field_on_missing_document_is_not_found() {
        let store = MemoryDocumentStore::new();
        let path = item_document("u1", "missing").expect("path");
        let result = store.update_field(&path, "id", json!("missing")).await;
        assert!(matches!(result, Err(WishlistError::NotFound)));
    }

    #[tokio::test]
    async fn delete_missing_document_is_a_no_op() {
        let store = MemoryDocumentStore::new();
        let path = item_document("u1", "missing").expect("path");
        store.delete_document(&path).await.expect("first delete");
        store.delete_document(&path).await.expect("second delete");
    }

    #[tokio::test]
    async fn collections_are_isolated_per_user() {
        let store = MemoryDocumentStore::new();
        store
            .set_document(
                &item_document("u1", "a").expect("path"),
                &fields(json!({"name": "A", "id": "a"})),
            )
            .await
            .expect("set");

        let other = store
            .get_collection(&items_collection("u2").expect("path"))
            .await
            .expect("list");
        assert!(other.is_empty());
    }
}
