//! Per-login access to one user's wishlist.
//!
//! Every mutation runs as "remote write, full re-read, publish snapshot" while
//! holding the session's writer lock, so a caller never sees a snapshot older
//! than its own write and two writers never interleave their re-reads.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use crate::{
    core::{
        errors::{WishlistError, WishlistResult},
        models::{ITEM_ID_FIELD, UserAccount, WishlistItem},
        paths::{item_document, items_collection, user_document},
    },
    storage::r#trait::DocumentStore,
};

/// Shared, read-only view of the cached items.
pub type Snapshot = Arc<Vec<WishlistItem>>;

/// The signed-in user a service instance is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    uid: String,
}

impl Session {
    pub fn new(uid: impl Into<String>) -> WishlistResult<Self> {
        let uid = uid.into();
        user_document(&uid)?;
        Ok(Self { uid })
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No read has completed yet.
    Unloaded,
    /// Matches the last completed read of the remote collection.
    Fresh,
    /// The last read failed; the items are from an earlier read.
    Stale,
}

struct Cache {
    items: Snapshot,
    state: CacheState,
}

pub struct WishlistService<S: DocumentStore> {
    store: S,
    session: Session,
    cache: RwLock<Cache>,
    writer: Mutex<()>,
}

fn require_id(item: &WishlistItem) -> WishlistResult<&str> {
    item.id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| WishlistError::invalid_argument("item has no identifier"))
}

impl<S: DocumentStore> WishlistService<S> {
    pub fn new(store: S, session: Session) -> Self {
        Self {
            store,
            session,
            cache: RwLock::new(Cache {
                items: Arc::new(Vec::new()),
                state: CacheState::Unloaded,
            }),
            writer: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn uid(&self) -> &str {
        self.session.uid()
    }

    /// Items as of the last completed refresh.
    pub async fn items(&self) -> Snapshot {
        Arc::clone(&self.cache.read().await.items)
    }

    pub async fn cache_state(&self) -> CacheState {
        self.cache.read().await.state
    }

    pub async fn refresh(&self) -> WishlistResult<Snapshot> {
        let _writer = self.writer.lock().await;
        self.reload().await
    }

    /// Stores a new item, writes the generated id back into it, then refreshes.
    pub async fn add_item(&self, item: WishlistItem) -> WishlistResult<WishlistItem> {
        if item.id.is_some() {
            return Err(WishlistError::invalid_argument(
                "new items must not carry an identifier",
            ));
        }
        let collection = items_collection(self.uid())?;
        let fields = item.to_fields()?;

        let _writer = self.writer.lock().await;
        let id = self
            .store
            .add_document(&collection, &fields)
            .await
            .inspect_err(|err| {
                tracing::warn!(uid = %self.uid(), error = %err, "adding item failed");
            })?;

        let path = collection.doc(&id)?;
        self.store
            .update_field(&path, ITEM_ID_FIELD, Value::String(id.clone()))
            .await
            .inspect_err(|err| {
                tracing::warn!(
                    uid = %self.uid(),
                    item_id = %id,
                    error = %err,
                    "writing generated id back failed"
                );
            })?;
        tracing::info!(uid = %self.uid(), item_id = %id, name = %item.name, "item added");

        self.reload_after_write().await?;
        Ok(item.with_id(id))
    }

    /// Overwrites an existing item of this wishlist, then refreshes.
    pub async fn edit_item(&self, item: &WishlistItem) -> WishlistResult<Snapshot> {
        let id = require_id(item)?;

        let _writer = self.writer.lock().await;
        let known = self
            .cache
            .read()
            .await
            .items
            .iter()
            .any(|cached| cached.id.as_deref() == Some(id));
        if !known {
            return Err(WishlistError::invalid_argument(format!(
                "item `{id}` is not part of this wishlist"
            )));
        }

        let path = item_document(self.uid(), id)?;
        if self.store.get_document(&path).await?.is_none() {
            tracing::warn!(uid = %self.uid(), item_id = %id, "edited item no longer exists");
            return Err(WishlistError::NotFound);
        }

        self.store
            .set_document(&path, &item.to_fields()?)
            .await
            .inspect_err(|err| {
                tracing::warn!(uid = %self.uid(), item_id = %id, error = %err, "updating item failed");
            })?;
        tracing::info!(uid = %self.uid(), item_id = %id, "item updated");

        self.reload_after_write().await
    }

    /// Removes an item, then refreshes. Removing an absent item succeeds.
    pub async fn delete_item(&self, item: &WishlistItem) -> WishlistResult<Snapshot> {
        let id = require_id(item)?;
        let path = item_document(self.uid(), id)?;

        let _writer = self.writer.lock().await;
        self.store
            .delete_document(&path)
            .await
            .inspect_err(|err| {
                tracing::warn!(uid = %self.uid(), item_id = %id, error = %err, "deleting item failed");
            })?;
        tracing::info!(uid = %self.uid(), item_id = %id, "item deleted");

        self.reload_after_write().await
    }

    pub async fn account(&self) -> WishlistResult<Option<UserAccount>> {
        self.store
            .get_document(&user_document(self.uid())?)
            .await?
            .map(UserAccount::from_document)
            .transpose()
    }

    async fn reload_after_write(&self) -> WishlistResult<Snapshot> {
        self.reload()
            .await
            .map_err(|err| WishlistError::RefreshFailed(Box::new(err)))
    }

    /// Full re-read of the collection. Callers hold the writer lock.
    async fn reload(&self) -> WishlistResult<Snapshot> {
        let collection = items_collection(self.uid())?;
        let documents = match self.store.get_collection(&collection).await {
            Ok(documents) => documents,
            Err(err) => {
                tracing::warn!(uid = %self.uid(), error = %err, "wishlist refresh failed; cache is stale");
                self.cache.write().await.state = CacheState::Stale;
                return Err(err);
            }
        };

        let mut items = Vec::with_capacity(documents.len());
        for document in documents {
            let document_id = document.id.clone();
            match WishlistItem::from_document(document) {
                Ok(item) => items.push(item),
                Err(err) => {
                    tracing::warn!(
                        uid = %self.uid(),
                        item_id = %document_id,
                        error = %err,
                        "skipping malformed wishlist document"
                    );
                }
            }
        }

        let snapshot = Arc::new(items);
        let mut cache = self.cache.write().await;
        cache.items = Arc::clone(&snapshot);
        cache.state = CacheState::Fresh;
        tracing::info!(uid = %self.uid(), count = snapshot.len(), "wishlist refreshed");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::{CacheState, Session, WishlistService};
    use crate::{
        core::{
            errors::WishlistError,
            models::WishlistItem,
            paths::{item_document, items_collection},
        },
        storage::{memory::MemoryDocumentStore, r#trait::DocumentStore},
    };

    fn service(store: &MemoryDocumentStore, uid: &str) -> WishlistService<MemoryDocumentStore> {
        WishlistService::new(store.clone(), Session::new(uid).expect("session"))
    }

    #[test]
    fn session_rejects_unusable_uids() {
        assert!(Session::new("").is_err());
        assert!(Session::new("a/b").is_err());
        assert_eq!(Session::new("u1").expect("session").uid(), "u1");
    }

    #[tokio::test]
    async fn add_assigns_store_id_and_refreshes() {
        let store = MemoryDocumentStore::new();
        let wishlist = service(&store, "u1");
        assert_eq!(wishlist.cache_state().await, CacheState::Unloaded);

        let added = wishlist
            .add_item(WishlistItem::new("Book"))
            .await
            .expect("add");
        let id = added.id.clone().expect("assigned id");

        let items = wishlist.items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Book");
        assert_eq!(items[0].id.as_deref(), Some(id.as_str()));
        assert_eq!(wishlist.cache_state().await, CacheState::Fresh);

        let stored = store
            .get_document(&item_document("u1", &id).expect("path"))
            .await
            .expect("get")
            .expect("stored");
        assert_eq!(stored.fields.get("id"), Some(&json!(id)));
    }

    #[tokio::test]
    async fn add_rejects_items_that_already_have_an_id() {
        let store = MemoryDocumentStore::new();
        let wishlist = service(&store, "u1");
        let result = wishlist
            .add_item(WishlistItem::new("Book").with_id("abc"))
            .await;
        assert!(matches!(result, Err(WishlistError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn edit_requires_an_id_from_this_wishlist() {
        let store = MemoryDocumentStore::new();
        let wishlist = service(&store, "u1");
        wishlist.refresh().await.expect("refresh");

        let missing_id = wishlist.edit_item(&WishlistItem::new("Kite")).await;
        assert!(matches!(missing_id, Err(WishlistError::InvalidArgument(_))));

        let foreign = wishlist
            .edit_item(&WishlistItem::new("Kite").with_id("someone-elses"))
            .await;
        assert!(matches!(foreign, Err(WishlistError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn edit_of_remotely_deleted_item_is_not_found() {
        let store = MemoryDocumentStore::new();
        let wishlist = service(&store, "u1");
        let added = wishlist
            .add_item(WishlistItem::new("Kite"))
            .await
            .expect("add");
        let id = added.id.clone().expect("id");

        store
            .delete_document(&item_document("u1", &id).expect("path"))
            .await
            .expect("remote delete");

        let result = wishlist.edit_item(&added).await;
        assert!(matches!(result, Err(WishlistError::NotFound)));
        assert_eq!(wishlist.items().await.len(), 1);
    }

    #[tokio::test]
    async fn edit_with_reserved_detail_keys_keeps_item_addressable() {
        let store = MemoryDocumentStore::new();
        let wishlist = service(&store, "u1");
        let added = wishlist
            .add_item(WishlistItem::new("Kite").with_detail("name", "Shadow"))
            .await
            .expect("add");
        let id = added.id.clone().expect("id");
        assert_eq!(wishlist.items().await[0].name, "Kite");

        let edited = added
            .clone()
            .with_detail("id", "bogus")
            .with_detail("color", "red");
        let items = wishlist.edit_item(&edited).await.expect("edit");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_deref(), Some(id.as_str()));
        assert_eq!(items[0].details.get("color"), Some(&json!("red")));

        let stored = store
            .get_document(&item_document("u1", &id).expect("path"))
            .await
            .expect("get")
            .expect("stored");
        assert_eq!(stored.fields.get("id"), Some(&json!(id)));

        let remaining = wishlist.delete_item(&items[0]).await.expect("delete");
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn delete_twice_is_idempotent() {
        let store = MemoryDocumentStore::new();
        let wishlist = service(&store, "u1");
        let added = wishlist
            .add_item(WishlistItem::new("Kite"))
            .await
            .expect("add");

        wishlist.delete_item(&added).await.expect("first delete");
        let items = wishlist.delete_item(&added).await.expect("second delete");
        assert!(items.iter().all(|item| item.id != added.id));
    }

    #[tokio::test]
    async fn refresh_matches_remote_set() {
        let store = MemoryDocumentStore::new();
        let items = items_collection("u1").expect("path");
        for (id, name) in [("b", "Bike"), ("a", "Apple"), ("c", "Camera")] {
            let mut fields = WishlistItem::new(name)
                .with_id(id)
                .to_fields()
                .expect("fields");
            fields.insert("price".to_owned(), json!(10));
            store
                .set_document(&items.doc(id).expect("path"), &fields)
                .await
                .expect("seed");
        }

        let wishlist = service(&store, "u1");
        let snapshot = wishlist.refresh().await.expect("refresh");
        let names = snapshot
            .iter()
            .map(|item| item.name.as_str())
            .collect::<HashSet<_>>();
        assert_eq!(names, HashSet::from(["Apple", "Bike", "Camera"]));
    }

    #[tokio::test]
    async fn account_record_is_read_from_user_document() {
        let store = MemoryDocumentStore::new();
        let wishlist = service(&store, "u1");
        assert!(wishlist.account().await.expect("read").is_none());

        store
            .set_document(
                &crate::core::paths::user_document("u1").expect("path"),
                &json!({"name": "alice"}).as_object().cloned().expect("object"),
            )
            .await
            .expect("seed");

        let account = wishlist.account().await.expect("read").expect("exists");
        assert_eq!(account.name, "alice");
        assert_eq!(account.id, "u1");
    }
}
