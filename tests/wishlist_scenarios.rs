use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::{Value, json};

use wishlist::{
    auth::{
        identity::{Argon2Cost, LocalIdentityProvider},
        session_store::MemorySessionStore,
    },
    core::{
        client::WishlistClient,
        errors::{WishlistError, WishlistResult},
        models::{Document, Fields, WishlistItem},
        paths::{CollectionPath, DocumentPath, items_collection, user_document},
        service::CacheState,
    },
    storage::{memory::MemoryDocumentStore, r#trait::DocumentStore},
};

/// Memory store whose individual operations can be switched to fail.
#[derive(Clone, Default)]
struct FlakyStore {
    inner: MemoryDocumentStore,
    fail_set: Arc<AtomicBool>,
    fail_update: Arc<AtomicBool>,
    fail_collection: Arc<AtomicBool>,
}

impl FlakyStore {
    fn check(flag: &AtomicBool) -> WishlistResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(WishlistError::RequestFailed);
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn init(&self) -> WishlistResult<()> {
        self.inner.init().await
    }

    async fn get_document(&self, path: &DocumentPath) -> WishlistResult<Option<Document>> {
        self.inner.get_document(path).await
    }

    async fn set_document(&self, path: &DocumentPath, fields: &Fields) -> WishlistResult<()> {
        Self::check(&self.fail_set)?;
        self.inner.set_document(path, fields).await
    }

    async fn update_field(
        &self,
        path: &DocumentPath,
        key: &str,
        value: Value,
    ) -> WishlistResult<()> {
        Self::check(&self.fail_update)?;
        self.inner.update_field(path, key, value).await
    }

    async fn add_document(
        &self,
        collection: &CollectionPath,
        fields: &Fields,
    ) -> WishlistResult<String> {
        self.inner.add_document(collection, fields).await
    }

    async fn delete_document(&self, path: &DocumentPath) -> WishlistResult<()> {
        self.inner.delete_document(path).await
    }

    async fn get_collection(&self, collection: &CollectionPath) -> WishlistResult<Vec<Document>> {
        Self::check(&self.fail_collection)?;
        self.inner.get_collection(collection).await
    }
}

type Client<S> = WishlistClient<S, LocalIdentityProvider<S, MemorySessionStore>>;

fn client_over<S: DocumentStore + Clone>(store: S) -> Client<S> {
    let identity = LocalIdentityProvider::with_cost(
        store.clone(),
        MemorySessionStore::default(),
        Argon2Cost {
            m_cost: 1024,
            t_cost: 1,
            p_cost: 1,
        },
    );
    WishlistClient::new(store, identity)
}

fn secret(value: &str) -> SecretString {
    SecretString::new(value.to_owned().into_boxed_str())
}

#[tokio::test]
async fn alice_adds_edits_and_deletes_a_kite() -> WishlistResult<()> {
    let store = MemoryDocumentStore::new();
    let client = client_over(store.clone());

    let service = client.sign_up("alice", "a@x.com", &secret("secret1")).await?;
    let uid = service.uid().to_owned();
    let record = store
        .get_document(&user_document(&uid)?)
        .await?
        .ok_or(WishlistError::NotFound)?;
    assert_eq!(record.fields.get("name"), Some(&json!("alice")));

    let kite = client.add_item(WishlistItem::new("Kite")).await?;
    let generated = kite.id.clone().ok_or(WishlistError::NotFound)?;
    let items = client.items().await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Kite");
    assert_eq!(items[0].id.as_deref(), Some(generated.as_str()));

    let renamed = WishlistItem::new("Kite v2").with_id(generated.clone());
    let items = client.edit_item(&renamed).await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Kite v2");
    assert_eq!(items[0].id.as_deref(), Some(generated.as_str()));

    let items = client.delete_item(&renamed).await?;
    assert!(items.is_empty());
    assert!(client.items().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn add_round_trip_uses_store_assigned_id() -> WishlistResult<()> {
    let store = MemoryDocumentStore::new();
    let client = client_over(store.clone());
    let service = client.sign_up("bob", "b@x.com", &secret("secret1")).await?;

    let book = client
        .add_item(WishlistItem::new("Book").with_detail("price", 12.5))
        .await?;
    let id = book.id.clone().ok_or(WishlistError::NotFound)?;

    let remote = store.get_collection(&items_collection(service.uid())?).await?;
    assert_eq!(remote.len(), 1);
    assert_eq!(remote[0].id, id);
    assert_eq!(remote[0].fields.get("id"), Some(&json!(id)));

    let cached = client.items().await?;
    let books = cached
        .iter()
        .filter(|item| item.name == "Book")
        .collect::<Vec<_>>();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id.as_deref(), Some(id.as_str()));
    assert_eq!(books[0].details.get("price"), Some(&json!(12.5)));
    Ok(())
}

#[tokio::test]
async fn cache_equals_remote_set_after_refresh() -> WishlistResult<()> {
    let store = MemoryDocumentStore::new();
    let client = client_over(store.clone());
    let service = client.sign_up("carol", "c@x.com", &secret("secret1")).await?;

    for name in ["Lamp", "Desk", "Chair"] {
        client.add_item(WishlistItem::new(name)).await?;
    }

    // A write from another device lands behind the cache's back.
    let collection = items_collection(service.uid())?;
    store
        .set_document(
            &collection.doc("external")?,
            &WishlistItem::new("Rug").with_id("external").to_fields()?,
        )
        .await?;

    let snapshot = client.refresh().await?;
    let cached = snapshot
        .iter()
        .filter_map(|item| item.id.clone())
        .collect::<HashSet<_>>();
    let remote = store
        .get_collection(&collection)
        .await?
        .into_iter()
        .map(|document| document.id)
        .collect::<HashSet<_>>();
    assert_eq!(cached, remote);
    assert_eq!(cached.len(), 4);
    Ok(())
}

#[tokio::test]
async fn new_session_never_sees_previous_users_items() -> WishlistResult<()> {
    let store = MemoryDocumentStore::new();
    let client = client_over(store.clone());

    let first = client.sign_up("dave", "d@x.com", &secret("secret1")).await?;
    client.add_item(WishlistItem::new("Drone")).await?;
    client.sign_out().await?;
    assert!(matches!(
        client.items().await,
        Err(WishlistError::NoActiveSession)
    ));

    let second = client.sign_up("erin", "e@x.com", &secret("secret1")).await?;
    assert_ne!(first.uid(), second.uid());
    assert!(client.items().await?.is_empty());

    client.sign_out().await?;
    client.sign_in("d@x.com", &secret("secret1")).await?;
    let items = client.items().await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Drone");
    Ok(())
}

#[tokio::test]
async fn failed_edit_write_leaves_cache_untouched() -> WishlistResult<()> {
    let store = FlakyStore::default();
    let client = client_over(store.clone());
    client.sign_up("frank", "f@x.com", &secret("secret1")).await?;
    let added = client.add_item(WishlistItem::new("Guitar")).await?;
    let before = client.items().await?;

    store.fail_set.store(true, Ordering::SeqCst);
    let id = added.id.clone().ok_or(WishlistError::NotFound)?;
    let result = client
        .edit_item(&WishlistItem::new("Bass").with_id(id))
        .await;
    assert!(matches!(result, Err(WishlistError::RequestFailed)));

    let after = client.items().await?;
    assert_eq!(*before, *after);
    assert_eq!(client.service().await?.cache_state().await, CacheState::Fresh);
    Ok(())
}

#[tokio::test]
async fn failed_id_write_back_skips_refresh() -> WishlistResult<()> {
    let store = FlakyStore::default();
    let client = client_over(store.clone());
    client.sign_up("gina", "g@x.com", &secret("secret1")).await?;

    store.fail_update.store(true, Ordering::SeqCst);
    let result = client.add_item(WishlistItem::new("Tent")).await;
    assert!(matches!(result, Err(WishlistError::RequestFailed)));
    assert!(client.items().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn refresh_failure_is_reported_and_keeps_previous_items() -> WishlistResult<()> {
    let store = FlakyStore::default();
    let client = client_over(store.clone());
    client.sign_up("hank", "h@x.com", &secret("secret1")).await?;
    client.add_item(WishlistItem::new("Boots")).await?;

    store.fail_collection.store(true, Ordering::SeqCst);
    let result = client.add_item(WishlistItem::new("Jacket")).await;
    let Err(err) = result else {
        panic!("refresh failure must surface");
    };
    assert!(err.is_stale_cache());

    let service = client.service().await?;
    assert_eq!(service.cache_state().await, CacheState::Stale);
    let items = service.items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Boots");

    store.fail_collection.store(false, Ordering::SeqCst);
    let items = client.refresh().await?;
    assert_eq!(items.len(), 2);
    assert_eq!(service.cache_state().await, CacheState::Fresh);
    Ok(())
}

#[tokio::test]
async fn concurrent_adds_on_one_session_all_land() -> WishlistResult<()> {
    let store = MemoryDocumentStore::new();
    let client = Arc::new(client_over(store.clone()));
    let service = client.sign_up("ivy", "i@x.com", &secret("secret1")).await?;

    let mut tasks = Vec::new();
    for index in 0..8 {
        let service = Arc::clone(&service);
        tasks.push(tokio::spawn(async move {
            service
                .add_item(WishlistItem::new(format!("item-{index}")))
                .await
        }));
    }
    for task in tasks {
        task.await.map_err(|_| WishlistError::RequestFailed)??;
    }

    let cached = service
        .items()
        .await
        .iter()
        .map(|item| item.name.clone())
        .collect::<HashSet<_>>();
    assert_eq!(cached.len(), 8);
    assert_eq!(
        store
            .get_collection(&items_collection(service.uid())?)
            .await?
            .len(),
        8
    );
    Ok(())
}
