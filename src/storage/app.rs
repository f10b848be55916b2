use async_trait::async_trait;
use serde_json::Value;

use crate::{
    core::{
        errors::{WishlistError, WishlistResult},
        models::{Document, Fields},
        paths::{CollectionPath, DocumentPath},
    },
    storage::{
        memory::MemoryDocumentStore,
        mongo::MongoDocumentStore,
        postgres::PostgresDocumentStore,
        r#trait::DocumentStore,
        sqlite::SqliteDocumentStore,
    },
};

pub const SUPPORTED_BACKENDS: [&str; 4] = ["memory", "sqlite", "postgres", "mongo"];

#[derive(Clone)]
pub enum AppStore {
    Memory(MemoryDocumentStore),
    Sqlite(SqliteDocumentStore),
    Postgres(PostgresDocumentStore),
    Mongo(MongoDocumentStore),
}

impl AppStore {
    pub async fn connect(backend: &str, database_url: &str) -> WishlistResult<Self> {
        match backend {
            "memory" => Ok(Self::Memory(MemoryDocumentStore::new())),
            "sqlite" => Ok(Self::Sqlite(SqliteDocumentStore::connect(database_url).await?)),
            "postgres" => Ok(Self::Postgres(PostgresDocumentStore::connect(database_url).await?)),
            "mongo" => Ok(Self::Mongo(MongoDocumentStore::connect(database_url).await?)),
            other => Err(WishlistError::UnsupportedBackend(other.to_owned())),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            AppStore::Memory(_) => "memory",
            AppStore::Sqlite(_) => "sqlite",
            AppStore::Postgres(_) => "postgres",
            AppStore::Mongo(_) => "mongo",
        }
    }
}

#[async_trait]
impl DocumentStore for AppStore {
    async fn init(&self) -> WishlistResult<()> {
        match self {
            AppStore::Memory(store) => store.init().await,
            AppStore::Sqlite(store) => store.init().await,
            AppStore::Postgres(store) => store.init().await,
            AppStore::Mongo(store) => store.init().await,
        }
    }

    async fn get_document(&self, path: &DocumentPath) -> WishlistResult<Option<Document>> {
        match self {
            AppStore::Memory(store) => store.get_document(path).await,
            AppStore::Sqlite(store) => store.get_document(path).await,
            AppStore::Postgres(store) => store.get_document(path).await,
            AppStore::Mongo(store) => store.get_document(path).await,
        }
    }

    async fn set_document(&self, path: &DocumentPath, fields: &Fields) -> WishlistResult<()> {
        match self {
            AppStore::Memory(store) => store.set_document(path, fields).await,
            AppStore::Sqlite(store) => store.set_document(path, fields).await,
            AppStore::Postgres(store) => store.set_document(path, fields).await,
            AppStore::Mongo(store) => store.set_document(path, fields).await,
        }
    }

    async fn update_field(
        &self,
        path: &DocumentPath,
        key: &str,
        value: Value,
    ) -> WishlistResult<()> {
        match self {
            AppStore::Memory(store) => store.update_field(path, key, value).await,
            AppStore::Sqlite(store) => store.update_field(path, key, value).await,
            AppStore::Postgres(store) => store.update_field(path, key, value).await,
            AppStore::Mongo(store) => store.update_field(path, key, value).await,
        }
    }

    async fn add_document(
        &self,
        collection: &CollectionPath,
        fields: &Fields,
    ) -> WishlistResult<String> {
        match self {
            AppStore::Memory(store) => store.add_document(collection, fields).await,
            AppStore::Sqlite(store) => store.add_document(collection, fields).await,
            AppStore::Postgres(store) => store.add_document(collection, fields).await,
            AppStore::Mongo(store) => store.add_document(collection, fields).await,
        }
    }

    async fn delete_document(&self, path: &DocumentPath) -> WishlistResult<()> {
        match self {
            AppStore::Memory(store) => store.delete_document(path).await,
            AppStore::Sqlite(store) => store.delete_document(path).await,
            AppStore::Postgres(store) => store.delete_document(path).await,
            AppStore::Mongo(store) => store.delete_document(path).await,
        }
    }

    async fn get_collection(&self, collection: &CollectionPath) -> WishlistResult<Vec<Document>> {
        match self {
            AppStore::Memory(store) => store.get_collection(collection).await,
            AppStore::Sqlite(store) => store.get_collection(collection).await,
            AppStore::Postgres(store) => store.get_collection(collection).await,
            AppStore::Mongo(store) => store.get_collection(collection).await,
        }
    }
}
