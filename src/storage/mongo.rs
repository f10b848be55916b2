use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Client, Collection, IndexModel,
    bson::{self, Document as BsonDocument, doc},
    options::{ClientOptions, IndexOptions},
};
use serde_json::Value;

use crate::core::{
    errors::{WishlistError, WishlistResult},
    models::{Document, Fields},
    paths::{CollectionPath, DocumentPath, generate_document_id},
};
use crate::storage::r#trait::DocumentStore;

const SCHEMA_VERSION: i64 = 1;

#[derive(Clone)]
pub struct MongoDocumentStore {
    documents: Collection<BsonDocument>,
    metadata: Collection<BsonDocument>,
}

impl MongoDocumentStore {
    pub async fn connect(database_url: &str) -> WishlistResult<Self> {
        let mut options = ClientOptions::parse(database_url).await?;
        if options.default_database.is_none() {
            options.default_database = Some("wishlist".to_owned());
        }

        let client = Client::with_options(options)?;
        let database = client
            .default_database()
            .ok_or_else(|| WishlistError::Config("missing mongo database name".to_owned()))?;

        Ok(Self {
            documents: database.collection("documents"),
            metadata: database.collection("metadata"),
        })
    }

    fn to_record(path: &DocumentPath, fields: &Fields) -> WishlistResult<BsonDocument> {
        Ok(doc! {
            "path": path.canonical_string(),
            "collection": path.parent().canonical_string(),
            "doc_id": path.id(),
            "fields": bson::to_document(fields)?,
        })
    }

    fn from_record(record: BsonDocument) -> WishlistResult<Document> {
        let id = record
            .get_str("doc_id")
            .map_err(|_| WishlistError::Serialization)?
            .to_owned();
        let body = record
            .get_document("fields")
            .map_err(|_| WishlistError::Serialization)?
            .clone();

        Ok(Document {
            id,
            fields: bson::from_document::<Fields>(body)?,
        })
    }

    fn field_key(key: &str) -> WishlistResult<String> {
        if key.is_empty() || key.contains('.') || key.starts_with('$') {
            return Err(WishlistError::invalid_argument(format!(
                "field name `{key}` cannot be stored"
            )));
        }
        Ok(format!("fields.{key}"))
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn init(&self) -> WishlistResult<()> {
        let unique_path = IndexModel::builder()
            .keys(doc! { "path": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.documents.create_index(unique_path).await?;

        let by_collection = IndexModel::builder()
            .keys(doc! { "collection": 1, "doc_id": 1 })
            .build();
        self.documents.create_index(by_collection).await?;

        self.metadata
            .update_one(
                doc! { "_id": "schema" },
                doc! { "$set": { "version": SCHEMA_VERSION } },
            )
            .upsert(true)
            .await?;

        Ok(())
    }

    async fn get_document(&self, path: &DocumentPath) -> WishlistResult<Option<Document>> {
        self.documents
            .find_one(doc! { "path": path.canonical_string() })
            .await?
            .map(Self::from_record)
            .transpose()
    }

    async fn set_document(&self, path: &DocumentPath, fields: &Fields) -> WishlistResult<()> {
        self.documents
            .replace_one(
                doc! { "path": path.canonical_string() },
                Self::to_record(path, fields)?,
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn update_field(
        &self,
        path: &DocumentPath,
        key: &str,
        value: Value,
    ) -> WishlistResult<()> {
        let mut set = BsonDocument::new();
        set.insert(Self::field_key(key)?, bson::to_bson(&value)?);

        let result = self
            .documents
            .update_one(doc! { "path": path.canonical_string() }, doc! { "$set": set })
            .await?;

        if result.matched_count == 0 {
            return Err(WishlistError::NotFound);
        }
        Ok(())
    }

    async fn add_document(
        &self,
        collection: &CollectionPath,
        fields: &Fields,
    ) -> WishlistResult<String> {
        let id = generate_document_id();
        let path = collection.doc(&id)?;
        self.documents
            .insert_one(Self::to_record(&path, fields)?)
            .await?;
        Ok(id)
    }

    async fn delete_document(&self, path: &DocumentPath) -> WishlistResult<()> {
        self.documents
            .delete_one(doc! { "path": path.canonical_string() })
            .await?;
        Ok(())
    }

    async fn get_collection(&self, collection: &CollectionPath) -> WishlistResult<Vec<Document>> {
        let mut cursor = self
            .documents
            .find(doc! { "collection": collection.canonical_string() })
            .sort(doc! { "doc_id": 1 })
            .await?;

        let mut out = Vec::new();
        while let Some(record) = cursor.try_next().await? {
            out.push(Self::from_record(record)?);
        }
        Ok(out)
    }
}
