use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};

use crate::core::{
    errors::{WishlistError, WishlistResult},
    models::{Document, Fields},
    paths::{CollectionPath, DocumentPath, generate_document_id},
};
use crate::storage::r#trait::DocumentStore;

const SCHEMA_VERSION: i64 = 1;

#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub async fn connect(database_url: &str) -> WishlistResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    fn decode_fields(text: &str) -> WishlistResult<Fields> {
        Ok(serde_json::from_str(text)?)
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn init(&self) -> WishlistResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_meta (
                id INTEGER PRIMARY KEY,
                schema_version BIGINT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "INSERT INTO schema_meta (id, schema_version)
             VALUES (1, $1)
             ON CONFLICT(id) DO UPDATE SET schema_version = EXCLUDED.schema_version",
        )
        .bind(SCHEMA_VERSION)
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                path TEXT PRIMARY KEY,
                collection TEXT NOT NULL,
                doc_id TEXT NOT NULL,
                fields TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS documents_by_collection ON documents (collection, doc_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_document(&self, path: &DocumentPath) -> WishlistResult<Option<Document>> {
        let row = sqlx::query("SELECT doc_id, fields FROM documents WHERE path = $1")
            .bind(path.canonical_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| {
            let fields_text: String = r.try_get("fields")?;
            Ok(Document {
                id: r.try_get("doc_id")?,
                fields: Self::decode_fields(&fields_text)?,
            })
        })
        .transpose()
    }

    async fn set_document(&self, path: &DocumentPath, fields: &Fields) -> WishlistResult<()> {
        sqlx::query(
            "INSERT INTO documents (path, collection, doc_id, fields)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT(path) DO UPDATE SET fields = EXCLUDED.fields",
        )
        .bind(path.canonical_string())
        .bind(path.parent().canonical_string())
        .bind(path.id())
        .bind(serde_json::to_string(fields)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_field(
        &self,
        path: &DocumentPath,
        key: &str,
        value: Value,
    ) -> WishlistResult<()> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT fields FROM documents WHERE path = $1 FOR UPDATE")
            .bind(path.canonical_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(WishlistError::NotFound)?;
        let fields_text: String = row.try_get("fields")?;
        let mut fields = Self::decode_fields(&fields_text)?;
        fields.insert(key.to_owned(), value);

        sqlx::query("UPDATE documents SET fields = $1 WHERE path = $2")
            .bind(serde_json::to_string(&fields)?)
            .bind(path.canonical_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn add_document(
        &self,
        collection: &CollectionPath,
        fields: &Fields,
    ) -> WishlistResult<String> {
        let id = generate_document_id();
        let path = collection.doc(&id)?;

        sqlx::query(
            "INSERT INTO documents (path, collection, doc_id, fields) VALUES ($1, $2, $3, $4)",
        )
        .bind(path.canonical_string())
        .bind(collection.canonical_string())
        .bind(&id)
        .bind(serde_json::to_string(fields)?)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn delete_document(&self, path: &DocumentPath) -> WishlistResult<()> {
        sqlx::query("DELETE FROM documents WHERE path = $1")
            .bind(path.canonical_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_collection(&self, collection: &CollectionPath) -> WishlistResult<Vec<Document>> {
        let rows = sqlx::query(
            "SELECT doc_id, fields FROM documents WHERE collection = $1 ORDER BY doc_id",
        )
        .bind(collection.canonical_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let fields_text: String = row.try_get("fields")?;
                Ok(Document {
                    id: row.try_get("doc_id")?,
                    fields: Self::decode_fields(&fields_text)?,
                })
            })
            .collect::<Result<Vec<_>, WishlistError>>()
    }
}
