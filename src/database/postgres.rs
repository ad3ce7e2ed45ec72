use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::database::filter::Filter;
use crate::database::manager::DatabaseError;
use crate::database::store::{validate_identifier, Document, DocumentStore, StoredDocument};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        id UUID PRIMARY KEY,
        seq BIGSERIAL NOT NULL,
        collection TEXT NOT NULL,
        body JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents (collection, seq)",
];

/// PostgreSQL `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

/// Document store over a single JSONB table.
///
/// Filters compile to `body @> $fields` so every lookup stays one statement;
/// updates merge with `body || $set`.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    fn row_to_document(row: PgRow) -> Result<StoredDocument, DatabaseError> {
        let id: Uuid = row.try_get("id")?;
        let Json(body): Json<Document> = row.try_get("body")?;
        Ok(StoredDocument { id, body })
    }
}

fn map_write_error(collection: &str, err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return DatabaseError::Conflict(collection.to_string());
        }
    }
    DatabaseError::Sqlx(err)
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), DatabaseError> {
        validate_identifier(collection)?;
        validate_identifier(field)?;

        // Identifiers are validated above; DDL cannot take bind parameters.
        let sql = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS documents_{collection}_{field}_key \
             ON documents ((body->>'{field}')) WHERE collection = '{collection}'"
        );
        sqlx::query(&sql).execute(&self.pool).await?;

        info!("Ensured unique index on {}.{}", collection, field);
        Ok(())
    }

    async fn insert(&self, collection: &str, body: Document) -> Result<StoredDocument, DatabaseError> {
        let row = sqlx::query(
            "INSERT INTO documents (id, collection, body) VALUES ($1, $2, $3) RETURNING id, body",
        )
        .bind(Uuid::new_v4())
        .bind(collection)
        .bind(Json(&body))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(collection, e))?;

        Self::row_to_document(row)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<StoredDocument>, DatabaseError> {
        let row = sqlx::query(
            "SELECT id, body FROM documents \
             WHERE collection = $1 AND ($2::uuid IS NULL OR id = $2) AND body @> $3 \
             ORDER BY seq LIMIT 1",
        )
        .bind(collection)
        .bind(filter.id)
        .bind(Json(&filter.fields))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT id, body FROM documents \
             WHERE collection = $1 AND ($2::uuid IS NULL OR id = $2) AND body @> $3 \
             ORDER BY seq",
        )
        .bind(collection)
        .bind(filter.id)
        .bind(Json(&filter.fields))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_document).collect()
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<Option<StoredDocument>, DatabaseError> {
        let row = sqlx::query(
            "UPDATE documents SET body = body || $4, updated_at = now() \
             WHERE id = ( \
                 SELECT id FROM documents \
                 WHERE collection = $1 AND ($2::uuid IS NULL OR id = $2) AND body @> $3 \
                 ORDER BY seq LIMIT 1 \
             ) \
             RETURNING id, body",
        )
        .bind(collection)
        .bind(filter.id)
        .bind(Json(&filter.fields))
        .bind(Json(&set))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(collection, e))?;

        row.map(Self::row_to_document).transpose()
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM documents WHERE id = ( \
                 SELECT id FROM documents \
                 WHERE collection = $1 AND ($2::uuid IS NULL OR id = $2) AND body @> $3 \
                 ORDER BY seq LIMIT 1 \
             )",
        )
        .bind(collection)
        .bind(filter.id)
        .bind(Json(&filter.fields))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM documents \
             WHERE collection = $1 AND ($2::uuid IS NULL OR id = $2) AND body @> $3",
        )
        .bind(collection)
        .bind(filter.id)
        .bind(Json(&filter.fields))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents \
             WHERE collection = $1 AND ($2::uuid IS NULL OR id = $2) AND body @> $3",
        )
        .bind(collection)
        .bind(filter.id)
        .bind(Json(&filter.fields))
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed PostgreSQL connection pool");
    }
}
