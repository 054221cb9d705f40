use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use super::pg_pool::map_sqlx_error;
use crate::application::ports::{DocumentRepository, RepositoryError};
use crate::domain::{Chunk, ChunkId, ContentType, Document, DocumentId};

#[derive(FromRow)]
struct DocumentRow {
    id: Uuid,
    filename: String,
    content_type: String,
    size_bytes: i64,
    total_chunks: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = RepositoryError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let content_type = ContentType::from_mime(&row.content_type).ok_or_else(|| {
            RepositoryError::CorruptRow(format!("unknown content type: {}", row.content_type))
        })?;

        Ok(Document {
            id: DocumentId::from_uuid(row.id),
            filename: row.filename,
            content_type,
            size_bytes: row.size_bytes.max(0) as u64,
            total_chunks: row.total_chunks.max(0) as u32,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct ChunkRow {
    id: Uuid,
    document_id: Uuid,
    chunk_index: i32,
    text: String,
    vector_id: Option<String>,
}

impl From<ChunkRow> for Chunk {
    fn from(row: ChunkRow) -> Self {
        Chunk {
            id: ChunkId::from_uuid(row.id),
            document_id: DocumentId::from_uuid(row.document_id),
            chunk_index: row.chunk_index.max(0) as u32,
            text: row.text,
            vector_id: row.vector_id,
        }
    }
}

pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    #[instrument(skip(self, document, chunks), fields(document_id = %document.id.as_uuid(), chunks = chunks.len()))]
    async fn create_document(
        &self,
        document: &Document,
        chunks: &[Chunk],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, filename, content_type, size_bytes, total_chunks, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(document.id.as_uuid())
        .bind(&document.filename)
        .bind(document.content_type.as_mime())
        .bind(document.size_bytes as i64)
        .bind(document.total_chunks as i32)
        .bind(document.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        for chunk in chunks {
            sqlx::query(
                r#"
                INSERT INTO chunks (id, document_id, chunk_index, text, vector_id)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(chunk.id.as_uuid())
            .bind(chunk.document_id.as_uuid())
            .bind(chunk.chunk_index as i32)
            .bind(&chunk.text)
            .bind(&chunk.vector_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    #[instrument(skip(self, chunk_ids), fields(count = chunk_ids.len()))]
    async fn confirm_vectors(&self, chunk_ids: &[ChunkId]) -> Result<(), RepositoryError> {
        let ids: Vec<Uuid> = chunk_ids.iter().map(|id| id.as_uuid()).collect();

        sqlx::query("UPDATE chunks SET vector_id = id::text WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(document_id = %id.as_uuid()))]
    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, filename, content_type, size_bytes, total_chunks, created_at
            FROM documents
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(Document::try_from).transpose()
    }

    #[instrument(skip(self), fields(document_id = %document_id.as_uuid()))]
    async fn get_chunks(&self, document_id: DocumentId) -> Result<Vec<Chunk>, RepositoryError> {
        let rows = sqlx::query_as::<_, ChunkRow>(
            r#"
            SELECT id, document_id, chunk_index, text, vector_id
            FROM chunks
            WHERE document_id = $1
            ORDER BY chunk_index ASC
            "#,
        )
        .bind(document_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Chunk::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_documents(&self) -> Result<Vec<Document>, RepositoryError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, filename, content_type, size_bytes, total_chunks, created_at
            FROM documents
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(Document::try_from).collect()
    }

    #[instrument(skip(self), fields(document_id = %id.as_uuid()))]
    async fn delete_document(&self, id: DocumentId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
