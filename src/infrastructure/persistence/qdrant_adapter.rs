use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder,
    DeletePointsBuilder, Distance, FieldType, Filter, PointId, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder, VectorsConfig,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::ports::{
    CollectionConfig, PayloadFieldType, SearchResult, VectorMetadata,
    VectorRecord, VectorStore, VectorStoreError,
};
use crate::domain::{ChunkId, DocumentId, Embedding};
use crate::infrastructure::retry::RetryPolicy;

pub struct QdrantAdapter {
    client: Arc<Qdrant>,
    collection_name: String,
    search_retry: RetryPolicy,
}

impl QdrantAdapter {
    pub fn new(
        url: &str,
        api_key: Option<&str>,
        collection_name: String,
    ) -> Result<Self, VectorStoreError> {
        let mut builder = Qdrant::from_url(url);
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            builder = builder.api_key(key.to_string());
        }
        let client = builder
            .build()
            .map_err(|e| VectorStoreError::ConnectionFailed(e.to_string()))?;

        Ok(Self::with_client(Arc::new(client), collection_name))
    }

    pub fn with_client(client: Arc<Qdrant>, collection_name: String) -> Self {
        Self {
            client,
            collection_name,
            search_retry: RetryPolicy::default(),
        }
    }

    fn map_field_type(field_type: &PayloadFieldType) -> FieldType {
        match field_type {
            PayloadFieldType::Keyword => FieldType::Keyword,
            PayloadFieldType::Integer => FieldType::Integer,
        }
    }

    fn document_filter(document_id: DocumentId) -> Filter {
        Filter::must([Condition::matches(
            "document_id",
            document_id.as_uuid().to_string(),
        )])
    }

    fn to_point(record: &VectorRecord) -> Result<PointStruct, VectorStoreError> {
        let payload = Payload::try_from(json!({
            "text": record.metadata.text,
            "document_id": record.metadata.document_id.as_uuid().to_string(),
            "chunk_index": record.metadata.chunk_index,
            "filename": record.metadata.filename,
        }))
        .map_err(|e| VectorStoreError::UpsertFailed(e.to_string()))?;

        Ok(PointStruct::new(
            PointId::from(record.id.as_uuid().to_string()),
            record.embedding.values.clone(),
            payload,
        ))
    }

    async fn search_once(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(
                    &self.collection_name,
                    embedding.values.clone(),
                    top_k as u64,
                )
                .with_payload(true),
            )
            .await
            .map_err(|e| VectorStoreError::SearchFailed(e.to_string()))?;

        let results = response
            .result
            .into_iter()
            .filter_map(|point| {
                let payload = point.payload;

                let chunk_id = match point.id?.point_id_options? {
                    PointIdOptions::Uuid(uuid) => Uuid::parse_str(&uuid).ok()?,
                    PointIdOptions::Num(_) => return None,
                };
                let document_id = Uuid::parse_str(payload.get("document_id")?.as_str()?).ok()?;
                let text = payload.get("text")?.as_str()?.to_string();
                let filename = payload
                    .get("filename")
                    .and_then(|v| v.as_str())
                    .cloned()
                    .unwrap_or_default();
                let chunk_index = payload.get("chunk_index")?.as_integer()?;

                Some(SearchResult {
                    chunk_id: ChunkId::from_uuid(chunk_id),
                    score: point.score,
                    metadata: VectorMetadata {
                        text,
                        document_id: DocumentId::from_uuid(document_id),
                        chunk_index: u32::try_from(chunk_index).ok()?,
                        filename,
                    },
                })
            })
            .collect();

        Ok(results)
    }
}

#[async_trait]
impl VectorStore for QdrantAdapter {
    #[instrument(skip(self, config), fields(collection = %self.collection_name))]
    async fn create_collection(&self, config: &CollectionConfig) -> Result<bool, VectorStoreError> {
        if self.collection_exists().await? {
            info!(collection = %self.collection_name, "collection already exists");
            return Ok(false);
        }

        let vectors_config = VectorsConfig::from(VectorParamsBuilder::new(
            config.vector_dimensions,
            Distance::Cosine,
        ));

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection_name).vectors_config(vectors_config),
            )
            .await
            .map_err(|e| VectorStoreError::CollectionCreationFailed(e.to_string()))?;

        info!(collection = %self.collection_name, dimensions = config.vector_dimensions, "collection_created");

        for index in &config.payload_indexes {
            self.client
                .create_field_index(CreateFieldIndexCollectionBuilder::new(
                    &self.collection_name,
                    index.field_name,
                    Self::map_field_type(&index.field_type),
                ))
                .await
                .map_err(|e| VectorStoreError::PayloadIndexFailed(e.to_string()))?;

            info!(field = %index.field_name, "payload_index_applied");
        }

        Ok(true)
    }

    #[instrument(skip(self), fields(collection = %self.collection_name))]
    async fn collection_exists(&self) -> Result<bool, VectorStoreError> {
        self.client
            .collection_exists(&self.collection_name)
            .await
            .map_err(|e| VectorStoreError::ConnectionFailed(e.to_string()))
    }

    #[instrument(skip(self, records), fields(collection = %self.collection_name, count = records.len()))]
    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), VectorStoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let points = records
            .iter()
            .map(Self::to_point)
            .collect::<Result<Vec<_>, _>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection_name, points).wait(true))
            .await
            .map_err(|e| VectorStoreError::UpsertFailed(e.to_string()))?;

        info!(count = records.len(), "points_upserted");
        Ok(())
    }

    #[instrument(skip(self, embedding), fields(collection = %self.collection_name, top_k = top_k))]
    async fn search(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        self.search_retry
            .run("vector_search", || self.search_once(embedding, top_k))
            .await
    }

    #[instrument(skip(self), fields(collection = %self.collection_name, document_id = %document_id.as_uuid()))]
    async fn delete_by_document(&self, document_id: DocumentId) -> Result<(), VectorStoreError> {
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection_name)
                    .points(Self::document_filter(document_id))
                    .wait(true),
            )
            .await
            .map_err(|e| VectorStoreError::DeleteFailed(e.to_string()))?;

        info!("points_deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %self.collection_name))]
    async fn count(&self) -> Result<u64, VectorStoreError> {
        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection_name).exact(true))
            .await
            .map_err(|e| VectorStoreError::CountFailed(e.to_string()))?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }
}
