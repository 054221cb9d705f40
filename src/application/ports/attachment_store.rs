use bytes::Bytes;

use crate::domain::StoragePath;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredAttachment {
    pub storage_id: String,
    pub url: String,
    pub size_bytes: u64,
}

#[async_trait::async_trait]
pub trait AttachmentStore: Send + Sync {
    async fn store(
        &self,
        path: &StoragePath,
        data: Bytes,
    ) -> Result<StoredAttachment, AttachmentStoreError>;

    async fn fetch(&self, path: &StoragePath) -> Result<Bytes, AttachmentStoreError>;

    async fn delete(&self, path: &StoragePath) -> Result<(), AttachmentStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AttachmentStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
}
