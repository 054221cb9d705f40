use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{AttachmentStore, AttachmentStoreError, StoredAttachment};
use crate::domain::StoragePath;

/// Attachment storage over any `object_store` backend. Objects are published
/// under `public_base_url` joined with their key.
pub struct ObjectAttachmentStore {
    inner: Arc<dyn ObjectStore>,
    public_base_url: String,
}

impl ObjectAttachmentStore {
    pub fn new(inner: Arc<dyn ObjectStore>, public_base_url: &str) -> Self {
        Self {
            inner,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn local(base_path: PathBuf, public_base_url: &str) -> Result<Self, AttachmentStoreError> {
        std::fs::create_dir_all(&base_path)
            .map_err(|e| AttachmentStoreError::UploadFailed(e.to_string()))?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| AttachmentStoreError::UploadFailed(e.to_string()))?;
        Ok(Self::new(Arc::new(fs), public_base_url))
    }

    pub fn in_memory(public_base_url: &str) -> Self {
        Self::new(Arc::new(InMemory::new()), public_base_url)
    }

    fn public_url(&self, path: &StoragePath) -> String {
        format!("{}/{}", self.public_base_url, path.as_str())
    }
}

#[async_trait::async_trait]
impl AttachmentStore for ObjectAttachmentStore {
    #[tracing::instrument(skip(self, data), fields(path = %path, bytes = data.len()))]
    async fn store(
        &self,
        path: &StoragePath,
        data: Bytes,
    ) -> Result<StoredAttachment, AttachmentStoreError> {
        let size_bytes = data.len() as u64;
        self.inner
            .put(&StorePath::from(path.as_str()), PutPayload::from(data))
            .await
            .map_err(|e| AttachmentStoreError::UploadFailed(e.to_string()))?;

        Ok(StoredAttachment {
            storage_id: path.as_str().to_string(),
            url: self.public_url(path),
            size_bytes,
        })
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Bytes, AttachmentStoreError> {
        let result = self
            .inner
            .get(&StorePath::from(path.as_str()))
            .await
            .map_err(|e| match e {
                object_store::Error::NotFound { .. } => {
                    AttachmentStoreError::NotFound(path.to_string())
                }
                other => AttachmentStoreError::DownloadFailed(other.to_string()),
            })?;

        result
            .bytes()
            .await
            .map_err(|e| AttachmentStoreError::DownloadFailed(e.to_string()))
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), AttachmentStoreError> {
        self.inner
            .delete(&StorePath::from(path.as_str()))
            .await
            .map_err(|e| AttachmentStoreError::DeleteFailed(e.to_string()))
    }
}
