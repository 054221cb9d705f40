use super::MessageId;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentId(Uuid);

impl AttachmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AttachmentId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub id: AttachmentId,
    pub message_id: MessageId,
    pub file_name: String,
    pub mime_type: String,
    pub url: String,
    pub storage_id: Option<String>,
    pub size_bytes: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    /// Subtype segment of the MIME type (`image/png` -> `png`).
    pub fn subtype(&self) -> &str {
        mime_subtype(&self.mime_type)
    }
}

pub fn mime_subtype(mime_type: &str) -> &str {
    match mime_type.split_once('/') {
        Some((_, subtype)) if !subtype.is_empty() => subtype,
        _ => "file",
    }
}
