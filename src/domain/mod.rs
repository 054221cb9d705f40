mod attachment;
mod chunk;
mod conversation;
mod conversation_id;
mod conversation_status;
mod document;
mod embedding;
mod inactivity;
mod message;
mod message_id;
mod message_role;
mod storage_path;

pub use attachment::{Attachment, AttachmentId, mime_subtype};
pub use chunk::{Chunk, ChunkId, DocumentId};
pub use conversation::Conversation;
pub use conversation_id::ConversationId;
pub use conversation_status::ConversationStatus;
pub use document::{ContentType, Document};
pub use embedding::Embedding;
pub use inactivity::{
    InactivityStatus, InactivityWindows, SweepAction, decide_sweep_action, derive_status,
};
pub use message::Message;
pub use message_id::MessageId;
pub use message_role::MessageRole;
pub use storage_path::StoragePath;
