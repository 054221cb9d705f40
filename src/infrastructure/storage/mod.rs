mod object_attachment_store;

pub use object_attachment_store::ObjectAttachmentStore;
