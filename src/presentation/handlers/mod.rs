mod attachments;
mod chat;
mod documents;
mod error;
mod health;

pub use attachments::attachment_handler;
pub use chat::{
    close_handler, history_handler, mark_all_read_handler, mark_read_handler, reopen_handler,
    send_message_handler, status_handler,
};
pub use documents::{
    delete_document_handler, document_stats_handler, get_document_handler,
    list_documents_handler, upload_document_handler,
};
pub use error::{ApiError, ErrorResponse};
pub use health::health_handler;
