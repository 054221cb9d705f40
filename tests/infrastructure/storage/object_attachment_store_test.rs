use bytes::Bytes;

use helpline::application::ports::{AttachmentStore, AttachmentStoreError};
use helpline::domain::{AttachmentId, ConversationId, StoragePath};
use helpline::infrastructure::storage::ObjectAttachmentStore;

fn path(filename: &str) -> StoragePath {
    StoragePath::new(&ConversationId::new(), &AttachmentId::new(), filename)
}

fn create_local_store() -> (tempfile::TempDir, ObjectAttachmentStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = ObjectAttachmentStore::local(dir.path().join("uploads"), "http://cdn.test/").unwrap();
    (dir, store)
}

#[tokio::test]
async fn given_bytes_when_storing_then_public_url_and_size_are_reported() {
    let store = ObjectAttachmentStore::in_memory("http://files.test/");
    let path = path("receipt.png");

    let stored = store
        .store(&path, Bytes::from_static(b"png bytes"))
        .await
        .unwrap();

    assert_eq!(stored.url, format!("http://files.test/{}", path.as_str()));
    assert_eq!(stored.storage_id, path.as_str());
    assert_eq!(stored.size_bytes, 9);
}

#[tokio::test]
async fn given_stored_object_when_fetching_then_bytes_match_original() {
    let store = ObjectAttachmentStore::in_memory("http://files.test");
    let path = path("notes.txt");
    store
        .store(&path, Bytes::from_static(b"hello"))
        .await
        .unwrap();

    let fetched = store.fetch(&path).await.unwrap();

    assert_eq!(&fetched[..], b"hello");
}

#[tokio::test]
async fn given_missing_object_when_fetching_then_not_found() {
    let store = ObjectAttachmentStore::in_memory("http://files.test");

    let result = store.fetch(&path("ghost.pdf")).await;

    assert!(matches!(result, Err(AttachmentStoreError::NotFound(_))));
}

#[tokio::test]
async fn given_local_store_when_round_tripping_then_file_lands_on_disk() {
    let (dir, store) = create_local_store();
    let path = path("invoice.pdf");

    store
        .store(&path, Bytes::from_static(b"%PDF-1.4"))
        .await
        .unwrap();

    let on_disk = std::fs::read(dir.path().join("uploads").join(path.as_str())).unwrap();
    assert_eq!(on_disk, b"%PDF-1.4");
    assert_eq!(&store.fetch(&path).await.unwrap()[..], b"%PDF-1.4");
}

#[tokio::test]
async fn given_stored_object_when_deleting_then_fetch_returns_not_found() {
    let (_dir, store) = create_local_store();
    let path = path("photo.jpg");
    store
        .store(&path, Bytes::from_static(b"jpeg"))
        .await
        .unwrap();

    store.delete(&path).await.unwrap();

    assert!(matches!(
        store.fetch(&path).await,
        Err(AttachmentStoreError::NotFound(_))
    ));
}
