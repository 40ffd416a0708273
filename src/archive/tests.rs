use super::*;

#[tokio::test]
async fn upload_download_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalArchiveStore::new(dir.path());

    store
        .upload("rne/database/rne.db", b"database bytes")
        .await
        .unwrap();
    let body = store.download("rne/database/rne.db").await.unwrap();
    assert_eq!(body, b"database bytes");
}

#[tokio::test]
async fn download_of_missing_object_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalArchiveStore::new(dir.path());
    assert!(store.download("missing").await.is_err());
}

#[tokio::test]
async fn checksums_compare_by_content() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalArchiveStore::new(dir.path());

    store.upload("a/export.csv", b"same").await.unwrap();
    store.upload("b/export.csv", b"same").await.unwrap();
    store.upload("c/export.csv", b"different").await.unwrap();

    assert!(store
        .checksums_match("a/export.csv", "b/export.csv")
        .await
        .unwrap());
    assert!(!store
        .checksums_match("a/export.csv", "c/export.csv")
        .await
        .unwrap());
}

#[tokio::test]
async fn rename_folder_moves_every_object() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalArchiveStore::new(dir.path());

    store.upload("latest/export.csv", b"one").await.unwrap();
    store.upload("latest/nested/extra.csv", b"two").await.unwrap();

    store.rename_folder("latest", "2024-01-01").await.unwrap();

    assert_eq!(store.download("2024-01-01/export.csv").await.unwrap(), b"one");
    assert_eq!(
        store.download("2024-01-01/nested/extra.csv").await.unwrap(),
        b"two"
    );
    assert!(store.download("latest/export.csv").await.is_err());
}
