use bytes::Bytes;

use crate::gateway::{
    CONTENT_TYPE, ObjectStore, PersistenceGateway, StoreError, UploadError, memory, sqlite,
};

use super::{load_fixture, local_gateway};

#[tokio::test]
async fn upload_stores_under_uploads_prefix() {
    let payload = load_fixture("src/tests/fixtures/sales.json").await;
    let local = local_gateway();
    let (ingested, key) = local
        .gateway
        .upload(&payload, "sales.json")
        .await
        .unwrap();
    assert_eq!(key.as_str(), "uploads/sales.json");
    assert_eq!(ingested.dataset.len(), 5);

    let stored = local
        .gateway
        .objects()
        .get("rawdata", "uploads/sales.json")
        .await
        .unwrap();
    assert_eq!(stored.body, Bytes::from(payload));
    assert_eq!(stored.content_type, CONTENT_TYPE);
}

#[tokio::test]
async fn same_name_is_last_writer_wins() {
    let local = local_gateway();
    let first = br#"[{"category": "A", "product_name": "x"}]"#;
    let second = br#"[{"category": "B", "product_name": "y"}]"#;
    let first_key = local.gateway.store(first, "batch.json").await.unwrap();
    let second_key = local.gateway.store(second, "batch.json").await.unwrap();
    assert_eq!(first_key, second_key);

    assert_eq!(local.gateway.objects().len().await, 1);
    let stored = local
        .gateway
        .objects()
        .get("rawdata", "uploads/batch.json")
        .await
        .unwrap();
    assert_eq!(stored.body.as_ref(), second.as_slice());
}

#[tokio::test]
async fn malformed_payload_is_never_stored() {
    let local = local_gateway();
    let result = local
        .gateway
        .upload(br#"{"category": "A"}"#, "single.json")
        .await;
    assert!(matches!(result, Err(UploadError::Malformed(_))));

    let result = local.gateway.upload(b"not json", "broken.json").await;
    assert!(matches!(result, Err(UploadError::Malformed(_))));

    assert!(local.gateway.objects().is_empty().await);
}

#[tokio::test]
async fn empty_name_is_rejected() {
    let local = local_gateway();
    let result = local.gateway.store(b"[]", " ").await;
    assert!(matches!(result, Err(StoreError::InvalidName(_))));
    assert!(local.gateway.objects().is_empty().await);
}

struct Unreachable;

impl ObjectStore for Unreachable {
    type Error = String;

    async fn put(
        &self,
        _bucket: String,
        _key: String,
        _content_type: String,
        _body: Bytes,
    ) -> Result<(), Self::Error> {
        Err("connection refused".to_owned())
    }
}

#[tokio::test]
async fn store_failure_carries_key_and_cause() {
    let db = sqlite::Database::connect_lazy("sqlite::memory:").unwrap();
    let gateway = PersistenceGateway::new(Unreachable, db.client(), "rawdata");
    let error = gateway.store(b"[]", "sales.json").await.unwrap_err();
    match &error {
        StoreError::Put { key, error } => {
            assert_eq!(key.as_str(), "uploads/sales.json");
            assert_eq!(error, "connection refused");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        error.to_string(),
        "Failed to put uploads/sales.json: connection refused"
    );
}

#[tokio::test]
async fn upload_failure_reports_store_error_unchanged() {
    let db = sqlite::Database::connect_lazy("sqlite::memory:").unwrap();
    let gateway = PersistenceGateway::new(Unreachable, db.client(), "rawdata");
    let error = gateway
        .upload(br#"[{"category": "A", "product_name": "x"}]"#, "sales.json")
        .await
        .unwrap_err();
    assert!(matches!(
        &error,
        UploadError::Store(StoreError::Put { key, .. }) if key.as_str() == "uploads/sales.json"
    ));
    assert_eq!(
        error.to_string(),
        "Failed to put uploads/sales.json: connection refused"
    );
    let error = anyhow::Error::from(error);
    assert_eq!(
        format!("{error:#}"),
        "Failed to put uploads/sales.json: connection refused"
    );
}

#[tokio::test]
async fn names_are_used_verbatim() {
    let local = local_gateway();
    local.gateway.store(b"[1]", "a.json").await.unwrap();
    let key = local.gateway.store(b"[2]", " a.json").await.unwrap();
    assert_eq!(key.as_str(), "uploads/ a.json");
    assert_eq!(local.gateway.objects().len().await, 2);
    let stored = local
        .gateway
        .objects()
        .get("rawdata", "uploads/a.json")
        .await
        .unwrap();
    assert_eq!(stored.body.as_ref(), b"[1]".as_slice());
}

#[tokio::test]
async fn memory_store_is_keyed_by_bucket() {
    let client = memory::Client::new();
    client
        .put(
            "a".into(),
            "k".into(),
            CONTENT_TYPE.into(),
            Bytes::from_static(b"1"),
        )
        .await
        .unwrap();
    client
        .put(
            "b".into(),
            "k".into(),
            CONTENT_TYPE.into(),
            Bytes::from_static(b"2"),
        )
        .await
        .unwrap();
    assert_eq!(client.len().await, 2);
    assert_eq!(
        client.get("b", "k").await.unwrap().body,
        Bytes::from_static(b"2")
    );
}
