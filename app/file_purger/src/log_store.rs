use std::sync::Arc;

use framework::exception;
use framework::exception::CoreRsResult;
use framework::exception::Exception;
use futures::StreamExt;
use futures::stream::BoxStream;
use object_store::ObjectStore;
use object_store::ObjectStoreExt;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::path::Path;
use tracing::Instrument;
use tracing::debug;
use tracing::debug_span;

/// Container of access log blobs.
pub struct LogStore {
    store: Arc<dyn ObjectStore>,
}

impl LogStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub fn azure(account: &str, access_key: &str, container: &str) -> CoreRsResult<Self> {
        let store = MicrosoftAzureBuilder::new()
            .with_account(account)
            .with_access_key(access_key)
            .with_container_name(container)
            .build()
            .map_err(|err| {
                exception!(
                    message = format!("failed to create log store, account={account}, container={container}"),
                    source = err
                )
            })?;
        Ok(Self::new(Arc::new(store)))
    }

    /// Lazily enumerates every blob in the container, in store order.
    pub fn blobs(&self) -> BoxStream<'_, CoreRsResult<Path>> {
        self.store
            .list(None)
            .map(|result| result.map(|meta| meta.location).map_err(Exception::from))
            .boxed()
    }

    pub async fn read_text(&self, location: &Path) -> CoreRsResult<String> {
        let span = debug_span!("log_store", blob = %location);
        async {
            let bytes = self.store.get(location).await?.bytes().await?;
            debug!(read_bytes = bytes.len(), "stats");
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        .instrument(span)
        .await
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::TryStreamExt;
    use object_store::ObjectStoreExt;
    use object_store::PutPayload;
    use object_store::memory::InMemory;
    use object_store::path::Path;

    use super::LogStore;

    #[tokio::test]
    async fn list_and_read() {
        let store = InMemory::new();
        let path = Path::from("resourceId=/subscriptions/s1/y=2026/m=10/d=16/PT1H.json");
        store
            .put(&path, PutPayload::from(r#"{"operationName": "GetFile"}"#))
            .await
            .unwrap();
        let log_store = LogStore::new(Arc::new(store));

        let blobs: Vec<Path> = log_store.blobs().try_collect().await.unwrap();
        assert_eq!(blobs, vec![path.clone()]);
        assert_eq!(log_store.read_text(&path).await.unwrap(), r#"{"operationName": "GetFile"}"#);
    }

    #[tokio::test]
    async fn read_missing_blob() {
        let log_store = LogStore::new(Arc::new(InMemory::new()));

        assert!(log_store.read_text(&Path::from("missing.json")).await.is_err());
    }
}
