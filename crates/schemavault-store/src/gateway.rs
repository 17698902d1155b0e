//! Local file to bucket transfers under a key prefix.

use crate::client::ObjectStoreClient;
use crate::error::StoreError;
use std::path::Path;
use std::sync::Arc;

/// Uploads and downloads changelog artifacts.
#[derive(Clone)]
pub struct ObjectStoreGateway {
    client: Option<Arc<dyn ObjectStoreClient>>,
    prefix: String,
}

impl ObjectStoreGateway {
    pub fn new(client: Arc<dyn ObjectStoreClient>, prefix: impl Into<String>) -> Self {
        Self {
            client: Some(client),
            prefix: prefix.into(),
        }
    }

    /// A gateway with no bucket behind it. Every transfer fails with
    /// [`StoreError::NotConfigured`].
    pub fn unconfigured() -> Self {
        Self {
            client: None,
            prefix: String::new(),
        }
    }

    /// The full key a file named `name` is stored under.
    pub fn object_key(&self, name: &str) -> String {
        join_key(&self.prefix, name)
    }

    /// Maps a client-supplied key to the full key.
    ///
    /// A key that already contains `/` is taken as-is so a full key returned by
    /// an earlier upload is not prefixed twice.
    pub fn resolve_key(&self, key: &str) -> String {
        if key.contains('/') {
            key.to_string()
        } else {
            self.object_key(key)
        }
    }

    /// Reads `local_path` and stores it as `name` under the prefix. Returns the full key.
    pub async fn upload(&self, local_path: &Path, name: &str) -> Result<String, StoreError> {
        let client = self.client()?;
        let body = tokio::fs::read(local_path)
            .await
            .map_err(|source| StoreError::LocalIo {
                path: local_path.to_path_buf(),
                source,
            })?;
        let size = body.len();
        let key = self.object_key(name);

        client.put(&key, body).await?;

        tracing::info!(%key, bytes = size, "uploaded changelog artifact");
        Ok(key)
    }

    /// Fetches `key` and writes it to `local_path`.
    pub async fn download(&self, key: &str, local_path: &Path) -> Result<(), StoreError> {
        let client = self.client()?;
        let key = self.resolve_key(key);

        let bytes = client.get(&key).await?;
        tokio::fs::write(local_path, &bytes)
            .await
            .map_err(|source| StoreError::LocalIo {
                path: local_path.to_path_buf(),
                source,
            })?;

        tracing::info!(%key, bytes = bytes.len(), "downloaded changelog artifact");
        Ok(())
    }

    fn client(&self) -> Result<&Arc<dyn ObjectStoreClient>, StoreError> {
        self.client.as_ref().ok_or(StoreError::NotConfigured)
    }
}

/// Joins `prefix` and `name` with a single `/`, like a POSIX path join.
pub fn join_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        prefix.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryObjectStore;

    #[test]
    fn join_key_collapses_separators() {
        assert_eq!(join_key("", "dump-a.yaml"), "dump-a.yaml");
        assert_eq!(join_key("backups", "dump-a.yaml"), "backups/dump-a.yaml");
        assert_eq!(join_key("backups/", "/dump-a.yaml"), "backups/dump-a.yaml");
        assert_eq!(join_key("team/backups", "dump-a.yaml"), "team/backups/dump-a.yaml");
    }

    #[test]
    fn resolve_key_does_not_double_prefix() {
        let gateway = ObjectStoreGateway::new(Arc::new(MemoryObjectStore::new()), "backups");
        assert_eq!(gateway.resolve_key("dump-a.yaml"), "backups/dump-a.yaml");
        assert_eq!(gateway.resolve_key("backups/dump-a.yaml"), "backups/dump-a.yaml");
        assert_eq!(gateway.resolve_key("other/dump-a.yaml"), "other/dump-a.yaml");
    }

    #[tokio::test]
    async fn upload_then_download_round_trips_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryObjectStore::new());
        let gateway = ObjectStoreGateway::new(store.clone(), "backups");

        let source = dir.path().join("dump-orders.yaml");
        let contents = b"databaseChangeLog:\n- changeSet:\n    id: 1\n".to_vec();
        std::fs::write(&source, &contents).unwrap();

        let key = gateway.upload(&source, "dump-orders.yaml").await.unwrap();
        assert_eq!(key, "backups/dump-orders.yaml");
        assert_eq!(store.put_count(), 1);

        let target = dir.path().join("restore-orders.yaml");
        gateway.download(&key, &target).await.unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), contents);
    }

    #[tokio::test]
    async fn unconfigured_gateway_refuses_transfers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.yaml");
        std::fs::write(&path, "x").unwrap();
        let gateway = ObjectStoreGateway::unconfigured();

        assert!(matches!(
            gateway.upload(&path, "a.yaml").await,
            Err(StoreError::NotConfigured)
        ));
        assert!(matches!(
            gateway.download("a.yaml", &path).await,
            Err(StoreError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn missing_local_file_is_local_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryObjectStore::new());
        let gateway = ObjectStoreGateway::new(store.clone(), "");

        let result = gateway.upload(&dir.path().join("absent.yaml"), "absent.yaml").await;
        assert!(matches!(result, Err(StoreError::LocalIo { .. })));
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn missing_object_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = ObjectStoreGateway::new(Arc::new(MemoryObjectStore::new()), "");

        let result = gateway.download("nope.yaml", &dir.path().join("nope.yaml")).await;
        match result {
            Err(StoreError::Transport { key, .. }) => assert_eq!(key, "nope.yaml"),
            other => panic!("Expected Transport error, got {:?}", other),
        }
    }
}
