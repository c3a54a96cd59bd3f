use async_trait::async_trait;
use sd_core::{DashboardStore, Error, Result};
use std::sync::Arc;

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn get_error_message() -> &'static str;
    async fn new() -> Result<Self>
    where
        Self: Sized;
}

/// Build a store from its CLI name. `backend_url` carries the connection
/// string for backends that need one (the sqlite path, for instance).
pub async fn create_storage(
    kind: &str,
    backend_url: Option<&str>,
) -> Result<Arc<dyn DashboardStore>> {
    #[cfg(not(feature = "sqlite"))]
    let _ = backend_url;
    match kind {
        "memory" => Ok(Arc::new(MemoryStorage::new().await?)),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let storage = match backend_url {
                Some(path) => SqliteStorage::new_with_path(path.as_ref()).await?,
                None => SqliteStorage::new().await?,
            };
            Ok(Arc::new(storage))
        }
        other => Err(Error::Storage(format!("unknown storage backend: {other}"))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::StorageBackend;
}
