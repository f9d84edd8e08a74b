use async_trait::async_trait;
use ng_core::{ArticleStorage, Error, Result};
use std::sync::Arc;
use tracing::info;

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: ArticleStorage {
    fn get_error_message() -> &'static str
    where
        Self: Sized;

    /// Open the backend, using `url` when the backend needs a location
    async fn connect(url: Option<&str>) -> Result<Self>
    where
        Self: Sized;
}

async fn open<T: StorageBackend + 'static>(url: Option<&str>) -> Result<Arc<dyn ArticleStorage>> {
    let storage = T::connect(url).await.map_err(|e| {
        Error::Configuration(format!("{} ({})", T::get_error_message(), e))
    })?;
    Ok(Arc::new(storage))
}

/// Pick a storage backend by name.
pub async fn create_storage(kind: &str, url: Option<&str>) -> Result<Arc<dyn ArticleStorage>> {
    let storage = match kind {
        "memory" => open::<InMemoryStorage>(url).await?,
        #[cfg(feature = "sqlite")]
        "sqlite" => open::<SQLiteStorage>(url).await?,
        other => {
            return Err(Error::Configuration(format!(
                "Unknown storage backend: {}",
                other
            )))
        }
    };
    info!("Opened {} storage", kind);
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend};
}
