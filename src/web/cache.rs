use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use crate::error::{Error, Result};
use crate::pipeline::Pipeline;

/// Loads the model artifact on first use and keeps it for the life of the
/// process. A failed load leaves the cell empty so the next call retries.
pub struct ModelCache {
	path: PathBuf,
	cell: OnceCell<Arc<Pipeline>>,
}

impl ModelCache {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			cell: OnceCell::new(),
		}
	}

	pub fn is_loaded(&self) -> bool {
		self.cell.initialized()
	}

	pub async fn get(&self) -> Result<Arc<Pipeline>> {
		self.cell
			.get_or_try_init(|| async {
				let path = self.path.clone();
				info!("Loading model from {}", path.display());

				let pipeline = tokio::task::spawn_blocking(move || Pipeline::load(&path))
					.await
					.map_err(|e| Error::Server(format!("model loading task failed: {e}")))??;

				Ok::<_, Error>(Arc::new(pipeline))
			})
			.await
			.cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pipeline::tests::fitted;

	#[tokio::test]
	async fn loads_once_and_reuses() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let path = dir.path().join("Model.bin");
		fitted().save(&path)?;

		let cache = ModelCache::new(&path);
		assert!(!cache.is_loaded());

		let first = cache.get().await?;
		assert!(cache.is_loaded());

		// Removing the file does not affect the cached model
		std::fs::remove_file(&path)?;
		let second = cache.get().await?;
		assert!(Arc::ptr_eq(&first, &second));

		Ok(())
	}

	#[tokio::test]
	async fn failed_load_is_not_cached() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let path = dir.path().join("Model.bin");

		let cache = ModelCache::new(&path);
		assert!(cache.get().await.is_err());
		assert!(!cache.is_loaded());

		fitted().save(&path)?;
		cache.get().await?;
		assert!(cache.is_loaded());

		Ok(())
	}
}
