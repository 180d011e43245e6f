use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::Path;

/// Filesystem storage rooted at `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    /// Returns the full path written.
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        Ok(full_path.to_string_lossy().into_owned())
    }
}
