use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

const DATASETS_SUBDIR: &str = "datasets";

/// File store for uploaded datasets under the configured base path.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn datasets_dir(&self) -> PathBuf {
        self.base_path.join(DATASETS_SUBDIR)
    }

    /// Stores one uploaded dataset under a collision-free name derived from
    /// the original filename; returns the stored name.
    pub async fn save_dataset(&self, content: &[u8], original_filename: &str) -> Result<String> {
        let dir = self.datasets_dir();
        fs::create_dir_all(&dir).await?;

        let stored_name = Self::generate_unique_filename(original_filename);
        fs::write(dir.join(&stored_name), content).await?;

        Ok(stored_name)
    }

    pub async fn read_dataset(&self, stored_name: &str) -> Result<Vec<u8>> {
        let content = fs::read(self.datasets_dir().join(stored_name)).await?;
        Ok(content)
    }

    pub async fn list_datasets(&self) -> Result<Vec<String>> {
        let dir = self.datasets_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(dir).await?;
        let mut filenames = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if let Ok(file_type) = entry.file_type().await {
                if file_type.is_file() {
                    if let Some(filename) = entry.file_name().to_str() {
                        filenames.push(filename.to_string());
                    }
                }
            }
        }

        Ok(filenames)
    }

    /// Keeps the original extension, replaces the stem with a uuid so two
    /// uploads of `sales.csv` never collide.
    fn generate_unique_filename(original_filename: &str) -> String {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let uuid = Uuid::new_v4();

        if extension.is_empty() {
            format!("{}", uuid)
        } else {
            format!("{}.{}", uuid, extension)
        }
    }
}
