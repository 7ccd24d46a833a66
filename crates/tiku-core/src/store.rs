use std::collections::HashMap;
use std::path::PathBuf;

use tiku_types::{Category, PhysicalRect};
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Saved capture region per category
#[async_trait::async_trait]
pub trait RegionStore: Send + Sync {
    /// `None` when nothing usable is saved
    async fn load(&self, category: &Category) -> Option<PhysicalRect>;

    /// Make `rect` the active region for `category`. It must be readable via
    /// `load` afterwards even when an error is returned.
    async fn save(&self, category: &Category, rect: PhysicalRect) -> Result<(), StoreError>;
}

/// Process-local store, nothing survives a restart
#[derive(Default)]
pub struct MemoryRegionStore {
    regions: RwLock<HashMap<Category, PhysicalRect>>,
}

impl MemoryRegionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RegionStore for MemoryRegionStore {
    async fn load(&self, category: &Category) -> Option<PhysicalRect> {
        self.regions.read().await.get(category).copied()
    }

    async fn save(&self, category: &Category, rect: PhysicalRect) -> Result<(), StoreError> {
        self.regions.write().await.insert(category.clone(), rect);
        Ok(())
    }
}

/// One `<category>-region-data.json` file per category under `dir`
pub struct JsonRegionStore {
    dir: PathBuf,
    cache: RwLock<HashMap<Category, PhysicalRect>>,
}

impl JsonRegionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn path_for(&self, category: &Category) -> PathBuf {
        self.dir.join(category.region_file_name())
    }

    async fn read_file(&self, category: &Category) -> Result<PhysicalRect, StoreError> {
        let data = tokio::fs::read_to_string(self.path_for(category)).await?;
        Ok(serde_json::from_str(&data)?)
    }

    async fn write_file(&self, category: &Category, rect: PhysicalRect) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(&rect)?;
        tokio::fs::write(self.path_for(category), json).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RegionStore for JsonRegionStore {
    async fn load(&self, category: &Category) -> Option<PhysicalRect> {
        if let Some(rect) = self.cache.read().await.get(category) {
            return Some(*rect);
        }

        match self.read_file(category).await {
            Ok(rect) => {
                tracing::info!("Loaded {category} region: {rect:?}");
                self.cache.write().await.insert(category.clone(), rect);
                Some(rect)
            }
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No saved {category} region");
                None
            }
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable region file {}: {e}",
                    self.path_for(category).display()
                );
                None
            }
        }
    }

    async fn save(&self, category: &Category, rect: PhysicalRect) -> Result<(), StoreError> {
        self.cache.write().await.insert(category.clone(), rect);
        self.write_file(category, rect).await?;
        tracing::info!("Saved {category} region to {}", self.path_for(category).display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("tiku-store-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryRegionStore::new();
        let exam = Category::from("exam");
        assert_eq!(store.load(&exam).await, None);

        store.save(&exam, PhysicalRect::new(1, 2, 3, 4)).await.unwrap();
        assert_eq!(store.load(&exam).await, Some(PhysicalRect::new(1, 2, 3, 4)));
        assert_eq!(store.load(&Category::from("maze")).await, None);
    }

    #[tokio::test]
    async fn json_store_survives_a_new_instance() {
        let dir = scratch_dir();
        let maze = Category::from("maze");
        let rect = PhysicalRect::new(240, 120, 400, 160);

        JsonRegionStore::new(&dir).save(&maze, rect).await.unwrap();

        let written = std::fs::read_to_string(dir.join("maze-region-data.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["x"], 240);
        assert_eq!(value["height"], 160);

        let reopened = JsonRegionStore::new(&dir);
        assert_eq!(reopened.load(&maze).await, Some(rect));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_absent() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("exam-region-data.json"), "{ not json").unwrap();

        let store = JsonRegionStore::new(&dir);
        assert_eq!(store.load(&Category::from("exam")).await, None);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn missing_dir_reads_as_absent() {
        let store = JsonRegionStore::new(scratch_dir());
        assert_eq!(store.load(&Category::from("exam")).await, None);
    }
}
