use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, warn};

use super::entities::EntryEntity;

/// Interface for abstracting storage of entries.
pub trait EntryStore {
    /// Returns every stored entry, ascending by timestamp.
    fn list_all(&self) -> impl Future<Output = Result<Vec<EntryEntity>>> + Send;

    /// Stores a new entry and assigns it the next free identifier.
    fn create(
        &self,
        timestamp: String,
        repetitions: u64,
        source: String,
    ) -> impl Future<Output = Result<EntryEntity>> + Send;

    /// Replaces the stored entry with the same id. Returns false when no
    /// such entry exists.
    fn update(&self, entity: EntryEntity) -> impl Future<Output = Result<bool>> + Send;

    /// Removes the entry with the given id. Returns false when no such entry
    /// exists.
    fn delete(&self, id: u64) -> impl Future<Output = Result<bool>> + Send;
}

impl<T: Deref> EntryStore for T
where
    T::Target: EntryStore,
{
    fn list_all(&self) -> impl Future<Output = Result<Vec<EntryEntity>>> + Send {
        self.deref().list_all()
    }

    fn create(
        &self,
        timestamp: String,
        repetitions: u64,
        source: String,
    ) -> impl Future<Output = Result<EntryEntity>> + Send {
        self.deref().create(timestamp, repetitions, source)
    }

    fn update(&self, entity: EntryEntity) -> impl Future<Output = Result<bool>> + Send {
        self.deref().update(entity)
    }

    fn delete(&self, id: u64) -> impl Future<Output = Result<bool>> + Send {
        self.deref().delete(id)
    }
}

/// The main realization of [EntryStore]. One json value per line; a missing
/// file means no entries.
pub struct FileEntryStore {
    path: PathBuf,
}

impl FileEntryStore {
    pub fn new(entry_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&entry_dir)?;

        Ok(Self {
            path: entry_dir.join("entries.log"),
        })
    }

    async fn read_all(&self) -> Result<Vec<EntryEntity>> {
        async fn extract(path: &Path) -> std::result::Result<Vec<EntryEntity>, std::io::Error> {
            debug!("Extracting {path:?}");
            let file = File::open(path).await?;
            file.lock_shared()?;
            let buffer = BufReader::new(file);
            let mut lines = buffer.lines();
            let mut entities = vec![];
            while let Ok(Some(v)) = lines.next_line().await {
                match serde_json::from_str::<EntryEntity>(&v) {
                    Ok(v) => entities.push(v),
                    Err(e) => {
                        // ignore illegal values. Might happen after shutdowns
                        warn!(
                            "During parsing in path {:?} found illegal json string {}:  {e}",
                            path, &v
                        )
                    }
                }
            }

            lines.into_inner().into_inner().unlock_async().await?;

            Ok(entities)
        }

        match extract(&self.path).await {
            Ok(s) => Ok(s),
            Err(e) => {
                if e.kind() == ErrorKind::NotFound {
                    Ok(vec![])
                } else {
                    Err(e)?
                }
            }
        }
    }

    async fn write_all(&self, entities: &[EntryEntity]) -> Result<()> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .await?;
        file.lock_exclusive()?;
        let result = Self::write_with_file(file.try_clone().await?, entities).await;
        file.unlock_async().await?;
        result
    }

    async fn write_with_file(mut file: File, entities: &[EntryEntity]) -> Result<()> {
        let mut buffer = Vec::<u8>::new();
        for entity in entities {
            serde_json::to_writer(&mut buffer, entity)?;
            buffer.push(b'\n');
        }
        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }

    async fn append(&self, entity: &EntryEntity) -> Result<()> {
        let file = File::options()
            .append(true)
            .create(true)
            .open(&self.path)
            .await?;
        file.lock_exclusive()?;
        let result = Self::write_with_file(file.try_clone().await?, std::slice::from_ref(entity)).await;
        file.unlock_async().await?;
        result
    }
}

impl EntryStore for FileEntryStore {
    async fn list_all(&self) -> Result<Vec<EntryEntity>> {
        let mut entities = self.read_all().await?;
        // stable sort, so same-timestamp entries keep their stored order
        entities.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(entities)
    }

    async fn create(
        &self,
        timestamp: String,
        repetitions: u64,
        source: String,
    ) -> Result<EntryEntity> {
        let entities = self.read_all().await?;
        let id = entities.iter().map(|e| e.id).max().map_or(1, |v| v + 1);
        let entity = EntryEntity {
            id,
            timestamp,
            repetitions,
            source,
        };
        self.append(&entity).await?;
        Ok(entity)
    }

    async fn update(&self, entity: EntryEntity) -> Result<bool> {
        let mut entities = self.read_all().await?;
        let Some(stored) = entities.iter_mut().find(|e| e.id == entity.id) else {
            return Ok(false);
        };
        *stored = entity;
        self.write_all(&entities).await?;
        Ok(true)
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        let mut entities = self.read_all().await?;
        let before = entities.len();
        entities.retain(|e| e.id != id);
        if entities.len() == before {
            return Ok(false);
        }
        self.write_all(&entities).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;
    use tokio::io::AsyncWriteExt;

    use super::{EntryStore, FileEntryStore};
    use crate::utils::logging::TEST_LOGGING;

    #[tokio::test]
    async fn test_missing_file_is_empty() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let store = FileEntryStore::new(dir.path().to_owned())?;
        assert!(store.list_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_list() -> Result<()> {
        let dir = tempdir()?;
        let store = FileEntryStore::new(dir.path().to_owned())?;

        let second = store
            .create("2026-02-11T09:10:00".into(), 3, "cli".into())
            .await?;
        let first = store
            .create("2026-02-10T10:05:00".into(), 10, "cli".into())
            .await?;

        assert_eq!(second.id, 1);
        assert_eq!(first.id, 2);

        // ascending by timestamp regardless of insertion order
        let all = store.list_all().await?;
        assert_eq!(all, vec![first, second]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update() -> Result<()> {
        let dir = tempdir()?;
        let store = FileEntryStore::new(dir.path().to_owned())?;

        let mut entity = store
            .create("2026-02-10T10:05:00".into(), 10, "cli".into())
            .await?;
        entity.repetitions = 12;

        assert!(store.update(entity.clone()).await?);
        assert_eq!(store.list_all().await?, vec![entity.clone()]);

        entity.id = 99;
        assert!(!store.update(entity).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete() -> Result<()> {
        let dir = tempdir()?;
        let store = FileEntryStore::new(dir.path().to_owned())?;

        let entity = store
            .create("2026-02-10T10:05:00".into(), 10, "cli".into())
            .await?;

        assert!(!store.delete(99).await?);
        assert!(store.delete(entity.id).await?);
        assert!(store.list_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_line_is_skipped() -> Result<()> {
        let dir = tempdir()?;
        let store = FileEntryStore::new(dir.path().to_owned())?;
        let entity = store
            .create("2026-02-10T10:05:00".into(), 10, "cli".into())
            .await?;

        let mut file = tokio::fs::File::options()
            .append(true)
            .open(dir.path().join("entries.log"))
            .await?;
        file.write_all(b"{\"id\": 2, \"timest\n").await?;
        file.flush().await?;

        assert_eq!(store.list_all().await?, vec![entity]);
        Ok(())
    }

    #[tokio::test]
    async fn test_ids_survive_deletion() -> Result<()> {
        let dir = tempdir()?;
        let store = FileEntryStore::new(dir.path().to_owned())?;

        store
            .create("2026-02-10T10:05:00".into(), 10, "cli".into())
            .await?;
        let second = store
            .create("2026-02-10T11:00:00".into(), 5, "cli".into())
            .await?;
        store.delete(1).await?;

        let third = store
            .create("2026-02-10T12:00:00".into(), 7, "cli".into())
            .await?;
        assert_eq!(third.id, second.id + 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_normalization_into_entries() -> Result<()> {
        let dir = tempdir()?;
        let store = FileEntryStore::new(dir.path().to_owned())?;
        store
            .create("2026-02-10T10:05:00".into(), 10, "cli".into())
            .await?;

        let entries: Vec<crate::stats::Entry> = store
            .list_all()
            .await?
            .into_iter()
            .map(crate::stats::Entry::from)
            .collect();
        assert_eq!(entries[0].repetitions, 10);
        assert_eq!(entries[0].source, "cli");
        Ok(())
    }
}
