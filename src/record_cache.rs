use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use log::{debug, info};
use sha2::{Digest, Sha256};

use crate::error::LoadError;
use crate::records::{self, LoadOptions, PlayerRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceStamp {
    path: PathBuf,
    digest: Vec<u8>,
}

impl SourceStamp {
    fn of(path: &Path, bytes: &[u8]) -> Self {
        Self {
            path: path.to_path_buf(),
            digest: Sha256::digest(bytes).to_vec(),
        }
    }
}

#[derive(Debug)]
struct CachedTable {
    stamp: SourceStamp,
    records: Arc<[PlayerRecord]>,
}

/// Keeps the last loaded table and reloads it when the file content changes.
///
/// The table is swapped as a whole, so readers get either the previous or the new
/// table and never a partially loaded one.
#[derive(Debug, Default)]
pub struct RecordCache {
    options: LoadOptions,
    slot: RwLock<Option<CachedTable>>,
}

impl RecordCache {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            slot: RwLock::new(None),
        }
    }

    pub fn get_or_load(&self, path: &Path) -> Result<Arc<[PlayerRecord]>, LoadError> {
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let stamp = SourceStamp::of(path, &bytes);
        {
            let guard = self.slot.read().unwrap_or_else(|e| e.into_inner());
            if let Some(table) = guard.as_ref()
                && table.stamp == stamp
            {
                debug!("record cache hit for {}", path.display());
                return Ok(Arc::clone(&table.records));
            }
        }

        // Parse outside the lock; a failed load keeps the previous table.
        let records: Arc<[PlayerRecord]> =
            records::load_reader_with(bytes.as_slice(), &self.options)?.into();
        let mut guard = self.slot.write().unwrap_or_else(|e| e.into_inner());
        info!(
            "record cache loaded {} player records from {}",
            records.len(),
            path.display()
        );
        *guard = Some(CachedTable {
            stamp,
            records: Arc::clone(&records),
        });
        Ok(records)
    }

    pub fn invalidate(&self) {
        let mut guard = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "Player,Age,Pos,Comp,Min,Gls,Ast\nA,20,FW,x,900,3,1\n";

    #[test]
    fn poisoned_lock_still_reports_loaded_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.csv");
        fs::write(&path, CSV).unwrap();

        let cache = RecordCache::default();
        cache.get_or_load(&path).unwrap();

        let poisoned = std::thread::scope(|s| {
            let writer: std::thread::ScopedJoinHandle<'_, ()> = s.spawn(|| {
                let _guard = cache.slot.write().unwrap();
                panic!("writer died holding the lock");
            });
            writer.join()
        });
        assert!(poisoned.is_err());
        assert!(cache.slot.is_poisoned());

        assert!(cache.is_loaded());
        assert_eq!(cache.get_or_load(&path).unwrap().len(), 1);
    }
}
