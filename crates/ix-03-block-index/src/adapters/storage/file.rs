use super::memory::scan;
use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

fn io_error(e: std::io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: e.to_string(),
    }
}

/// File-backed key-value store for runs without RocksDB.
///
/// Keeps the whole map in memory and rewrites the file on every commit via
/// a temp file and rename, so the file on disk always holds a complete
/// batch boundary. Fine for development datasets, not for mainnet.
///
/// File format: `[key_len: u32 LE][key][value_len: u32 LE][value]...`
pub struct FileBackedKVStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
}

impl FileBackedKVStore {
    /// Open (or create on first commit) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();

        let data = if path.exists() {
            let data = Self::load_from_file(&path)?;
            info!(path = %path.display(), keys = data.len(), "Loaded index file");
            data
        } else {
            info!(path = %path.display(), "No index file yet, starting empty");
            BTreeMap::new()
        };

        Ok(Self { data, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> Result<BTreeMap<Vec<u8>, Vec<u8>>, KVStoreError> {
        let mut bytes = Vec::new();
        std::fs::File::open(path)
            .and_then(|mut file| file.read_to_end(&mut bytes))
            .map_err(io_error)?;

        let mut data = BTreeMap::new();
        let mut cursor = 0;
        while cursor < bytes.len() {
            let key = Self::read_chunk(&bytes, &mut cursor)?;
            let value = Self::read_chunk(&bytes, &mut cursor)?;
            data.insert(key, value);
        }
        Ok(data)
    }

    fn read_chunk(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, KVStoreError> {
        let truncated = |at: usize| KVStoreError::CorruptionError {
            message: format!("index file truncated at byte {}", at),
        };

        let len_end = *cursor + 4;
        let len_bytes: [u8; 4] = bytes
            .get(*cursor..len_end)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| truncated(*cursor))?;
        let len = u32::from_le_bytes(len_bytes) as usize;

        let chunk = bytes
            .get(len_end..len_end + len)
            .ok_or_else(|| truncated(len_end))?
            .to_vec();
        *cursor = len_end + len;
        Ok(chunk)
    }

    fn save_to_file(&self) -> Result<(), KVStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let mut bytes = Vec::new();
        for (key, value) in &self.data {
            bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
            bytes.extend_from_slice(key);
            bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
            bytes.extend_from_slice(value);
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(io_error)?;
        file.write_all(&bytes).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
        std::fs::rename(&temp_path, &self.path).map_err(io_error)?;

        Ok(())
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.atomic_batch_write(vec![BatchOperation::put(key, value)])
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.atomic_batch_write(vec![BatchOperation::delete(key)])
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        // Previous value of every touched key, newest last.
        let mut undo: Vec<(Vec<u8>, Option<Vec<u8>>)> = Vec::with_capacity(operations.len());
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    let previous = self.data.insert(key.clone(), value);
                    undo.push((key, previous));
                }
                BatchOperation::Delete { key } => {
                    let previous = self.data.remove(&key);
                    undo.push((key, previous));
                }
            }
        }

        if let Err(e) = self.save_to_file() {
            for (key, previous) in undo.into_iter().rev() {
                match previous {
                    Some(value) => self.data.insert(key, value),
                    None => self.data.remove(&key),
                };
            }
            return Err(e);
        }
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan(&self.data, prefix))
    }
}
