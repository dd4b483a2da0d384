use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const DISARMED: u64 = u64::MAX;

/// Remote control for a `FaultInjectingKVStore`.
///
/// Cloneable, so a test can keep one while the store itself is moved into
/// a `BlockIndex` or a running pipeline.
#[derive(Debug, Clone)]
pub struct FaultSwitch {
    batches_before_fault: Arc<AtomicU64>,
}

impl FaultSwitch {
    /// Fail every batch from the next one on.
    pub fn arm(&self) {
        self.arm_after(0);
    }

    /// Let `batches` more batches through, then fail every batch after.
    pub fn arm_after(&self, batches: u64) {
        self.batches_before_fault.store(batches, Ordering::SeqCst);
    }

    pub fn disarm(&self) {
        self.batches_before_fault.store(DISARMED, Ordering::SeqCst);
    }

    fn should_fail(&self) -> bool {
        let update = self
            .batches_before_fault
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                DISARMED | 0 => None,
                n => Some(n - 1),
            });
        matches!(update, Err(0))
    }
}

/// Wraps a store and fails batch writes on demand, applying nothing, the
/// way a crash before commit looks to a transactional engine.
///
/// Reads and single-key writes pass through untouched.
pub struct FaultInjectingKVStore<S> {
    inner: S,
    switch: FaultSwitch,
}

impl<S: KeyValueStore> FaultInjectingKVStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            switch: FaultSwitch {
                batches_before_fault: Arc::new(AtomicU64::new(DISARMED)),
            },
        }
    }

    pub fn switch(&self) -> FaultSwitch {
        self.switch.clone()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: KeyValueStore> KeyValueStore for FaultInjectingKVStore<S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.inner.get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.inner.put(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.inner.delete(key)
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        if self.switch.should_fail() {
            return Err(KVStoreError::IOError {
                message: format!("injected fault, {} operations dropped", operations.len()),
            });
        }
        self.inner.atomic_batch_write(operations)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        self.inner.exists(key)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        self.inner.prefix_scan(prefix)
    }
}
