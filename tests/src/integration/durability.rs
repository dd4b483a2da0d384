//! # Restart and Crash Recovery
//!
//! The index on disk must always end on a whole block: a restart resumes
//! from the recovered tip, and a failed commit leaves nothing of the failing
//! block behind.

#[cfg(test)]
mod tests {
    use super::super::pipeline_over;
    use crate::fixtures::synthetic_chain;
    use indexer_runtime::{Consistency, PipelineError};
    use ix_01_block_source::MemoryBlockSource;
    use ix_02_hot_cache::CacheConfig;
    use ix_03_block_index::{BlockIndex, FaultInjectingKVStore, FileBackedKVStore};
    use shared_types::{Block, TransactionOutput};
    use std::path::Path;
    use tempfile::tempdir;
    use tokio::sync::watch;

    fn outputs_of(blocks: &[Block], address: &str) -> Vec<TransactionOutput> {
        blocks
            .iter()
            .flat_map(|b| &b.transactions)
            .flat_map(|tx| &tx.outputs)
            .filter(|o| o.address == address)
            .cloned()
            .collect()
    }

    fn reopen(path: &Path) -> BlockIndex<FileBackedKVStore> {
        BlockIndex::open(FileBackedKVStore::open(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_restart_resumes_from_tip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.kv");
        let chain = synthetic_chain(31, 40, 3, 8);

        {
            let pipeline =
                pipeline_over(FileBackedKVStore::open(&path).unwrap(), CacheConfig::unbounded(), 0, 4);
            let (_tx, rx) = watch::channel(false);
            let summary = pipeline
                .run(MemoryBlockSource::new(chain[..15].to_vec()), rx)
                .await
                .unwrap();
            assert_eq!(summary.indexed, 15);
        }

        let pipeline =
            pipeline_over(FileBackedKVStore::open(&path).unwrap(), CacheConfig::unbounded(), 0, 4);
        assert!(!pipeline.container().started_empty());
        assert_eq!(pipeline.container().index.read().tip().unwrap().height, 15);

        // Replaying from genesis skips what is already on disk.
        let (_tx, rx) = watch::channel(false);
        let summary = pipeline.run(MemoryBlockSource::new(chain.clone()), rx).await.unwrap();
        assert_eq!(summary.duplicates, 15);
        assert_eq!(summary.indexed, 25);

        let facade = pipeline.container().facade();
        assert_eq!(facade.get_all_blocks().unwrap(), chain);
        assert_eq!(facade.verify_consistency(&chain[0].hash).unwrap(), Consistency::NotCached);
        assert_eq!(facade.verify_consistency(&chain[39].hash).unwrap(), Consistency::Match);
        assert_eq!(
            facade.get_address_output_transactions("addr-0001").unwrap(),
            outputs_of(&chain, "addr-0001")
        );
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_whole_blocks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.kv");
        let chain = synthetic_chain(47, 20, 4, 6);

        let store = FaultInjectingKVStore::new(FileBackedKVStore::open(&path).unwrap());
        let switch = store.switch();
        switch.arm_after(10);

        {
            let pipeline = pipeline_over(store, CacheConfig::unbounded(), 0, 4);
            let (_tx, rx) = watch::channel(false);
            let err = pipeline
                .run(MemoryBlockSource::new(chain.clone()), rx)
                .await
                .unwrap_err();

            assert!(matches!(err, PipelineError::Storage { .. }));
            let summary = err.summary().unwrap();
            assert_eq!(summary.indexed, 10);
            assert_eq!(summary.failed, 1);

            // Nothing of the failing block is visible through any query.
            let facade = pipeline.container().facade();
            let failed = &chain[10];
            assert!(facade.get_block(&failed.hash).unwrap().is_none());
            assert!(facade.get_block_with_height(failed.height).unwrap().is_none());
            assert!(facade.get_transactions_with_hash(&failed.hash).unwrap().is_none());
            for tx in &failed.transactions {
                assert!(facade.get_transaction_by_id(&tx.id).unwrap().is_none());
            }
            assert_eq!(facade.get_all_blocks().unwrap(), chain[..10].to_vec());
            assert_eq!(facade.get_max_height_block().unwrap(), Some(chain[9].clone()));
            for address in ["addr-0000", "addr-0003", "addr-0005"] {
                assert_eq!(
                    facade.get_address_output_transactions(address).unwrap(),
                    outputs_of(&chain[..10], address)
                );
            }
            assert_eq!(facade.verify_consistency(&failed.hash).unwrap(), Consistency::Unknown);
            assert_eq!(facade.verify_consistency(&chain[9].hash).unwrap(), Consistency::Match);
        }

        let index = reopen(&path);
        assert_eq!(index.tip().unwrap().height, 10);
        assert!(index.get_block(&chain[10].hash).unwrap().is_none());
        for tx in &chain[10].transactions {
            assert!(index.get_transaction_by_id(&tx.id).unwrap().is_none());
        }
        for address in ["addr-0000", "addr-0003", "addr-0005"] {
            assert_eq!(
                index.get_address_output_transactions(address).unwrap(),
                outputs_of(&chain[..10], address)
            );
        }
        drop(index);

        // A clean restart picks up exactly where the commit failed.
        let pipeline =
            pipeline_over(FileBackedKVStore::open(&path).unwrap(), CacheConfig::unbounded(), 0, 4);
        let (_tx, rx) = watch::channel(false);
        let summary = pipeline.run(MemoryBlockSource::new(chain.clone()), rx).await.unwrap();
        assert_eq!(summary.duplicates, 10);
        assert_eq!(summary.indexed, 10);
        assert_eq!(reopen(&path).get_all_blocks().unwrap(), chain);
    }
}
