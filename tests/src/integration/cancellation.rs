//! # Shutdown and Channel Behaviour
//!
//! Cancellation leaves a prefix of the chain fully indexed; a full channel
//! slows the reader down but never drops a block.

#[cfg(test)]
mod tests {
    use super::super::pipeline_over;
    use crate::fixtures::{synthetic_chain, write_block_file};
    use indexer_runtime::Consistency;
    use ix_01_block_source::{BlockReader, MemoryBlockSource, SourceConfig};
    use ix_02_hot_cache::CacheConfig;
    use ix_03_block_index::InMemoryKVStore;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio::sync::watch;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_leaves_a_consistent_prefix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blocks.jsonl");
        let chain = synthetic_chain(3, 200, 3, 10);
        write_block_file(&path, &chain).unwrap();

        let config = SourceConfig::new(&path).with_publish_period(Duration::from_millis(2));
        let source = BlockReader::open(&config).unwrap();
        let pipeline = pipeline_over(InMemoryKVStore::new(), CacheConfig::unbounded(), 0, 4);

        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = tx.send(true);
        });

        let summary = pipeline.run(source, rx).await.unwrap();
        assert!(summary.cancelled);
        assert!(summary.indexed < 200);
        assert!(summary.received <= summary.published);

        let facade = pipeline.container().facade();
        let indexed = facade.get_all_blocks().unwrap();
        assert_eq!(indexed.len() as u64, summary.indexed);
        assert_eq!(indexed, chain[..indexed.len()].to_vec());
        for block in &indexed {
            assert_eq!(facade.verify_consistency(&block.hash).unwrap(), Consistency::Match);
        }
    }

    #[tokio::test]
    async fn test_capacity_one_loses_nothing() {
        let chain = synthetic_chain(17, 500, 2, 20);
        let pipeline = pipeline_over(InMemoryKVStore::new(), CacheConfig::unbounded(), 0, 1);
        let (_tx, rx) = watch::channel(false);

        let summary = pipeline.run(MemoryBlockSource::new(chain.clone()), rx).await.unwrap();

        assert_eq!(summary.published, 500);
        assert_eq!(summary.received, 500);
        assert_eq!(summary.indexed, 500);
        assert_eq!(summary.unprocessed(), 0);
        assert_eq!(pipeline.container().facade().get_all_blocks().unwrap(), chain);
    }

    #[tokio::test]
    async fn test_block_file_with_cap_and_bad_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blocks.jsonl");
        let chain = synthetic_chain(29, 30, 2, 5);
        write_block_file(&path, &chain).unwrap();
        {
            let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
            writeln!(file, "{{ not a block").unwrap();
        }

        let pipeline = pipeline_over(InMemoryKVStore::new(), CacheConfig::unbounded(), 0, 4);
        let capped = BlockReader::open(&SourceConfig::new(&path).with_max_blocks(10)).unwrap();
        let (_tx, rx) = watch::channel(false);
        let summary = pipeline.run(capped, rx).await.unwrap();
        assert_eq!(summary.indexed, 10);

        // Uncapped: the trailing garbage line is skipped, the rest resumes.
        let uncapped = BlockReader::open(&SourceConfig::new(&path)).unwrap();
        let (_tx, rx) = watch::channel(false);
        let summary = pipeline.run(uncapped, rx).await.unwrap();
        assert_eq!(summary.duplicates, 10);
        assert_eq!(summary.indexed, 20);
        assert_eq!(pipeline.container().index.read().tip().unwrap().height, 30);
    }
}
