//! # Cache vs. Durable Index
//!
//! After a run, every block the cache still holds must read back identically
//! from disk, and every derived index entry must be reachable. Queries made
//! while the run is in progress only ever see whole chain blocks.

#[cfg(test)]
mod tests {
    use super::super::pipeline_over;
    use crate::fixtures::synthetic_chain;
    use indexer_runtime::Consistency;
    use ix_01_block_source::{BlockReader, MemoryBlockSource, SourceConfig};
    use ix_02_hot_cache::CacheConfig;
    use ix_03_block_index::InMemoryKVStore;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_queries_during_indexing_see_chain_blocks() {
        let chain = synthetic_chain(61, 60, 3, 8);
        let pipeline = pipeline_over(InMemoryKVStore::new(), CacheConfig::unbounded(), 0, 4);
        let done = Arc::new(AtomicBool::new(false));

        let poller = tokio::spawn({
            let facade = pipeline.container().facade();
            let chain = chain.clone();
            let done = Arc::clone(&done);
            async move {
                let mut last_height = 0;
                let mut seen_mid_run = 0u32;
                while !done.load(Ordering::Acquire) {
                    if let Some(tip) = facade.get_max_height_block().unwrap() {
                        assert!(tip.height >= last_height, "max height went backwards");
                        assert_eq!(tip, chain[tip.height as usize - 1]);
                        last_height = tip.height;
                        if tip.height < chain.len() as u64 {
                            seen_mid_run += 1;
                        }
                    }
                    if last_height > 0 {
                        let block = facade.get_block_with_height(last_height).unwrap();
                        assert_eq!(block.as_ref(), Some(&chain[last_height as usize - 1]));
                    }
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
                seen_mid_run
            }
        });

        let config = SourceConfig::default().with_publish_period(Duration::from_millis(3));
        let source = BlockReader::new(MemoryBlockSource::new(chain.clone()), &config);
        let (_tx, rx) = watch::channel(false);
        let summary = pipeline.run(source, rx).await.unwrap();
        done.store(true, Ordering::Release);

        let seen_mid_run = poller.await.unwrap();
        assert_eq!(summary.indexed, 60);
        assert!(seen_mid_run > 0, "no query was answered while indexing");
        assert_eq!(pipeline.container().facade().get_all_blocks().unwrap(), chain);
    }

    #[tokio::test]
    async fn test_every_block_matches_disk() {
        let chain = synthetic_chain(11, 120, 5, 16);
        let pipeline = pipeline_over(InMemoryKVStore::new(), CacheConfig::unbounded(), 0, 8);
        let (_tx, rx) = watch::channel(false);
        let summary = pipeline.run(MemoryBlockSource::new(chain.clone()), rx).await.unwrap();
        assert_eq!(summary.indexed, 120);

        let facade = pipeline.container().facade();
        for block in &chain {
            assert_eq!(facade.verify_consistency(&block.hash).unwrap(), Consistency::Match);

            let cached = pipeline.container().cache.read().get_block_by_height(block.height).cloned();
            let stored = pipeline.container().index.read().get_block_by_height(block.height).unwrap();
            assert_eq!(cached.as_ref(), Some(block));
            assert_eq!(stored.as_ref(), Some(block));
        }
    }

    #[tokio::test]
    async fn test_every_entry_is_reachable() {
        let chain = synthetic_chain(23, 80, 4, 12);
        let pipeline = pipeline_over(InMemoryKVStore::new(), CacheConfig::unbounded(), 0, 8);
        let (_tx, rx) = watch::channel(false);
        pipeline.run(MemoryBlockSource::new(chain.clone()), rx).await.unwrap();

        let facade = pipeline.container().facade();
        let mut addresses = BTreeSet::new();
        for block in &chain {
            for tx in &block.transactions {
                assert_eq!(facade.get_transaction_by_id(&tx.id).unwrap().as_ref(), Some(tx));

                for output in &tx.outputs {
                    addresses.insert(output.address.clone());
                    let view = facade.get_address_output_transactions(&output.address).unwrap();
                    assert!(view.contains(output));
                }
                for input in tx.inputs.iter().filter(|i| i.has_source_address()) {
                    let view = facade.get_address_input_transactions(&input.source_address).unwrap();
                    assert!(view.contains(input));
                }
            }
        }

        // Cache-derived and disk-derived views are the same sequence.
        for address in &addresses {
            let cached = pipeline.container().cache.read().get_address_output_transactions(address);
            let stored = pipeline
                .container()
                .index
                .read()
                .get_address_output_transactions(address)
                .unwrap();
            assert_eq!(cached, stored, "output view of {address}");

            let cached = pipeline.container().cache.read().get_address_input_transactions(address);
            let stored = pipeline
                .container()
                .index
                .read()
                .get_address_input_transactions(address)
                .unwrap();
            assert_eq!(cached, stored, "input view of {address}");
        }
    }

    #[tokio::test]
    async fn test_bounded_cache_falls_back_to_disk() {
        let chain = synthetic_chain(5, 40, 3, 6);
        let pipeline = pipeline_over(InMemoryKVStore::new(), CacheConfig::bounded(8), 0, 8);
        let (_tx, rx) = watch::channel(false);
        pipeline.run(MemoryBlockSource::new(chain.clone()), rx).await.unwrap();

        assert_eq!(pipeline.container().cache.read().len(), 8);
        assert!(!pipeline.container().cache.read().is_complete());

        let facade = pipeline.container().facade();
        assert_eq!(facade.verify_consistency(&chain[0].hash).unwrap(), Consistency::NotCached);
        assert_eq!(facade.verify_consistency(&chain[39].hash).unwrap(), Consistency::Match);
        assert_eq!(facade.get_all_blocks().unwrap(), chain);
        assert_eq!(facade.get_block_with_height(1).unwrap().as_ref(), Some(&chain[0]));
    }

    #[tokio::test]
    async fn test_gate_trims_the_unconfirmed_tail() {
        // Confirmations count down to 1 at the tip.
        let chain = synthetic_chain(9, 30, 2, 4);
        let pipeline = pipeline_over(InMemoryKVStore::new(), CacheConfig::unbounded(), 6, 8);
        let (_tx, rx) = watch::channel(false);
        let summary = pipeline.run(MemoryBlockSource::new(chain.clone()), rx).await.unwrap();

        assert_eq!(summary.indexed, 25);
        assert_eq!(summary.discarded, 5);
        let facade = pipeline.container().facade();
        assert_eq!(facade.get_max_height_block().unwrap().unwrap().height, 25);
        for block in &chain[25..] {
            assert_eq!(facade.verify_consistency(&block.hash).unwrap(), Consistency::Unknown);
            for tx in &block.transactions {
                assert!(facade.get_transaction_by_id(&tx.id).unwrap().is_none());
            }
        }
    }
}
