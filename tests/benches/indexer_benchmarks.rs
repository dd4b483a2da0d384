//! # Chain Indexer Benchmarks
//!
//! | Stage | Measured |
//! |-------|----------|
//! | ix-02 Hot Cache | block insert, address view |
//! | ix-03 Block Index | atomic block commit, address prefix scan |
//! | Pipeline | end-to-end run through the bounded channel |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use indexer_runtime::{IndexerContainer, IndexerSettings, Pipeline};
use ix_01_block_source::MemoryBlockSource;
use ix_02_hot_cache::{CacheConfig, HotCache};
use ix_03_block_index::{BlockIndex, InMemoryKVStore};
use ix_tests::fixtures::synthetic_chain;
use std::time::Duration;
use tokio::sync::watch;

// ============================================================================
// IX-02: Hot Cache
// ============================================================================

fn bench_hot_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("ix-02-hot-cache");
    let chain = synthetic_chain(1, 1_000, 8, 200);

    group.throughput(Throughput::Elements(chain.len() as u64));
    group.bench_function("cache_1000_blocks", |b| {
        b.iter(|| {
            let mut cache = HotCache::new(CacheConfig::unbounded());
            for block in &chain {
                cache.cache_block(block.clone());
            }
            black_box(cache.len())
        })
    });

    let mut cache = HotCache::new(CacheConfig::unbounded());
    for block in &chain {
        cache.cache_block(block.clone());
    }
    group.bench_function("address_output_view", |b| {
        b.iter(|| black_box(cache.get_address_output_transactions("addr-0042").len()))
    });

    group.finish();
}

// ============================================================================
// IX-03: Block Index
// ============================================================================

fn bench_block_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("ix-03-block-index");

    for size in [100u64, 1_000] {
        let chain = synthetic_chain(2, size, 8, 200);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("index_blocks", size), &chain, |b, chain| {
            b.iter(|| {
                let mut index = BlockIndex::open(InMemoryKVStore::new()).unwrap();
                for block in chain {
                    index.index_block(block).unwrap();
                }
                black_box(index.stats().keys_written)
            })
        });
    }

    let mut index = BlockIndex::open(InMemoryKVStore::new()).unwrap();
    for block in synthetic_chain(3, 1_000, 8, 200) {
        index.index_block(&block).unwrap();
    }
    group.bench_function("address_output_scan", |b| {
        b.iter(|| black_box(index.get_address_output_transactions("addr-0042").unwrap().len()))
    });
    group.bench_function("block_by_height", |b| {
        b.iter(|| black_box(index.get_block_by_height(black_box(500)).unwrap()))
    });

    group.finish();
}

// ============================================================================
// Pipeline
// ============================================================================

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let chain = synthetic_chain(4, 1_000, 6, 200);

    for capacity in [1usize, 64, 1_000] {
        group.throughput(Throughput::Elements(chain.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("run_1000_blocks", capacity),
            &capacity,
            |b, &capacity| {
                b.iter(|| {
                    runtime.block_on(async {
                        let container =
                            IndexerContainer::new(CacheConfig::unbounded(), InMemoryKVStore::new())
                                .unwrap();
                        let settings = IndexerSettings {
                            x_confirmations: 0,
                            channel_capacity: capacity,
                            ..IndexerSettings::default()
                        };
                        let pipeline = Pipeline::new(container, &settings);
                        let (_tx, rx) = watch::channel(false);
                        let summary = pipeline
                            .run(MemoryBlockSource::new(chain.clone()), rx)
                            .await
                            .unwrap();
                        black_box(summary.indexed)
                    })
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_hot_cache, bench_block_index, bench_pipeline);
criterion_main!(benches);
