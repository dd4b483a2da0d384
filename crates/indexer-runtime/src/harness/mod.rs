//! # Fixture Harness
//!
//! Replays golden fixtures against the query facade after a run.
//!
//! ```text
//! block_test_directory/block_{n}.json      { "height", "hash", "transaction_ids" }
//! address_test_directory/address_{n}.json  { "address", "outputs", "inputs" }
//! ```
//!
//! A fixture that cannot be read or parsed counts as a failed case.

use crate::adapters::QueryFacade;
use crate::container::TestConfig;
use ix_03_block_index::KeyValueStore;
use serde::{Deserialize, Deserializer};
use shared_types::{hex_hash, BlockHeight, Hash, TransactionInput, TransactionOutput};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Expected block lookup results.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockCase {
    pub height: BlockHeight,
    #[serde(with = "hex_hash")]
    pub hash: Hash,
    #[serde(default, deserialize_with = "hex_hash_list")]
    pub transaction_ids: Vec<Hash>,
}

/// Expected address views.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddressCase {
    pub address: String,
    #[serde(default)]
    pub outputs: Vec<TransactionOutput>,
    #[serde(default)]
    pub inputs: Vec<TransactionInput>,
}

fn hex_hash_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Hash>, D::Error> {
    Vec::<String>::deserialize(deserializer)?
        .iter()
        .map(|text| hex_hash::parse(text).map_err(serde::de::Error::custom))
        .collect()
}

/// Outcome of one harness run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessReport {
    pub passed: usize,
    pub failed: usize,
    /// One line per failed case.
    pub failures: Vec<String>,
}

impl HarnessReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, case: String, result: Result<(), String>) {
        match result {
            Ok(()) => self.passed += 1,
            Err(reason) => {
                warn!(%case, %reason, "Fixture case failed");
                self.failed += 1;
                self.failures.push(format!("{case}: {reason}"));
            }
        }
    }
}

/// Loads fixture cases and checks them against a facade.
pub struct FixtureHarness {
    block_cases: usize,
    address_cases: usize,
    block_dir: PathBuf,
    address_dir: PathBuf,
}

impl FixtureHarness {
    pub fn new(config: &TestConfig) -> Self {
        Self {
            block_cases: config.num_block_test_cases,
            address_cases: config.num_address_test_cases,
            block_dir: config.block_test_directory.clone(),
            address_dir: config.address_test_directory.clone(),
        }
    }

    pub fn run<KV: KeyValueStore>(&self, facade: &QueryFacade<KV>) -> HarnessReport {
        let mut report = HarnessReport::default();

        for n in 0..self.block_cases {
            let path = self.block_dir.join(format!("block_{n}.json"));
            let result = load::<BlockCase>(&path).and_then(|case| check_block(facade, &case));
            report.record(path.display().to_string(), result);
        }

        for n in 0..self.address_cases {
            let path = self.address_dir.join(format!("address_{n}.json"));
            let result = load::<AddressCase>(&path).and_then(|case| check_address(facade, &case));
            report.record(path.display().to_string(), result);
        }

        info!(
            passed = report.passed,
            failed = report.failed,
            "Fixture cases finished"
        );
        report
    }
}

fn load<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("unreadable: {e}"))?;
    serde_json::from_str(&content).map_err(|e| format!("unparseable: {e}"))
}

fn check_block<KV: KeyValueStore>(
    facade: &QueryFacade<KV>,
    case: &BlockCase,
) -> Result<(), String> {
    let by_height = facade
        .get_block_with_height(case.height)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("no block at height {}", case.height))?;
    if by_height.hash != case.hash {
        return Err(format!(
            "height {} has hash {}, expected {}",
            case.height,
            hex::encode(by_height.hash),
            hex::encode(case.hash)
        ));
    }

    let by_hash = facade
        .get_block(&case.hash)
        .map_err(|e| e.to_string())?
        .ok_or("block not found by hash")?;
    if by_hash != by_height {
        return Err("lookup by hash and by height disagree".to_string());
    }

    let ids: Vec<Hash> = facade
        .get_transactions_with_hash(&case.hash)
        .map_err(|e| e.to_string())?
        .unwrap_or_default()
        .iter()
        .map(|tx| tx.id)
        .collect();
    if ids != case.transaction_ids {
        return Err(format!(
            "{} transaction ids, expected {}",
            ids.len(),
            case.transaction_ids.len()
        ));
    }
    Ok(())
}

fn check_address<KV: KeyValueStore>(
    facade: &QueryFacade<KV>,
    case: &AddressCase,
) -> Result<(), String> {
    let outputs = facade
        .get_address_output_transactions(&case.address)
        .map_err(|e| e.to_string())?;
    if outputs != case.outputs {
        return Err(format!(
            "{} outputs, expected {}",
            outputs.len(),
            case.outputs.len()
        ));
    }

    let inputs = facade
        .get_address_input_transactions(&case.address)
        .map_err(|e| e.to_string())?;
    if inputs != case.inputs {
        return Err(format!(
            "{} inputs, expected {}",
            inputs.len(),
            case.inputs.len()
        ));
    }
    Ok(())
}
