//! Block builders shared by the integration tests and the benches.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::{Amount, Block, BlockHeight, Hash, Transaction, TransactionInput, TransactionOutput};
use std::io::Write;
use std::path::Path;

/// Non-zero hash with `tag` in the first byte and `n` in the last eight.
pub fn hash(tag: u8, n: u64) -> Hash {
    let mut h = [0u8; 32];
    h[0] = tag;
    h[24..].copy_from_slice(&n.to_be_bytes());
    h
}

pub fn block_hash(height: BlockHeight) -> Hash {
    hash(0xB0, height)
}

pub fn output(address: &str, amount: Amount) -> TransactionOutput {
    TransactionOutput {
        address: address.to_string(),
        amount,
    }
}

pub fn input(source_address: &str, amount: Amount, spent: Hash) -> TransactionInput {
    TransactionInput {
        source_address: source_address.to_string(),
        amount,
        spent_transaction_id: spent,
    }
}

pub fn tx(id: Hash, inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Transaction {
    Transaction {
        id,
        inputs,
        outputs,
    }
}

/// Block at `height` with a hash derived from the height.
pub fn block(height: BlockHeight, confirmations: u64, transactions: Vec<Transaction>) -> Block {
    Block {
        hash: block_hash(height),
        height,
        confirmations,
        transactions,
    }
}

/// Deterministic chain of `blocks` blocks over an address pool.
///
/// Every block has between one and `max_txs` transactions. After the first
/// block, transactions spend earlier outputs, so both address views fill up.
/// Confirmations count down towards the tip the way a live node reports
/// them.
pub fn synthetic_chain(seed: u64, blocks: u64, max_txs: usize, addresses: usize) -> Vec<Block> {
    let mut rng = StdRng::seed_from_u64(seed);
    let pool: Vec<String> = (0..addresses.max(1)).map(|i| format!("addr-{i:04}")).collect();
    let mut unspent: Vec<(Hash, String, Amount)> = Vec::new();
    let mut next_tx = 1u64;

    (1..=blocks)
        .map(|height| {
            let tx_count = rng.gen_range(1..=max_txs.max(1));
            let transactions = (0..tx_count)
                .map(|_| {
                    let id = hash(0x7A, next_tx);
                    next_tx += 1;

                    let mut inputs = Vec::new();
                    if !unspent.is_empty() && rng.gen_bool(0.6) {
                        let (spent, address, amount) =
                            unspent.swap_remove(rng.gen_range(0..unspent.len()));
                        inputs.push(input(&address, amount, spent));
                    }

                    let outputs: Vec<TransactionOutput> = (0..rng.gen_range(1..=3))
                        .map(|_| {
                            let address = &pool[rng.gen_range(0..pool.len())];
                            output(address, rng.gen_range(1..10_000))
                        })
                        .collect();
                    for o in &outputs {
                        unspent.push((id, o.address.clone(), o.amount));
                    }

                    tx(id, inputs, outputs)
                })
                .collect();

            block(height, blocks - height + 1, transactions)
        })
        .collect()
}

/// Write blocks as a JSON-lines block file.
pub fn write_block_file(path: &Path, blocks: &[Block]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    for block in blocks {
        let line = serde_json::to_string(block).map_err(std::io::Error::other)?;
        writeln!(file, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_synthetic_chain_is_valid() {
        let chain = synthetic_chain(7, 50, 4, 10);
        assert_eq!(chain.len(), 50);

        let mut ids = HashSet::new();
        for block in &chain {
            block.validate().unwrap();
            for tx in &block.transactions {
                assert!(ids.insert(tx.id));
            }
        }
        assert_eq!(chain.last().unwrap().confirmations, 1);
    }

    #[test]
    fn test_synthetic_chain_is_deterministic() {
        assert_eq!(synthetic_chain(3, 10, 3, 5), synthetic_chain(3, 10, 3, 5));
    }
}
