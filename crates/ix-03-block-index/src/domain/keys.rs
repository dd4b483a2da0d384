//! # Key Layout
//!
//! | Prefix | Key | Value |
//! |--------|-----|-------|
//! | `b:` | hash | bincode `Block` |
//! | `h:` | height (u64 BE) | hash |
//! | `t:` | txid | bincode `Transaction` |
//! | `o:` | addr_len (u16 BE), address, height (BE), tx position (u32 BE), output index (u32 BE) | bincode `TransactionOutput` |
//! | `i:` | same as `o:` with the input index | bincode `TransactionInput` |
//! | `m:tip` | | height (BE) + hash |
//!
//! Big-endian integers make byte order equal numeric order, so prefix scans
//! come back in chain order. The address length prefix stops `"ab"` from
//! matching a scan for `"a"`.

use shared_types::{BlockHeight, Hash};

/// Longest address that fits the u16 length prefix.
pub const MAX_ADDRESS_LEN: usize = u16::MAX as usize;

/// Key namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    /// Block data: `b:{hash}` -> Block
    Block,
    /// Height to hash index: `h:{height}` -> Hash
    BlockByHeight,
    /// Transaction data: `t:{txid}` -> Transaction
    Transaction,
    /// Receive side: `o:{address}{position}` -> TransactionOutput
    AddressOutput,
    /// Spend side: `i:{address}{position}` -> TransactionInput
    AddressInput,
    /// Index metadata: `m:{name}`
    Metadata,
}

impl KeyPrefix {
    /// Get the byte prefix for this key type.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Block => b"b:",
            KeyPrefix::BlockByHeight => b"h:",
            KeyPrefix::Transaction => b"t:",
            KeyPrefix::AddressOutput => b"o:",
            KeyPrefix::AddressInput => b"i:",
            KeyPrefix::Metadata => b"m:",
        }
    }

    /// Build a full key with the given suffix.
    pub fn key(&self, suffix: &[u8]) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        key.extend_from_slice(suffix);
        key
    }

    pub fn block_key(hash: &Hash) -> Vec<u8> {
        KeyPrefix::Block.key(hash)
    }

    pub fn height_key(height: BlockHeight) -> Vec<u8> {
        KeyPrefix::BlockByHeight.key(&height.to_be_bytes())
    }

    /// Height encoded in an `h:` key.
    pub fn height_from_key(key: &[u8]) -> Option<BlockHeight> {
        let suffix = key.strip_prefix(KeyPrefix::BlockByHeight.as_bytes())?;
        Some(BlockHeight::from_be_bytes(suffix.try_into().ok()?))
    }

    pub fn transaction_key(id: &Hash) -> Vec<u8> {
        KeyPrefix::Transaction.key(id)
    }

    /// Scan prefix covering every entry of `address` in this namespace.
    ///
    /// Callers must keep `address` within `MAX_ADDRESS_LEN`; the block
    /// index rejects longer addresses before building keys.
    pub fn address_prefix(&self, address: &str) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        key.extend_from_slice(&(address.len() as u16).to_be_bytes());
        key.extend_from_slice(address.as_bytes());
        key
    }

    /// Key of one address entry.
    pub fn address_key(
        &self,
        address: &str,
        height: BlockHeight,
        tx_position: u32,
        index: u32,
    ) -> Vec<u8> {
        let mut key = self.address_prefix(address);
        key.extend_from_slice(&height.to_be_bytes());
        key.extend_from_slice(&tx_position.to_be_bytes());
        key.extend_from_slice(&index.to_be_bytes());
        key
    }

    pub fn tip_key() -> Vec<u8> {
        KeyPrefix::Metadata.key(b"tip")
    }
}
