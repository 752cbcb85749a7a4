//! Core ledger types: outputs, inputs, transactions, blocks and the unspent store

use bitcoin_hashes::hex::{FromHex, ToHex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LedgerError;

/// Hash type: 256-bit identifier
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Value in the smallest unit
pub type Amount = u128;

/// Block height
pub type Height = u64;

/// Base58Check address that locks an output
pub type Address = String;

/// Reference to one output of one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPoint {
    #[serde(with = "hex_serde::hash")]
    pub hash: Hash,
    pub index: u32,
}

/// Spending proof: the owner's public key and a signature over the spending transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Solution {
    #[serde(with = "hex_serde::bytes")]
    pub public_key: ByteString,
    #[serde(with = "hex_serde::bytes")]
    pub signature: ByteString,
}

impl Solution {
    pub fn is_empty(&self) -> bool {
        self.public_key.is_empty() && self.signature.is_empty()
    }
}

/// Transaction input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vin {
    #[serde(with = "hex_serde::hash")]
    pub prev_tx_hash: Hash,
    pub index: u32,
    #[serde(default)]
    pub solution: Solution,
}

impl Vin {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint { hash: self.prev_tx_hash, index: self.index }
    }
}

/// Transaction output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vout {
    pub value: Amount,
    pub lock: Address,
}

/// Transaction. An empty `vin` marks a coinbase; its nonce is the block height.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub nonce: u64,
    pub vin: Vec<Vin>,
    pub vout: Vec<Vout>,
}

/// Block as supplied by the external chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub height: Height,
    pub timestamp: u64,
    #[serde(with = "hex_serde::hash", default)]
    pub previous: Hash,
    #[serde(default)]
    pub nonce: u64,
    pub transactions: Vec<Transaction>,
}

/// Chain snapshot, ordered by height
pub type Chain = Vec<Block>;

/// One unspent output owned by an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedEntry {
    #[serde(with = "hex_serde::hash")]
    pub tx_id: Hash,
    pub index: u32,
    pub value: Amount,
}

impl OwnedEntry {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint { hash: self.tx_id, index: self.index }
    }
}

/// Owned-output view of a snapshot for one address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedOutputs {
    pub balance: Amount,
    pub entries: Vec<OwnedEntry>,
}

/// Result of coin selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub chosen: Vec<OwnedEntry>,
    pub change: Amount,
}

type RawTxStore = BTreeMap<String, BTreeMap<u32, Vout>>;

/// Unspent outputs: tx id → output index → output.
///
/// Ordered by tx id bytes, then index. Crosses the JSON boundary keyed by hex id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTxStore", into = "RawTxStore")]
pub struct TxStore(BTreeMap<Hash, BTreeMap<u32, Vout>>);

impl TxStore {
    pub fn new() -> Self {
        TxStore(BTreeMap::new())
    }

    pub fn get(&self, outpoint: &OutPoint) -> Option<&Vout> {
        self.0.get(&outpoint.hash)?.get(&outpoint.index)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.get(outpoint).is_some()
    }

    pub fn insert(&mut self, outpoint: OutPoint, vout: Vout) {
        self.0.entry(outpoint.hash).or_default().insert(outpoint.index, vout);
    }

    /// Removes an output, dropping the transaction entry once it has none left
    pub fn remove(&mut self, outpoint: &OutPoint) -> Option<Vout> {
        let outputs = self.0.get_mut(&outpoint.hash)?;
        let removed = outputs.remove(&outpoint.index);
        if outputs.is_empty() {
            self.0.remove(&outpoint.hash);
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutPoint, &Vout)> + '_ {
        self.0.iter().flat_map(|(hash, outputs)| {
            outputs
                .iter()
                .map(move |(index, vout)| (OutPoint { hash: *hash, index: *index }, vout))
        })
    }

    /// Number of unspent outputs
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<RawTxStore> for TxStore {
    type Error = LedgerError;

    fn try_from(raw: RawTxStore) -> Result<Self, Self::Error> {
        let mut store = BTreeMap::new();
        for (key, outputs) in raw {
            store.insert(hex_serde::parse_hash(&key)?, outputs);
        }
        Ok(TxStore(store))
    }
}

impl From<TxStore> for RawTxStore {
    fn from(store: TxStore) -> Self {
        store.0.into_iter().map(|(hash, outputs)| (hash.to_hex(), outputs)).collect()
    }
}

/// Hex encoding of byte fields at the serde boundary
pub mod hex_serde {
    use super::*;

    pub fn parse_hash(s: &str) -> Result<Hash, LedgerError> {
        let bytes = parse_bytes(s)?;
        bytes.try_into().map_err(|b: Vec<u8>| {
            LedgerError::MalformedInput(format!("expected 32-byte hash, got {} bytes", b.len()))
        })
    }

    pub fn parse_bytes(s: &str) -> Result<ByteString, LedgerError> {
        Vec::<u8>::from_hex(s).map_err(|e| LedgerError::MalformedInput(format!("invalid hex: {e}")))
    }

    pub mod hash {
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        use super::super::Hash;
        use bitcoin_hashes::hex::ToHex;

        pub fn serialize<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&hash.to_hex())
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
            let s = String::deserialize(deserializer)?;
            super::parse_hash(&s).map_err(D::Error::custom)
        }
    }

    pub mod bytes {
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        use bitcoin_hashes::hex::ToHex;

        pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&bytes.to_hex())
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<u8>, D::Error> {
            let s = String::deserialize(deserializer)?;
            super::parse_bytes(&s).map_err(D::Error::custom)
        }
    }
}
