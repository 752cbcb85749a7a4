//! Canonical encoding and content hashing of transactions and blocks
//!
//! Every identifier in the ledger is a SHA-256 over a byte layout built here.
//! Integers are fixed-width little-endian, sequence and byte-string lengths
//! are CompactSize varints. The layout must not change: explorer lookups and
//! wallet balance matching compare these ids across deployments.

use bitcoin_hashes::{sha256d, Hash as BitcoinHash};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::constants::{ADDRESS_CHECKSUM_LEN, SIGHASH_TAG};
use crate::types::*;

/// SHA-256
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// RIPEMD-160(SHA-256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(sha256(data));
    let result = hasher.finalize();
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&result);
    hash
}

/// First bytes of the double SHA-256, used as an address checksum
pub fn checksum(data: &[u8]) -> [u8; ADDRESS_CHECKSUM_LEN] {
    let digest = sha256d::Hash::hash(data).into_inner();
    let mut out = [0u8; ADDRESS_CHECKSUM_LEN];
    out.copy_from_slice(&digest[..ADDRESS_CHECKSUM_LEN]);
    out
}

/// Byte sink for the canonical layout
#[derive(Default)]
struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    fn u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    fn u128(&mut self, value: u128) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    fn varint(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&encode_varint(value));
        self
    }

    fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.varint(bytes.len() as u64).raw(bytes)
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Encode a number as a CompactSize varint
pub fn encode_varint(value: u64) -> Vec<u8> {
    if value < 0xfd {
        vec![value as u8]
    } else if value <= 0xffff {
        let mut result = vec![0xfd];
        result.extend_from_slice(&(value as u16).to_le_bytes());
        result
    } else if value <= 0xffffffff {
        let mut result = vec![0xfe];
        result.extend_from_slice(&(value as u32).to_le_bytes());
        result
    } else {
        let mut result = vec![0xff];
        result.extend_from_slice(&value.to_le_bytes());
        result
    }
}

fn encode_transaction_into(enc: &mut Encoder, tx: &Transaction, with_solutions: bool) {
    enc.u64(tx.nonce).varint(tx.vin.len() as u64);
    for vin in &tx.vin {
        enc.raw(&vin.prev_tx_hash).u32(vin.index);
        if with_solutions {
            enc.bytes(&vin.solution.public_key).bytes(&vin.solution.signature);
        }
    }
    enc.varint(tx.vout.len() as u64);
    for vout in &tx.vout {
        enc.u128(vout.value).bytes(vout.lock.as_bytes());
    }
}

/// Canonical encoding of a full transaction, solutions included
pub fn encode_transaction(tx: &Transaction) -> Vec<u8> {
    let mut enc = Encoder::default();
    encode_transaction_into(&mut enc, tx, true);
    enc.finish()
}

/// Transaction identifier: SHA-256 of the canonical encoding
pub fn transaction_id(tx: &Transaction) -> Hash {
    sha256(&encode_transaction(tx))
}

/// Hash every spending proof of `tx` commits to.
///
/// Covers the nonce, every input reference and every output, but no solution,
/// so all inputs can be signed before any solution is attached.
pub fn signature_hash(tx: &Transaction) -> Hash {
    let mut enc = Encoder::default();
    enc.raw(SIGHASH_TAG);
    encode_transaction_into(&mut enc, tx, false);
    sha256(&enc.finish())
}

/// Message signed for the input at `position`
pub fn input_message(sighash: &Hash, position: u32) -> Hash {
    let mut enc = Encoder::default();
    enc.raw(sighash).u32(position);
    sha256(&enc.finish())
}

/// Block identifier.
///
/// Header fields followed by the ids of the block's transactions, in order.
/// Transaction bodies are not re-hashed.
pub fn block_id(block: &Block) -> Hash {
    let mut enc = Encoder::default();
    enc.u64(block.height)
        .u64(block.timestamp)
        .raw(&block.previous)
        .u64(block.nonce)
        .varint(block.transactions.len() as u64);
    for tx in &block.transactions {
        enc.raw(&transaction_id(tx));
    }
    sha256(&enc.finish())
}
