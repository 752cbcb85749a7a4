//! Owned-output index over a transaction store snapshot

use log::trace;
use std::collections::HashSet;

use crate::error::{LedgerError, Result};
use crate::hashing::transaction_id;
use crate::transaction::is_coinbase;
use crate::types::*;

/// OwnedOutputs: 𝒰𝒮 × 𝒜 → ℕ × (ℍ × ℕ × ℕ)*
///
/// Every unspent output of `store` locked to `address`, in store order
/// (tx id bytes, then output index), with their summed value.
pub fn owned_outputs(store: &TxStore, address: &str) -> Result<OwnedOutputs> {
    let mut owned = OwnedOutputs::default();
    for (outpoint, vout) in store.iter() {
        if vout.lock == address {
            push_entry(&mut owned, outpoint, vout.value)?;
        }
    }
    trace!("{} owns {} outputs worth {}", address, owned.entries.len(), owned.balance);
    Ok(owned)
}

/// Same view computed from an ordered transaction log.
///
/// An output counts when its lock is `address` and no input anywhere in the
/// log references it. Entries follow log order, then output index. A
/// transaction repeated with the same id is counted once.
pub fn owned_outputs_in_log(log: &[Transaction], address: &str) -> Result<OwnedOutputs> {
    let spent: HashSet<OutPoint> = log
        .iter()
        .flat_map(|tx| tx.vin.iter().map(Vin::outpoint))
        .collect();

    let mut seen: HashSet<Hash> = HashSet::new();
    let mut owned = OwnedOutputs::default();

    for tx in log {
        let tx_id = transaction_id(tx);
        if !seen.insert(tx_id) {
            trace!("skipping repeated transaction in log");
            continue;
        }
        for (index, vout) in tx.vout.iter().enumerate() {
            let outpoint = OutPoint { hash: tx_id, index: output_index(index)? };
            if vout.lock == address && !spent.contains(&outpoint) {
                push_entry(&mut owned, outpoint, vout.value)?;
            }
        }
    }
    Ok(owned)
}

fn push_entry(owned: &mut OwnedOutputs, outpoint: OutPoint, value: Amount) -> Result<()> {
    owned.balance = owned
        .balance
        .checked_add(value)
        .ok_or_else(|| LedgerError::MalformedInput("balance overflows u128".to_string()))?;
    owned.entries.push(OwnedEntry { tx_id: outpoint.hash, index: outpoint.index, value });
    Ok(())
}

pub(crate) fn output_index(index: usize) -> Result<u32> {
    u32::try_from(index)
        .map_err(|_| LedgerError::MalformedInput(format!("output index {index} exceeds u32")))
}

/// ApplyTransaction: 𝒯𝒳 × 𝒰𝒮 → 𝒰𝒮
///
/// 1. Remove every output the transaction spends (a missing one is an error)
/// 2. Insert its outputs under its id
///
/// Does not check spending proofs or value balance; run
/// `transaction::verify_transaction` first for untrusted input.
pub fn apply_transaction(tx: &Transaction, mut store: TxStore) -> Result<TxStore> {
    for vin in &tx.vin {
        let outpoint = vin.outpoint();
        if store.remove(&outpoint).is_none() {
            return Err(LedgerError::MissingOutput(describe(&outpoint)));
        }
    }

    let tx_id = transaction_id(tx);
    for (index, vout) in tx.vout.iter().enumerate() {
        store.insert(OutPoint { hash: tx_id, index: output_index(index)? }, vout.clone());
    }

    trace!(
        "applied {} transaction with {} inputs and {} outputs",
        if is_coinbase(tx) { "coinbase" } else { "regular" },
        tx.vin.len(),
        tx.vout.len()
    );
    Ok(store)
}

/// Replay an ordered log into the unspent set it leaves behind
pub fn store_from_log(log: &[Transaction]) -> Result<TxStore> {
    log.iter().try_fold(TxStore::new(), |store, tx| apply_transaction(tx, store))
}

pub(crate) fn describe(outpoint: &OutPoint) -> String {
    use bitcoin_hashes::hex::ToHex;
    format!("{}:{}", outpoint.hash.to_hex(), outpoint.index)
}
