//! Read-only queries over a chain snapshot

use log::trace;

use crate::error::Result;
use crate::hashing::transaction_id;
use crate::types::*;
use crate::utxo::store_from_log;

/// LookupTransaction: 𝒞 × ℍ → (𝒯𝒳 × ℕ)?
///
/// Linear search in chain order; the first match is returned with the height
/// of the block that contains it.
pub fn lookup_transaction(chain: &[Block], tx_id: &Hash) -> Option<(Transaction, Height)> {
    let found = chain.iter().find_map(|block| {
        block
            .transactions
            .iter()
            .find(|tx| transaction_id(tx) == *tx_id)
            .map(|tx| (tx.clone(), block.height))
    });
    if found.is_none() {
        trace!("transaction not found in {} blocks", chain.len());
    }
    found
}

/// Unspent outputs left by replaying every block's transactions in order
pub fn store_from_chain(chain: &[Block]) -> Result<TxStore> {
    let log: Vec<Transaction> =
        chain.iter().flat_map(|block| block.transactions.iter().cloned()).collect();
    store_from_log(&log)
}
