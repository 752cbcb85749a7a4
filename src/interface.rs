//! String-in/string-out functions for the wallet front-end
//!
//! Structured values cross as JSON, hashes and keys as lowercase hex, and
//! amounts as decimal coin strings with `crypto_precision` digits.

use bitcoin_hashes::hex::ToHex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::*;
use crate::Ledger;

/// A transaction found in a chain, with the height of its block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundTransaction {
    pub transaction: Transaction,
    pub height: Height,
}

#[derive(Debug, Clone, Default)]
pub struct JsonInterface {
    ledger: Ledger,
}

impl JsonInterface {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Owned outputs of `address` in a JSON `TxStore`, as `OwnedOutputs` JSON
    pub fn my_utxos(&self, store_json: &str, address: &str) -> Result<String> {
        let store: TxStore = serde_json::from_str(store_json)?;
        let owned = self.ledger.owned_outputs(&store, address)?;
        Ok(serde_json::to_string(&owned)?)
    }

    /// Signed transaction JSON paying `amount` to `receiver` out of `owned_json`.
    /// The caller tracks `nonce` per sender and bumps it for each new spend.
    pub fn send(
        &self,
        owned_json: &str,
        secret_key_hex: &str,
        receiver: &str,
        amount: &str,
        fee: &str,
        nonce: u64,
    ) -> Result<String> {
        let owned: OwnedOutputs = serde_json::from_str(owned_json)?;
        let account = self.ledger.account_from_hex(secret_key_hex)?;
        let amount = self.ledger.parse_amount(amount)?;
        let fee = self.ledger.parse_amount(fee)?;

        let tx = self.ledger.send_from_owned(&owned, &account, receiver, amount, fee, nonce)?;
        Ok(serde_json::to_string(&tx)?)
    }

    pub fn tx_hash(&self, tx_json: &str) -> Result<String> {
        let tx: Transaction = serde_json::from_str(tx_json)?;
        Ok(self.ledger.transaction_id(&tx).to_hex())
    }

    /// `FoundTransaction` JSON, or `None` when no block holds `hash_hex`
    pub fn get_tx(&self, chain_json: &str, hash_hex: &str) -> Result<Option<String>> {
        let chain: Chain = serde_json::from_str(chain_json)?;
        let tx_id = hex_serde::parse_hash(hash_hex)?;

        match self.ledger.lookup_transaction(&chain, &tx_id) {
            Some((transaction, height)) => {
                Ok(Some(serde_json::to_string(&FoundTransaction { transaction, height })?))
            }
            None => Ok(None),
        }
    }

    pub fn calculate_mining_reward(&self, height: Height) -> String {
        self.ledger.format_amount(self.ledger.calculate_mining_reward(height))
    }

    pub fn block_hash(&self, block_json: &str) -> Result<String> {
        let block: Block = serde_json::from_str(block_json)?;
        Ok(self.ledger.block_id(&block).to_hex())
    }

    pub fn tx_vin_total(&self, tx_json: &str, store_json: &str) -> Result<String> {
        let tx: Transaction = serde_json::from_str(tx_json)?;
        let store: TxStore = serde_json::from_str(store_json)?;
        Ok(self.ledger.format_amount(self.ledger.vin_total(&tx, &store)?))
    }

    pub fn tx_vout_total(&self, tx_json: &str) -> Result<String> {
        let tx: Transaction = serde_json::from_str(tx_json)?;
        Ok(self.ledger.format_amount(self.ledger.vout_total(&tx)?))
    }

    pub fn get_address(&self, public_key_hex: &str) -> Result<String> {
        crate::keys::address_of_hex(public_key_hex)
    }

    /// Compressed public key of a secret key, hex encoded
    pub fn get_public_key(&self, secret_key_hex: &str) -> Result<String> {
        let account = self.ledger.account_from_hex(secret_key_hex)?;
        Ok(account.public_key().serialize().to_hex())
    }
}
