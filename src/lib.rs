//! # macc-ledger
//!
//! UTXO ledger and transaction-construction engine for a small cryptocurrency.
//!
//! The crate reads chain state that somebody else produced and builds candidate
//! transactions for somebody else to submit. It owns the accounting rules:
//! content-addressed identifiers, owned-output views, coin selection, signed
//! spends with change, the reward schedule and lookups over a chain snapshot.
//!
//! ## Architecture
//!
//! Leaves first:
//! - `hashing`, `keys`: canonical encoding, ids, addresses, spending proofs
//! - `utxo`: owned outputs and balance over a store or a transaction log
//! - `selection`: coin selection covering amount plus fee
//! - `builder`: inputs, outputs, change and signatures
//! - `economic`, `chain`, `transaction`: reward, lookup, totals and verification
//! - `interface`: string-in/string-out functions for the wallet front-end
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every operation is a deterministic function of its arguments
//! 2. **Exact Arithmetic**: amounts are `u128` in the smallest unit, no floating point
//! 3. **Explicit Handle**: `Ledger` carries settings and the secp256k1 context; no globals
//! 4. **Exact Version Pinning**: all hashing and signature dependencies pinned
//!
//! ## Usage
//!
//! ```rust
//! use macc_ledger::Ledger;
//!
//! let ledger = Ledger::new();
//! let miner = ledger.account_from_hex(&"01".repeat(32)).unwrap();
//! let coinbase = ledger.build_coinbase(0, miner.address());
//! let store = ledger.apply_transaction(&coinbase, Default::default()).unwrap();
//!
//! let owned = ledger.owned_outputs(&store, miner.address()).unwrap();
//! assert_eq!(owned.balance, ledger.calculate_mining_reward(0));
//! ```

pub mod types;
pub mod constants;
pub mod hashing;
pub mod keys;
pub mod utxo;
pub mod selection;
pub mod builder;
pub mod transaction;
pub mod economic;
pub mod chain;
pub mod settings;
pub mod interface;
pub mod error;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use error::{LedgerError, Result};
pub use keys::Account;
pub use selection::SelectionPolicy;
pub use settings::Settings;

use secp256k1::{All, Secp256k1};

/// Ledger engine handle
///
/// Constructed once and passed by reference to every call. Holds the engine
/// settings and a signing/verification context; it is `Send + Sync`.
///
/// # Examples
///
/// ```
/// use macc_ledger::{Ledger, Settings};
///
/// let settings = Settings::from_json(r#"{"halvings_interval": 4}"#).unwrap();
/// let ledger = Ledger::with_settings(settings).unwrap();
///
/// assert_eq!(ledger.calculate_mining_reward(4), ledger.calculate_mining_reward(0) / 2);
/// ```
#[derive(Debug, Clone)]
pub struct Ledger {
    secp: Secp256k1<All>,
    settings: Settings,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Ledger with default settings
    pub fn new() -> Self {
        Self { secp: Secp256k1::new(), settings: Settings::default() }
    }

    /// Ledger with validated settings
    pub fn with_settings(settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { secp: Secp256k1::new(), settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Account for a hex-encoded secret key
    pub fn account_from_hex(&self, secret_key_hex: &str) -> Result<Account> {
        Account::from_secret_hex(&self.secp, secret_key_hex)
    }

    /// Account for a raw 32-byte secret key
    pub fn account_from_bytes(&self, secret_key: &[u8]) -> Result<Account> {
        Account::from_secret_bytes(&self.secp, secret_key)
    }

    pub fn transaction_id(&self, tx: &Transaction) -> Hash {
        hashing::transaction_id(tx)
    }

    pub fn block_id(&self, block: &Block) -> Hash {
        hashing::block_id(block)
    }

    /// Address of a serialized compressed public key
    pub fn address_of(&self, public_key: &[u8]) -> Address {
        keys::address_of(public_key)
    }

    pub fn validate_address(&self, address: &str) -> bool {
        keys::validate_address(address)
    }

    /// Owned outputs of `address` in an unspent store
    ///
    /// # Examples
    ///
    /// ```
    /// use macc_ledger::{Ledger, TxStore};
    ///
    /// let ledger = Ledger::new();
    /// let owned = ledger.owned_outputs(&TxStore::new(), "nobody").unwrap();
    /// assert_eq!(owned.balance, 0);
    /// assert!(owned.entries.is_empty());
    /// ```
    pub fn owned_outputs(&self, store: &TxStore, address: &str) -> Result<OwnedOutputs> {
        utxo::owned_outputs(store, address)
    }

    /// Owned outputs of `address` in an ordered transaction log
    pub fn owned_outputs_in_log(&self, log: &[Transaction], address: &str) -> Result<OwnedOutputs> {
        utxo::owned_outputs_in_log(log, address)
    }

    /// Coin selection with the configured policy
    pub fn select(&self, entries: &[OwnedEntry], amount: Amount, fee: Amount) -> Result<Selection> {
        selection::select_with_policy(entries, amount, fee, self.settings.selection_policy)
    }

    /// Signed spend of `chosen`; see `builder::build_send`
    #[allow(clippy::too_many_arguments)]
    pub fn build_send(
        &self,
        chosen: &[OwnedEntry],
        account: &Account,
        receiver: &str,
        amount: Amount,
        change_address: &str,
        fee: Amount,
        nonce: u64,
    ) -> Result<Transaction> {
        builder::build_send(&self.secp, chosen, account, receiver, amount, change_address, fee, nonce)
    }

    pub fn build_coinbase(&self, height: Height, miner_address: &str) -> Transaction {
        builder::build_coinbase(height, miner_address, &self.settings)
    }

    /// Pay `amount` to `receiver` from the account's outputs in `store`, change back to the account.
    /// The sender picks `nonce`; bumping it gives a resubmitted spend a new id.
    ///
    /// # Examples
    ///
    /// ```
    /// use macc_ledger::{Ledger, LedgerError, TxStore};
    ///
    /// let ledger = Ledger::new();
    /// let alice = ledger.account_from_hex(&"01".repeat(32)).unwrap();
    /// let result = ledger.send(&TxStore::new(), &alice, "receiver", 10, 0, 0);
    /// assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
    /// ```
    #[allow(clippy::too_many_arguments)]
    pub fn send(
        &self,
        store: &TxStore,
        account: &Account,
        receiver: &str,
        amount: Amount,
        fee: Amount,
        nonce: u64,
    ) -> Result<Transaction> {
        let policy = self.settings.selection_policy;
        builder::send(&self.secp, store, account, receiver, amount, fee, nonce, policy)
    }

    /// Same as `send`, from an owned-output view the caller already holds
    pub fn send_from_owned(
        &self,
        owned: &OwnedOutputs,
        account: &Account,
        receiver: &str,
        amount: Amount,
        fee: Amount,
        nonce: u64,
    ) -> Result<Transaction> {
        builder::send_from_owned(
            &self.secp,
            owned,
            account,
            receiver,
            amount,
            fee,
            nonce,
            self.settings.selection_policy,
        )
    }

    pub fn calculate_mining_reward(&self, height: Height) -> Amount {
        economic::calculate_mining_reward(height, &self.settings)
    }

    pub fn total_supply(&self, height: Height) -> Result<Amount> {
        economic::total_supply(height, &self.settings)
    }

    pub fn parse_amount(&self, text: &str) -> Result<Amount> {
        economic::parse_amount(text, self.settings.crypto_precision)
    }

    pub fn format_amount(&self, amount: Amount) -> String {
        economic::format_amount(amount, self.settings.crypto_precision)
    }

    pub fn lookup_transaction(&self, chain: &[Block], tx_id: &Hash) -> Option<(Transaction, Height)> {
        chain::lookup_transaction(chain, tx_id)
    }

    pub fn store_from_chain(&self, chain: &[Block]) -> Result<TxStore> {
        chain::store_from_chain(chain)
    }

    pub fn is_coinbase(&self, tx: &Transaction) -> bool {
        transaction::is_coinbase(tx)
    }

    pub fn vin_total(&self, tx: &Transaction, store: &TxStore) -> Result<Amount> {
        transaction::vin_total(tx, store)
    }

    pub fn vout_total(&self, tx: &Transaction) -> Result<Amount> {
        transaction::vout_total(tx)
    }

    pub fn calculate_fee(&self, tx: &Transaction, store: &TxStore) -> Result<Amount> {
        transaction::calculate_fee(tx, store)
    }

    /// Check proofs and value balance of `tx` against `store`; returns the fee
    pub fn verify_transaction(&self, tx: &Transaction, store: &TxStore) -> Result<Amount> {
        transaction::verify_transaction(&self.secp, tx, store)
    }

    /// Spend the transaction's inputs from `store` and add its outputs
    pub fn apply_transaction(&self, tx: &Transaction, store: TxStore) -> Result<TxStore> {
        utxo::apply_transaction(tx, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_ledger_is_send_sync() {
        assert_send_sync::<Ledger>();
    }

    #[test]
    fn test_with_settings_validates() {
        let settings = Settings { halvings_interval: 0, ..Settings::default() };
        assert!(matches!(Ledger::with_settings(settings), Err(LedgerError::InvalidSettings(_))));
    }

    #[test]
    fn test_select_uses_configured_policy() {
        let settings = Settings { selection_policy: SelectionPolicy::LargestFirst, ..Settings::default() };
        let ledger = Ledger::with_settings(settings).unwrap();
        let entries = vec![
            OwnedEntry { tx_id: [1; 32], index: 0, value: 5 },
            OwnedEntry { tx_id: [2; 32], index: 0, value: 50 },
        ];
        let selection = ledger.select(&entries, 20, 0).unwrap();
        assert_eq!(selection.chosen, vec![entries[1].clone()]);
        assert_eq!(selection.change, 30);
    }

    #[test]
    fn test_coinbase_then_send_round() {
        let ledger = Ledger::new();
        let alice = ledger.account_from_bytes(&[1; 32]).unwrap();
        let bob = ledger.account_from_bytes(&[2; 32]).unwrap();

        let store = ledger.apply_transaction(&ledger.build_coinbase(0, alice.address()), TxStore::new()).unwrap();
        let tx = ledger.send(&store, &alice, bob.address(), 40_000, 1, 0).unwrap();
        assert_eq!(ledger.verify_transaction(&tx, &store).unwrap(), 1);

        let store = ledger.apply_transaction(&tx, store).unwrap();
        assert_eq!(ledger.owned_outputs(&store, bob.address()).unwrap().balance, 40_000);
        assert_eq!(
            ledger.owned_outputs(&store, alice.address()).unwrap().balance,
            START_MINING_REWARD - 40_001
        );
    }

    #[test]
    fn test_amount_conversion_follows_precision() {
        let ledger = Ledger::new();
        assert_eq!(ledger.parse_amount("2.5").unwrap(), 2_500);
        assert_eq!(ledger.format_amount(2_500), "2.500");
    }
}
