//! Transaction construction: spends with change, and coinbase

use log::debug;
use secp256k1::{Secp256k1, Signing};

use crate::constants::TX_IO_LIMIT;
use crate::economic::calculate_mining_reward;
use crate::error::{LedgerError, Result};
use crate::hashing::{input_message, signature_hash};
use crate::keys::Account;
use crate::selection::{select_with_policy, SelectionPolicy};
use crate::settings::Settings;
use crate::transaction::vout_total;
use crate::types::*;
use crate::utxo::owned_outputs;

/// BuildSend: (ℍ × ℕ × ℕ)* × 𝒜𝒞 × 𝒜 × ℕ × 𝒜 × ℕ × ℕ → 𝒯𝒳
///
/// 1. One input per chosen entry, in order
/// 2. Outputs: [amount → receiver, change → change_address if change > 0]
/// 3. Every input is signed over the signature hash and its position
/// 4. Σ chosen = Σ outputs + fee
/// 5. |chosen| ≤ TX_IO_LIMIT, so the result passes `check_transaction`
#[allow(clippy::too_many_arguments)]
pub fn build_send<C: Signing>(
    secp: &Secp256k1<C>,
    chosen: &[OwnedEntry],
    account: &Account,
    receiver: &str,
    amount: Amount,
    change_address: &str,
    fee: Amount,
    nonce: u64,
) -> Result<Transaction> {
    if chosen.is_empty() {
        return Err(LedgerError::MalformedInput("no outputs chosen to spend".to_string()));
    }
    if chosen.len() > TX_IO_LIMIT {
        return Err(LedgerError::TooManyInputs { count: chosen.len(), limit: TX_IO_LIMIT });
    }

    let available = chosen.iter().try_fold(0u128, |total, entry| {
        total
            .checked_add(entry.value)
            .ok_or_else(|| LedgerError::MalformedInput("chosen value overflows u128".to_string()))
    })?;
    let required = amount
        .checked_add(fee)
        .ok_or_else(|| LedgerError::MalformedInput("amount + fee overflows u128".to_string()))?;
    if available < required {
        return Err(LedgerError::InsufficientFunds { required, available });
    }
    let change = available - required;

    let mut vout = vec![Vout { value: amount, lock: receiver.to_string() }];
    if change > 0 {
        vout.push(Vout { value: change, lock: change_address.to_string() });
    }

    let mut tx = Transaction {
        nonce,
        vin: chosen
            .iter()
            .map(|entry| Vin {
                prev_tx_hash: entry.tx_id,
                index: entry.index,
                solution: Solution::default(),
            })
            .collect(),
        vout,
    };

    let sighash = signature_hash(&tx);
    for (position, vin) in tx.vin.iter_mut().enumerate() {
        let position = u32::try_from(position)
            .map_err(|_| LedgerError::MalformedInput("too many inputs".to_string()))?;
        vin.solution = account.solve(secp, &input_message(&sighash, position))?;
    }

    let spent = vout_total(&tx)?;
    assert_eq!(spent + fee, available, "built transaction does not conserve value");

    debug!(
        "built transaction: {} inputs, amount {}, change {}, fee {}",
        tx.vin.len(),
        amount,
        change,
        fee
    );
    Ok(tx)
}

/// Coinbase paying the block reward at `height` to `miner_address`
pub fn build_coinbase(height: Height, miner_address: &str, settings: &Settings) -> Transaction {
    Transaction {
        nonce: height,
        vin: vec![],
        vout: vec![Vout {
            value: calculate_mining_reward(height, settings),
            lock: miner_address.to_string(),
        }],
    }
}

/// Select from an owned-output view and build the spend, change back to the account
#[allow(clippy::too_many_arguments)]
pub fn send_from_owned<C: Signing>(
    secp: &Secp256k1<C>,
    owned: &OwnedOutputs,
    account: &Account,
    receiver: &str,
    amount: Amount,
    fee: Amount,
    nonce: u64,
    policy: SelectionPolicy,
) -> Result<Transaction> {
    let selection = select_with_policy(&owned.entries, amount, fee, policy)?;
    build_send(secp, &selection.chosen, account, receiver, amount, account.address(), fee, nonce)
}

/// Index → select → build against a store snapshot
#[allow(clippy::too_many_arguments)]
pub fn send<C: Signing>(
    secp: &Secp256k1<C>,
    store: &TxStore,
    account: &Account,
    receiver: &str,
    amount: Amount,
    fee: Amount,
    nonce: u64,
    policy: SelectionPolicy,
) -> Result<Transaction> {
    let owned = owned_outputs(store, account.address())?;
    send_from_owned(secp, &owned, account, receiver, amount, fee, nonce, policy)
}
