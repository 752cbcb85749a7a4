//! Transaction totals, structure checks and spending verification

use log::debug;
use secp256k1::{Secp256k1, Verification};
use std::collections::HashSet;

use crate::constants::*;
use crate::error::{LedgerError, Result};
use crate::hashing::{input_message, signature_hash};
use crate::keys::verify_solution;
use crate::types::*;
use crate::utxo::describe;

/// A transaction without inputs mints value
pub fn is_coinbase(tx: &Transaction) -> bool {
    tx.vin.is_empty()
}

/// VoutTotal: 𝒯𝒳 → ℕ
pub fn vout_total(tx: &Transaction) -> Result<Amount> {
    checked_sum(tx.vout.iter().map(|vout| vout.value))
}

/// VinTotal: 𝒯𝒳 × 𝒰𝒮 → ℕ
///
/// Sum of the outputs the inputs reference. Every referenced output must be
/// present in `store`.
pub fn vin_total(tx: &Transaction, store: &TxStore) -> Result<Amount> {
    let mut values = Vec::with_capacity(tx.vin.len());
    for vin in &tx.vin {
        let outpoint = vin.outpoint();
        let vout = store
            .get(&outpoint)
            .ok_or_else(|| LedgerError::MissingOutput(describe(&outpoint)))?;
        values.push(vout.value);
    }
    checked_sum(values)
}

/// Fee = vin_total - vout_total; zero for coinbase
pub fn calculate_fee(tx: &Transaction, store: &TxStore) -> Result<Amount> {
    if is_coinbase(tx) {
        return Ok(0);
    }

    let input = vin_total(tx, store)?;
    let output = vout_total(tx)?;
    input
        .checked_sub(output)
        .ok_or(LedgerError::InsufficientFunds { required: output, available: input })
}

fn checked_sum(values: impl IntoIterator<Item = Amount>) -> Result<Amount> {
    values.into_iter().try_fold(0u128, |total, value| {
        total
            .checked_add(value)
            .ok_or_else(|| LedgerError::MalformedInput("value total overflows u128".to_string()))
    })
}

/// CheckTransaction: 𝒯𝒳 → {valid, invalid}
///
/// 1. |outs| > 0
/// 2. |ins| ≤ TX_IO_LIMIT ∧ |outs| ≤ TX_IO_LIMIT
/// 3. No input references the same output twice
/// 4. A coinbase has exactly one output
/// 5. Output totals fit in u128
pub fn check_transaction(tx: &Transaction) -> Result<()> {
    if tx.vout.is_empty() {
        return Err(LedgerError::MalformedInput("transaction has no outputs".to_string()));
    }

    if tx.vin.len() > TX_IO_LIMIT || tx.vout.len() > TX_IO_LIMIT {
        return Err(LedgerError::MalformedInput(format!(
            "too many inputs or outputs: {} / {}",
            tx.vin.len(),
            tx.vout.len()
        )));
    }

    let mut seen = HashSet::with_capacity(tx.vin.len());
    for vin in &tx.vin {
        let outpoint = vin.outpoint();
        if !seen.insert(outpoint) {
            return Err(LedgerError::DoubleSpend(describe(&outpoint)));
        }
    }

    if is_coinbase(tx) && tx.vout.len() != 1 {
        return Err(LedgerError::MalformedInput(format!(
            "coinbase must have exactly one output, has {}",
            tx.vout.len()
        )));
    }

    vout_total(tx)?;
    Ok(())
}

/// VerifyTransaction: 𝒯𝒳 × 𝒰𝒮 → ℕ
///
/// For a non-coinbase transaction spending from `store`:
/// 1. The structure passes `check_transaction`
/// 2. Every input references an unspent output of `store`
/// 3. Every solution matches the lock of its output and signs this transaction
/// 4. Inputs cover outputs
///
/// Returns the fee.
pub fn verify_transaction<C: Verification>(
    secp: &Secp256k1<C>,
    tx: &Transaction,
    store: &TxStore,
) -> Result<Amount> {
    check_transaction(tx)?;
    if is_coinbase(tx) {
        return Err(LedgerError::MalformedInput(
            "coinbase transactions are checked by the chain, not spent against a store"
                .to_string(),
        ));
    }

    let sighash = signature_hash(tx);
    for (position, vin) in tx.vin.iter().enumerate() {
        let outpoint = vin.outpoint();
        let vout = store
            .get(&outpoint)
            .ok_or_else(|| LedgerError::MissingOutput(describe(&outpoint)))?;

        let position = u32::try_from(position)
            .map_err(|_| LedgerError::MalformedInput("too many inputs".to_string()))?;
        let message = input_message(&sighash, position);
        if let Err(e) = verify_solution(secp, &vin.solution, &vout.lock, &message) {
            debug!("input {} of transaction fails verification: {}", position, e);
            return Err(e);
        }
    }

    calculate_fee(tx, store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utxo::store_from_log;

    fn coinbase(nonce: u64, value: Amount) -> Transaction {
        Transaction { nonce, vin: vec![], vout: vec![Vout { value, lock: "alice".to_string() }] }
    }

    fn spending(prev: Hash, indices: &[u32], outputs: &[Amount]) -> Transaction {
        Transaction {
            nonce: 0,
            vin: indices
                .iter()
                .map(|&index| Vin { prev_tx_hash: prev, index, solution: Solution::default() })
                .collect(),
            vout: outputs.iter().map(|&value| Vout { value, lock: "bob".to_string() }).collect(),
        }
    }

    #[test]
    fn test_is_coinbase() {
        assert!(is_coinbase(&coinbase(0, 1)));
        assert!(!is_coinbase(&spending([1; 32], &[0], &[1])));
    }

    #[test]
    fn test_vout_total() {
        let tx = spending([1; 32], &[0], &[600, 400, 1]);
        assert_eq!(vout_total(&tx).unwrap(), 1001);
    }

    #[test]
    fn test_vout_total_overflow() {
        let tx = spending([1; 32], &[0], &[Amount::MAX, 1]);
        assert!(matches!(vout_total(&tx), Err(LedgerError::MalformedInput(_))));
    }

    #[test]
    fn test_vin_total_and_fee() {
        let cb = coinbase(0, 1000);
        let store = store_from_log(&[cb.clone()]).unwrap();
        let tx = spending(crate::hashing::transaction_id(&cb), &[0], &[900]);

        assert_eq!(vin_total(&tx, &store).unwrap(), 1000);
        assert_eq!(calculate_fee(&tx, &store).unwrap(), 100);
    }

    #[test]
    fn test_vin_total_missing_output() {
        let tx = spending([1; 32], &[0], &[1]);
        assert!(matches!(vin_total(&tx, &TxStore::new()), Err(LedgerError::MissingOutput(_))));
    }

    #[test]
    fn test_negative_fee_rejected() {
        let cb = coinbase(0, 100);
        let store = store_from_log(&[cb.clone()]).unwrap();
        let tx = spending(crate::hashing::transaction_id(&cb), &[0], &[200]);
        assert_eq!(
            calculate_fee(&tx, &store),
            Err(LedgerError::InsufficientFunds { required: 200, available: 100 })
        );
    }

    #[test]
    fn test_coinbase_fee_is_zero() {
        assert_eq!(calculate_fee(&coinbase(0, 5), &TxStore::new()).unwrap(), 0);
    }

    #[test]
    fn test_check_transaction_rejects_empty_outputs() {
        let tx = spending([1; 32], &[0], &[]);
        assert!(matches!(check_transaction(&tx), Err(LedgerError::MalformedInput(_))));
    }

    #[test]
    fn test_check_transaction_rejects_duplicate_inputs() {
        let tx = spending([1; 32], &[0, 0], &[1]);
        assert!(matches!(check_transaction(&tx), Err(LedgerError::DoubleSpend(_))));
    }

    #[test]
    fn test_check_transaction_rejects_multi_output_coinbase() {
        let mut tx = coinbase(0, 1);
        tx.vout.push(Vout { value: 1, lock: "bob".to_string() });
        assert!(check_transaction(&tx).is_err());
    }

    #[test]
    fn test_verify_rejects_unsigned_input() {
        let cb = coinbase(0, 1000);
        let store = store_from_log(&[cb.clone()]).unwrap();
        let tx = spending(crate::hashing::transaction_id(&cb), &[0], &[900]);

        let result = verify_transaction(&Secp256k1::verification_only(), &tx, &store);
        assert!(matches!(result, Err(LedgerError::InvalidProof(_))));
    }

    #[test]
    fn test_verify_rejects_coinbase() {
        let result = verify_transaction(&Secp256k1::verification_only(), &coinbase(0, 1), &TxStore::new());
        assert!(result.is_err());
    }
}
