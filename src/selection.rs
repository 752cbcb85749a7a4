//! Coin selection over owned outputs
//!
//! The canonical policy is greedy first-fit in the order the UTXO index
//! returns entries. Which outputs get consumed is observable (it decides the
//! change output and every later balance), so the policy is part of the
//! ledger's compatibility surface.

use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::constants::TX_IO_LIMIT;
use crate::error::{LedgerError, Result};
use crate::types::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Entries in index order until the target is covered
    #[default]
    FirstFit,
    /// Highest value first; ties keep index order
    LargestFirst,
    /// Lowest value first; ties keep index order
    SmallestFirst,
}

/// Select: (ℍ × ℕ × ℕ)* × ℕ × ℕ → (ℍ × ℕ × ℕ)* × ℕ
///
/// 1. target = amount + fee
/// 2. Accumulate entries in policy order until accumulated ≥ target
/// 3. change = accumulated - target
/// 4. If every entry is consumed and accumulated < target: InsufficientFunds
/// 5. If covering the target takes more than TX_IO_LIMIT entries: TooManyInputs
pub fn select(entries: &[OwnedEntry], amount: Amount, fee: Amount) -> Result<Selection> {
    select_with_policy(entries, amount, fee, SelectionPolicy::FirstFit)
}

pub fn select_with_policy(
    entries: &[OwnedEntry],
    amount: Amount,
    fee: Amount,
    policy: SelectionPolicy,
) -> Result<Selection> {
    let target = amount
        .checked_add(fee)
        .ok_or_else(|| LedgerError::MalformedInput("amount + fee overflows u128".to_string()))?;

    let mut ordered: Vec<&OwnedEntry> = entries.iter().collect();
    match policy {
        SelectionPolicy::FirstFit => {}
        SelectionPolicy::LargestFirst => ordered.sort_by_key(|e| Reverse(e.value)),
        SelectionPolicy::SmallestFirst => ordered.sort_by_key(|e| e.value),
    }

    let mut chosen = Vec::new();
    let mut accumulated: Amount = 0;

    for entry in ordered {
        if accumulated >= target {
            break;
        }
        accumulated = accumulated.checked_add(entry.value).ok_or_else(|| {
            LedgerError::MalformedInput("selected value overflows u128".to_string())
        })?;
        chosen.push(entry.clone());
    }

    if accumulated < target {
        debug!("selection short: need {}, have {}", target, accumulated);
        return Err(LedgerError::InsufficientFunds { required: target, available: accumulated });
    }

    if chosen.len() > TX_IO_LIMIT {
        debug!("selection needs {} inputs, limit {}", chosen.len(), TX_IO_LIMIT);
        return Err(LedgerError::TooManyInputs { count: chosen.len(), limit: TX_IO_LIMIT });
    }

    let change = accumulated - target;
    debug!(
        "selected {} of {} entries ({:?}), change {}",
        chosen.len(),
        entries.len(),
        policy,
        change
    );
    Ok(Selection { chosen, change })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tag: u8, index: u32, value: Amount) -> OwnedEntry {
        OwnedEntry { tx_id: [tag; 32], index, value }
    }

    fn scenario() -> Vec<OwnedEntry> {
        vec![entry(b'a', 0, 600), entry(b'b', 1, 500)]
    }

    #[test]
    fn test_scenario_picks_both_entries() {
        let selection = select(&scenario(), 1000, 0).unwrap();
        assert_eq!(selection.chosen, scenario());
        assert_eq!(selection.change, 100);
    }

    #[test]
    fn test_scenario_insufficient_funds() {
        let result = select(&scenario(), 2000, 0);
        assert_eq!(
            result,
            Err(LedgerError::InsufficientFunds { required: 2000, available: 1100 })
        );
    }

    #[test]
    fn test_first_fit_stops_once_covered() {
        let selection = select(&scenario(), 550, 50).unwrap();
        assert_eq!(selection.chosen, vec![entry(b'a', 0, 600)]);
        assert_eq!(selection.change, 0);
    }

    #[test]
    fn test_fee_counts_towards_target() {
        let selection = select(&scenario(), 600, 1).unwrap();
        assert_eq!(selection.chosen.len(), 2);
        assert_eq!(selection.change, 499);

        assert!(select(&scenario(), 1100, 1).is_err());
    }

    #[test]
    fn test_exact_total_has_no_change() {
        let selection = select(&scenario(), 1000, 100).unwrap();
        assert_eq!(selection.change, 0);
    }

    #[test]
    fn test_zero_target_selects_nothing() {
        let selection = select(&scenario(), 0, 0).unwrap();
        assert!(selection.chosen.is_empty());
        assert_eq!(selection.change, 0);
    }

    #[test]
    fn test_empty_entries_insufficient() {
        let result = select(&[], 1, 0);
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { available: 0, .. })));
    }

    #[test]
    fn test_target_overflow_is_malformed() {
        let result = select(&scenario(), Amount::MAX, 1);
        assert!(matches!(result, Err(LedgerError::MalformedInput(_))));
    }

    #[test]
    fn test_input_limit_enforced() {
        let dust: Vec<OwnedEntry> =
            (0..=TX_IO_LIMIT as u32).map(|i| entry(1, i, 1)).collect();

        let at_limit = select(&dust, TX_IO_LIMIT as Amount, 0).unwrap();
        assert_eq!(at_limit.chosen.len(), TX_IO_LIMIT);

        let result = select(&dust, TX_IO_LIMIT as Amount + 1, 0);
        assert_eq!(
            result,
            Err(LedgerError::TooManyInputs { count: TX_IO_LIMIT + 1, limit: TX_IO_LIMIT })
        );
    }

    #[test]
    fn test_shortfall_reported_before_input_limit() {
        let dust: Vec<OwnedEntry> =
            (0..=TX_IO_LIMIT as u32).map(|i| entry(1, i, 1)).collect();
        let result = select(&dust, 5_000, 0);
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { available: 1001, .. })));
    }

    #[test]
    fn test_largest_first_policy() {
        let entries = vec![entry(1, 0, 10), entry(2, 0, 500), entry(3, 0, 40)];
        let selection =
            select_with_policy(&entries, 450, 0, SelectionPolicy::LargestFirst).unwrap();
        assert_eq!(selection.chosen, vec![entry(2, 0, 500)]);
        assert_eq!(selection.change, 50);
    }

    #[test]
    fn test_smallest_first_policy() {
        let entries = vec![entry(1, 0, 500), entry(2, 0, 10), entry(3, 0, 40)];
        let selection =
            select_with_policy(&entries, 45, 0, SelectionPolicy::SmallestFirst).unwrap();
        assert_eq!(selection.chosen, vec![entry(2, 0, 10), entry(3, 0, 40)]);
        assert_eq!(selection.change, 5);
    }
}
