//! Reward schedule, supply and unit conversion

use crate::constants::*;
use crate::error::{LedgerError, Result};
use crate::settings::Settings;
use crate::types::*;

/// CalculateMiningReward: ℕ → ℕ
///
/// Reward halves every `halvings_interval` blocks.
///
/// Formula: reward = ⌊R₀ / 2^⌊h/H⌋⌋
/// Where:
/// - h = block height
/// - H = settings.halvings_interval
/// - R₀ = settings.start_mining_reward
pub fn calculate_mining_reward(height: Height, settings: &Settings) -> Amount {
    // A zero interval is rejected by Settings::validate; treat it as no halving
    let halvings = height.checked_div(settings.halvings_interval).unwrap_or(0);

    if halvings >= MAX_HALVINGS {
        return 0;
    }

    settings.start_mining_reward >> halvings
}

/// TotalSupply: ℕ → ℕ
///
/// Sum of all rewards for heights 0..=height, computed per halving period.
/// A zero halving interval or a total beyond u128 is an `InvalidSettings` error.
pub fn total_supply(height: Height, settings: &Settings) -> Result<Amount> {
    let interval = settings.halvings_interval;
    if interval == 0 {
        return Err(LedgerError::InvalidSettings(
            "halvings_interval must be positive".to_string(),
        ));
    }
    let overflow = || LedgerError::InvalidSettings("total supply overflows u128".to_string());

    let mut total: Amount = 0;
    let mut period_start: Height = 0;

    loop {
        let reward = calculate_mining_reward(period_start, settings);
        if reward == 0 {
            break;
        }
        let period_end = period_start.saturating_add(interval - 1).min(height);
        let blocks = Amount::from(period_end - period_start) + 1;
        let minted = reward.checked_mul(blocks).ok_or_else(overflow)?;
        total = total.checked_add(minted).ok_or_else(overflow)?;

        if period_end == height {
            break;
        }
        period_start = period_end + 1;
    }

    Ok(total)
}

/// Parse a decimal coin amount ("1.5") into smallest units, without floats
pub fn parse_amount(text: &str, precision: u32) -> Result<Amount> {
    let text = text.trim();
    let malformed = || LedgerError::MalformedInput(format!("invalid amount: {text:?}"));

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(malformed());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(malformed());
    }
    if fraction.len() > precision as usize {
        return Err(LedgerError::MalformedInput(format!(
            "amount {text:?} has more than {precision} decimal places"
        )));
    }

    let scale = 10u128
        .checked_pow(precision)
        .ok_or_else(|| LedgerError::InvalidSettings(format!("precision {precision} too large")))?;
    let whole: Amount = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| malformed())? };
    let fraction: Amount = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = precision as usize);
        padded.parse().map_err(|_| malformed())?
    };

    whole
        .checked_mul(scale)
        .and_then(|units| units.checked_add(fraction))
        .ok_or_else(malformed)
}

/// Format smallest units as a decimal coin amount with `precision` digits
pub fn format_amount(amount: Amount, precision: u32) -> String {
    if precision == 0 {
        return amount.to_string();
    }
    let digits = format!("{:0>width$}", amount, width = precision as usize + 1);
    let (whole, fraction) = digits.split_at(digits.len() - precision as usize);
    format!("{whole}.{fraction}")
}
