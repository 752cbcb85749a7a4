//! Engine settings: reward schedule, unit precision and coin-selection policy

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{LedgerError, Result};
use crate::selection::SelectionPolicy;

/// Parameters every `Ledger` call reads. Missing JSON fields take the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Reward of the first halving period, in smallest units
    pub start_mining_reward: u128,
    /// Blocks between two halvings
    pub halvings_interval: u64,
    /// Decimal digits of the smallest unit
    pub crypto_precision: u32,
    pub selection_policy: SelectionPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_mining_reward: START_MINING_REWARD,
            halvings_interval: HALVINGS_INTERVAL,
            crypto_precision: CRYPTO_PRECISION,
            selection_policy: SelectionPolicy::default(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.halvings_interval == 0 {
            return Err(LedgerError::InvalidSettings(
                "halvings_interval must be positive".to_string(),
            ));
        }
        // 10^38 is the largest power of ten below u128::MAX
        if self.crypto_precision > 38 {
            return Err(LedgerError::InvalidSettings(format!(
                "crypto_precision {} exceeds 38 digits",
                self.crypto_precision
            )));
        }
        Ok(())
    }

    /// Smallest units per coin
    pub fn units_per_coin(&self) -> u128 {
        10u128.saturating_pow(self.crypto_precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.units_per_coin(), UNITS_PER_COIN);
        assert_eq!(settings.selection_policy, SelectionPolicy::FirstFit);
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let settings = Settings::from_json(r#"{"halvings_interval": 43200}"#).unwrap();
        assert_eq!(settings.halvings_interval, 43_200);
        assert_eq!(settings.start_mining_reward, START_MINING_REWARD);
    }

    #[test]
    fn test_from_json_reads_policy() {
        let settings = Settings::from_json(r#"{"selection_policy": "largest_first"}"#).unwrap();
        assert_eq!(settings.selection_policy, SelectionPolicy::LargestFirst);
    }

    #[test]
    fn test_zero_halvings_interval_rejected() {
        let result = Settings::from_json(r#"{"halvings_interval": 0}"#);
        assert!(matches!(result, Err(LedgerError::InvalidSettings(_))));
    }

    #[test]
    fn test_excessive_precision_rejected() {
        let settings = Settings { crypto_precision: 39, ..Settings::default() };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            Settings::from_json("not json"),
            Err(LedgerError::MalformedInput(_))
        ));
    }
}
