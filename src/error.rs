//! Error types for ledger queries and transaction construction

use thiserror::Error;

use crate::types::Amount;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Amount, available: Amount },

    #[error("Invalid spending proof: {0}")]
    InvalidProof(String),

    #[error("Referenced output not found: {0}")]
    MissingOutput(String),

    #[error("Output spent twice: {0}")]
    DoubleSpend(String),

    #[error("Too many inputs: {count} needed, at most {limit} allowed")]
    TooManyInputs { count: usize, limit: usize },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            LedgerError::MalformedInput(err.to_string())
        } else {
            LedgerError::Serialization(err.to_string())
        }
    }
}

impl From<secp256k1::Error> for LedgerError {
    fn from(err: secp256k1::Error) -> Self {
        LedgerError::InvalidKey(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_syntax_error_is_malformed_input() {
        let err: LedgerError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert!(matches!(err, LedgerError::MalformedInput(_)));
    }

    #[test]
    fn test_insufficient_funds_message() {
        let err = LedgerError::InsufficientFunds { required: 2000, available: 1100 };
        assert_eq!(err.to_string(), "Insufficient funds: required 2000, available 1100");
    }

    #[test]
    fn test_too_many_inputs_message() {
        let err = LedgerError::TooManyInputs { count: 1001, limit: 1000 };
        assert_eq!(err.to_string(), "Too many inputs: 1001 needed, at most 1000 allowed");
    }
}
