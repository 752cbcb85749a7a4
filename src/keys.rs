//! Accounts, addresses and spending proofs
//!
//! An address is Base58Check(version || RIPEMD160(SHA256(compressed public key))).
//! A solution is the owner's public key plus a compact ECDSA signature over the
//! input message of the spending transaction; it is valid against a lock when the
//! key hashes to the locked address and the signature verifies.

use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey, Signing, Verification};
use std::fmt;

use crate::constants::*;
use crate::error::{LedgerError, Result};
use crate::hashing::{checksum, hash160};
use crate::types::*;

/// Key material supplied by the wallet. The ledger never generates keys.
#[derive(Clone)]
pub struct Account {
    secret_key: SecretKey,
    public_key: PublicKey,
    address: Address,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("public_key", &self.public_key)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Account {
    pub fn from_secret_key<C: Signing>(secp: &Secp256k1<C>, secret_key: SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(secp, &secret_key);
        let address = address_of_key(&public_key);
        Self { secret_key, public_key, address }
    }

    pub fn from_secret_bytes<C: Signing>(secp: &Secp256k1<C>, bytes: &[u8]) -> Result<Self> {
        let secret_key = SecretKey::from_slice(bytes)?;
        Ok(Self::from_secret_key(secp, secret_key))
    }

    pub fn from_secret_hex<C: Signing>(secp: &Secp256k1<C>, hex: &str) -> Result<Self> {
        let bytes = hex_serde::parse_bytes(hex)
            .map_err(|_| LedgerError::InvalidKey("secret key is not valid hex".to_string()))?;
        Self::from_secret_bytes(secp, &bytes)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Sign one input message
    pub fn solve<C: Signing>(&self, secp: &Secp256k1<C>, message: &Hash) -> Result<Solution> {
        let message = Message::from_digest_slice(message)?;
        let signature = secp.sign_ecdsa(&message, &self.secret_key);
        Ok(Solution {
            public_key: self.public_key.serialize().to_vec(),
            signature: signature.serialize_compact().to_vec(),
        })
    }
}

/// Address of a serialized public key
pub fn address_of(public_key: &[u8]) -> Address {
    let mut payload = Vec::with_capacity(1 + PUBKEY_HASH_LEN + ADDRESS_CHECKSUM_LEN);
    payload.push(ADDRESS_VERSION);
    payload.extend_from_slice(&hash160(public_key));
    let check = checksum(&payload);
    payload.extend_from_slice(&check);
    bs58::encode(payload).into_string()
}

pub fn address_of_key(public_key: &PublicKey) -> Address {
    address_of(&public_key.serialize())
}

/// Parse a public key and derive its address
pub fn address_of_hex(public_key_hex: &str) -> Result<Address> {
    let bytes = hex_serde::parse_bytes(public_key_hex)?;
    let public_key = PublicKey::from_slice(&bytes)?;
    Ok(address_of_key(&public_key))
}

/// Checks version byte, payload length and checksum
pub fn validate_address(address: &str) -> bool {
    let payload = match bs58::decode(address).into_vec() {
        Ok(payload) => payload,
        Err(_) => return false,
    };

    if payload.len() != 1 + PUBKEY_HASH_LEN + ADDRESS_CHECKSUM_LEN || payload[0] != ADDRESS_VERSION
    {
        return false;
    }

    let (body, check) = payload.split_at(payload.len() - ADDRESS_CHECKSUM_LEN);
    checksum(body).as_slice() == check
}

/// Check a solution against the lock of the output it spends
pub fn verify_solution<C: Verification>(
    secp: &Secp256k1<C>,
    solution: &Solution,
    lock: &str,
    message: &Hash,
) -> Result<()> {
    if solution.public_key.len() != PUBLIC_KEY_LEN || solution.signature.len() != SIGNATURE_LEN {
        return Err(LedgerError::InvalidProof("solution has wrong length".to_string()));
    }

    let public_key = PublicKey::from_slice(&solution.public_key)
        .map_err(|e| LedgerError::InvalidProof(format!("bad public key: {e}")))?;
    if address_of_key(&public_key) != lock {
        return Err(LedgerError::InvalidProof("public key does not match lock".to_string()));
    }

    let signature = Signature::from_compact(&solution.signature)
        .map_err(|e| LedgerError::InvalidProof(format!("bad signature encoding: {e}")))?;
    let message = Message::from_digest_slice(message)?;
    secp.verify_ecdsa(&message, &signature, &public_key)
        .map_err(|_| LedgerError::InvalidProof("signature does not verify".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(byte: u8) -> Account {
        Account::from_secret_bytes(&Secp256k1::new(), &[byte; 32]).unwrap()
    }

    #[test]
    fn test_address_is_valid_base58check() {
        let addr = account(1).address().clone();
        assert!(validate_address(&addr));
        assert!(addr.starts_with('1'));
    }

    #[test]
    fn test_distinct_keys_distinct_addresses() {
        assert_ne!(account(1).address(), account(2).address());
    }

    #[test]
    fn test_corrupted_address_fails_validation() {
        let mut addr = account(1).address().clone();
        let last = addr.pop().unwrap();
        addr.push(if last == '2' { '3' } else { '2' });
        assert!(!validate_address(&addr));
        assert!(!validate_address("0OIl"));
        assert!(!validate_address(""));
    }

    #[test]
    fn test_address_of_hex_matches_account() {
        let acc = account(3);
        let pk_hex = bitcoin_hashes::hex::ToHex::to_hex(&acc.public_key().serialize()[..]);
        assert_eq!(&address_of_hex(&pk_hex).unwrap(), acc.address());
    }

    #[test]
    fn test_zero_secret_key_rejected() {
        let result = Account::from_secret_bytes(&Secp256k1::new(), &[0u8; 32]);
        assert!(matches!(result, Err(LedgerError::InvalidKey(_))));
    }

    #[test]
    fn test_bad_secret_hex_rejected() {
        let result = Account::from_secret_hex(&Secp256k1::new(), "zz");
        assert!(matches!(result, Err(LedgerError::InvalidKey(_))));
    }

    #[test]
    fn test_solution_verifies_against_own_lock() {
        let secp = Secp256k1::new();
        let acc = account(1);
        let message = [9u8; 32];
        let solution = acc.solve(&secp, &message).unwrap();

        assert!(verify_solution(&secp, &solution, acc.address(), &message).is_ok());
    }

    #[test]
    fn test_solution_rejected_for_other_lock_or_message() {
        let secp = Secp256k1::new();
        let acc = account(1);
        let solution = acc.solve(&secp, &[9u8; 32]).unwrap();

        let wrong_lock = verify_solution(&secp, &solution, account(2).address(), &[9u8; 32]);
        assert!(matches!(wrong_lock, Err(LedgerError::InvalidProof(_))));

        let wrong_msg = verify_solution(&secp, &solution, acc.address(), &[8u8; 32]);
        assert!(matches!(wrong_msg, Err(LedgerError::InvalidProof(_))));
    }

    #[test]
    fn test_empty_solution_rejected() {
        let secp = Secp256k1::new();
        let result = verify_solution(&secp, &Solution::default(), account(1).address(), &[0; 32]);
        assert!(matches!(result, Err(LedgerError::InvalidProof(_))));
    }

    #[test]
    fn test_debug_hides_secret() {
        let text = format!("{:?}", account(1));
        assert!(!text.contains("secret_key"));
    }
}
