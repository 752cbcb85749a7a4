//! Ledger constants shared by the reward schedule, addresses and encodings

/// Number of decimal digits between one coin and the smallest unit
pub const CRYPTO_PRECISION: u32 = 3;

/// Smallest units per coin: 10^CRYPTO_PRECISION
pub const UNITS_PER_COIN: u128 = 1_000;

/// Mining reward of the first halving period: 3000 coins
pub const START_MINING_REWARD: u128 = 3_000 * UNITS_PER_COIN;

/// Halving interval: 43,200 blocks
pub const HALVINGS_INTERVAL: u64 = 43_200;

/// Once the reward has been shifted this many times it is zero for any u128
pub const MAX_HALVINGS: u64 = 128;

/// Maximum number of inputs, and separately of outputs, in one transaction.
/// Selection and building stop at this bound so built spends always verify.
pub const TX_IO_LIMIT: usize = 1000;

/// Version byte prepended to the public key hash of an address
pub const ADDRESS_VERSION: u8 = 0x00;

/// Length of the double-SHA-256 checksum appended to an address payload
pub const ADDRESS_CHECKSUM_LEN: usize = 4;

/// Length of a RIPEMD-160 public key hash
pub const PUBKEY_HASH_LEN: usize = 20;

/// Length of a compressed secp256k1 public key
pub const PUBLIC_KEY_LEN: usize = 33;

/// Length of a compact ECDSA signature
pub const SIGNATURE_LEN: usize = 64;

/// Domain tag mixed into every signature hash
pub const SIGHASH_TAG: &[u8] = b"macc/sighash/v1";
