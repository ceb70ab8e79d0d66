use std::fmt;

use lockdrop_core::types::{AccountId, LockIndex};
use sha3::{Digest, Keccak256};

/// Compute Keccak-256 of arbitrary bytes → 32-byte array.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Identity of one lock record across its whole lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DepositKey(pub [u8; 32]);

impl DepositKey {
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for DepositKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for DepositKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DepositKey({}…)", &self.to_hex()[..18])
    }
}

/// Derive the deposit key for `(sender, lock_index)`.
///
/// Packed encoding: 20-byte address followed by the index as a 32-byte
/// big-endian word, i.e. `soliditySha3(address, uint256)`.
pub fn deposit_key(sender: &AccountId, lock_index: LockIndex) -> DepositKey {
    let mut packed = [0u8; 52];
    packed[..20].copy_from_slice(sender.as_bytes());
    packed[44..].copy_from_slice(&lock_index.to_be_bytes());
    DepositKey(keccak256(&packed))
}
