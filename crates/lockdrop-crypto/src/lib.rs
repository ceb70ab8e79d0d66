pub mod hash;

pub use hash::{deposit_key, keccak256, DepositKey};
