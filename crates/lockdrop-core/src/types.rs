use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::LockdropError;

/// Ledger-side amount (wei, token units, capacity). 256-bit unsigned.
pub type Wei = primitive_types::U256;

/// Unix timestamp (seconds, UTC).
pub type Timestamp = i64;

/// Position of a lock in its owner's record list. Stable for the record's lifetime.
pub type LockIndex = u64;

fn decode_hex(s: &str, what: &'static str) -> Result<Vec<u8>, LockdropError> {
    let trimmed = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    // Accept odd-length input the way web3 does ("0x1" == "0x01").
    let padded;
    let digits = if trimmed.len() % 2 == 1 {
        padded = format!("0{trimmed}");
        padded.as_str()
    } else {
        trimmed
    };
    hex::decode(digits).map_err(|e| LockdropError::InvalidEncoding {
        what,
        reason: e.to_string(),
    })
}

// ── AccountId ────────────────────────────────────────────────────────────────

/// 20-byte ledger account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, LockdropError> {
        let bytes = decode_hex(s, "account address")?;
        let arr: [u8; 20] = bytes.try_into().map_err(|b: Vec<u8>| LockdropError::InvalidEncoding {
            what: "account address",
            reason: format!("expected 20 bytes, got {}", b.len()),
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({}…)", &self.to_hex()[..10])
    }
}

// ── ReceiverKey ──────────────────────────────────────────────────────────────

/// 32-byte key credited with a lock's allocation. Distinct from the depositor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReceiverKey(pub [u8; 32]);

impl ReceiverKey {
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse up to 32 bytes of hex. Shorter input is left-aligned and
    /// zero-padded on the right, matching a `bytes32` conversion.
    pub fn from_hex(s: &str) -> Result<Self, LockdropError> {
        let bytes = decode_hex(s, "receiver key")?;
        if bytes.len() > 32 {
            return Err(LockdropError::InvalidEncoding {
                what: "receiver key",
                reason: format!("at most 32 bytes allowed, got {}", bytes.len()),
            });
        }
        let mut arr = [0u8; 32];
        arr[..bytes.len()].copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for ReceiverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ReceiverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReceiverKey({}…)", &self.to_hex()[..10])
    }
}

// ── Serde: hex text for JSON, raw bytes for bincode ──────────────────────────

macro_rules! impl_hex_serde {
    ($ty:ident, $len:expr) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                if serializer.is_human_readable() {
                    serializer.serialize_str(&self.to_hex())
                } else {
                    self.0.serialize(serializer)
                }
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                if deserializer.is_human_readable() {
                    let s = String::deserialize(deserializer)?;
                    $ty::from_hex(&s).map_err(de::Error::custom)
                } else {
                    <[u8; $len]>::deserialize(deserializer).map($ty)
                }
            }
        }
    };
}

impl_hex_serde!(AccountId, 20);
impl_hex_serde!(ReceiverKey, 32);

/// Serde adapter for [`Wei`]: decimal string in JSON, 32 big-endian bytes in bincode.
pub mod wei_serde {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Wei, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(value)
        } else {
            let mut buf = [0u8; 32];
            value.to_big_endian(&mut buf);
            buf.serialize(serializer)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Wei, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(WeiVisitor)
        } else {
            let buf = <[u8; 32]>::deserialize(deserializer)?;
            Ok(Wei::from_big_endian(&buf))
        }
    }

    struct WeiVisitor;

    impl<'de> Visitor<'de> for WeiVisitor {
        type Value = Wei;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a decimal string or unsigned integer")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Wei, E> {
            Ok(Wei::from(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Wei, E> {
            parse_wei(v).map_err(E::custom)
        }
    }
}

/// Serde adapter for [`LockIndex`]: web3 hands indices back as strings, so
/// JSON accepts both `"3"` and `3`.
pub mod index_serde {
    use super::*;

    pub fn serialize<S: Serializer>(value: &LockIndex, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LockIndex, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(IndexVisitor)
        } else {
            u64::deserialize(deserializer)
        }
    }

    struct IndexVisitor;

    impl<'de> Visitor<'de> for IndexVisitor {
        type Value = LockIndex;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a lock index as string or integer")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<LockIndex, E> {
            Ok(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<LockIndex, E> {
            v.parse().map_err(E::custom)
        }
    }
}

/// Parse a decimal amount string into [`Wei`].
pub fn parse_wei(s: &str) -> Result<Wei, LockdropError> {
    Wei::from_dec_str(s.trim()).map_err(|e| LockdropError::InvalidEncoding {
        what: "amount",
        reason: format!("{e:?}"),
    })
}
