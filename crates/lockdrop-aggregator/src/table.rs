use std::collections::HashMap;

use lockdrop_core::types::ReceiverKey;
use num_bigint::BigUint;
use serde::Serialize;

/// Final per-receiver allocation.
///
/// `ordered` lists receivers in first-seen order; `totals` is the same data
/// keyed for lookup. Receivers with a zero total appear in neither.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceTable {
    pub totals: HashMap<ReceiverKey, BigUint>,
    pub ordered: Vec<(ReceiverKey, BigUint)>,
}

/// One `[receiver, amount]` row of the genesis balances output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GenesisBalance(pub String, pub String);

impl BalanceTable {
    pub fn get(&self, receiver: &ReceiverKey) -> Option<&BigUint> {
        self.totals.get(receiver)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Sum over every receiver.
    pub fn grand_total(&self) -> BigUint {
        self.ordered.iter().map(|(_, amount)| amount).sum()
    }

    /// Rows as `("0x…", "decimal")` in first-seen order.
    pub fn genesis_balances(&self) -> Vec<GenesisBalance> {
        self.ordered
            .iter()
            .map(|(k, v)| GenesisBalance(k.to_hex(), v.to_str_radix(10)))
            .collect()
    }

    pub fn to_genesis_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.genesis_balances())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_json_is_pairs_of_strings() {
        let k = ReceiverKey([0xee; 32]);
        let amount = BigUint::from(12_345u32);
        let table = BalanceTable {
            totals: HashMap::from([(k, amount.clone())]),
            ordered: vec![(k, amount)],
        };
        let json = table.to_genesis_json().unwrap();
        let parsed: Vec<(String, String)> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![(k.to_hex(), "12345".to_string())]);
        assert_eq!(table.grand_total(), BigUint::from(12_345u32));
    }
}
