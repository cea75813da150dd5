use serde_json::Value;

use crate::types::outcome::{DecodeError, value_kind};

/// Snapshot of the game's lifetime counters, as returned by its `stats` view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregateStats {
    pub total_spins: u128,
    pub total_bets: u128,
    pub house_balance: u128,
    pub total_payout: u128,
}

impl AggregateStats {
    /// Decode the `(spins, bets, house, payout)` tuple. Counters arrive as decimal strings.
    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        const WHAT: &str = "stats";
        let fields = value.as_array().ok_or_else(|| DecodeError::NotAnArray {
            what: WHAT,
            found: value_kind(value).to_string(),
        })?;
        if fields.len() != 4 {
            return Err(DecodeError::Arity {
                what: WHAT,
                expected: 4,
                found: fields.len(),
            });
        }

        let field = |index: usize| -> Result<u128, DecodeError> {
            let parsed = match &fields[index] {
                Value::String(s) => s.parse::<u128>().ok(),
                Value::Number(n) => n.as_u64().map(u128::from),
                _ => None,
            };
            parsed.ok_or(DecodeError::FieldType {
                what: WHAT,
                index,
                expected: "u128 string",
            })
        };

        Ok(Self {
            total_spins: field(0)?,
            total_bets: field(1)?,
            house_balance: field(2)?,
            total_payout: field(3)?,
        })
    }

    /// Total staked, assuming every bet carried `nominal_stake`.
    pub fn total_wagered(&self, nominal_stake: u128) -> u128 {
        self.total_bets.saturating_mul(nominal_stake)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_string_counters() {
        let stats = AggregateStats::decode(&json!([
            "4",
            "52",
            "100000000000000000000000000",
            "7000000000000000000000000"
        ]))
        .expect("decode");
        assert_eq!(stats.total_spins, 4);
        assert_eq!(stats.total_bets, 52);
        assert_eq!(stats.house_balance, 100_000_000_000_000_000_000_000_000);
        assert_eq!(stats.total_wagered(10), 520);
    }

    #[test]
    fn rejects_short_tuples_and_garbage() {
        assert!(matches!(
            AggregateStats::decode(&json!(["1", "2", "3"])),
            Err(DecodeError::Arity { found: 3, .. })
        ));
        assert!(matches!(
            AggregateStats::decode(&json!(["1", "x", "3", "4"])),
            Err(DecodeError::FieldType { index: 1, .. })
        ));
        assert!(AggregateStats::decode(&Value::Null).is_err());
    }
}
