use serde_json::Value;
use thiserror::Error;

use crate::types::bet::RoundPlan;
use crate::wheel::{Color, color_of, declared_color};

/// The game answered with a value whose shape does not match what was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("expected {what} to be an array, got {found}")]
    NotAnArray { what: &'static str, found: String },
    #[error("expected {what} of {expected} elements, got {found}")]
    Arity {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("field {index} of {what} is not a {expected}")]
    FieldType {
        what: &'static str,
        index: usize,
        expected: &'static str,
    },
    #[error("landed number {0} is not on the wheel")]
    LandedOutOfRange(u64),
    #[error("round {round}: expected {expected} bet results, got {found}")]
    BetCount {
        round: usize,
        expected: usize,
        found: usize,
    },
}

/// Result of one bet as reported by the game: `(won, landed, is_red, multiplier)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinOutcome {
    pub won: bool,
    pub landed_number: u8,
    pub is_red: bool,
    pub payout_multiplier: u32,
}

impl SpinOutcome {
    /// Stake multiple returned to the player: `multiplier + 1` on a win, nothing otherwise.
    pub fn payout_multiple(&self) -> u64 {
        if self.won {
            u64::from(self.payout_multiplier) + 1
        } else {
            0
        }
    }

    pub fn declared_color(&self) -> Color {
        declared_color(self.landed_number, self.is_red)
    }

    pub fn wheel_color(&self) -> Option<Color> {
        color_of(self.landed_number)
    }

    /// True when the game's red flag and the wheel layout disagree on the landed number.
    pub fn color_mismatch(&self) -> bool {
        self.wheel_color() != Some(self.declared_color())
    }

    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        const WHAT: &str = "spin outcome";
        let fields = as_array(value, WHAT)?;
        if fields.len() != 4 {
            return Err(DecodeError::Arity {
                what: WHAT,
                expected: 4,
                found: fields.len(),
            });
        }

        let won = as_bool(&fields[0], WHAT, 0)?;
        let landed = as_u64(&fields[1], WHAT, 1)?;
        let is_red = as_bool(&fields[2], WHAT, 2)?;
        let multiplier = as_u64(&fields[3], WHAT, 3)?;

        let landed_number = u8::try_from(landed)
            .ok()
            .filter(|n| *n <= 36)
            .ok_or(DecodeError::LandedOutOfRange(landed))?;
        let payout_multiplier = u32::try_from(multiplier).map_err(|_| DecodeError::FieldType {
            what: WHAT,
            index: 3,
            expected: "u32",
        })?;

        Ok(Self {
            won,
            landed_number,
            is_red,
            payout_multiplier,
        })
    }
}

/// Decoded return value of a spin call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpinReturn {
    Single(SpinOutcome),
    /// One entry per submitted round, each holding one outcome per bet, in submission order.
    Batch(Vec<Vec<SpinOutcome>>),
}

impl SpinReturn {
    /// Decode positionally against the plan that produced the call.
    pub fn decode(value: &Value, plan: &RoundPlan) -> Result<Self, DecodeError> {
        match plan {
            RoundPlan::Single(_) => SpinOutcome::decode(value).map(SpinReturn::Single),
            RoundPlan::Batch(rounds) => {
                let results = as_array(value, "batch result")?;
                if results.len() != rounds.len() {
                    return Err(DecodeError::Arity {
                        what: "batch result",
                        expected: rounds.len(),
                        found: results.len(),
                    });
                }

                let mut decoded = Vec::with_capacity(rounds.len());
                for (index, (round, result)) in rounds.iter().zip(results).enumerate() {
                    let bets = as_array(result, "round result")?;
                    if bets.len() != round.bets.len() {
                        return Err(DecodeError::BetCount {
                            round: index,
                            expected: round.bets.len(),
                            found: bets.len(),
                        });
                    }
                    decoded.push(
                        bets.iter()
                            .map(SpinOutcome::decode)
                            .collect::<Result<Vec<_>, _>>()?,
                    );
                }
                Ok(SpinReturn::Batch(decoded))
            }
        }
    }

    /// Outcomes grouped per round, in submission order.
    pub fn rounds(&self) -> Vec<&[SpinOutcome]> {
        match self {
            SpinReturn::Single(outcome) => vec![std::slice::from_ref(outcome)],
            SpinReturn::Batch(rounds) => rounds.iter().map(Vec::as_slice).collect(),
        }
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &SpinOutcome> {
        let (single, batch) = match self {
            SpinReturn::Single(outcome) => (Some(outcome), None),
            SpinReturn::Batch(rounds) => (None, Some(rounds.iter().flatten())),
        };
        single.into_iter().chain(batch.into_iter().flatten())
    }

    pub fn total_payout_multiple(&self) -> u64 {
        self.outcomes().map(SpinOutcome::payout_multiple).sum()
    }
}

fn as_array<'a>(value: &'a Value, what: &'static str) -> Result<&'a Vec<Value>, DecodeError> {
    value.as_array().ok_or_else(|| DecodeError::NotAnArray {
        what,
        found: value_kind(value).to_string(),
    })
}

fn as_bool(value: &Value, what: &'static str, index: usize) -> Result<bool, DecodeError> {
    value.as_bool().ok_or(DecodeError::FieldType {
        what,
        index,
        expected: "bool",
    })
}

fn as_u64(value: &Value, what: &'static str, index: usize) -> Result<u64, DecodeError> {
    value.as_u64().ok_or(DecodeError::FieldType {
        what,
        index,
        expected: "unsigned integer",
    })
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bet, BetKind, WagerRound};
    use serde_json::json;

    fn batch_plan(sizes: &[usize]) -> RoundPlan {
        RoundPlan::Batch(
            sizes
                .iter()
                .map(|&n| WagerRound::new(vec![Bet::even_money(BetKind::Red, 1); n]))
                .collect(),
        )
    }

    #[test]
    fn losing_outcome_pays_nothing_whatever_the_multiplier() {
        for multiplier in [0u64, 1, 5, 35, 255] {
            let outcome =
                SpinOutcome::decode(&json!([false, 15, false, multiplier])).expect("decode");
            assert_eq!(outcome.payout_multiple(), 0);
        }
    }

    #[test]
    fn winning_outcome_pays_multiplier_plus_one() {
        let outcome = SpinOutcome::decode(&json!([true, 32, true, 1])).expect("decode");
        assert_eq!(outcome.payout_multiple(), 2);
        let straight = SpinOutcome::decode(&json!([true, 17, false, 35])).expect("decode");
        assert_eq!(straight.payout_multiple(), 36);
    }

    #[test]
    fn rejects_wrong_arity_and_types() {
        assert_eq!(
            SpinOutcome::decode(&json!([true, 32, true])),
            Err(DecodeError::Arity {
                what: "spin outcome",
                expected: 4,
                found: 3
            })
        );
        assert!(matches!(
            SpinOutcome::decode(&json!(["true", 32, true, 1])),
            Err(DecodeError::FieldType { index: 0, .. })
        ));
        assert!(matches!(
            SpinOutcome::decode(&json!({"won": true})),
            Err(DecodeError::NotAnArray { .. })
        ));
        assert_eq!(
            SpinOutcome::decode(&json!([true, 37, true, 1])),
            Err(DecodeError::LandedOutOfRange(37))
        );
    }

    #[test]
    fn batch_decode_preserves_submission_order() {
        let plan = batch_plan(&[2, 1]);
        let value = json!([
            [[true, 32, true, 1], [false, 32, true, 0]],
            [[false, 26, false, 0]],
        ]);
        let decoded = SpinReturn::decode(&value, &plan).expect("decode");
        let rounds = decoded.rounds();
        assert_eq!(rounds.len(), 2);
        assert!(rounds[0][0].won);
        assert!(!rounds[0][1].won);
        assert_eq!(rounds[1][0].landed_number, 26);
        assert_eq!(decoded.total_payout_multiple(), 2);
        assert_eq!(decoded.outcomes().count(), 3);
    }

    #[test]
    fn batch_shape_mismatch_is_a_decode_error() {
        let plan = batch_plan(&[2, 1]);
        let too_few_rounds = json!([[[true, 32, true, 1], [false, 32, true, 0]]]);
        assert!(matches!(
            SpinReturn::decode(&too_few_rounds, &plan),
            Err(DecodeError::Arity { expected: 2, found: 1, .. })
        ));

        // The game answers a failed randomness request with a single zeroed tuple.
        let callback_failure = json!([[[false, 0, false, 0]]]);
        assert!(SpinReturn::decode(&callback_failure, &batch_plan(&[1, 1])).is_err());

        let wrong_bet_count = json!([[[true, 32, true, 1]], [[false, 26, false, 0]]]);
        assert_eq!(
            SpinReturn::decode(&wrong_bet_count, &plan),
            Err(DecodeError::BetCount {
                round: 0,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn single_plan_expects_a_bare_tuple() {
        let plan = RoundPlan::Single(WagerRound::new(vec![Bet::even_money(BetKind::Red, 1)]));
        let nested = json!([[[true, 32, true, 1]]]);
        assert!(SpinReturn::decode(&nested, &plan).is_err());
        let bare = json!([true, 32, true, 1]);
        assert_eq!(
            SpinReturn::decode(&bare, &plan).expect("decode").total_payout_multiple(),
            2
        );
    }

    #[test]
    fn zero_is_green_under_both_derivations() {
        let outcome = SpinOutcome::decode(&json!([false, 0, false, 0])).expect("decode");
        assert_eq!(outcome.declared_color(), Color::Green);
        assert!(!outcome.color_mismatch());
    }

    #[test]
    fn flags_a_red_flag_that_contradicts_the_wheel() {
        let outcome = SpinOutcome::decode(&json!([false, 15, true, 0])).expect("decode");
        assert!(outcome.color_mismatch());
    }
}
