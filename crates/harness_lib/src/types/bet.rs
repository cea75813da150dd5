use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::types::enums::BetKind;
use crate::wheel::{CORNER_BETS, SIX_LINE_BETS, SPLIT_BETS, STREET_BETS, table_index};

/// The game rejects batches of 64 spins or more.
pub const MAX_SPINS_PER_CALL: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidBetError {
    #[error("{kind} bet has a zero stake")]
    ZeroAmount { kind: BetKind },
    #[error("{kind} bet takes {expected} numbers, got {found}")]
    Cardinality {
        kind: BetKind,
        expected: usize,
        found: usize,
    },
    #[error("{kind} bet number {number} is out of range")]
    OutOfRange { kind: BetKind, number: u8 },
    #[error("{kind} numbers {numbers:?} are not a group on the table")]
    NotOnTable { kind: BetKind, numbers: Vec<u8> },
    #[error("round deposit overflows u128")]
    DepositOverflow,
    #[error("batch of {count} spins exceeds the limit of {max}", max = MAX_SPINS_PER_CALL)]
    TooManySpins { count: usize },
}

/// One wager: what is covered and how much is staked, in yocto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bet {
    pub kind: BetKind,
    pub numbers: Vec<u8>,
    pub amount: u128,
}

/// A bet in the shape the game deserializes: `number` is the straight number, the
/// group index for split/street/corner/six-line, the zero-based column/dozen, or 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireBet {
    pub kind: BetKind,
    pub amount: String,
    pub number: u8,
}

impl Bet {
    pub fn new(kind: BetKind, numbers: Vec<u8>, amount: u128) -> Self {
        Self {
            kind,
            numbers,
            amount,
        }
    }

    pub fn straight(number: u8, amount: u128) -> Self {
        Self::new(BetKind::Straight, vec![number], amount)
    }

    /// Even-money bet (red, black, odd, even, low, high).
    pub fn even_money(kind: BetKind, amount: u128) -> Self {
        Self::new(kind, Vec::new(), amount)
    }

    pub fn validate(&self) -> Result<(), InvalidBetError> {
        self.to_wire().map(|_| ())
    }

    pub fn to_wire(&self) -> Result<WireBet, InvalidBetError> {
        let kind = self.kind;
        if self.amount == 0 {
            return Err(InvalidBetError::ZeroAmount { kind });
        }

        let expected = kind.required_numbers();
        if self.numbers.len() != expected {
            return Err(InvalidBetError::Cardinality {
                kind,
                expected,
                found: self.numbers.len(),
            });
        }
        if let Some(&number) = self.numbers.iter().find(|&&n| n > 36) {
            return Err(InvalidBetError::OutOfRange { kind, number });
        }

        let number = match kind {
            BetKind::Straight => {
                let number = self.numbers[0];
                if number == 0 {
                    return Err(InvalidBetError::OutOfRange { kind, number });
                }
                number
            }
            BetKind::Split => self.group_index(&SPLIT_BETS)?,
            BetKind::Street => self.group_index(&STREET_BETS)?,
            BetKind::Corner => self.group_index(&CORNER_BETS)?,
            BetKind::SixLine => self.group_index(&SIX_LINE_BETS)?,
            BetKind::Column | BetKind::Dozen => {
                let selector = self.numbers[0];
                if !(1..=3).contains(&selector) {
                    return Err(InvalidBetError::OutOfRange {
                        kind,
                        number: selector,
                    });
                }
                selector - 1
            }
            BetKind::Red
            | BetKind::Black
            | BetKind::Odd
            | BetKind::Even
            | BetKind::Low
            | BetKind::High => 0,
        };

        Ok(WireBet {
            kind,
            amount: self.amount.to_string(),
            number,
        })
    }

    fn group_index<const N: usize>(&self, table: &[[u8; N]]) -> Result<u8, InvalidBetError> {
        table_index(table, &self.numbers).ok_or_else(|| InvalidBetError::NotOnTable {
            kind: self.kind,
            numbers: self.numbers.clone(),
        })
    }
}

/// Bets evaluated together against one spin.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WagerRound {
    pub bets: Vec<Bet>,
}

impl WagerRound {
    pub fn new(bets: Vec<Bet>) -> Self {
        Self { bets }
    }

    pub fn total_deposit(&self) -> Result<u128, InvalidBetError> {
        self.bets.iter().try_fold(0u128, |acc, bet| {
            acc.checked_add(bet.amount)
                .ok_or(InvalidBetError::DepositOverflow)
        })
    }

    pub fn to_wire(&self) -> Result<Vec<WireBet>, InvalidBetError> {
        self.bets.iter().map(Bet::to_wire).collect()
    }
}

/// What one call to the game submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundPlan {
    Single(WagerRound),
    Batch(Vec<WagerRound>),
}

impl RoundPlan {
    pub fn rounds(&self) -> &[WagerRound] {
        match self {
            RoundPlan::Single(round) => std::slice::from_ref(round),
            RoundPlan::Batch(rounds) => rounds,
        }
    }

    pub fn bet_count(&self) -> usize {
        self.rounds().iter().map(|r| r.bets.len()).sum()
    }

    /// Exact sum of every stake in the plan; this is the deposit attached to the call.
    pub fn total_deposit(&self) -> Result<u128, InvalidBetError> {
        self.rounds().iter().try_fold(0u128, |acc, round| {
            acc.checked_add(round.total_deposit()?)
                .ok_or(InvalidBetError::DepositOverflow)
        })
    }

    pub fn validate(&self) -> Result<(), InvalidBetError> {
        let count = self.rounds().len();
        if count > MAX_SPINS_PER_CALL {
            return Err(InvalidBetError::TooManySpins { count });
        }
        self.rounds()
            .iter()
            .flat_map(|round| round.bets.iter())
            .try_for_each(Bet::validate)
    }

    /// JSON arguments for the spin call.
    pub fn to_args(&self, callback_gas: u8) -> Result<Value, InvalidBetError> {
        Ok(match self {
            RoundPlan::Single(round) => json!({
                "bets": round.to_wire()?,
                "callback_gas": callback_gas,
            }),
            RoundPlan::Batch(rounds) => {
                let spins = rounds
                    .iter()
                    .map(WagerRound::to_wire)
                    .collect::<Result<Vec<_>, _>>()?;
                json!({
                    "spins": spins,
                    "callback_gas": callback_gas,
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAKE: u128 = 100_000_000_000_000_000_000_000;

    #[test]
    fn encodes_inside_bets_as_table_indexes() {
        let split = Bet::new(BetKind::Split, vec![5, 2], STAKE).to_wire().expect("split");
        assert_eq!(split.number, 3);
        let street = Bet::new(BetKind::Street, vec![34, 35, 36], STAKE)
            .to_wire()
            .expect("street");
        assert_eq!(street.number, 11);
        let straight = Bet::straight(17, STAKE).to_wire().expect("straight");
        assert_eq!(straight.number, 17);
        assert_eq!(straight.amount, STAKE.to_string());
    }

    #[test]
    fn encodes_column_and_dozen_zero_based() {
        let column = Bet::new(BetKind::Column, vec![3], STAKE).to_wire().expect("column");
        assert_eq!(column.number, 2);
        let dozen = Bet::new(BetKind::Dozen, vec![1], STAKE).to_wire().expect("dozen");
        assert_eq!(dozen.number, 0);
    }

    #[test]
    fn rejects_wrong_cardinality() {
        let err = Bet::new(BetKind::Red, vec![1], STAKE).validate().unwrap_err();
        assert_eq!(
            err,
            InvalidBetError::Cardinality {
                kind: BetKind::Red,
                expected: 0,
                found: 1
            }
        );
        assert!(Bet::new(BetKind::Straight, vec![], STAKE).validate().is_err());
        assert!(Bet::new(BetKind::Split, vec![1], STAKE).validate().is_err());
    }

    #[test]
    fn rejects_non_adjacent_groups() {
        let err = Bet::new(BetKind::Split, vec![1, 3], STAKE).validate().unwrap_err();
        assert!(matches!(err, InvalidBetError::NotOnTable { .. }));
        assert!(Bet::new(BetKind::Corner, vec![1, 2, 3, 4], STAKE).validate().is_err());
    }

    #[test]
    fn rejects_zero_stake_and_out_of_range_numbers() {
        assert_eq!(
            Bet::even_money(BetKind::Odd, 0).validate(),
            Err(InvalidBetError::ZeroAmount { kind: BetKind::Odd })
        );
        assert!(Bet::straight(37, STAKE).validate().is_err());
        assert!(Bet::straight(0, STAKE).validate().is_err());
        assert!(Bet::new(BetKind::Dozen, vec![4], STAKE).validate().is_err());
    }

    #[test]
    fn deposit_is_the_exact_sum_of_stakes() {
        assert_eq!(WagerRound::default().total_deposit(), Ok(0));

        let single = RoundPlan::Single(WagerRound::new(vec![Bet::even_money(BetKind::Red, 7)]));
        assert_eq!(single.total_deposit(), Ok(7));

        let round = WagerRound::new(vec![
            Bet::straight(1, 3),
            Bet::even_money(BetKind::High, 11),
            Bet::new(BetKind::Column, vec![2], 13),
        ]);
        let batch = RoundPlan::Batch(vec![round.clone(), WagerRound::default(), round]);
        assert_eq!(batch.total_deposit(), Ok(54));
        assert_eq!(batch.bet_count(), 6);
    }

    #[test]
    fn deposit_overflow_is_a_local_error() {
        let round = WagerRound::new(vec![
            Bet::even_money(BetKind::Red, u128::MAX),
            Bet::even_money(BetKind::Black, 1),
        ]);
        assert_eq!(round.total_deposit(), Err(InvalidBetError::DepositOverflow));
    }

    #[test]
    fn batches_stop_one_short_of_sixty_four_spins() {
        let round = WagerRound::new(vec![Bet::even_money(BetKind::Red, 1)]);
        let full = RoundPlan::Batch(vec![round.clone(); MAX_SPINS_PER_CALL]);
        assert_eq!(full.validate(), Ok(()));

        let over = RoundPlan::Batch(vec![round; 64]);
        assert_eq!(over.validate(), Err(InvalidBetError::TooManySpins { count: 64 }));
    }

    #[test]
    fn batch_args_keep_submission_order() {
        let plan = RoundPlan::Batch(vec![
            WagerRound::new(vec![Bet::straight(4, 1), Bet::even_money(BetKind::Even, 2)]),
            WagerRound::new(vec![Bet::even_money(BetKind::Low, 3)]),
        ]);
        let args = plan.to_args(3).expect("args");
        assert_eq!(args["callback_gas"], 3);
        assert_eq!(args["spins"][0][0]["kind"], "Straight");
        assert_eq!(args["spins"][0][1]["kind"], "Even");
        assert_eq!(args["spins"][1][0]["amount"], "3");
    }

    #[test]
    fn single_args_use_a_flat_bet_list() {
        let bet = Bet::even_money(BetKind::Red, 100_000_000);
        let plan = RoundPlan::Single(WagerRound::new(vec![bet]));
        let args = plan.to_args(5).expect("args");
        assert_eq!(args["bets"][0]["kind"], "Red");
        assert_eq!(args["bets"][0]["number"], 0);
        assert!(args.get("spins").is_none());
    }
}
