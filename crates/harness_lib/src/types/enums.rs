use serde::{Deserialize, Serialize};
use std::fmt;

/// Bet kinds accepted by the game, forwarded by name.
///
/// Inside bets carry table numbers. `Column` and `Dozen` carry a single selector in `1..=3`.
/// The even-money bets carry no numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetKind {
    // Inside bets
    Straight,
    Split,
    Street,
    Corner,
    SixLine,
    // Outside bets
    Column,
    Dozen,
    Red,
    Black,
    Odd,
    Even,
    Low,
    High,
}

impl BetKind {
    pub const ALL: [BetKind; 13] = [
        BetKind::Straight,
        BetKind::Split,
        BetKind::Street,
        BetKind::Corner,
        BetKind::SixLine,
        BetKind::Column,
        BetKind::Dozen,
        BetKind::Red,
        BetKind::Black,
        BetKind::Odd,
        BetKind::Even,
        BetKind::Low,
        BetKind::High,
    ];

    /// How many entries `Bet::numbers` must hold for this kind.
    pub fn required_numbers(&self) -> usize {
        match self {
            BetKind::Straight => 1,
            BetKind::Split => 2,
            BetKind::Street => 3,
            BetKind::Corner => 4,
            BetKind::SixLine => 6,
            BetKind::Column | BetKind::Dozen => 1,
            BetKind::Red
            | BetKind::Black
            | BetKind::Odd
            | BetKind::Even
            | BetKind::Low
            | BetKind::High => 0,
        }
    }
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpinMode {
    /// One round per call, answered with a single outcome tuple.
    Single,
    /// Several rounds per call, answered with one tuple per bet per round.
    #[default]
    Batch,
}

impl std::str::FromStr for SpinMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(SpinMode::Single),
            "batch" => Ok(SpinMode::Batch),
            other => Err(format!("unknown spin mode: {other}")),
        }
    }
}
