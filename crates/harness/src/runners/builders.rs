use harness_lib::types::{Bet, BetKind, RoundPlan, SpinMode, WagerRound};
use harness_lib::wheel::{CORNER_BETS, SIX_LINE_BETS, SPLIT_BETS, STREET_BETS};

/// Produces the plan for round `round` (1-based).
pub trait RoundBuilder {
    fn build(&mut self, round: u64) -> RoundPlan;
}

impl<F> RoundBuilder for F
where
    F: FnMut(u64) -> RoundPlan,
{
    fn build(&mut self, round: u64) -> RoundPlan {
        self(round)
    }
}

/// Submits the same plan every round.
#[derive(Debug, Clone)]
pub struct FixedRound(pub RoundPlan);

impl RoundBuilder for FixedRound {
    fn build(&mut self, _round: u64) -> RoundPlan {
        self.0.clone()
    }
}

/// One bet of every kind at the same stake, repeated `spins_per_call` times in batch mode.
#[derive(Debug, Clone)]
pub struct FullTableBuilder {
    pub spins_per_call: usize,
    pub stake: u128,
    pub mode: SpinMode,
}

impl FullTableBuilder {
    pub fn new(mode: SpinMode, spins_per_call: usize, stake: u128) -> Self {
        Self {
            spins_per_call,
            stake,
            mode,
        }
    }

    pub fn table_round(&self) -> WagerRound {
        let stake = self.stake;
        let mut bets = vec![
            Bet::straight(1, stake),
            Bet::new(BetKind::Split, SPLIT_BETS[0].to_vec(), stake),
            Bet::new(BetKind::Street, STREET_BETS[0].to_vec(), stake),
            Bet::new(BetKind::Corner, CORNER_BETS[0].to_vec(), stake),
            Bet::new(BetKind::SixLine, SIX_LINE_BETS[0].to_vec(), stake),
            Bet::new(BetKind::Column, vec![1], stake),
            Bet::new(BetKind::Dozen, vec![1], stake),
        ];
        bets.extend(
            [
                BetKind::Red,
                BetKind::Black,
                BetKind::Odd,
                BetKind::Even,
                BetKind::Low,
                BetKind::High,
            ]
            .into_iter()
            .map(|kind| Bet::even_money(kind, stake)),
        );
        WagerRound::new(bets)
    }
}

impl RoundBuilder for FullTableBuilder {
    fn build(&mut self, _round: u64) -> RoundPlan {
        match self.mode {
            SpinMode::Single => RoundPlan::Single(self.table_round()),
            SpinMode::Batch => {
                RoundPlan::Batch(vec![self.table_round(); self.spins_per_call.max(1)])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_lib::units::YOCTO_PER_NEAR;

    #[test]
    fn full_table_covers_every_kind_once() {
        let builder = FullTableBuilder::new(SpinMode::Batch, 4, YOCTO_PER_NEAR / 10);
        let round = builder.table_round();
        let kinds: Vec<BetKind> = round.bets.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, BetKind::ALL.to_vec());
        for bet in &round.bets {
            bet.validate().expect("table bet is valid");
        }
    }

    #[test]
    fn batch_plan_repeats_the_table() {
        let stake = YOCTO_PER_NEAR / 10;
        let mut builder = FullTableBuilder::new(SpinMode::Batch, 4, stake);
        let plan = builder.build(1);
        assert_eq!(plan.rounds().len(), 4);
        assert_eq!(plan.bet_count(), 52);
        assert_eq!(plan.total_deposit().expect("deposit"), 52 * stake);
    }

    #[test]
    fn single_plan_has_one_round() {
        let mut builder = FullTableBuilder::new(SpinMode::Single, 4, 1);
        assert!(matches!(builder.build(7), RoundPlan::Single(r) if r.bets.len() == 13));
    }

    #[test]
    fn closures_and_fixed_plans_are_builders() {
        let plan = RoundPlan::Single(WagerRound::new(vec![Bet::even_money(BetKind::Red, 5)]));
        let mut fixed = FixedRound(plan.clone());
        assert_eq!(fixed.build(1), plan);
        assert_eq!(fixed.build(2), plan);

        let mut seen = Vec::new();
        let mut closure = |round: u64| {
            seen.push(round);
            RoundPlan::Single(WagerRound::new(vec![Bet::straight(round as u8, 1)]))
        };
        let built = closure.build(3);
        assert_eq!(built.rounds()[0].bets[0].numbers, vec![3]);
        assert_eq!(seen, vec![3]);
    }
}
