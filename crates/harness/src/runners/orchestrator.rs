use harness_lib::client::{LedgerClient, LedgerError};
use harness_lib::types::{DecodeError, InvalidBetError, RoundPlan, SpinReturn};
use harness_lib::units::format_near_amount;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::runners::builders::RoundBuilder;
use crate::runners::stats::StatsReporter;
use crate::shutdown::Shutdown;

#[derive(Clone, Debug)]
pub struct WagerConfig {
    pub caller_id: String,
    pub contract_id: String,
    pub method: String,
    pub gas: u64,
    /// Tgas the game reserves for its randomness callback.
    pub callback_gas: u8,
    pub round_delay: Duration,
    /// Rounds between stats lines; 0 disables them.
    pub stats_every: u64,
    pub verbose: bool,
}

#[derive(Debug, Error)]
pub enum RoundError {
    #[error("round rejected before submission: {0}")]
    Invalid(#[from] InvalidBetError),
    #[error("spin call failed: {0}")]
    Ledger(#[from] LedgerError),
    #[error("spin result does not match the submitted round: {0}")]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub deposit: u128,
    pub result: SpinReturn,
}

impl RoundReport {
    pub fn payout_multiple(&self) -> u64 {
        self.result.total_payout_multiple()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTally {
    pub rounds_attempted: u64,
    pub rounds_settled: u64,
    pub rounds_failed: u64,
    pub rounds_rejected: u64,
    pub decode_failures: u64,
    pub outcomes: u64,
    pub total_payout_multiple: u64,
    pub total_deposit: u128,
}

impl SessionTally {
    fn record(&mut self, outcome: &Result<RoundReport, RoundError>) {
        self.rounds_attempted += 1;
        match outcome {
            Ok(report) => {
                self.rounds_settled += 1;
                self.outcomes += report.result.outcomes().count() as u64;
                self.total_payout_multiple += report.payout_multiple();
                self.total_deposit = self.total_deposit.saturating_add(report.deposit);
            }
            Err(RoundError::Invalid(_)) => self.rounds_rejected += 1,
            Err(RoundError::Ledger(_)) => self.rounds_failed += 1,
            Err(RoundError::Decode(_)) => self.decode_failures += 1,
        }
    }
}

/// Submits rounds to the game one at a time and tallies what comes back.
pub struct WagerOrchestrator<L: ?Sized> {
    ledger: Arc<L>,
    cfg: WagerConfig,
    stats: Option<StatsReporter<L>>,
}

impl<L: LedgerClient + ?Sized> WagerOrchestrator<L> {
    pub fn new(ledger: Arc<L>, cfg: WagerConfig) -> Self {
        Self {
            ledger,
            cfg,
            stats: None,
        }
    }

    pub fn with_stats(mut self, reporter: StatsReporter<L>) -> Self {
        self.stats = Some(reporter);
        self
    }

    /// Validate, submit and decode one plan. Nothing is sent if any bet is invalid.
    pub async fn play_round(&self, plan: &RoundPlan) -> Result<RoundReport, RoundError> {
        plan.validate()?;
        let deposit = plan.total_deposit()?;
        let args = plan.to_args(self.cfg.callback_gas)?;

        debug!(
            contract_id = %self.cfg.contract_id,
            method = %self.cfg.method,
            bets = plan.bet_count(),
            deposit = %deposit,
            "submitting round"
        );
        let value = self
            .ledger
            .call_function(
                &self.cfg.caller_id,
                &self.cfg.contract_id,
                &self.cfg.method,
                args,
                deposit,
                self.cfg.gas,
            )
            .await?;

        let result = SpinReturn::decode(&value, plan)?;
        Ok(RoundReport { deposit, result })
    }

    fn log_report(&self, round: u64, plan: &RoundPlan, report: &RoundReport) {
        let rounds = plan.rounds().iter().zip(report.result.rounds());
        for (spin, (submitted, outcomes)) in rounds.enumerate() {
            let Some(first) = outcomes.first() else {
                continue;
            };
            let payout: u64 = outcomes.iter().map(|o| o.payout_multiple()).sum();
            info!(
                round,
                spin,
                landed = first.landed_number,
                color = %first.declared_color(),
                payout_multiple = payout,
                "spin settled"
            );

            for outcome in outcomes.iter().filter(|o| o.color_mismatch()) {
                warn!(
                    round,
                    spin,
                    landed = outcome.landed_number,
                    declared = %outcome.declared_color(),
                    wheel = ?outcome.wheel_color(),
                    "declared color disagrees with the wheel layout"
                );
            }

            if self.cfg.verbose {
                for (bet, outcome) in submitted.bets.iter().zip(outcomes) {
                    info!(
                        round,
                        spin,
                        kind = %bet.kind,
                        landed = outcome.landed_number,
                        color = %outcome.declared_color(),
                        payout_multiple = outcome.payout_multiple(),
                        "bet settled"
                    );
                }
            }
        }
        info!(
            round,
            deposit = %format_near_amount(report.deposit, 4),
            total_payout_multiple = report.payout_multiple(),
            "round complete"
        );
    }

    async fn report_stats(&self) {
        let Some(reporter) = &self.stats else {
            return;
        };
        match reporter.fetch_and_format().await {
            Ok(line) => info!("{line}"),
            Err(err) => warn!(error = %err, "stats unavailable"),
        }
    }

    /// Play rounds until `max_rounds` have been attempted or shutdown fires.
    pub async fn run_rounds<B>(
        &self,
        builder: &mut B,
        max_rounds: Option<u64>,
        mut shutdown: Shutdown,
    ) -> SessionTally
    where
        B: RoundBuilder + ?Sized,
    {
        let mut tally = SessionTally::default();

        while !shutdown.is_triggered() {
            let round = tally.rounds_attempted + 1;
            let plan = builder.build(round);
            let outcome = self.play_round(&plan).await;

            match &outcome {
                Ok(report) => self.log_report(round, &plan, report),
                Err(RoundError::Invalid(err)) => {
                    error!(round, error = %err, "invalid round skipped");
                }
                Err(RoundError::Ledger(err)) => {
                    warn!(round, method = %self.cfg.method, error = %err, "spin call failed");
                }
                Err(RoundError::Decode(err)) => {
                    error!(
                        round,
                        method = %self.cfg.method,
                        error = %err,
                        "spin result could not be decoded"
                    );
                }
            }
            tally.record(&outcome);

            if self.cfg.stats_every > 0 && round % self.cfg.stats_every == 0 {
                self.report_stats().await;
            }

            if max_rounds.is_some_and(|max| round >= max) {
                break;
            }
            if !shutdown.sleep(self.cfg.round_delay).await {
                break;
            }
        }

        tally
    }
}
