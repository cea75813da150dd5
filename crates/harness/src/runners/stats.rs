use harness_lib::client::{LedgerClient, LedgerError};
use harness_lib::types::{AggregateStats, DecodeError};
use harness_lib::units::format_near_amount;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

const STATS_METHOD: &str = "stats";
const CURRENCY_DECIMALS: usize = 4;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("stats view failed: {0}")]
    Ledger(#[from] LedgerError),
    #[error("stats view returned an unexpected shape: {0}")]
    Decode(#[from] DecodeError),
}

/// Reads the game's lifetime counters. Every call hits the ledger.
pub struct StatsReporter<L: ?Sized> {
    ledger: Arc<L>,
    contract_id: String,
    nominal_stake: u128,
}

impl<L: LedgerClient + ?Sized> StatsReporter<L> {
    pub fn new(ledger: Arc<L>, contract_id: impl Into<String>, nominal_stake: u128) -> Self {
        Self {
            ledger,
            contract_id: contract_id.into(),
            nominal_stake,
        }
    }

    pub async fn fetch(&self) -> Result<AggregateStats, StatsError> {
        let value = self
            .ledger
            .view_function(&self.contract_id, STATS_METHOD, json!({}))
            .await?;
        Ok(AggregateStats::decode(&value)?)
    }

    pub async fn fetch_and_format(&self) -> Result<String, StatsError> {
        let stats = self.fetch().await?;
        Ok(self.format(&stats))
    }

    pub fn format(&self, stats: &AggregateStats) -> String {
        format!(
            "spins: {} bets: {} wagered: {} house: {} payout: {}",
            stats.total_spins,
            stats.total_bets,
            format_near_amount(stats.total_wagered(self.nominal_stake), CURRENCY_DECIMALS),
            format_near_amount(stats.house_balance, CURRENCY_DECIMALS),
            format_near_amount(stats.total_payout, CURRENCY_DECIMALS),
        )
    }
}

/// Log an account's balance. A failed read is logged and reported as `None`.
pub async fn log_balance<L: LedgerClient + ?Sized>(ledger: &L, account_id: &str) -> Option<u128> {
    match ledger.view_account_balance(account_id).await {
        Ok(balance) => {
            info!(
                account_id,
                balance = %format_near_amount(balance, CURRENCY_DECIMALS),
                "account balance"
            );
            Some(balance)
        }
        Err(err) => {
            warn!(account_id, error = %err, "could not read account balance");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_lib::client::mock::{LedgerCall, MockLedger};
    use harness_lib::units::YOCTO_PER_NEAR;

    #[tokio::test]
    async fn formats_one_line_with_four_decimals() {
        let ledger = MockLedger::new();
        ledger.set_view(
            "stats",
            json!(["120", "1560", "12345678900000000000000000", "98765432100000000000000000"]),
        );
        let stake = YOCTO_PER_NEAR / 10;
        let reporter = StatsReporter::new(Arc::new(ledger.clone()), "game.testnet", stake);

        let line = reporter.fetch_and_format().await.expect("stats");
        assert_eq!(
            line,
            "spins: 120 bets: 1560 wagered: 156.0000 house: 12.3457 payout: 98.7654"
        );
        assert!(matches!(
            &ledger.calls()[0],
            LedgerCall::View { contract_id, method, .. }
                if contract_id == "game.testnet" && method == "stats"
        ));
    }

    #[tokio::test]
    async fn malformed_stats_are_decode_errors() {
        let ledger = MockLedger::new();
        ledger.set_view("stats", json!(["1", "2", "3"]));
        let reporter = StatsReporter::new(Arc::new(ledger), "game.testnet", 1);
        assert!(matches!(reporter.fetch().await, Err(StatsError::Decode(_))));
    }

    #[tokio::test]
    async fn view_failures_are_ledger_errors() {
        let reporter = StatsReporter::new(Arc::new(MockLedger::new()), "game.testnet", 1);
        assert!(matches!(reporter.fetch().await, Err(StatsError::Ledger(_))));
    }

    #[tokio::test]
    async fn balance_is_read_for_the_named_account() {
        let ledger = MockLedger::new();
        ledger.set_balance(42 * YOCTO_PER_NEAR);
        assert_eq!(log_balance(&ledger, "player.testnet").await, Some(42 * YOCTO_PER_NEAR));
        assert_eq!(
            ledger.calls(),
            vec![LedgerCall::Balance {
                account_id: "player.testnet".into()
            }]
        );

        ledger.fail_account("gone.testnet");
        assert_eq!(log_balance(&ledger, "gone.testnet").await, None);
    }
}
