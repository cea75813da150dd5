use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use harness_lib::client::{FaucetGateway, LedgerClient};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::shutdown::Shutdown;

/// Window the inter-cycle wait is drawn from, uniformly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitWindow {
    pub min: Duration,
    pub max: Duration,
}

impl WaitWindow {
    pub fn draw(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let min_ms = self.min.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
    }
}

#[derive(Clone, Debug)]
pub struct RotationConfig {
    /// Receives the balance of every deleted account.
    pub sink_account_id: String,
    /// Pause after funding before the account is used.
    pub settle_delay: Duration,
    pub wait_window: WaitWindow,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountIdentity {
    pub id: String,
    pub public_key: String,
    pub created_at: DateTime<Utc>,
}

/// Issues `<unix millis><suffix>` ids that never repeat within the process, even when
/// two are requested in the same millisecond.
#[derive(Clone, Debug)]
pub struct IdentityGenerator {
    suffix: String,
    last_millis: Option<i64>,
}

impl IdentityGenerator {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            last_millis: None,
        }
    }

    pub fn next_id(&mut self, now: DateTime<Utc>) -> Result<String> {
        let millis = now.timestamp_millis();
        if millis < 0 {
            bail!("system clock is before the unix epoch");
        }
        let millis = match self.last_millis {
            Some(last) if millis <= last => last + 1,
            _ => millis,
        };
        self.last_millis = Some(millis);
        Ok(format!("{millis}{}", self.suffix))
    }
}

#[derive(Clone, Debug, Default)]
pub struct RotationState {
    /// Account from the previous cycle, deleted during the next one.
    pub previous_account_id: Option<String>,
    pub current_account: Option<AccountIdentity>,
    pub next_wait: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleReport {
    pub account_id: String,
    pub funded: bool,
    /// Previous account and whether its deletion went through.
    pub deleted: Option<(String, bool)>,
}

/// Keeps one funded throwaway account alive at a time: create, fund, settle, delete the
/// previous one, wait, repeat.
pub struct AccountRotator<L: ?Sized, F: ?Sized> {
    ledger: Arc<L>,
    faucet: Arc<F>,
    public_key: String,
    cfg: RotationConfig,
    ids: IdentityGenerator,
    state: RotationState,
}

impl<L, F> AccountRotator<L, F>
where
    L: LedgerClient + ?Sized,
    F: FaucetGateway + ?Sized,
{
    pub fn new(
        ledger: Arc<L>,
        faucet: Arc<F>,
        public_key: impl Into<String>,
        identity_suffix: impl Into<String>,
        cfg: RotationConfig,
    ) -> Self {
        let state = RotationState {
            next_wait: cfg.wait_window.draw(),
            ..RotationState::default()
        };
        Self {
            ledger,
            faucet,
            public_key: public_key.into(),
            cfg,
            ids: IdentityGenerator::new(identity_suffix),
            state,
        }
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    fn next_identity(&mut self) -> Result<AccountIdentity> {
        let created_at = Utc::now();
        Ok(AccountIdentity {
            id: self.ids.next_id(created_at)?,
            public_key: self.public_key.clone(),
            created_at,
        })
    }

    /// One create/fund/settle/delete-previous step. Remote failures are logged, never returned.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let identity = self.next_identity()?;
        let account_id = identity.id.clone();

        info!(account_id = %account_id, "requesting funding for new account");
        let funded = match self.faucet.fund(&identity.id, &identity.public_key).await {
            Ok(receipt) if receipt.is_funded() => {
                info!(account_id = %account_id, "account funded");
                true
            }
            Ok(receipt) => {
                warn!(
                    account_id = %account_id,
                    http_status = receipt.http_status,
                    failure = ?receipt.failure,
                    success_value = ?receipt.success_value,
                    "faucet did not confirm funding"
                );
                false
            }
            Err(err) => {
                warn!(account_id = %account_id, error = %err, "faucet request failed");
                false
            }
        };

        self.state.current_account = Some(identity);
        tokio::time::sleep(self.cfg.settle_delay).await;

        let deleted = match self.state.previous_account_id.take() {
            Some(previous) => {
                let ok = match self
                    .ledger
                    .delete_account(&previous, &self.cfg.sink_account_id)
                    .await
                {
                    Ok(()) => {
                        info!(
                            account_id = %previous,
                            beneficiary = %self.cfg.sink_account_id,
                            "account deleted"
                        );
                        true
                    }
                    Err(err) => {
                        warn!(account_id = %previous, error = %err, "delete_account failed");
                        false
                    }
                };
                Some((previous, ok))
            }
            None => None,
        };

        self.state.previous_account_id = Some(account_id.clone());

        Ok(CycleReport {
            account_id,
            funded,
            deleted,
        })
    }

    /// Rotate until shutdown or until `max_cycles` cycles have run. Returns the cycle count.
    pub async fn run(&mut self, mut shutdown: Shutdown, max_cycles: Option<u64>) -> Result<u64> {
        let mut cycles = 0u64;
        while !shutdown.is_triggered() {
            self.run_cycle().await?;
            cycles += 1;

            if max_cycles.is_some_and(|max| cycles >= max) {
                break;
            }

            let wait = self.state.next_wait;
            info!(wait_secs = wait.as_secs(), "waiting before next rotation");
            if !shutdown.sleep(wait).await {
                break;
            }
            self.state.next_wait = self.cfg.wait_window.draw();
        }
        Ok(cycles)
    }

    pub async fn run_forever(&mut self, shutdown: Shutdown) -> Result<u64> {
        self.run(shutdown, None).await
    }
}
