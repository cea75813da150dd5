use anyhow::{Context, Result};
use harness_lib::client::LedgerClient;
use harness_lib::units::YOCTO_PER_NEAR;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Balance the recreated contract account starts with.
pub const CONTRACT_INITIAL_BALANCE: u128 = 100 * YOCTO_PER_NEAR;

#[derive(Clone, Debug)]
pub struct ProvisionConfig {
    pub caller_id: String,
    pub contract_id: String,
    /// Full-access key installed on the recreated account.
    pub public_key: String,
    pub initial_balance: u128,
    pub step_delay: Duration,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub deleted: bool,
    pub created: bool,
    pub deployed: bool,
}

/// Wipe and redeploy the game account: delete it, recreate it from the caller, deploy `code`.
/// Step failures are logged and the next step still runs.
pub async fn redeploy<L>(ledger: &L, cfg: &ProvisionConfig, code: &[u8]) -> ProvisionReport
where
    L: LedgerClient + ?Sized,
{
    let mut report = ProvisionReport::default();

    match ledger.delete_account(&cfg.contract_id, &cfg.caller_id).await {
        Ok(()) => {
            info!(account_id = %cfg.contract_id, "contract account deleted");
            report.deleted = true;
        }
        Err(err) => warn!(
            account_id = %cfg.contract_id,
            error = %err,
            "error deleting contract account"
        ),
    }
    tokio::time::sleep(cfg.step_delay).await;

    match ledger
        .create_account(&cfg.caller_id, &cfg.contract_id, &cfg.public_key, cfg.initial_balance)
        .await
    {
        Ok(()) => {
            info!(account_id = %cfg.contract_id, "contract account created");
            report.created = true;
        }
        Err(err) => warn!(
            account_id = %cfg.contract_id,
            error = %err,
            "error creating contract account"
        ),
    }
    tokio::time::sleep(cfg.step_delay).await;

    match ledger.deploy_contract(&cfg.contract_id, code).await {
        Ok(()) => {
            info!(account_id = %cfg.contract_id, bytes = code.len(), "contract deployed");
            report.deployed = true;
        }
        Err(err) => warn!(account_id = %cfg.contract_id, error = %err, "error deploying contract"),
    }
    tokio::time::sleep(cfg.step_delay).await;

    report
}

/// Read the bytecode, then [`redeploy`]. A missing or unreadable file fails before anything
/// is deleted.
pub async fn redeploy_from_file<L>(
    ledger: Arc<L>,
    cfg: &ProvisionConfig,
    wasm_path: impl AsRef<Path>,
) -> Result<ProvisionReport>
where
    L: LedgerClient + ?Sized,
{
    let wasm_path = wasm_path.as_ref();
    let code = tokio::fs::read(wasm_path)
        .await
        .with_context(|| format!("Failed to read contract bytecode {}", wasm_path.display()))?;
    Ok(redeploy(ledger.as_ref(), cfg, &code).await)
}
