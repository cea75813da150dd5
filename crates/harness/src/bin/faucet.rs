use anyhow::Result;
use harness::config::FundingMode;
use harness::runners::rotator::{AccountRotator, RotationConfig, WaitWindow};
use harness::runners::stats::log_balance;
use harness::{App, config, logging::init_tracing, shutdown};
use harness_lib::client::{FaucetGateway, HelperFaucet, PayerFaucet};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load()?;
    init_tracing(&cfg, "faucet");

    let app = App::init_from(cfg)?;
    let cfg = app.config();
    let ledger = app.ledger();

    log_balance(ledger.as_ref(), &cfg.account_id).await;

    let faucet: Arc<dyn FaucetGateway> = match cfg.funding_mode {
        FundingMode::Faucet => Arc::new(HelperFaucet::new(&cfg.faucet_url, cfg.rpc_timeout_ms)?),
        FundingMode::Payer => Arc::new(PayerFaucet::new(
            ledger.clone(),
            cfg.account_id.clone(),
            cfg.funding_amount,
        )),
    };

    let (trigger, stop) = shutdown::channel();
    shutdown::spawn_ctrl_c(trigger);

    let mut rotator = AccountRotator::new(
        ledger,
        faucet,
        app.public_key(),
        cfg.account_suffix.clone(),
        RotationConfig {
            sink_account_id: cfg.sink_account_id.clone(),
            settle_delay: Duration::from_millis(cfg.settle_delay_ms),
            wait_window: WaitWindow {
                min: Duration::from_secs(cfg.rotation_wait_min_secs),
                max: Duration::from_secs(cfg.rotation_wait_max_secs),
            },
        },
    );

    info!(mode = ?cfg.funding_mode, suffix = %cfg.account_suffix, "starting account rotation");
    let cycles = rotator.run_forever(stop).await?;
    info!(cycles, "account rotation stopped");

    Ok(())
}
