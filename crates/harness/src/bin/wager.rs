use anyhow::Result;
use harness::runners::builders::FullTableBuilder;
use harness::runners::deposit::{DepositConfig, deposit_tokens};
use harness::runners::orchestrator::{WagerConfig, WagerOrchestrator};
use harness::runners::provision::{CONTRACT_INITIAL_BALANCE, ProvisionConfig, redeploy_from_file};
use harness::runners::stats::{StatsReporter, log_balance};
use harness::{App, config, logging::init_tracing, shutdown};
use harness_lib::units::format_near_amount;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load()?;
    init_tracing(&cfg, "wager");

    let app = App::init_from(cfg)?;
    let cfg = app.config();
    let contract_id = cfg.contract_id()?.to_string();
    let ledger = app.ledger();
    let step_delay = Duration::from_millis(cfg.round_delay_ms);
    log_balance(ledger.as_ref(), &cfg.account_id).await;

    if cfg.deploy_contract {
        let provision = ProvisionConfig {
            caller_id: cfg.account_id.clone(),
            contract_id: contract_id.clone(),
            public_key: app.public_key(),
            initial_balance: CONTRACT_INITIAL_BALANCE,
            step_delay,
        };
        let report =
            redeploy_from_file(ledger.clone(), &provision, &cfg.contract_wasm_path).await?;
        info!(?report, "contract provisioning finished");
    }

    if let (Some(token_id), Some(amount)) = (&cfg.ft_contract_id, &cfg.ft_deposit_amount) {
        let deposit = DepositConfig {
            caller_id: cfg.account_id.clone(),
            contract_id: contract_id.clone(),
            token_id: token_id.clone(),
            amount: amount.clone(),
            settle_delay: step_delay,
        };
        deposit_tokens(ledger.as_ref(), &deposit).await;
    }

    let (trigger, stop) = shutdown::channel();
    shutdown::spawn_ctrl_c(trigger);

    let stats = StatsReporter::new(ledger.clone(), contract_id.clone(), cfg.bet_amount);
    let orchestrator = WagerOrchestrator::new(
        ledger,
        WagerConfig {
            caller_id: cfg.account_id.clone(),
            contract_id,
            method: cfg.spin_method.clone(),
            gas: cfg.call_gas,
            callback_gas: cfg.callback_gas,
            round_delay: Duration::from_millis(cfg.round_delay_ms),
            stats_every: cfg.stats_every,
            verbose: cfg.verbose,
        },
    )
    .with_stats(stats);

    let mut builder = FullTableBuilder::new(cfg.spin_mode, cfg.spins_per_call, cfg.bet_amount);
    info!(
        mode = ?cfg.spin_mode,
        spins_per_call = cfg.spins_per_call,
        max_rounds = ?cfg.max_rounds,
        "starting wager session"
    );
    let tally = orchestrator.run_rounds(&mut builder, cfg.max_rounds, stop).await;

    info!(
        rounds = tally.rounds_attempted,
        settled = tally.rounds_settled,
        failed = tally.rounds_failed,
        rejected = tally.rounds_rejected,
        decode_failures = tally.decode_failures,
        outcomes = tally.outcomes,
        total_payout_multiple = tally.total_payout_multiple,
        wagered = %format_near_amount(tally.total_deposit, 4),
        "wager session finished"
    );

    Ok(())
}
