use harness_lib::client::LedgerClient;
use harness_lib::units::TGAS;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{info, warn};

/// `ft_transfer_call` requires exactly one yocto attached.
const ONE_YOCTO: u128 = 1;
const TRANSFER_GAS: u64 = 300 * TGAS;

#[derive(Clone, Debug)]
pub struct DepositConfig {
    pub caller_id: String,
    pub contract_id: String,
    pub token_id: String,
    /// Token amount in the token's smallest unit, as a decimal string.
    pub amount: String,
    pub settle_delay: Duration,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DepositReport {
    pub token_balance: Option<Value>,
    pub transferred: bool,
    pub credited_balance: Option<Value>,
}

/// Move fungible tokens into the game and read back what it credited. Nothing here is fatal.
pub async fn deposit_tokens<L>(ledger: &L, cfg: &DepositConfig) -> DepositReport
where
    L: LedgerClient + ?Sized,
{
    let mut report = DepositReport::default();
    let owner = json!({ "account_id": cfg.caller_id });

    match ledger
        .view_function(&cfg.token_id, "ft_balance_of", owner.clone())
        .await
    {
        Ok(balance) => {
            info!(token_id = %cfg.token_id, balance = %balance, "token balance");
            report.token_balance = Some(balance);
        }
        Err(err) => warn!(
            token_id = %cfg.token_id,
            method = "ft_balance_of",
            error = %err,
            "view failed"
        ),
    }

    let args = json!({
        "receiver_id": cfg.contract_id,
        "amount": cfg.amount,
        "msg": "",
    });
    match ledger
        .call_function(
            &cfg.caller_id,
            &cfg.token_id,
            "ft_transfer_call",
            args,
            ONE_YOCTO,
            TRANSFER_GAS,
        )
        .await
    {
        Ok(used) => {
            info!(
                token_id = %cfg.token_id,
                amount = %cfg.amount,
                used = %used,
                "tokens transferred"
            );
            report.transferred = true;
        }
        Err(err) => warn!(
            token_id = %cfg.token_id,
            method = "ft_transfer_call",
            error = %err,
            "call failed"
        ),
    }

    tokio::time::sleep(cfg.settle_delay).await;

    match ledger
        .view_function(&cfg.contract_id, "usdc_balance", owner)
        .await
    {
        Ok(balance) => {
            info!(contract_id = %cfg.contract_id, balance = %balance, "balance credited by game");
            report.credited_balance = Some(balance);
        }
        Err(err) => warn!(
            contract_id = %cfg.contract_id,
            method = "usdc_balance",
            error = %err,
            "view failed"
        ),
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_lib::client::mock::{LedgerCall, MockLedger};

    fn cfg() -> DepositConfig {
        DepositConfig {
            caller_id: "owner.testnet".into(),
            contract_id: "game.testnet".into(),
            token_id: "usdc.fakes.testnet".into(),
            amount: "1000000000".into(),
            settle_delay: Duration::from_millis(500),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transfer_attaches_one_yocto_and_reads_back() {
        let ledger = MockLedger::new();
        ledger.set_view("ft_balance_of", json!("5000000000"));
        ledger.set_view("usdc_balance", json!("1000000000"));
        ledger.push_call_result(json!("1000000000"));

        let report = deposit_tokens(&ledger, &cfg()).await;
        assert_eq!(report.token_balance, Some(json!("5000000000")));
        assert!(report.transferred);
        assert_eq!(report.credited_balance, Some(json!("1000000000")));

        let calls = ledger.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[1],
            LedgerCall::Call {
                caller_id: "owner.testnet".into(),
                contract_id: "usdc.fakes.testnet".into(),
                method: "ft_transfer_call".into(),
                args: json!({ "receiver_id": "game.testnet", "amount": "1000000000", "msg": "" }),
                deposit: 1,
                gas: 300 * TGAS,
            }
        );
        assert!(matches!(
            &calls[2],
            LedgerCall::View { contract_id, method, .. }
                if contract_id == "game.testnet" && method == "usdc_balance"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_not_fatal() {
        let ledger = MockLedger::new();
        ledger.push_call_failure("not registered");
        let report = deposit_tokens(&ledger, &cfg()).await;
        assert_eq!(report, DepositReport::default());
        assert_eq!(ledger.calls().len(), 3);
    }
}
