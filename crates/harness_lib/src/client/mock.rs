//! In-memory ledger and faucet for tests.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::client::faucet::{FaucetGateway, FundingReceipt, TransportError};
use crate::client::ledger::{LedgerClient, LedgerError};

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCall {
    CreateAccount {
        payer_id: String,
        new_id: String,
        public_key: String,
        initial_balance: u128,
    },
    DeleteAccount {
        account_id: String,
        beneficiary_id: String,
    },
    DeployContract {
        account_id: String,
        code_len: usize,
    },
    View {
        contract_id: String,
        method: String,
        args: Value,
    },
    Call {
        caller_id: String,
        contract_id: String,
        method: String,
        args: Value,
        deposit: u128,
        gas: u64,
    },
    Balance {
        account_id: String,
    },
}

#[derive(Default)]
struct LedgerState {
    calls: Vec<LedgerCall>,
    call_results: VecDeque<Result<Value, String>>,
    views: HashMap<String, Value>,
    failing_accounts: HashSet<String>,
    balance: u128,
}

/// Records every operation. Call results are scripted in order; unscripted calls return null.
#[derive(Clone, Default)]
pub struct MockLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push_call_result(&self, value: Value) {
        self.state().call_results.push_back(Ok(value));
    }

    pub fn push_call_failure(&self, message: impl Into<String>) {
        self.state().call_results.push_back(Err(message.into()));
    }

    pub fn set_view(&self, method: impl Into<String>, value: Value) {
        self.state().views.insert(method.into(), value);
    }

    /// Make account creation and deletion fail for `account_id`.
    pub fn fail_account(&self, account_id: impl Into<String>) {
        self.state().failing_accounts.insert(account_id.into());
    }

    pub fn set_balance(&self, balance: u128) {
        self.state().balance = balance;
    }

    pub fn calls(&self) -> Vec<LedgerCall> {
        self.state().calls.clone()
    }

    pub fn deleted_accounts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                LedgerCall::DeleteAccount { account_id, .. } => Some(account_id),
                _ => None,
            })
            .collect()
    }

    pub fn deposits(&self) -> Vec<u128> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                LedgerCall::Call { deposit, .. } => Some(deposit),
                _ => None,
            })
            .collect()
    }

    fn check_account(&self, operation: &'static str, account_id: &str) -> Result<(), LedgerError> {
        if self.state().failing_accounts.contains(account_id) {
            return Err(LedgerError::Rejected {
                operation,
                message: format!("scripted failure for {account_id}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn create_account(
        &self,
        payer_id: &str,
        new_id: &str,
        public_key: &str,
        initial_balance: u128,
    ) -> Result<(), LedgerError> {
        self.state().calls.push(LedgerCall::CreateAccount {
            payer_id: payer_id.to_string(),
            new_id: new_id.to_string(),
            public_key: public_key.to_string(),
            initial_balance,
        });
        self.check_account("create_account", new_id)
    }

    async fn delete_account(
        &self,
        account_id: &str,
        beneficiary_id: &str,
    ) -> Result<(), LedgerError> {
        self.state().calls.push(LedgerCall::DeleteAccount {
            account_id: account_id.to_string(),
            beneficiary_id: beneficiary_id.to_string(),
        });
        self.check_account("delete_account", account_id)
    }

    async fn deploy_contract(&self, account_id: &str, bytecode: &[u8]) -> Result<(), LedgerError> {
        self.state().calls.push(LedgerCall::DeployContract {
            account_id: account_id.to_string(),
            code_len: bytecode.len(),
        });
        self.check_account("deploy_contract", account_id)
    }

    async fn view_function(
        &self,
        contract_id: &str,
        method: &str,
        args: Value,
    ) -> Result<Value, LedgerError> {
        let mut state = self.state();
        state.calls.push(LedgerCall::View {
            contract_id: contract_id.to_string(),
            method: method.to_string(),
            args,
        });
        state.views.get(method).cloned().ok_or(LedgerError::Rejected {
            operation: "view_function",
            message: format!("no view scripted for {method}"),
        })
    }

    async fn call_function(
        &self,
        caller_id: &str,
        contract_id: &str,
        method: &str,
        args: Value,
        deposit: u128,
        gas: u64,
    ) -> Result<Value, LedgerError> {
        let mut state = self.state();
        state.calls.push(LedgerCall::Call {
            caller_id: caller_id.to_string(),
            contract_id: contract_id.to_string(),
            method: method.to_string(),
            args,
            deposit,
            gas,
        });
        match state.call_results.pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(LedgerError::Rejected {
                operation: "call_function",
                message,
            }),
            None => Ok(Value::Null),
        }
    }

    async fn view_account_balance(&self, account_id: &str) -> Result<u128, LedgerError> {
        self.state().calls.push(LedgerCall::Balance {
            account_id: account_id.to_string(),
        });
        self.check_account("view_account_balance", account_id)?;
        Ok(self.state().balance)
    }
}

#[derive(Default)]
struct FaucetState {
    requests: Vec<(String, String)>,
    responses: VecDeque<Result<Value, String>>,
}

/// Answers `{ "status": { "SuccessValue": "" } }` unless responses are scripted.
#[derive(Clone, Default)]
pub struct MockFaucet {
    state: Arc<Mutex<FaucetState>>,
}

impl MockFaucet {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FaucetState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push_body(&self, body: Value) {
        self.state().responses.push_back(Ok(body));
    }

    pub fn push_transport_failure(&self, message: impl Into<String>) {
        self.state().responses.push_back(Err(message.into()));
    }

    pub fn funded_ids(&self) -> Vec<String> {
        self.state().requests.iter().map(|(id, _)| id.clone()).collect()
    }
}

#[async_trait]
impl FaucetGateway for MockFaucet {
    async fn fund(
        &self,
        new_account_id: &str,
        new_account_public_key: &str,
    ) -> Result<FundingReceipt, TransportError> {
        let mut state = self.state();
        state
            .requests
            .push((new_account_id.to_string(), new_account_public_key.to_string()));
        match state.responses.pop_front() {
            Some(Ok(body)) => Ok(FundingReceipt::from_body(200, &body)),
            Some(Err(message)) => Err(TransportError::Http(message)),
            None => Ok(FundingReceipt::from_body(
                200,
                &json!({ "status": { "SuccessValue": "" } }),
            )),
        }
    }
}
