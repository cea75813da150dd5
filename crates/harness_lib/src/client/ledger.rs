use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("account {0} does not exist")]
    AccountNotFound(String),
    #[error("{operation} rejected: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("invalid account id: {0}")]
    InvalidAccountId(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// The ledger operations the harness needs. Amounts are yocto, gas is raw gas units.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Create `new_id` from `payer_id`, with `public_key` as a full-access key.
    async fn create_account(
        &self,
        payer_id: &str,
        new_id: &str,
        public_key: &str,
        initial_balance: u128,
    ) -> Result<(), LedgerError>;

    /// Delete `account_id`, sending its remaining balance to `beneficiary_id`.
    async fn delete_account(
        &self,
        account_id: &str,
        beneficiary_id: &str,
    ) -> Result<(), LedgerError>;

    async fn deploy_contract(&self, account_id: &str, bytecode: &[u8]) -> Result<(), LedgerError>;

    async fn view_function(
        &self,
        contract_id: &str,
        method: &str,
        args: Value,
    ) -> Result<Value, LedgerError>;

    async fn call_function(
        &self,
        caller_id: &str,
        contract_id: &str,
        method: &str,
        args: Value,
        deposit: u128,
        gas: u64,
    ) -> Result<Value, LedgerError>;

    async fn view_account_balance(&self, account_id: &str) -> Result<u128, LedgerError>;
}
