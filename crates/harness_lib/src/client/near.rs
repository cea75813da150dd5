use async_trait::async_trait;
use near_crypto::PublicKey;
use near_jsonrpc_client::errors::{JsonRpcError, JsonRpcServerError};
use near_jsonrpc_client::{JsonRpcClient, methods};
use near_jsonrpc_primitives::types::query::{QueryResponseKind, RpcQueryError};
use near_jsonrpc_primitives::types::transactions::RpcTransactionError;
use near_primitives::account::AccessKey;
use near_primitives::errors::InvalidTxError;
use near_primitives::hash::CryptoHash;
use near_primitives::transaction::{
    Action, AddKeyAction, CreateAccountAction, DeleteAccountAction, DeployContractAction,
    FunctionCallAction, Transaction, TransferAction,
};
use near_primitives::types::{AccountId, BlockReference, Finality, FunctionArgs};
use near_primitives::views::{FinalExecutionStatus, QueryRequest};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use crate::client::ledger::{LedgerClient, LedgerError};
use crate::wallet::Credential;

/// Last nonce handed out per signer, so back-to-back transactions never
/// reuse a nonce the node has not indexed yet.
#[derive(Debug, Default)]
pub struct NonceCache {
    issued: Mutex<HashMap<AccountId, u64>>,
}

impl NonceCache {
    /// Reserve the next nonce for `signer_id` given the access key nonce the node reported.
    pub fn reserve(&self, signer_id: &AccountId, chain_nonce: u64) -> u64 {
        let mut issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
        let nonce = next_nonce(issued.get(signer_id).copied(), chain_nonce);
        issued.insert(signer_id.clone(), nonce);
        nonce
    }

    /// Drop the cached nonce; the next reservation trusts the node again.
    pub fn forget(&self, signer_id: &AccountId) {
        self.issued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(signer_id);
    }
}

fn next_nonce(issued: Option<u64>, chain_nonce: u64) -> u64 {
    issued.map_or(chain_nonce, |last| last.max(chain_nonce)) + 1
}

/// NEAR JSON-RPC ledger. Every transaction is signed with the process credential.
pub struct NearClient {
    rpc: JsonRpcClient,
    credential: Arc<Credential>,
    nonces: NonceCache,
}

impl NearClient {
    pub fn connect(
        rpc_url: &str,
        timeout_ms: u64,
        credential: Arc<Credential>,
    ) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| LedgerError::Http(e.to_string()))?;

        Ok(Self {
            rpc: JsonRpcClient::with(http).connect(rpc_url),
            credential,
            nonces: NonceCache::default(),
        })
    }

    async fn query(
        &self,
        block_reference: BlockReference,
        request: QueryRequest,
    ) -> Result<(QueryResponseKind, CryptoHash), LedgerError> {
        let response = self
            .rpc
            .call(methods::query::RpcQueryRequest {
                block_reference,
                request,
            })
            .await
            .map_err(|err| match err {
                JsonRpcError::ServerError(JsonRpcServerError::HandlerError(
                    RpcQueryError::UnknownAccount {
                        requested_account_id,
                        ..
                    },
                )) => LedgerError::AccountNotFound(requested_account_id.to_string()),
                other => rpc_error("query", other),
            })?;
        Ok((response.kind, response.block_hash))
    }

    async fn view(&self, request: QueryRequest) -> Result<QueryResponseKind, LedgerError> {
        let (kind, _) = self
            .query(BlockReference::Finality(Finality::Final), request)
            .await?;
        Ok(kind)
    }

    /// Sign `actions` as `signer_id`, submit, and wait for the final outcome.
    async fn submit(
        &self,
        operation: &'static str,
        signer_id: &str,
        receiver_id: &str,
        actions: Vec<Action>,
    ) -> Result<Value, LedgerError> {
        let signer = self.credential.signer(parse_account_id(signer_id)?);
        let receiver_id = parse_account_id(receiver_id)?;

        let (kind, block_hash) = self
            .query(
                BlockReference::latest(),
                QueryRequest::ViewAccessKey {
                    account_id: signer.account_id.clone(),
                    public_key: signer.public_key.clone(),
                },
            )
            .await?;
        let QueryResponseKind::AccessKey(access_key) = kind else {
            return Err(LedgerError::Rpc(format!(
                "{operation}: unexpected access key response"
            )));
        };

        let nonce = self.nonces.reserve(&signer.account_id, access_key.nonce);
        let tx = Transaction {
            signer_id: signer.account_id.clone(),
            public_key: signer.public_key.clone(),
            nonce,
            receiver_id,
            block_hash,
            actions,
        };

        let outcome = match self
            .rpc
            .call(methods::broadcast_tx_commit::RpcBroadcastTxCommitRequest {
                signed_transaction: tx.sign(&signer),
            })
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                if let Some(RpcTransactionError::InvalidTransaction {
                    context: InvalidTxError::InvalidNonce { tx_nonce, ak_nonce },
                }) = err.handler_error()
                {
                    warn!(operation, signer_id, tx_nonce, ak_nonce, "nonce rejected, resyncing");
                    self.nonces.forget(&signer.account_id);
                }
                return Err(rpc_error(operation, err));
            }
        };
        debug!(
            operation,
            signer_id,
            nonce,
            tx_hash = %outcome.transaction.hash,
            "transaction final"
        );

        match outcome.status {
            FinalExecutionStatus::SuccessValue(bytes) => Ok(decode_return_value(&bytes)),
            FinalExecutionStatus::Failure(failure) => Err(LedgerError::Rejected {
                operation,
                message: failure.to_string(),
            }),
            FinalExecutionStatus::NotStarted | FinalExecutionStatus::Started => {
                Err(LedgerError::Rejected {
                    operation,
                    message: format!("transaction {} did not complete", outcome.transaction.hash),
                })
            }
        }
    }
}

fn parse_account_id(raw: &str) -> Result<AccountId, LedgerError> {
    raw.parse().map_err(|e| LedgerError::InvalidAccountId(format!("{raw}: {e}")))
}

fn rpc_error<E: Display>(operation: &'static str, err: JsonRpcError<E>) -> LedgerError {
    match err {
        JsonRpcError::TransportError(e) => LedgerError::Http(format!("{operation}: {e}")),
        JsonRpcError::ServerError(e) => LedgerError::Rpc(format!("{operation}: {e}")),
    }
}

/// Empty means no return value; non-JSON bytes are kept as text.
fn decode_return_value(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn encode_args(args: &Value) -> Result<Vec<u8>, LedgerError> {
    serde_json::to_vec(args).map_err(|e| LedgerError::Serialization(e.to_string()))
}

#[async_trait]
impl LedgerClient for NearClient {
    async fn create_account(
        &self,
        payer_id: &str,
        new_id: &str,
        public_key: &str,
        initial_balance: u128,
    ) -> Result<(), LedgerError> {
        let public_key: PublicKey = public_key
            .parse()
            .map_err(|e| LedgerError::InvalidKey(format!("{public_key}: {e}")))?;
        let actions = vec![
            Action::CreateAccount(CreateAccountAction {}),
            Action::Transfer(TransferAction {
                deposit: initial_balance,
            }),
            Action::AddKey(AddKeyAction {
                public_key,
                access_key: AccessKey::full_access(),
            }),
        ];
        self.submit("create_account", payer_id, new_id, actions)
            .await
            .map(|_| ())
    }

    async fn delete_account(
        &self,
        account_id: &str,
        beneficiary_id: &str,
    ) -> Result<(), LedgerError> {
        let actions = vec![Action::DeleteAccount(DeleteAccountAction {
            beneficiary_id: parse_account_id(beneficiary_id)?,
        })];
        self.submit("delete_account", account_id, account_id, actions)
            .await
            .map(|_| ())
    }

    async fn deploy_contract(&self, account_id: &str, bytecode: &[u8]) -> Result<(), LedgerError> {
        let actions = vec![Action::DeployContract(DeployContractAction {
            code: bytecode.to_vec(),
        })];
        self.submit("deploy_contract", account_id, account_id, actions)
            .await
            .map(|_| ())
    }

    async fn view_function(
        &self,
        contract_id: &str,
        method: &str,
        args: Value,
    ) -> Result<Value, LedgerError> {
        let kind = self
            .view(QueryRequest::CallFunction {
                account_id: parse_account_id(contract_id)?,
                method_name: method.to_string(),
                args: FunctionArgs::from(encode_args(&args)?),
            })
            .await?;
        let QueryResponseKind::CallResult(result) = kind else {
            return Err(LedgerError::Rpc(format!(
                "{method}: unexpected view response"
            )));
        };
        if result.result.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&result.result)
            .map_err(|e| LedgerError::Serialization(format!("{method}: {e}")))
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
        let actions = vec![Action::FunctionCall(FunctionCallAction {
            method_name: method.to_string(),
            args: encode_args(&args)?,
            gas,
            deposit,
        })];
        self.submit("call_function", caller_id, contract_id, actions)
            .await
    }

    async fn view_account_balance(&self, account_id: &str) -> Result<u128, LedgerError> {
        let kind = self
            .view(QueryRequest::ViewAccount {
                account_id: parse_account_id(account_id)?,
            })
            .await?;
        match kind {
            QueryResponseKind::ViewAccount(view) => Ok(view.amount),
            _ => Err(LedgerError::Rpc(format!(
                "{account_id}: unexpected account response"
            ))),
        }
    }
}
