use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::client::ledger::LedgerClient;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(String),
    #[error("faucet answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unparsable faucet response: {0}")]
    Parse(String),
    #[error("ledger funding failed: {0}")]
    Ledger(String),
}

/// What the faucet said about a funding request.
#[derive(Debug, Clone, PartialEq)]
pub struct FundingReceipt {
    pub http_status: u16,
    /// `status.SuccessValue` of the funding transaction, if present.
    pub success_value: Option<String>,
    /// `status.Failure` of the funding transaction, if present.
    pub failure: Option<Value>,
}

impl FundingReceipt {
    pub fn from_body(http_status: u16, body: &Value) -> Self {
        let status = body.get("status");
        Self {
            http_status,
            success_value: status
                .and_then(|s| s.get("SuccessValue"))
                .and_then(Value::as_str)
                .map(str::to_string),
            failure: status.and_then(|s| s.get("Failure")).cloned(),
        }
    }

    /// Funded only when the transaction reports an empty success value.
    pub fn is_funded(&self) -> bool {
        self.success_value.as_deref() == Some("")
    }
}

#[async_trait]
pub trait FaucetGateway: Send + Sync {
    async fn fund(
        &self,
        new_account_id: &str,
        new_account_public_key: &str,
    ) -> Result<FundingReceipt, TransportError>;
}

/// The testnet helper endpoint that creates and funds named accounts.
pub struct HelperFaucet {
    url: String,
    client: reqwest::Client,
}

impl HelperFaucet {
    pub fn new(url: impl Into<String>, timeout_ms: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl FaucetGateway for HelperFaucet {
    async fn fund(
        &self,
        new_account_id: &str,
        new_account_public_key: &str,
    ) -> Result<FundingReceipt, TransportError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&json!({
                "newAccountId": new_account_id,
                "newAccountPublicKey": new_account_public_key,
            }))
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let body: Value =
            serde_json::from_str(&text).map_err(|e| TransportError::Parse(e.to_string()))?;
        Ok(FundingReceipt::from_body(status.as_u16(), &body))
    }
}

/// Funds new accounts by creating them from a payer account on the ledger.
pub struct PayerFaucet<L: ?Sized> {
    ledger: Arc<L>,
    payer_id: String,
    funding_amount: u128,
}

impl<L: LedgerClient + ?Sized> PayerFaucet<L> {
    pub fn new(ledger: Arc<L>, payer_id: impl Into<String>, funding_amount: u128) -> Self {
        Self {
            ledger,
            payer_id: payer_id.into(),
            funding_amount,
        }
    }
}

#[async_trait]
impl<L: LedgerClient + ?Sized> FaucetGateway for PayerFaucet<L> {
    async fn fund(
        &self,
        new_account_id: &str,
        new_account_public_key: &str,
    ) -> Result<FundingReceipt, TransportError> {
        self.ledger
            .create_account(
                &self.payer_id,
                new_account_id,
                new_account_public_key,
                self.funding_amount,
            )
            .await
            .map_err(|e| TransportError::Ledger(e.to_string()))?;

        Ok(FundingReceipt {
            http_status: 200,
            success_value: Some(String::new()),
            failure: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{LedgerCall, MockLedger};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn helper_at(server: &MockServer) -> HelperFaucet {
        HelperFaucet::new(format!("{}/account", server.uri()), 5_000).expect("client")
    }

    #[test]
    fn empty_success_value_means_funded() {
        let receipt = FundingReceipt::from_body(200, &json!({ "status": { "SuccessValue": "" } }));
        assert!(receipt.is_funded());
    }

    #[test]
    fn failure_status_is_not_funded() {
        let receipt = FundingReceipt::from_body(
            200,
            &json!({ "status": { "Failure": { "ActionError": { "index": 0 } } } }),
        );
        assert!(!receipt.is_funded());
        assert!(receipt.failure.is_some());
    }

    #[test]
    fn other_shapes_are_not_funded() {
        for body in [
            json!({}),
            json!({ "status": {} }),
            json!({ "status": { "SuccessValue": "ZmFsc2U=" } }),
            json!({ "status": { "SuccessValue": null } }),
            json!({ "error": "" }),
        ] {
            assert!(!FundingReceipt::from_body(200, &body).is_funded(), "{body}");
        }
    }

    #[tokio::test]
    async fn payer_faucet_creates_the_account_with_the_funding_amount() {
        let ledger = Arc::new(MockLedger::new());
        let faucet = PayerFaucet::new(ledger.clone(), "payer.testnet", 42);
        let receipt = faucet.fund("1-new.testnet", "ed25519:key").await.expect("fund");
        assert!(receipt.is_funded());
        assert_eq!(
            ledger.calls(),
            vec![LedgerCall::CreateAccount {
                payer_id: "payer.testnet".into(),
                new_id: "1-new.testnet".into(),
                public_key: "ed25519:key".into(),
                initial_balance: 42,
            }]
        );
    }

    #[tokio::test]
    async fn payer_faucet_surfaces_ledger_failures() {
        let ledger = Arc::new(MockLedger::new());
        ledger.fail_account("1-new.testnet");
        let faucet = PayerFaucet::new(ledger, "payer.testnet", 42);
        assert!(matches!(
            faucet.fund("1-new.testnet", "ed25519:key").await,
            Err(TransportError::Ledger(_))
        ));
    }

    #[tokio::test]
    async fn helper_posts_the_new_account_and_reads_the_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/account"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "newAccountId": "1700000000000-owner.testnet",
                "newAccountPublicKey": "ed25519:key",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": { "SuccessValue": "" } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let receipt = helper_at(&server)
            .fund("1700000000000-owner.testnet", "ed25519:key")
            .await
            .expect("fund");
        assert_eq!(receipt.http_status, 200);
        assert!(receipt.is_funded());
    }

    #[tokio::test]
    async fn helper_error_status_keeps_the_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = helper_at(&server)
            .fund("1700000000000-owner.testnet", "ed25519:key")
            .await
            .expect_err("500");
        assert!(matches!(
            err,
            TransportError::Status { status: 500, ref body } if body == "rate limited"
        ));
    }

    #[tokio::test]
    async fn helper_non_json_success_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = helper_at(&server)
            .fund("1700000000000-owner.testnet", "ed25519:key")
            .await
            .expect_err("html");
        assert!(matches!(err, TransportError::Parse(_)));
    }
}
