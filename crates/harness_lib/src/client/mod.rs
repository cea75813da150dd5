pub mod faucet;
pub mod ledger;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod near;

pub use faucet::{FaucetGateway, FundingReceipt, HelperFaucet, PayerFaucet, TransportError};
pub use ledger::{LedgerClient, LedgerError};
