pub mod client;
pub mod types;
pub mod units;
pub mod wallet;
pub mod wheel;
