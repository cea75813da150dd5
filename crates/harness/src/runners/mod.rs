pub mod builders;
pub mod deposit;
pub mod orchestrator;
pub mod provision;
pub mod rotator;
pub mod stats;
