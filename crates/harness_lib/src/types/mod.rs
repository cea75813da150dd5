pub mod bet;
pub mod enums;
pub mod outcome;
pub mod stats;

pub use bet::*;
pub use enums::*;
pub use outcome::*;
pub use stats::*;
