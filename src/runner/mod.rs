pub mod executor;
pub mod reporter;
pub mod types;

pub use executor::Runner;
pub use reporter::Reporter;
pub use types::{Comparison, Outcome, RunRecord, RunSummary};
