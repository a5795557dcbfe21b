// core.rs splits the ledger into storage, auditing and read-side queries.
pub mod chain;
pub mod query;
pub mod validation;

pub use chain::*;
pub use validation::*;
