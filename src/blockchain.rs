// Thin re-export module: implementation is in `blockchain/core.rs`, split into
// chain storage, validation and queries.

pub mod core;
pub use core::*;
