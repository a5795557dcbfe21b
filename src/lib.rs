//! StarLedger - a private, hash-linked registry of star ownership claims
//!
//! # Architecture
//!
//! ## Ledger
//! - [`blockchain`] - Blocks, the chain store, validation and owner queries
//! - [`ownership`] - Challenge/response flow that gates every append
//! - [`registry`] - Owned facade wiring the store to its collaborators
//!
//! ## Collaborators
//! - [`crypto`] - Message signatures and verification (secp256k1)
//! - [`clock`] - Time sources
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Ledger
// ============================================================================
pub mod blockchain;
pub mod ownership;
pub mod registry;

// ============================================================================
// Collaborators
// ============================================================================
pub mod clock;
pub mod crypto;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;

pub use blockchain::{Block, ChainStore, Sha256Hash, StarClaim};
pub use error::{LedgerError, Result, ValidationError};
pub use registry::StarRegistry;
