//! The star registry: one explicitly owned chain plus the collaborators that guard it.

use crate::blockchain::{Block, ChainStore, Sha256Hash};
use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::crypto::{Secp256k1MessageVerifier, SignatureVerifier};
use crate::error::{Result, ValidationError};
use crate::ownership::{ChallengePolicy, OwnershipWorkflow};
use std::sync::Arc;
use tracing::{info, warn};

pub struct StarRegistry {
    store: ChainStore,
    verifier: Box<dyn SignatureVerifier>,
    clock: Arc<dyn Clock>,
    policy: ChallengePolicy,
    audit_on_append: bool,
}

impl StarRegistry {
    /// Builds a registry and writes its genesis block before returning.
    pub fn new(
        config: &LedgerConfig,
        verifier: Box<dyn SignatureVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let store = ChainStore::new(clock.clone());
        store.initialize()?;
        info!(
            "Star registry ready (tag = {}, window = {}s)",
            config.domain_tag, config.freshness_window_secs
        );

        Ok(Self {
            store,
            verifier,
            clock,
            policy: ChallengePolicy::from(config),
            audit_on_append: config.audit_on_append,
        })
    }

    /// A registry on the wall clock with the secp256k1 message verifier.
    pub fn with_defaults(config: &LedgerConfig) -> Result<Self> {
        Self::new(config, Box::new(Secp256k1MessageVerifier), Arc::new(SystemClock))
    }

    fn workflow(&self) -> OwnershipWorkflow<'_> {
        OwnershipWorkflow::new(&self.store, &*self.verifier, &*self.clock, &self.policy)
    }

    pub fn request_challenge(&self, address: &str) -> String {
        self.workflow().request_challenge(address)
    }

    pub fn submit_star(
        &self,
        address: &str,
        message: &str,
        signature: &str,
        star: serde_json::Value,
    ) -> Result<Block> {
        let block = self.workflow().submit_star(address, message, signature, star)?;

        if self.audit_on_append {
            for error in self.store.validate_chain() {
                warn!("Chain audit after block {}: {}", block.height, error);
            }
        }
        Ok(block)
    }

    pub fn block_by_hash(&self, hash: &Sha256Hash) -> Option<Block> {
        self.store.block_by_hash(hash)
    }

    pub fn block_by_hash_hex(&self, hash_hex: &str) -> Option<Block> {
        self.store.block_by_hash_hex(hash_hex)
    }

    pub fn block_by_height(&self, height: u64) -> Option<Block> {
        self.store.block_by_height(height)
    }

    pub fn stars_by_owner(&self, address: &str) -> Option<Vec<serde_json::Value>> {
        self.store.stars_by_owner(address)
    }

    pub fn validate_chain(&self) -> Vec<ValidationError> {
        self.store.validate_chain()
    }

    /// Height of the tip. Genesis always exists, so this starts at 0.
    pub fn height(&self) -> u64 {
        self.store.height().unwrap_or(0)
    }

    pub fn store(&self) -> &ChainStore {
        &self.store
    }

    pub fn policy(&self) -> &ChallengePolicy {
        &self.policy
    }
}
