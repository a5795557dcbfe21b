//! Challenge/response flow that gates every write to the chain.
//!
//! A claimant asks for a challenge (`address:timestamp:tag`), signs it with the
//! key behind `address` and submits it together with the star. The submission
//! is accepted only while the challenge is fresh and the signature checks out;
//! nothing is kept between attempts, the challenge text carries all the state.

use crate::blockchain::{Block, ChainStore, StarClaim};
use crate::clock::Clock;
use crate::config::LedgerConfig;
use crate::crypto::SignatureVerifier;
use crate::error::{LedgerError, Result};
use std::fmt;
use tracing::{debug, warn};

pub const DEFAULT_DOMAIN_TAG: &str = "starRegistry";
/// Five minutes, in the same seconds unit as every ledger timestamp.
pub const DEFAULT_FRESHNESS_WINDOW_SECS: u64 = 5 * 60;

/// A parsed `address:timestamp:tag` challenge message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub address: String,
    pub issued_at: u64,
    pub tag: String,
}

impl Challenge {
    pub fn parse(message: &str) -> Result<Self> {
        let parts: Vec<&str> = message.split(':').collect();
        if parts.len() != 3 {
            return Err(LedgerError::MalformedChallenge(format!(
                "expected 3 colon-separated fields, got {}",
                parts.len()
            )));
        }

        let issued_at = parts[1].parse::<u64>().map_err(|e| {
            LedgerError::MalformedChallenge(format!("bad timestamp '{}': {}", parts[1], e))
        })?;

        Ok(Challenge {
            address: parts[0].to_string(),
            issued_at,
            tag: parts[2].to_string(),
        })
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.address, self.issued_at, self.tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengePolicy {
    pub domain_tag: String,
    pub freshness_window_secs: u64,
}

impl Default for ChallengePolicy {
    fn default() -> Self {
        Self {
            domain_tag: DEFAULT_DOMAIN_TAG.to_string(),
            freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
        }
    }
}

impl From<&LedgerConfig> for ChallengePolicy {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            domain_tag: config.domain_tag.clone(),
            freshness_window_secs: config.freshness_window_secs,
        }
    }
}

pub struct OwnershipWorkflow<'a> {
    store: &'a ChainStore,
    verifier: &'a dyn SignatureVerifier,
    clock: &'a dyn Clock,
    policy: &'a ChallengePolicy,
}

impl<'a> OwnershipWorkflow<'a> {
    pub fn new(
        store: &'a ChainStore,
        verifier: &'a dyn SignatureVerifier,
        clock: &'a dyn Clock,
        policy: &'a ChallengePolicy,
    ) -> Self {
        Self {
            store,
            verifier,
            clock,
            policy,
        }
    }

    /// The message `address` has to sign before it may submit a star.
    pub fn request_challenge(&self, address: &str) -> String {
        let challenge = Challenge {
            address: address.to_string(),
            issued_at: self.clock.now(),
            tag: self.policy.domain_tag.clone(),
        };
        debug!("Issued challenge for {} at {}", address, challenge.issued_at);
        challenge.to_string()
    }

    /// Verifies a signed challenge and, if it holds, appends the star to the chain.
    ///
    /// The first failing check aborts the submission; the chain is only touched
    /// once every check has passed.
    pub fn submit_star(
        &self,
        address: &str,
        message: &str,
        signature: &str,
        star: serde_json::Value,
    ) -> Result<Block> {
        self.check(address, message, signature).map_err(|e| {
            warn!("Rejected star submission from {}: {}", address, e);
            e
        })?;

        self.store.append_block(&StarClaim {
            owner: address.to_string(),
            star,
        })
    }

    fn check(&self, address: &str, message: &str, signature: &str) -> Result<()> {
        let challenge = Challenge::parse(message)?;
        if challenge.address != address {
            return Err(LedgerError::MalformedChallenge(format!(
                "challenge was issued to {}, not {}",
                challenge.address, address
            )));
        }
        if challenge.tag != self.policy.domain_tag {
            return Err(LedgerError::MalformedChallenge(format!(
                "unexpected tag '{}'",
                challenge.tag
            )));
        }

        let now = self.clock.now();
        let elapsed = now.checked_sub(challenge.issued_at).ok_or_else(|| {
            LedgerError::MalformedChallenge(format!(
                "issued at {} which is after now ({})",
                challenge.issued_at, now
            ))
        })?;
        if elapsed >= self.policy.freshness_window_secs {
            return Err(LedgerError::ExpiredChallenge {
                elapsed,
                window: self.policy.freshness_window_secs,
            });
        }

        match self.verifier.verify(message, address, signature) {
            Ok(true) => Ok(()),
            Ok(false) => Err(LedgerError::InvalidSignature(
                "signature was not made by this address".to_string(),
            )),
            Err(e) => Err(LedgerError::InvalidSignature(e.to_string())),
        }
    }
}
