use crate::clock::Clock;
use crate::error::{LedgerError, Result};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::info;

pub type Sha256Hash = [u8; 32];

/// Sentinel carried by the genesis block.
pub const GENESIS_DATA: &str = "Genesis Block";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisRecord {
    pub data: String,
}

/// Payload of every non-genesis block: who claims which star.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarClaim {
    pub owner: String,
    pub star: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub height: u64,
    pub timestamp: u64,
    pub previous_hash: Option<Sha256Hash>,
    /// Hex-encoded JSON of the payload.
    pub body: String,
    pub hash: Sha256Hash,
}

impl Block {
    fn new(height: u64, timestamp: u64, previous_hash: Option<Sha256Hash>, body: String) -> Self {
        let mut block = Block {
            height,
            timestamp,
            previous_hash,
            body,
            hash: [0u8; 32],
        };
        block.hash = block.compute_hash();
        block
    }

    /// Digest over every field except `hash`, in a fixed order.
    pub fn compute_hash(&self) -> Sha256Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.height.to_le_bytes());
        hasher.update(self.timestamp.to_le_bytes());
        match &self.previous_hash {
            Some(prev) => {
                hasher.update([1u8]);
                hasher.update(prev);
            }
            None => hasher.update([0u8]),
        }
        hasher.update(self.body.as_bytes());
        hasher.finalize().into()
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }

    /// Decodes the body into `T`.
    pub fn decode_body<T: DeserializeOwned>(&self) -> Result<T> {
        let bytes = hex::decode(&self.body)
            .map_err(|e| LedgerError::Serialization(format!("Block body is not hex: {}", e)))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// The star claim carried by this block, or `None` for genesis and undecodable bodies.
    pub fn claim(&self) -> Option<StarClaim> {
        if self.is_genesis() {
            return None;
        }
        self.decode_body().ok()
    }
}

fn encode_body<T: Serialize + ?Sized>(payload: &T) -> Result<String> {
    let json = serde_json::to_vec(payload)?;
    Ok(hex::encode(json))
}

/// Append-only, in-memory block store.
///
/// All writes go through a single write lock so that height assignment and
/// previous-hash capture happen as one unit. Readers take the read lock and
/// get owned copies back, so nothing outside the store ever sees a block that
/// is half appended.
pub struct ChainStore {
    pub(crate) blocks: RwLock<Vec<Block>>,
    clock: Arc<dyn Clock>,
}

impl ChainStore {
    /// Creates an empty store. Call [`ChainStore::initialize`] before appending.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            blocks: RwLock::new(Vec::new()),
            clock,
        }
    }

    /// Inserts the genesis block if the chain is empty and returns it.
    /// Calling it again is a no-op.
    pub fn initialize(&self) -> Result<Block> {
        let mut blocks = self.blocks.write();
        if let Some(genesis) = blocks.first() {
            return Ok(genesis.clone());
        }

        let body = encode_body(&GenesisRecord {
            data: GENESIS_DATA.to_string(),
        })?;
        let genesis = Block::new(0, self.clock.now(), None, body);
        info!("Created genesis block {}", genesis.hash_hex());
        blocks.push(genesis.clone());
        Ok(genesis)
    }

    /// Appends a block carrying `payload` on top of the current tip.
    pub fn append_block<T: Serialize + ?Sized>(&self, payload: &T) -> Result<Block> {
        let body = encode_body(payload)?;

        let mut blocks = self.blocks.write();
        let last = blocks.last().ok_or(LedgerError::Uninitialized)?;
        let block = Block::new(blocks.len() as u64, self.clock.now(), Some(last.hash), body);
        blocks.push(block.clone());
        drop(blocks);

        info!("Appended block {} at height {}", block.hash_hex(), block.height);
        Ok(block)
    }

    pub fn latest_block(&self) -> Option<Block> {
        self.blocks.read().last().cloned()
    }

    pub fn block_by_hash(&self, hash: &Sha256Hash) -> Option<Block> {
        self.blocks.read().iter().find(|b| &b.hash == hash).cloned()
    }

    /// Looks a block up by its hex-encoded hash. Invalid hex is treated as a miss.
    pub fn block_by_hash_hex(&self, hash_hex: &str) -> Option<Block> {
        let mut hash = [0u8; 32];
        hex::decode_to_slice(hash_hex, &mut hash).ok()?;
        self.block_by_hash(&hash)
    }

    pub fn block_by_height(&self, height: u64) -> Option<Block> {
        let index = usize::try_from(height).ok()?;
        self.blocks.read().get(index).cloned()
    }

    /// Height of the tip, or `None` before genesis exists.
    pub fn height(&self) -> Option<u64> {
        let len = self.blocks.read().len();
        len.checked_sub(1).map(|h| h as u64)
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }

    /// An owned copy of the whole chain.
    pub fn blocks(&self) -> Vec<Block> {
        self.blocks.read().clone()
    }
}
