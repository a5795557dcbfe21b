use crate::error::ValidationError;

use super::chain::{Block, ChainStore};

impl Block {
    /// True when the stored hash still matches the block's contents.
    pub fn validate(&self) -> bool {
        self.compute_hash() == self.hash
    }
}

/// Audits a sequence of blocks, newest first, and reports every inconsistency.
///
/// Each block's self-hash is re-derived, and every block above genesis must
/// point at the stored hash of the block directly below it. Genesis must carry
/// no previous hash. An empty or single-block chain has nothing to link.
pub fn validate_blocks(blocks: &[Block]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (index, block) in blocks.iter().enumerate().rev() {
        let height = index as u64;

        if !block.validate() {
            errors.push(ValidationError::InvalidBlockHash(height));
        }

        let linked = match index.checked_sub(1) {
            Some(below) => block.previous_hash == Some(blocks[below].hash),
            None => block.previous_hash.is_none(),
        };
        if !linked {
            errors.push(ValidationError::BrokenPreviousLink(height));
        }
    }

    errors
}

impl ChainStore {
    /// Audits the whole chain under a read lock. An empty result means the chain is valid.
    pub fn validate_chain(&self) -> Vec<ValidationError> {
        validate_blocks(&self.blocks.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;
    use std::sync::Arc;

    fn chain_with(n: usize) -> ChainStore {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let store = ChainStore::new(clock.clone());
        store.initialize().unwrap();
        for i in 0..n {
            clock.advance(1);
            store.append_block(&json!({ "star": i })).unwrap();
        }
        store
    }

    #[test]
    fn test_valid_after_every_append() {
        let store = ChainStore::new(Arc::new(ManualClock::new(1_700_000_000)));
        assert!(store.validate_chain().is_empty());

        store.initialize().unwrap();
        assert!(store.validate_chain().is_empty());

        for i in 0..5 {
            store.append_block(&json!({ "star": i })).unwrap();
            assert!(store.validate_chain().is_empty());
        }
    }

    #[test]
    fn test_tampered_body_is_reported() {
        let store = chain_with(4);
        {
            let mut blocks = store.blocks.write();
            blocks[2].body = hex::encode(br#"{"owner":"mallory","star":{}}"#);
        }

        let errors = store.validate_chain();
        assert_eq!(errors, vec![ValidationError::InvalidBlockHash(2)]);
    }

    #[test]
    fn test_tampered_genesis_is_reported() {
        let store = chain_with(1);
        store.blocks.write()[0].timestamp += 1;

        assert_eq!(store.validate_chain(), vec![ValidationError::InvalidBlockHash(0)]);
    }

    #[test]
    fn test_rehashed_block_breaks_next_link() {
        let store = chain_with(3);
        {
            let mut blocks = store.blocks.write();
            blocks[1].body = hex::encode(br#"{"owner":"mallory","star":{}}"#);
            blocks[1].hash = blocks[1].compute_hash();
        }

        let errors = store.validate_chain();
        assert_eq!(errors, vec![ValidationError::BrokenPreviousLink(2)]);
        assert_eq!(errors[0].height(), 2);
    }

    #[test]
    fn test_collects_every_error() {
        let store = chain_with(5);
        {
            let mut blocks = store.blocks.write();
            blocks[4].body.clear();
            blocks[2].hash = [9u8; 32];
        }

        let errors = store.validate_chain();
        // Newest first: block 4 body, block 3's link to the forged hash, block 2 itself.
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidBlockHash(4),
                ValidationError::BrokenPreviousLink(3),
                ValidationError::InvalidBlockHash(2),
            ]
        );
    }

    #[test]
    fn test_genesis_with_previous_hash_is_broken() {
        let store = chain_with(0);
        let mut blocks = store.blocks();
        blocks[0].previous_hash = Some([1u8; 32]);
        blocks[0].hash = blocks[0].compute_hash();

        assert_eq!(validate_blocks(&blocks), vec![ValidationError::BrokenPreviousLink(0)]);
    }

    #[test]
    fn test_snapshot_mutation_leaves_store_untouched() {
        let store = chain_with(2);
        let mut snapshot = store.blocks();
        snapshot[1].timestamp = 0;

        assert_eq!(validate_blocks(&snapshot), vec![ValidationError::InvalidBlockHash(1)]);
        assert!(store.validate_chain().is_empty());
    }
}
