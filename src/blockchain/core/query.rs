use super::chain::ChainStore;

impl ChainStore {
    /// Every star claimed by `address`, in chain order, or `None` if it owns none.
    ///
    /// Blocks whose body does not decode as a claim (genesis included) are skipped.
    pub fn stars_by_owner(&self, address: &str) -> Option<Vec<serde_json::Value>> {
        let stars: Vec<_> = self
            .blocks
            .read()
            .iter()
            .filter_map(|block| block.claim())
            .filter(|claim| claim.owner == address)
            .map(|claim| claim.star)
            .collect();

        if stars.is_empty() {
            None
        } else {
            Some(stars)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::blockchain::{ChainStore, StarClaim};
    use crate::clock::ManualClock;
    use serde_json::json;
    use std::sync::Arc;

    fn claim(owner: &str, star: serde_json::Value) -> StarClaim {
        StarClaim {
            owner: owner.to_string(),
            star,
        }
    }

    #[test]
    fn test_stars_by_owner_keeps_owners_apart() {
        let store = ChainStore::new(Arc::new(ManualClock::new(1_000)));
        store.initialize().unwrap();
        store.append_block(&claim("alice", json!({"name": "Vega"}))).unwrap();
        store.append_block(&claim("bob", json!({"name": "Sirius"}))).unwrap();
        store.append_block(&claim("alice", json!({"name": "Deneb"}))).unwrap();

        assert_eq!(
            store.stars_by_owner("alice"),
            Some(vec![json!({"name": "Vega"}), json!({"name": "Deneb"})])
        );
        assert_eq!(store.stars_by_owner("bob"), Some(vec![json!({"name": "Sirius"})]));
        assert_eq!(store.stars_by_owner("carol"), None);
    }

    #[test]
    fn test_undecodable_blocks_are_skipped() {
        let store = ChainStore::new(Arc::new(ManualClock::new(1_000)));
        store.initialize().unwrap();
        store.append_block(&json!({"name": "no owner"})).unwrap();
        store.append_block(&claim("alice", json!({"name": "Vega"}))).unwrap();

        assert_eq!(store.stars_by_owner("alice"), Some(vec![json!({"name": "Vega"})]));
    }

    #[test]
    fn test_genesis_only_chain_has_no_stars() {
        let store = ChainStore::new(Arc::new(ManualClock::new(1_000)));
        store.initialize().unwrap();
        assert_eq!(store.stars_by_owner("Genesis Block"), None);
        assert_eq!(store.stars_by_owner(""), None);
    }
}
