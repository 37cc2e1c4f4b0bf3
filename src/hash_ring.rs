use log::{debug, trace};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{validate_vnode_count, RingConfig};
use crate::error::Result;
use crate::hasher::{vnode_input, Murmur3, RingHasher};
use crate::ring::VnodeRing;
use crate::vnode::VirtualNode;

#[derive(Debug, Clone)]
pub struct HashRing<H = Murmur3> {
    hasher: H,
    pub(crate) ring: VnodeRing,
    // owner -> positions actually placed, in vnode index order
    owners: BTreeMap<Arc<str>, Vec<u32>>,
    vnode_count: u32,
}

impl Default for HashRing<Murmur3> {
    fn default() -> Self {
        HashRing::with_hasher(Murmur3::default())
    }
}

impl HashRing<Murmur3> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RingConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, Murmur3::default())
    }
}

impl<H: RingHasher> HashRing<H> {
    pub fn with_hasher(hasher: H) -> Self {
        HashRing {
            hasher,
            ring: VnodeRing::new(),
            owners: BTreeMap::new(),
            vnode_count: RingConfig::default().vnode_count,
        }
    }

    pub fn with_config_and_hasher(config: RingConfig, hasher: H) -> Result<Self> {
        config.validate()?;
        let mut ring = Self::with_hasher(hasher);
        ring.vnode_count = config.vnode_count;
        Ok(ring)
    }

    /// Sets the replication factor used by later calls to [`HashRing::add`].
    /// Owners already on the ring keep their vnodes.
    pub fn set_vnode_count(&mut self, count: u32) -> Result<()> {
        validate_vnode_count(count)?;
        self.vnode_count = count;
        Ok(())
    }

    pub fn vnode_count(&self) -> u32 {
        self.vnode_count
    }

    pub fn add(&mut self, owner: &str) {
        let count = self.vnode_count;
        self.place_owner(owner, count);
    }

    /// Adds `owner` with `count` vnodes, replacing any vnodes it already had.
    pub fn add_with_node_count(&mut self, owner: &str, count: u32) -> Result<()> {
        validate_vnode_count(count)?;
        self.place_owner(owner, count);
        Ok(())
    }

    /// Removes every vnode of `owner`. Returns `false` if it was not a member.
    pub fn remove(&mut self, owner: &str) -> bool {
        let Some(positions) = self.owners.remove(owner) else {
            return false;
        };
        for hash in &positions {
            let removed = self.ring.remove_vnode(*hash);
            debug_assert!(
                removed.as_ref().map(VirtualNode::owner) == Some(owner),
                "vnode at {} was not owned by {}",
                hash,
                owner
            );
        }
        debug!(
            "Owner removed: [{}] vnodes = {} len = {}",
            owner,
            positions.len(),
            self.ring.len()
        );
        true
    }

    pub fn contains_owner(&self, owner: &str) -> bool {
        self.owners.contains_key(owner)
    }

    /// Replication factor `owner` was added with.
    pub fn vnodes_of(&self, owner: &str) -> Option<u32> {
        self.owners.get(owner).map(|p| p.len() as u32)
    }

    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.owners.keys().map(|owner| owner.as_ref())
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn vnodes(&self) -> std::slice::Iter<'_, VirtualNode> {
        self.ring.iter()
    }

    pub(crate) fn hash_key(&self, key: &[u8]) -> u32 {
        self.hasher.hash(key)
    }

    fn place_owner(&mut self, owner: &str, count: u32) {
        self.remove(owner);

        let label: Arc<str> = Arc::from(owner);
        let mut positions = Vec::with_capacity(count as usize);
        for index in 0..count {
            let hash = self.free_position(owner, index);
            self.ring
                .insert_vnode(VirtualNode::new(hash, Arc::clone(&label)));
            positions.push(hash);
        }
        self.owners.insert(label, positions);
        debug!(
            "Owner added: [{}] vnodes = {} len = {}",
            owner,
            count,
            self.ring.len()
        );
    }

    // Rehashes with a bumped attempt number until the position is unused.
    fn free_position(&self, owner: &str, index: u32) -> u32 {
        let mut attempt = 0;
        loop {
            let hash = self.hasher.hash(&vnode_input(owner, index, attempt));
            if !self.ring.contains(hash) {
                return hash;
            }
            trace!(
                "vnode {}#{} collides at {} (attempt {})",
                owner,
                index,
                hash,
                attempt
            );
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_VNODE_COUNT;
    use crate::error::Error;
    use crate::log::init_test_logger;

    // Sends everything without a `~` suffix to one of four slots, so that
    // owners collide on almost every vnode.
    #[derive(Debug, Clone, Copy, Default)]
    struct CrowdedHasher;

    impl RingHasher for CrowdedHasher {
        fn hash(&self, data: &[u8]) -> u32 {
            match data.iter().position(|b| *b == b'~') {
                Some(at) => Murmur3::default().hash(&data[at..]) ^ (data.len() as u32),
                None => (data.len() as u32) % 4,
            }
        }
    }

    fn owners_of(ring: &HashRing<impl RingHasher>) -> Vec<&str> {
        ring.owners().collect()
    }

    fn count_owned(ring: &HashRing<impl RingHasher>, owner: &str) -> usize {
        ring.vnodes().filter(|v| v.owner() == owner).count()
    }

    #[test]
    fn add_places_default_vnode_count() {
        init_test_logger();
        let mut ring = HashRing::new();
        ring.add("localhost");
        assert_eq!(ring.vnode_count(), DEFAULT_VNODE_COUNT);
        assert_eq!(ring.len(), DEFAULT_VNODE_COUNT as usize);
        assert_eq!(count_owned(&ring, "localhost"), DEFAULT_VNODE_COUNT as usize);
        assert_eq!(ring.vnodes_of("localhost"), Some(DEFAULT_VNODE_COUNT));
    }

    #[test]
    fn set_vnode_count_applies_to_later_adds_only() {
        init_test_logger();
        let mut ring = HashRing::new();
        ring.set_vnode_count(10).unwrap();
        ring.add("a");
        ring.set_vnode_count(3).unwrap();
        ring.add("b");
        assert_eq!(count_owned(&ring, "a"), 10);
        assert_eq!(count_owned(&ring, "b"), 3);
        assert_eq!(ring.len(), 13);
    }

    #[test]
    fn zero_vnode_count_is_rejected() {
        init_test_logger();
        let mut ring = HashRing::new();
        assert_eq!(ring.set_vnode_count(0), Err(Error::InvalidVnodeCount(0)));
        assert_eq!(ring.vnode_count(), DEFAULT_VNODE_COUNT);
        assert_eq!(
            ring.add_with_node_count("a", 0),
            Err(Error::InvalidVnodeCount(0))
        );
        assert!(ring.is_empty());
        assert!(HashRing::with_config(RingConfig::with_vnode_count(0)).is_err());
    }

    #[test]
    fn add_with_node_count_overrides_default() {
        init_test_logger();
        let mut ring = HashRing::with_config(RingConfig::with_vnode_count(200)).unwrap();
        ring.add("s1");
        ring.add_with_node_count("s2", 100).unwrap();
        ring.add_with_node_count("s2b", 100).unwrap();
        assert_eq!(ring.vnodes_of("s1"), Some(200));
        assert_eq!(ring.vnodes_of("s2"), Some(100));
        assert_eq!(ring.vnodes_of("s2b"), Some(100));
        assert_eq!(ring.len(), 400);
    }

    #[test]
    fn re_adding_owner_replaces_its_vnodes() {
        init_test_logger();
        let mut ring = HashRing::new();
        ring.add_with_node_count("a", 50).unwrap();
        ring.add_with_node_count("b", 20).unwrap();
        ring.add_with_node_count("a", 5).unwrap();
        assert_eq!(count_owned(&ring, "a"), 5);
        assert_eq!(count_owned(&ring, "b"), 20);
        assert_eq!(ring.len(), 25);

        ring.add("b");
        ring.add("b");
        assert_eq!(count_owned(&ring, "b"), DEFAULT_VNODE_COUNT as usize);
        assert_eq!(ring.owner_count(), 2);
    }

    #[test]
    fn remove_deletes_all_vnodes_of_owner() {
        init_test_logger();
        let mut ring = HashRing::new();
        ring.add("server1");
        ring.add("server2");
        ring.add("server3");
        assert!(ring.remove("server2"));
        assert_eq!(count_owned(&ring, "server2"), 0);
        assert_eq!(ring.len(), 2 * DEFAULT_VNODE_COUNT as usize);
        assert_eq!(owners_of(&ring), vec!["server1", "server3"]);
        assert!(!ring.contains_owner("server2"));
    }

    #[test]
    fn remove_unknown_owner_is_noop() {
        init_test_logger();
        let mut ring = HashRing::new();
        ring.add("server1");
        assert!(!ring.remove("nobody"));
        assert_eq!(ring.len(), DEFAULT_VNODE_COUNT as usize);
        assert!(ring.remove("server1"));
        assert!(!ring.remove("server1"));
        assert!(ring.is_empty());
        assert_eq!(ring.owner_count(), 0);
    }

    #[test]
    fn collisions_are_resolved_without_duplicates() {
        init_test_logger();
        let mut ring = HashRing::with_hasher(CrowdedHasher);
        ring.add_with_node_count("a", 8).unwrap();
        ring.add_with_node_count("bb", 8).unwrap();
        ring.add_with_node_count("ccc", 8).unwrap();
        assert_eq!(ring.len(), 24);
        let hashes: Vec<u32> = ring.vnodes().map(VirtualNode::hash).collect();
        assert!(hashes.windows(2).all(|w| w[0] < w[1]));

        assert!(ring.remove("bb"));
        assert_eq!(ring.len(), 16);
        assert_eq!(count_owned(&ring, "a"), 8);
        assert_eq!(count_owned(&ring, "bb"), 0);
        assert_eq!(count_owned(&ring, "ccc"), 8);
    }

    #[test]
    fn placement_does_not_depend_on_add_order() {
        init_test_logger();
        for (first, second) in [("server1", "server11"), ("server1", "server12")] {
            let mut forward = HashRing::new();
            forward.add(first);
            forward.add(second);
            let mut backward = HashRing::new();
            backward.add(second);
            backward.add(first);
            assert!(
                forward.vnodes().eq(backward.vnodes()),
                "{} and {} placed differently depending on order",
                first,
                second
            );
            assert_eq!(count_owned(&forward, first), DEFAULT_VNODE_COUNT as usize);
            assert_eq!(count_owned(&forward, second), DEFAULT_VNODE_COUNT as usize);
        }
    }

    #[test]
    fn splitting_an_owner_only_moves_its_keys_and_the_new_owner() {
        init_test_logger();
        let mut whole = HashRing::with_config(RingConfig::with_vnode_count(200)).unwrap();
        for owner in ["s1", "s2", "s3", "s4"] {
            whole.add(owner);
        }
        let mut split = HashRing::new();
        split.add_with_node_count("s1", 200).unwrap();
        split.add_with_node_count("s2", 100).unwrap();
        split.add_with_node_count("s2b", 100).unwrap();
        split.add_with_node_count("s3", 200).unwrap();
        split.add_with_node_count("s4", 200).unwrap();

        let mut changes = 0;
        for i in 0..2000 {
            let key = format!("{}", i);
            let before = whole.get(&key).unwrap();
            let after = split.get(&key).unwrap();
            if before != after {
                changes += 1;
                assert!(
                    before == "s2" || after == "s2b",
                    "key {} moved from {} to {}",
                    key,
                    before,
                    after
                );
            }
        }
        // roughly the quarter held by s2's dropped vnodes plus what s2b takes
        assert!(changes < 2000 / 3, "{} mappings changed", changes);
    }

    #[test]
    fn owners_are_sorted() {
        init_test_logger();
        let mut ring = HashRing::new();
        ring.add_with_node_count("zeta", 1).unwrap();
        ring.add_with_node_count("alpha", 1).unwrap();
        ring.add_with_node_count("mu", 1).unwrap();
        assert_eq!(owners_of(&ring), vec!["alpha", "mu", "zeta"]);
    }

    #[test]
    fn placement_is_deterministic() {
        init_test_logger();
        let build = || {
            let mut ring = HashRing::new();
            for i in 0..5 {
                ring.add(&format!("server{}", i));
            }
            ring.remove("server2");
            ring.vnodes().cloned().collect::<Vec<_>>()
        };
        assert_eq!(build(), build());
    }
}
