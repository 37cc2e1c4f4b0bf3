use arc_swap::ArcSwap;
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::Result;
use crate::hash_ring::HashRing;
use crate::hasher::{Murmur3, RingHasher};

/// Lock-free readers over copy-on-write snapshots; writers take turns.
pub struct SharedHashRing<H = Murmur3> {
    current: ArcSwap<HashRing<H>>,
    writer: Mutex<()>,
}

impl Default for SharedHashRing<Murmur3> {
    fn default() -> Self {
        SharedHashRing::from_ring(HashRing::new())
    }
}

impl SharedHashRing<Murmur3> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: RingHasher + Clone> SharedHashRing<H> {
    pub fn from_ring(ring: HashRing<H>) -> Self {
        SharedHashRing {
            current: ArcSwap::from_pointee(ring),
            writer: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> Arc<HashRing<H>> {
        self.current.load_full()
    }

    /// Applies `change` to a copy of the ring and publishes the result.
    pub fn update<T>(&self, change: impl FnOnce(&mut HashRing<H>) -> T) -> T {
        let _guard = self.writer.lock();
        let mut next = HashRing::clone(&self.current.load());
        let out = change(&mut next);
        debug!(
            "Publishing ring: owners = {} len = {}",
            next.owner_count(),
            next.len()
        );
        self.current.store(Arc::new(next));
        out
    }

    pub fn set_vnode_count(&self, count: u32) -> Result<()> {
        self.update(|ring| ring.set_vnode_count(count))
    }

    pub fn add(&self, owner: &str) {
        self.update(|ring| ring.add(owner))
    }

    pub fn add_with_node_count(&self, owner: &str, count: u32) -> Result<()> {
        self.update(|ring| ring.add_with_node_count(owner, count))
    }

    pub fn remove(&self, owner: &str) -> bool {
        self.update(|ring| ring.remove(owner))
    }

    pub fn get(&self, key: impl AsRef<[u8]>) -> Result<String> {
        self.current.load().get(key).map(str::to_owned)
    }

    pub fn get2(&self, key: impl AsRef<[u8]>) -> Result<(String, String)> {
        self.current
            .load()
            .get2(key)
            .map(|(first, second)| (first.to_owned(), second.to_owned()))
    }

    pub fn get_n(&self, key: impl AsRef<[u8]>, n: usize) -> Result<Vec<String>> {
        self.current
            .load()
            .get_n(key, n)
            .map(|owners| owners.into_iter().map(str::to_owned).collect())
    }
}
