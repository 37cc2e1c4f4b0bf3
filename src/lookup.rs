use crate::error::{Error, Result};
use crate::hash_ring::HashRing;
use crate::hasher::RingHasher;

impl<H: RingHasher> HashRing<H> {
    pub fn get(&self, key: impl AsRef<[u8]>) -> Result<&str> {
        self.get_by_hash(self.hash_key(key.as_ref()))
    }

    pub fn get_by_hash(&self, hash: u32) -> Result<&str> {
        self.ring
            .position(hash)
            .and_then(|index| self.ring.get(index))
            .map(|vnode| vnode.owner())
            .ok_or(Error::EmptyRing)
    }

    /// The owner of `key` and the next distinct owner clockwise from it.
    pub fn get2(&self, key: impl AsRef<[u8]>) -> Result<(&str, &str)> {
        let start = self.start(key.as_ref())?;
        let mut walk = self.ring.walk_from(start).map(|v| v.owner());
        let first = walk.next().ok_or(Error::EmptyRing)?;
        let second = walk
            .find(|owner| *owner != first)
            .ok_or(Error::NotEnoughMembers)?;
        Ok((first, second))
    }

    /// The first `n` distinct owners clockwise from `key`, in walk order.
    pub fn get_n(&self, key: impl AsRef<[u8]>, n: usize) -> Result<Vec<&str>> {
        let start = self.start(key.as_ref())?;
        if n > self.owner_count() {
            return Err(Error::NotEnoughMembers);
        }

        let mut found: Vec<&str> = Vec::with_capacity(n);
        for vnode in self.ring.walk_from(start) {
            if found.len() == n {
                break;
            }
            // n is small in practice; a linear scan beats hashing here
            if !found.contains(&vnode.owner()) {
                found.push(vnode.owner());
            }
        }

        if found.len() < n {
            return Err(Error::NotEnoughMembers);
        }
        Ok(found)
    }

    fn start(&self, key: &[u8]) -> Result<usize> {
        self.ring
            .position(self.hash_key(key))
            .ok_or(Error::EmptyRing)
    }
}
