use crate::vnode::VirtualNode;

#[derive(Debug, Clone, Default)]
pub struct VnodeRing {
    vnodes: Vec<VirtualNode>,
}

impl VnodeRing {
    pub fn new() -> Self {
        Self::default()
    }

    // panics on a duplicate hash; callers resolve collisions first
    pub fn insert_vnode(&mut self, vnode: VirtualNode) {
        let index = self.lower_bound(vnode.hash());
        if let Some(existing) = self.vnodes.get(index) {
            assert!(
                existing.hash() != vnode.hash(),
                "vnode {} collides with {}",
                vnode,
                existing
            );
        }
        self.vnodes.insert(index, vnode);
        debug_assert!(self.is_sorted());
    }

    pub fn remove_vnode(&mut self, hash: u32) -> Option<VirtualNode> {
        match self.vnodes.binary_search_by_key(&hash, VirtualNode::hash) {
            Ok(index) => Some(self.vnodes.remove(index)),
            Err(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.vnodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vnodes.is_empty()
    }

    pub fn contains(&self, hash: u32) -> bool {
        self.vnodes
            .binary_search_by_key(&hash, VirtualNode::hash)
            .is_ok()
    }

    pub fn owner_at(&self, hash: u32) -> Option<&str> {
        self.vnodes
            .binary_search_by_key(&hash, VirtualNode::hash)
            .ok()
            .map(|index| self.vnodes[index].owner())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VirtualNode> {
        self.vnodes.iter()
    }

    /// First vnode index at or after `hash`, wrapping to 0.
    pub fn position(&self, hash: u32) -> Option<usize> {
        if self.vnodes.is_empty() {
            return None;
        }
        let index = self.lower_bound(hash);
        if index == self.vnodes.len() {
            Some(0)
        } else {
            Some(index)
        }
    }

    pub fn walk_from(&self, start: usize) -> impl Iterator<Item = &VirtualNode> {
        let start = start.min(self.vnodes.len());
        self.vnodes[start..].iter().chain(self.vnodes[..start].iter())
    }

    pub(crate) fn get(&self, index: usize) -> Option<&VirtualNode> {
        self.vnodes.get(index)
    }

    fn lower_bound(&self, hash: u32) -> usize {
        self.vnodes.partition_point(|v| v.hash() < hash)
    }

    fn is_sorted(&self) -> bool {
        self.vnodes.windows(2).all(|w| w[0].hash() < w[1].hash())
    }
}
