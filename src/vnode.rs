use std::fmt;
use std::sync::Arc;

/// One position on the ring, owned by a single label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualNode {
    hash: u32,
    owner: Arc<str>,
}

impl VirtualNode {
    pub fn new(hash: u32, owner: impl Into<Arc<str>>) -> Self {
        VirtualNode {
            hash,
            owner: owner.into(),
        }
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }
}

impl fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.owner, self.hash)
    }
}
