use crate::error::{Error, Result};

/// Number of vnodes given to an owner when no count is requested.
pub const DEFAULT_VNODE_COUNT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingConfig {
    /// Default replication factor applied by `HashRing::add`.
    pub vnode_count: u32,
}

impl Default for RingConfig {
    fn default() -> Self {
        RingConfig {
            vnode_count: DEFAULT_VNODE_COUNT,
        }
    }
}

impl RingConfig {
    pub fn with_vnode_count(vnode_count: u32) -> Self {
        RingConfig { vnode_count }
    }

    pub fn validate(&self) -> Result<()> {
        validate_vnode_count(self.vnode_count)
    }
}

pub(crate) fn validate_vnode_count(count: u32) -> Result<()> {
    if count == 0 {
        return Err(Error::InvalidVnodeCount(count));
    }
    Ok(())
}
