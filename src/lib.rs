pub mod config;
pub mod error;
pub mod hash_ring;
pub mod hasher;
pub mod log;
mod lookup;
pub mod ring;
pub mod shared;
pub mod vnode;

pub use config::{RingConfig, DEFAULT_VNODE_COUNT};
pub use error::{Error, Result};
pub use hash_ring::HashRing;
pub use hasher::{Fnv1a, Murmur3, RingHasher};
pub use shared::SharedHashRing;
pub use vnode::VirtualNode;
