use murmurhash3::murmurhash3_x86_32 as mmh3;

/// Maps a byte sequence to a position on the 32-bit ring.
///
/// Implementations must be deterministic across processes and runs, otherwise
/// an owner removed after a restart would not find its own vnodes.
pub trait RingHasher {
    fn hash(&self, data: &[u8]) -> u32;
}

/// MurmurHash3 x86_32 with a fixed seed. The default hasher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Murmur3 {
    seed: u32,
}

impl Murmur3 {
    pub fn with_seed(seed: u32) -> Self {
        Murmur3 { seed }
    }
}

impl RingHasher for Murmur3 {
    fn hash(&self, data: &[u8]) -> u32 {
        mmh3(data, self.seed)
    }
}

/// 32-bit FNV-1a.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fnv1a;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

impl RingHasher for Fnv1a {
    fn hash(&self, data: &[u8]) -> u32 {
        let mut hash = FNV_OFFSET;
        for byte in data {
            hash ^= *byte as u32;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }
}

// `owner#index`, then `owner#index~attempt` once a position is taken. The
// suffix never contains `#`, so the last `#` always ends the owner label and
// no two (owner, index) pairs share an input.
pub(crate) fn vnode_input(owner: &str, index: u32, attempt: u32) -> Vec<u8> {
    let mut input = format!("{}#{}", owner, index);
    if attempt > 0 {
        input.push('~');
        input.push_str(&attempt.to_string());
    }
    input.into_bytes()
}
