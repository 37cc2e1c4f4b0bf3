use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("the ring has no members")]
    EmptyRing,

    #[error("not enough distinct members in the ring")]
    NotEnoughMembers,

    #[error("vnode count must be at least 1, got {0}")]
    InvalidVnodeCount(u32),
}

pub type Result<T> = std::result::Result<T, Error>;
