//! Consistent Hashing Module
//!
//! Maps keys onto peers so that every node, given the same peer list, agrees on
//! which peer owns a key without talking to the others. Each peer is placed on
//! the ring many times ("virtual nodes") to even out the load.

pub mod consistent_hash;

pub use consistent_hash::{HashFn, HashRing};
