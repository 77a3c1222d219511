//! Journal: append-only mutation log and BLAKE3 content hashing.

pub mod eventlog;
pub mod hasher;
