//! glosstree: goal tree resolution and readiness evaluation for a
//! file-based language-learning gloss graph.
//!
//! One traversal (`core::recursion`) drives goal evaluation, tree rendering,
//! maintenance lists, and export, so every consumer sees the same tree.

pub mod cli;
pub mod core;
pub mod export;
pub mod journal;
pub mod maintenance;
