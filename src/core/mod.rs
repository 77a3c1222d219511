//! Core gloss graph logic: types, storage, classification, recursion,
//! evaluation, tree building, and relationship edits.

pub mod classifier;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod recursion;
pub mod relations;
pub mod slug;
pub mod store;
pub mod tree;
pub mod types;
