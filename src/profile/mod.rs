//! Shell profile environment blocks.
//!
//! Exports are written to the profile as a block delimited by marker
//! comments. The opening marker line identifies the block, so appending
//! the same block twice leaves the file unchanged.

pub mod block;
pub mod writer;

pub use block::EnvBlock;
pub use writer::{EnvWriter, WriteOutcome};
