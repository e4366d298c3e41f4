//! Core sort engine module
//!
//! Provides the sort orchestration and the worker pool that copies files
//! into their extension folders.

mod scheduler;
mod sorter;

pub use scheduler::*;
pub use sorter::*;
