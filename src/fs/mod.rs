//! File system operations module
//!
//! Extension classification, subfolder creation, single-file copies and
//! traversal of the source tree.

mod classify;
mod operations;
mod scanner;

pub use classify::*;
pub use operations::*;
pub use scanner::*;
