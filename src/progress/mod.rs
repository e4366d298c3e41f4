//! Progress reporting module
//!
//! Live feedback on the terminal while a sort is running.

mod reporter;

pub use reporter::*;
