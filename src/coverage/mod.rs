//! Coverage module
//!
//! Provides:
//! - Line, branch and method statistics at every level of the hierarchy
//! - Threshold validation across modules

mod summary;
mod threshold;

pub use summary::*;
pub use threshold::*;
