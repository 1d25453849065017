//! File I/O for the save path.
//!
//! This module handles:
//! - Working out the final path and temp sibling for a save
//! - Writing the temp file and renaming it into place

mod atomic;
mod target;

pub use atomic::StagedWrite;
pub use target::{SaveTarget, reconcile_save_target};
