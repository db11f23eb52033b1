//! Shared utilities.
//!
//! # Modules
//!
//! - [`fs`] - Directory creation and cleanup helpers used around installs

pub mod fs;

pub use fs::{ensure_dir, remove_dir_if_exists};
