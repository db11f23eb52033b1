//! Configuration management for typman.
//!
//! A single global file drives everything:
//!
//! ```toml
//! # ~/.typman/config.toml
//! cli_path = "/usr/local/bin/typmark-cli"   # optional: bypass management
//! storage_dir = "~/.typman/bin"             # optional
//! releases_url = "https://api.github.com/repos/miko-misa/typmark/releases/latest"
//!
//! [update]
//! policy = "notify"                         # auto | notify | disabled
//! ```
//!
//! See [`global`] for the schema, load precedence, and path expansion rules.

pub mod global;

pub use global::{GlobalConfig, UpdateConfig, UpdatePolicy};
