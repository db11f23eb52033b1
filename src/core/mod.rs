//! Core types shared across the crate
//!
//! This module hosts the error taxonomy and the user-friendly error reporting
//! layer. Every pipeline stage returns [`Result`] with a [`TypmanError`]
//! inside; the CLI converts failures to [`ErrorContext`] via
//! [`user_friendly_error`] before displaying them.

pub mod error;

pub use error::{ErrorContext, TypmanError, user_friendly_error};
