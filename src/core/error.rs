//! Error handling for typman
//!
//! This module provides the error types and user-friendly error reporting for
//! the binary lifecycle pipeline. The error system is designed around two core
//! principles:
//! 1. **Strongly-typed errors** for precise handling in code
//! 2. **Readable messages** with concrete suggestions for CLI users
//!
//! # Architecture
//!
//! Two types carry the weight:
//! - [`TypmanError`] - Enumerated error types for every failure stage in the
//!   install/update pipeline
//! - [`ErrorContext`] - Display wrapper carrying a suggestion and extra details
//!
//! # Error Categories
//!
//! Errors are organized by pipeline stage:
//! - **Resolution**: [`TypmanError::UnsupportedPlatform`], [`TypmanError::NoMatchingAsset`]
//! - **Network**: [`TypmanError::Network`], [`TypmanError::Remote`],
//!   [`TypmanError::MalformedResponse`], [`TypmanError::Download`]
//! - **Unpacking**: [`TypmanError::Extraction`], [`TypmanError::BinaryNotFound`],
//!   [`TypmanError::AmbiguousBinary`]
//! - **Placement**: [`TypmanError::Install`], [`TypmanError::PermissionDenied`]
//! - **Configuration**: [`TypmanError::ConfigError`]
//!
//! Common standard library errors convert automatically:
//! - [`std::io::Error`] → [`TypmanError::IoError`]
//! - [`toml::de::Error`] → [`TypmanError::TomlError`]
//!
//! Use [`user_friendly_error`] to convert any error into a displayable format
//! with contextual suggestions.
//!
//! # Examples
//!
//! ```rust,no_run
//! use typman::core::{TypmanError, user_friendly_error};
//!
//! fn resolve_platform() -> Result<(), TypmanError> {
//!     Err(TypmanError::UnsupportedPlatform {
//!         os: "freebsd".to_string(),
//!         arch: "x86_64".to_string(),
//!     })
//! }
//!
//! if let Err(e) = resolve_platform() {
//!     let ctx = user_friendly_error(anyhow::Error::from(e));
//!     ctx.display(); // Shows colored error with suggestions
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for typman operations
///
/// Each variant corresponds to a specific failure mode of the lifecycle
/// pipeline and carries the context needed to diagnose it: URLs, statuses,
/// captured tool output, or file listings.
///
/// A stage failure aborts the remaining pipeline stages for that invocation;
/// no variant here represents a partially-completed install, because partial
/// work only ever exists inside scratch space.
#[derive(Error, Debug)]
pub enum TypmanError {
    /// The host OS/architecture has no published release asset
    ///
    /// Resolution fails explicitly rather than guessing a nearby target.
    #[error("no release asset is published for this platform: {os}/{arch}")]
    UnsupportedPlatform {
        /// Host operating system as reported by the runtime
        os: String,
        /// Host CPU architecture as reported by the runtime
        arch: String,
    },

    /// The latest release exists but contains no asset for this platform
    #[error("release '{tag}' has no asset matching '{suffix}'")]
    NoMatchingAsset {
        /// Tag of the release that was inspected
        tag: String,
        /// Platform suffix that no asset name contained
        suffix: String,
    },

    /// Transport-level failure while talking to a remote endpoint
    #[error("network error during {operation}")]
    Network {
        /// What was being fetched (e.g., "release metadata fetch")
        operation: String,
        /// The underlying transport error
        reason: String,
    },

    /// The remote endpoint answered with a non-success status
    #[error("remote endpoint returned HTTP {status} for {url}")]
    Remote {
        /// HTTP status code received
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// Release metadata could not be decoded
    #[error("malformed release metadata: {reason}")]
    MalformedResponse {
        /// Decoder diagnostic
        reason: String,
    },

    /// Asset download failed: bad status, broken redirect chain, or write error
    #[error("download failed for {url}: {reason}")]
    Download {
        /// The URL being downloaded (the original, pre-redirect one)
        url: String,
        /// Why the download failed
        reason: String,
    },

    /// Archive could not be unpacked
    #[error("failed to extract archive '{archive}': {reason}")]
    Extraction {
        /// File name of the archive that failed
        archive: String,
        /// Diagnostic from the decompression library
        reason: String,
    },

    /// No executable matching the expected name was found after extraction
    #[error("extracted binary '{expected}' not found. Files: {listing}")]
    BinaryNotFound {
        /// The executable name that was searched for
        expected: String,
        /// Truncated listing of the files that were examined
        listing: String,
    },

    /// Several plausible executables were found and none matched exactly
    #[error("multiple candidates for '{expected}' found: {candidates}")]
    AmbiguousBinary {
        /// The executable name that was searched for
        expected: String,
        /// The candidate paths, comma separated
        candidates: String,
    },

    /// Binary could not be placed at its destination
    ///
    /// Raised when the rename fast path and the copy+delete fallback both
    /// fail.
    #[error("install failed during {operation} of {path}: {reason}")]
    Install {
        /// The placement step that failed (e.g., "rename", "copy")
        operation: String,
        /// The path involved
        path: String,
        /// The underlying filesystem error
        reason: String,
    },

    /// Permission bits could not be set or a path is not writable
    #[error("permission denied: {operation}")]
    PermissionDenied {
        /// The operation that was denied
        operation: String,
        /// The path involved
        path: String,
    },

    /// Configuration file issues
    #[error("configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for TypmanError {
    fn clone(&self) -> Self {
        match self {
            Self::UnsupportedPlatform {
                os,
                arch,
            } => Self::UnsupportedPlatform {
                os: os.clone(),
                arch: arch.clone(),
            },
            Self::NoMatchingAsset {
                tag,
                suffix,
            } => Self::NoMatchingAsset {
                tag: tag.clone(),
                suffix: suffix.clone(),
            },
            Self::Network {
                operation,
                reason,
            } => Self::Network {
                operation: operation.clone(),
                reason: reason.clone(),
            },
            Self::Remote {
                status,
                url,
            } => Self::Remote {
                status: *status,
                url: url.clone(),
            },
            Self::MalformedResponse {
                reason,
            } => Self::MalformedResponse {
                reason: reason.clone(),
            },
            Self::Download {
                url,
                reason,
            } => Self::Download {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::Extraction {
                archive,
                reason,
            } => Self::Extraction {
                archive: archive.clone(),
                reason: reason.clone(),
            },
            Self::BinaryNotFound {
                expected,
                listing,
            } => Self::BinaryNotFound {
                expected: expected.clone(),
                listing: listing.clone(),
            },
            Self::AmbiguousBinary {
                expected,
                candidates,
            } => Self::AmbiguousBinary {
                expected: expected.clone(),
                candidates: candidates.clone(),
            },
            Self::Install {
                operation,
                path,
                reason,
            } => Self::Install {
                operation: operation.clone(),
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::PermissionDenied {
                operation,
                path,
            } => Self::PermissionDenied {
                operation: operation.clone(),
                path: path.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// User-facing wrapper around a [`TypmanError`]
///
/// Adds an optional suggestion (actionable next step, shown in green) and
/// optional details (background on why the error happened, shown in yellow).
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying typman error
    pub error: TypmanError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`TypmanError`]
    #[must_use]
    pub const fn new(error: TypmanError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// Error message in red and bold, details in yellow, suggestion in green.
    /// This is the primary way typman presents errors in the CLI.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Map any error into an [`ErrorContext`] with a suggestion matched to its cause
///
/// This is the main entry point for converting arbitrary errors into messages
/// for CLI display. It recognizes [`TypmanError`] variants and common standard
/// library errors, and attaches stage-appropriate suggestions.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(typman_error) = error.downcast_ref::<TypmanError>() {
        return create_error_context(typman_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(TypmanError::PermissionDenied {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion(
                    "Check ownership of the storage directory or run with elevated permissions",
                )
                .with_details(
                    "typman could not read or write a file it manages",
                );
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(TypmanError::Other {
                    message: format!("file not found: {io_error}"),
                })
                .with_suggestion("Check that the path exists and is spelled correctly")
                .with_details("A required file or directory could not be found");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(TypmanError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion(
            "Check the TOML syntax in your config file. Verify quotes, brackets, and key names",
        )
        .with_details("The configuration file could not be parsed");
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();

    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(TypmanError::Other {
        message,
    })
}

/// Map each [`TypmanError`] variant to an [`ErrorContext`] with tailored
/// suggestions. Used by [`user_friendly_error`].
fn create_error_context(error: TypmanError) -> ErrorContext {
    match &error {
        TypmanError::UnsupportedPlatform { os, arch } => {
            let (os, arch) = (os.clone(), arch.clone());
            ErrorContext::new(error)
                .with_suggestion(
                    "Build typmark-cli from source for your platform and point `cli_path` in \
                     ~/.typman/config.toml at it",
                )
                .with_details(format!(
                    "Prebuilt binaries cover Windows x86_64, macOS (Intel and Apple Silicon), \
                     and Linux x86_64; detected {os}/{arch}"
                ))
        }

        TypmanError::NoMatchingAsset { tag, suffix } => {
            let (tag, suffix) = (tag.clone(), suffix.clone());
            ErrorContext::new(error)
                .with_suggestion(
                    "Check the release page for your platform's archive, or set `cli_path` to a \
                     locally built binary",
                )
                .with_details(format!(
                    "No asset name in release '{tag}' contained '{suffix}'"
                ))
        }

        TypmanError::Network { operation, .. } => {
            let operation = operation.clone();
            ErrorContext::new(error)
                .with_suggestion("Check your internet connection and retry")
                .with_details(format!("The {operation} did not complete"))
        }

        TypmanError::Remote { status, .. } => {
            let suggestion = if *status == 403 {
                "GitHub may be rate limiting unauthenticated requests; wait a few minutes and retry"
            } else if *status == 404 {
                "The release endpoint was not found; verify `releases_url` if you configured a mirror"
            } else {
                "Retry later; if the failure persists, check the service's status page"
            };
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        TypmanError::MalformedResponse { .. } => ErrorContext::new(error)
            .with_suggestion("Retry; if the failure persists, verify `releases_url` points at a GitHub-compatible releases endpoint")
            .with_details("The response body was not the expected release JSON"),

        TypmanError::Download { .. } => ErrorContext::new(error)
            .with_suggestion("Check your internet connection and retry; the download is restarted from scratch on the next run"),

        TypmanError::Extraction { .. } => ErrorContext::new(error)
            .with_suggestion("Retry to re-download the archive; a truncated download produces corrupt archives")
            .with_details("The decompression library rejected the archive contents"),

        TypmanError::BinaryNotFound { .. } => ErrorContext::new(error)
            .with_suggestion(
                "The release archive may be packaged unexpectedly; inspect the listed files and \
                 report the layout upstream, or set `cli_path` manually",
            ),

        TypmanError::AmbiguousBinary { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Several files look like the binary; set `cli_path` to the one you want",
            )
            .with_details("typman does not pick between multiple candidates"),

        TypmanError::Install { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the storage directory is writable and has free space"),

        TypmanError::PermissionDenied { path, .. } => {
            let path = path.clone();
            ErrorContext::new(error)
                .with_suggestion("Check file ownership or run with elevated permissions")
                .with_details(format!("Could not modify {path}"))
        }

        TypmanError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Check ~/.typman/config.toml (or the file passed via --config / TYPMAN_CONFIG)"),

        _ => ErrorContext::new(error),
    }
}
