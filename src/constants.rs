//! Global constants used throughout the typman codebase.
//!
//! This module contains the endpoint, header, and bound values that the
//! lifecycle pipeline shares across modules. Defining them centrally makes
//! the externally-visible contract (asset names, redirect limits, listing
//! caps) discoverable in one place.

/// Release metadata endpoint for the managed tool.
///
/// Overridable per-run via `releases_url` in the config file, which exists
/// for mirrors and tests; everything else in the pipeline treats the release
/// endpoint as fixed.
pub const DEFAULT_RELEASES_URL: &str =
    "https://api.github.com/repos/miko-misa/typmark/releases/latest";

/// User-Agent sent with every outbound request.
///
/// GitHub rejects requests without an identifying agent.
pub const USER_AGENT: &str = concat!("typman/", env!("CARGO_PKG_VERSION"));

/// Maximum number of HTTP redirect hops the downloader will follow.
///
/// GitHub asset downloads typically bounce through one or two CDN
/// redirects; anything past this bound is treated as a broken chain.
pub const MAX_REDIRECTS: usize = 5;

/// Cap on file paths included in locator diagnostics.
///
/// Keeps "binary not found" errors readable when an archive ships a large
/// tree.
pub const LISTING_CAP: usize = 20;

/// Prefix for scratch directories created under the storage directory.
///
/// The full name is `tmp-{millis}`; the timestamp suffix keeps concurrent
/// installs from colliding on temporary paths.
pub const SCRATCH_PREFIX: &str = "tmp-";

/// Argument passed to the managed binary to query its version.
pub const VERSION_ARG: &str = "--version";

/// Base name of the managed tool, used by locator heuristics.
pub const TOOL_BASE_NAME: &str = "typmark";
