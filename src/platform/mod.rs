//! Platform resolution: maps the host OS/architecture to the published
//! release-asset naming scheme.
//!
//! The mapping is a data table rather than scattered conditionals so that
//! supporting a new platform is a one-line change. Resolution is explicit
//! about failure: an unknown platform is an error, never a silent fallback
//! to a nearby target.

use crate::core::TypmanError;

/// What the current platform expects locally and remotely.
///
/// `binary_name` is the executable's file name inside the managed storage
/// directory (and the exact-match key when searching extracted archives).
/// `asset_suffix` is matched as a substring against release asset names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformTarget {
    /// Local executable file name (`.exe` on Windows, bare elsewhere)
    pub binary_name: &'static str,
    /// Trailing portion of the release asset name published for this platform
    pub asset_suffix: &'static str,
}

/// One row of the support table.
///
/// `arch: None` matches any architecture; rows are consulted in order, so
/// arch-specific rows must precede their OS's catch-all row.
struct TargetRule {
    os: &'static str,
    arch: Option<&'static str>,
    target: PlatformTarget,
}

const TARGET_RULES: &[TargetRule] = &[
    TargetRule {
        os: "windows",
        arch: None,
        target: PlatformTarget {
            binary_name: "typmark-cli.exe",
            asset_suffix: "x86_64-pc-windows-msvc.zip",
        },
    },
    TargetRule {
        os: "macos",
        arch: Some("aarch64"),
        target: PlatformTarget {
            binary_name: "typmark-cli",
            asset_suffix: "aarch64-apple-darwin.tar.gz",
        },
    },
    TargetRule {
        os: "macos",
        arch: None,
        target: PlatformTarget {
            binary_name: "typmark-cli",
            asset_suffix: "x86_64-apple-darwin.tar.gz",
        },
    },
    TargetRule {
        os: "linux",
        arch: None,
        target: PlatformTarget {
            binary_name: "typmark-cli",
            asset_suffix: "x86_64-unknown-linux-gnu.tar.gz",
        },
    },
];

/// Resolve the target for the host platform.
///
/// # Errors
///
/// Returns [`TypmanError::UnsupportedPlatform`] when no published asset
/// exists for the host OS/architecture.
///
/// # Examples
///
/// ```rust
/// let target = typman::platform::resolve().unwrap();
/// assert!(target.binary_name.starts_with("typmark-cli"));
/// ```
pub fn resolve() -> Result<PlatformTarget, TypmanError> {
    resolve_for(std::env::consts::OS, std::env::consts::ARCH).ok_or_else(|| {
        TypmanError::UnsupportedPlatform {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    })
}

/// Pure lookup against the support table. First matching row wins.
#[must_use]
pub fn resolve_for(os: &str, arch: &str) -> Option<PlatformTarget> {
    TARGET_RULES
        .iter()
        .find(|rule| rule.os == os && rule.arch.is_none_or(|a| a == arch))
        .map(|rule| rule.target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN_SUFFIXES: &[&str] = &[
        "x86_64-pc-windows-msvc.zip",
        "aarch64-apple-darwin.tar.gz",
        "x86_64-apple-darwin.tar.gz",
        "x86_64-unknown-linux-gnu.tar.gz",
    ];

    #[test]
    fn test_supported_pairs_map_to_known_suffixes() {
        let pairs = [
            ("windows", "x86_64"),
            ("windows", "aarch64"),
            ("macos", "aarch64"),
            ("macos", "x86_64"),
            ("linux", "x86_64"),
            ("linux", "aarch64"),
        ];
        for (os, arch) in pairs {
            let target = resolve_for(os, arch)
                .unwrap_or_else(|| panic!("{os}/{arch} should be supported"));
            assert!(KNOWN_SUFFIXES.contains(&target.asset_suffix));
        }
    }

    #[test]
    fn test_macos_arm_gets_apple_silicon_asset() {
        let target = resolve_for("macos", "aarch64").unwrap();
        assert_eq!(target.asset_suffix, "aarch64-apple-darwin.tar.gz");

        let target = resolve_for("macos", "x86_64").unwrap();
        assert_eq!(target.asset_suffix, "x86_64-apple-darwin.tar.gz");
    }

    #[test]
    fn test_windows_binary_has_exe_extension() {
        let target = resolve_for("windows", "x86_64").unwrap();
        assert_eq!(target.binary_name, "typmark-cli.exe");

        let target = resolve_for("linux", "x86_64").unwrap();
        assert_eq!(target.binary_name, "typmark-cli");
    }

    #[test]
    fn test_unsupported_platforms_are_rejected() {
        assert!(resolve_for("freebsd", "x86_64").is_none());
        assert!(resolve_for("wasi", "wasm32").is_none());
        assert!(resolve_for("", "").is_none());
    }

    #[test]
    fn test_host_resolution_succeeds_on_tier1() {
        // CI runs on platforms in the table; resolution should never fail here.
        if matches!(std::env::consts::OS, "windows" | "macos" | "linux") {
            assert!(resolve().is_ok());
        }
    }
}
