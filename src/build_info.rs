// src/build_info.rs

//! Build metadata reported by `watchs version`.
//!
//! Built once in `main.rs` and passed down explicitly. Packagers can inject
//! `WATCHS_COMMIT` and `WATCHS_BUILD_DATE` at compile time.

use std::fmt;

/// Immutable build metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub date: &'static str,
}

impl BuildInfo {
    /// Metadata baked in by cargo and the optional packaging env vars.
    pub const fn from_env() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: match option_env!("WATCHS_COMMIT") {
                Some(c) => c,
                None => "none",
            },
            date: match option_env!("WATCHS_BUILD_DATE") {
                Some(d) => d,
                None => "unknown",
            },
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::from_env()
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "watchs {}, commit {}, built at {}",
            self.version, self.commit, self.date
        )
    }
}
