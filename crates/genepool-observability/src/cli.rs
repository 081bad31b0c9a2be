// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-genepool-storage`, `--debug-genepool-serialization`,
//! etc. to raise individual crates to debug level.

use std::collections::HashMap;
use std::env;

use crate::KNOWN_CRATES;

/// Environment variable listing crates to debug
pub const DEBUG_ENV: &str = "GENEPOOL_DEBUG";

/// Parse debug flags from command-line arguments
///
/// # Example
/// ```rust
/// use genepool_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-genepool-storage".to_string()]);
/// assert!(flags.is_enabled("genepool-storage"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrateDebugFlags {
    pub enabled_crates: HashMap<String, bool>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}` pattern.
    /// Also supports `--debug-all` to enable all crates.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();

        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
                continue;
            }

            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }

        flags
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string(), true);
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.get(crate_name).copied().unwrap_or(false)
    }

    /// Get all enabled crates, sorted
    pub fn enabled_crates(&self) -> Vec<&String> {
        let mut crates: Vec<&String> = self
            .enabled_crates
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(name, _)| name)
            .collect();
        crates.sort();
        crates
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        self.enabled_crates.values().any(|enabled| *enabled)
    }

    /// Get log level filter for a crate
    ///
    /// Returns `tracing::Level::DEBUG` if enabled, `tracing::Level::INFO` otherwise.
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Create a tracing filter from debug flags with `info` for everything else
    pub fn to_filter_string(&self) -> String {
        self.to_filter_string_with_default("info")
    }

    /// Create a tracing filter from debug flags
    ///
    /// Format: `genepool_storage=debug,genepool_serialization=debug,warn`.
    /// Crate names are turned into module targets (`-` becomes `_`).
    pub fn to_filter_string_with_default(&self, default_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates()
            .into_iter()
            .map(|crate_name| format!("{}=debug", crate_name.replace('-', "_")))
            .collect();
        filters.push(default_level.to_lowercase());
        filters.join(",")
    }
}

/// Helper function to parse debug flags from environment
///
/// Checks both command-line arguments and the `GENEPOOL_DEBUG` environment variable.
/// Environment variable format: comma-separated crate names, e.g., "genepool-storage,genepool-config"
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(env_var) = env::var(DEBUG_ENV) {
        apply_debug_list(&mut flags, &env_var);
    }
    flags
}

fn apply_debug_list(flags: &mut CrateDebugFlags, list: &str) {
    if list.trim() == "all" {
        flags.enable_all();
        return;
    }
    for crate_name in list.split(',') {
        let crate_name = crate_name.trim();
        if !crate_name.is_empty() {
            flags.enable(crate_name);
        }
    }
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  {}={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  {}=all                               Enable debug for all crates

Examples:
  --debug-genepool-storage
  --debug-genepool-storage --debug-genepool-serialization
  {}=genepool-storage,genepool-serialization
"#,
        KNOWN_CRATES.join(", "),
        DEBUG_ENV,
        DEBUG_ENV,
        DEBUG_ENV
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-genepool-storage".to_string()]);
        assert!(flags.is_enabled("genepool-storage"));
        assert!(!flags.is_enabled("genepool-serialization"));
    }

    #[test]
    fn test_multiple_crate_flags() {
        let flags = CrateDebugFlags::from_args(vec![
            "genepool-tool".to_string(),
            "--debug-genepool-storage".to_string(),
            "--debug-genepool-serialization".to_string(),
        ]);
        assert!(flags.is_enabled("genepool-storage"));
        assert!(flags.is_enabled("genepool-serialization"));
        assert!(!flags.is_enabled("genepool-config"));
        assert_eq!(flags.enabled_crates().len(), 2);
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_filter_string() {
        let flags = CrateDebugFlags::default();
        assert_eq!(flags.to_filter_string(), "info");

        let flags = CrateDebugFlags::from_args(vec![
            "--debug-genepool-storage".to_string(),
            "--debug-genepool".to_string(),
        ]);
        assert_eq!(
            flags.to_filter_string_with_default("WARN"),
            "genepool=debug,genepool_storage=debug,warn"
        );
    }

    #[test]
    fn test_log_level() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-genepool-config".to_string()]);
        assert_eq!(flags.log_level("genepool-config"), tracing::Level::DEBUG);
        assert_eq!(flags.log_level("genepool-storage"), tracing::Level::INFO);
    }

    #[test]
    fn test_debug_list() {
        let mut flags = CrateDebugFlags::default();
        apply_debug_list(&mut flags, " genepool-storage , ,genepool-config");
        assert_eq!(flags.enabled_crates().len(), 2);

        let mut flags = CrateDebugFlags::default();
        apply_debug_list(&mut flags, "all");
        assert_eq!(flags.enabled_crates().len(), KNOWN_CRATES.len());
        assert!(debug_flags_help().contains(DEBUG_ENV));
    }
}
