// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-neurosim-npu-step-engine` to raise a single
//! crate to debug level.

use std::collections::BTreeSet;
use std::env;

use crate::{crate_target, KNOWN_CRATES};

/// Environment variable listing crates to debug (comma-separated, or `all`)
pub const DEBUG_ENV: &str = "NEUROSIM_DEBUG";

/// Parsed per-crate debug flags
///
/// # Example
/// ```rust
/// use neurosim_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-neurosim-config".to_string()]);
/// assert!(flags.is_enabled("neurosim-config"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}`; `--debug-all`
    /// enables every known crate. Other arguments are ignored.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();
        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                if !crate_name.is_empty() {
                    flags.enabled_crates.insert(crate_name.to_string());
                }
            }
        }
        flags
    }

    /// Merge crate names from a `NEUROSIM_DEBUG`-style value
    pub fn merge_env_value(&mut self, value: &str) {
        if value.trim() == "all" {
            self.enable_all();
            return;
        }
        for crate_name in value.split(',') {
            let crate_name = crate_name.trim();
            if !crate_name.is_empty() {
                self.enabled_crates.insert(crate_name.to_string());
            }
        }
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enabled_crates.insert(crate_name.to_string());
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// Get log level for a crate
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Build an `EnvFilter` directive string
    ///
    /// Format: `neurosim_config=debug,info`, with `default_level` as the
    /// trailing directive.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .map(|crate_name| format!("{}=debug", crate_target(crate_name)))
            .collect();
        filters.push(default_level.to_string());
        filters.join(",")
    }
}

/// Parse debug flags from process arguments and `NEUROSIM_DEBUG`
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(value) = env::var(DEBUG_ENV) {
        flags.merge_env_value(&value);
    }
    flags
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
  {}=all                           Enable debug for all crates
"#,
        KNOWN_CRATES.join(", "),
        DEBUG_ENV,
        DEBUG_ENV
    )
}
