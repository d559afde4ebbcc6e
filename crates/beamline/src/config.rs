//! Configuration types for lattice conversion.
//!
//! This module provides configuration structures that control how lattices
//! are exported and transformed. All types implement [`serde::Deserialize`]
//! for loading from external sources; every field has a default, so a
//! partial file only overrides what it names.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`ExportConfig`] - Dialect-specific output settings.
//! - [`SplitConfig`] - Naming and tolerance for dipole splitting.
//! - [`DriftConfig`] - Naming of inserted drifts.
//!
//! # Example
//!
//! ```
//! # use beamline::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.export().tracy_integration_steps(), 10);
//! assert_eq!(config.drift().prefix(), "D");
//! ```

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Export configuration section.
    #[serde(default)]
    export: ExportConfig,

    /// Dipole splitting configuration section.
    #[serde(default)]
    split: SplitConfig,

    /// Drift insertion configuration section.
    #[serde(default)]
    drift: DriftConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(export: ExportConfig, split: SplitConfig, drift: DriftConfig) -> Self {
        Self {
            export,
            split,
            drift,
        }
    }

    /// Returns the export configuration.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }

    /// Returns the dipole splitting configuration.
    pub fn split(&self) -> &SplitConfig {
        &self.split
    }

    /// Returns the drift insertion configuration.
    pub fn drift(&self) -> &DriftConfig {
        &self.drift
    }
}

/// Output settings for the dialects that need them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Integration steps (`N`) written on Tracy magnets.
    tracy_integration_steps: u32,

    /// Column at which the Tracy ring line is wrapped.
    tracy_line_width: usize,
}

impl ExportConfig {
    pub fn new(tracy_integration_steps: u32, tracy_line_width: usize) -> Self {
        Self {
            tracy_integration_steps,
            tracy_line_width,
        }
    }

    pub fn tracy_integration_steps(&self) -> u32 {
        self.tracy_integration_steps
    }

    pub fn tracy_line_width(&self) -> usize {
        self.tracy_line_width
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            tracy_integration_steps: 10,
            tracy_line_width: 80,
        }
    }
}

/// Settings for dipole splitting.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// A dipole whose name contains this tag is the second magnet instance
    /// of a pair; its port markers are numbered `P2` instead of `P1`.
    second_instance_tag: String,

    /// Angular tolerance in radians when comparing cut angles.
    tolerance: f64,
}

impl SplitConfig {
    pub fn new(second_instance_tag: impl Into<String>, tolerance: f64) -> Self {
        Self {
            second_instance_tag: second_instance_tag.into(),
            tolerance,
        }
    }

    pub fn second_instance_tag(&self) -> &str {
        &self.second_instance_tag
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            second_instance_tag: "2".to_string(),
            tolerance: 1e-6,
        }
    }
}

/// Settings for drift insertion.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Name prefix of inserted drifts, followed by a running number.
    prefix: String,
}

impl DriftConfig {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            prefix: "D".to_string(),
        }
    }
}
