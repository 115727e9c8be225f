// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::codec::TextCodec;
use crate::config::consts::{
    DEFAULT_ARTIFACT_PATH, DEFAULT_DOCUMENT_URI, DEFAULT_FUEL_LEVEL, DEFAULT_LOG_LEVEL,
    DEFAULT_MARKER_OWNER, DEFAULT_MAX_ARTIFACT_BYTES, DEFAULT_MAX_REFERENCES,
    DEFAULT_MAX_SOURCE_BYTES, MAX_FUEL_LEVEL, MIN_FUEL_LEVEL,
};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for the editor bridge.
///
/// Every section is optional; missing values fall back to the built-in
/// defaults in [`crate::config::consts`].
///
/// # Example
/// ```yaml
/// artifact: asl_lang.wasm
/// codec: manual
/// logging:
///   level: debug
/// wasm:
///   fuel:
///     default: 100000000
///     maximum: 500000000
/// limits:
///   max_references: 1024
/// editor:
///   marker_owner: asl
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Path of the analysis binary
    pub artifact: Option<PathBuf>,
    #[serde(default)]
    pub codec: TextCodec,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub wasm: WasmConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

impl Config {
    pub fn artifact_path(&self) -> PathBuf {
        self.artifact
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACT_PATH))
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fuel = &self.wasm.fuel;
        if fuel.get_minimum() > fuel.get_maximum() {
            return Err(ConfigError::FuelBounds {
                minimum: fuel.get_minimum(),
                maximum: fuel.get_maximum(),
            });
        }
        if self.limits.max_artifact_bytes() == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "max_artifact_bytes",
            });
        }
        if self.limits.max_source_bytes() == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "max_source_bytes",
            });
        }
        if self.limits.max_references() == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "max_references",
            });
        }
        if self.editor.marker_owner().is_empty() {
            return Err(ConfigError::EmptySetting {
                name: "editor.marker_owner",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Filter for the subscriber: `RUST_LOG` when set, otherwise `level`.
    ///
    /// `level` may be a plain level or a full directive string such as
    /// `asl_bridge=debug,wasmtime=warn`.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        env_directives
            .and_then(|directives| tracing_subscriber::EnvFilter::try_new(directives).ok())
            .or_else(|| tracing_subscriber::EnvFilter::try_new(self.level()).ok())
            .unwrap_or_else(|| {
                tracing_subscriber::EnvFilter::default()
                    .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
            })
    }
}

/// WASM-specific configuration options.
#[derive(Debug, Default, Deserialize)]
pub struct WasmConfig {
    #[serde(default)]
    pub fuel: FuelConfig,
}

/// Fuel budget for each analysis request.
///
/// Fuel bounds the number of instructions one call into the analysis binary
/// may execute, so a misbehaving binary traps instead of hanging a request.
///
/// # Example
/// ```yaml
/// fuel:
///   default: 100000000   # 100 million instructions
///   minimum: 1000000     # 1 million instructions
///   maximum: 500000000   # 500 million instructions (hard limit)
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct FuelConfig {
    pub default: Option<u64>,
    pub minimum: Option<u64>,
    pub maximum: Option<u64>,
}

impl FuelConfig {
    /// Get the default fuel level, using built-in default if not configured.
    pub fn get_default(&self) -> u64 {
        self.default.unwrap_or(DEFAULT_FUEL_LEVEL)
    }

    /// Get the minimum fuel level, using built-in default if not configured.
    pub fn get_minimum(&self) -> u64 {
        self.minimum.unwrap_or(MIN_FUEL_LEVEL)
    }

    /// Get the maximum fuel level, using built-in default if not configured.
    pub fn get_maximum(&self) -> u64 {
        self.maximum.unwrap_or(MAX_FUEL_LEVEL)
    }

    /// Clamp a requested fuel level to the configured bounds.
    ///
    /// # Example
    /// ```
    /// use asl_bridge::config::FuelConfig;
    ///
    /// let config = FuelConfig::default();
    /// let fuel = config.validate_and_clamp(1_000_000_000); // Too high
    /// assert_eq!(fuel, 500_000_000); // Clamped to maximum
    /// ```
    pub fn validate_and_clamp(&self, requested: u64) -> u64 {
        let min = self.get_minimum();
        let max = self.get_maximum();
        if requested < min || requested > max {
            tracing::warn!(
                "Requested fuel level {} outside [{}, {}], clamping",
                requested,
                min,
                max
            );
        }
        requested.clamp(min, max.max(min))
    }

    /// The fuel each request store starts with.
    pub fn effective(&self) -> u64 {
        self.validate_and_clamp(self.get_default())
    }
}

/// Size and count limits applied at the memory boundary.
#[derive(Debug, Default, Deserialize)]
pub struct LimitsConfig {
    pub max_artifact_bytes: Option<usize>,
    pub max_source_bytes: Option<usize>,
    pub max_references: Option<usize>,
}

impl LimitsConfig {
    pub fn max_artifact_bytes(&self) -> usize {
        self.max_artifact_bytes
            .unwrap_or(DEFAULT_MAX_ARTIFACT_BYTES)
    }

    pub fn max_source_bytes(&self) -> usize {
        self.max_source_bytes.unwrap_or(DEFAULT_MAX_SOURCE_BYTES)
    }

    pub fn max_references(&self) -> usize {
        self.max_references.unwrap_or(DEFAULT_MAX_REFERENCES)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EditorConfig {
    /// Owner tag markers are published under
    pub marker_owner: Option<String>,
    /// Uri reported for definition locations and rename edits
    pub document_uri: Option<String>,
}

impl EditorConfig {
    pub fn marker_owner(&self) -> &str {
        self.marker_owner.as_deref().unwrap_or(DEFAULT_MARKER_OWNER)
    }

    pub fn document_uri(&self) -> &str {
        self.document_uri.as_deref().unwrap_or(DEFAULT_DOCUMENT_URI)
    }
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load and validate a config from a YAML file
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
artifact: build/asl_lang.wasm
codec: manual
logging:
  level: debug
limits:
  max_references: 128
editor:
  marker_owner: diagnostics
  document_uri: file:///tmp/script.asl
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.artifact_path(), PathBuf::from("build/asl_lang.wasm"));
        assert_eq!(cfg.codec, TextCodec::Manual);
        assert_eq!(cfg.logging.level(), "debug");
        assert_eq!(cfg.limits.max_references(), 128);
        assert_eq!(cfg.limits.max_source_bytes(), DEFAULT_MAX_SOURCE_BYTES);
        assert_eq!(cfg.editor.marker_owner(), "diagnostics");
        assert_eq!(cfg.editor.document_uri(), "file:///tmp/script.asl");
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("{}").unwrap();

        assert_eq!(cfg.artifact_path(), PathBuf::from(DEFAULT_ARTIFACT_PATH));
        assert_eq!(cfg.codec, TextCodec::Native);
        assert_eq!(cfg.logging.level(), "warn");
        assert_eq!(cfg.wasm.fuel.get_default(), 100_000_000);
        assert_eq!(cfg.wasm.fuel.get_minimum(), 1_000_000);
        assert_eq!(cfg.wasm.fuel.get_maximum(), 500_000_000);
        assert_eq!(cfg.limits.max_artifact_bytes(), 16 * 1024 * 1024);
        assert_eq!(cfg.editor.marker_owner(), "asl");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_wasm_config_partial_override() {
        let yaml = r#"
wasm:
  fuel:
    default: 150000000
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();

        // Custom default, built-in min/max
        assert_eq!(cfg.wasm.fuel.get_default(), 150_000_000);
        assert_eq!(cfg.wasm.fuel.get_minimum(), 1_000_000);
        assert_eq!(cfg.wasm.fuel.get_maximum(), 500_000_000);
        assert_eq!(cfg.wasm.fuel.effective(), 150_000_000);
    }

    #[test]
    fn test_fuel_config_validate_and_clamp() {
        let config = FuelConfig {
            default: Some(100_000_000),
            minimum: Some(10_000_000),
            maximum: Some(200_000_000),
        };

        assert_eq!(config.validate_and_clamp(50_000_000), 50_000_000);
        assert_eq!(config.validate_and_clamp(1_000_000), 10_000_000);
        assert_eq!(config.validate_and_clamp(1_000_000_000), 200_000_000);
        assert_eq!(config.validate_and_clamp(10_000_000), 10_000_000);
        assert_eq!(config.validate_and_clamp(200_000_000), 200_000_000);
    }

    #[test]
    fn test_effective_fuel_clamps_default() {
        let config = FuelConfig {
            default: Some(900_000_000),
            minimum: None,
            maximum: None,
        };
        assert_eq!(config.effective(), MAX_FUEL_LEVEL);
    }

    #[test]
    fn test_load_and_validate_rejects_inverted_fuel_bounds() {
        let file = write_config(
            r#"
wasm:
  fuel:
    minimum: 500
    maximum: 100
"#,
        );

        let err = load_and_validate_config(file.path()).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("minimum 500 exceeds maximum 100"));
    }

    #[test]
    fn test_load_and_validate_rejects_zero_reference_cap() {
        let file = write_config("limits:\n  max_references: 0\n");

        let err = load_and_validate_config(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ZeroLimit {
                name: "max_references"
            }
        ));
    }

    #[test]
    fn test_load_and_validate_rejects_empty_marker_owner() {
        let file = write_config("editor:\n  marker_owner: \"\"\n");

        let err = load_and_validate_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptySetting { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config("/nonexistent/bridge.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/bridge.yaml"));
    }

    #[test]
    fn test_load_invalid_codec() {
        let file = write_config("codec: utf7\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
