// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors that can occur while loading or validating the bridge configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read configuration '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the expected schema
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Fuel bounds are inverted
    #[error("Invalid fuel bounds: minimum {minimum} exceeds maximum {maximum}")]
    FuelBounds { minimum: u64, maximum: u64 },

    /// A limit that must be positive was zero
    #[error("Limit '{name}' must be greater than zero")]
    ZeroLimit { name: &'static str },

    /// A string setting that must not be empty was empty
    #[error("Setting '{name}' must not be empty")]
    EmptySetting { name: &'static str },
}

impl ConfigError {
    /// Whether the error comes from validation rather than reading/parsing
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ConfigError::FuelBounds { .. }
                | ConfigError::ZeroLimit { .. }
                | ConfigError::EmptySetting { .. }
        )
    }
}
