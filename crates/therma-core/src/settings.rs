// Copyright 2025 therma contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Persisted provider settings.
//!
//! Settings are injected explicitly at provider construction rather than
//! fetched from a process-wide singleton, so tests can pass fakes and no
//! hidden global state exists.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for an adaptive-performance provider instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Emit debug-level sampling logs. Off by default; only consulted for
    /// debug logging, never by the sampling algorithm itself.
    pub provider_logging: bool,
    /// Minimum seconds between temperature re-queries.
    pub thermal_sampling_interval_secs: f32,
    /// Target frame rate used for the frame-pacing hint, in Hz.
    pub target_frame_rate: f32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider_logging: false,
            thermal_sampling_interval_secs: 1.0,
            target_frame_rate: 60.0,
        }
    }
}

impl ProviderSettings {
    /// Loads settings from a JSON file. Missing fields fall back to their
    /// defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|err| SettingsError::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|err| SettingsError::Parse {
            path: path.display().to_string(),
            reason: err.to_string(),
        })
    }

    /// Saves settings as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(self).map_err(|err| SettingsError::Parse {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        fs::write(path, text).map_err(|err| SettingsError::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        })
    }
}

/// A failure while loading or saving provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// The settings file could not be read or written.
    Io {
        /// Path of the offending file.
        path: String,
        /// Underlying I/O error text.
        reason: String,
    },
    /// The settings file is not valid JSON for this schema.
    Parse {
        /// Path of the offending file.
        path: String,
        /// Underlying parse error text.
        reason: String,
    },
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io { path, reason } => {
                write!(f, "Failed to access settings file '{path}': {reason}")
            }
            SettingsError::Parse { path, reason } => {
                write!(f, "Failed to parse settings file '{path}': {reason}")
            }
        }
    }
}

impl std::error::Error for SettingsError {}
