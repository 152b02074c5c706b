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

//! Version-gated capability detection.
//!
//! Maps a raw platform version string to the set of telemetry features
//! that platform generation supports. Run once per session; the resulting
//! set is immutable afterward.

use crate::error::ProviderError;
use crate::feature::Feature;
use crate::version::ProviderVersion;

/// Oldest platform generation with any telemetry support.
pub const BASELINE_VERSION: ProviderVersion = ProviderVersion::new(11, 0, 0);
/// Platform generation that adds thermal sampling and level control.
pub const EXTENDED_VERSION: ProviderVersion = ProviderVersion::new(12, 0, 0);

/// Computes the capability set for a raw platform version string.
///
/// A malformed version string yields [`ProviderError::VersionParse`];
/// callers treat that as non-fatal and degrade to an empty capability
/// set. A well-formed version below [`BASELINE_VERSION`] yields an empty
/// set. No external state is touched.
pub fn detect_capabilities(raw: &str) -> Result<(ProviderVersion, Feature), ProviderError> {
    let version: ProviderVersion = raw.parse()?;

    let mut capabilities = Feature::NONE;
    if version >= BASELINE_VERSION {
        capabilities |= Feature::CPU_PERFORMANCE_LEVEL
            | Feature::GPU_PERFORMANCE_LEVEL
            | Feature::WARNING_LEVEL;
    }
    if version >= EXTENDED_VERSION {
        capabilities |= Feature::PERFORMANCE_MODE
            | Feature::TEMPERATURE_TREND
            | Feature::TEMPERATURE_LEVEL
            | Feature::PERFORMANCE_LEVEL_CONTROL;
    }

    log::trace!("Platform {version} supports {capabilities}");
    Ok((version, capabilities))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_baseline_yields_empty_set() {
        let (version, caps) = detect_capabilities("10.3").unwrap();
        assert_eq!(version, ProviderVersion::new(10, 3, 0));
        assert!(caps.is_empty());
    }

    #[test]
    fn test_baseline_unlocks_levels_and_warnings() {
        let (_, caps) = detect_capabilities("11.0").unwrap();
        assert!(caps.contains(
            Feature::CPU_PERFORMANCE_LEVEL | Feature::GPU_PERFORMANCE_LEVEL | Feature::WARNING_LEVEL
        ));
        assert!(!caps.contains(Feature::TEMPERATURE_LEVEL));
        assert!(!caps.contains(Feature::PERFORMANCE_LEVEL_CONTROL));
    }

    #[test]
    fn test_extended_unlocks_thermal_and_control() {
        let (_, caps) = detect_capabilities("12.0").unwrap();
        assert!(caps.contains(
            Feature::TEMPERATURE_LEVEL
                | Feature::TEMPERATURE_TREND
                | Feature::PERFORMANCE_MODE
                | Feature::PERFORMANCE_LEVEL_CONTROL
        ));
        assert!(caps.contains(Feature::WARNING_LEVEL));
    }

    #[test]
    fn test_malformed_version_is_an_error() {
        let err = detect_capabilities("1").unwrap_err();
        assert!(matches!(err, ProviderError::VersionParse { .. }));
    }
}
