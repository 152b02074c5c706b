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

//! Telemetry feature flags and their sampled payloads.
//!
//! A [`Feature`] set doubles as the provider's capability mask (which
//! features the platform supports at all) and as the per-snapshot change
//! mask (which fields moved since the consumer last drained the record).

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::record::{PerformanceMode, WarningLevel};

/// A set of independent telemetry/control features.
///
/// Immutable as a capability mask once detection has run for a session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Feature(u32);

impl Feature {
    /// The empty set.
    pub const NONE: Feature = Feature(0);
    /// Device temperature level, in degrees Celsius.
    pub const TEMPERATURE_LEVEL: Feature = Feature(1 << 0);
    /// Thermal warning ordinal reported by the platform.
    pub const WARNING_LEVEL: Feature = Feature(1 << 1);
    /// Coarse device performance mode (standard, low-power, boost).
    pub const PERFORMANCE_MODE: Feature = Feature(1 << 2);
    /// Direction the temperature is moving, degrees per second.
    pub const TEMPERATURE_TREND: Feature = Feature(1 << 3);
    /// Ability to request CPU/GPU performance levels.
    pub const PERFORMANCE_LEVEL_CONTROL: Feature = Feature(1 << 4);
    /// Currently applied CPU performance level.
    pub const CPU_PERFORMANCE_LEVEL: Feature = Feature(1 << 5);
    /// Currently applied GPU performance level.
    pub const GPU_PERFORMANCE_LEVEL: Feature = Feature(1 << 6);

    const NAMED: [(Feature, &'static str); 7] = [
        (Feature::TEMPERATURE_LEVEL, "TemperatureLevel"),
        (Feature::WARNING_LEVEL, "WarningLevel"),
        (Feature::PERFORMANCE_MODE, "PerformanceMode"),
        (Feature::TEMPERATURE_TREND, "TemperatureTrend"),
        (Feature::PERFORMANCE_LEVEL_CONTROL, "PerformanceLevelControl"),
        (Feature::CPU_PERFORMANCE_LEVEL, "CpuPerformanceLevel"),
        (Feature::GPU_PERFORMANCE_LEVEL, "GpuPerformanceLevel"),
    ];

    /// Returns `true` if every flag in `other` is present in `self`.
    #[must_use]
    pub fn contains(&self, other: Feature) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns `true` if the set contains no flags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates over the individual flags present in this set.
    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::NAMED
            .iter()
            .map(|(flag, _)| *flag)
            .filter(|flag| self.contains(*flag))
    }
}

impl BitOr for Feature {
    type Output = Feature;
    fn bitor(self, rhs: Feature) -> Feature {
        Feature(self.0 | rhs.0)
    }
}

impl BitOrAssign for Feature {
    fn bitor_assign(&mut self, rhs: Feature) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Feature {
    type Output = Feature;
    fn bitand(self, rhs: Feature) -> Feature {
        Feature(self.0 & rhs.0)
    }
}

impl BitAndAssign for Feature {
    fn bitand_assign(&mut self, rhs: Feature) {
        self.0 &= rhs.0;
    }
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "None");
        }
        let mut first = true;
        for (flag, name) in Feature::NAMED {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A sampled value tagged with the feature it belongs to.
///
/// Produced by native queries and folded into the performance data record;
/// the tag lets the record enforce its capability invariant in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    /// Device temperature in degrees Celsius.
    TemperatureLevel(f32),
    /// Temperature movement in degrees per second.
    TemperatureTrend(f32),
    /// Thermal warning ordinal.
    WarningLevel(WarningLevel),
    /// Coarse device performance mode.
    PerformanceMode(PerformanceMode),
    /// Applied CPU performance level.
    CpuPerformanceLevel(i32),
    /// Applied GPU performance level.
    GpuPerformanceLevel(i32),
}

impl FeatureValue {
    /// Returns the feature flag this value belongs to.
    #[must_use]
    pub fn feature(&self) -> Feature {
        match self {
            FeatureValue::TemperatureLevel(_) => Feature::TEMPERATURE_LEVEL,
            FeatureValue::TemperatureTrend(_) => Feature::TEMPERATURE_TREND,
            FeatureValue::WarningLevel(_) => Feature::WARNING_LEVEL,
            FeatureValue::PerformanceMode(_) => Feature::PERFORMANCE_MODE,
            FeatureValue::CpuPerformanceLevel(_) => Feature::CPU_PERFORMANCE_LEVEL,
            FeatureValue::GpuPerformanceLevel(_) => Feature::GPU_PERFORMANCE_LEVEL,
        }
    }
}
