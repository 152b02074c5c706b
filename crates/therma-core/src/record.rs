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

//! The performance data record and its value enums.

use serde::{Deserialize, Serialize};

use crate::feature::Feature;

/// Sentinel for a performance level that has not been observed or applied.
pub const PERFORMANCE_LEVEL_UNKNOWN: i32 = -1;

/// Thermal warning ordinal reported by the platform.
///
/// Ordered by severity so consumers can compare levels directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum WarningLevel {
    /// Device is within normal thermal bounds.
    #[default]
    NoWarning,
    /// Device is heating up; throttling is expected soon.
    ThrottlingImminent,
    /// Device is actively throttling to shed heat.
    Throttling,
}

/// Coarse device performance mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PerformanceMode {
    /// Mode could not be determined.
    #[default]
    Unknown,
    /// Default operating mode.
    Standard,
    /// Battery-saver or low-power mode is active.
    LowPower,
    /// A boost mode (sustained or one-shot) is active.
    Boost,
}

/// Snapshot of the device performance state, with per-field change flags.
///
/// The record accumulates change flags between consumer polls; a drain
/// copies the values and resets the flags. Only the sampling side writes
/// it, only the consumer poll reads it, and both go through one mutex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceDataRecord {
    /// Device temperature in degrees Celsius.
    pub temperature_level: f32,
    /// Temperature movement in degrees per second. Positive means heating.
    pub temperature_trend: f32,
    /// Current thermal warning ordinal.
    pub warning_level: WarningLevel,
    /// Current device performance mode.
    pub performance_mode: PerformanceMode,
    /// CPU performance level applied through the control surface.
    pub cpu_performance_level: i32,
    /// GPU performance level applied through the control surface.
    pub gpu_performance_level: i32,
    /// Whether the performance-level control surface is usable.
    pub performance_level_control_available: bool,
    /// Features whose value changed since the last drain.
    pub change_flags: Feature,
}

impl Default for PerformanceDataRecord {
    fn default() -> Self {
        Self {
            temperature_level: 0.0,
            temperature_trend: 0.0,
            warning_level: WarningLevel::NoWarning,
            performance_mode: PerformanceMode::Unknown,
            cpu_performance_level: PERFORMANCE_LEVEL_UNKNOWN,
            gpu_performance_level: PERFORMANCE_LEVEL_UNKNOWN,
            performance_level_control_available: false,
            change_flags: Feature::NONE,
        }
    }
}

impl PerformanceDataRecord {
    /// Returns `true` if no field changed since the last drain.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.change_flags.is_empty()
    }
}
