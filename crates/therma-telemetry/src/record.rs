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

//! Mutex-guarded performance data record shared between the sampling
//! tick and the consumer poll.

use std::sync::Mutex;

use therma_core::{Feature, FeatureValue, PerformanceDataRecord};

/// The single shared record instance for one provider session.
///
/// One writer (the sampling engine) and one reader (the consumer drain)
/// may run on different execution contexts; both go through the mutex.
/// The capability set is fixed at construction and enforced on every
/// write.
#[derive(Debug)]
pub struct SharedRecord {
    capabilities: Feature,
    inner: Mutex<PerformanceDataRecord>,
}

impl SharedRecord {
    /// Creates a record that accepts writes for `capabilities` only.
    #[must_use]
    pub fn new(capabilities: Feature) -> Self {
        Self {
            capabilities,
            inner: Mutex::new(PerformanceDataRecord::default()),
        }
    }

    /// The capability set this record enforces.
    #[must_use]
    pub fn capabilities(&self) -> Feature {
        self.capabilities
    }

    /// Returns `true` if `feature` may be written to this record.
    #[must_use]
    pub fn supports(&self, feature: Feature) -> bool {
        self.capabilities.contains(feature)
    }

    /// Writes a sampled value and marks its feature as changed.
    ///
    /// Rejected (logged no-op, returns `false`) when the value's feature
    /// is outside the active capability set.
    pub fn apply_update(&self, value: FeatureValue) -> bool {
        let feature = value.feature();
        if !self.supports(feature) {
            log::debug!("Dropping update for unsupported feature {feature}");
            return false;
        }

        let mut record = self.inner.lock().unwrap();
        match value {
            FeatureValue::TemperatureLevel(level) => record.temperature_level = level,
            FeatureValue::TemperatureTrend(trend) => record.temperature_trend = trend,
            FeatureValue::WarningLevel(level) => record.warning_level = level,
            FeatureValue::PerformanceMode(mode) => record.performance_mode = mode,
            FeatureValue::CpuPerformanceLevel(level) => record.cpu_performance_level = level,
            FeatureValue::GpuPerformanceLevel(level) => record.gpu_performance_level = level,
        }
        record.change_flags |= feature;
        true
    }

    /// Marks whether the performance-level control surface is usable.
    pub fn set_control_available(&self, available: bool) {
        let mut record = self.inner.lock().unwrap();
        record.performance_level_control_available = available;
    }

    /// Atomically copies the record and resets its change flags.
    ///
    /// The copy and the reset happen under one lock acquisition, so the
    /// consumer can never observe a half-written record and no change is
    /// ever reported twice.
    pub fn drain_snapshot(&self) -> PerformanceDataRecord {
        let mut record = self.inner.lock().unwrap();
        let snapshot = *record;
        record.change_flags = Feature::NONE;
        snapshot
    }
}
