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

//! The sampling engine: decides per tick whether each feature is due for
//! a native re-query.
//!
//! Two gates are kept separate on purpose: interval gating ("is it time
//! to check") lives in [`SamplingEngine::timed_update`], and value gating
//! ("did anything actually change") is applied afterwards, so consumers
//! only see change flags for features whose observable value moved.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use therma_core::{
    Feature, FeatureValue, FrameClock, NativeTelemetrySource, SourceError,
};

use crate::record::SharedRecord;

/// Drives immediate and debounced feature refreshes into a [`SharedRecord`].
pub struct SamplingEngine {
    clock: Arc<dyn FrameClock>,
    timestamps: HashMap<Feature, Duration>,
    last_observed: HashMap<Feature, FeatureValue>,
    verbose: bool,
}

impl SamplingEngine {
    /// Creates an engine reading time from `clock`.
    ///
    /// `verbose` gates debug-level logging of query failures, matching
    /// the provider's settings flag.
    #[must_use]
    pub fn new(clock: Arc<dyn FrameClock>, verbose: bool) -> Self {
        Self {
            clock,
            timestamps: HashMap::new(),
            last_observed: HashMap::new(),
            verbose,
        }
    }

    /// Unconditionally re-queries `feature` and applies the result.
    ///
    /// Used at start and on application resume, where a possibly stale
    /// value must be refreshed regardless of the debounce window.
    pub fn immediate_update(
        &mut self,
        feature: Feature,
        source: &mut dyn NativeTelemetrySource,
        record: &SharedRecord,
    ) {
        if !record.supports(feature) {
            return;
        }

        self.timestamps.insert(feature, self.clock.now());
        match query_feature(source, feature) {
            Ok(value) => {
                self.last_observed.insert(feature, value);
                record.apply_update(value);
            }
            Err(err) => self.log_query_failure(feature, &err),
        }
    }

    /// Re-queries `feature` only if `min_interval` has elapsed since its
    /// last query, and applies the result only if the value moved.
    ///
    /// The timestamp is advanced whenever a query runs, including failed
    /// queries and unchanged values, so a noisy or failing sensor is not
    /// re-polled every tick.
    pub fn timed_update(
        &mut self,
        feature: Feature,
        min_interval: Duration,
        source: &mut dyn NativeTelemetrySource,
        record: &SharedRecord,
    ) {
        if !record.supports(feature) {
            return;
        }

        let now = self.clock.now();
        if let Some(last) = self.timestamps.get(&feature) {
            if now.saturating_sub(*last) <= min_interval {
                return;
            }
        }

        self.timestamps.insert(feature, now);
        match query_feature(source, feature) {
            Ok(value) => {
                if self.last_observed.get(&feature) == Some(&value) {
                    return;
                }
                self.last_observed.insert(feature, value);
                record.apply_update(value);
            }
            Err(err) => self.log_query_failure(feature, &err),
        }
    }

    /// Last value observed for `feature`, if any query has succeeded.
    #[must_use]
    pub fn last_observed(&self, feature: Feature) -> Option<FeatureValue> {
        self.last_observed.get(&feature).copied()
    }

    fn log_query_failure(&self, feature: Feature, err: &SourceError) {
        if self.verbose {
            log::debug!("Query for {feature} failed, keeping stale value: {err}");
        }
    }
}

impl std::fmt::Debug for SamplingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplingEngine")
            .field("timestamps", &self.timestamps)
            .field("last_observed", &self.last_observed)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

/// Dispatches one feature query against the native source.
fn query_feature(
    source: &mut dyn NativeTelemetrySource,
    feature: Feature,
) -> Result<FeatureValue, SourceError> {
    if feature == Feature::TEMPERATURE_LEVEL {
        source.temperature_level().map(FeatureValue::TemperatureLevel)
    } else if feature == Feature::TEMPERATURE_TREND {
        source.temperature_trend().map(FeatureValue::TemperatureTrend)
    } else if feature == Feature::WARNING_LEVEL {
        source.thermal_warning_level().map(FeatureValue::WarningLevel)
    } else if feature == Feature::PERFORMANCE_MODE {
        source.performance_mode().map(FeatureValue::PerformanceMode)
    } else {
        // Performance levels are pushed through the control surface, not
        // sampled.
        Err(SourceError::Unsupported)
    }
}
