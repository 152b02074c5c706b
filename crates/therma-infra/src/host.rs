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

//! sysinfo-backed native telemetry source for desktop hosts.

use std::time::Instant;

use sysinfo::{Components, System};
use therma_core::{
    FrameTimingHint, NativeTelemetrySource, PerformanceMode, SourceError, WarningLevel,
};

// Same thresholds the engine uses for coarse thermal classification.
const THROTTLING_TEMPERATURE_C: f32 = 90.0;
const IMMINENT_TEMPERATURE_C: f32 = 80.0;

/// Reads device telemetry from the host OS through `sysinfo`.
///
/// Desktop sensors expose no performance-mode or level-control surface,
/// so those report absence; the provider's capability gating and the
/// control surface's boolean contract absorb that.
pub struct HostTelemetrySource {
    last_temperature: Option<(f32, Instant)>,
}

impl HostTelemetrySource {
    /// Creates a source over the current host.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_temperature: None,
        }
    }

    /// Highest CPU/core component temperature, if any sensor reports one.
    fn read_max_component_temperature(&self) -> Option<f32> {
        let components = Components::new_with_refreshed_list();
        let mut max_temp: Option<f32> = None;

        for component in &components {
            let label = component.label().to_lowercase();
            if label.contains("cpu") || label.contains("core") {
                if let Some(temp) = component.temperature() {
                    max_temp = Some(max_temp.map_or(temp, |m| f32::max(m, temp)));
                }
            }
        }
        max_temp
    }
}

impl Default for HostTelemetrySource {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeTelemetrySource for HostTelemetrySource {
    fn is_available(&self) -> bool {
        true
    }

    fn initialize(&mut self) -> bool {
        let components = Components::new_with_refreshed_list();
        log::debug!(
            "Host telemetry layer up, {} sensors visible",
            components.list().len()
        );
        true
    }

    fn terminate(&mut self) {
        self.last_temperature = None;
    }

    fn version(&mut self) -> String {
        System::os_version().unwrap_or_default()
    }

    fn temperature_level(&mut self) -> Result<f32, SourceError> {
        let temperature = self
            .read_max_component_temperature()
            .ok_or(SourceError::Unsupported)?;
        self.last_temperature = Some((temperature, Instant::now()));
        Ok(temperature)
    }

    fn temperature_trend(&mut self) -> Result<f32, SourceError> {
        let current = self
            .read_max_component_temperature()
            .ok_or(SourceError::Unsupported)?;
        let now = Instant::now();

        let trend = match self.last_temperature {
            Some((previous, at)) => {
                let elapsed = now.duration_since(at).as_secs_f32();
                if elapsed > 0.0 {
                    (current - previous) / elapsed
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        self.last_temperature = Some((current, now));
        Ok(trend)
    }

    fn thermal_warning_level(&mut self) -> Result<WarningLevel, SourceError> {
        let Some(temperature) = self.read_max_component_temperature() else {
            // No sensor is not a fault; report the calm default.
            return Ok(WarningLevel::NoWarning);
        };

        let level = if temperature > THROTTLING_TEMPERATURE_C {
            WarningLevel::Throttling
        } else if temperature > IMMINENT_TEMPERATURE_C {
            WarningLevel::ThrottlingImminent
        } else {
            WarningLevel::NoWarning
        };
        Ok(level)
    }

    fn performance_mode(&mut self) -> Result<PerformanceMode, SourceError> {
        // Desktop hosts expose no low-power/boost mode through sysinfo.
        Ok(PerformanceMode::Standard)
    }

    fn report_frame_timing(&mut self, hint: FrameTimingHint) {
        log::trace!(
            "Frame timing hint: {}ns of {}ns target",
            hint.frame_time_ns,
            hint.target_duration_ns
        );
    }
}
