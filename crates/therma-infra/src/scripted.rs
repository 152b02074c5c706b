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

//! A scripted telemetry source for demos and integration tests.

use crossbeam_channel::{bounded, Receiver, Sender};
use therma_core::{
    FrameTimingHint, NativeTelemetrySource, PerformanceMode, SourceError, WarningLevel,
};

const WARNING_CHANNEL_CAPACITY: usize = 16;

/// Plays back a configured sequence of telemetry values.
///
/// Each temperature query consumes the next scripted value; the last one
/// repeats once the script is exhausted. Warning events injected through
/// [`warning_sender`](ScriptedTelemetrySource::warning_sender) reach the
/// provider over the same channel a real native layer would use.
pub struct ScriptedTelemetrySource {
    available: bool,
    initialize_succeeds: bool,
    version: String,
    temperatures: Vec<f32>,
    cursor: usize,
    temperature_queries: u32,
    temperature_trend: Option<f32>,
    warning_level: WarningLevel,
    performance_mode: PerformanceMode,
    max_cpu_performance_level: i32,
    max_gpu_performance_level: i32,
    accept_performance_levels: bool,
    applied_levels: Option<(i32, i32)>,
    frame_hints: Vec<FrameTimingHint>,
    warning_tx: Sender<WarningLevel>,
    warning_rx: Option<Receiver<WarningLevel>>,
}

impl ScriptedTelemetrySource {
    /// Creates a source reporting `version`, with a flat 20 °C script.
    #[must_use]
    pub fn new(version: &str) -> Self {
        let (warning_tx, warning_rx) = bounded(WARNING_CHANNEL_CAPACITY);
        Self {
            available: true,
            initialize_succeeds: true,
            version: version.to_string(),
            temperatures: vec![20.0],
            cursor: 0,
            temperature_queries: 0,
            temperature_trend: None,
            warning_level: WarningLevel::NoWarning,
            performance_mode: PerformanceMode::Standard,
            max_cpu_performance_level: -1,
            max_gpu_performance_level: -1,
            accept_performance_levels: true,
            applied_levels: None,
            frame_hints: Vec::new(),
            warning_tx,
            warning_rx: Some(warning_rx),
        }
    }

    /// Replaces the temperature playback script.
    #[must_use]
    pub fn with_temperatures(mut self, temperatures: impl Into<Vec<f32>>) -> Self {
        self.temperatures = temperatures.into();
        self.cursor = 0;
        self
    }

    /// Sets a constant temperature trend. Unset trends report
    /// [`SourceError::Unsupported`].
    #[must_use]
    pub fn with_temperature_trend(mut self, trend: f32) -> Self {
        self.temperature_trend = Some(trend);
        self
    }

    /// Sets the constant thermal warning level.
    #[must_use]
    pub fn with_warning_level(mut self, level: WarningLevel) -> Self {
        self.warning_level = level;
        self
    }

    /// Sets the constant performance mode.
    #[must_use]
    pub fn with_performance_mode(mut self, mode: PerformanceMode) -> Self {
        self.performance_mode = mode;
        self
    }

    /// Sets the maximum performance levels the source reports.
    #[must_use]
    pub fn with_max_performance_levels(mut self, cpu: i32, gpu: i32) -> Self {
        self.max_cpu_performance_level = cpu;
        self.max_gpu_performance_level = gpu;
        self
    }

    /// Makes the source reject performance-level requests.
    #[must_use]
    pub fn rejecting_performance_levels(mut self) -> Self {
        self.accept_performance_levels = false;
        self
    }

    /// Makes [`is_available`](NativeTelemetrySource::is_available) report
    /// `false`.
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Makes [`initialize`](NativeTelemetrySource::initialize) fail.
    #[must_use]
    pub fn failing_initialize(mut self) -> Self {
        self.initialize_succeeds = false;
        self
    }

    /// A sender for injecting asynchronous thermal warning events.
    #[must_use]
    pub fn warning_sender(&self) -> Sender<WarningLevel> {
        self.warning_tx.clone()
    }

    /// How many temperature queries have run.
    #[must_use]
    pub fn temperature_query_count(&self) -> u32 {
        self.temperature_queries
    }

    /// The most recently applied performance levels, if any.
    #[must_use]
    pub fn applied_levels(&self) -> Option<(i32, i32)> {
        self.applied_levels
    }

    /// Frame-pacing hints received so far.
    #[must_use]
    pub fn frame_hints(&self) -> &[FrameTimingHint] {
        &self.frame_hints
    }
}

impl NativeTelemetrySource for ScriptedTelemetrySource {
    fn is_available(&self) -> bool {
        self.available
    }

    fn initialize(&mut self) -> bool {
        self.initialize_succeeds
    }

    fn terminate(&mut self) {}

    fn version(&mut self) -> String {
        self.version.clone()
    }

    fn temperature_level(&mut self) -> Result<f32, SourceError> {
        self.temperature_queries += 1;
        let Some(&value) = self
            .temperatures
            .get(self.cursor)
            .or_else(|| self.temperatures.last())
        else {
            return Err(SourceError::Unsupported);
        };
        if self.cursor < self.temperatures.len() {
            self.cursor += 1;
        }
        Ok(value)
    }

    fn temperature_trend(&mut self) -> Result<f32, SourceError> {
        self.temperature_trend.ok_or(SourceError::Unsupported)
    }

    fn thermal_warning_level(&mut self) -> Result<WarningLevel, SourceError> {
        Ok(self.warning_level)
    }

    fn performance_mode(&mut self) -> Result<PerformanceMode, SourceError> {
        Ok(self.performance_mode)
    }

    fn max_cpu_performance_level(&mut self) -> i32 {
        self.max_cpu_performance_level
    }

    fn max_gpu_performance_level(&mut self) -> i32 {
        self.max_gpu_performance_level
    }

    fn set_performance_level(&mut self, cpu_level: i32, gpu_level: i32) -> bool {
        if !self.accept_performance_levels {
            return false;
        }
        self.applied_levels = Some((cpu_level, gpu_level));
        true
    }

    fn enable_cpu_boost(&mut self) -> bool {
        self.accept_performance_levels
    }

    fn enable_gpu_boost(&mut self) -> bool {
        self.accept_performance_levels
    }

    fn report_frame_timing(&mut self, hint: FrameTimingHint) {
        self.frame_hints.push(hint);
    }

    fn take_warning_receiver(&mut self) -> Option<Receiver<WarningLevel>> {
        self.warning_rx.take()
    }
}
