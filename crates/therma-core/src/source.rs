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

//! The seam between the provider core and the OS telemetry layer.
//!
//! Platform-specific implementations live in `therma-infra` and are
//! injected at construction, so the sampling core never branches on the
//! target platform and tests can substitute a fake.

use crossbeam_channel::Receiver;

use crate::error::SourceError;
use crate::record::{PerformanceMode, WarningLevel};

/// A consumer request for specific CPU/GPU performance levels.
///
/// Transient: submitted to the control surface, clamped in place against
/// the provider's maximum levels, and consumed synchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceLevelRequest {
    /// Requested CPU performance level.
    pub cpu_level: i32,
    /// Requested GPU performance level.
    pub gpu_level: i32,
}

/// A frame-pacing hint reported to the native layer each update tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTimingHint {
    /// Measured CPU frame completion time, in nanoseconds.
    pub frame_time_ns: u64,
    /// Desired frame duration, in nanoseconds.
    pub target_duration_ns: u64,
}

/// Abstract OS-level telemetry queries and performance-level setters.
///
/// Every method must be cheap, synchronous, and non-panicking. Features a
/// platform cannot serve return [`SourceError::Unsupported`] (queries) or
/// `false` (setters); the sampling engine treats both as absence, never
/// as a fault.
pub trait NativeTelemetrySource: Send {
    /// Returns `true` if the native layer exists on this device. Cheap
    /// and callable before [`initialize`](Self::initialize).
    fn is_available(&self) -> bool;

    /// Brings up the native layer. Returns `false` on failure.
    fn initialize(&mut self) -> bool;

    /// Tears the native layer down. Idempotent.
    fn terminate(&mut self);

    /// Raw platform version string used for capability gating.
    fn version(&mut self) -> String;

    /// Current device temperature in degrees Celsius.
    fn temperature_level(&mut self) -> Result<f32, SourceError>;

    /// Temperature movement in degrees per second.
    fn temperature_trend(&mut self) -> Result<f32, SourceError> {
        Err(SourceError::Unsupported)
    }

    /// Current thermal warning ordinal.
    fn thermal_warning_level(&mut self) -> Result<WarningLevel, SourceError>;

    /// Current coarse performance mode.
    fn performance_mode(&mut self) -> Result<PerformanceMode, SourceError>;

    /// Highest CPU performance level the platform accepts, or a negative
    /// value when unknown.
    fn max_cpu_performance_level(&mut self) -> i32 {
        -1
    }

    /// Highest GPU performance level the platform accepts, or a negative
    /// value when unknown.
    fn max_gpu_performance_level(&mut self) -> i32 {
        -1
    }

    /// Requests specific CPU/GPU performance levels. Returns `false` when
    /// the platform rejects or does not support the request.
    fn set_performance_level(&mut self, cpu_level: i32, gpu_level: i32) -> bool {
        let _ = (cpu_level, gpu_level);
        false
    }

    /// One-shot CPU boost request.
    fn enable_cpu_boost(&mut self) -> bool {
        false
    }

    /// One-shot GPU boost request.
    fn enable_gpu_boost(&mut self) -> bool {
        false
    }

    /// Reports frame pacing to the platform's hint system, when present.
    fn report_frame_timing(&mut self, hint: FrameTimingHint) {
        let _ = hint;
    }

    /// Hands out the receiving end of the native thermal-warning event
    /// channel, if the platform pushes warnings asynchronously. Called at
    /// most once, during provider initialization.
    fn take_warning_receiver(&mut self) -> Option<Receiver<WarningLevel>> {
        None
    }
}
