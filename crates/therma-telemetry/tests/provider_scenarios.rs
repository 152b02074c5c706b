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

//! End-to-end provider scenarios driven through a scripted native source
//! and a manually advanced clock.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use therma_core::{
    Feature, LifecycleState, ManualClock, PerformanceLevelRequest, ProviderSettings, WarningLevel,
};
use therma_infra::ScriptedTelemetrySource;
use therma_telemetry::AdaptiveProvider;

fn provider_with_clock(
    source: ScriptedTelemetrySource,
) -> (AdaptiveProvider, ManualClock) {
    let clock = ManualClock::new();
    let provider = AdaptiveProvider::with_clock(
        Box::new(source),
        ProviderSettings::default(),
        Arc::new(clock.clone()),
    );
    (provider, clock)
}

#[test]
fn test_temperature_debounce_and_change_gating() {
    let source = ScriptedTelemetrySource::new("12.0").with_temperatures([20.0, 20.0, 25.0]);
    let (mut provider, clock) = provider_with_clock(source);

    provider.try_initialize().unwrap();
    provider.start().unwrap();

    // Start seeded every supported feature before the first poll.
    let seeded = provider.update();
    assert_eq!(seeded.temperature_level, 20.0);
    assert!(seeded.change_flags.contains(Feature::TEMPERATURE_LEVEL));
    assert!(seeded.change_flags.contains(Feature::WARNING_LEVEL));
    assert!(seeded.change_flags.contains(Feature::PERFORMANCE_MODE));

    // Inside the debounce window nothing is re-queried.
    clock.advance(Duration::from_millis(500));
    let unchanged = provider.update();
    assert!(unchanged.is_unchanged());
    assert_eq!(unchanged.temperature_level, 20.0);

    // Past the window, an unchanged native value raises no flag.
    clock.advance(Duration::from_millis(600));
    let still_unchanged = provider.update();
    assert!(still_unchanged.is_unchanged());

    // Past the next window, the moved value comes through flagged.
    clock.advance(Duration::from_millis(1100));
    let moved = provider.update();
    assert_eq!(moved.temperature_level, 25.0);
    assert!(moved.change_flags.contains(Feature::TEMPERATURE_LEVEL));
    assert!(!moved.change_flags.contains(Feature::PERFORMANCE_MODE));
}

#[test]
fn test_update_outside_running_is_empty() {
    let source = ScriptedTelemetrySource::new("12.0");
    let (mut provider, _clock) = provider_with_clock(source);

    provider.try_initialize().unwrap();
    provider.start().unwrap();
    provider.update();

    provider.stop().unwrap();
    let snapshot = provider.update();
    assert!(snapshot.is_unchanged());
    assert_eq!(snapshot.temperature_level, 0.0);
}

#[test]
fn test_performance_level_request_is_clamped_and_applied() {
    let source = ScriptedTelemetrySource::new("12.0").with_max_performance_levels(4, 2);
    let (mut provider, _clock) = provider_with_clock(source);

    provider.try_initialize().unwrap();
    assert_eq!(provider.max_cpu_performance_level(), 4);
    assert_eq!(provider.max_gpu_performance_level(), 2);

    provider.start().unwrap();
    provider.update();

    let mut request = PerformanceLevelRequest {
        cpu_level: 10,
        gpu_level: -5,
    };
    assert!(provider.set_performance_level(&mut request));
    assert_eq!(request.cpu_level, 4);
    assert_eq!(request.gpu_level, 0);

    // Clock untouched: the only changes in this snapshot are the levels.
    let snapshot = provider.update();
    assert_eq!(
        snapshot.change_flags,
        Feature::CPU_PERFORMANCE_LEVEL | Feature::GPU_PERFORMANCE_LEVEL
    );
    assert_eq!(snapshot.cpu_performance_level, 4);
    assert_eq!(snapshot.gpu_performance_level, 0);
    assert!(snapshot.performance_level_control_available);
}

#[test]
fn test_unknown_max_levels_fall_back_to_default() {
    // The scripted source reports -1 for both maximums by default.
    let source = ScriptedTelemetrySource::new("12.0");
    let (mut provider, _clock) = provider_with_clock(source);

    provider.try_initialize().unwrap();
    assert_eq!(provider.max_cpu_performance_level(), 3);
    assert_eq!(provider.max_gpu_performance_level(), 3);
}

#[test]
fn test_control_surface_absent_below_extended_version() {
    let source = ScriptedTelemetrySource::new("11.2");
    let (mut provider, _clock) = provider_with_clock(source);

    provider.try_initialize().unwrap();
    assert!(!provider
        .capabilities()
        .contains(Feature::PERFORMANCE_LEVEL_CONTROL));

    let max_before = provider.max_cpu_performance_level();
    let mut request = PerformanceLevelRequest {
        cpu_level: 1,
        gpu_level: 1,
    };
    assert!(!provider.set_performance_level(&mut request));
    assert_eq!(provider.max_cpu_performance_level(), max_before);
    assert!(!provider.enable_cpu_boost());
    assert!(!provider.enable_gpu_boost());
}

#[test]
fn test_native_rejection_returns_false() {
    let source = ScriptedTelemetrySource::new("12.0").rejecting_performance_levels();
    let (mut provider, _clock) = provider_with_clock(source);

    provider.try_initialize().unwrap();
    let mut request = PerformanceLevelRequest {
        cpu_level: 1,
        gpu_level: 1,
    };
    assert!(!provider.set_performance_level(&mut request));
}

#[test]
fn test_warning_event_appears_exactly_once() -> Result<()> {
    let source = ScriptedTelemetrySource::new("12.0");
    let warning_tx = source.warning_sender();
    let (mut provider, clock) = provider_with_clock(source);

    provider.try_initialize().unwrap();
    provider.start().unwrap();
    provider.update();

    warning_tx.send(WarningLevel::ThrottlingImminent)?;

    clock.advance(Duration::from_millis(100));
    let snapshot = provider.update();
    assert_eq!(snapshot.warning_level, WarningLevel::ThrottlingImminent);
    assert!(snapshot.change_flags.contains(Feature::WARNING_LEVEL));

    clock.advance(Duration::from_millis(100));
    let next = provider.update();
    assert!(!next.change_flags.contains(Feature::WARNING_LEVEL));
    assert_eq!(next.warning_level, WarningLevel::ThrottlingImminent);
    Ok(())
}

#[test]
fn test_application_resume_bypasses_debounce() {
    let source = ScriptedTelemetrySource::new("12.0").with_temperatures([20.0, 25.0]);
    let (mut provider, clock) = provider_with_clock(source);

    provider.try_initialize().unwrap();
    provider.start().unwrap();
    provider.update();

    // Well inside the debounce window, resume still refreshes.
    clock.advance(Duration::from_millis(100));
    provider.application_resume();

    let snapshot = provider.update();
    assert_eq!(snapshot.temperature_level, 25.0);
    assert!(snapshot.change_flags.contains(Feature::TEMPERATURE_LEVEL));
}

#[test]
fn test_destroy_from_running_passes_through_stopped() {
    let source = ScriptedTelemetrySource::new("12.0");
    let (mut provider, _clock) = provider_with_clock(source);

    provider.try_initialize().unwrap();
    provider.start().unwrap();
    provider.destroy().unwrap();

    assert_eq!(provider.lifecycle_state(), LifecycleState::Destroyed);
    assert!(provider.start().is_err());
}

#[test]
fn test_frame_hints_start_with_the_second_update() {
    use std::sync::Mutex;
    use therma_core::{FrameTimingHint, NativeTelemetrySource};

    // Wraps the scripted source to observe hint delivery from outside
    // the provider.
    struct HintRecorder {
        inner: ScriptedTelemetrySource,
        hints: Arc<Mutex<Vec<FrameTimingHint>>>,
    }

    impl NativeTelemetrySource for HintRecorder {
        fn is_available(&self) -> bool {
            self.inner.is_available()
        }
        fn initialize(&mut self) -> bool {
            self.inner.initialize()
        }
        fn terminate(&mut self) {
            self.inner.terminate()
        }
        fn version(&mut self) -> String {
            self.inner.version()
        }
        fn temperature_level(&mut self) -> Result<f32, therma_core::SourceError> {
            self.inner.temperature_level()
        }
        fn thermal_warning_level(
            &mut self,
        ) -> Result<WarningLevel, therma_core::SourceError> {
            self.inner.thermal_warning_level()
        }
        fn performance_mode(
            &mut self,
        ) -> Result<therma_core::PerformanceMode, therma_core::SourceError> {
            self.inner.performance_mode()
        }
        fn report_frame_timing(&mut self, hint: FrameTimingHint) {
            self.hints.lock().unwrap().push(hint);
        }
    }

    let hints = Arc::new(Mutex::new(Vec::new()));
    let source = HintRecorder {
        inner: ScriptedTelemetrySource::new("12.0"),
        hints: Arc::clone(&hints),
    };

    let clock = ManualClock::new();
    let mut provider = AdaptiveProvider::with_clock(
        Box::new(source),
        ProviderSettings::default(),
        Arc::new(clock.clone()),
    );
    provider.try_initialize().unwrap();
    provider.start().unwrap();

    // The first update has no previous tick to measure against.
    provider.update();
    assert!(hints.lock().unwrap().is_empty());

    clock.advance(Duration::from_millis(16));
    provider.update();

    let recorded = hints.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].frame_time_ns, 16_000_000);
    // 60 Hz default target.
    assert_eq!(recorded[0].target_duration_ns, 16_666_666);
}
