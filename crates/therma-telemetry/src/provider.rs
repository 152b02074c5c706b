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

//! The adaptive-performance provider: lifecycle state machine, per-tick
//! update, and the performance-level control surface.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use therma_core::{
    detect_capabilities, Feature, FeatureValue, FrameClock, FrameTimingHint, LifecycleState,
    MonotonicClock, NativeTelemetrySource, PerformanceDataRecord, PerformanceLevelRequest,
    ProviderError, ProviderSettings, ProviderVersion, SourceError, WarningLevel,
};

use crate::record::SharedRecord;
use crate::sampler::SamplingEngine;

/// Conservative maximum performance level used when the platform does
/// not report one.
pub const DEFAULT_MAX_PERFORMANCE_LEVEL: i32 = 3;

/// Thermal re-query cadence used when the configured interval is not
/// representable as a `Duration` (non-finite, negative, or overflowing).
const DEFAULT_THERMAL_INTERVAL: Duration = Duration::from_secs(1);

/// An adaptive-performance provider for one native telemetry source.
///
/// The host framework drives it through the lifecycle contract
/// (`try_initialize`/`start`/`stop`/`destroy`) and polls `update()` once
/// per frame while running; each poll drains an atomic snapshot with the
/// change flags accumulated since the previous poll.
pub struct AdaptiveProvider {
    settings: ProviderSettings,
    source: Box<dyn NativeTelemetrySource>,
    clock: Arc<dyn FrameClock>,
    state: LifecycleState,
    capabilities: Feature,
    version: Option<ProviderVersion>,
    max_cpu_performance_level: i32,
    max_gpu_performance_level: i32,
    record: SharedRecord,
    sampler: SamplingEngine,
    warning_rx: Option<Receiver<WarningLevel>>,
    last_update_at: Option<Duration>,
}

impl AdaptiveProvider {
    /// Creates a provider over `source`, using the wall monotonic clock.
    #[must_use]
    pub fn new(source: Box<dyn NativeTelemetrySource>, settings: ProviderSettings) -> Self {
        Self::with_clock(source, settings, Arc::new(MonotonicClock::new()))
    }

    /// Creates a provider with an injected clock, for deterministic
    /// debounce behavior in tests.
    #[must_use]
    pub fn with_clock(
        source: Box<dyn NativeTelemetrySource>,
        settings: ProviderSettings,
        clock: Arc<dyn FrameClock>,
    ) -> Self {
        let sampler = SamplingEngine::new(Arc::clone(&clock), settings.provider_logging);
        Self {
            settings,
            source,
            clock,
            state: LifecycleState::Uninitialized,
            capabilities: Feature::NONE,
            version: None,
            max_cpu_performance_level: DEFAULT_MAX_PERFORMANCE_LEVEL,
            max_gpu_performance_level: DEFAULT_MAX_PERFORMANCE_LEVEL,
            record: SharedRecord::new(Feature::NONE),
            sampler,
            warning_rx: None,
            last_update_at: None,
        }
    }

    /// Probes the native layer and computes the session capability set.
    ///
    /// Valid from `Uninitialized`; a no-op success when already
    /// initialized. Failure leaves the provider uninitialized with the
    /// native layer terminated: a malformed version string surfaces as
    /// [`ProviderError::VersionParse`], a below-baseline platform as
    /// [`ProviderError::CapabilityUnsupported`], and a native bring-up
    /// failure as [`ProviderError::NativeQuery`]. All are non-fatal to
    /// the host.
    pub fn try_initialize(&mut self) -> Result<(), ProviderError> {
        match self.state {
            LifecycleState::Destroyed => {
                return Err(self.invalid_transition("try_initialize"));
            }
            LifecycleState::Uninitialized => {}
            _ => return Ok(()),
        }

        if !self.source.initialize() {
            return Err(ProviderError::NativeQuery(SourceError::QueryFailed {
                reason: "native layer initialization failed".to_string(),
            }));
        }

        let raw_version = self.source.version();
        let (version, capabilities) = match detect_capabilities(&raw_version) {
            Ok(detected) => detected,
            Err(err) => {
                self.source.terminate();
                return Err(err);
            }
        };

        if capabilities.is_empty() {
            // Platform generation predates any telemetry support.
            self.source.terminate();
            return Err(ProviderError::CapabilityUnsupported {
                missing: Feature::CPU_PERFORMANCE_LEVEL
                    | Feature::GPU_PERFORMANCE_LEVEL
                    | Feature::WARNING_LEVEL,
            });
        }

        let max_cpu = self.source.max_cpu_performance_level();
        let max_gpu = self.source.max_gpu_performance_level();
        self.max_cpu_performance_level = if max_cpu < 0 {
            DEFAULT_MAX_PERFORMANCE_LEVEL
        } else {
            max_cpu
        };
        self.max_gpu_performance_level = if max_gpu < 0 {
            DEFAULT_MAX_PERFORMANCE_LEVEL
        } else {
            max_gpu
        };

        self.record = SharedRecord::new(capabilities);
        self.record
            .set_control_available(capabilities.contains(Feature::PERFORMANCE_LEVEL_CONTROL));
        self.warning_rx = self.source.take_warning_receiver();
        self.capabilities = capabilities;
        self.version = Some(version);
        self.state = LifecycleState::Initialized;

        if self.settings.provider_logging {
            log::debug!(
                "Provider initialized: platform {version}, capabilities {capabilities}"
            );
        }
        Ok(())
    }

    /// Begins sampling. Valid from `Initialized` or `Stopped`; a no-op
    /// success when already running.
    ///
    /// Seeds the record with an immediate refresh of every supported
    /// feature so the first consumer poll never observes defaults.
    pub fn start(&mut self) -> Result<(), ProviderError> {
        match self.state {
            LifecycleState::Running => Ok(()),
            LifecycleState::Initialized | LifecycleState::Stopped => {
                self.seed_record();
                self.state = LifecycleState::Running;
                Ok(())
            }
            _ => Err(self.invalid_transition("start")),
        }
    }

    /// Ceases sampling; the record retains its last values. Valid from
    /// `Running`, idempotent while `Stopped`.
    pub fn stop(&mut self) -> Result<(), ProviderError> {
        match self.state {
            LifecycleState::Running | LifecycleState::Stopped => {
                self.state = LifecycleState::Stopped;
                Ok(())
            }
            _ => Err(self.invalid_transition("stop")),
        }
    }

    /// Tears the provider down. Valid from any state; stops sampling
    /// first when running, terminates the native layer, and is terminal:
    /// every later lifecycle call fails.
    pub fn destroy(&mut self) -> Result<(), ProviderError> {
        if self.state == LifecycleState::Destroyed {
            return Ok(());
        }
        if self.state.is_running() {
            self.stop()?;
        }
        if self.state.is_initialized() {
            self.source.terminate();
        }
        self.capabilities = Feature::NONE;
        self.state = LifecycleState::Destroyed;
        Ok(())
    }

    /// The per-tick consumer poll.
    ///
    /// While running: reports a frame-pacing hint when level control is
    /// present, refreshes the undebounced features, runs the debounced
    /// thermal refresh, folds in pending native warning events, and
    /// drains an atomic snapshot. In any other state it returns an empty
    /// snapshot with no change flags.
    pub fn update(&mut self) -> PerformanceDataRecord {
        if !self.state.is_running() {
            return PerformanceDataRecord::default();
        }

        self.report_frame_hint();

        self.sampler.timed_update(
            Feature::PERFORMANCE_MODE,
            Duration::ZERO,
            self.source.as_mut(),
            &self.record,
        );

        // Settings come from user-editable JSON; an unrepresentable
        // interval must not fault the per-frame path.
        let thermal_interval =
            Duration::try_from_secs_f32(self.settings.thermal_sampling_interval_secs)
                .unwrap_or(DEFAULT_THERMAL_INTERVAL);
        self.sampler.timed_update(
            Feature::TEMPERATURE_LEVEL,
            thermal_interval,
            self.source.as_mut(),
            &self.record,
        );
        self.sampler.timed_update(
            Feature::TEMPERATURE_TREND,
            thermal_interval,
            self.source.as_mut(),
            &self.record,
        );

        self.drain_warning_events();
        self.record.drain_snapshot()
    }

    /// Requests specific CPU/GPU performance levels.
    ///
    /// The request is clamped in place against the provider's maximum
    /// levels. Returns `false` when the `PerformanceLevelControl`
    /// capability is absent or the native layer rejects the request.
    pub fn set_performance_level(&mut self, request: &mut PerformanceLevelRequest) -> bool {
        if !self.capabilities.contains(Feature::PERFORMANCE_LEVEL_CONTROL) {
            if self.settings.provider_logging {
                log::debug!("Performance level request ignored: control capability absent");
            }
            return false;
        }

        request.cpu_level = request.cpu_level.clamp(0, self.max_cpu_performance_level);
        request.gpu_level = request.gpu_level.clamp(0, self.max_gpu_performance_level);

        if !self
            .source
            .set_performance_level(request.cpu_level, request.gpu_level)
        {
            return false;
        }

        self.record
            .apply_update(FeatureValue::CpuPerformanceLevel(request.cpu_level));
        self.record
            .apply_update(FeatureValue::GpuPerformanceLevel(request.gpu_level));
        true
    }

    /// One-shot CPU boost request. Returns `false` when unsupported.
    pub fn enable_cpu_boost(&mut self) -> bool {
        if !self.capabilities.contains(Feature::PERFORMANCE_LEVEL_CONTROL) {
            return false;
        }
        self.source.enable_cpu_boost()
    }

    /// One-shot GPU boost request. Returns `false` when unsupported.
    pub fn enable_gpu_boost(&mut self) -> bool {
        if !self.capabilities.contains(Feature::PERFORMANCE_LEVEL_CONTROL) {
            return false;
        }
        self.source.enable_gpu_boost()
    }

    /// Host application moved to the background. Sampling state is kept.
    pub fn application_pause(&mut self) {}

    /// Host application returned to the foreground; thermal state and
    /// performance mode may be stale, so both are refreshed immediately.
    /// Ignored unless the provider is initialized.
    pub fn application_resume(&mut self) {
        if !self.state.is_initialized() {
            return;
        }
        self.sampler.immediate_update(
            Feature::TEMPERATURE_LEVEL,
            self.source.as_mut(),
            &self.record,
        );
        self.sampler.immediate_update(
            Feature::TEMPERATURE_TREND,
            self.source.as_mut(),
            &self.record,
        );
        self.sampler.immediate_update(
            Feature::PERFORMANCE_MODE,
            self.source.as_mut(),
            &self.record,
        );
    }

    /// One-line diagnostic summary.
    #[must_use]
    pub fn stats(&self) -> String {
        format!(
            "State={} Capabilities={} Version={}",
            self.state,
            self.capabilities,
            self.version
                .map(|v| v.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        )
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.state
    }

    /// The session capability set (empty until initialized).
    #[must_use]
    pub fn capabilities(&self) -> Feature {
        self.capabilities
    }

    /// The parsed platform version, once initialized.
    #[must_use]
    pub fn version(&self) -> Option<ProviderVersion> {
        self.version
    }

    /// Highest CPU performance level accepted by the control surface.
    #[must_use]
    pub fn max_cpu_performance_level(&self) -> i32 {
        self.max_cpu_performance_level
    }

    /// Highest GPU performance level accepted by the control surface.
    #[must_use]
    pub fn max_gpu_performance_level(&self) -> i32 {
        self.max_gpu_performance_level
    }

    /// The settings this provider was constructed with.
    #[must_use]
    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn seed_record(&mut self) {
        self.sampler.immediate_update(
            Feature::TEMPERATURE_LEVEL,
            self.source.as_mut(),
            &self.record,
        );
        self.sampler.immediate_update(
            Feature::TEMPERATURE_TREND,
            self.source.as_mut(),
            &self.record,
        );
        self.sampler.immediate_update(
            Feature::WARNING_LEVEL,
            self.source.as_mut(),
            &self.record,
        );
        self.sampler.immediate_update(
            Feature::PERFORMANCE_MODE,
            self.source.as_mut(),
            &self.record,
        );
    }

    fn report_frame_hint(&mut self) {
        let now = self.clock.now();
        if self.capabilities.contains(Feature::PERFORMANCE_LEVEL_CONTROL) {
            if let Some(previous) = self.last_update_at {
                let target_hz = self.settings.target_frame_rate.max(1.0);
                let hint = FrameTimingHint {
                    frame_time_ns: now.saturating_sub(previous).as_nanos() as u64,
                    target_duration_ns: (1_000_000_000.0 / f64::from(target_hz)) as u64,
                };
                self.source.report_frame_timing(hint);
            }
        }
        self.last_update_at = Some(now);
    }

    fn drain_warning_events(&mut self) {
        let Some(rx) = &self.warning_rx else {
            return;
        };
        for level in rx.try_iter() {
            self.record.apply_update(FeatureValue::WarningLevel(level));
        }
    }

    fn invalid_transition(&self, operation: &'static str) -> ProviderError {
        ProviderError::InvalidLifecycleTransition {
            from: self.state,
            operation,
        }
    }
}

impl std::fmt::Debug for AdaptiveProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveProvider")
            .field("state", &self.state)
            .field("capabilities", &self.capabilities)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use therma_core::{PerformanceMode, SourceError};

    struct StubSource {
        version: String,
        init_ok: bool,
    }

    impl StubSource {
        fn new(version: &str) -> Self {
            Self {
                version: version.to_string(),
                init_ok: true,
            }
        }
    }

    impl NativeTelemetrySource for StubSource {
        fn is_available(&self) -> bool {
            true
        }
        fn initialize(&mut self) -> bool {
            self.init_ok
        }
        fn terminate(&mut self) {}
        fn version(&mut self) -> String {
            self.version.clone()
        }
        fn temperature_level(&mut self) -> Result<f32, SourceError> {
            Ok(21.0)
        }
        fn thermal_warning_level(&mut self) -> Result<WarningLevel, SourceError> {
            Ok(WarningLevel::NoWarning)
        }
        fn performance_mode(&mut self) -> Result<PerformanceMode, SourceError> {
            Ok(PerformanceMode::Standard)
        }
    }

    fn provider(version: &str) -> AdaptiveProvider {
        AdaptiveProvider::new(Box::new(StubSource::new(version)), ProviderSettings::default())
    }

    #[test]
    fn test_start_before_initialize_fails() {
        let mut provider = provider("12.0");
        let err = provider.start().unwrap_err();
        assert!(matches!(
            err,
            ProviderError::InvalidLifecycleTransition {
                from: LifecycleState::Uninitialized,
                operation: "start",
            }
        ));
    }

    #[test]
    fn test_initialize_then_start_runs() {
        let mut provider = provider("12.0");
        provider.try_initialize().unwrap();
        assert_eq!(provider.lifecycle_state(), LifecycleState::Initialized);

        provider.start().unwrap();
        assert!(provider.lifecycle_state().is_running());

        // Start while running is a no-op success.
        provider.start().unwrap();
        assert!(provider.lifecycle_state().is_running());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut provider = provider("12.0");
        provider.try_initialize().unwrap();
        provider.try_initialize().unwrap();
        assert_eq!(provider.lifecycle_state(), LifecycleState::Initialized);
    }

    #[test]
    fn test_below_baseline_version_leaves_uninitialized() {
        let mut provider = provider("10.2");
        let err = provider.try_initialize().unwrap_err();
        assert!(matches!(err, ProviderError::CapabilityUnsupported { .. }));
        assert_eq!(provider.lifecycle_state(), LifecycleState::Uninitialized);
        assert!(provider.capabilities().is_empty());
    }

    #[test]
    fn test_malformed_version_leaves_uninitialized() {
        let mut provider = provider("1");
        let err = provider.try_initialize().unwrap_err();
        assert!(matches!(err, ProviderError::VersionParse { .. }));
        assert_eq!(provider.lifecycle_state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn test_native_init_failure_surfaces() {
        let mut source = StubSource::new("12.0");
        source.init_ok = false;
        let mut provider =
            AdaptiveProvider::new(Box::new(source), ProviderSettings::default());
        let err = provider.try_initialize().unwrap_err();
        assert!(matches!(err, ProviderError::NativeQuery(_)));
    }

    #[test]
    fn test_update_outside_running_returns_empty_snapshot() {
        let mut provider = provider("12.0");
        provider.try_initialize().unwrap();

        let snapshot = provider.update();
        assert_eq!(snapshot, PerformanceDataRecord::default());
    }

    #[test]
    fn test_destroy_from_running_is_terminal() {
        let mut provider = provider("12.0");
        provider.try_initialize().unwrap();
        provider.start().unwrap();

        provider.destroy().unwrap();
        assert_eq!(provider.lifecycle_state(), LifecycleState::Destroyed);

        assert!(provider.start().is_err());
        assert!(provider.stop().is_err());
        assert!(provider.try_initialize().is_err());

        // Destroy itself stays idempotent.
        provider.destroy().unwrap();
    }

    #[test]
    fn test_baseline_version_has_no_level_control() {
        let mut provider = provider("11.4");
        provider.try_initialize().unwrap();

        let max_before = provider.max_cpu_performance_level();
        let mut request = PerformanceLevelRequest {
            cpu_level: 2,
            gpu_level: 2,
        };
        assert!(!provider.set_performance_level(&mut request));
        assert_eq!(provider.max_cpu_performance_level(), max_before);
    }

    #[test]
    fn test_boosts_require_control_capability() {
        let mut provider = provider("11.0");
        provider.try_initialize().unwrap();
        assert!(!provider.enable_cpu_boost());
        assert!(!provider.enable_gpu_boost());
    }

    #[test]
    fn test_unrepresentable_thermal_interval_falls_back() {
        for interval in [f32::INFINITY, f32::NAN, -1.0] {
            let settings = ProviderSettings {
                thermal_sampling_interval_secs: interval,
                ..Default::default()
            };
            let mut provider =
                AdaptiveProvider::new(Box::new(StubSource::new("12.0")), settings);
            provider.try_initialize().unwrap();
            provider.start().unwrap();

            let snapshot = provider.update();
            assert!(snapshot.change_flags.contains(Feature::TEMPERATURE_LEVEL));
        }
    }

    #[test]
    fn test_resume_after_destroy_skips_native_queries() {
        use std::sync::atomic::{AtomicU32, Ordering};

        struct CountingSource {
            queries: Arc<AtomicU32>,
        }

        impl NativeTelemetrySource for CountingSource {
            fn is_available(&self) -> bool {
                true
            }
            fn initialize(&mut self) -> bool {
                true
            }
            fn terminate(&mut self) {}
            fn version(&mut self) -> String {
                "12.0".to_string()
            }
            fn temperature_level(&mut self) -> Result<f32, SourceError> {
                self.queries.fetch_add(1, Ordering::Relaxed);
                Ok(21.0)
            }
            fn thermal_warning_level(&mut self) -> Result<WarningLevel, SourceError> {
                Ok(WarningLevel::NoWarning)
            }
            fn performance_mode(&mut self) -> Result<PerformanceMode, SourceError> {
                self.queries.fetch_add(1, Ordering::Relaxed);
                Ok(PerformanceMode::Standard)
            }
        }

        let queries = Arc::new(AtomicU32::new(0));
        let source = CountingSource {
            queries: Arc::clone(&queries),
        };
        let mut provider =
            AdaptiveProvider::new(Box::new(source), ProviderSettings::default());
        provider.try_initialize().unwrap();
        provider.start().unwrap();
        provider.destroy().unwrap();

        let before = queries.load(Ordering::Relaxed);
        provider.application_resume();
        assert_eq!(queries.load(Ordering::Relaxed), before);
    }

    #[test]
    fn test_stats_mentions_state() {
        let mut provider = provider("12.0");
        provider.try_initialize().unwrap();
        let stats = provider.stats();
        assert!(stats.contains("Initialized"));
        assert!(stats.contains("12.0.0"));
    }
}
