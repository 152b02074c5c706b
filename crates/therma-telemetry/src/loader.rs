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

//! Host-facing provider registration and lifecycle wrapper.
//!
//! The loader is the seam the host performance-management framework
//! talks to: it registers the provider descriptor when the native layer
//! is present, owns the provider instance, and forwards lifecycle calls
//! with the boolean contract the host expects.

use therma_core::{NativeTelemetrySource, ProviderSettings};

use crate::provider::AdaptiveProvider;

/// Identifier the provider registers under with the host framework.
pub const PROVIDER_ID: &str = "therma";

/// Registration metadata for one adaptive-performance provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDescriptor {
    /// Host-visible provider identifier.
    pub id: &'static str,
}

impl ProviderDescriptor {
    /// Registers a descriptor for `source`, or `None` when the native
    /// layer is absent on this device.
    pub fn register(source: &dyn NativeTelemetrySource) -> Option<ProviderDescriptor> {
        if !source.is_available() {
            log::debug!(
                "The native API for this provider is not available. Aborting provider descriptor registration."
            );
            return None;
        }
        Some(ProviderDescriptor { id: PROVIDER_ID })
    }
}

/// Owns a provider instance and adapts its lifecycle to the host's
/// boolean call contract.
#[derive(Debug)]
pub struct ProviderLoader {
    settings: ProviderSettings,
    provider: Option<AdaptiveProvider>,
}

impl ProviderLoader {
    /// Creates a loader with injected settings.
    #[must_use]
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            settings,
            provider: None,
        }
    }

    /// Creates the provider over `source` and probes its capabilities.
    ///
    /// Returns `true` when already initialized. On failure the provider
    /// is discarded and the single user-visible error is logged.
    pub fn initialize(&mut self, source: Box<dyn NativeTelemetrySource>) -> bool {
        if self.provider.is_some() {
            return true;
        }

        let mut provider = AdaptiveProvider::new(source, self.settings.clone());
        match provider.try_initialize() {
            Ok(()) => {
                self.provider = Some(provider);
                true
            }
            Err(err) => {
                log::error!("Unable to start the therma subsystem: {err}");
                false
            }
        }
    }

    /// Starts sampling. Returns `false` when not initialized or the
    /// transition is invalid.
    pub fn start(&mut self) -> bool {
        match self.provider.as_mut() {
            Some(provider) => provider.start().is_ok(),
            None => false,
        }
    }

    /// Stops sampling. Returns `false` when not initialized or the
    /// transition is invalid.
    pub fn stop(&mut self) -> bool {
        match self.provider.as_mut() {
            Some(provider) => provider.stop().is_ok(),
            None => false,
        }
    }

    /// Destroys and releases the provider. Returns `false` when there
    /// was nothing to deinitialize.
    pub fn deinitialize(&mut self) -> bool {
        match self.provider.take() {
            Some(mut provider) => {
                // Destroy from any live state never fails.
                let _ = provider.destroy();
                true
            }
            None => false,
        }
    }

    /// Returns `true` if a provider was created and initialized.
    #[must_use]
    pub fn initialized(&self) -> bool {
        self.provider
            .as_ref()
            .is_some_and(|p| p.lifecycle_state().is_initialized())
    }

    /// Returns `true` if the provider is currently sampling.
    #[must_use]
    pub fn running(&self) -> bool {
        self.provider
            .as_ref()
            .is_some_and(|p| p.lifecycle_state().is_running())
    }

    /// The settings injected at construction.
    #[must_use]
    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// The owned provider, if initialization succeeded. Only one
    /// provider exists per loader, so this is also the default one.
    #[must_use]
    pub fn default_provider(&mut self) -> Option<&mut AdaptiveProvider> {
        self.provider.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use therma_core::{PerformanceMode, SourceError, WarningLevel};

    struct StubSource {
        available: bool,
        version: String,
    }

    impl NativeTelemetrySource for StubSource {
        fn is_available(&self) -> bool {
            self.available
        }
        fn initialize(&mut self) -> bool {
            true
        }
        fn terminate(&mut self) {}
        fn version(&mut self) -> String {
            self.version.clone()
        }
        fn temperature_level(&mut self) -> Result<f32, SourceError> {
            Ok(20.0)
        }
        fn thermal_warning_level(&mut self) -> Result<WarningLevel, SourceError> {
            Ok(WarningLevel::NoWarning)
        }
        fn performance_mode(&mut self) -> Result<PerformanceMode, SourceError> {
            Ok(PerformanceMode::Standard)
        }
    }

    #[test]
    fn test_descriptor_requires_available_source() {
        let source = StubSource {
            available: false,
            version: "12.0".to_string(),
        };
        assert!(ProviderDescriptor::register(&source).is_none());

        let source = StubSource {
            available: true,
            version: "12.0".to_string(),
        };
        let descriptor = ProviderDescriptor::register(&source).unwrap();
        assert_eq!(descriptor.id, PROVIDER_ID);
    }

    #[test]
    fn test_loader_lifecycle_round_trip() {
        let mut loader = ProviderLoader::new(ProviderSettings::default());
        assert!(!loader.initialized());
        assert!(!loader.start());

        let source = StubSource {
            available: true,
            version: "12.0".to_string(),
        };
        assert!(loader.initialize(Box::new(source)));
        assert!(loader.initialized());
        assert!(!loader.running());

        assert!(loader.start());
        assert!(loader.running());

        assert!(loader.stop());
        assert!(!loader.running());

        assert!(loader.deinitialize());
        assert!(!loader.initialized());
        assert!(!loader.deinitialize());
    }

    #[test]
    fn test_loader_initialize_failure_discards_provider() {
        let mut loader = ProviderLoader::new(ProviderSettings::default());
        let source = StubSource {
            available: true,
            version: "10.0".to_string(),
        };
        assert!(!loader.initialize(Box::new(source)));
        assert!(!loader.initialized());
        assert!(loader.default_provider().is_none());
    }
}
