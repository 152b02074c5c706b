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

//! # Therma Core
//!
//! Foundational crate containing the traits, core types, and interface
//! contracts of the Therma adaptive-performance provider: capability
//! detection, the performance data record, the lifecycle state machine,
//! and the native telemetry source seam.

#![warn(missing_docs)]

pub mod capability;
pub mod error;
pub mod feature;
pub mod lifecycle;
pub mod record;
pub mod settings;
pub mod source;
pub mod time;
pub mod version;

pub use capability::{detect_capabilities, BASELINE_VERSION, EXTENDED_VERSION};
pub use error::{ProviderError, SourceError};
pub use feature::{Feature, FeatureValue};
pub use lifecycle::LifecycleState;
pub use record::{PerformanceDataRecord, PerformanceMode, WarningLevel};
pub use settings::{ProviderSettings, SettingsError};
pub use source::{FrameTimingHint, NativeTelemetrySource, PerformanceLevelRequest};
pub use time::{FrameClock, ManualClock, MonotonicClock};
pub use version::ProviderVersion;
