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

//! # Therma Telemetry
//!
//! The adaptive-performance provider service: a mutex-guarded performance
//! data record, the debounced sampling engine that fills it, the provider
//! lifecycle state machine with its per-tick consumer poll, and the
//! host-facing loader.

#![warn(missing_docs)]

pub mod loader;
pub mod provider;
pub mod record;
pub mod sampler;

pub use loader::{ProviderDescriptor, ProviderLoader, PROVIDER_ID};
pub use provider::{AdaptiveProvider, DEFAULT_MAX_PERFORMANCE_LEVEL};
pub use record::SharedRecord;
pub use sampler::SamplingEngine;
