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

//! # Therma Infra
//!
//! Concrete [`NativeTelemetrySource`](therma_core::NativeTelemetrySource)
//! implementations: a `sysinfo`-backed host source and a scripted
//! playback source for demos and tests.

#![warn(missing_docs)]

pub mod host;
pub mod scripted;

pub use host::HostTelemetrySource;
pub use scripted::ScriptedTelemetrySource;
