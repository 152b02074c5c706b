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

//! The provider's coarse operating phase.

use std::fmt;

/// Lifecycle phase of an adaptive-performance provider.
///
/// Transitions: Uninitialized → Initialized → Running ⇄ Stopped, and from
/// any non-Destroyed state to Destroyed. Destroyed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Constructed but not initialized, or initialization failed.
    #[default]
    Uninitialized,
    /// Capability probe succeeded; sampling has not started.
    Initialized,
    /// Sampling is active; `update()` produces snapshots.
    Running,
    /// Sampling stopped; the record keeps its last values.
    Stopped,
    /// Terminal state; every further lifecycle call fails.
    Destroyed,
}

impl LifecycleState {
    /// Returns `true` if sampling is currently active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, LifecycleState::Running)
    }

    /// Returns `true` if the provider passed its capability probe and has
    /// not been destroyed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        matches!(
            self,
            LifecycleState::Initialized | LifecycleState::Running | LifecycleState::Stopped
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
