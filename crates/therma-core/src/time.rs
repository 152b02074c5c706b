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

//! Monotonic session clocks used for sampling debounce.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A monotonic clock measuring time since session start.
///
/// Injected into the sampling engine so debounce behavior is testable
/// without sleeping.
pub trait FrameClock: Send + Sync {
    /// Time elapsed since the clock was created.
    fn now(&self) -> Duration;
}

/// Production clock backed by [`Instant`].
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose origin is the moment of construction.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A manually advanced clock for deterministic tests and scripted demos.
///
/// Cloned handles share the same time, so a test can keep one handle and
/// advance it while the sampling engine reads another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += delta;
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }
}
