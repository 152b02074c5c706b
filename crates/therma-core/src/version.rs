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

//! Parsed platform/OS version used for capability gating.

use std::fmt;
use std::str::FromStr;

use crate::error::ProviderError;

/// A platform version in `major.minor[.patch]` form.
///
/// A bare major component is rejected: platform version strings always
/// carry at least a minor component, and a lone number usually signals a
/// stubbed or broken native layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProviderVersion {
    /// Major version component.
    pub major: u32,
    /// Minor version component.
    pub minor: u32,
    /// Patch version component, zero when absent.
    pub patch: u32,
}

impl ProviderVersion {
    /// Creates a version from explicit components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for ProviderVersion {
    type Err = ProviderError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || ProviderError::VersionParse {
            raw: raw.to_string(),
        };

        let mut parts = raw.trim().split('.');
        let major = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(malformed)?
            .parse::<u32>()
            .map_err(|_| malformed())?;
        let minor = parts
            .next()
            .ok_or_else(malformed)?
            .parse::<u32>()
            .map_err(|_| malformed())?;
        let patch = match parts.next() {
            Some(p) => p.parse::<u32>().map_err(|_| malformed())?,
            None => 0,
        };
        if parts.next().is_some() {
            return Err(malformed());
        }

        Ok(ProviderVersion::new(major, minor, patch))
    }
}

impl fmt::Display for ProviderVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
