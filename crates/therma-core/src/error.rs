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

//! Error types for the adaptive-performance provider.
//!
//! Everything here is handled locally and converted to boolean or
//! `Result` returns at the provider boundary; nothing propagates to the
//! consumer as a panic.

use std::fmt;

use crate::feature::Feature;
use crate::lifecycle::LifecycleState;

/// A failure at the native telemetry boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The platform has no implementation for the queried feature.
    Unsupported,
    /// The native query ran but failed.
    QueryFailed {
        /// Diagnostic detail from the native layer.
        reason: String,
    },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Unsupported => {
                write!(f, "Feature is not available on this platform")
            }
            SourceError::QueryFailed { reason } => {
                write!(f, "Native telemetry query failed: {reason}")
            }
        }
    }
}

impl std::error::Error for SourceError {}

/// An error surfaced by the provider's public operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The platform version string could not be parsed. Non-fatal; the
    /// provider degrades to an empty capability set.
    VersionParse {
        /// The raw string that failed to parse.
        raw: String,
    },
    /// A lifecycle call was made in a state that forbids it.
    InvalidLifecycleTransition {
        /// State the provider was in when the call arrived.
        from: LifecycleState,
        /// Name of the rejected operation.
        operation: &'static str,
    },
    /// An operation required a capability the platform does not have.
    CapabilityUnsupported {
        /// The missing capability flags.
        missing: Feature,
    },
    /// A native-layer failure during initialization or sampling.
    NativeQuery(SourceError),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::VersionParse { raw } => {
                write!(f, "Malformed platform version string '{raw}'")
            }
            ProviderError::InvalidLifecycleTransition { from, operation } => {
                write!(f, "Operation '{operation}' is not valid in state {from}")
            }
            ProviderError::CapabilityUnsupported { missing } => {
                write!(f, "Platform does not support required capability {missing}")
            }
            ProviderError::NativeQuery(err) => {
                write!(f, "Native layer failure: {err}")
            }
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::NativeQuery(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SourceError> for ProviderError {
    fn from(err: SourceError) -> Self {
        ProviderError::NativeQuery(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ProviderError::VersionParse { raw: "x.y".into() };
        assert_eq!(err.to_string(), "Malformed platform version string 'x.y'");

        let err = ProviderError::InvalidLifecycleTransition {
            from: LifecycleState::Destroyed,
            operation: "start",
        };
        assert_eq!(
            err.to_string(),
            "Operation 'start' is not valid in state Destroyed"
        );
    }

    #[test]
    fn test_source_error_wraps() {
        let err: ProviderError = SourceError::Unsupported.into();
        assert!(matches!(err, ProviderError::NativeQuery(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
