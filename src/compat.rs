//! Host platform version gate
//!
//! The utilities in this crate were introduced natively by the host platform
//! in release 6.4. On older hosts the compatibility layer must be active; on
//! 6.4 and later the host's own implementations take precedence and the
//! layer is a no-op. This module supplies the version type and the gate
//! decision; wiring the decision into an embedding is the host's concern.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Platform release that introduced these utilities natively.
pub const NATIVE_SINCE: &str = "6.4";

/// A dotted numeric platform version, e.g. `"6.4"` or `"6.3.2"`.
///
/// Comparison is component-wise with shorter versions ordering first on a
/// tie, matching the platform's own comparison rules (`6.4 < 6.4.0`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlatformVersion {
    parts: Vec<u32>,
}

impl PlatformVersion {
    /// Build a version from its numeric components.
    pub fn from_parts(parts: impl Into<Vec<u32>>) -> Self {
        Self {
            parts: parts.into(),
        }
    }

    /// The numeric components.
    pub fn parts(&self) -> &[u32] {
        &self.parts
    }
}

impl FromStr for PlatformVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let parts = s
            .split('.')
            .map(|component| {
                component
                    .parse::<u32>()
                    .map_err(|_| VersionParseError::InvalidComponent {
                        version: s.to_string(),
                        component: component.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { parts })
    }
}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in &self.parts {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{part}")?;
            first = false;
        }
        Ok(())
    }
}

/// Version string parse errors
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    /// The version string was empty
    #[error("version string is empty")]
    Empty,

    /// A dotted component was not a non-negative integer
    #[error("invalid version component {component:?} in {version:?}")]
    InvalidComponent { version: String, component: String },
}

/// The version the native implementations shipped in.
pub fn native_since() -> PlatformVersion {
    PlatformVersion::from_parts([6, 4])
}

/// Whether a host at `host` still needs this compatibility layer.
///
/// Returns `true` when the host predates the native introduction; `false`
/// from 6.4 onwards, where the layer must stay inert.
pub fn shim_required(host: &PlatformVersion) -> bool {
    host.cmp(&native_since()) == Ordering::Less
}
