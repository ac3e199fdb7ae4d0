//! Version values as published by package channels
//!
//! Channel versions are not semver: they carry an arbitrary number of numeric
//! segments (`1.23`, `2023.12.0`, `1.2.3.4`) and may end in a pre-release
//! marker (`5.0a1`, `4.2rc2`). Comparison pads the shorter version with zero
//! segments, so `1.23 == 1.23.0` and `1.4 < 1.4.1`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid version: {0:?}")]
    Invalid(String),
}

/// Pre-release marker attached to the last segment of a version.
///
/// Markers order `a < b < rc`, then by number, and any marked version orders
/// before the corresponding final release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreRelease {
    Alpha(u64),
    Beta(u64),
    Rc(u64),
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreRelease::Alpha(n) => write!(f, "a{n}"),
            PreRelease::Beta(n) => write!(f, "b{n}"),
            PreRelease::Rc(n) => write!(f, "rc{n}"),
        }
    }
}

/// A package version: numeric segments plus an optional pre-release marker.
#[derive(Debug, Clone, Default)]
pub struct Version {
    segments: Vec<u64>,
    pre_release: Option<PreRelease>,
}

impl Version {
    pub fn new(segments: Vec<u64>) -> Self {
        Self {
            segments,
            pre_release: None,
        }
    }

    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    pub fn is_preview(&self) -> bool {
        self.pre_release.is_some()
    }

    /// The segment at `index`, treating missing trailing segments as zero.
    fn segment_at(&self, index: usize) -> u64 {
        self.segments.get(index).copied().unwrap_or(0)
    }

    /// Pad with zero segments up to `length`. Never truncates.
    pub fn extend_to_length(&self, length: usize) -> Version {
        let mut segments = self.segments.clone();
        while segments.len() < length {
            segments.push(0);
        }
        Version {
            segments,
            pre_release: self.pre_release,
        }
    }

    /// The first `length` segments, for display at a coarser granularity
    /// (e.g. `1.23.2` → `1.23`). The pre-release marker survives only when
    /// nothing is cut off.
    pub fn with_segments(&self, length: usize) -> Version {
        if length >= self.segments.len() {
            return self.clone();
        }
        Version {
            segments: self.segments[..length].to_vec(),
            pre_release: None,
        }
    }

    /// Whether both versions share the same (major, minor) prefix.
    pub fn compatible_with(&self, other: &Version) -> bool {
        self.segment_at(0) == other.segment_at(0) && self.segment_at(1) == other.segment_at(1)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let length = self.segments.len().max(other.segments.len());
        for index in 0..length {
            match self.segment_at(index).cmp(&other.segment_at(index)) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        // Equal segments: a pre-release precedes the final release.
        match (&self.pre_release, &other.pre_release) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(left), Some(right)) => left.cmp(right),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
            first = false;
        }
        if let Some(pre_release) = &self.pre_release {
            write!(f, "{pre_release}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    /// Parse a dotted version string.
    ///
    /// Each segment is a non-negative integer; the last segment may carry an
    /// `a`/`b`/`rc` marker with an optional number ("5.0a1", "4.2rc").
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError::Invalid(text.to_string());

        let parts: Vec<&str> = text.split('.').collect();
        if parts.is_empty() || parts.iter().any(|part| part.is_empty()) {
            return Err(invalid());
        }

        let mut segments = Vec::with_capacity(parts.len());
        let mut pre_release = None;
        let last = parts.len() - 1;
        for (index, part) in parts.iter().enumerate() {
            let digits = part.len() - part.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            if digits == 0 {
                return Err(invalid());
            }
            let (number, suffix) = part.split_at(digits);
            segments.push(number.parse().map_err(|_| invalid())?);

            if suffix.is_empty() {
                continue;
            }
            // A marker is only meaningful on the final segment.
            if index != last {
                return Err(invalid());
            }
            pre_release = Some(parse_pre_release(suffix).ok_or_else(invalid)?);
        }

        Ok(Version {
            segments,
            pre_release,
        })
    }
}

fn parse_pre_release(suffix: &str) -> Option<PreRelease> {
    for (marker, build) in [
        ("rc", PreRelease::Rc as fn(u64) -> PreRelease),
        ("b", PreRelease::Beta),
        ("a", PreRelease::Alpha),
    ] {
        if let Some(rest) = suffix.strip_prefix(marker) {
            let number = if rest.is_empty() {
                0
            } else {
                rest.parse().ok()?
            };
            return Some(build(number));
        }
    }
    None
}
