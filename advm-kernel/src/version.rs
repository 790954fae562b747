use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumIter, EnumString};

use crate::error::KernelError;

/// Engine releases, in the order they shipped.
///
/// The derived `Ord` is the release order; a game targets exactly one of these,
/// and every kernel map entry is scoped to an inclusive range of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter)]
#[repr(u8)]
pub enum EngineVersion {
    #[strum(to_string = "0-early")]
    Early0,
    #[strum(to_string = "0-late")]
    Late0,
    #[strum(to_string = "01")]
    V01,
    #[strum(to_string = "1-ega")]
    V1EgaOnly,
    #[strum(to_string = "1-early")]
    V1Early,
    #[strum(to_string = "1-middle")]
    V1Middle,
    #[strum(to_string = "1-late")]
    V1Late,
    #[strum(to_string = "1.1")]
    V1_1,
    #[strum(to_string = "2")]
    V2,
    #[strum(to_string = "2.1-early")]
    V2_1Early,
    #[strum(to_string = "2.1-middle")]
    V2_1Middle,
    #[strum(to_string = "2.1-late")]
    V2_1Late,
    #[strum(to_string = "3")]
    V3,
}

impl EngineVersion {
    pub const FIRST: EngineVersion = EngineVersion::Early0;
    pub const LAST: EngineVersion = EngineVersion::V3;

    #[inline]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }
}

impl Serialize for EngineVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EngineVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::custom(format!("unknown engine version {s:?}")))
    }
}

/// An inclusive `[from, to]` interval of engine versions.
///
/// The constant constructors assert `from <= to`, so an inverted range written
/// into a `const` or `static` kernel map fails to compile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VersionRange {
    from: EngineVersion,
    to: EngineVersion,
}

impl VersionRange {
    pub const EVERYWHERE: VersionRange =
        VersionRange::between(EngineVersion::FIRST, EngineVersion::LAST);

    pub const fn between(from: EngineVersion, to: EngineVersion) -> Self {
        assert!(from.ordinal() <= to.ordinal(), "version range is inverted");
        Self { from, to }
    }

    pub const fn only(version: EngineVersion) -> Self {
        Self {
            from: version,
            to: version,
        }
    }

    pub const fn since(version: EngineVersion) -> Self {
        Self {
            from: version,
            to: EngineVersion::LAST,
        }
    }

    pub const fn until(version: EngineVersion) -> Self {
        Self {
            from: EngineVersion::FIRST,
            to: version,
        }
    }

    /// Runtime counterpart of [`VersionRange::between`] for ranges that are not
    /// known at compile time.
    pub fn try_between(from: EngineVersion, to: EngineVersion) -> Result<Self, KernelError> {
        if from > to {
            return Err(KernelError::InvertedRange { from, to });
        }
        Ok(Self { from, to })
    }

    #[inline]
    pub const fn start(&self) -> EngineVersion {
        self.from
    }

    #[inline]
    pub const fn end(&self) -> EngineVersion {
        self.to
    }

    #[inline]
    pub fn contains(&self, version: EngineVersion) -> bool {
        self.from <= version && version <= self.to
    }

    pub fn overlaps(&self, other: &VersionRange) -> bool {
        self.from <= other.to && other.from <= self.to
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from == self.to {
            write!(f, "[{}]", self.from)
        } else {
            write!(f, "[{}, {}]", self.from, self.to)
        }
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
