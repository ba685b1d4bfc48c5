//! # Engine Configuration
//!
//! Everything that is decided once, when the engine is built: which sentence types
//! exist at all, how coordinates are signed, which talkers are accepted and what
//! happens to bytes that have already been decoded.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{buffer::DEFAULT_CAPACITY, checksum::ChecksumMode, flush::FlushPolicy};

/// The sentence types the engine knows how to decode.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentenceType {
    /// GGA - Global Positioning System Fix Data
    Fix,
    /// RMC - Recommended Minimum Navigation Information
    RecommendedMinimum,
    /// VTG - Track made good and Ground speed
    CourseSpeed,
    /// ZDA - Time & Date
    TimeDate,
}

impl SentenceType {
    /// Every sentence type, in the order a processing pass visits them.
    pub const ALL: [SentenceType; 4] = [
        SentenceType::Fix,
        SentenceType::RecommendedMinimum,
        SentenceType::CourseSpeed,
        SentenceType::TimeDate,
    ];

    /// The three-letter sentence formatter, e.g. `GGA`.
    pub const fn formatter(self) -> &'static str {
        match self {
            SentenceType::Fix => "GGA",
            SentenceType::RecommendedMinimum => "RMC",
            SentenceType::CourseSpeed => "VTG",
            SentenceType::TimeDate => "ZDA",
        }
    }

    /// The flag for this type in a [`SentenceSet`].
    pub const fn flag(self) -> SentenceSet {
        match self {
            SentenceType::Fix => SentenceSet::GGA,
            SentenceType::RecommendedMinimum => SentenceSet::RMC,
            SentenceType::CourseSpeed => SentenceSet::VTG,
            SentenceType::TimeDate => SentenceSet::ZDA,
        }
    }
}

bitflags::bitflags! {
    /// A set of sentence types.
    ///
    /// ```rust
    /// use nmea0183_capture::{SentenceSet, SentenceType};
    ///
    /// let set = SentenceSet::GGA | SentenceSet::ZDA;
    /// let types: Vec<_> = set.types().collect();
    /// assert_eq!(types, [SentenceType::Fix, SentenceType::TimeDate]);
    /// ```
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SentenceSet: u8 {
        const GGA = 1;
        const RMC = 1 << 1;
        const VTG = 1 << 2;
        const ZDA = 1 << 3;
    }
}

impl SentenceSet {
    /// The sentence types in this set, in pass order.
    pub fn types(self) -> impl Iterator<Item = SentenceType> {
        SentenceType::ALL
            .into_iter()
            .filter(move |ty| self.contains(ty.flag()))
    }

    pub fn contains_type(self, ty: SentenceType) -> bool {
        self.contains(ty.flag())
    }
}

impl Default for SentenceSet {
    fn default() -> Self {
        SentenceSet::all()
    }
}

impl From<SentenceType> for SentenceSet {
    fn from(value: SentenceType) -> Self {
        value.flag()
    }
}

/// How the sign of a coordinate is reported.
///
/// Receivers disagree on this across firmware revisions, so both conventions are
/// supported. In both, the hemisphere letter is also kept in its own field.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateConvention {
    #[default]
    /// Southern latitudes and western longitudes are negative.
    Signed,

    /// Coordinates are always positive; read the hemisphere field for the sign.
    Hemisphere,
}

/// What happens to buffered bytes once a sentence in them has been decoded.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    #[default]
    /// Discard everything up to the end of the furthest decoded sentence.
    ///
    /// A decoded sentence is never decoded twice, and a sentence still streaming
    /// in behind it is kept.
    Consume,

    /// Leave the buffer untouched; it is only cleared by the flush policy.
    ///
    /// The same sentence is decoded again (and its record re-stamped) on every
    /// pass until the buffer is flushed.
    Retain,
}

/// Which talker IDs a grammar's header accepts.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Talker {
    /// Exactly this two-letter talker, e.g. `GP`.
    Exact([u8; 2]),

    /// Any two upper-case letters (`GP`, `GN`, `GL`, `GA`, ...).
    Any,
}

impl Talker {
    /// The GPS talker, `GP`.
    pub const GPS: Talker = Talker::Exact(*b"GP");

    /// `true` if `id` is accepted.
    pub fn accepts(&self, id: &[u8]) -> bool {
        match self {
            Talker::Exact(expected) => id == expected,
            Talker::Any => id.len() == 2 && id.iter().all(u8::is_ascii_uppercase),
        }
    }
}

impl Default for Talker {
    fn default() -> Self {
        Talker::GPS
    }
}

/// Resolved configuration of an [`Engine`](crate::Engine).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Capture buffer capacity in bytes.
    pub capacity: usize,
    /// When an unproductive buffer is cleared.
    pub flush_policy: FlushPolicy,
    /// What happens to bytes after a successful decode.
    pub retention: Retention,
    /// Sentence types that get a grammar, a decoder and a record.
    pub sentences: SentenceSet,
    /// Sign convention for latitude and longitude.
    pub coordinates: CoordinateConvention,
    /// Checksum handling.
    pub checksum: ChecksumMode,
    /// Accepted talker IDs.
    pub talker: Talker,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            capacity: DEFAULT_CAPACITY,
            flush_policy: FlushPolicy::default(),
            retention: Retention::default(),
            sentences: SentenceSet::default(),
            coordinates: CoordinateConvention::default(),
            checksum: ChecksumMode::default(),
            talker: Talker::default(),
        }
    }
}
