//! # Sentence Grammars
//!
//! One declarative grammar per sentence type. A grammar is the literal header
//! (`$`, a talker, the sentence formatter) followed by an ordered list of field
//! slots and the `*CC` checksum token. Each slot knows its leading separator and
//! what text it accepts; every slot can match the empty string except the
//! fixed-width ones, so an absent field is a zero-length span rather than a failure.
//!
//! The grammars are plain `static` data: they are built at compile time, never
//! change and are shared by reference.

mod matcher;

pub use matcher::{MAX_SPANS, SentenceMatch, Span};

use crate::{
    config::{SentenceSet, SentenceType, Talker},
    sentences::{
        FaaMode, FieldEnum, LatitudeHemisphere, LengthUnit, LongitudeHemisphere, Status, VtgLabel,
    },
};

/// Separator in front of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lead {
    /// `,`
    Comma,
    /// An optional `.`; used for the fractional seconds that follow `hhmmss`.
    OptionalDot,
}

/// What text a slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// A possibly empty run of digits: `\d*`.
    Digits,
    /// A loose decimal: `-?\d*\.?\d*` (the sign only when `signed`).
    Decimal { signed: bool },
    /// Exactly `width` digits.
    Fixed { width: usize },
    /// Exactly `width` digits (optionally signed) or nothing at all.
    OptionalFixed { width: usize, signed: bool },
    /// A single optional digit.
    Digit,
    /// A single optional character from the set.
    OneOf(&'static str),
    /// Two alphanumeric characters after the `*`.
    Checksum,
}

/// One field of a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub lead: Lead,
    pub kind: SlotKind,
}

impl Slot {
    /// A comma-separated field.
    pub const fn field(kind: SlotKind) -> Self {
        Slot {
            lead: Lead::Comma,
            kind,
        }
    }

    /// The fractional seconds directly following a `hhmmss` field.
    pub const fn fraction() -> Self {
        Slot {
            lead: Lead::OptionalDot,
            kind: SlotKind::Digits,
        }
    }

    /// A single-character field restricted to the letters of `E`.
    pub const fn enumerated<E: FieldEnum>() -> Self {
        Slot::field(SlotKind::OneOf(E::ALLOWED))
    }
}

const DECIMAL: SlotKind = SlotKind::Decimal { signed: false };
const SIGNED_DECIMAL: SlotKind = SlotKind::Decimal { signed: true };

/// The field layout of one sentence type.
#[derive(Debug, PartialEq, Eq)]
pub struct Grammar {
    pub sentence: SentenceType,
    /// Field slots, not including the checksum.
    pub slots: &'static [Slot],
    /// Also accept an empty field between the last slot and `*`.
    pub trailing_comma: bool,
}

impl Grammar {
    /// The grammar for `sentence`.
    pub fn for_type(sentence: SentenceType) -> &'static Grammar {
        match sentence {
            SentenceType::Fix => &GGA,
            SentenceType::RecommendedMinimum => &RMC,
            SentenceType::CourseSpeed => &VTG,
            SentenceType::TimeDate => &ZDA,
        }
    }

    /// Number of fields including the checksum (the whole-match span not counted).
    pub fn field_count(&self) -> usize {
        self.slots.len() + 1
    }
}

/// GGA - Global Positioning System Fix Data
///
/// ```text
///                                                            11        13
///         1      2  3         4 5          6 7 8  9   10   |  12    |  14  15   16
///         |      |  |         | |          | | |  |   |    |  |     |  |   |    |
///  $--GGA,hhmmss.ss,ddmm.mmmm,a,dddmm.mmmm,a,x,xx,x.x,x.x, M, x.x,  M, x.x,xxxx*hh
/// ```
pub static GGA: Grammar = Grammar {
    sentence: SentenceType::Fix,
    slots: &[
        Slot::field(SlotKind::Digits),             //  1) UTC time hhmmss
        Slot::fraction(),                          //  2) Fractional seconds
        Slot::field(DECIMAL),                      //  3) Latitude ddmm.mmmm
        Slot::enumerated::<LatitudeHemisphere>(),  //  4) N/S
        Slot::field(DECIMAL),                      //  5) Longitude dddmm.mmmm
        Slot::enumerated::<LongitudeHemisphere>(), //  6) E/W
        Slot::field(SlotKind::Digit),              //  7) Quality indicator
        Slot::field(SlotKind::Fixed { width: 2 }), //  8) Satellites in use
        Slot::field(DECIMAL),                      //  9) HDOP
        Slot::field(SIGNED_DECIMAL),               // 10) Antenna altitude
        Slot::enumerated::<LengthUnit>(),          // 11) Altitude unit
        Slot::field(SIGNED_DECIMAL),               // 12) Geoidal separation
        Slot::enumerated::<LengthUnit>(),          // 13) Separation unit
        Slot::field(DECIMAL),                      // 14) Age of differential correction
        Slot::field(SlotKind::Digits),             // 15) Reference station ID
    ],
    trailing_comma: false,
};

/// RMC - Recommended Minimum Navigation Information
///
/// ```text
///         1      2  3 4         5 6          7 8   9   10     11  12 13
///         |      |  | |         | |          | |   |   |      |   |  |
///  $--RMC,hhmmss.ss,A,ddmm.mmmm,a,dddmm.mmmm,a,x.x,x.x,ddmmyy,x.x,a, m*hh
/// ```
pub static RMC: Grammar = Grammar {
    sentence: SentenceType::RecommendedMinimum,
    slots: &[
        Slot::field(SlotKind::Digits),             //  1) UTC time hhmmss
        Slot::fraction(),                          //  2) Fractional seconds
        Slot::enumerated::<Status>(),              //  3) Status A/V
        Slot::field(DECIMAL),                      //  4) Latitude ddmm.mmmm
        Slot::enumerated::<LatitudeHemisphere>(),  //  5) N/S
        Slot::field(DECIMAL),                      //  6) Longitude dddmm.mmmm
        Slot::enumerated::<LongitudeHemisphere>(), //  7) E/W
        Slot::field(DECIMAL),                      //  8) Speed over ground, knots
        Slot::field(DECIMAL),                      //  9) Course over ground, degrees true
        Slot::field(SlotKind::Digits),             // 10) Date ddmmyy
        Slot::field(DECIMAL),                      // 11) Magnetic variation, degrees
        Slot::enumerated::<LongitudeHemisphere>(), // 12) Variation E/W
        Slot::enumerated::<FaaMode>(),             // 13) Mode indicator
    ],
    trailing_comma: false,
};

/// VTG - Track made good and Ground speed
///
/// ```text
///          1  2  3  4  5  6  7  8 9
///          |  |  |  |  |  |  |  | |
///  $--VTG,x.x,T,x.x,M,x.x,N,x.x,K,m*hh
/// ```
pub static VTG: Grammar = Grammar {
    sentence: SentenceType::CourseSpeed,
    slots: &[
        Slot::field(DECIMAL),                         // 1) Course over ground, degrees true
        Slot::field(SlotKind::OneOf(VtgLabel::TRUE)), // 2) T
        Slot::field(DECIMAL),                         // 3) Course over ground, degrees magnetic
        Slot::field(SlotKind::OneOf(VtgLabel::MAGNETIC)), // 4) M
        Slot::field(DECIMAL),                         // 5) Speed over ground, knots
        Slot::field(SlotKind::OneOf(VtgLabel::KNOTS)), // 6) N
        Slot::field(DECIMAL),                         // 7) Speed over ground, km/h
        Slot::field(SlotKind::OneOf(VtgLabel::KPH)),  // 8) K
        Slot::enumerated::<FaaMode>(),                // 9) Mode indicator
    ],
    trailing_comma: false,
};

/// ZDA - Time & Date - UTC, day, month, year and local time zone
///
/// ```text
///         1      2  3  4  5    6  7
///         |      |  |  |  |    |  |
///  $--ZDA,hhmmss.ss,xx,xx,xxxx,xx,xx*hh
/// ```
///
/// Some firmware sends a `,` after the zone minutes; both forms match.
pub static ZDA: Grammar = Grammar {
    sentence: SentenceType::TimeDate,
    slots: &[
        Slot::field(SlotKind::Digits), // 1) UTC time hhmmss
        Slot::fraction(),              // 2) Fractional seconds
        Slot::field(SlotKind::OptionalFixed {
            width: 2,
            signed: false,
        }), // 3) Day
        Slot::field(SlotKind::OptionalFixed {
            width: 2,
            signed: false,
        }), // 4) Month
        Slot::field(SlotKind::OptionalFixed {
            width: 4,
            signed: false,
        }), // 5) Year
        Slot::field(SlotKind::OptionalFixed {
            width: 2,
            signed: true,
        }), // 6) Local zone hours
        Slot::field(SlotKind::OptionalFixed {
            width: 2,
            signed: true,
        }), // 7) Local zone minutes
    ],
    trailing_comma: true,
};

/// The grammars of the enabled sentence types.
///
/// ```rust
/// use nmea0183_capture::{GrammarTable, SentenceSet, SentenceType, Talker};
///
/// let table = GrammarTable::new(SentenceSet::GGA);
/// let snapshot = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
///
/// let found = table.match_sentence(snapshot, SentenceType::Fix, Talker::GPS).unwrap();
/// assert_eq!(found.spans().len(), 17);
/// assert_eq!(found.text(snapshot, 3), b"4807.038");
///
/// // Disabled types never match.
/// assert!(table.match_sentence(snapshot, SentenceType::TimeDate, Talker::GPS).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarTable {
    grammars: heapless::Vec<&'static Grammar, 4>,
}

impl GrammarTable {
    pub fn new(enabled: SentenceSet) -> Self {
        GrammarTable {
            grammars: enabled.types().map(Grammar::for_type).collect(),
        }
    }

    /// The grammar for `sentence`, if that type is enabled.
    pub fn get(&self, sentence: SentenceType) -> Option<&'static Grammar> {
        self.grammars
            .iter()
            .copied()
            .find(|grammar| grammar.sentence == sentence)
    }

    /// Enabled grammars, in pass order.
    pub fn iter(&self) -> impl Iterator<Item = &'static Grammar> + '_ {
        self.grammars.iter().copied()
    }

    /// Finds the newest complete `sentence` in `snapshot`.
    ///
    /// Returns `None` when there is none or when the type is disabled.
    pub fn match_sentence(
        &self,
        snapshot: &[u8],
        sentence: SentenceType,
        talker: Talker,
    ) -> Option<SentenceMatch> {
        self.get(sentence)?.find(snapshot, talker)
    }
}
