//! # Field Decoders
//!
//! One record type per sentence type. A decoder walks the spans of a
//! [`SentenceMatch`](crate::SentenceMatch) in declared order and writes each field
//! into its record in place:
//!
//! | Record                   | Sentence | Description                                |
//! |--------------------------|----------|--------------------------------------------|
//! | [`FixData`]              | GGA      | Global Positioning System Fix Data         |
//! | [`RecommendedMinimum`]   | RMC      | Recommended Minimum Navigation Information |
//! | [`CourseSpeed`]          | VTG      | Track made good and Ground speed           |
//! | [`TimeDate`]             | ZDA      | Time & Date                                |
//!
//! Decoding never fails once a sentence has framed:
//!
//! - a numeric field that does not convert reads as zero (or its sentinel) and
//!   leaves validity flags alone;
//! - a single-character field is only stored when the character belongs to the
//!   field's allowed set, otherwise the previous value stays;
//! - text fields are copied and truncated to their fixed width.

mod field;
mod gga;
mod rmc;
mod vtg;
mod zda;

pub use field::{Field, Fields, decimal_degrees, packed_degrees};
pub use gga::{FixData, NO_CORRECTION_AGE};
pub use rmc::RecommendedMinimum;
pub use vtg::{CourseSpeed, Labelled};
pub use zda::TimeDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    clock::Timestamp,
    config::{CoordinateConvention, SentenceType},
};

/// Everything a decoder needs besides the fields themselves.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    /// Tick of the processing pass; becomes the record's `updated_at`.
    pub now: Timestamp,
    pub coordinates: CoordinateConvention,
    /// The talker letters of the matched header.
    pub talker: &'a [u8],
}

/// A record that can be updated from a matched sentence.
pub trait Decode: Default {
    /// The sentence type this record is decoded from.
    const SENTENCE: SentenceType;

    /// Writes the fields of a matched sentence into `self`.
    fn decode(&mut self, fields: &mut Fields<'_>, ctx: &DecodeContext<'_>);
}

/// A single-character field with a closed set of values.
pub trait FieldEnum: Sized + Copy {
    /// Every character the field may hold.
    const ALLOWED: &'static str;

    /// The value for `byte`, if it is one of [`Self::ALLOWED`].
    fn from_byte(byte: u8) -> Option<Self>;

    /// The character this value is transmitted as.
    fn as_char(self) -> char;
}

macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $char:literal => $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl FieldEnum for $name {
            const ALLOWED: &'static str = concat!($($char),*);

            fn from_byte(byte: u8) -> Option<Self> {
                match char::from(byte) {
                    $($char => Some(Self::$variant),)*
                    _ => None,
                }
            }

            fn as_char(self) -> char {
                match self {
                    $(Self::$variant => $char,)*
                }
            }
        }
    };
}

field_enum! {
    /// Latitude hemisphere
    pub enum LatitudeHemisphere {
        /// N - North
        'N' => North,
        /// S - South
        'S' => South,
    }
}

field_enum! {
    /// Longitude hemisphere, also the direction of a magnetic variation
    pub enum LongitudeHemisphere {
        /// E - East
        'E' => East,
        /// W - West
        'W' => West,
    }
}

field_enum! {
    /// Unit of a length field
    pub enum LengthUnit {
        /// M - Meters
        'M' => Meters,
        /// F - Feet
        'F' => Feet,
    }
}

field_enum! {
    /// Status Mode Indicator
    pub enum Status {
        /// A - Valid
        'A' => Valid,
        /// V - Navigation receiver warning
        'V' => Warning,
    }
}

field_enum! {
    /// FAA Mode Indicator
    pub enum FaaMode {
        /// A - Autonomous mode
        'A' => Autonomous,
        /// D - Differential Mode
        'D' => Differential,
        /// E - Estimated (dead-reckoning) mode
        'E' => Estimated,
        /// N - Data Not Valid
        'N' => DataNotValid,
    }
}

field_enum! {
    /// The label letter following each VTG value
    pub enum VtgLabel {
        /// T - Degrees true
        'T' => True,
        /// M - Degrees magnetic
        'M' => Magnetic,
        /// N - Knots
        'N' => Knots,
        /// K - Kilometers per hour
        'K' => Kph,
    }
}

impl VtgLabel {
    pub const TRUE: &'static str = "T";
    pub const MAGNETIC: &'static str = "M";
    pub const KNOTS: &'static str = "N";
    pub const KPH: &'static str = "K";
}

/// A hemisphere letter that decides the sign of a coordinate.
pub trait Hemisphere: FieldEnum {
    /// `true` for the southern and western hemispheres.
    fn is_negative(self) -> bool;
}

impl Hemisphere for LatitudeHemisphere {
    fn is_negative(self) -> bool {
        self == LatitudeHemisphere::South
    }
}

impl Hemisphere for LongitudeHemisphere {
    fn is_negative(self) -> bool {
        self == LongitudeHemisphere::West
    }
}

/// A latitude or longitude in decimal degrees.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate<H> {
    /// Decimal degrees. Negative for S/W only under [`CoordinateConvention::Signed`].
    pub value: f64,
    /// The coordinate field was present and converted.
    pub valid: bool,
    /// The last hemisphere letter received; cleared when the coordinate is empty.
    pub hemisphere: Option<H>,
}

impl<H> Default for Coordinate<H> {
    fn default() -> Self {
        Coordinate {
            value: 0.0,
            valid: false,
            hemisphere: None,
        }
    }
}

impl<H: Hemisphere> Coordinate<H> {
    fn decode(&mut self, value: Field<'_>, hemisphere: Field<'_>, convention: CoordinateConvention) {
        if value.is_empty() {
            self.value = 0.0;
            self.valid = false;
            self.hemisphere = None;
            return;
        }

        let current = hemisphere.enumerated::<H>();
        if current.is_some() {
            self.hemisphere = current;
        }

        let Ok(packed) = value.real() else {
            self.value = 0.0;
            return;
        };

        // Only this sentence's letter decides the sign.
        let degrees = decimal_degrees(packed);
        let negative = convention == CoordinateConvention::Signed
            && current.is_some_and(Hemisphere::is_negative);

        self.value = if negative { -degrees } else { degrees };
        self.valid = true;
    }
}

/// UTC time of day as transmitted: `hhmmss` plus an optional fraction.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UtcTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// The digits after the decimal point, as an integer.
    pub fraction: u32,
    /// How many digits `fraction` was written with.
    pub fraction_digits: u8,
}

impl UtcTime {
    fn decode(time: Field<'_>, fraction: Field<'_>) -> Self {
        let hhmmss = time.unsigned().unwrap_or(0);
        let digits = fraction.text().len();

        UtcTime {
            hour: split_pair(hhmmss, 10_000),
            minute: split_pair(hhmmss, 100),
            second: split_pair(hhmmss, 1),
            fraction: fraction.unsigned().unwrap_or(0),
            fraction_digits: u8::try_from(digits).unwrap_or(u8::MAX),
        }
    }

    /// The time of day, or `None` if a component is out of range.
    ///
    /// ```rust
    /// use nmea0183_capture::sentences::UtcTime;
    ///
    /// let utc = UtcTime { hour: 15, minute: 30, second: 45, fraction: 25, fraction_digits: 2 };
    /// let time = utc.to_time().unwrap();
    /// assert_eq!(time.millisecond(), 250);
    ///
    /// let utc = UtcTime { hour: 25, ..utc };
    /// assert!(utc.to_time().is_none());
    /// ```
    pub fn to_time(&self) -> Option<time::Time> {
        let scale = 10u32.checked_pow(9u32.checked_sub(u32::from(self.fraction_digits))?)?;
        let nanos = self.fraction.checked_mul(scale)?;

        time::Time::from_hms_nano(self.hour, self.minute, self.second, nanos).ok()
    }
}

/// A calendar date as transmitted.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UtcDate {
    pub day: u8,
    pub month: u8,
    /// Full year; two-digit years are taken to be 20yy.
    pub year: u16,
}

impl UtcDate {
    /// Reads a packed `ddmmyy` field.
    fn decode_packed(date: Field<'_>) -> Self {
        let Ok(ddmmyy) = date.unsigned() else {
            return UtcDate::default();
        };

        UtcDate {
            day: split_pair(ddmmyy, 10_000),
            month: split_pair(ddmmyy, 100),
            year: 2000 + u16::from(split_pair(ddmmyy, 1)),
        }
    }

    /// The calendar date, or `None` if it does not exist.
    pub fn to_date(&self) -> Option<time::Date> {
        let month = time::Month::try_from(self.month).ok()?;
        time::Date::from_calendar_date(i32::from(self.year), month, self.day).ok()
    }
}

/// Two decimal digits of `value` starting at `unit`.
fn split_pair(value: u32, unit: u32) -> u8 {
    // Always below 100.
    (value / unit % 100) as u8
}
