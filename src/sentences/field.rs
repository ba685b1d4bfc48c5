use nom::{Parser, error::ErrorKind, number::complete::double};

use super::FieldEnum;
use crate::{
    Error, IResult,
    error::FieldError,
    grammar::{Grammar, SentenceMatch, SlotKind},
    parsing::consumed,
};

/// Walks the fields of a match in declared order.
///
/// Asking for more fields than the match holds yields empty fields.
#[derive(Debug, Clone)]
pub struct Fields<'a> {
    snapshot: &'a [u8],
    found: &'a SentenceMatch,
    grammar: &'static Grammar,
    index: usize,
}

impl<'a> Fields<'a> {
    pub fn new(snapshot: &'a [u8], found: &'a SentenceMatch, grammar: &'static Grammar) -> Self {
        Fields {
            snapshot,
            found,
            grammar,
            index: 0,
        }
    }

    /// The next field; its slot kind comes from the grammar, the checksum last.
    pub fn next_field(&mut self) -> Field<'a> {
        self.index += 1;

        let kind = self
            .grammar
            .slots
            .get(self.index - 1)
            .map_or(SlotKind::Checksum, |slot| slot.kind);

        Field {
            text: self.found.text(self.snapshot, self.index),
            kind,
        }
    }

    /// The two talker letters of the header.
    pub fn talker(&self) -> &'a [u8] {
        self.snapshot
            .get(self.found.talker().range())
            .unwrap_or_default()
    }
}

/// The text of one matched field, with typed conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    text: &'a [u8],
    kind: SlotKind,
}

impl<'a> Field<'a> {
    pub fn new(text: &'a [u8], kind: SlotKind) -> Self {
        Field { text, kind }
    }

    pub fn text(&self) -> &'a [u8] {
        self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The whole field as an unsigned integer.
    pub fn unsigned(&self) -> Result<u32, FieldError<'a>> {
        convert(self.text, nom::character::complete::u32)
    }

    /// The whole field as an unsigned integer that fits in `T`.
    pub fn integer<T: TryFrom<u32>>(&self) -> Result<T, FieldError<'a>> {
        let value = self.unsigned()?;
        T::try_from(value).map_err(|_| Error::InvalidField(self.text))
    }

    /// The whole field as a signed integer that fits in `T`.
    pub fn signed<T: TryFrom<i32>>(&self) -> Result<T, FieldError<'a>> {
        let value = convert(self.text, nom::character::complete::i32)?;
        T::try_from(value).map_err(|_| Error::InvalidField(self.text))
    }

    /// The whole field as a real number.
    pub fn real(&self) -> Result<f64, FieldError<'a>> {
        convert(self.text, double)
    }

    /// The integer part of a decimal field, e.g. `3` for `3.5`.
    pub fn integer_part(&self) -> Result<i8, FieldError<'a>> {
        let result: IResult<&[u8], i8> = nom::character::complete::i8(self.text);
        result
            .map(|(_, value)| value)
            .map_err(|_| Error::InvalidField(self.text))
    }

    /// A single character from the slot's allowed set, read as `T`.
    pub fn enumerated<T: FieldEnum>(&self) -> Option<T> {
        let [byte] = self.text else {
            return None;
        };

        if let SlotKind::OneOf(allowed) = self.kind
            && !allowed.as_bytes().contains(byte)
        {
            return None;
        }

        T::from_byte(*byte)
    }

    /// The field copied into a fixed-width string, truncated to `N` characters.
    pub fn fixed_text<const N: usize>(&self) -> heapless::String<N> {
        ascii_string(self.text)
    }
}

/// Copies the leading ASCII bytes of `bytes` that fit into `N` characters.
pub(crate) fn ascii_string<const N: usize>(bytes: &[u8]) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for &byte in bytes.iter().take_while(|byte| byte.is_ascii()) {
        if out.push(char::from(byte)).is_err() {
            break;
        }
    }
    out
}

/// Runs `parser` over the whole of `text`.
fn convert<'a, O, F>(text: &'a [u8], parser: F) -> Result<O, FieldError<'a>>
where
    F: Parser<&'a [u8], Output = O, Error = FieldError<'a>>,
{
    consumed(parser, ErrorKind::Eof)
        .parse(text)
        .map(|(_, value)| value)
        .map_err(|_| Error::InvalidField(text))
}

/// Converts a packed `DDMM.MMMM` / `DDDMM.MMMM` value to decimal degrees.
///
/// ```rust
/// use nmea0183_capture::sentences::decimal_degrees;
///
/// assert!((decimal_degrees(4807.038) - 48.1173).abs() < 1e-9);
/// assert!((decimal_degrees(1131.000) - 11.516_666_7).abs() < 1e-6);
/// ```
pub fn decimal_degrees(packed: f64) -> f64 {
    let degrees = (packed / 100.0).trunc();
    let minutes = packed % 100.0;
    degrees + minutes / 60.0
}

/// Converts decimal degrees back to the packed `DDMM.MMMM` form.
pub fn packed_degrees(decimal: f64) -> f64 {
    let degrees = decimal.trunc();
    let minutes = (decimal - degrees) * 60.0;
    degrees * 100.0 + minutes
}
