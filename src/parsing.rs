//! # Parsing Utilities
//!
//! Small combinators shared by the grammar matcher and the field converters.

use nom::{
    Err, Input, Mode, OutputMode, PResult, Parser,
    error::{ErrorKind, ParseError},
};

/// Ensures that the parser consumes all of its input.
///
/// Field converters run on a span that the grammar has already delimited, so a
/// conversion that leaves bytes behind (`12a` read as `12`) is a malformed field,
/// not a partial success.
///
/// # Arguments
///
/// * `f` - The parser to run
/// * `e` - Error kind to return if input is not fully consumed
///
/// # Examples
///
/// ```rust
/// use nmea0183_capture::{IResult, parsing::consumed};
/// use nom::{Parser, character::complete::u32, error::ErrorKind};
///
/// let mut parser = consumed(u32, ErrorKind::Digit);
/// let result: IResult<&[u8], u32> = parser.parse(&b"123519"[..]);
/// assert_eq!(result.map(|(_, v)| v), Ok(123519));
///
/// let result: IResult<&[u8], u32> = parser.parse(&b"1235x9"[..]);
/// assert!(result.is_err());
/// ```
pub fn consumed<I, E: ParseError<I>, F>(
    f: F,
    e: ErrorKind,
) -> impl Parser<I, Output = <F as Parser<I>>::Output, Error = E>
where
    I: Input,
    F: Parser<I, Error = E>,
{
    Consumed { f, e }
}

struct Consumed<F> {
    f: F,
    e: ErrorKind,
}

impl<I, F> Parser<I> for Consumed<F>
where
    I: Input,
    F: Parser<I>,
{
    type Output = <F as Parser<I>>::Output;
    type Error = <F as Parser<I>>::Error;

    fn process<OM: OutputMode>(&mut self, i: I) -> PResult<OM, I, Self::Output, Self::Error> {
        let (i, o) = self.f.process::<OM>(i)?;

        if i.input_len() != 0 {
            return Err(Err::Error(OM::Error::bind(|| {
                <F as Parser<I>>::Error::from_error_kind(i, self.e)
            })));
        }

        Ok((i, o))
    }
}
