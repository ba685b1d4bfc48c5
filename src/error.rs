//! # Error Types
//!
//! This module defines the error types used by the grammar matcher and the field
//! converters. None of them ever reach the caller of [`Engine::process`]: a sentence
//! that fails to frame is simply a *no match* for that pass, and a field that fails
//! to convert falls back to zero (or its sentinel) without touching validity flags.
//!
//! [`Engine::process`]: crate::Engine::process

use nom::error::{ErrorKind, FromExternalError, ParseError};

/// Holds the result of parsing functions.
///
/// It depends on the input type `I`, the output type `O`, and the error type `E`
/// (by default `nom::error::Error<I>`).
///
/// The `Ok` side is a pair containing the remainder of the input (the part of the data that
/// was not parsed) and the produced value. The `Err` side contains an instance of `nom::Err`.
pub type IResult<I, O, E = nom::error::Error<I>> = nom::IResult<I, O, Error<I, E>>;

/// Represents all possible failures while framing or converting a sentence.
#[derive(Debug, PartialEq)]
pub enum Error<I, E> {
    /// The sentence could not be framed because its layout did not match the grammar.
    ///
    /// This wraps nom's standard parsing errors.
    ParsingError(E),

    /// A sentence framed correctly but declared more fields than a match can hold.
    TooManyFields,

    /// A field matched the grammar's loose pattern but could not be converted
    /// to its typed value (for instance `.` in a numeric slot).
    ///
    /// Contains the input that caused the error.
    InvalidField(I),
}

/// The error of a failed field conversion.
pub type FieldError<'a> = Error<&'a [u8], nom::error::Error<&'a [u8]>>;

impl<I, E> ParseError<I> for Error<I, E>
where
    E: ParseError<I>,
{
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        Error::ParsingError(E::from_error_kind(input, kind))
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<I, E, EX> FromExternalError<I, EX> for Error<I, E>
where
    E: FromExternalError<I, EX>,
{
    fn from_external_error(input: I, kind: ErrorKind, e: EX) -> Self {
        Error::ParsingError(E::from_external_error(input, kind, e))
    }
}
