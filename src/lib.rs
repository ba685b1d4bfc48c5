//! # NMEA 0183 Capture Engine
//!
//! This library turns the byte stream of a GPS receiver into typed navigation
//! records. Bytes arrive one at a time, the way a UART interrupt delivers them,
//! and are framed into sentences of the form:
//! `$TTSSS,D1,D2,...,Dn*CC\r\n`
//!
//! Four sentence types are decoded:
//! - GGA: Global Positioning System Fix Data ([`FixData`])
//! - RMC: Recommended Minimum Navigation Information ([`RecommendedMinimum`])
//! - VTG: Track made good and Ground speed ([`CourseSpeed`])
//! - ZDA: Time & Date ([`TimeDate`])
//!
//! The engine is configurable to handle:
//! - The buffer size and when an unproductive buffer is flushed
//! - Whether decoded bytes are consumed or retained
//! - Which sentence types are enabled
//! - Signed or hemisphere-letter coordinates
//! - Checksum verification and the accepted talker IDs
//!
//! ## Usage
//!
//! ```rust
//! use nmea0183_capture::{EngineBuilder, InstantClock, SentenceSet, Timestamp};
//!
//! let mut engine = EngineBuilder::new()
//!     .sentences(SentenceSet::GGA | SentenceSet::VTG)
//!     .build();
//!
//! // The producer half usually lives in a serial interrupt or a reader thread.
//! let intake = engine.intake(InstantClock::new());
//! for &byte in b"$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*25\r\n" {
//!     intake.on_byte_received(byte);
//! }
//!
//! // The consumer half is polled.
//! let report = engine.process(Timestamp::from_millis(10));
//! assert_eq!(report.decoded, SentenceSet::VTG);
//!
//! let vtg = engine.course_speed().unwrap();
//! assert_eq!(vtg.speed_knots.value, 5.5);
//! ```

pub mod buffer;
pub mod checksum;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod flush;
pub mod grammar;
pub mod parsing;
pub mod sentences;

pub use buffer::{CaptureBuffer, DEFAULT_CAPACITY};
pub use checksum::{ChecksumMode, checksum, format_checksum, parse_checksum_token};
pub use clock::{Clock, InstantClock, ManualClock, Rearm, Timestamp};
pub use config::{CoordinateConvention, EngineConfig, Retention, SentenceSet, SentenceType, Talker};
pub use engine::{ByteIntake, DecodeOutcome, Engine, EngineBuilder, ProcessReport, Rejection};
pub use error::{Error, IResult};
pub use flush::{FlushPolicy, FlushReason};
pub use grammar::{GrammarTable, SentenceMatch, Span};
pub use sentences::{CourseSpeed, FixData, RecommendedMinimum, TimeDate};

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
struct README;

#[cfg(test)]
mod tests {
    mod flushing;
    mod stream;
}
