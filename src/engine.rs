//! # Capture Engine
//!
//! The engine is split along the producer/consumer line of a serial receiver:
//!
//! - [`ByteIntake`] is the producer half. It is handed every received byte (from an
//!   interrupt handler, a reader thread or a test loop), stamps it with its
//!   [`Clock`] and appends it to the shared capture buffer.
//! - [`Engine`] is the consumer half. Each call to [`Engine::process`] runs every
//!   enabled grammar over the buffer, decodes what matched into the records and lets
//!   the flush policy decide what happens to the buffer.
//!
//! The capture buffer is the only state the two halves share; it sits behind a
//! mutex that is held for one byte on the producer side and for one pass on the
//! consumer side.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, trace, warn};

use crate::{
    buffer::CaptureBuffer,
    checksum::{ChecksumMode, checksum, parse_checksum_token},
    clock::{Clock, Rearm, Timestamp},
    config::{CoordinateConvention, EngineConfig, Retention, SentenceSet, SentenceType, Talker},
    flush::{FlushDecision, FlushPolicy, FlushReason, PassSummary},
    grammar::{Grammar, GrammarTable, SentenceMatch},
    sentences::{
        CourseSpeed, Decode, DecodeContext, Fields, FixData, RecommendedMinimum, TimeDate,
    },
};

/// Why a framed sentence was not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The checksum token does not match the sentence body.
    ChecksumMismatch {
        /// Checksum calculated over the sentence body
        expected: u8,
        /// Checksum token as read, `None` if it is not hexadecimal
        found: Option<u8>,
    },
}

/// The result of running one grammar and its decoder over the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The record was updated from the sentence ending at byte `end`.
    Decoded { end: usize },
    /// No complete sentence of this type is in the buffer.
    NoMatch,
    /// A sentence framed but was refused; the record was left untouched.
    Rejected(Rejection),
}

/// What a call to [`Engine::process`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessReport {
    /// Types whose record was updated.
    pub decoded: SentenceSet,
    /// Types that framed but were refused.
    pub rejected: SentenceSet,
    /// Set when the buffer was cleared at the end of the pass.
    pub flushed: Option<FlushReason>,
}

// Not derived: `SentenceSet::default()` is every type.
impl Default for ProcessReport {
    fn default() -> Self {
        ProcessReport {
            decoded: SentenceSet::empty(),
            rejected: SentenceSet::empty(),
            flushed: None,
        }
    }
}

/// Creates a configured [`Engine`].
///
/// # Examples
///
/// ```rust
/// use nmea0183_capture::{
///     CoordinateConvention, EngineBuilder, FlushPolicy, Retention, SentenceSet, Talker,
/// };
/// use std::time::Duration;
///
/// let engine = EngineBuilder::new()
///     .capacity(256)
///     .flush_policy(FlushPolicy::IdleAware { min_idle: Duration::from_millis(20) })
///     .retention(Retention::Consume)
///     .sentences(SentenceSet::GGA | SentenceSet::RMC)
///     .coordinates(CoordinateConvention::Hemisphere)
///     .talker(Talker::Any)
///     .build();
///
/// assert!(engine.fix().is_some());
/// assert!(engine.time_date().is_none());
/// ```
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    /// Creates a builder with the defaults of [`EngineConfig`]:
    ///
    /// - a 512 byte buffer
    /// - [`FlushPolicy::IdleAware`] with 50 ms of idle time
    /// - [`Retention::Consume`]
    /// - all sentence types enabled
    /// - [`CoordinateConvention::Signed`]
    /// - [`ChecksumMode::Verify`]
    /// - the `GP` talker only
    pub fn new() -> Self {
        EngineBuilder {
            config: EngineConfig::default(),
        }
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        EngineBuilder { config }
    }

    /// Sets the capture buffer capacity in bytes.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    pub fn flush_policy(mut self, policy: FlushPolicy) -> Self {
        self.config.flush_policy = policy;
        self
    }

    pub fn retention(mut self, retention: Retention) -> Self {
        self.config.retention = retention;
        self
    }

    /// Sets which sentence types get a grammar, a decoder and a record.
    pub fn sentences(mut self, sentences: SentenceSet) -> Self {
        self.config.sentences = sentences;
        self
    }

    pub fn coordinates(mut self, convention: CoordinateConvention) -> Self {
        self.config.coordinates = convention;
        self
    }

    pub fn checksum_mode(mut self, mode: ChecksumMode) -> Self {
        self.config.checksum = mode;
        self
    }

    pub fn talker(mut self, talker: Talker) -> Self {
        self.config.talker = talker;
        self
    }

    pub fn build(self) -> Engine {
        Engine::new(self.config)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Records {
    fix: Option<FixData>,
    recommended_minimum: Option<RecommendedMinimum>,
    course_speed: Option<CourseSpeed>,
    time_date: Option<TimeDate>,
}

impl Records {
    fn new(enabled: SentenceSet) -> Self {
        fn slot<T: Decode>(enabled: SentenceSet) -> Option<T> {
            enabled.contains_type(T::SENTENCE).then(T::default)
        }

        Records {
            fix: slot(enabled),
            recommended_minimum: slot(enabled),
            course_speed: slot(enabled),
            time_date: slot(enabled),
        }
    }

    fn decode(&mut self, sentence: SentenceType, fields: &mut Fields<'_>, ctx: &DecodeContext<'_>) {
        fn update<T: Decode>(record: &mut Option<T>, fields: &mut Fields<'_>, ctx: &DecodeContext<'_>) {
            if let Some(record) = record {
                record.decode(fields, ctx);
            }
        }

        match sentence {
            SentenceType::Fix => update(&mut self.fix, fields, ctx),
            SentenceType::RecommendedMinimum => update(&mut self.recommended_minimum, fields, ctx),
            SentenceType::CourseSpeed => update(&mut self.course_speed, fields, ctx),
            SentenceType::TimeDate => update(&mut self.time_date, fields, ctx),
        }
    }
}

/// The consumer half: grammars, decoders, records and the flush policy.
///
/// # Examples
///
/// ```rust
/// use nmea0183_capture::{Engine, ManualClock, Timestamp};
///
/// let mut engine = Engine::default();
/// let clock = ManualClock::default();
/// let intake = engine.intake(clock.clone());
///
/// for &byte in b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n" {
///     intake.on_byte_received(byte);
/// }
///
/// let report = engine.process(Timestamp::from_millis(5));
/// assert!(report.decoded.contains(nmea0183_capture::SentenceSet::GGA));
///
/// let fix = engine.fix().unwrap();
/// assert_eq!(fix.satellites, 8);
/// ```
#[derive(Debug)]
pub struct Engine<R = ()> {
    shared: Arc<Mutex<CaptureBuffer>>,
    grammars: GrammarTable,
    config: EngineConfig,
    records: Records,
    rearm: R,
}

impl Engine {
    /// Creates an engine from a resolved configuration.
    pub fn new(config: EngineConfig) -> Self {
        Engine {
            shared: Arc::new(Mutex::new(CaptureBuffer::new(config.capacity))),
            grammars: GrammarTable::new(config.sentences),
            records: Records::new(config.sentences),
            config,
            rearm: (),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(EngineConfig::default())
    }
}

impl<R: Rearm> Engine<R> {
    /// Re-arms the receiver through `rearm` at the end of every pass.
    pub fn with_rearm<R2: Rearm>(self, rearm: R2) -> Engine<R2> {
        Engine {
            shared: self.shared,
            grammars: self.grammars,
            config: self.config,
            records: self.records,
            rearm,
        }
    }

    /// Returns a producer handle feeding this engine's buffer.
    ///
    /// Handles are cheap to clone; all of them share one buffer.
    pub fn intake<C: Clock>(&self, clock: C) -> ByteIntake<C> {
        ByteIntake {
            shared: Arc::clone(&self.shared),
            clock,
            rearm: (),
        }
    }

    /// Runs one processing pass at tick `now`.
    ///
    /// Every enabled sentence type is matched against the same buffer contents and
    /// decoded into its record if found. The flush policy then decides whether the
    /// buffer is cleared; if it is kept and [`Retention::Consume`] is configured,
    /// everything up to the end of the furthest decoded sentence is discarded.
    pub fn process(&mut self, now: Timestamp) -> ProcessReport {
        let Engine {
            shared,
            grammars,
            config,
            records,
            rearm,
        } = self;

        let mut buffer = lock(shared);
        let mut report = ProcessReport::default();
        let mut decoded_to = 0;

        if !buffer.is_empty() {
            let snapshot = buffer.snapshot();

            for grammar in grammars.iter() {
                let flag = grammar.sentence.flag();

                match decode_sentence(records, grammar, snapshot, config, now) {
                    DecodeOutcome::Decoded { end } => {
                        report.decoded |= flag;
                        decoded_to = decoded_to.max(end);
                    }
                    DecodeOutcome::NoMatch => {
                        trace!(
                            "no {} sentence in {} buffered bytes",
                            grammar.sentence.formatter(),
                            snapshot.len()
                        );
                    }
                    DecodeOutcome::Rejected(rejection) => {
                        warn!("{} sentence rejected: {rejection:?}", grammar.sentence.formatter());
                        report.rejected |= flag;
                    }
                }
            }
        }

        let pass = PassSummary {
            saturated: buffer.is_saturated(),
            had_data: !buffer.is_empty(),
            decoded_any: !report.decoded.is_empty(),
            idle: now.saturating_duration_since(buffer.last_update()),
        };

        match config.flush_policy.decide(&pass) {
            FlushDecision::Clear(reason) => {
                debug!("flushing {} buffered bytes: {reason:?}", buffer.len());
                buffer.reset(now);
                report.flushed = Some(reason);
            }
            FlushDecision::Keep => {
                if config.retention == Retention::Consume && decoded_to > 0 {
                    buffer.consume(decoded_to);
                }
            }
        }

        drop(buffer);
        rearm.request_next_byte();

        report
    }

    /// The most recent GGA record, `None` if GGA is disabled.
    pub fn fix(&self) -> Option<&FixData> {
        self.records.fix.as_ref()
    }

    /// The most recent RMC record, `None` if RMC is disabled.
    pub fn recommended_minimum(&self) -> Option<&RecommendedMinimum> {
        self.records.recommended_minimum.as_ref()
    }

    /// The most recent VTG record, `None` if VTG is disabled.
    pub fn course_speed(&self) -> Option<&CourseSpeed> {
        self.records.course_speed.as_ref()
    }

    /// The most recent ZDA record, `None` if ZDA is disabled.
    pub fn time_date(&self) -> Option<&TimeDate> {
        self.records.time_date.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grammars(&self) -> &GrammarTable {
        &self.grammars
    }

    /// A copy of the bytes currently buffered.
    pub fn buffered(&self) -> Vec<u8> {
        lock(&self.shared).snapshot().to_vec()
    }
}

/// The producer half: appends received bytes to the engine's buffer.
#[derive(Debug, Clone)]
pub struct ByteIntake<C, R = ()> {
    shared: Arc<Mutex<CaptureBuffer>>,
    clock: C,
    rearm: R,
}

impl<C: Clock, R: Rearm> ByteIntake<C, R> {
    /// Re-arms the receiver through `rearm` after every byte.
    pub fn with_rearm<R2: Rearm>(self, rearm: R2) -> ByteIntake<C, R2> {
        ByteIntake {
            shared: self.shared,
            clock: self.clock,
            rearm,
        }
    }

    /// Stores `byte` (unless it is NUL or the buffer is saturated), records the
    /// arrival tick and re-arms the receiver.
    pub fn on_byte_received(&self, byte: u8) {
        let now = self.clock.now();
        lock(&self.shared).push(byte, now);
        self.rearm.request_next_byte();
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

fn lock(shared: &Mutex<CaptureBuffer>) -> MutexGuard<'_, CaptureBuffer> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Matches `grammar` against `snapshot` and decodes the newest occurrence that
/// passes checksum verification.
///
/// A rejection is reported only when no occurrence verifies.
fn decode_sentence(
    records: &mut Records,
    grammar: &'static Grammar,
    snapshot: &[u8],
    config: &EngineConfig,
    now: Timestamp,
) -> DecodeOutcome {
    let mut rejection = None;

    for found in grammar.occurrences(snapshot, config.talker) {
        match verify(&found, snapshot, config.checksum) {
            Ok(()) => return decode_found(records, grammar, &found, snapshot, config, now),
            Err(rejected) => {
                trace!(
                    "{} at byte {} rejected, trying older occurrences",
                    grammar.sentence.formatter(),
                    found.whole().start
                );
                rejection.get_or_insert(rejected);
            }
        }
    }

    rejection.map_or(DecodeOutcome::NoMatch, DecodeOutcome::Rejected)
}

/// Compares the checksum token of `found` with the checksum of its body.
fn verify(found: &SentenceMatch, snapshot: &[u8], mode: ChecksumMode) -> Result<(), Rejection> {
    if mode == ChecksumMode::Ignore {
        return Ok(());
    }

    let expected = checksum(found.checksummed(snapshot));
    let token = snapshot.get(found.checksum().range()).unwrap_or_default();
    let cc = parse_checksum_token(token);

    if cc == Some(expected) {
        Ok(())
    } else {
        Err(Rejection::ChecksumMismatch {
            expected,
            found: cc,
        })
    }
}

fn decode_found(
    records: &mut Records,
    grammar: &'static Grammar,
    found: &SentenceMatch,
    snapshot: &[u8],
    config: &EngineConfig,
    now: Timestamp,
) -> DecodeOutcome {
    let whole = found.whole();
    let mut fields = Fields::new(snapshot, found, grammar);
    let ctx = DecodeContext {
        now,
        coordinates: config.coordinates,
        talker: fields.talker(),
    };

    records.decode(grammar.sentence, &mut fields, &ctx);
    debug!(
        "decoded {} from bytes {}..{}",
        grammar.sentence.formatter(),
        whole.start,
        whole.end
    );

    DecodeOutcome::Decoded { end: whole.end }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::clock::ManualClock;

    const GGA: &[u8] = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
    const VTG: &[u8] = b"$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*25\r\n";

    fn feed<C: Clock, R: Rearm>(intake: &ByteIntake<C, R>, bytes: &[u8]) {
        for &byte in bytes {
            intake.on_byte_received(byte);
        }
    }

    #[test]
    fn test_builder_resolves_config() {
        let engine = EngineBuilder::new()
            .capacity(64)
            .flush_policy(FlushPolicy::Immediate)
            .retention(Retention::Retain)
            .sentences(SentenceSet::VTG)
            .coordinates(CoordinateConvention::Hemisphere)
            .checksum_mode(ChecksumMode::Ignore)
            .talker(Talker::Any)
            .build();

        assert_eq!(
            engine.config(),
            &EngineConfig {
                capacity: 64,
                flush_policy: FlushPolicy::Immediate,
                retention: Retention::Retain,
                sentences: SentenceSet::VTG,
                coordinates: CoordinateConvention::Hemisphere,
                checksum: ChecksumMode::Ignore,
                talker: Talker::Any,
            }
        );
        assert!(engine.fix().is_none());
        assert!(engine.recommended_minimum().is_none());
        assert!(engine.course_speed().is_some());
        assert!(engine.time_date().is_none());
        assert_eq!(engine.grammars().iter().count(), 1);
    }

    #[test]
    fn test_empty_pass_keeps_quiet() {
        let mut engine = Engine::default();
        let report = engine.process(Timestamp::from_millis(1_000));

        assert_eq!(report, ProcessReport::default());
        assert!(report.decoded.is_empty() && report.rejected.is_empty());
        assert_eq!(engine.fix(), Some(&FixData::default()));
    }

    #[test]
    fn test_decode_then_consume() {
        let mut engine = Engine::default();
        let clock = ManualClock::default();
        let intake = engine.intake(clock.clone());

        feed(&intake, GGA);
        feed(&intake, b"$GPVTG,054.7");

        let report = engine.process(Timestamp::from_millis(1));
        assert_eq!(report.decoded, SentenceSet::GGA);
        assert_eq!(report.flushed, None);

        // The partial VTG behind the GGA survives.
        assert_eq!(engine.buffered(), b"\r\n$GPVTG,054.7");

        feed(&intake, &VTG[12..]);
        let report = engine.process(Timestamp::from_millis(2));
        assert_eq!(report.decoded, SentenceSet::VTG);
        assert_eq!(engine.buffered(), b"\r\n");
        assert_eq!(engine.course_speed().unwrap().speed_kph.value, 10.2);
    }

    #[test]
    fn test_checksum_mismatch_is_rejected() {
        let bad = b"$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*26";

        let mut engine = EngineBuilder::new().flush_policy(FlushPolicy::Immediate).build();
        let intake = engine.intake(ManualClock::default());
        feed(&intake, bad);

        let report = engine.process(Timestamp::from_millis(1));
        assert_eq!(report.decoded, SentenceSet::empty());
        assert_eq!(report.rejected, SentenceSet::VTG);
        assert_eq!(report.flushed, Some(FlushReason::NothingMatched));
        assert_eq!(engine.course_speed(), Some(&CourseSpeed::default()));

        let mut engine = EngineBuilder::new().checksum_mode(ChecksumMode::Ignore).build();
        let intake = engine.intake(ManualClock::default());
        feed(&intake, bad);

        let report = engine.process(Timestamp::from_millis(1));
        assert_eq!(report.decoded, SentenceSet::VTG);
        assert_eq!(engine.course_speed().unwrap().checksum.as_str(), "26");
    }

    #[test]
    fn test_decode_sentence_outcomes() {
        let config = EngineConfig::default();
        let mut records = Records::new(config.sentences);

        let cases: [(&Grammar, &[u8], DecodeOutcome); 4] = [
            (&crate::grammar::VTG, VTG, DecodeOutcome::Decoded { end: VTG.len() - 2 }),
            (&crate::grammar::GGA, VTG, DecodeOutcome::NoMatch),
            (
                &crate::grammar::VTG,
                b"$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*ZZ",
                DecodeOutcome::Rejected(Rejection::ChecksumMismatch {
                    expected: 0x25,
                    found: None,
                }),
            ),
            (
                &crate::grammar::VTG,
                b"$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*52",
                DecodeOutcome::Rejected(Rejection::ChecksumMismatch {
                    expected: 0x25,
                    found: Some(0x52),
                }),
            ),
        ];

        for (grammar, snapshot, expected) in cases {
            let outcome = decode_sentence(&mut records, grammar, snapshot, &config, Timestamp::ZERO);
            assert_eq!(outcome, expected, "{}", String::from_utf8_lossy(snapshot));
        }
    }

    #[test]
    fn test_corrupt_newest_falls_back_to_older() {
        let config = EngineConfig::default();
        let snapshot = [VTG, b"$GPVTG,099.9,T,034.4,M,005.5,N,010.2,K,A*99\r\n"].concat();

        let mut records = Records::new(config.sentences);
        let outcome =
            decode_sentence(&mut records, &crate::grammar::VTG, &snapshot, &config, Timestamp::ZERO);
        assert_eq!(outcome, DecodeOutcome::Decoded { end: VTG.len() - 2 });
        assert_eq!(records.course_speed.unwrap().course_true.value, 54.7);

        // Both copies corrupt: the newest rejection is reported.
        let snapshot = b"$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*26\r\n$GPVTG,,T,,M,,N,,K,N*2D";
        let mut records = Records::new(config.sentences);
        let outcome =
            decode_sentence(&mut records, &crate::grammar::VTG, snapshot, &config, Timestamp::ZERO);
        assert_eq!(
            outcome,
            DecodeOutcome::Rejected(Rejection::ChecksumMismatch {
                expected: 0x2C,
                found: Some(0x2D),
            })
        );
        assert_eq!(records.course_speed, Some(CourseSpeed::default()));
    }

    #[test]
    fn test_rearm_after_byte_and_pass() {
        let engine_calls = Rc::new(Cell::new(0));
        let intake_calls = Rc::new(Cell::new(0));

        let mut engine = Engine::default().with_rearm({
            let calls = Rc::clone(&engine_calls);
            move || calls.set(calls.get() + 1)
        });
        let intake = engine.intake(ManualClock::default()).with_rearm({
            let calls = Rc::clone(&intake_calls);
            move || calls.set(calls.get() + 1)
        });

        feed(&intake, b"$GP");
        engine.process(Timestamp::ZERO);
        engine.process(Timestamp::ZERO);

        assert_eq!(intake_calls.get(), 3);
        assert_eq!(engine_calls.get(), 2);
    }

    #[test]
    fn test_intake_survives_poisoned_lock() {
        let mut engine = Engine::default();
        let intake = engine.intake(ManualClock::default());

        let shared = Arc::clone(&engine.shared);
        let _ = std::thread::spawn(move || {
            let _guard = shared.lock().unwrap();
            panic!("poison the capture buffer");
        })
        .join();

        feed(&intake, GGA);
        let report = engine.process(Timestamp::ZERO);
        assert_eq!(report.decoded, SentenceSet::GGA);
    }

    #[test]
    fn test_producer_thread() {
        let mut engine = EngineBuilder::new().sentences(SentenceSet::GGA | SentenceSet::VTG).build();
        let clock = ManualClock::default();
        let intake = engine.intake(clock.clone());

        let producer = std::thread::spawn(move || {
            for _ in 0..3 {
                feed(&intake, GGA);
                feed(&intake, VTG);
            }
        });

        let mut decoded = SentenceSet::empty();
        while !producer.is_finished() {
            decoded |= engine.process(clock.now()).decoded;
        }
        producer.join().unwrap();
        decoded |= engine.process(clock.now()).decoded;

        assert_eq!(decoded, SentenceSet::GGA | SentenceSet::VTG);
        assert_eq!(engine.fix().unwrap().checksum.as_str(), "47");
    }
}
