use std::ops::Range;

use nom::{
    AsChar, Offset, Parser,
    bytes::complete::{tag, take, take_while_m_n},
    character::complete::{char, digit0, satisfy},
    combinator::{cond, opt, recognize, value, verify},
};

use super::{Grammar, Lead, SlotKind};
use crate::{Error, IResult, config::Talker};

/// Capacity of a [`SentenceMatch`]: the whole match plus up to 16 fields.
pub const MAX_SPANS: usize = 17;

/// A half-open byte range into the snapshot that was matched.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Where a sentence and each of its fields sit in the snapshot.
///
/// Span 0 covers the whole sentence from `$` through the checksum digits. Spans
/// `1..` follow the grammar's slots in order; the last one is the checksum token.
/// An empty field is a zero-length span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceMatch {
    talker: Span,
    spans: heapless::Vec<Span, MAX_SPANS>,
}

impl SentenceMatch {
    /// Every span, starting with the whole match.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// The whole sentence.
    pub fn whole(&self) -> Span {
        self.spans.first().copied().unwrap_or_default()
    }

    /// Field spans, checksum included.
    pub fn fields(&self) -> &[Span] {
        self.spans.get(1..).unwrap_or_default()
    }

    /// The checksum token after `*`.
    pub fn checksum(&self) -> Span {
        self.spans.last().copied().unwrap_or_default()
    }

    /// The two talker letters after `$`.
    pub fn talker(&self) -> Span {
        self.talker
    }

    /// The bytes for span `index`, or an empty slice if there is no such span.
    pub fn text<'a>(&self, snapshot: &'a [u8], index: usize) -> &'a [u8] {
        self.spans
            .get(index)
            .and_then(|span| snapshot.get(span.range()))
            .unwrap_or_default()
    }

    /// The bytes the checksum covers: everything between `$` and `*`.
    pub fn checksummed<'a>(&self, snapshot: &'a [u8]) -> &'a [u8] {
        let body = (self.whole().start + 1)..self.checksum().start.saturating_sub(1);
        snapshot.get(body).unwrap_or_default()
    }
}

impl Grammar {
    /// Finds the newest complete occurrence of this sentence in `snapshot`.
    ///
    /// Candidates are tried from the last `$` backwards, so when the buffer holds the
    /// same sentence type twice the more recent one wins.
    pub fn find(&self, snapshot: &[u8], talker: Talker) -> Option<SentenceMatch> {
        self.occurrences(snapshot, talker).next()
    }

    /// Every complete occurrence of this sentence in `snapshot`, newest first.
    pub fn occurrences<'a>(
        &'a self,
        snapshot: &'a [u8],
        talker: Talker,
    ) -> impl Iterator<Item = SentenceMatch> + 'a {
        snapshot
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, byte)| **byte == b'$')
            .filter_map(move |(start, _)| self.match_at(snapshot, start, talker))
    }

    /// Matches this sentence starting exactly at `snapshot[start]`.
    pub fn match_at(&self, snapshot: &[u8], start: usize, talker: Talker) -> Option<SentenceMatch> {
        let input = snapshot.get(start..)?;
        let (rest, (id, fields)) = self.sentence(input, talker).ok()?;

        let span_of = |text: &[u8]| {
            let start = snapshot.offset(text);
            Span {
                start,
                end: start + text.len(),
            }
        };

        let mut spans = heapless::Vec::new();
        spans
            .push(Span {
                start,
                end: snapshot.len() - rest.len(),
            })
            .ok()?;
        for field in fields {
            spans.push(span_of(field)).ok()?;
        }

        Some(SentenceMatch {
            talker: span_of(id),
            spans,
        })
    }

    /// `$` talker formatter, the slots, then `*CC`.
    #[allow(clippy::type_complexity)]
    fn sentence<'a>(
        &self,
        i: &'a [u8],
        talker: Talker,
    ) -> IResult<&'a [u8], (&'a [u8], heapless::Vec<&'a [u8], 16>)> {
        let (i, _) = char('$').parse(i)?;
        let (i, id) = verify(take(2usize), |id: &[u8]| talker.accepts(id)).parse(i)?;
        let (mut i, _) = tag(self.sentence.formatter().as_bytes()).parse(i)?;

        let mut fields = heapless::Vec::new();
        for slot in self.slots {
            let (rest, _) = lead(i, slot.lead)?;
            let (rest, text) = field(rest, slot.kind)?;
            fields
                .push(text)
                .map_err(|_| nom::Err::Error(Error::TooManyFields))?;
            i = rest;
        }

        let (i, _) = cond(self.trailing_comma, opt(char(','))).parse(i)?;
        let (i, _) = char('*').parse(i)?;
        let (i, cc) = field(i, SlotKind::Checksum)?;
        fields
            .push(cc)
            .map_err(|_| nom::Err::Error(Error::TooManyFields))?;

        Ok((i, (id, fields)))
    }
}

fn lead(i: &[u8], lead: Lead) -> IResult<&[u8], ()> {
    match lead {
        Lead::Comma => value((), char(',')).parse(i),
        Lead::OptionalDot => value((), opt(char('.'))).parse(i),
    }
}

fn field(i: &[u8], kind: SlotKind) -> IResult<&[u8], &[u8]> {
    match kind {
        SlotKind::Digits => digit0(i),
        SlotKind::Decimal { signed } => recognize((
            cond(signed, opt(char('-'))),
            digit0,
            opt(char('.')),
            digit0,
        ))
        .parse(i),
        SlotKind::Fixed { width } => take_while_m_n(width, width, |b: u8| b.is_ascii_digit()).parse(i),
        SlotKind::OptionalFixed { width, signed } => recognize(opt((
            cond(signed, opt(char('-'))),
            take_while_m_n(width, width, |b: u8| b.is_ascii_digit()),
        )))
        .parse(i),
        SlotKind::Digit => recognize(opt(satisfy(|c| c.is_ascii_digit()))).parse(i),
        SlotKind::OneOf(allowed) => recognize(opt(satisfy(|c| allowed.contains(c)))).parse(i),
        SlotKind::Checksum => take_while_m_n(2, 2, |b: u8| b.is_alphanum()).parse(i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{GGA, RMC, VTG, ZDA};

    const GGA_LINE: &[u8] = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
    const VTG_LINE: &[u8] = b"$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*25";
    const ZDA_LINE: &[u8] = b"$GPZDA,153045.25,20,11,2023,-03,30*4B";

    fn texts<'a>(found: &SentenceMatch, snapshot: &'a [u8]) -> Vec<&'a str> {
        (0..found.spans().len())
            .map(|n| std::str::from_utf8(found.text(snapshot, n)).unwrap())
            .collect()
    }

    #[test]
    fn test_gga_spans() {
        let found = GGA.find(GGA_LINE, Talker::GPS).unwrap();

        assert_eq!(
            texts(&found, GGA_LINE),
            [
                std::str::from_utf8(GGA_LINE).unwrap(),
                "123519",
                "",
                "4807.038",
                "N",
                "01131.000",
                "E",
                "1",
                "08",
                "0.9",
                "545.4",
                "M",
                "46.9",
                "M",
                "",
                "",
                "47",
            ]
        );
        assert_eq!(found.talker().range(), 1..3);
        assert_eq!(found.checksummed(GGA_LINE), &GGA_LINE[1..GGA_LINE.len() - 3]);
    }

    #[test]
    fn test_zda_signed_zone() {
        let found = ZDA.find(ZDA_LINE, Talker::GPS).unwrap();
        assert_eq!(
            texts(&found, ZDA_LINE)[1..],
            ["153045", "25", "20", "11", "2023", "-03", "30", "4B"]
        );
    }

    #[test]
    fn test_zda_trailing_comma() {
        let cases: [(&Grammar, &[u8], bool); 4] = [
            (&ZDA, b"$GPZDA,201530.00,04,07,2002,00,00*60", true),
            (&ZDA, b"$GPZDA,201530.00,04,07,2002,00,00,*4C", true),
            (&ZDA, b"$GPZDA,201530.00,04,07,2002,00,00,,*60", false),
            (&VTG, b"$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K,A,*09", false),
        ];

        for (grammar, line, matches) in cases {
            let found = grammar.find(line, Talker::GPS);
            assert_eq!(found.is_some(), matches, "{}", String::from_utf8_lossy(line));

            if let Some(found) = found {
                assert_eq!(found.spans().len(), 9);
                assert_eq!(found.text(line, 7), b"00");
                let token = &line[found.checksum().range()];
                assert_eq!(
                    Some(crate::checksum(found.checksummed(line))),
                    crate::parse_checksum_token(token)
                );
            }
        }
    }

    #[test]
    fn test_match_in_noise() {
        let snapshot = [b"\xFF\x00junk$GP".as_slice(), VTG_LINE, b"\r\n$GPGG"].concat();
        let found = VTG.find(&snapshot, Talker::GPS).unwrap();

        assert_eq!(found.whole().start, 9);
        assert_eq!(found.whole().len(), VTG_LINE.len());
        assert!(GGA.find(&snapshot, Talker::GPS).is_none());
    }

    #[test]
    fn test_newest_occurrence_wins() {
        let older = b"$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*25";
        let newer = b"$GPVTG,,T,,M,,N,,K,N*2C";
        let snapshot = [older.as_slice(), newer].concat();

        let found = VTG.find(&snapshot, Talker::GPS).unwrap();
        assert_eq!(found.whole().start, older.len());
        assert_eq!(found.whole().end, snapshot.len());
    }

    #[test]
    fn test_occurrences_newest_first() {
        let snapshot = [VTG_LINE, b"\r\n$GPVTG,,T,,M,,N,,K,N*2C\r\n$GPVT"].concat();
        let starts: Vec<_> = VTG
            .occurrences(&snapshot, Talker::GPS)
            .map(|found| found.whole().start)
            .collect();

        assert_eq!(starts, [VTG_LINE.len() + 2, 0]);
    }

    #[test]
    fn test_rejects() {
        let cases: [(&Grammar, &[u8]); 8] = [
            // Truncated before the checksum.
            (&GGA, b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,"),
            // One checksum digit.
            (&VTG, b"$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*2"),
            // Satellites must be two digits.
            (&GGA, b"$GPGGA,123519,4807.038,N,01131.000,E,1,8,0.9,545.4,M,46.9,M,,*47"),
            // Hemisphere letter outside its set.
            (&GGA, b"$GPGGA,123519,4807.038,X,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47"),
            // Wrong talker.
            (&GGA, b"$GNGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*59"),
            // Missing field.
            (&VTG, b"$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K*25"),
            // Three-digit zone.
            (&ZDA, b"$GPZDA,201530.00,04,07,2002,000,00*60"),
            // RMC date with a letter.
            (&RMC, b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,23O394,003.1,W,A*07"),
        ];

        for (grammar, snapshot) in cases {
            assert!(
                grammar.find(snapshot, Talker::GPS).is_none(),
                "{}",
                String::from_utf8_lossy(snapshot)
            );
        }
    }

    #[test]
    fn test_any_talker() {
        let line = b"$GNGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*59";
        let found = GGA.find(line, Talker::Any).unwrap();
        assert_eq!(found.text(line, 0), line);
        assert_eq!(&line[found.talker().range()], b"GN");
    }

    #[test]
    fn test_all_empty_fields() {
        let line = b"$GPRMC,235959.50,V,,,,,,,311299,,,N*78";
        let found = RMC.find(line, Talker::GPS).unwrap();

        let texts = texts(&found, line);
        assert_eq!(texts[1..4], ["235959", "50", "V"]);
        assert_eq!(texts[4..10], ["", "", "", "", "", ""]);
        assert_eq!(texts[10], "311299");
        assert_eq!(texts[13..], ["N", "78"]);
    }
}
