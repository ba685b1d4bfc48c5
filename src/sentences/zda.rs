#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Decode, DecodeContext, Fields, UtcDate, UtcTime, field::ascii_string};
use crate::{clock::Timestamp, config::SentenceType};

/// ZDA - Time & Date - UTC, day, month, year and local time zone
///
/// <https://gpsd.gitlab.io/gpsd/NMEA.html#_zda_time_date_utc_day_month_year_and_local_time_zone>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TimeDate {
    pub updated_at: Timestamp,
    pub talker: heapless::String<2>,
    pub utc: UtcTime,
    pub date: UtcDate,
    /// Local zone hours, 00 to ±13
    pub local_zone_hours: i8,
    /// Local zone minutes, as transmitted (usually unsigned)
    pub local_zone_minutes: i8,
    pub checksum: heapless::String<2>,
}

impl TimeDate {
    pub fn utc_time(&self) -> Option<time::Time> {
        self.utc.to_time()
    }

    pub fn date(&self) -> Option<time::Date> {
        self.date.to_date()
    }

    /// The local zone as an offset from UTC.
    ///
    /// The sign of the hours applies to the minutes, so `-03,30` is `-03:30`.
    pub fn utc_offset(&self) -> Option<time::UtcOffset> {
        let minutes = if self.local_zone_hours < 0 {
            -self.local_zone_minutes.saturating_abs()
        } else {
            self.local_zone_minutes
        };

        time::UtcOffset::from_hms(self.local_zone_hours, minutes, 0).ok()
    }

    /// The transmitted instant, expressed in the local zone.
    ///
    /// ```rust
    /// use nmea0183_capture::sentences::{TimeDate, UtcDate, UtcTime};
    ///
    /// let zda = TimeDate {
    ///     utc: UtcTime { hour: 15, minute: 30, second: 45, ..Default::default() },
    ///     date: UtcDate { day: 20, month: 11, year: 2023 },
    ///     local_zone_hours: -3,
    ///     local_zone_minutes: 30,
    ///     ..Default::default()
    /// };
    ///
    /// let local = zda.offset_date_time().unwrap();
    /// assert_eq!((local.hour(), local.minute()), (12, 0));
    /// assert_eq!(local.offset().whole_minutes(), -210);
    /// ```
    pub fn offset_date_time(&self) -> Option<time::OffsetDateTime> {
        time::PrimitiveDateTime::new(self.date()?, self.utc_time()?)
            .assume_utc()
            .checked_to_offset(self.utc_offset()?)
    }
}

impl Decode for TimeDate {
    const SENTENCE: SentenceType = SentenceType::TimeDate;

    fn decode(&mut self, fields: &mut Fields<'_>, ctx: &DecodeContext<'_>) {
        let (time, fraction) = (fields.next_field(), fields.next_field());
        self.utc = UtcTime::decode(time, fraction);

        self.date = UtcDate {
            day: fields.next_field().integer().unwrap_or(0),
            month: fields.next_field().integer().unwrap_or(0),
            year: fields.next_field().integer().unwrap_or(0),
        };

        self.local_zone_hours = fields.next_field().signed().unwrap_or(0);
        self.local_zone_minutes = fields.next_field().signed().unwrap_or(0);

        self.checksum = fields.next_field().fixed_text();
        self.talker = ascii_string(ctx.talker);
        self.updated_at = ctx.now;
    }
}
