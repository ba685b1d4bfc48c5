#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    Coordinate, Decode, DecodeContext, FaaMode, Fields, LatitudeHemisphere, LongitudeHemisphere,
    Status, UtcDate, UtcTime, field::ascii_string,
};
use crate::{clock::Timestamp, config::SentenceType};

/// RMC - Recommended Minimum Navigation Information
///
/// <https://gpsd.gitlab.io/gpsd/NMEA.html#_rmc_recommended_minimum_navigation_information>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecommendedMinimum {
    pub updated_at: Timestamp,
    pub talker: heapless::String<2>,
    /// Fix time in UTC
    pub utc: UtcTime,
    /// Status, `Warning` when the receiver has no valid fix
    pub status: Option<Status>,
    pub latitude: Coordinate<LatitudeHemisphere>,
    pub longitude: Coordinate<LongitudeHemisphere>,
    /// Speed over ground in knots
    pub speed_knots: f32,
    /// Course over ground in degrees true
    pub course_true: f32,
    /// Date of fix
    pub date: UtcDate,
    /// Magnetic variation in degrees
    pub magnetic_variation: f32,
    pub variation_direction: Option<LongitudeHemisphere>,
    /// FAA mode indicator
    pub mode: Option<FaaMode>,
    pub checksum: heapless::String<2>,
}

impl RecommendedMinimum {
    pub fn utc_time(&self) -> Option<time::Time> {
        self.utc.to_time()
    }

    pub fn date(&self) -> Option<time::Date> {
        self.date.to_date()
    }

    /// Date and time of the fix, if both are valid.
    pub fn date_time(&self) -> Option<time::OffsetDateTime> {
        Some(time::PrimitiveDateTime::new(self.date()?, self.utc_time()?).assume_utc())
    }
}

impl Decode for RecommendedMinimum {
    const SENTENCE: SentenceType = SentenceType::RecommendedMinimum;

    fn decode(&mut self, fields: &mut Fields<'_>, ctx: &DecodeContext<'_>) {
        let (time, fraction) = (fields.next_field(), fields.next_field());
        self.utc = UtcTime::decode(time, fraction);

        if let Some(status) = fields.next_field().enumerated() {
            self.status = Some(status);
        }

        let (latitude, north_south) = (fields.next_field(), fields.next_field());
        self.latitude.decode(latitude, north_south, ctx.coordinates);

        let (longitude, east_west) = (fields.next_field(), fields.next_field());
        self.longitude.decode(longitude, east_west, ctx.coordinates);

        self.speed_knots = fields.next_field().real().unwrap_or_default() as f32;
        self.course_true = fields.next_field().real().unwrap_or_default() as f32;
        self.date = UtcDate::decode_packed(fields.next_field());

        self.magnetic_variation = fields.next_field().real().unwrap_or_default() as f32;
        if let Some(direction) = fields.next_field().enumerated() {
            self.variation_direction = Some(direction);
        }
        if let Some(mode) = fields.next_field().enumerated() {
            self.mode = Some(mode);
        }

        self.checksum = fields.next_field().fixed_text();
        self.talker = ascii_string(ctx.talker);
        self.updated_at = ctx.now;
    }
}
