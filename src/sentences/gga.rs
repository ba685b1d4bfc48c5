#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    Coordinate, Decode, DecodeContext, Fields, LatitudeHemisphere, LengthUnit,
    LongitudeHemisphere, UtcTime, field::ascii_string,
};
use crate::{clock::Timestamp, config::SentenceType};

/// Age of correction when the field is empty or unreadable.
pub const NO_CORRECTION_AGE: i8 = -1;

/// GGA - Global Positioning System Fix Data
///
/// <https://gpsd.gitlab.io/gpsd/NMEA.html#_gga_global_positioning_system_fix_data>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FixData {
    /// Tick of the pass that last decoded this record
    pub updated_at: Timestamp,
    /// Talker ID of the decoded sentence, e.g. `GP`
    pub talker: heapless::String<2>,
    /// Fix time in UTC
    pub utc: UtcTime,
    pub latitude: Coordinate<LatitudeHemisphere>,
    pub longitude: Coordinate<LongitudeHemisphere>,
    /// GPS Quality Indicator, 0 = no fix
    pub quality: u8,
    /// Number of satellites in use
    pub satellites: u8,
    /// Horizontal Dilution of Precision
    pub hdop: f32,
    /// Altitude above/below mean sea level (geoid)
    pub altitude: f32,
    /// Unit of `altitude`; unset until a unit has been received
    pub altitude_unit: Option<LengthUnit>,
    /// Geoidal separation, the difference between the WGS-84 earth ellipsoid and mean sea level (geoid)
    pub geoidal_separation: f32,
    pub geoidal_separation_unit: Option<LengthUnit>,
    /// Age of differential GPS data in whole seconds, [`NO_CORRECTION_AGE`] when DGPS is not used
    pub age_of_correction: i8,
    /// Differential reference station ID
    pub station_id: heapless::String<4>,
    /// The checksum token as received
    pub checksum: heapless::String<2>,
}

impl FixData {
    /// The fix time, if it is a valid time of day.
    pub fn utc_time(&self) -> Option<time::Time> {
        self.utc.to_time()
    }
}

impl Decode for FixData {
    const SENTENCE: SentenceType = SentenceType::Fix;

    fn decode(&mut self, fields: &mut Fields<'_>, ctx: &DecodeContext<'_>) {
        let (time, fraction) = (fields.next_field(), fields.next_field());
        self.utc = UtcTime::decode(time, fraction);

        let (latitude, north_south) = (fields.next_field(), fields.next_field());
        self.latitude.decode(latitude, north_south, ctx.coordinates);

        let (longitude, east_west) = (fields.next_field(), fields.next_field());
        self.longitude.decode(longitude, east_west, ctx.coordinates);

        self.quality = fields.next_field().integer().unwrap_or(0);
        self.satellites = fields.next_field().integer().unwrap_or(0);
        self.hdop = fields.next_field().real().unwrap_or_default() as f32;

        self.altitude = fields.next_field().real().unwrap_or_default() as f32;
        if let Some(unit) = fields.next_field().enumerated() {
            self.altitude_unit = Some(unit);
        }

        self.geoidal_separation = fields.next_field().real().unwrap_or_default() as f32;
        if let Some(unit) = fields.next_field().enumerated() {
            self.geoidal_separation_unit = Some(unit);
        }

        self.age_of_correction = fields
            .next_field()
            .integer_part()
            .unwrap_or(NO_CORRECTION_AGE);
        self.station_id = fields.next_field().fixed_text();
        self.checksum = fields.next_field().fixed_text();

        self.talker = ascii_string(ctx.talker);
        self.updated_at = ctx.now;
    }
}
