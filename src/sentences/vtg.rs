#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Decode, DecodeContext, FaaMode, Field, Fields, VtgLabel, field::ascii_string};
use crate::{clock::Timestamp, config::SentenceType};

/// A VTG value with the label letter that follows it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Labelled {
    pub value: f32,
    /// Set once the expected label letter has been received.
    pub label: Option<VtgLabel>,
}

impl Labelled {
    fn decode(&mut self, value: Field<'_>, label: Field<'_>) {
        self.value = value.real().unwrap_or_default() as f32;
        if let Some(label) = label.enumerated() {
            self.label = Some(label);
        }
    }
}

/// VTG - Track made good and Ground speed
///
/// <https://gpsd.gitlab.io/gpsd/NMEA.html#_vtg_track_made_good_and_ground_speed>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CourseSpeed {
    pub updated_at: Timestamp,
    pub talker: heapless::String<2>,
    /// Course over ground, degrees true
    pub course_true: Labelled,
    /// Course over ground, degrees magnetic
    pub course_magnetic: Labelled,
    /// Speed over ground, knots
    pub speed_knots: Labelled,
    /// Speed over ground, kilometers per hour
    pub speed_kph: Labelled,
    pub mode: Option<FaaMode>,
    pub checksum: heapless::String<2>,
}

impl Decode for CourseSpeed {
    const SENTENCE: SentenceType = SentenceType::CourseSpeed;

    fn decode(&mut self, fields: &mut Fields<'_>, ctx: &DecodeContext<'_>) {
        for value in [
            &mut self.course_true,
            &mut self.course_magnetic,
            &mut self.speed_knots,
            &mut self.speed_kph,
        ] {
            let (number, label) = (fields.next_field(), fields.next_field());
            value.decode(number, label);
        }

        if let Some(mode) = fields.next_field().enumerated() {
            self.mode = Some(mode);
        }

        self.checksum = fields.next_field().fixed_text();
        self.talker = ascii_string(ctx.talker);
        self.updated_at = ctx.now;
    }
}
