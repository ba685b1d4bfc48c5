use pretty_assertions::assert_eq;

use crate::{
    ByteIntake, ChecksumMode, Clock, CoordinateConvention, Engine, EngineBuilder, ManualClock,
    SentenceSet, Talker, Timestamp,
    sentences::{LatitudeHemisphere, LengthUnit, LongitudeHemisphere, Status, packed_degrees},
};

const GGA: &[u8] = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
const RMC: &[u8] = b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W,A*07\r\n";
const VTG: &[u8] = b"$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*25\r\n";
const ZDA: &[u8] = b"$GPZDA,201530.00,04,07,2002,00,00*60\r\n";

fn setup(builder: EngineBuilder) -> (Engine, ByteIntake<ManualClock>, ManualClock) {
    let engine = builder.build();
    let clock = ManualClock::new(Timestamp::ZERO);
    let intake = engine.intake(clock.clone());
    (engine, intake, clock)
}

/// Feeds `bytes` one millisecond apart.
fn feed(intake: &ByteIntake<ManualClock>, bytes: &[u8]) {
    for &byte in bytes {
        intake.clock().advance(std::time::Duration::from_millis(1));
        intake.on_byte_received(byte);
    }
}

#[test]
fn test_gga_reference_fix() {
    let (mut engine, intake, clock) = setup(EngineBuilder::new());
    feed(&intake, GGA);

    let report = engine.process(clock.now_plus(2));
    assert_eq!(report.decoded, SentenceSet::GGA);

    let fix = engine.fix().unwrap();
    assert_eq!(fix.talker.as_str(), "GP");
    assert_eq!((fix.utc.hour, fix.utc.minute, fix.utc.second), (12, 35, 19));
    assert!((fix.latitude.value - 48.1173).abs() < 1e-4);
    assert!((fix.longitude.value - 11.516_666_7).abs() < 1e-4);
    assert_eq!(fix.latitude.hemisphere, Some(LatitudeHemisphere::North));
    assert_eq!(fix.longitude.hemisphere, Some(LongitudeHemisphere::East));
    assert!(fix.latitude.valid && fix.longitude.valid);
    assert_eq!((fix.quality, fix.satellites), (1, 8));
    assert_eq!(fix.hdop, 0.9);
    assert_eq!((fix.altitude, fix.altitude_unit), (545.4, Some(LengthUnit::Meters)));
    assert_eq!(fix.geoidal_separation, 46.9);
    assert_eq!(fix.checksum.as_str(), "47");

    // Re-packing the decoded coordinates gives back the transmitted digits.
    assert!((packed_degrees(fix.latitude.value) - 4807.038).abs() < 1e-4);
    assert!((packed_degrees(fix.longitude.value) - 1131.000).abs() < 1e-4);
}

#[test]
fn test_empty_altitude_leaves_unit_unset() {
    let (mut engine, intake, clock) = setup(EngineBuilder::new());
    feed(&intake, b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,,,46.9,M,,*24\r\n");

    engine.process(clock.now_plus(1));

    let fix = engine.fix().unwrap();
    assert_eq!(fix.altitude, 0.0);
    assert_eq!(fix.altitude_unit, None);
    assert_eq!(fix.geoidal_separation_unit, Some(LengthUnit::Meters));
}

#[test]
fn test_back_to_back_sentences_decode_in_one_pass() {
    let (mut engine, intake, clock) = setup(EngineBuilder::new());
    feed(&intake, GGA);
    feed(&intake, VTG);

    let report = engine.process(clock.now_plus(1));
    assert_eq!(report.decoded, SentenceSet::GGA | SentenceSet::VTG);
    assert_eq!(report.flushed, None);

    // Only the trailing line ending of the VTG sentence is left.
    assert_eq!(engine.buffered(), b"\r\n");
    assert_eq!(engine.course_speed().unwrap().speed_kph.value, 10.2);
}

#[test]
fn test_all_four_types() {
    let (mut engine, intake, clock) = setup(EngineBuilder::new());
    for line in [GGA, RMC, VTG, ZDA] {
        feed(&intake, line);
    }

    let report = engine.process(clock.now_plus(1));
    assert_eq!(report.decoded, SentenceSet::all());

    let rmc = engine.recommended_minimum().unwrap();
    assert_eq!(rmc.status, Some(Status::Valid));
    assert_eq!(rmc.speed_knots, 22.4);
    assert!((rmc.magnetic_variation - 3.1).abs() < 1e-6);

    let zda = engine.time_date().unwrap();
    assert_eq!((zda.date.day, zda.date.month, zda.date.year), (4, 7, 2002));
}

#[test]
fn test_checksum_mismatch_is_rejected() {
    let (mut engine, intake, clock) = setup(EngineBuilder::new());
    feed(&intake, b"$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*26\r\n");

    let report = engine.process(clock.now_plus(1));
    assert_eq!(report.decoded, SentenceSet::empty());
    assert_eq!(report.rejected, SentenceSet::VTG);

    let vtg = engine.course_speed().unwrap();
    assert_eq!(vtg.updated_at, Timestamp::ZERO);
    assert_eq!(vtg.speed_knots.value, 0.0);

    // The same bytes decode once verification is off.
    let (mut engine, intake, clock) =
        setup(EngineBuilder::new().checksum_mode(ChecksumMode::Ignore));
    feed(&intake, b"$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*26\r\n");

    let report = engine.process(clock.now_plus(1));
    assert_eq!(report.decoded, SentenceSet::VTG);
    assert_eq!(engine.course_speed().unwrap().checksum.as_str(), "26");
}

#[test]
fn test_corrupt_repeat_does_not_hide_valid_sentence() {
    let (mut engine, intake, clock) = setup(EngineBuilder::new());
    feed(&intake, VTG);
    feed(&intake, b"$GPVTG,099.9,T,034.4,M,005.5,N,010.2,K,A*99\r\n");

    let report = engine.process(clock.now_plus(1));
    assert_eq!(report.decoded, SentenceSet::VTG);
    assert_eq!(report.rejected, SentenceSet::empty());
    assert_eq!(engine.course_speed().unwrap().course_true.value, 54.7);
}

#[test]
fn test_zda_with_trailing_comma() {
    let (mut engine, intake, clock) = setup(EngineBuilder::new());
    feed(&intake, b"$GPZDA,201530.00,04,07,2002,00,00,*4C\r\n");

    let report = engine.process(clock.now_plus(1));
    assert_eq!(report.decoded, SentenceSet::ZDA);

    let zda = engine.time_date().unwrap();
    assert_eq!((zda.date.day, zda.date.month, zda.date.year), (4, 7, 2002));
    assert_eq!(zda.checksum.as_str(), "4C");
}

#[test]
fn test_disabled_types_have_no_record() {
    let (mut engine, intake, clock) =
        setup(EngineBuilder::new().sentences(SentenceSet::RMC | SentenceSet::ZDA));
    feed(&intake, GGA);
    feed(&intake, ZDA);

    let report = engine.process(clock.now_plus(1));
    assert_eq!(report.decoded, SentenceSet::ZDA);

    assert!(engine.fix().is_none());
    assert!(engine.course_speed().is_none());
    assert!(engine.recommended_minimum().is_some());
    assert!(engine.time_date().is_some());
    assert_eq!(engine.grammars().iter().count(), 2);
}

#[test]
fn test_coordinate_conventions() {
    let line = b"$GPGGA,092725.00,4717.11399,S,00833.91590,W,2,12,1.01,499.6,M,48.0,M,3,0120*6C\r\n";

    let cases = [
        (CoordinateConvention::Signed, -1.0),
        (CoordinateConvention::Hemisphere, 1.0),
    ];

    for (convention, sign) in cases {
        let (mut engine, intake, clock) = setup(EngineBuilder::new().coordinates(convention));
        feed(&intake, line);
        engine.process(clock.now_plus(1));

        let fix = engine.fix().unwrap();
        assert!((fix.latitude.value - sign * 47.285_233).abs() < 1e-5, "{convention:?}");
        assert!((fix.longitude.value - sign * 8.565_265).abs() < 1e-5, "{convention:?}");
        assert_eq!(fix.latitude.hemisphere, Some(LatitudeHemisphere::South));
        assert_eq!(fix.longitude.hemisphere, Some(LongitudeHemisphere::West));
        assert_eq!(fix.age_of_correction, 3);
        assert_eq!(fix.station_id.as_str(), "0120");
    }
}

#[test]
fn test_talker_filter() {
    let line = b"$GNGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*59\r\n";

    let cases = [
        (Talker::GPS, SentenceSet::empty()),
        (Talker::Exact(*b"GN"), SentenceSet::GGA),
        (Talker::Any, SentenceSet::GGA),
    ];

    for (talker, decoded) in cases {
        let (mut engine, intake, clock) = setup(EngineBuilder::new().talker(talker));
        feed(&intake, line);

        let report = engine.process(clock.now_plus(1));
        assert_eq!(report.decoded, decoded, "{talker:?}");
    }

    let (mut engine, intake, clock) = setup(EngineBuilder::new().talker(Talker::Any));
    feed(&intake, line);
    engine.process(clock.now_plus(1));
    assert_eq!(engine.fix().unwrap().talker.as_str(), "GN");
}

#[test]
fn test_sentence_split_across_passes() {
    let (mut engine, intake, clock) = setup(EngineBuilder::new());
    let (head, tail) = VTG.split_at(20);

    feed(&intake, head);
    let report = engine.process(clock.now_plus(1));
    assert_eq!(report.decoded, SentenceSet::empty());
    assert_eq!(report.flushed, None);

    feed(&intake, tail);
    let report = engine.process(clock.now_plus(1));
    assert_eq!(report.decoded, SentenceSet::VTG);
}

#[test]
fn test_updated_at_is_the_pass_tick() {
    let (mut engine, intake, clock) = setup(EngineBuilder::new());
    feed(&intake, ZDA);

    let now = clock.now_plus(7);
    engine.process(now);
    assert_eq!(engine.time_date().unwrap().updated_at, now);
}

trait NowPlus {
    fn now_plus(&self, millis: u64) -> Timestamp;
}

impl NowPlus for ManualClock {
    fn now_plus(&self, millis: u64) -> Timestamp {
        Timestamp::from_millis(self.now().as_millis() + millis)
    }
}
