use std::time::Duration;

use nmea0183_capture::{
    Clock, EngineBuilder, FlushPolicy, ManualClock, SentenceSet, Talker, Timestamp,
};

/// A burst as a receiver sends it once per second, with some line noise in front.
const BURST: &[u8] = b"\xff\xfe#noise\r\n\
$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n\
$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W,A*07\r\n\
$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*25\r\n\
$GPZDA,153045.25,20,11,2023,-03,30*4B\r\n";

fn main() {
    let mut engine = EngineBuilder::new()
        .flush_policy(FlushPolicy::IdleAware {
            min_idle: Duration::from_millis(20),
        })
        .sentences(SentenceSet::all())
        .talker(Talker::Any)
        .build();

    // At 9600 baud a byte takes about a millisecond.
    let clock = ManualClock::new(Timestamp::ZERO);
    let intake = engine.intake(clock.clone());

    for (index, &byte) in BURST.iter().enumerate() {
        clock.advance(Duration::from_millis(1));
        intake.on_byte_received(byte);

        // Poll the way a main loop would, every 32 bytes.
        if index % 32 == 31 {
            let report = engine.process(clock.now());
            if !report.decoded.is_empty() || report.flushed.is_some() {
                println!("t={:>4} ms: {report:?}", clock.now().as_millis());
            }
        }
    }

    clock.advance(Duration::from_millis(50));
    let report = engine.process(clock.now());
    println!("t={:>4} ms: {report:?}", clock.now().as_millis());

    if let Some(fix) = engine.fix() {
        println!(
            "GGA  {:?}  lat {:.5} lon {:.5}  alt {} {:?}  sats {}",
            fix.utc_time(),
            fix.latitude.value,
            fix.longitude.value,
            fix.altitude,
            fix.altitude_unit,
            fix.satellites
        );
    }

    if let Some(rmc) = engine.recommended_minimum() {
        println!(
            "RMC  {:?}  {:?}  {} kn  {}°",
            rmc.date_time(),
            rmc.status,
            rmc.speed_knots,
            rmc.course_true
        );
    }

    if let Some(vtg) = engine.course_speed() {
        println!(
            "VTG  {} kn  {} km/h  mode {:?}",
            vtg.speed_knots.value, vtg.speed_kph.value, vtg.mode
        );
    }

    if let Some(zda) = engine.time_date() {
        println!("ZDA  {:?}", zda.offset_date_time());
    }
}
