use std::{sync::Arc, thread};

use pretty_assertions::assert_eq;
use simfile_rs::prelude::*;

const EPSILON: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

/// A gimmick-heavy timing: BPM changes, stops, delays, coincident events and warps.
fn gimmick_data() -> TimingData {
    let mut data = TimingData::with_bpm(150.0).unwrap();
    data.set_offset(0.3);
    data.insert_bpm(8.0, 300.0).unwrap();
    data.insert_bpm(24.0, 75.0).unwrap();
    data.insert_bpm(40.0, 150.0).unwrap();
    data.insert_stop(4.0, 0.5).unwrap();
    data.insert_delay(12.0, 0.25).unwrap();
    data.insert_stop(20.0, 1.0).unwrap();
    data.insert_delay(20.0, 0.5).unwrap();
    data.insert_warp(28.0, 4.0).unwrap();
    data.insert_warp(30.0, 6.0).unwrap();
    data.insert_stop(44.0, 0.2).unwrap();
    data.insert_warp(44.0, 2.0).unwrap();
    data
}

fn is_regular(timing: &Timing, beat: f64) -> bool {
    !timing.is_warp(beat) && !timing.is_pause(beat)
}

#[test]
fn test_round_trip_outside_pauses_and_warps() {
    let timing = Timing::new(&gimmick_data()).unwrap();
    for step in 0..=480 {
        let beat = f64::from(step) * 0.125;
        if !is_regular(&timing, beat) {
            continue;
        }
        let time = timing.time_at(beat).unwrap();
        assert_close(timing.beat_at(time), beat);
    }
}

#[test]
fn test_monotonic() {
    let timing = Timing::new(&gimmick_data()).unwrap();
    let mut last_time = f64::NEG_INFINITY;
    for step in 0..=480 {
        let time = timing.time_at(f64::from(step) * 0.125).unwrap();
        assert!(time >= last_time, "time went back at step {step}");
        last_time = time;
    }
    let mut last_beat = f64::NEG_INFINITY;
    for step in -20..=600 {
        let beat = timing.beat_at(f64::from(step) * 0.05);
        assert!(beat >= last_beat, "beat went back at step {step}");
        last_beat = beat;
    }
}

#[test]
fn test_stop_advances_following_beats() {
    let plain = Timing::new(&TimingData::with_bpm(120.0).unwrap()).unwrap();
    let mut data = TimingData::with_bpm(120.0).unwrap();
    data.insert_stop(4.0, 1.5).unwrap();
    let stopped = Timing::new(&data).unwrap();

    assert_close(stopped.time_at(3.5).unwrap(), plain.time_at(3.5).unwrap());
    assert_close(stopped.time_at(4.0).unwrap(), plain.time_at(4.0).unwrap() + 1.5);
    assert_close(stopped.time_at(4.5).unwrap(), plain.time_at(4.5).unwrap() + 1.5);
    for step in 0..=15 {
        let time = 2.0 + f64::from(step) * 0.1;
        assert_close(stopped.beat_at(time), 4.0);
    }
    assert_eq!(stopped.pause_length(4.0), 1.5);
}

#[test]
fn test_warp_is_unreachable() {
    let timing = Timing::new(&gimmick_data()).unwrap();
    assert_eq!(timing.warp_ranges(), &[(28.0, 36.0), (44.0, 46.0)]);
    for step in 0..=2000 {
        let beat = timing.beat_at(f64::from(step) * 0.01);
        for &(start, end) in timing.warp_ranges() {
            assert!(
                !(beat > start && beat < end),
                "beat {beat} is inside the warp {start}..{end}"
            );
        }
    }
    let warp_time = timing.time_at(28.0).unwrap();
    assert_close(timing.time_at(36.0).unwrap(), warp_time);
    assert_close(timing.beat_at(warp_time), 36.0);
    assert!(timing.is_warp(28.0));
    assert!(timing.is_warp(35.9));
    assert!(!timing.is_warp(36.0));
}

#[test]
fn test_pause_on_warp_start() {
    let timing = Timing::new(&gimmick_data()).unwrap();
    let before = timing.time_at(43.0).unwrap();
    assert_close(timing.time_at(44.0).unwrap(), before + 0.4 + 0.2);
    assert_close(timing.time_at(46.0).unwrap(), before + 0.4 + 0.2);
    assert_close(timing.beat_at(before + 0.5), 44.0);
}

#[test]
fn test_invalid_timing_data() {
    assert_eq!(
        Timing::new(&TimingData::new()).err(),
        Some(TimingError::MissingInitialBpm)
    );

    let mut late = TimingData::new();
    late.insert_bpm(1.0, 120.0).unwrap();
    assert_eq!(
        Timing::new(&late).err(),
        Some(TimingError::MissingInitialBpm)
    );

    let mut negative = TimingData::with_bpm(120.0).unwrap();
    negative.insert_stop(-1.0, 0.5).unwrap();
    assert_eq!(
        Timing::new(&negative).err(),
        Some(TimingError::NegativeBeat(-1.0))
    );

    let mut unbounded = TimingData::with_bpm(120.0).unwrap();
    unbounded.insert_delay(4.0, f64::INFINITY).unwrap();
    assert!(matches!(
        Timing::new(&unbounded),
        Err(TimingError::InvalidPause { .. })
    ));

    let zero = TimingData::with_bpm(0.0).unwrap();
    assert_eq!(
        Timing::new(&zero).err(),
        Some(TimingError::InvalidBpm { beat: 0.0, bpm: 0.0 })
    );

    assert!(matches!(
        TimingData::new().insert_bpm(f64::NAN, 120.0),
        Err(TimingError::NonFiniteBeat(_))
    ));
}

#[test]
fn test_time_query_out_of_range() {
    let timing = Timing::new(&TimingData::with_bpm(120.0).unwrap()).unwrap();
    assert_eq!(timing.time_at(-0.5), Err(TimingError::BeatOutOfRange(-0.5)));
    assert!(timing.time_at(f64::INFINITY).is_err());
    assert_close(timing.beat_at(-1.0), -2.0);
}

#[test]
fn test_shared_across_threads() {
    let timing = Arc::new(Timing::new(&gimmick_data()).unwrap());
    let expected: Vec<f64> = (0..100)
        .map(|step| timing.beat_at(f64::from(step) * 0.2))
        .collect();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let timing = Arc::clone(&timing);
            thread::spawn(move || {
                (0..100)
                    .map(|step| timing.beat_at(f64::from(step) * 0.2))
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_parse_on_worker_threads() {
    let sources = [
        (include_str!("files/sample.sm"), SimfileFormat::Sm),
        (include_str!("files/sample.ssc"), SimfileFormat::Ssc),
        (include_str!("files/sample.dwi"), SimfileFormat::Dwi),
    ];
    let handles: Vec<_> = sources
        .into_iter()
        .map(|(source, format)| {
            thread::spawn(move || {
                let output = parse_simfile(source, format, &ParseConfig::default()).unwrap();
                Timing::new(&output.song.timing).map(|timing| timing.time_at(1.0))
            })
        })
        .collect();
    for handle in handles {
        assert!(matches!(handle.join().unwrap(), Ok(Ok(_))));
    }
}
