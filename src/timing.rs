//! The beat/time timing engine.
//!
//! [`TimingData`] holds the sparse events declared by a simfile: BPM changes, stops, delays and
//! warps. [`Timing`] turns them into a pair of monotonic piecewise linear functions between the
//! playback time in seconds and the beat position:
//!
//! - [`Timing::beat_at`]: time to beat. A pause is a flat segment, so every time inside it maps to
//!   the paused beat. A warp is a vertical jump, so the instant of the warp maps to the beat after
//!   it.
//! - [`Timing::time_at`]: beat to time. A pause is a vertical jump, so the paused beat maps to the
//!   end of the pause. A warp is a flat segment, so every beat inside it maps to the same instant.
//!
//! Both queries are `O(log n)` on the count of events, so they can be called every audio frame.
//!
//! # Example
//!
//! ```
//! use simfile_rs::timing::{Timing, TimingData};
//!
//! let mut data = TimingData::with_bpm(120.0).unwrap();
//! data.insert_stop(4.0, 1.0).unwrap();
//! let timing = Timing::new(&data).unwrap();
//!
//! assert_eq!(timing.time_at(4.0).unwrap(), 3.0);
//! assert_eq!(timing.beat_at(2.5), 4.0);
//! assert_eq!(timing.beat_at(3.5), 5.0);
//! ```

mod data;
mod event;
mod graph;

use itertools::Itertools;
use thiserror::Error;

pub use self::data::TimingData;
use self::{
    event::{KeyEventKind, merge, warp_ranges},
    graph::Graph,
};

/// An error occurred when building or querying a [`Timing`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimingError {
    /// There is no BPM, or no BPM at beat 0.
    #[error("no BPM is declared at beat 0")]
    MissingInitialBpm,
    /// A BPM is zero, negative or not finite.
    #[error("BPM {bpm} at beat {beat} is not a positive finite number")]
    InvalidBpm {
        /// The beat of the BPM change.
        beat: f64,
        /// The declared BPM.
        bpm: f64,
    },
    /// A stop or delay is negative or lasts forever.
    #[error("pause of {length} seconds at beat {beat} is negative or unbounded")]
    InvalidPause {
        /// The beat of the pause.
        beat: f64,
        /// The declared length in seconds.
        length: f64,
    },
    /// A warp is negative or skips forever.
    #[error("warp of {length} beats at beat {beat} is negative or unbounded")]
    InvalidWarp {
        /// The beat of the warp.
        beat: f64,
        /// The declared length in beats.
        length: f64,
    },
    /// An event is declared at a negative beat.
    #[error("event declared at negative beat {0}")]
    NegativeBeat(f64),
    /// An event is declared at a beat which is not finite.
    #[error("event declared at non-finite beat {0}")]
    NonFiniteBeat(f64),
    /// The offset is not finite.
    #[error("offset {0} is not finite")]
    NonFiniteOffset(f64),
    /// The time was queried at a negative or non-finite beat.
    #[error("cannot get the time at beat {0}")]
    BeatOutOfRange(f64),
}

/// Result of building or querying timing.
pub type Result<T> = std::result::Result<T, TimingError>;

/// Mutually inverse mappings between the beat and the playback time, built from [`TimingData`].
///
/// It is immutable once built, and can be shared between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    data: TimingData,
    /// `x` is time and `y` is beat.
    beat_graph: Graph,
    /// `x` is beat and `y` is time.
    time_graph: Graph,
    warps: Vec<(f64, f64)>,
}

fn push_point(points: &mut Vec<(f64, f64)>, point: (f64, f64)) {
    if points.last() != Some(&point) {
        points.push(point);
    }
}

/// Holds `beat` for the accumulated `pause` seconds, as a flat segment on the beat graph.
fn flush_pause(points: &mut Vec<(f64, f64)>, time: &mut f64, pause: &mut f64, beat: f64) {
    if *pause > 0.0 {
        push_point(points, (*time, beat));
        *time += *pause;
        push_point(points, (*time, beat));
        *pause = 0.0;
    }
}

impl Timing {
    /// Builds the timing from a snapshot of `data`.
    ///
    /// # Errors
    ///
    /// - [`TimingError::MissingInitialBpm`] if no BPM is declared at beat 0.
    /// - [`TimingError::NegativeBeat`] if an event is before beat 0.
    /// - [`TimingError::InvalidBpm`], [`TimingError::InvalidPause`] or [`TimingError::InvalidWarp`]
    ///   if an event has an unusable value.
    /// - [`TimingError::NonFiniteOffset`] if the offset is not finite.
    pub fn new(data: &TimingData) -> Result<Self> {
        data.validate()?;
        let initial_bps = data
            .bpm_at(0.0)
            .ok_or(TimingError::MissingInitialBpm)?
            / 60.0;

        let mut time = data.offset();
        let mut beat = 0.0;
        let mut bps = initial_bps;
        let mut warp_depth = 0usize;
        let mut points = vec![(time, beat)];

        let events = merge(data);
        for (key_beat, group) in &events.iter().chunk_by(|event| event.beat) {
            if warp_depth == 0 {
                time += (key_beat - beat) / bps;
                push_point(&mut points, (time, key_beat));
            }
            beat = key_beat;

            let mut pause = 0.0;
            for event in group {
                match event.kind {
                    KeyEventKind::WarpEnd => warp_depth = warp_depth.saturating_sub(1),
                    KeyEventKind::Delay(seconds) | KeyEventKind::Stop(seconds) => {
                        if warp_depth == 0 {
                            pause += seconds;
                        }
                    }
                    KeyEventKind::WarpStart => {
                        flush_pause(&mut points, &mut time, &mut pause, beat);
                        warp_depth += 1;
                    }
                    KeyEventKind::Bpm(bpm) => bps = bpm / 60.0,
                }
            }
            flush_pause(&mut points, &mut time, &mut pause, beat);
            if warp_depth == 0 {
                push_point(&mut points, (time, beat));
            }
        }

        log::trace!(
            "built timing graph of {} points from {} key events",
            points.len(),
            events.len()
        );
        let beat_graph = Graph::new(points, initial_bps, bps);
        let time_graph = beat_graph.inverted();
        Ok(Self {
            data: data.clone(),
            beat_graph,
            time_graph,
            warps: warp_ranges(data),
        })
    }

    /// Returns the timing data this was built from.
    #[must_use]
    pub const fn data(&self) -> &TimingData {
        &self.data
    }

    /// Returns the time in seconds at which beat 0 is played.
    #[must_use]
    pub const fn offset(&self) -> f64 {
        self.data.offset()
    }

    /// Returns the beat at the playback `time` in seconds.
    ///
    /// A time before the first event is extrapolated with the initial BPM, so this also works on
    /// the lead-in before beat 0. The instant of a warp resolves to the beat after the warp.
    #[must_use]
    pub fn beat_at(&self, time: f64) -> f64 {
        self.beat_graph.query(time)
    }

    /// Returns the playback time in seconds at `beat`.
    ///
    /// A beat with a stop or delay resolves to the end of the pause.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError::BeatOutOfRange`] if `beat` is negative or not finite.
    pub fn time_at(&self, beat: f64) -> Result<f64> {
        if !beat.is_finite() || beat < 0.0 {
            return Err(TimingError::BeatOutOfRange(beat));
        }
        Ok(self.time_graph.query(beat))
    }

    /// Returns the BPM in effect at `beat`, or `None` if `beat` is not finite.
    #[must_use]
    pub fn bpm_at(&self, beat: f64) -> Option<f64> {
        self.data.bpm_at(beat)
    }

    /// Returns whether a stop or delay is at exactly `beat`.
    #[must_use]
    pub fn is_pause(&self, beat: f64) -> bool {
        self.data.is_pause(beat)
    }

    /// Returns the total length in seconds of the stop and delay at exactly `beat`.
    #[must_use]
    pub fn pause_length(&self, beat: f64) -> f64 {
        self.data.pause_length(beat)
    }

    /// Returns whether `beat` is skipped by a warp, from the warp start inclusive to its end
    /// exclusive.
    #[must_use]
    pub fn is_warp(&self, beat: f64) -> bool {
        let index = self.warps.partition_point(|&(start, _)| start <= beat);
        index
            .checked_sub(1)
            .and_then(|i| self.warps.get(i))
            .is_some_and(|&(_, end)| beat < end)
    }

    /// Returns the warped beat ranges as `(start, end)`, disjoint and in beat order.
    #[must_use]
    pub fn warp_ranges(&self) -> &[(f64, f64)] {
        &self.warps
    }

    /// Returns the corners of the beat graph as `(time, beat)`, in order.
    #[must_use]
    pub fn points(&self) -> &[(f64, f64)] {
        self.beat_graph.points()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn timing(build: impl FnOnce(&mut TimingData)) -> Timing {
        let mut data = TimingData::with_bpm(120.0).unwrap();
        build(&mut data);
        Timing::new(&data).unwrap()
    }

    #[test]
    fn test_constant_bpm() {
        let timing = timing(|data| data.set_offset(0.5));
        assert_close(timing.time_at(0.0).unwrap(), 0.5);
        assert_close(timing.time_at(2.0).unwrap(), 1.5);
        assert_close(timing.beat_at(1.5), 2.0);
        assert_close(timing.beat_at(0.0), -1.0);
        assert_eq!(timing.points(), &[(0.5, 0.0)]);
    }

    #[test]
    fn test_bpm_change() {
        let timing = timing(|data| {
            data.insert_bpm(4.0, 60.0).unwrap();
        });
        assert_close(timing.time_at(4.0).unwrap(), 2.0);
        assert_close(timing.time_at(6.0).unwrap(), 4.0);
        assert_close(timing.beat_at(3.0), 5.0);
        assert_close(timing.beat_at(10.0), 12.0);
        assert_eq!(timing.bpm_at(5.0), Some(60.0));
    }

    #[test]
    fn test_stop_holds_beat() {
        let plain = timing(|_| {});
        let stopped = timing(|data| {
            data.insert_stop(4.0, 1.0).unwrap();
        });
        assert_close(stopped.time_at(4.0).unwrap(), 3.0);
        assert_close(stopped.time_at(3.5).unwrap(), 1.75);
        assert_close(
            stopped.time_at(5.0).unwrap() - plain.time_at(5.0).unwrap(),
            1.0,
        );
        assert_close(stopped.beat_at(2.0), 4.0);
        assert_close(stopped.beat_at(2.5), 4.0);
        assert_close(stopped.beat_at(3.25), 4.5);
        assert!(stopped.is_pause(4.0));
        assert_close(stopped.pause_length(4.0), 1.0);
    }

    #[test]
    fn test_stop_and_delay_accumulate() {
        let timing = timing(|data| {
            data.insert_stop(2.0, 0.5).unwrap();
            data.insert_delay(2.0, 0.25).unwrap();
        });
        assert_close(timing.time_at(2.0).unwrap(), 1.75);
        assert_close(timing.beat_at(1.5), 2.0);
        assert_eq!(timing.points(), &[(0.0, 0.0), (1.0, 2.0), (1.75, 2.0)]);
    }

    #[test]
    fn test_zero_length_pause_is_ignored() {
        let timing = timing(|data| {
            data.insert_stop(2.0, 0.0).unwrap();
        });
        assert_close(timing.time_at(3.0).unwrap(), 1.5);
        assert!(!timing.is_pause(2.0));
    }

    #[test]
    fn test_warp_skips_beats() {
        let timing = timing(|data| {
            data.insert_warp(4.0, 2.0).unwrap();
        });
        assert_close(timing.time_at(4.0).unwrap(), 2.0);
        assert_close(timing.time_at(5.0).unwrap(), 2.0);
        assert_close(timing.time_at(6.0).unwrap(), 2.0);
        assert_close(timing.time_at(7.0).unwrap(), 2.5);
        assert_close(timing.beat_at(2.0), 6.0);
        assert_close(timing.beat_at(1.5), 3.0);
        assert_close(timing.beat_at(2.5), 7.0);
        assert!(timing.is_warp(4.0));
        assert!(timing.is_warp(5.5));
        assert!(!timing.is_warp(6.0));
        assert!(!timing.is_warp(3.9));
    }

    #[test]
    fn test_nested_and_adjacent_warps_jump_once() {
        let timing = timing(|data| {
            data.insert_warp(2.0, 4.0).unwrap();
            data.insert_warp(3.0, 1.0).unwrap();
            data.insert_warp(8.0, 1.0).unwrap();
            data.insert_warp(9.0, 1.0).unwrap();
        });
        assert_eq!(
            timing.points(),
            &[(0.0, 0.0), (1.0, 2.0), (1.0, 6.0), (2.0, 8.0), (2.0, 10.0)]
        );
        assert_close(timing.beat_at(1.0), 6.0);
        assert_close(timing.beat_at(2.0), 10.0);
        assert_close(timing.time_at(9.5).unwrap(), 2.0);
        assert_eq!(timing.warp_ranges(), &[(2.0, 6.0), (8.0, 10.0)]);
    }

    #[test]
    fn test_pause_inside_warp_is_ignored() {
        let timing = timing(|data| {
            data.insert_warp(2.0, 2.0).unwrap();
            data.insert_stop(3.0, 5.0).unwrap();
        });
        assert_close(timing.time_at(5.0).unwrap(), 1.5);
    }

    #[test]
    fn test_pause_then_warp_on_same_beat() {
        let timing = timing(|data| {
            data.insert_stop(2.0, 1.0).unwrap();
            data.insert_warp(2.0, 2.0).unwrap();
        });
        assert_close(timing.beat_at(1.5), 2.0);
        assert_close(timing.beat_at(2.0), 4.0);
        assert_close(timing.time_at(2.0).unwrap(), 2.0);
        assert_close(timing.time_at(5.0).unwrap(), 2.5);
    }

    #[test]
    fn test_bpm_change_inside_warp() {
        let timing = timing(|data| {
            data.insert_warp(2.0, 2.0).unwrap();
            data.insert_bpm(3.0, 60.0).unwrap();
        });
        assert_close(timing.time_at(4.0).unwrap(), 1.0);
        assert_close(timing.time_at(5.0).unwrap(), 2.0);
    }

    #[test]
    fn test_round_trip_and_monotonic() {
        let timing = timing(|data| {
            data.set_offset(-0.2);
            data.insert_bpm(3.0, 200.0).unwrap();
            data.insert_bpm(7.5, 95.0).unwrap();
            data.insert_stop(5.0, 0.3).unwrap();
            data.insert_delay(9.0, 0.4).unwrap();
            data.insert_warp(12.0, 1.5).unwrap();
            data.insert_bpm(16.0, 150.0).unwrap();
        });

        let beats: Vec<f64> = (0..80).map(|i| f64::from(i) * 0.25).collect();
        for &beat in &beats {
            if timing.is_pause(beat) || timing.is_warp(beat) {
                continue;
            }
            let time = timing.time_at(beat).unwrap();
            assert_close(timing.beat_at(time), beat);
        }
        for (&a, &b) in beats.iter().tuple_windows() {
            assert!(timing.time_at(a).unwrap() <= timing.time_at(b).unwrap());
        }
        let times: Vec<f64> = (-10..200).map(|i| f64::from(i) * 0.05).collect();
        for (&a, &b) in times.iter().tuple_windows() {
            assert!(timing.beat_at(a) <= timing.beat_at(b));
        }
    }

    #[test]
    fn test_warp_instant_never_lands_inside() {
        let timing = timing(|data| {
            data.insert_warp(4.0, 3.0).unwrap();
        });
        let instant = timing.time_at(4.0).unwrap();
        for offset in [-1e-9, 0.0, 1e-9] {
            let beat = timing.beat_at(instant + offset);
            assert!(beat <= 4.0 || beat >= 7.0, "{beat} is inside the warp");
        }
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            Timing::new(&TimingData::new()),
            Err(TimingError::MissingInitialBpm)
        );
        let timing = timing(|_| {});
        assert_eq!(timing.time_at(-1.0), Err(TimingError::BeatOutOfRange(-1.0)));
        assert!(timing.time_at(f64::NAN).is_err());
        assert!(timing.time_at(f64::INFINITY).is_err());
    }

    #[test]
    fn test_shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Timing>();

        let timing = std::sync::Arc::new(timing(|_| {}));
        let handle = {
            let timing = std::sync::Arc::clone(&timing);
            std::thread::spawn(move || timing.beat_at(1.0))
        };
        assert_close(handle.join().unwrap(), 2.0);
    }
}
