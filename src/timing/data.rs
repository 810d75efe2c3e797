//! Sparse timing events of a song or chart.

use std::collections::BTreeMap;

use strict_num_extended::FinF64;

use super::TimingError;
use crate::util::beat_key;

/// Timing events of a song, keyed by beat.
///
/// This is the raw material parsed from a simfile. It accepts any finite key so that a parser can
/// keep whatever the file declares, and the checks are deferred to [`super::Timing::new`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingData {
    offset: f64,
    bpms: BTreeMap<FinF64, f64>,
    stops: BTreeMap<FinF64, f64>,
    delays: BTreeMap<FinF64, f64>,
    warps: BTreeMap<FinF64, f64>,
}

fn insert_event(
    map: &mut BTreeMap<FinF64, f64>,
    beat: f64,
    value: f64,
) -> Result<Option<f64>, TimingError> {
    let key = beat_key(beat).ok_or(TimingError::NonFiniteBeat(beat))?;
    Ok(map.insert(key, value))
}

fn events(map: &BTreeMap<FinF64, f64>) -> impl DoubleEndedIterator<Item = (f64, f64)> + '_ {
    map.iter().map(|(beat, &value)| (beat.as_f64(), value))
}

fn event_at(map: &BTreeMap<FinF64, f64>, beat: f64) -> Option<f64> {
    map.get(&beat_key(beat)?).copied()
}

impl TimingData {
    /// Creates empty timing data with the offset 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates timing data with the constant `bpm` from beat 0.
    ///
    /// # Errors
    ///
    /// Never fails for a finite beat key, but is kept fallible like the other insertions.
    pub fn with_bpm(bpm: f64) -> Result<Self, TimingError> {
        let mut data = Self::new();
        data.insert_bpm(0.0, bpm)?;
        Ok(data)
    }

    /// Returns the time in seconds at which beat 0 is played.
    #[must_use]
    pub const fn offset(&self) -> f64 {
        self.offset
    }

    /// Sets the time in seconds at which beat 0 is played.
    pub const fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    /// Declares a BPM change at `beat`, returning the replaced value.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError::NonFiniteBeat`] if `beat` is not finite.
    pub fn insert_bpm(&mut self, beat: f64, bpm: f64) -> Result<Option<f64>, TimingError> {
        insert_event(&mut self.bpms, beat, bpm)
    }

    /// Declares a stop of `seconds` at `beat`, returning the replaced value.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError::NonFiniteBeat`] if `beat` is not finite.
    pub fn insert_stop(&mut self, beat: f64, seconds: f64) -> Result<Option<f64>, TimingError> {
        insert_event(&mut self.stops, beat, seconds)
    }

    /// Declares a delay of `seconds` at `beat`, returning the replaced value.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError::NonFiniteBeat`] if `beat` is not finite.
    pub fn insert_delay(&mut self, beat: f64, seconds: f64) -> Result<Option<f64>, TimingError> {
        insert_event(&mut self.delays, beat, seconds)
    }

    /// Declares a warp skipping `length` beats from `beat`, returning the replaced value.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError::NonFiniteBeat`] if `beat` is not finite.
    pub fn insert_warp(&mut self, beat: f64, length: f64) -> Result<Option<f64>, TimingError> {
        insert_event(&mut self.warps, beat, length)
    }

    /// Returns the BPM changes as `(beat, bpm)` in beat order.
    pub fn bpms(&self) -> impl DoubleEndedIterator<Item = (f64, f64)> + '_ {
        events(&self.bpms)
    }

    /// Returns the stops as `(beat, seconds)` in beat order.
    pub fn stops(&self) -> impl DoubleEndedIterator<Item = (f64, f64)> + '_ {
        events(&self.stops)
    }

    /// Returns the delays as `(beat, seconds)` in beat order.
    pub fn delays(&self) -> impl DoubleEndedIterator<Item = (f64, f64)> + '_ {
        events(&self.delays)
    }

    /// Returns the warps as `(beat, length in beats)` in beat order.
    pub fn warps(&self) -> impl DoubleEndedIterator<Item = (f64, f64)> + '_ {
        events(&self.warps)
    }

    /// Replaces every event map which is non-empty in `overlay`, and the offset if `overlay_offset`
    /// is present.
    ///
    /// Used for chart-local timing, where each declared table supersedes the song's one as a whole.
    pub(crate) fn overlay(&mut self, overlay: &Self, overlay_offset: Option<f64>) {
        if let Some(offset) = overlay_offset {
            self.offset = offset;
        }
        for (target, source) in [
            (&mut self.bpms, &overlay.bpms),
            (&mut self.stops, &overlay.stops),
            (&mut self.delays, &overlay.delays),
            (&mut self.warps, &overlay.warps),
        ] {
            if !source.is_empty() {
                target.clone_from(source);
            }
        }
    }

    /// Returns whether no event is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bpms.is_empty()
            && self.stops.is_empty()
            && self.delays.is_empty()
            && self.warps.is_empty()
    }

    /// Returns the BPM in effect at `beat`.
    ///
    /// A beat before the first change gets the first BPM. Returns `None` if there is no BPM or
    /// `beat` is not finite.
    #[must_use]
    pub fn bpm_at(&self, beat: f64) -> Option<f64> {
        let key = beat_key(beat)?;
        self.bpms
            .range(..=key)
            .next_back()
            .or_else(|| self.bpms.first_key_value())
            .map(|(_, &bpm)| bpm)
    }

    /// Returns the sum of the stop and the delay lengths in seconds at exactly `beat`.
    #[must_use]
    pub fn pause_length(&self, beat: f64) -> f64 {
        event_at(&self.stops, beat).unwrap_or(0.0) + event_at(&self.delays, beat).unwrap_or(0.0)
    }

    /// Returns whether a stop or a delay with a positive length is at exactly `beat`.
    #[must_use]
    pub fn is_pause(&self, beat: f64) -> bool {
        self.pause_length(beat) > 0.0
    }

    /// Checks the data can build a [`super::Timing`].
    pub(crate) fn validate(&self) -> Result<(), TimingError> {
        if !self.offset.is_finite() {
            return Err(TimingError::NonFiniteOffset(self.offset));
        }
        for map in [&self.bpms, &self.stops, &self.delays, &self.warps] {
            if let Some((beat, _)) = map.first_key_value()
                && beat.as_f64() < 0.0
            {
                return Err(TimingError::NegativeBeat(beat.as_f64()));
            }
        }
        match self.bpms.first_key_value() {
            Some((beat, _)) if beat.as_f64() <= 0.0 => {}
            _ => return Err(TimingError::MissingInitialBpm),
        }
        if let Some((beat, bpm)) = self
            .bpms()
            .find(|&(_, bpm)| !bpm.is_finite() || bpm <= 0.0)
        {
            return Err(TimingError::InvalidBpm { beat, bpm });
        }
        if let Some((beat, length)) = self
            .stops()
            .chain(self.delays())
            .find(|&(_, length)| !length.is_finite() || length < 0.0)
        {
            return Err(TimingError::InvalidPause { beat, length });
        }
        if let Some((beat, length)) = self
            .warps()
            .find(|&(_, length)| !length.is_finite() || length < 0.0)
        {
            return Err(TimingError::InvalidWarp { beat, length });
        }
        Ok(())
    }
}
