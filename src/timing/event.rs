//! Merging the event tables into one ordered sequence of key beats.

use itertools::Itertools;

use super::TimingData;

/// A kind of key beat, with its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum KeyEventKind {
    /// The end of a warp, synthesized at `beat + length`.
    WarpEnd,
    /// A delay of the seconds.
    Delay(f64),
    /// A stop of the seconds.
    Stop(f64),
    /// The start of a warp.
    WarpStart,
    /// A BPM change to the value.
    Bpm(f64),
}

impl KeyEventKind {
    /// Events ending a segment come before the ones starting a new segment on the same beat.
    const fn priority(self) -> u8 {
        match self {
            Self::WarpEnd => 0,
            Self::Delay(_) => 1,
            Self::Stop(_) => 2,
            Self::WarpStart => 3,
            Self::Bpm(_) => 4,
        }
    }
}

/// An event on a key beat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct KeyEvent {
    pub beat: f64,
    pub kind: KeyEventKind,
}

/// Merges all events of `data` ordered by beat, then by [`KeyEventKind::priority`].
///
/// Zero-length pauses and warps are dropped since they do not bend the graph.
pub(crate) fn merge(data: &TimingData) -> Vec<KeyEvent> {
    let bpms = data.bpms().map(|(beat, bpm)| KeyEvent {
        beat,
        kind: KeyEventKind::Bpm(bpm),
    });
    let stops = data
        .stops()
        .filter(|&(_, seconds)| seconds > 0.0)
        .map(|(beat, seconds)| KeyEvent {
            beat,
            kind: KeyEventKind::Stop(seconds),
        });
    let delays = data
        .delays()
        .filter(|&(_, seconds)| seconds > 0.0)
        .map(|(beat, seconds)| KeyEvent {
            beat,
            kind: KeyEventKind::Delay(seconds),
        });
    let warps = data
        .warps()
        .filter(|&(_, length)| length > 0.0)
        .flat_map(|(beat, length)| {
            [
                KeyEvent {
                    beat,
                    kind: KeyEventKind::WarpStart,
                },
                KeyEvent {
                    beat: beat + length,
                    kind: KeyEventKind::WarpEnd,
                },
            ]
        });
    bpms.chain(stops)
        .chain(delays)
        .chain(warps)
        .sorted_by(|a, b| {
            a.beat
                .total_cmp(&b.beat)
                .then_with(|| a.kind.priority().cmp(&b.kind.priority()))
        })
        .collect()
}

/// Merges the warps of `data` into disjoint `(start, end)` beat ranges in beat order.
///
/// Overlapping or touching warps become one range.
pub(crate) fn warp_ranges(data: &TimingData) -> Vec<(f64, f64)> {
    data.warps()
        .filter(|&(_, length)| length > 0.0)
        .map(|(beat, length)| (beat, beat + length))
        .coalesce(|(start, end), (next_start, next_end)| {
            if next_start <= end {
                Ok((start, end.max(next_end)))
            } else {
                Err(((start, end), (next_start, next_end)))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tie_break_on_same_beat() {
        let mut data = TimingData::with_bpm(120.0).unwrap();
        data.insert_bpm(2.0, 180.0).unwrap();
        data.insert_stop(2.0, 0.5).unwrap();
        data.insert_delay(2.0, 0.25).unwrap();
        data.insert_warp(2.0, 1.0).unwrap();
        data.insert_warp(1.0, 1.0).unwrap();
        data.insert_stop(3.0, 0.0).unwrap();

        let kinds: Vec<_> = merge(&data)
            .into_iter()
            .map(|event| (event.beat, event.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (0.0, KeyEventKind::Bpm(120.0)),
                (1.0, KeyEventKind::WarpStart),
                (2.0, KeyEventKind::WarpEnd),
                (2.0, KeyEventKind::Delay(0.25)),
                (2.0, KeyEventKind::Stop(0.5)),
                (2.0, KeyEventKind::WarpStart),
                (2.0, KeyEventKind::Bpm(180.0)),
                (3.0, KeyEventKind::WarpEnd),
            ]
        );
    }

    #[test]
    fn test_warp_ranges_coalesce() {
        let mut data = TimingData::with_bpm(120.0).unwrap();
        data.insert_warp(1.0, 2.0).unwrap();
        data.insert_warp(2.0, 0.5).unwrap();
        data.insert_warp(3.0, 1.0).unwrap();
        data.insert_warp(6.0, 1.0).unwrap();
        data.insert_warp(8.0, 0.0).unwrap();
        assert_eq!(warp_ranges(&data), vec![(1.0, 4.0), (6.0, 7.0)]);
    }
}
