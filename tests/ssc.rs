use pretty_assertions::assert_eq;
use simfile_rs::prelude::*;

const SOURCE: &str = include_str!("files/sample.ssc");

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn parse() -> SimfileOutput {
    parse_simfile(SOURCE, SimfileFormat::Ssc, &ParseConfig::default()).expect("must be parsed")
}

#[test]
fn test_song_timing() {
    let SimfileOutput { song, .. } = parse();
    assert_eq!(song.metadata.selectable, Some(false));
    assert_eq!(song.timing.delays().collect::<Vec<_>>(), vec![(8.0, 0.5)]);
    assert_eq!(song.timing.warps().collect::<Vec<_>>(), vec![(12.0, 4.0)]);

    let timing = Timing::new(&song.timing).unwrap();
    assert_close(timing.time_at(4.0).unwrap(), 3.0);
    assert_close(timing.time_at(8.0).unwrap(), 5.5);
    assert_close(timing.time_at(12.0).unwrap(), 7.5);
    assert_close(timing.time_at(16.0).unwrap(), 7.5);
    assert_close(timing.time_at(20.0).unwrap(), 9.5);

    assert_close(timing.beat_at(2.5), 4.0);
    assert_close(timing.beat_at(5.25), 8.0);
    assert_close(timing.beat_at(7.5), 16.0);
    assert_close(timing.beat_at(-1.0), -2.0);

    assert!(timing.is_pause(4.0));
    assert!(timing.is_pause(8.0));
    assert!(!timing.is_pause(6.0));
    assert!(timing.is_warp(12.0));
    assert!(timing.is_warp(15.5));
    assert!(!timing.is_warp(16.0));
    assert_eq!(timing.warp_ranges(), &[(12.0, 16.0)]);
}

#[test]
fn test_charts() {
    let SimfileOutput { song, warnings } = parse();
    assert_eq!(song.charts.len(), 3);

    let hard = song
        .chart(ChartType::DanceSingle, DifficultyClass::Hard)
        .unwrap();
    assert_eq!(hard.name.as_deref(), Some("Song timing"));
    assert_eq!(hard.description, None);
    assert_eq!(hard.credit.as_deref(), Some("Tester"));
    assert_eq!(hard.radar_values, vec![0.5; 5]);
    assert_eq!(hard.timing, None);
    assert_eq!(hard.beatmap.len(), 5);
    assert_eq!(hard.beatmap.get(Lane::p1(Panel::Right), 12.0), Some(&Note::Tap));

    let pump = song
        .chart(ChartType::PumpSingle, DifficultyClass::Medium)
        .unwrap();
    assert_eq!(pump.beatmap.get(Lane::p1(Panel::Center), 0.0), Some(&Note::Tap));

    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        &warnings[0],
        ChartWarning::Skipped {
            index: 3,
            error: ChartError::InvalidValue(InvalidValue { expected: "an integer", .. }),
            ..
        }
    ));
}

#[test]
fn test_chart_timing_overlays_song_timing() {
    let SimfileOutput { song, .. } = parse();
    let edit = song
        .chart(ChartType::DanceSingle, DifficultyClass::Edit)
        .unwrap();
    let local = edit.timing.as_ref().expect("chart declares its own timing");
    assert_eq!(local.offset(), 1.0);
    assert_eq!(local.bpms().collect::<Vec<_>>(), vec![(0.0, 60.0)]);
    assert_eq!(local.stops().collect::<Vec<_>>(), vec![(4.0, 1.0)]);
    assert_eq!(local.warps().collect::<Vec<_>>(), vec![(12.0, 4.0)]);

    let timing = Timing::new(song.timing_for(edit)).unwrap();
    assert_close(timing.time_at(1.0).unwrap(), 2.0);
    assert_close(timing.time_at(4.0).unwrap(), 6.0);

    let song_timing = Timing::new(&song.timing).unwrap();
    assert_close(song_timing.time_at(1.0).unwrap(), 0.5);
}

#[test]
fn test_notes_reachability_around_warp() {
    let SimfileOutput { song, .. } = parse();
    let hard = song
        .chart(ChartType::DanceSingle, DifficultyClass::Hard)
        .unwrap();
    let timing = Timing::new(song.timing_for(hard)).unwrap();
    let warped: Vec<_> = hard
        .beatmap
        .iter()
        .filter(|&(_, beat, _)| timing.is_warp(beat))
        .map(|(lane, beat, _)| (lane, beat))
        .collect();
    assert_eq!(warped, vec![(Lane::p1(Panel::Right), 12.0)]);

    for step in 0..200 {
        let time = f64::from(step) * 0.05;
        let beat = timing.beat_at(time);
        assert!(
            !(beat > 12.0 && beat < 16.0),
            "beat {beat} at {time} is inside the warp"
        );
    }
}
