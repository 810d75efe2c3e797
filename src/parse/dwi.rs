//! Parser of the Dance With Intensity `.dwi` format.
//!
//! The charts are tags named by their style, with `:` separated fields:
//!
//! ```text
//! #SINGLE:<difficulty>:<meter>:<steps>;
//! #DOUBLE:<difficulty>:<meter>:<player 1 steps>:<player 2 steps>;
//! ```
//!
//! The steps are decoded by [`crate::beatmap::stream`]. The timing units differ from the SM
//! family:
//!
//! - `#BPM` is the initial BPM and is required.
//! - `#GAP` is the time of beat 0 in milliseconds.
//! - `#CHANGEBPM` and `#FREEZE` are keyed by sixteenth notes, and `#FREEZE` lengths are in
//!   milliseconds.

use std::path::PathBuf;

use super::{
    ChartCollector, ChartError, InvalidValue, ParseError, SimfileOutput,
    values::{self, invalid},
};
use crate::{
    beatmap::{Beatmap, PlayerSide, stream},
    model::{
        Chart, ChartHash, ChartType, DifficultyClass, SimfileFormat, Song, SongMetadata,
        UnrecognizedValueError,
    },
    tag::{DuplicateTagPolicy, HeaderTags, Tag, TagStream},
    timing::{TimingData, TimingError},
    util::StrExtension,
};

const SIXTEENTHS_PER_BEAT: f64 = 4.0;
const MILLIS_PER_SECOND: f64 = 1000.0;

/// Parses `m:ss.xx`, or milliseconds without `:`, into seconds.
fn timestamp(tag: &Tag) -> Result<f64, InvalidValue> {
    match tag.value.split_once(':') {
        Some((minutes, seconds)) => {
            Ok(values::number(tag, minutes)? * 60.0 + values::number(tag, seconds)?)
        }
        None => Ok(values::number(tag, &tag.value)? / MILLIS_PER_SECOND),
    }
}

fn metadata(header: &HeaderTags) -> Result<SongMetadata, InvalidValue> {
    let text = |name| values::present(header, name).map(|tag| tag.value.clone());
    let path = |name| values::present(header, name).map(|tag| PathBuf::from(&tag.value));
    Ok(SongMetadata {
        title: text("TITLE"),
        artist: text("ARTIST"),
        genre: text("GENRE"),
        music: path("FILE"),
        cd_title: path("CDTITLE"),
        sample_start: values::present(header, "SAMPLESTART")
            .map(timestamp)
            .transpose()?,
        sample_length: values::present(header, "SAMPLELENGTH")
            .map(timestamp)
            .transpose()?,
        display_bpm: values::present(header, "DISPLAYBPM")
            .map(values::display_bpm)
            .transpose()?,
        ..SongMetadata::default()
    })
}

fn fill_sixteenths(
    data: &mut TimingData,
    tag: Option<&Tag>,
    value_scale: f64,
    insert: fn(&mut TimingData, f64, f64) -> Result<Option<f64>, TimingError>,
) -> Result<(), InvalidValue> {
    let Some(tag) = tag else {
        return Ok(());
    };
    for (sixteenth, value) in values::key_values(tag)? {
        insert(data, sixteenth / SIXTEENTHS_PER_BEAT, value / value_scale)
            .map_err(|_| invalid(tag, &tag.value, "finite beats"))?;
    }
    Ok(())
}

fn timing(header: &HeaderTags) -> Result<TimingData, ParseError> {
    let bpm_tag = values::present(header, "BPM").ok_or(ParseError::MissingTag("BPM"))?;
    let mut data = TimingData::new();
    data.insert_bpm(0.0, values::number(bpm_tag, &bpm_tag.value)?)
        .map_err(|_| invalid(bpm_tag, &bpm_tag.value, "a number"))?;
    if let Some(gap) = values::present(header, "GAP") {
        data.set_offset(values::number(gap, &gap.value)? / MILLIS_PER_SECOND);
    }
    fill_sixteenths(
        &mut data,
        values::present(header, "CHANGEBPM"),
        1.0,
        TimingData::insert_bpm,
    )?;
    fill_sixteenths(
        &mut data,
        values::present(header, "FREEZE"),
        MILLIS_PER_SECOND,
        TimingData::insert_stop,
    )?;
    Ok(data)
}

fn parse_chart(tag: &Tag) -> Result<Chart, ChartError> {
    let chart_type = ChartType::from_dwi_tag(&tag.name)
        .ok_or_else(|| UnrecognizedValueError::new("chart type", &tag.name))?;
    let fields: Vec<&str> = tag.value.split(':').map(str::trim).collect();
    let expected = if chart_type.is_two_sided() { 4 } else { 3 };
    if fields.len() != expected {
        return Err(ChartError::MalformedNotesTag {
            fields: fields.len(),
            expected,
        });
    }
    let (difficulty, meter, streams) = match fields.as_slice() {
        [difficulty, meter, streams @ ..] => (*difficulty, *meter, streams),
        _ => return Err(ChartError::MissingField("difficulty")),
    };
    let difficulty: DifficultyClass = difficulty.parse()?;
    let meter = meter
        .non_empty()
        .map(|meter| values::integer(tag, meter))
        .transpose()?;

    let layout = chart_type.layout();
    let mut beatmap = Beatmap::new();
    let mut cleaned = Vec::with_capacity(streams.len());
    for (steps, side) in streams
        .iter()
        .zip([PlayerSide::Player1, PlayerSide::Player2])
    {
        let steps = steps.strip_whitespace();
        stream::decode_into(&mut beatmap, &steps, side, layout)?;
        cleaned.push(steps);
    }

    Ok(Chart {
        chart_type,
        difficulty,
        meter,
        name: None,
        description: None,
        credit: None,
        radar_values: vec![],
        beatmap,
        hash: ChartHash::of(&cleaned.join(":")),
        timing: None,
    })
}

pub(super) fn parse(source: &str, policy: DuplicateTagPolicy) -> Result<SimfileOutput, ParseError> {
    let set = TagStream::tokenize(source)
        .classify(|name| ChartType::from_dwi_tag(name).is_some(), policy)?;
    let metadata = metadata(&set.header)?;
    let timing = timing(&set.header)?;

    let mut collector = ChartCollector::default();
    for (index, block) in set.charts.iter().enumerate() {
        let chart = block
            .head()
            .ok_or(ChartError::MissingField("steps"))
            .and_then(parse_chart);
        collector.push(index, block.range(), chart);
    }
    let (charts, warnings) = collector.finish();

    Ok(SimfileOutput {
        song: Song {
            metadata,
            timing,
            charts,
            source: None,
            format: SimfileFormat::Dwi,
        },
        warnings,
    })
}
