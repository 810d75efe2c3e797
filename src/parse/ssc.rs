//! Parser of the StepMania 5 `.ssc` format.
//!
//! The header is read the same way as `.sm`. Each chart is a block of tags starting at
//! `#NOTEDATA`, and may declare its own `#OFFSET`, `#BPMS`, `#STOPS`, `#DELAYS` and `#WARPS`. A
//! table declared in the block replaces the song's table as a whole.

use super::{ChartCollector, ChartError, ParseError, SimfileOutput, sm::decode_grid, values};
use crate::{
    model::{Chart, ChartType, DifficultyClass, SimfileFormat, Song},
    tag::{DuplicateTagPolicy, TagBlock, TagLookup, TagStream},
    timing::TimingData,
};

fn required<'a>(block: &'a TagBlock, name: &'static str) -> Result<&'a str, ChartError> {
    values::present(block, name)
        .map(|tag| tag.value.as_str())
        .ok_or(ChartError::MissingField(name))
}

fn text(block: &TagBlock, name: &str) -> Option<String> {
    values::present(block, name).map(|tag| tag.value.clone())
}

fn chart_timing(block: &TagBlock, song: &TimingData) -> Result<Option<TimingData>, ChartError> {
    let tables = values::timing_tables(block)?;
    let offset = values::offset(block)?;
    if tables.is_empty() && offset.is_none() {
        return Ok(None);
    }
    let mut timing = song.clone();
    timing.overlay(&tables, offset);
    Ok(Some(timing))
}

fn parse_chart(block: &TagBlock, song_timing: &TimingData) -> Result<Chart, ChartError> {
    let chart_type: ChartType = required(block, "STEPSTYPE")?.parse()?;
    let difficulty: DifficultyClass = required(block, "DIFFICULTY")?.parse()?;
    let meter = values::present(block, "METER")
        .map(|tag| values::integer(tag, &tag.value))
        .transpose()?;
    let radar_values = values::present(block, "RADARVALUES")
        .map(|tag| values::number_list(tag, &tag.value))
        .transpose()?
        .unwrap_or_default();
    let note_data = block
        .get_any(&["NOTES", "NOTES2"])
        .map_or("", |tag| tag.value.as_str());
    let (beatmap, hash) = decode_grid(chart_type, note_data)?;
    Ok(Chart {
        chart_type,
        difficulty,
        meter,
        name: text(block, "CHARTNAME"),
        description: text(block, "DESCRIPTION"),
        credit: text(block, "CREDIT"),
        radar_values,
        beatmap,
        hash,
        timing: chart_timing(block, song_timing)?,
    })
}

pub(super) fn parse(source: &str, policy: DuplicateTagPolicy) -> Result<SimfileOutput, ParseError> {
    let set = TagStream::tokenize(source).split_blocks("NOTEDATA", policy)?;
    let metadata = values::metadata(&set.header)?;
    let mut timing = values::timing_tables(&set.header)?;
    timing.set_offset(values::offset(&set.header)?.unwrap_or(0.0));

    let mut collector = ChartCollector::default();
    for (index, block) in set.charts.iter().enumerate() {
        collector.push(index, block.range(), parse_chart(block, &timing));
    }
    let (charts, warnings) = collector.finish();

    Ok(SimfileOutput {
        song: Song {
            metadata,
            timing,
            charts,
            source: None,
            format: SimfileFormat::Ssc,
        },
        warnings,
    })
}
