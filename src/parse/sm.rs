//! Parser of the StepMania 3.9 `.sm` format.
//!
//! Every chart is one `#NOTES` tag of six `:` separated fields:
//!
//! ```text
//! #NOTES:<chart type>:<description>:<difficulty>:<meter>:<radar values>:<note data>;
//! ```
//!
//! The note data is decoded by [`crate::beatmap::grid`].

use super::{ChartCollector, ChartError, ParseError, SimfileOutput, values};
use crate::{
    beatmap::{Beatmap, grid},
    model::{Chart, ChartHash, ChartType, DifficultyClass, SimfileFormat, Song},
    tag::{DuplicateTagPolicy, Tag, TagLookup, TagStream},
    util::StrExtension,
};

const NOTES_FIELDS: usize = 6;

/// Decodes `note_data` of `chart_type`, and hashes its cleaned text.
pub(crate) fn decode_grid(
    chart_type: ChartType,
    note_data: &str,
) -> Result<(Beatmap, ChartHash), ChartError> {
    let cleaned = note_data.strip_whitespace();
    let beatmap = grid::decode(&cleaned, chart_type.layout())?;
    Ok((beatmap, ChartHash::of(&cleaned)))
}

fn parse_chart(tag: &Tag) -> Result<Chart, ChartError> {
    let fields: Vec<&str> = tag.value.split(':').map(str::trim).collect();
    let &[chart_type, description, difficulty, meter, radar, note_data] = fields.as_slice() else {
        return Err(ChartError::MalformedNotesTag {
            fields: fields.len(),
            expected: NOTES_FIELDS,
        });
    };
    let chart_type: ChartType = chart_type.parse()?;
    let difficulty: DifficultyClass = difficulty.parse()?;
    let meter = meter
        .non_empty()
        .map(|meter| values::integer(tag, meter))
        .transpose()?;
    let radar_values = values::number_list(tag, radar)?;
    let (beatmap, hash) = decode_grid(chart_type, note_data)?;
    Ok(Chart {
        chart_type,
        difficulty,
        meter,
        name: None,
        description: description.non_empty().map(str::to_owned),
        credit: None,
        radar_values,
        beatmap,
        hash,
        timing: None,
    })
}

pub(super) fn parse(source: &str, policy: DuplicateTagPolicy) -> Result<SimfileOutput, ParseError> {
    let set = TagStream::tokenize(source).classify(|name| name == "NOTES", policy)?;
    let metadata = values::metadata(&set.header)?;
    let mut timing = values::timing_tables(&set.header)?;
    timing.set_offset(values::offset(&set.header)?.unwrap_or(0.0));

    let mut collector = ChartCollector::default();
    for (index, block) in set.charts.iter().enumerate() {
        let chart = block
            .tag("NOTES")
            .ok_or(ChartError::MissingField("NOTES"))
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
            format: SimfileFormat::Sm,
        },
        warnings,
    })
}
