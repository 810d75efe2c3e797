//! Format parsers turning a simfile source into a [`Song`].
//!
//! Each format adapter maps the tags found by [`crate::tag`] into song metadata, [`TimingData`]
//! and charts. The failures are split in two levels:
//!
//! - [`ParseError`]: the file itself is broken, and no song is produced.
//! - [`ChartError`]: one chart is broken. It is skipped and reported as a [`ChartWarning`], and
//!   the other charts are kept.
//!
//! [`TimingData`]: crate::timing::TimingData

pub mod dwi;
pub mod sm;
pub mod ssc;
mod values;

use std::{
    fs,
    ops::Range,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{
    beatmap::BeatmapError,
    model::{Chart, ChartType, DifficultyClass, SimfileFormat, Song, UnrecognizedValueError},
    tag::DuplicateTagPolicy,
};

/// The default limit of the source length in bytes.
pub const DEFAULT_MAX_INPUT_LEN: usize = 4 * 1024 * 1024;

/// A tag value which cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value {value:?} of #{tag}, expected {expected}")]
pub struct InvalidValue {
    /// The tag name.
    pub tag: String,
    /// The part of the value which failed.
    pub value: String,
    /// What was expected.
    pub expected: &'static str,
    /// The byte range of the tag in the source.
    pub range: Range<usize>,
}

/// An error occurred when parsing a whole simfile.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No header tag is found, so the source is not a simfile.
    #[error("no header tags found")]
    NoHeaderTags,
    /// A tag required by the format is missing.
    #[error("required tag #{0} is missing")]
    MissingTag(&'static str),
    /// A header tag has an unreadable value.
    #[error(transparent)]
    InvalidValue(#[from] InvalidValue),
    /// The source is longer than [`ParseConfig::max_input_len`].
    #[error("input of {len} bytes exceeds the limit of {max} bytes")]
    InputTooLarge {
        /// The length of the input.
        len: usize,
        /// The limit.
        max: usize,
    },
    /// A header tag is declared twice under [`DuplicateTagPolicy::Halt`].
    #[error("tag #{name} is declared twice")]
    DuplicateTag {
        /// The tag name.
        name: String,
        /// The byte range of the second declaration.
        range: Range<usize>,
    },
}

/// An error occurred when reading one chart. The chart is skipped.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    /// The note data is broken.
    #[error("invalid note data: {0}")]
    Beatmap(#[from] BeatmapError),
    /// The chart type or difficulty is not supported.
    #[error(transparent)]
    Unrecognized(#[from] UnrecognizedValueError),
    /// A chart tag has an unreadable value.
    #[error(transparent)]
    InvalidValue(#[from] InvalidValue),
    /// A field required to identify the chart is missing.
    #[error("chart field {0} is missing")]
    MissingField(&'static str),
    /// The chart tag does not have the count of `:` separated fields of the format.
    #[error("chart tag has {fields} fields, expected {expected}")]
    MalformedNotesTag {
        /// The count of fields found.
        fields: usize,
        /// The count of fields expected.
        expected: usize,
    },
}

/// A chart dropped from the parse output.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartWarning {
    /// The chart failed to read.
    #[error("chart #{index} skipped: {error}")]
    Skipped {
        /// The index of the chart in the source, counting all chart tags.
        index: usize,
        /// The byte range of the chart tags in the source.
        range: Range<usize>,
        /// The reason.
        error: ChartError,
    },
    /// Another chart of the same type and difficulty was declared earlier.
    #[error("chart #{index} skipped: {chart_type} {difficulty} is already declared")]
    DuplicateChart {
        /// The index of the chart in the source, counting all chart tags.
        index: usize,
        /// The byte range of the chart tags in the source.
        range: Range<usize>,
        /// The chart type.
        chart_type: ChartType,
        /// The difficulty.
        difficulty: DifficultyClass,
    },
}

impl ChartWarning {
    /// Returns the byte range of the dropped chart in the source.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        match self {
            Self::Skipped { range, .. } | Self::DuplicateChart { range, .. } => range.clone(),
        }
    }
}

/// Output of parsing a simfile.
#[derive(Debug, Clone, PartialEq)]
pub struct SimfileOutput {
    /// The parsed song.
    pub song: Song,
    /// Charts which were dropped.
    pub warnings: Vec<ChartWarning>,
}

/// Options of parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    max_input_len: Option<usize>,
    duplicate_tags: Option<DuplicateTagPolicy>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_input_len: Some(DEFAULT_MAX_INPUT_LEN),
            duplicate_tags: None,
        }
    }
}

impl ParseConfig {
    /// Creates the default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the limit of the source length in bytes. `None` removes the limit.
    #[must_use]
    pub const fn max_input_len(mut self, max: Option<usize>) -> Self {
        self.max_input_len = max;
        self
    }

    /// Overrides how the repeated header tags are resolved.
    #[must_use]
    pub const fn duplicate_tags(mut self, policy: DuplicateTagPolicy) -> Self {
        self.duplicate_tags = Some(policy);
        self
    }

    /// Returns the limit of the source length in bytes.
    #[must_use]
    pub const fn input_limit(&self) -> Option<usize> {
        self.max_input_len
    }

    /// Returns the policy for repeated header tags of `format`.
    ///
    /// Without an override, the last declaration wins on SM and SSC, and the first one on DWI.
    #[must_use]
    pub const fn duplicate_policy(&self, format: SimfileFormat) -> DuplicateTagPolicy {
        match (self.duplicate_tags, format) {
            (Some(policy), _) => policy,
            (None, SimfileFormat::Sm | SimfileFormat::Ssc) => DuplicateTagPolicy::UseNewer,
            (None, SimfileFormat::Dwi) => DuplicateTagPolicy::UseOlder,
        }
    }

    fn check_len(&self, len: usize) -> Result<(), ParseError> {
        match self.max_input_len {
            Some(max) if len > max => Err(ParseError::InputTooLarge { len, max }),
            _ => Ok(()),
        }
    }
}

/// Collects the charts of a song, dropping the failed and duplicated ones into warnings.
#[derive(Debug, Default)]
pub(crate) struct ChartCollector {
    charts: Vec<Chart>,
    warnings: Vec<ChartWarning>,
}

impl ChartCollector {
    pub(crate) fn push(&mut self, index: usize, range: Range<usize>, chart: Result<Chart, ChartError>) {
        let chart = match chart {
            Ok(chart) => chart,
            Err(error) => {
                log::warn!("skipping chart #{index}: {error}");
                self.warnings.push(ChartWarning::Skipped {
                    index,
                    range,
                    error,
                });
                return;
            }
        };
        if self.charts.iter().any(|existing| existing.key() == chart.key()) {
            log::warn!(
                "skipping chart #{index}: {} {} is already declared",
                chart.chart_type,
                chart.difficulty
            );
            self.warnings.push(ChartWarning::DuplicateChart {
                index,
                range,
                chart_type: chart.chart_type,
                difficulty: chart.difficulty,
            });
            return;
        }
        self.charts.push(chart);
    }

    pub(crate) fn finish(self) -> (Vec<Chart>, Vec<ChartWarning>) {
        (self.charts, self.warnings)
    }
}

/// Parses `source` as a simfile of `format`.
///
/// # Example
///
/// ```
/// use simfile_rs::prelude::*;
///
/// let source = "#TITLE:Demo;#BPM:150;#GAP:0;#SINGLE:BASIC:3:2468;";
/// let SimfileOutput { song, warnings } =
///     parse_simfile(source, SimfileFormat::Dwi, &ParseConfig::default()).unwrap();
/// assert!(warnings.is_empty());
/// assert_eq!(song.metadata.title.as_deref(), Some("Demo"));
/// assert_eq!(song.charts[0].beatmap.len(), 4);
/// ```
///
/// # Errors
///
/// Returns [`ParseError`] if the file is too long, has no header tags, or has a broken header tag.
/// Broken charts do not fail the parse, and are reported in [`SimfileOutput::warnings`].
pub fn parse_simfile(
    source: &str,
    format: SimfileFormat,
    config: &ParseConfig,
) -> Result<SimfileOutput, ParseError> {
    config.check_len(source.len())?;
    let policy = config.duplicate_policy(format);
    let output = match format {
        SimfileFormat::Sm => sm::parse(source, policy),
        SimfileFormat::Ssc => ssc::parse(source, policy),
        SimfileFormat::Dwi => dwi::parse(source, policy),
    }?;
    log::debug!(
        "parsed {} charts with {} warnings from {format:?}",
        output.song.charts.len(),
        output.warnings.len()
    );
    Ok(output)
}

/// An error occurred when loading a simfile from the file system.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the file failed.
    #[error("failed to read the simfile: {0}")]
    Io(#[from] std::io::Error),
    /// The extension is none of the supported formats.
    #[error("unknown simfile format of {0}")]
    UnknownFormat(PathBuf),
    /// Parsing the content failed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Reads and parses the simfile at `path`, choosing the format by its extension.
///
/// # Errors
///
/// Returns [`LoadError`] if the extension is unknown, the file cannot be read as UTF-8, or
/// [`parse_simfile`] fails.
pub fn read_simfile(
    path: impl AsRef<Path>,
    config: &ParseConfig,
) -> Result<SimfileOutput, LoadError> {
    let path = path.as_ref();
    let format = SimfileFormat::from_path(path)
        .ok_or_else(|| LoadError::UnknownFormat(path.to_path_buf()))?;
    let len = usize::try_from(fs::metadata(path)?.len()).unwrap_or(usize::MAX);
    config.check_len(len)?;
    let source = fs::read_to_string(path)?;
    let mut output = parse_simfile(&source, format, config)?;
    output.song.source = Some(path.to_path_buf());
    Ok(output)
}

/// The default preference of formats: SM, then SSC, then DWI. Lower is preferred.
#[must_use]
pub const fn default_format_rank(format: SimfileFormat) -> Option<u8> {
    Some(match format {
        SimfileFormat::Sm => 0,
        SimfileFormat::Ssc => 1,
        SimfileFormat::Dwi => 2,
    })
}

/// Picks the simfile to load among the files of a song directory, by [`default_format_rank`].
pub fn select_simfile<P: AsRef<Path>>(candidates: impl IntoIterator<Item = P>) -> Option<P> {
    select_simfile_by(candidates, default_format_rank)
}

/// Picks the simfile with the lowest `rank` of its format. Files with unknown extensions or
/// ranked `None` are never picked, and the first one wins on a tie.
pub fn select_simfile_by<P: AsRef<Path>>(
    candidates: impl IntoIterator<Item = P>,
    rank: impl Fn(SimfileFormat) -> Option<u8>,
) -> Option<P> {
    candidates
        .into_iter()
        .filter_map(|path| {
            let path_rank = SimfileFormat::from_path(path.as_ref()).and_then(&rank)?;
            Some((path_rank, path))
        })
        .min_by_key(|&(path_rank, _)| path_rank)
        .map(|(_, path)| path)
}
