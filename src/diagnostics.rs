//! Fancy diagnostics support using `ariadne`.
//!
//! [`ChartWarning`](crate::parse::ChartWarning) and the positioned variants of
//! [`ParseError`](crate::parse::ParseError) carry the byte range of the tags they came from, so
//! they can be rendered against the source text without converting positions by hand.
//!
//! # Usage Example
//!
//! ```rust
//! # #[cfg(feature = "diagnostics")]
//! # {
//! use simfile_rs::{
//!     diagnostics::emit_chart_warnings,
//!     model::SimfileFormat,
//!     parse::{ParseConfig, parse_simfile},
//! };
//!
//! let source = "#TITLE:Test;#BPMS:0=120;#NOTES:dance-single:::1:;";
//! let output = parse_simfile(source, SimfileFormat::Sm, &ParseConfig::default()).unwrap();
//! assert_eq!(output.warnings.len(), 1);
//!
//! emit_chart_warnings("test.sm", source, &output.warnings);
//! # }
//! ```

#[cfg(feature = "diagnostics")]
use std::ops::Range;

#[cfg(feature = "diagnostics")]
use ariadne::{Color, Label, Report, ReportKind, Source};

#[cfg(feature = "diagnostics")]
use crate::parse::{ChartWarning, ParseError};

/// Simple source container that holds the filename and source text.
///
/// # Usage Example
///
/// ```rust
/// use simfile_rs::diagnostics::SimpleSource;
///
/// let source_text = "#TITLE:test;\n#ARTIST:composer;\n";
/// let source = SimpleSource::new("test.sm", source_text);
///
/// assert_eq!(source.text(), source_text);
/// assert_eq!(source.name(), "test.sm");
/// ```
pub struct SimpleSource<'a> {
    name: &'a str,
    text: &'a str,
}

impl<'a> SimpleSource<'a> {
    /// Creates a new source container of the file `name` with the content `text`.
    #[must_use]
    pub const fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text }
    }

    /// Source text content.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// Source file name.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    /// Clamps `range` into the text.
    #[cfg(feature = "diagnostics")]
    fn clamp(&self, range: Range<usize>) -> Range<usize> {
        let end = range.end.min(self.text.len());
        range.start.min(end)..end
    }
}

/// Trait for converting positioned errors to `ariadne::Report`.
#[cfg(feature = "diagnostics")]
pub trait ToAriadne {
    /// Converts the error into an ariadne Report, labeled in `src`.
    fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)>;
}

/// Helper to build a styled ariadne `Report` consistently.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn build_report<'a>(
    src: &SimpleSource<'a>,
    kind: ReportKind<'a>,
    range: Range<usize>,
    title: &str,
    label_message: impl ToString,
    color: Color,
) -> Report<'a, (String, Range<usize>)> {
    let filename = src.name().to_string();
    let range = src.clamp(range);
    Report::build(kind, (filename.clone(), range.clone()))
        .with_message(title)
        .with_label(
            Label::new((filename, range))
                .with_message(label_message.to_string())
                .with_color(color),
        )
        .finish()
}

#[cfg(feature = "diagnostics")]
impl ToAriadne for ChartWarning {
    fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)> {
        let label = match self {
            Self::Skipped { index, .. } => format!("chart #{index} was skipped"),
            Self::DuplicateChart { index, .. } => format!("chart #{index} was ignored"),
        };
        build_report(
            src,
            ReportKind::Warning,
            self.range(),
            &format!("chart: {self}"),
            label,
            Color::Yellow,
        )
    }
}

#[cfg(feature = "diagnostics")]
impl ToAriadne for ParseError {
    fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)> {
        let range = match self {
            Self::InvalidValue(invalid) => invalid.range.clone(),
            Self::DuplicateTag { range, .. } => range.clone(),
            _ => 0..0,
        };
        build_report(
            src,
            ReportKind::Error,
            range,
            &format!("parse: {self}"),
            "here",
            Color::Red,
        )
    }
}

/// Renders every warning of `warnings` to stderr, labeled in `source` of the file `name`.
#[cfg(feature = "diagnostics")]
pub fn emit_chart_warnings<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a ChartWarning>,
) {
    let simple = SimpleSource::new(name, source);
    let ariadne_source = Source::from(source);
    for warning in warnings {
        let report = warning.to_report(&simple);
        let _ = report.eprint((name.to_string(), ariadne_source.clone()));
    }
}

/// Collects `ariadne::Report` instances for `warnings` without printing.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn collect_chart_reports<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a ChartWarning>,
) -> Vec<Report<'a, (String, Range<usize>)>> {
    let simple = SimpleSource::new(name, source);
    warnings
        .into_iter()
        .map(|warning| warning.to_report(&simple))
        .collect()
}
