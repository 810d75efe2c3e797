//! The StepMania simfile parser and beat/time timing engine.
//!
//! This crate reads the tag-based chart formats of the StepMania family (`.sm`, `.ssc` and `.dwi`)
//! and turns them into two things a rhythm game needs during play:
//!
//! - [`beatmap::Beatmap`]: notes placed at beat positions for each lane of a chart.
//! - [`timing::Timing`]: a pair of mutually inverse piecewise-linear functions between beat and
//!   playback time, built from BPM changes, stops, delays and warps.
//!
//! In detail, the pipeline is:
//!
//! 1. [`tag`] strips `//` comments and splits the source into `#TAG:VALUE;` tags, separating header
//!    tags from chart tags.
//! 2. [`parse`] maps the tags of each format into a [`model::Song`], decoding each chart's note
//!    data with [`beatmap::grid`] (SM/SSC) or [`beatmap::stream`] (DWI).
//! 3. [`timing::Timing::new`] builds the beat/time graphs from the song's (or chart's)
//!    [`timing::TimingData`] on demand.
//!
//! A malformed chart does not abort the whole song. It is skipped and reported in
//! [`parse::SimfileOutput::warnings`].
//!
//! # Example
//!
//! ```
//! use simfile_rs::prelude::*;
//!
//! let source = r"
//! #TITLE:Example;
//! #OFFSET:0.000;
//! #BPMS:0.000=120.000;
//! #NOTES:
//!      dance-single:
//!      Someone:
//!      Easy:
//!      3:
//!      0,0,0,0,0:
//! 1000
//! 0100
//! 0010
//! 0001
//! ;
//! ";
//! let SimfileOutput { song, warnings } =
//!     parse_simfile(source, SimfileFormat::Sm, &ParseConfig::default()).unwrap();
//! assert!(warnings.is_empty());
//!
//! let chart = song.chart(ChartType::DanceSingle, DifficultyClass::Easy).unwrap();
//! let timing = Timing::new(song.timing_for(chart)).unwrap();
//! assert_eq!(timing.time_at(2.0).unwrap(), 1.0);
//! assert_eq!(timing.beat_at(0.5), 1.0);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod beatmap;
pub mod diagnostics;
pub mod model;
pub mod parse;
pub mod prelude;
pub mod tag;
pub mod timing;
mod util;
