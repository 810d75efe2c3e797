//! Parsers of tag values shared by the formats.

use std::{path::PathBuf, str::FromStr, sync::LazyLock};

use regex::Regex;

use super::InvalidValue;
use crate::{
    model::{DisplayBpm, SongMetadata},
    tag::{Tag, TagLookup},
    timing::{TimingData, TimingError},
    util::StrExtension,
};

const NUMBER: &str = r"[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?";

static KEY_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*({NUMBER})\s*=\s*({NUMBER})\s*$"))
        .expect("key value pattern must compile")
});

static NUMBER_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*({NUMBER})\s*$")).expect("number pattern must compile")
});

pub(crate) fn invalid(tag: &Tag, value: &str, expected: &'static str) -> InvalidValue {
    InvalidValue {
        tag: tag.name.clone(),
        value: value.to_owned(),
        expected,
        range: tag.range.clone(),
    }
}

/// Parses a finite decimal number.
pub(crate) fn number(tag: &Tag, text: &str) -> Result<f64, InvalidValue> {
    NUMBER_ONLY
        .captures(text)
        .and_then(|captures| captures.get(1)?.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .ok_or_else(|| invalid(tag, text, "a number"))
}

/// Parses an integer of `T`.
pub(crate) fn integer<T: FromStr>(tag: &Tag, text: &str) -> Result<T, InvalidValue> {
    text.trim()
        .parse()
        .map_err(|_| invalid(tag, text, "an integer"))
}

/// Parses the `key=value` list of a timing table, separated by `,`.
///
/// Empty entries such as a trailing `,` are skipped.
pub(crate) fn key_values(tag: &Tag) -> Result<Vec<(f64, f64)>, InvalidValue> {
    tag.value
        .split([',', ';'])
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| {
            KEY_VALUE
                .captures(entry)
                .and_then(|captures| {
                    let key = captures.get(1)?.as_str().parse::<f64>().ok()?;
                    let value = captures.get(2)?.as_str().parse::<f64>().ok()?;
                    (key.is_finite() && value.is_finite()).then_some((key, value))
                })
                .ok_or_else(|| invalid(tag, entry.trim(), "`beat=value` pairs"))
        })
        .collect()
}

/// Parses the comma separated list of numbers.
pub(crate) fn number_list(tag: &Tag, text: &str) -> Result<Vec<f64>, InvalidValue> {
    text.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| number(tag, entry))
        .collect()
}

/// Parses `*` as random, `min:max` or `min..max` as a range, and a number as a single value.
pub(crate) fn display_bpm(tag: &Tag) -> Result<DisplayBpm, InvalidValue> {
    let text = tag.value.trim();
    if text == "*" {
        return Ok(DisplayBpm::Random);
    }
    let range = text.split_once(':').or_else(|| text.split_once(".."));
    match range {
        Some((min, max)) => Ok(DisplayBpm::Range(number(tag, min)?, number(tag, max)?)),
        None => Ok(DisplayBpm::Single(number(tag, text)?)),
    }
}

/// Parses `YES` or `NO`.
pub(crate) fn yes_no(tag: &Tag) -> Result<bool, InvalidValue> {
    match tag.value.trim().to_ascii_uppercase().as_str() {
        "YES" => Ok(true),
        "NO" => Ok(false),
        _ => Err(invalid(tag, &tag.value, "`YES` or `NO`")),
    }
}

/// Returns the tag `name` if its value is not blank.
pub(crate) fn present<'a>(lookup: &'a impl TagLookup, name: &str) -> Option<&'a Tag> {
    lookup.tag(name).filter(|tag| tag.value.non_empty().is_some())
}

fn text(lookup: &impl TagLookup, name: &str) -> Option<String> {
    present(lookup, name).map(|tag| tag.value.clone())
}

fn path(lookup: &impl TagLookup, name: &str) -> Option<PathBuf> {
    present(lookup, name).map(|tag| PathBuf::from(&tag.value))
}

/// Reads the song metadata tags of the SM family.
pub(crate) fn metadata(header: &impl TagLookup) -> Result<SongMetadata, InvalidValue> {
    Ok(SongMetadata {
        title: text(header, "TITLE"),
        subtitle: text(header, "SUBTITLE"),
        artist: text(header, "ARTIST"),
        title_translit: text(header, "TITLETRANSLIT"),
        subtitle_translit: text(header, "SUBTITLETRANSLIT"),
        artist_translit: text(header, "ARTISTTRANSLIT"),
        genre: text(header, "GENRE"),
        credit: text(header, "CREDIT"),
        banner: path(header, "BANNER"),
        background: path(header, "BACKGROUND"),
        cd_title: path(header, "CDTITLE"),
        music: path(header, "MUSIC"),
        lyrics_path: path(header, "LYRICSPATH"),
        sample_start: present(header, "SAMPLESTART")
            .map(|tag| number(tag, &tag.value))
            .transpose()?,
        sample_length: present(header, "SAMPLELENGTH")
            .map(|tag| number(tag, &tag.value))
            .transpose()?,
        display_bpm: present(header, "DISPLAYBPM")
            .map(display_bpm)
            .transpose()?,
        selectable: present(header, "SELECTABLE").map(yes_no).transpose()?,
    })
}

fn fill(
    data: &mut TimingData,
    tag: Option<&Tag>,
    insert: fn(&mut TimingData, f64, f64) -> Result<Option<f64>, TimingError>,
) -> Result<(), InvalidValue> {
    let Some(tag) = tag else {
        return Ok(());
    };
    for (beat, value) in key_values(tag)? {
        insert(data, beat, value).map_err(|_| invalid(tag, &tag.value, "finite beats"))?;
    }
    Ok(())
}

/// Reads the `#OFFSET` tag of the SM family, converted into the time of beat 0.
pub(crate) fn offset(lookup: &impl TagLookup) -> Result<Option<f64>, InvalidValue> {
    present(lookup, "OFFSET")
        .map(|tag| number(tag, &tag.value).map(|offset| -offset))
        .transpose()
}

/// Reads the timing tables of the SM family, excluding the offset.
///
/// `#FREEZES` is read as an alias of `#STOPS`.
pub(crate) fn timing_tables(lookup: &impl TagLookup) -> Result<TimingData, InvalidValue> {
    let mut data = TimingData::new();
    fill(&mut data, present(lookup, "BPMS"), TimingData::insert_bpm)?;
    fill(
        &mut data,
        present(lookup, "STOPS").or_else(|| present(lookup, "FREEZES")),
        TimingData::insert_stop,
    )?;
    fill(&mut data, present(lookup, "DELAYS"), TimingData::insert_delay)?;
    fill(&mut data, present(lookup, "WARPS"), TimingData::insert_warp)?;
    Ok(data)
}
