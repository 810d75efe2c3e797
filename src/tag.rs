//! Tokenizer of the `#TAG:VALUE;` syntax shared by the SM, SSC and DWI formats.
//!
//! Raw [`str`] == [`TagStream::tokenize`] ==> [`TagStream`] == [`TagStream::classify`] or
//! [`TagStream::split_blocks`] ==> [`TagSet`]
//!
//! `//` line comments are blanked out before matching. They are replaced by spaces of the same byte
//! length, so the range of every [`Tag`] indexes into the original source text.

use std::{collections::BTreeMap, ops::Range, sync::LazyLock};

use regex::Regex;

use crate::parse::ParseError;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#\s*([^:;#\s]+)\s*:([^;]*)(?:;|\z)").expect("tag pattern must compile")
});

/// A `#NAME:VALUE;` pair found in the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag {
    /// The tag name in upper case.
    pub name: String,
    /// The value with the surrounding whitespace trimmed.
    pub value: String,
    /// The byte range of the whole tag in the source.
    pub range: Range<usize>,
}

/// A choice to handle a header tag declared twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum DuplicateTagPolicy {
    /// Keep the first declaration.
    UseOlder,
    /// Keep the last declaration.
    UseNewer,
    /// Fail with [`ParseError::DuplicateTag`].
    Halt,
}

impl DuplicateTagPolicy {
    fn apply(self, older: &mut Tag, newer: Tag) -> Result<(), ParseError> {
        match self {
            Self::UseOlder => Ok(()),
            Self::UseNewer => {
                *older = newer;
                Ok(())
            }
            Self::Halt => Err(ParseError::DuplicateTag {
                name: newer.name,
                range: newer.range,
            }),
        }
    }
}

/// Access to tags by name.
pub trait TagLookup {
    /// Finds the tag of `name`, which must be upper case.
    fn tag(&self, name: &str) -> Option<&Tag>;

    /// Finds the value of the tag `name`.
    fn get(&self, name: &str) -> Option<&str> {
        self.tag(name).map(|tag| tag.value.as_str())
    }

    /// Finds the first of `names` which is present, so that a tag can have aliases.
    fn get_any(&self, names: &[&str]) -> Option<&Tag> {
        names.iter().find_map(|name| self.tag(name))
    }
}

/// Tags appearing once per file, such as `#TITLE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTags {
    tags: BTreeMap<String, Tag>,
}

impl HeaderTags {
    fn insert(&mut self, tag: Tag, policy: DuplicateTagPolicy) -> Result<(), ParseError> {
        match self.tags.get_mut(&tag.name) {
            Some(older) => {
                log::debug!("tag #{} is declared twice, resolved by {policy:?}", tag.name);
                policy.apply(older, tag)
            }
            None => {
                self.tags.insert(tag.name.clone(), tag);
                Ok(())
            }
        }
    }

    /// Returns the count of distinct tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns whether there is no tag.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns the tags ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }
}

impl TagLookup for HeaderTags {
    fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.get(name)
    }
}

/// Tags describing one chart, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagBlock {
    tags: Vec<Tag>,
}

impl TagBlock {
    /// Returns the tags in source order.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Returns the first tag, which is the chart tag starting this block.
    #[must_use]
    pub fn head(&self) -> Option<&Tag> {
        self.tags.first()
    }

    /// Returns the byte range from the first tag to the last one.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        match (self.tags.first(), self.tags.last()) {
            (Some(first), Some(last)) => first.range.start..last.range.end,
            _ => 0..0,
        }
    }
}

impl TagLookup for TagBlock {
    /// Finds the last tag of `name` in this block.
    fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().rev().find(|tag| tag.name == name)
    }
}

/// Header tags and the chart blocks of a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    /// The header tags.
    pub header: HeaderTags,
    /// The chart blocks in source order.
    pub charts: Vec<TagBlock>,
}

/// All tags of a source, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagStream {
    tags: Vec<Tag>,
}

/// Replaces every `//` comment up to the line end by spaces, keeping the byte offsets.
#[must_use]
pub fn blank_comments(source: &str) -> String {
    let mut blanked = String::with_capacity(source.len());
    for line in source.split_inclusive('\n') {
        match line.find("//") {
            Some(start) => {
                let (content, comment) = line.split_at(start);
                blanked.push_str(content);
                let body_len = comment.trim_end_matches(['\r', '\n']).len();
                blanked.extend(std::iter::repeat_n(' ', body_len));
                blanked.push_str(&comment[body_len..]);
            }
            None => blanked.push_str(line),
        }
    }
    blanked
}

impl TagStream {
    /// Finds all tags in `source`.
    #[must_use]
    pub fn tokenize(source: &str) -> Self {
        let blanked = blank_comments(source);
        let tags: Vec<_> = TAG
            .captures_iter(&blanked)
            .filter_map(|captures| {
                let whole = captures.get(0)?;
                Some(Tag {
                    name: captures.get(1)?.as_str().to_ascii_uppercase(),
                    value: captures.get(2)?.as_str().trim().to_owned(),
                    range: whole.range(),
                })
            })
            .collect();
        log::debug!("tokenized {} tags", tags.len());
        Self { tags }
    }

    /// Returns the tags in source order.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Splits into header tags and chart tags, where each chart tag found by `is_chart_tag`
    /// becomes a block of its own.
    ///
    /// # Errors
    ///
    /// - [`ParseError::NoHeaderTags`] if there is no header tag.
    /// - [`ParseError::DuplicateTag`] if a header tag is repeated under [`DuplicateTagPolicy::Halt`].
    pub fn classify(
        self,
        is_chart_tag: impl Fn(&str) -> bool,
        policy: DuplicateTagPolicy,
    ) -> Result<TagSet, ParseError> {
        let mut set = TagSet::default();
        for tag in self.tags {
            if is_chart_tag(&tag.name) {
                set.charts.push(TagBlock { tags: vec![tag] });
            } else {
                set.header.insert(tag, policy)?;
            }
        }
        if set.header.is_empty() {
            return Err(ParseError::NoHeaderTags);
        }
        Ok(set)
    }

    /// Splits into the header tags before the first `block_start` tag, and blocks each starting
    /// at a `block_start` tag.
    ///
    /// # Errors
    ///
    /// Same as [`TagStream::classify`].
    pub fn split_blocks(
        self,
        block_start: &str,
        policy: DuplicateTagPolicy,
    ) -> Result<TagSet, ParseError> {
        let mut set = TagSet::default();
        for tag in self.tags {
            if tag.name == block_start {
                set.charts.push(TagBlock { tags: vec![tag] });
            } else if let Some(block) = set.charts.last_mut() {
                block.tags.push(tag);
            } else {
                set.header.insert(tag, policy)?;
            }
        }
        if set.header.is_empty() {
            return Err(ParseError::NoHeaderTags);
        }
        Ok(set)
    }
}
