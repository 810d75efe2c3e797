use strict_num_extended::FinF64;

/// Converts a beat position into the ordered key used by beat-indexed maps.
///
/// Returns `None` for NaN or infinite positions, which can never be placed on a chart.
pub(crate) fn beat_key(beat: f64) -> Option<FinF64> {
    FinF64::try_from(beat).ok()
}

/// Trait extension utility for [`str`].
pub(crate) trait StrExtension {
    /// Returns the string with every whitespace character removed.
    fn strip_whitespace(&self) -> String;

    /// Returns `None` if the trimmed string is empty, or the trimmed string otherwise.
    fn non_empty(&self) -> Option<&str>;
}

impl StrExtension for str {
    fn strip_whitespace(&self) -> String {
        self.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn non_empty(&self) -> Option<&str> {
        let trimmed = self.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}
