//! Fixed-size section partitioning of an issued exam.
//!
//! Sections are a pure function of a question's position in the final order.
//! A trailing group shorter than [`SECTION_SIZE`] still counts as a section.

use std::ops::Range;

/// Number of questions per section.
pub const SECTION_SIZE: usize = 13;

/// Section (1-based) of the question at `index` in the final order.
#[must_use]
pub fn section_for_index(index: usize) -> u32 {
    u32::try_from(index / SECTION_SIZE + 1).unwrap_or(u32::MAX)
}

/// Number of sections needed to hold `len` questions.
#[must_use]
pub fn total_sections(len: usize) -> u32 {
    u32::try_from(len.div_ceil(SECTION_SIZE)).unwrap_or(u32::MAX)
}

/// Index range covered by `section` in an exam of `len` questions.
///
/// Returns an empty range for section 0 or sections past the end.
#[must_use]
pub fn section_range(section: u32, len: usize) -> Range<usize> {
    let Some(zero_based) = usize::try_from(section).ok().and_then(|s| s.checked_sub(1)) else {
        return 0..0;
    };
    let start = zero_based.saturating_mul(SECTION_SIZE).min(len);
    let end = start.saturating_add(SECTION_SIZE).min(len);
    start..end
}

/// Returns true when `index` is the last question of its section.
#[must_use]
pub fn is_section_end(index: usize) -> bool {
    (index + 1) % SECTION_SIZE == 0
}
