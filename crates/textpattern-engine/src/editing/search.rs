//! Literal text search bounded to a region of the document.

use std::ops::Range;

use regex::RegexBuilder;
use tracing::debug;

use crate::editing::Document;

/// Find one occurrence of `literal` inside `region`.
///
/// Matching is literal (the needle is escaped before compilation) with
/// optional case folding. `backward` reverses the scan order within the
/// region: the match starting at the highest offset wins, overlapping
/// occurrences included. Matches never extend past the region.
pub(crate) fn find_in_region(
    doc: &Document,
    literal: &str,
    region: Range<usize>,
    ignore_case: bool,
    backward: bool,
) -> Option<Range<usize>> {
    if literal.is_empty() || region.start >= region.end {
        return None;
    }
    let pattern = RegexBuilder::new(&regex::escape(literal))
        .case_insensitive(ignore_case)
        .build()
        .ok()?;
    let haystack = doc.slice_to_cow(region.clone());
    let found = if backward {
        // find_iter skips overlapping occurrences, so probe every start
        // position from the region end until a match begins exactly there
        (0..haystack.len())
            .rev()
            .filter(|&i| haystack.is_char_boundary(i))
            .find_map(|i| pattern.find_at(&haystack, i).filter(|m| m.start() == i))
    } else {
        pattern.find(&haystack)
    };
    debug!(literal, backward, ignore_case, hit = found.is_some(), "literal search");
    found.map(|m| region.start + m.start()..region.start + m.end())
}
