//! HTTP Range request parsing module
//!
//! Single `bytes` range parsing for resumable downloads (RFC 7233).
//! Multi-range and malformed headers are ignored and the full body is served.

use std::ops::Range;

/// Outcome of applying a Range header to a body of known length
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// No usable Range header, serve the whole body
    Full,
    /// Serve this half-open byte range with 206
    Partial(Range<u64>),
    /// Syntactically valid but outside the body, answer 416
    NotSatisfiable,
}

/// Parse an HTTP Range header against a body of `len` bytes
///
/// Supported formats:
/// - `bytes=start-end` - Specific range, `end` clamped to the body
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
///
/// # Examples
/// ```
/// use static_server::http::range::{parse_range_header, RangeParseResult};
///
/// assert_eq!(parse_range_header(Some("bytes=0-99"), 1000), RangeParseResult::Partial(0..100));
/// assert_eq!(parse_range_header(None, 1000), RangeParseResult::Full);
/// ```
pub fn parse_range_header(range_header: Option<&str>, len: u64) -> RangeParseResult {
    let Some(ranges) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::Full;
    };

    if ranges.contains(',') {
        return RangeParseResult::Full;
    }

    let Some((start_str, end_str)) = ranges.split_once('-') else {
        return RangeParseResult::Full;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        return parse_suffix_range(end_str, len);
    }

    parse_standard_range(start_str, end_str, len)
}

/// "-500": the last 500 bytes
fn parse_suffix_range(suffix_str: &str, len: u64) -> RangeParseResult {
    let Ok(suffix) = suffix_str.parse::<u64>() else {
        return RangeParseResult::Full;
    };

    if suffix == 0 || len == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Partial(len.saturating_sub(suffix)..len)
}

/// "0-99" or "100-"
fn parse_standard_range(start_str: &str, end_str: &str, len: u64) -> RangeParseResult {
    let Ok(start) = start_str.parse::<u64>() else {
        return RangeParseResult::Full;
    };

    let end = if end_str.is_empty() {
        None
    } else {
        match end_str.parse::<u64>() {
            Ok(e) => Some(e),
            Err(_) => return RangeParseResult::Full,
        }
    };

    // last-byte-pos before first-byte-pos makes the header invalid, not unsatisfiable
    if end.is_some_and(|e| e < start) {
        return RangeParseResult::Full;
    }

    if start >= len {
        return RangeParseResult::NotSatisfiable;
    }

    let end_exclusive = end.map_or(len, |e| e.saturating_add(1).min(len));
    RangeParseResult::Partial(start..end_exclusive)
}
