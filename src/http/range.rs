//! HTTP Range request parsing module
//!
//! Single `bytes=start-end` ranges for audio streaming. Anything the server
//! cannot satisfy exactly is rejected instead of being clamped or ignored.

/// Inclusive byte span inside a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

#[allow(clippy::len_without_is_empty)]
impl ByteRange {
    /// Number of bytes covered by the range
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Reason a Range header was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRejection {
    /// Not of the form `bytes=<start>-[<end>]`
    Malformed,
    /// More than one range requested
    MultipleRanges,
    /// `start > end` or `end >= file_size`
    OutOfBounds,
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// No Range header, serve the whole file
    Full,
    /// Valid single range
    Partial(ByteRange),
    /// Respond 416
    NotSatisfiable(RangeRejection),
}

/// Parse an HTTP Range header against a file of `file_size` bytes
///
/// Accepted forms:
/// - `bytes=start-end` - specific range
/// - `bytes=start-` - from start to end of file
pub fn parse_range_header(range_header: Option<&str>, file_size: u64) -> RangeParseResult {
    let Some(header) = range_header else {
        return RangeParseResult::Full;
    };

    let Some(ranges) = header.trim().strip_prefix("bytes=") else {
        return RangeParseResult::NotSatisfiable(RangeRejection::Malformed);
    };

    if ranges.contains(',') {
        return RangeParseResult::NotSatisfiable(RangeRejection::MultipleRanges);
    }

    let Some((start_str, end_str)) = ranges.split_once('-') else {
        return RangeParseResult::NotSatisfiable(RangeRejection::Malformed);
    };

    // Suffix ranges ("-500") carry no start and are not supported
    let Some(start) = parse_bound(start_str.trim()) else {
        return RangeParseResult::NotSatisfiable(RangeRejection::Malformed);
    };

    let end_str = end_str.trim();
    let end = if end_str.is_empty() {
        match file_size.checked_sub(1) {
            Some(last) => last,
            None => return RangeParseResult::NotSatisfiable(RangeRejection::OutOfBounds),
        }
    } else {
        let Some(e) = parse_bound(end_str) else {
            return RangeParseResult::NotSatisfiable(RangeRejection::Malformed);
        };
        e
    };

    if start > end || end >= file_size {
        return RangeParseResult::NotSatisfiable(RangeRejection::OutOfBounds);
    }

    RangeParseResult::Partial(ByteRange { start, end })
}

/// Digits only; `str::parse` would also take a leading `+`
fn parse_bound(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
