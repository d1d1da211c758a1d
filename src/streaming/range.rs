//! Single byte-range requests.
//!
//! Only `bytes=<start>-[<end>]` is understood. Suffix ranges (`bytes=-500`)
//! and multi-range requests are treated as malformed, and a malformed header
//! is reported the same way as an out-of-bounds one.

use clipdock_common::{Error, Result};

/// A parsed `Range` header before it is checked against the file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    /// Inclusive end; `None` means "to the end of the file".
    pub end: Option<u64>,
}

impl ByteRange {
    /// Parse a `Range` header value.
    pub fn parse(header: &str) -> Option<Self> {
        let spec = header.trim().strip_prefix("bytes=")?;
        let (start, end) = spec.split_once('-')?;

        let start = parse_digits(start)?;
        let end = if end.is_empty() {
            None
        } else {
            Some(parse_digits(end)?)
        };

        Some(Self { start, end })
    }

    /// Resolve against the file size into an inclusive `(start, end)` window.
    pub fn resolve(self, size: u64) -> Result<(u64, u64)> {
        let end = match self.end {
            Some(end) => end,
            None => size.checked_sub(1).ok_or(Error::RangeNotSatisfiable { size })?,
        };

        if self.start >= size || end >= size || end < self.start {
            return Err(Error::RangeNotSatisfiable { size });
        }

        Ok((self.start, end))
    }
}

fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// What to send for a given request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServePlan {
    /// 200 with the whole file.
    Full { size: u64 },
    /// 206 with the inclusive window `start..=end`.
    Partial { start: u64, end: u64, size: u64 },
}

impl ServePlan {
    /// Decide between a full and a partial response.
    pub fn for_request(range_header: Option<&str>, size: u64) -> Result<Self> {
        let Some(header) = range_header else {
            return Ok(ServePlan::Full { size });
        };

        let range = ByteRange::parse(header).ok_or(Error::RangeNotSatisfiable { size })?;
        let (start, end) = range.resolve(size)?;
        Ok(ServePlan::Partial { start, end, size })
    }

    /// Number of body bytes this plan sends.
    pub fn content_length(&self) -> u64 {
        match *self {
            ServePlan::Full { size } => size,
            ServePlan::Partial { start, end, .. } => end - start + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_closed_range() {
        assert_eq!(
            ByteRange::parse("bytes=500-599"),
            Some(ByteRange {
                start: 500,
                end: Some(599)
            })
        );
    }

    #[test]
    fn test_parse_open_range() {
        assert_eq!(
            ByteRange::parse(" bytes=500- "),
            Some(ByteRange {
                start: 500,
                end: None
            })
        );
    }

    #[test]
    fn test_parse_rejects_other_forms() {
        assert_eq!(ByteRange::parse("bytes=-500"), None);
        assert_eq!(ByteRange::parse("bytes=0-1,5-9"), None);
        assert_eq!(ByteRange::parse("bytes=abc-def"), None);
        assert_eq!(ByteRange::parse("items=0-10"), None);
        assert_eq!(ByteRange::parse("bytes=+1-2"), None);
        assert_eq!(ByteRange::parse("bytes=0"), None);
    }

    #[test]
    fn test_no_header_is_full() {
        let plan = ServePlan::for_request(None, 1000).unwrap();
        assert_eq!(plan, ServePlan::Full { size: 1000 });
        assert_eq!(plan.content_length(), 1000);
    }

    #[test]
    fn test_partial_window() {
        let plan = ServePlan::for_request(Some("bytes=500-599"), 1000).unwrap();
        assert_eq!(
            plan,
            ServePlan::Partial {
                start: 500,
                end: 599,
                size: 1000
            }
        );
        assert_eq!(plan.content_length(), 100);
    }

    #[test]
    fn test_open_end_runs_to_last_byte() {
        let plan = ServePlan::for_request(Some("bytes=990-"), 1000).unwrap();
        assert_eq!(plan.content_length(), 10);
    }

    #[test]
    fn test_out_of_bounds() {
        assert_matches!(
            ServePlan::for_request(Some("bytes=2000-2100"), 1000),
            Err(Error::RangeNotSatisfiable { size: 1000 })
        );
        assert_matches!(
            ServePlan::for_request(Some("bytes=0-1000"), 1000),
            Err(Error::RangeNotSatisfiable { .. })
        );
        assert_matches!(
            ServePlan::for_request(Some("bytes=600-500"), 1000),
            Err(Error::RangeNotSatisfiable { .. })
        );
    }

    #[test]
    fn test_malformed_is_not_satisfiable() {
        assert_matches!(
            ServePlan::for_request(Some("bytes=x-"), 1000),
            Err(Error::RangeNotSatisfiable { .. })
        );
    }

    #[test]
    fn test_any_range_on_empty_file() {
        assert_matches!(
            ServePlan::for_request(Some("bytes=0-"), 0),
            Err(Error::RangeNotSatisfiable { size: 0 })
        );
    }
}
