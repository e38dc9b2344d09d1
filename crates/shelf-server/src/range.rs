//! Byte-range header parsing for file streaming.
//!
//! Supports the single-range forms browsers and PDF viewers actually
//! send: `bytes=a-b` and `bytes=a-`. Multipart ranges are not supported;
//! a multi-range header is treated as absent and the whole file is
//! returned, which is a valid response per RFC 9110.

/// A parsed `Range` request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First requested byte offset.
    pub start: u64,
    /// Last requested byte offset, inclusive; `None` means end of file.
    pub end: Option<u64>,
}

impl ByteRange {
    /// Clamps the range against the actual file size.
    ///
    /// Returns the inclusive `(start, end)` pair to serve, or `None` when
    /// the range is unsatisfiable (start beyond the file, or inverted).
    #[must_use]
    pub fn resolve(self, file_size: u64) -> Option<(u64, u64)> {
        if file_size == 0 || self.start >= file_size {
            return None;
        }
        let end = self.end.map_or(file_size - 1, |e| e.min(file_size - 1));
        if end < self.start {
            return None;
        }
        Some((self.start, end))
    }
}

/// Parses a `Range` header value.
///
/// Returns `None` for anything other than a single `bytes=` range, which
/// callers treat as "serve the whole file".
#[must_use]
pub fn parse(header: &str) -> Option<ByteRange> {
    let spec = header.strip_prefix("bytes=")?;
    // Single range only.
    if spec.contains(',') {
        return None;
    }

    let (start, end) = spec.split_once('-')?;
    let start: u64 = start.trim().parse().ok()?;
    let end = end.trim();
    let end = if end.is_empty() {
        None
    } else {
        Some(end.parse().ok()?)
    };

    Some(ByteRange { start, end })
}
