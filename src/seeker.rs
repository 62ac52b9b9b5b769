//! Backward line-boundary discovery.
//!
//! [`TailSeeker`] finds where the last N lines of a seekable source begin by
//! reading progressively larger windows off the end of the source. The first
//! window assumes lines of about [`ASSUMED_LINE_LEN`] bytes; every miss
//! rescales the window using the line length actually observed, so a file is
//! read in full only when it is shorter than the window that would be needed.
//!
//! Windows are split on raw bytes and only the kept lines are decoded. A
//! window that does not start at offset 0 always contains more terminators
//! than lines kept, so its leading segment (which may begin in the middle of
//! a multi-byte character) is never decoded.

use std::io::{self, Read, Seek, SeekFrom};

use tracing::debug;

use crate::error::Result;

pub const DEFAULT_LINE_COUNT: usize = 10;
pub const ASSUMED_LINE_LEN: u64 = 100;

const TERMINATOR: u8 = b'\n';

/// The last lines of a source and where they start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailWindow {
    /// Complete lines, oldest first, without their terminators.
    pub lines: Vec<String>,
    /// Byte offset at which the first returned line begins. When no complete
    /// line exists this is the start of the trailing unterminated text.
    pub start_offset: u64,
    /// Number of windows read before the boundary was found.
    pub probes: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct TailSeeker {
    lines: usize,
    assumed_line_len: u64,
}

impl TailSeeker {
    pub fn new(lines: usize) -> Self {
        Self {
            lines,
            assumed_line_len: ASSUMED_LINE_LEN,
        }
    }

    /// Override the line length used to size the first window.
    ///
    /// The binary always uses [`ASSUMED_LINE_LEN`]; this is a tuning hook for
    /// callers that know their line lengths.
    #[allow(dead_code)]
    pub fn with_assumed_line_len(mut self, len: u64) -> Self {
        self.assumed_line_len = len.max(1);
        self
    }

    /// Locate the last lines of the first `total_len` bytes of `source`.
    ///
    /// On success the cursor of `source` is left at `total_len`.
    pub fn seek<R: Read + Seek>(&self, source: &mut R, total_len: u64) -> Result<TailWindow> {
        if self.lines == 0 {
            source.seek(SeekFrom::Start(total_len))?;
            return Ok(TailWindow {
                lines: Vec::new(),
                start_offset: total_len,
                probes: 0,
            });
        }

        // Splitting on N terminators yields N + 1 segments, the last of which
        // follows the final terminator and is not a complete line.
        let target = (self.lines as u64).saturating_add(1);
        let mut chunk = self.assumed_line_len.saturating_mul(target);
        let mut buf = Vec::new();
        let mut probes = 0;

        let window_start = loop {
            probes += 1;

            if chunk >= total_len {
                source.seek(SeekFrom::Start(0))?;
                buf.clear();
                source.by_ref().take(total_len).read_to_end(&mut buf)?;
                source.seek(SeekFrom::Start(total_len))?;
                debug!(probes, total_len, "tail window covers the whole source");
                break 0;
            }

            let start = total_len - chunk;
            let window_len = usize::try_from(chunk).map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidInput, "tail window exceeds address space")
            })?;
            source.seek(SeekFrom::Start(start))?;
            buf.resize(window_len, 0);
            source.read_exact(&mut buf)?;

            let count = bytecount(&buf);
            debug!(probes, chunk, count, "probed tail window");
            if count >= target {
                break start;
            }

            let next = if count == 0 {
                chunk.saturating_mul(target)
            } else {
                (chunk / count).saturating_mul(target)
            };
            chunk = next.max(chunk.saturating_add(1));
        };

        let (lines, start_offset) = split_tail(&buf, window_start, self.lines.saturating_add(1));
        Ok(TailWindow {
            lines,
            start_offset,
            probes,
        })
    }
}

/// Return the last `n` complete lines of `source`, oldest first.
///
/// Shorthand for [`TailSeeker::seek`] when only the lines are wanted. The
/// binary calls `seek` directly so it can log the offset and probe count.
#[allow(dead_code)]
pub fn find_last_lines<R: Read + Seek>(
    source: &mut R,
    total_len: u64,
    n: usize,
) -> Result<Vec<String>> {
    TailSeeker::new(n)
        .seek(source, total_len)
        .map(|window| window.lines)
}

fn bytecount(buf: &[u8]) -> u64 {
    buf.iter().filter(|&&b| b == TERMINATOR).count() as u64
}

fn split_tail(buf: &[u8], window_start: u64, segments: usize) -> (Vec<String>, u64) {
    let mut kept: Vec<&[u8]> = buf.rsplit(|&b| b == TERMINATOR).take(segments).collect();
    kept.reverse();

    let trailing = kept.pop().map_or(0, <[u8]>::len);
    let tail_len = trailing + kept.iter().map(|line| line.len() + 1).sum::<usize>();
    let start_offset = window_start + (buf.len() - tail_len) as u64;

    let lines = kept
        .into_iter()
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect();
    (lines, start_offset)
}
