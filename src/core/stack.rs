//! One-line stack traces
//!
//! The current thread's backtrace is rendered into a pooled scratch buffer
//! and then folded into a single field value:
//!
//! ```text
//! [my_app::handler src/handler.rs:42:9],[my_app::serve src/main.rs:17:5],...
//! ```
//!
//! Frames run innermost first. Each frame is `[symbol location]`, or
//! `[symbol]` when no location is known.
//!
//! Frame skipping is anchored on [`append_stack`] itself: everything up to
//! and including its frame is dropped, then `skip` more frames. Public
//! entry points call it directly and pass `skip = 1`, which removes their
//! own frame so the first frame shown is their caller. If the anchor
//! cannot be found (symbols stripped), every frame is kept.
//!
//! Two size policies exist. [`StackLimit::Unbounded`] lets the output grow
//! as needed. [`StackLimit::Bytes`] stops once the rendered value would
//! exceed the limit and writes `...` in place of the rest.

use super::escape::append_escaped;
use super::pool::{BufferPool, DEFAULT_BUFFER_CAPACITY};
use super::value::append_raw_fmt;
use std::backtrace::Backtrace;

/// Marker written in place of frames that did not fit.
pub const TRUNCATION_MARKER: &[u8] = b"...";

/// Scratch size for the raw multi-line backtrace text.
const SCRATCH_CAPACITY: usize = 4 * DEFAULT_BUFFER_CAPACITY;

/// Symbol path of the anchor frame.
const ANCHOR: &str = "core::stack::append_stack";

/// How much room a captured stack may take in a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackLimit {
    /// Keep every frame.
    #[default]
    Unbounded,
    /// Keep at most this many bytes of frames, then `...`.
    Bytes(usize),
}

fn escaped_len(s: &str) -> usize {
    s.len() + s.bytes().filter(|b| matches!(b, b'\t' | b'\n' | b'\\')).count()
}

struct Frame<'a> {
    symbol: &'a str,
    location: Option<&'a str>,
}

impl Frame<'_> {
    /// Length of [`Frame::append`]'s output, escapes included.
    fn rendered_len(&self) -> usize {
        2 + escaped_len(self.symbol) + self.location.map_or(0, |l| escaped_len(l) + 1)
    }

    fn append(&self, buf: &mut Vec<u8>) {
        buf.push(b'[');
        append_escaped(buf, self.symbol);
        if let Some(location) = self.location {
            buf.push(b' ');
            append_escaped(buf, location);
        }
        buf.push(b']');
    }
}

/// Split the standard backtrace rendering into frames.
///
/// Symbol lines look like `  12: path::to::function` (continuation
/// symbols of inlined frames have no index); location lines look like
/// `at src/file.rs:10:5` and belong to the symbol above them.
fn parse_frames(raw: &str) -> Vec<Frame<'_>> {
    let mut frames: Vec<Frame<'_>> = Vec::with_capacity(64);
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(location) = line.strip_prefix("at ") {
            match frames.last_mut() {
                Some(frame) if frame.location.is_none() => frame.location = Some(location),
                _ => frames.push(Frame {
                    symbol: line,
                    location: None,
                }),
            }
            continue;
        }
        let symbol = match line.split_once(": ") {
            Some((index, rest)) if index.bytes().all(|b| b.is_ascii_digit()) => rest,
            _ => line,
        };
        frames.push(Frame {
            symbol,
            location: None,
        });
    }
    frames
}

/// Append the calling thread's stack to `buf` as one field value.
///
/// `skip` counts frames to drop after this function's own frame.
#[inline(never)]
pub fn append_stack(buf: &mut Vec<u8>, skip: usize, limit: StackLimit) {
    let backtrace = Backtrace::force_capture();

    let mut scratch = BufferPool::global().acquire(SCRATCH_CAPACITY);
    append_raw_fmt(&mut scratch, format_args!("{}", backtrace));
    let raw = String::from_utf8_lossy(&scratch);
    let frames = parse_frames(&raw);

    let start = frames
        .iter()
        .position(|f| f.symbol.contains(ANCHOR))
        .map_or(0, |anchor| anchor + 1 + skip);
    // Never return an empty capture: keep the innermost frame at least.
    let start = if start >= frames.len() { 0 } else { start };

    let budget = match limit {
        StackLimit::Unbounded => usize::MAX,
        StackLimit::Bytes(n) => n,
    };
    append_frames(buf, &frames[start..], budget);
}

/// Append `frames` comma-separated, stopping at `budget` bytes of output.
fn append_frames(buf: &mut Vec<u8>, frames: &[Frame<'_>], budget: usize) {
    let mut written = 0usize;
    for (i, frame) in frames.iter().enumerate() {
        let separator = usize::from(i > 0);
        let len = separator + frame.rendered_len();
        if written.saturating_add(len) > budget {
            append_truncated(buf, frame, separator == 1, budget - written);
            buf.extend_from_slice(TRUNCATION_MARKER);
            return;
        }
        if separator == 1 {
            buf.push(b',');
        }
        frame.append(buf);
        written += len;
    }
}

/// Write as much of `frame` as fits in `room` bytes, cut at a char boundary.
fn append_truncated(buf: &mut Vec<u8>, frame: &Frame<'_>, separator: bool, room: usize) {
    let mut rendered = Vec::with_capacity(frame.rendered_len() + 1);
    if separator {
        rendered.push(b',');
    }
    frame.append(&mut rendered);
    let text = String::from_utf8_lossy(&rendered);
    let mut cut = room.min(text.len());
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    // Do not split a `\\` escape pair.
    let trailing = text.as_bytes()[..cut].iter().rev().take_while(|&&b| b == b'\\').count();
    if trailing % 2 == 1 {
        cut -= 1;
    }
    buf.extend_from_slice(&text.as_bytes()[..cut]);
}

/// Capture the caller's stack as a one-line string.
///
/// With `Some(limit)` the result is cut to `limit` bytes of frames
/// followed by `...`.
#[inline(never)]
pub fn stack_trace(limit: Option<usize>) -> String {
    let mut buf = Vec::with_capacity(DEFAULT_BUFFER_CAPACITY);
    let limit = limit.map_or(StackLimit::Unbounded, StackLimit::Bytes);
    append_stack(&mut buf, 1, limit);
    String::from_utf8_lossy(&buf).into_owned()
}
