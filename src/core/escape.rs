//! Escaping of free-text values
//!
//! A record must stay on one line and its fields must stay separated by
//! tabs, so every tab, newline and backslash inside a value is replaced by
//! a two-character sequence: `\t`, `\n` and `\\`. Escaping the backslash
//! keeps the mapping reversible, see [`unescape`].

use std::borrow::Cow;

#[inline]
fn needs_escape(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\\')
}

/// Append `s` to `buf` with control characters escaped.
///
/// Unescaped runs are copied in one slice, so a value with nothing to
/// escape costs a single `extend_from_slice`.
pub fn append_escaped(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if !needs_escape(b) {
            continue;
        }
        buf.extend_from_slice(&bytes[start..i]);
        buf.extend_from_slice(match b {
            b'\t' => b"\\t",
            b'\n' => b"\\n",
            _ => b"\\\\",
        });
        start = i + 1;
    }
    buf.extend_from_slice(&bytes[start..]);
}

/// Escape `s`, borrowing it unchanged when there is nothing to replace.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.bytes().any(needs_escape) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    let mut start = 0;
    for (i, b) in s.bytes().enumerate() {
        if !needs_escape(b) {
            continue;
        }
        // `i` indexes an ASCII byte, so it is a char boundary.
        out.push_str(&s[start..i]);
        out.push_str(match b {
            b'\t' => "\\t",
            b'\n' => "\\n",
            _ => "\\\\",
        });
        start = i + 1;
    }
    out.push_str(&s[start..]);
    Cow::Owned(out)
}

/// Reverse [`escape`].
///
/// `\t`, `\n` and `\\` map back to their characters. Any other backslash
/// sequence, including a trailing lone backslash, is kept verbatim.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('\\') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}
