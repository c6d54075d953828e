// src/highlight.rs
//
// Numeric code highlighting. Verification codes are the most time-sensitive
// part of transactional mail, so standalone runs of four or more digits are
// wrapped in <code> to stay monospaced once all other formatting is gone.
//
// A run is digits with optional single interior periods ("123.456"). It is
// left alone when glued to a letter/digit or to one of BORDER_PUNCT, which
// keeps dates, times, phone numbers, amounts and identifiers unwrapped.
// The caller is responsible for not calling this inside <code>/<pre>.

use std::borrow::Cow;

const MIN_DIGITS: usize = 4;

const BORDER_PUNCT: &[char] = &['-', '_', '/', ':', '+', '@', '#', '$', '%', '='];

#[inline]
fn is_border(c: char) -> bool {
    c.is_alphanumeric() || BORDER_PUNCT.contains(&c)
}

/// Wrap qualifying digit runs of `text` in `<code>`. Borrowed when nothing
/// qualifies.
pub fn highlight_codes(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let n = bytes.len();
    let mut out = String::new();
    let mut copied = 0usize;
    let mut i = 0usize;

    while i < n {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i;
        let mut digits = 0usize;
        loop {
            while end < n && bytes[end].is_ascii_digit() {
                end += 1;
                digits += 1;
            }
            if end + 1 < n && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
                end += 1;
                continue;
            }
            break;
        }
        i = end;

        if digits < MIN_DIGITS {
            continue;
        }
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        if before.is_some_and(is_border) || after.is_some_and(is_border) {
            continue;
        }

        out.push_str(&text[copied..start]);
        out.push_str("<code>");
        out.push_str(&text[start..end]);
        out.push_str("</code>");
        copied = end;
    }

    if copied == 0 {
        return Cow::Borrowed(text);
    }
    out.push_str(&text[copied..]);
    Cow::Owned(out)
}
