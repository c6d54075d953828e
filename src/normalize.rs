// src/normalize.rs
//
// Output normalization, run once on the whole rendered string:
//   • Tag pairs wrapping only whitespace are removed (repeatedly, so nested
//     empty wrappers go too). The whitespace they held is kept as a single
//     space or line break so neighbouring words do not merge.
//   • Outside <pre>: space/tab runs collapse to one space, line edges are
//     trimmed, and two or more blank lines collapse to one.
//   • Leading/trailing whitespace is trimmed.
// The pass is idempotent.

use memchr::{memchr, memmem};

pub fn normalize(rendered: &str) -> String {
    let mut cur = rendered.to_string();
    loop {
        let mut next = String::with_capacity(cur.len());
        if !strip_empty_pairs(&cur, &mut next) {
            break;
        }
        cur = next;
    }
    collapse_lines(&cur).trim().to_string()
}

/* ============================ Empty tag pairs ============================ */

#[inline]
fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

#[inline]
fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\n' || b == b'\r'
}

/// Find the '>' for a tag starting at `i` (s[i] == '<'), being quote-aware.
fn find_tag_end(s: &[u8], mut i: usize) -> Option<usize> {
    let n = s.len();
    i += 1;
    let mut quote: u8 = 0;
    while i < n {
        let b = s[i];
        if quote != 0 {
            if b == quote {
                quote = 0;
            }
        } else if b == b'"' || b == b'\'' {
            quote = b;
        } else if b == b'>' {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// If an opening tag starts at `lt` and is followed by nothing but whitespace
/// and its own end tag, return (index of the inner whitespace, index past the
/// end tag).
fn empty_pair_at(s: &[u8], lt: usize) -> Option<(usize, usize)> {
    let n = s.len();
    let name_start = lt + 1;
    let mut i = name_start;
    while i < n && is_name_char(s[i]) {
        i += 1;
    }
    if i == name_start {
        return None; // end tag, comment or stray '<'
    }
    let name = &s[name_start..i];

    let gt = find_tag_end(s, lt)?;
    if s[gt - 1] == b'/' {
        return None;
    }
    let inner = gt + 1;
    let mut j = inner;
    while j < n && is_ws(s[j]) {
        j += 1;
    }
    if !s[j..].starts_with(b"</") {
        return None;
    }
    let k = j + 2;
    if k + name.len() > n || !s[k..k + name.len()].eq_ignore_ascii_case(name) {
        return None;
    }
    let mut m = k + name.len();
    while m < n && is_ws(s[m]) {
        m += 1;
    }
    if m < n && s[m] == b'>' {
        Some((inner, m + 1))
    } else {
        None
    }
}

/// One left-to-right removal pass. Returns whether anything was removed.
fn strip_empty_pairs(src: &str, out: &mut String) -> bool {
    let s = src.as_bytes();
    let mut i = 0usize;
    let mut copied = 0usize;
    let mut changed = false;

    while let Some(off) = memchr(b'<', &s[i..]) {
        let lt = i + off;
        let Some((inner, end)) = empty_pair_at(s, lt) else {
            i = lt + 1;
            continue;
        };
        out.push_str(&src[copied..lt]);
        let held = &s[inner..end];
        if memchr(b'\n', held).is_some() {
            out.push('\n');
        } else if held.first().is_some_and(|b| is_ws(*b)) {
            out.push(' ');
        }
        copied = end;
        i = end;
        changed = true;
    }
    out.push_str(&src[copied..]);
    changed
}

/* ============================== Whitespace =============================== */

const PRE_OPEN: &[u8] = b"<pre>";
const PRE_CLOSE: &[u8] = b"</pre>";

#[inline]
fn is_space_tab(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r'
}

/// Append `seg` with every space/tab run shortened to one space.
fn push_collapsed(out: &mut String, seg: &str) {
    let mut pending_space = false;
    for ch in seg.chars() {
        if is_space_tab(ch) {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }
    if pending_space {
        out.push(' ');
    }
}

/// Normalize one line. Text inside <pre>...</pre> (which may have opened on
/// an earlier line, per `in_pre`) is copied as-is; everything else is
/// collapsed and the line edges outside <pre> are trimmed.
fn collapse_line(raw: &str, in_pre: &mut bool) -> String {
    let starts_in_pre = *in_pre;
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while !rest.is_empty() {
        let b = rest.as_bytes();
        if *in_pre {
            let Some(i) = memmem::find(b, PRE_CLOSE) else {
                out.push_str(rest);
                break;
            };
            let end = i + PRE_CLOSE.len();
            out.push_str(&rest[..end]);
            rest = &rest[end..];
            *in_pre = false;
        } else {
            let Some(i) = memmem::find(b, PRE_OPEN) else {
                push_collapsed(&mut out, rest);
                break;
            };
            push_collapsed(&mut out, &rest[..i]);
            let end = i + PRE_OPEN.len();
            out.push_str(&rest[i..end]);
            rest = &rest[end..];
            *in_pre = true;
        }
    }

    if !*in_pre {
        let kept = out.trim_end_matches(is_space_tab).len();
        out.truncate(kept);
    }
    if !starts_in_pre {
        let lead = out.len() - out.trim_start_matches(is_space_tab).len();
        out.drain(..lead);
    }
    out
}

fn collapse_lines(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut pending_blank = false;
    let mut in_pre = false;

    for raw in src.split('\n') {
        let starts_in_pre = in_pre;
        let line = collapse_line(raw, &mut in_pre);

        if starts_in_pre {
            out.push('\n');
            out.push_str(&line);
            continue;
        }
        if line.is_empty() {
            pending_blank = true;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if pending_blank {
                out.push('\n');
            }
        }
        pending_blank = false;
        out.push_str(&line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_runs_collapse_to_one() {
        assert_eq!(normalize("a\n\n\n\n b \n\nc\nd"), "a\n\nb\n\nc\nd");
    }

    #[test]
    fn trims_edges() {
        assert_eq!(normalize("\n \n  hello   world \n\n"), "hello world");
    }

    #[test]
    fn removes_empty_pairs() {
        assert_eq!(normalize("x<b> </b>y"), "x y");
        assert_eq!(normalize("x<b></b>y"), "xy");
        assert_eq!(normalize("<i><b>\n</b></i>tail"), "tail");
        assert_eq!(normalize("<a href=\"u>v\">  </a>z"), "z");
    }

    #[test]
    fn keeps_non_empty_pairs() {
        assert_eq!(normalize("<b>x</b> <i> y </i>"), "<b>x</b> <i> y </i>");
    }

    #[test]
    fn pre_content_is_verbatim() {
        let src = "<pre>fn main() {\n    go();\n\n\n}</pre>\n\n\n\nafter";
        assert_eq!(normalize(src), "<pre>fn main() {\n    go();\n\n\n}</pre>\n\nafter");
    }

    #[test]
    fn single_line_pre_is_verbatim() {
        assert_eq!(normalize("<pre>a    b</pre>"), "<pre>a    b</pre>");
        assert_eq!(
            normalize("x   <pre>a \t b</pre>   y \t z  "),
            "x <pre>a \t b</pre> y z"
        );
        assert_eq!(
            normalize("<pre>a  b</pre>  mid  <pre>  c  </pre>"),
            "<pre>a  b</pre> mid <pre>  c  </pre>"
        );
    }

    #[test]
    fn text_after_multi_line_pre_is_collapsed() {
        assert_eq!(
            normalize("<pre>one\n  two  </pre>   after   this  "),
            "<pre>one\n  two  </pre> after this"
        );
    }

    #[test]
    fn idempotent() {
        for src in [
            "a\n\n\n<b> </b>\n\nb",
            "  <i><u> </u></i>  x \t y\n\n\n",
            "<pre>  a\n\n\n b</pre>\n\n\nc",
            "x  <pre>a   b</pre>  y",
            "\n• one\n• two\n\n\n<code>1234</code>",
        ] {
            let once = normalize(src);
            assert_eq!(normalize(&once), once, "{src:?}");
        }
    }
}
