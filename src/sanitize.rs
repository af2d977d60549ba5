//! Movetext cleanup ahead of tokenizing.
//!
//! Everything the tokenizer should never see is removed here: tag pairs,
//! `{...}` and `;` comments, `%` escape lines, NAGs and suffix glyphs, and
//! anything after the first game's result marker. Malformed input never
//! fails; it just loses the parts that cannot be made sense of.

use regex::Regex;
use std::sync::LazyLock;

static TAG_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[\s*[A-Za-z0-9_]+\s+"(?:[^"\\]|\\.)*"\s*\]"#).expect("valid tag pair regex")
});

/// A move number that can end an unterminated comment: `12.` or `12...`
/// followed by whitespace, end of text, or the start of a move.
static COMMENT_MOVE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9A-Za-z])(\d+\.+)(?:\s|$|[a-hKQRBNO])")
        .expect("valid comment move number regex")
});

static NAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\d+|[!?]+").expect("valid nag regex"));

static DOT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)\s*\.{4,}").expect("valid dot run regex"));

static RESULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"1/2-1/2|1-0|0-1|\*").expect("valid result regex"));

/// Normalize raw movetext for the tokenizer.
pub fn sanitize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let text = TAG_PAIR_RE.replace_all(raw, " ");
    let text = strip_comments(&text);
    let text = NAG_RE.replace_all(&text, " ");
    let text = DOT_RUN_RE.replace_all(&text, "${1}...");
    let text = truncate_at_result(&text);

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes `{...}` blocks, `;` line comments and `%` escape lines.
///
/// A `{` with no closing brace swallows the rest of the text, unless a move
/// number shows up inside it: the comment is then taken to end right before
/// that move number.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut at_line_start = true;

    while let Some(c) = rest.chars().next() {
        match c {
            '{' => {
                let body = &rest[1..];
                if let Some(end) = body.find('}') {
                    rest = &body[end + 1..];
                } else if let Some(caps) = COMMENT_MOVE_NUMBER_RE.captures(body) {
                    let resume = caps.get(1).map_or(body.len(), |m| m.start());
                    rest = &body[resume..];
                } else {
                    rest = "";
                }
                out.push(' ');
                at_line_start = false;
                continue;
            }
            ';' => {
                rest = match rest.find('\n') {
                    Some(nl) => &rest[nl..],
                    None => "",
                };
                out.push(' ');
                continue;
            }
            '%' if at_line_start => {
                rest = match rest.find('\n') {
                    Some(nl) => &rest[nl..],
                    None => "",
                };
                continue;
            }
            _ => {}
        }

        out.push(c);
        if c == '\n' {
            at_line_start = true;
        } else if !c.is_whitespace() {
            at_line_start = false;
        }
        rest = &rest[c.len_utf8()..];
    }

    out
}

/// Cuts the text at the first result marker outside of any variation.
fn truncate_at_result(text: &str) -> &str {
    let bytes = text.as_bytes();
    let is_boundary = |b: u8| b.is_ascii_whitespace() || b == b'(' || b == b')';

    let mut depth = 0usize;
    let mut scanned = 0usize;
    for m in RESULT_RE.find_iter(text) {
        for &b in &bytes[scanned..m.start()] {
            match b {
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        scanned = m.start();

        let before_ok = m.start() == 0 || is_boundary(bytes[m.start() - 1]);
        let after_ok = m.end() == bytes.len() || is_boundary(bytes[m.end()]);
        if depth == 0 && before_ok && after_ok {
            return &text[..m.start()];
        }
    }

    text
}
