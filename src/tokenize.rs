use regex::Regex;
use shakmaty::Color;
use std::sync::LazyLock;

use crate::log;

/// Optional move number (`12.`, `12...`) directly followed by one move in
/// standard algebraic notation.
static MOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:(\d+)\s*(\.{1,3})\s*)?",
        r"(O-O-O|O-O|0-0-0|0-0",
        r"|[KQRBN][a-h]?[1-8]?x?[a-h][1-8]",
        r"|[a-h](?:x[a-h])?[1-8](?:=?[QRBN])?)",
        r"([+#])?",
    ))
    .expect("valid move token regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Move(MoveToken),
    Open,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveToken {
    pub notation: String,
    /// Move number written in front of the move, if any. Advisory only.
    pub number: Option<u32>,
    /// `Black` for `N...`, `White` for `N.`.
    pub side: Option<Color>,
    /// Byte offset into the sanitized text.
    pub offset: usize,
}

impl MoveToken {
    /// The move number hint as written, normalized to `N.` or `N...`.
    pub fn hint(&self) -> Option<String> {
        let number = self.number?;
        Some(match self.side {
            Some(Color::Black) => format!("{number}..."),
            _ => format!("{number}."),
        })
    }
}

/// Splits sanitized movetext into moves and variation brackets.
///
/// Anything not recognized is skipped one character at a time.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut skipped_from: Option<usize> = None;

    while let Some(c) = text[pos..].chars().next() {
        let recognized = match c {
            '(' => {
                tokens.push(Token::Open);
                pos += 1;
                true
            }
            ')' => {
                tokens.push(Token::Close);
                pos += 1;
                true
            }
            c if c.is_whitespace() => {
                pos += c.len_utf8();
                true
            }
            _ => match match_move(text, pos) {
                Some((token, len)) => {
                    tokens.push(Token::Move(token));
                    pos += len;
                    true
                }
                None => false,
            },
        };

        if recognized {
            if let Some(start) = skipped_from.take() {
                report_skipped(text, start, pos);
            }
        } else {
            skipped_from.get_or_insert(pos);
            pos += c.len_utf8();
        }
    }

    if let Some(start) = skipped_from {
        report_skipped(text, start, text.len());
    }

    tokens
}

fn match_move(text: &str, pos: usize) -> Option<(MoveToken, usize)> {
    if !is_boundary(text[..pos].chars().next_back()) {
        return None;
    }

    let rest = &text[pos..];
    let caps = MOVE_RE.captures(rest)?;
    let whole = caps.get(0)?;
    if !is_boundary(rest[whole.end()..].chars().next()) {
        return None;
    }

    let mut notation = caps.get(3)?.as_str().replace('0', "O");
    if let Some(suffix) = caps.get(4) {
        notation.push_str(suffix.as_str());
    }

    let number = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
    let side = caps.get(2).map(|dots| {
        if dots.as_str().len() == 1 {
            Color::White
        } else {
            Color::Black
        }
    });

    Some((
        MoveToken {
            notation,
            number,
            side,
            offset: pos,
        },
        whole.end(),
    ))
}

fn is_boundary(c: Option<char>) -> bool {
    !c.is_some_and(|c| c.is_alphanumeric())
}

fn report_skipped(text: &str, start: usize, end: usize) {
    let skipped = text[start..end].trim();
    if !skipped.is_empty() {
        log::debug(format!("skipped unrecognized text '{skipped}' at offset {start}"));
    }
}
