use smallvec::SmallVec;

use crate::error::ParseError;
use crate::tokenize::{Token, tokenize};

pub type MoveList = SmallVec<[String; 128]>;

/// Moves recovered without checking them against the rules.
///
/// Only produced when the caller opted into best-effort parsing; none of these
/// moves are known to be legal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnvalidatedLine {
    /// Every recognizable move in document order, variations flattened in.
    pub moves: MoveList,
    /// Why the validated path gave up.
    pub reason: ParseError,
}

/// Scans sanitized movetext for move notation, ignoring variation structure.
pub fn extract_moves(sanitized: &str) -> MoveList {
    tokenize(sanitized)
        .into_iter()
        .filter_map(|token| match token {
            Token::Move(m) => Some(m.notation),
            Token::Open | Token::Close => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::sanitize;

    #[test]
    fn test_extract_moves_in_document_order() {
        let moves = extract_moves(&sanitize("1. e4 (1. d4 d5) e5 2. Qh5 Qxe4"));
        assert_eq!(moves.as_slice(), ["e4", "d4", "d5", "e5", "Qh5", "Qxe4"]);
    }

    #[test]
    fn test_extract_moves_ignores_unbalanced_brackets() {
        let moves = extract_moves(&sanitize("1. e4 ) e5 ((2. Nf3"));
        assert_eq!(moves.as_slice(), ["e4", "e5", "Nf3"]);
    }

    #[test]
    fn test_extract_moves_empty() {
        assert!(extract_moves("").is_empty());
        assert!(extract_moves(&sanitize("{nothing here}")).is_empty());
    }
}
