use shakmaty::Chess;

use crate::config::{FallbackPolicy, ParseOptions};
use crate::error::ParseError;
use crate::fallback::{UnvalidatedLine, extract_moves};
use crate::flatten::{Variation, flatten};
use crate::log;
use crate::sanitize::sanitize;
use crate::tokenize::tokenize;
use crate::tree::{GameTree, build_tree};
use crate::validator::{MoveValidator, StrictSan};

#[derive(Debug)]
pub enum ParsedGame<P = Chess> {
    /// Every path in the tree is a legal game.
    Validated(GameTree<P>),
    /// Best-effort move list, nothing in it was checked.
    Unvalidated(UnvalidatedLine),
}

impl<P> ParsedGame<P> {
    pub fn is_validated(&self) -> bool {
        matches!(self, Self::Validated(_))
    }

    pub fn tree(&self) -> Option<&GameTree<P>> {
        match self {
            Self::Validated(tree) => Some(tree),
            Self::Unvalidated(_) => None,
        }
    }

    /// Flattened variations; `None` for an unvalidated line.
    pub fn variations(&self, name_length: usize) -> Option<Vec<Variation>> {
        self.tree().map(|tree| flatten(tree, name_length))
    }
}

/// Parses the first game in `text` against standard chess rules.
pub fn parse_movetext(text: &str, options: &ParseOptions) -> Result<ParsedGame, ParseError> {
    parse_movetext_with(text, options, &StrictSan)
}

pub fn parse_movetext_with<V: MoveValidator>(
    text: &str,
    options: &ParseOptions,
    validator: &V,
) -> Result<ParsedGame<V::Position>, ParseError> {
    let sanitized = sanitize(text);
    let tokens = tokenize(&sanitized);

    match build_tree(&tokens, validator, options.max_depth) {
        Ok(tree) => Ok(ParsedGame::Validated(tree)),
        Err(err @ ParseError::IllegalMove(_)) if options.fallback == FallbackPolicy::BestEffort => {
            log::warn(format!("{err}; falling back to unvalidated move list"));
            Ok(ParsedGame::Unvalidated(UnvalidatedLine {
                moves: extract_moves(&sanitized),
                reason: err,
            }))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;
    use crate::validator::replay;

    fn strict() -> ParseOptions {
        ParseOptions::default()
            .with_fallback(FallbackPolicy::Strict)
            .with_max_depth(64)
    }

    fn lenient() -> ParseOptions {
        strict().with_fallback(FallbackPolicy::BestEffort)
    }

    /// Pre-order dump of san and board for deep comparison.
    fn dump(root: &Node) -> Vec<(usize, String, String)> {
        let v = StrictSan;
        let mut out = Vec::new();
        let mut pending = vec![(0usize, root)];
        while let Some((depth, node)) = pending.pop() {
            out.push((depth, node.san.clone(), v.describe(&node.position)));
            pending.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        }
        out
    }

    #[test]
    fn test_parse_validated_tree() {
        let parsed = parse_movetext("1.e4 (1.d4 d5 2.c4) 1...c5 (1...e5 2.Nf3 Nc6)", &strict())
            .unwrap();
        assert!(parsed.is_validated());
        let tree = parsed.tree().unwrap();
        assert_eq!(tree.root.children.len(), 2);
        assert_eq!(tree.root.children[0].children.len(), 2);
    }

    #[test]
    fn test_parse_broken_comment_does_not_fail() {
        let parsed = parse_movetext("1.e4 {broken comment 1... e5 2.Nf3 *", &strict()).unwrap();
        let tree = parsed.tree().unwrap();
        assert_eq!(tree.main_line_sans().first().copied(), Some("e4"));
    }

    #[test]
    fn test_parse_illegal_move_strict() {
        let err = parse_movetext("1.e4 e5 2.Qh5 Qxe4", &strict()).unwrap_err();
        let ParseError::IllegalMove(illegal) = err else {
            panic!("expected an illegal move error");
        };
        assert_eq!(illegal.notation, "Qxe4");
        assert_eq!(illegal.label(), "2... Qxe4");
    }

    #[test]
    fn test_parse_illegal_move_best_effort() {
        let parsed = parse_movetext("1.e4 e5 (1...c5) 2.Qh5 Qxe4", &lenient()).unwrap();
        assert!(!parsed.is_validated());
        assert!(parsed.tree().is_none());
        assert!(parsed.variations(4).is_none());

        let ParsedGame::Unvalidated(line) = parsed else {
            panic!("expected an unvalidated line");
        };
        assert_eq!(line.moves.as_slice(), ["e4", "e5", "c5", "Qh5", "Qxe4"]);
        assert_eq!(line.reason.kind(), "illegal_move");
    }

    #[test]
    fn test_best_effort_keeps_validated_result_when_legal() {
        let parsed = parse_movetext("1. e4 e5", &lenient()).unwrap();
        assert!(parsed.is_validated());
    }

    #[test]
    fn test_empty_game_is_not_rescued_by_fallback() {
        assert_eq!(
            parse_movetext("{comment only}", &lenient()).unwrap_err(),
            ParseError::EmptyGame
        );
        assert_eq!(parse_movetext("", &strict()).unwrap_err(), ParseError::EmptyGame);
        assert_eq!(parse_movetext("*", &strict()).unwrap_err(), ParseError::EmptyGame);
    }

    #[test]
    fn test_parse_with_headers_and_result() {
        let pgn = "[Event \"Club\"]\n[Result \"1-0\"]\n\n1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7# 1-0";
        let parsed = parse_movetext(pgn, &strict()).unwrap();
        let tree = parsed.tree().unwrap();
        assert_eq!(
            tree.main_line_sans(),
            ["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7#"]
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "1. e4 e5 (1... c5 2. Nf3 (2. c3) d6) 2. Nf3 Nc6 (2... d6) 3. Bb5";
        let sanitized = sanitize(text);
        let first = parse_movetext(&sanitized, &strict()).unwrap();
        let second = parse_movetext(&sanitized, &strict()).unwrap();
        assert_eq!(
            dump(&first.tree().unwrap().root),
            dump(&second.tree().unwrap().root)
        );
        assert_eq!(first.variations(4), second.variations(4));
    }

    #[test]
    fn test_sanitizing_twice_changes_nothing() {
        let text = "1. e4! {comment} e5 $1 (1... c5?!) 2. Nf3 1-0";
        assert_eq!(sanitize(&sanitize(text)), sanitize(text));
    }

    #[test]
    fn test_every_variation_replays() {
        let text = "1. d4 Nf6 (1... d5 2. c4 (2. Bf4 c5) e6) 2. c4 e6 (2... g6 3. Nc3 Bg7) 3. Nc3 Bb4";
        let parsed = parse_movetext(text, &strict()).unwrap();
        let variations = parsed.variations(4).unwrap();
        assert_eq!(variations.len(), 4);
        for variation in variations {
            assert!(replay(&StrictSan, &variation.moves).is_ok());
        }
    }

    #[test]
    fn test_independent_parses_in_parallel() {
        let texts = [
            "1. e4 e5 (1... c5) 2. Nf3",
            "1. d4 d5 2. c4 (2. Nf3 Nf6) e6",
            "1. c4 (1. Nf3) e5",
        ];
        let results: Vec<Vec<String>> = std::thread::scope(|scope| {
            let handles: Vec<_> = texts
                .iter()
                .map(|text| {
                    scope.spawn(move || {
                        let parsed = parse_movetext(text, &strict()).unwrap();
                        parsed
                            .variations(4)
                            .unwrap()
                            .into_iter()
                            .map(|v| v.id)
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(results[0], ["main", "2-1"]);
        assert_eq!(results[1], ["main", "3-1"]);
        assert_eq!(results[2], ["main", "1-1"]);
    }
}
