//! Builds the validated move tree from a token stream.
//!
//! Every move is played on the board of the node it follows, so any path from
//! the root is a legal game. A `(` opens an alternative to the move just played
//! at the same level: the variation hangs off the position that move departed
//! from. Nesting is tracked on an explicit frame stack capped at `max_depth`.

use shakmaty::{Chess, Color};
use smallvec::{SmallVec, smallvec};
use std::mem;

use crate::error::{Diagnostic, IllegalMove, ParseError};
use crate::log;
use crate::tokenize::{MoveToken, Token};
use crate::validator::{MoveValidator, Rejection};

#[derive(Debug)]
pub struct Node<P = Chess> {
    pub position_before: P,
    /// Board after `san` was played.
    pub position: P,
    /// Empty for the root.
    pub san: String,
    /// `children[0]` is the main continuation, the rest are alternatives to it.
    pub children: Vec<Node<P>>,
}

impl<P> Node<P> {
    pub fn is_root(&self) -> bool {
        self.san.is_empty()
    }

    pub fn main_child(&self) -> Option<&Node<P>> {
        self.children.first()
    }

    pub fn alternatives(&self) -> &[Node<P>] {
        self.children.get(1..).unwrap_or(&[])
    }

    /// Nodes reached by always taking `children[0]`, starting below `self`.
    pub fn main_line(&self) -> impl Iterator<Item = &Node<P>> {
        std::iter::successors(self.main_child(), |node| node.main_child())
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }
}

// Main lines are long chains; unlink them so dropping a tree does not recurse
// once per ply.
impl<P> Drop for Node<P> {
    fn drop(&mut self) {
        let mut pending = mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[derive(Debug)]
pub struct GameTree<P = Chess> {
    pub root: Node<P>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<P> GameTree<P> {
    pub fn main_line_sans(&self) -> Vec<&str> {
        self.root.main_line().map(|node| node.san.as_str()).collect()
    }

    /// Number of root-to-leaf lines: the main line plus one per alternative
    /// child anywhere in the tree.
    pub fn variation_count(&self) -> usize {
        let mut count = 1;
        let mut pending = vec![&self.root];
        while let Some(node) = pending.pop() {
            count += node.children.len().saturating_sub(1);
            pending.extend(node.children.iter());
        }
        count
    }
}

struct Slot<P> {
    parent: Option<usize>,
    position_before: P,
    position: P,
    san: String,
    children: SmallVec<[usize; 2]>,
}

#[derive(Clone, Copy)]
struct Frame {
    current: usize,
    /// Node the last move at this level was played from.
    anchor: Option<usize>,
}

/// Whether any move sits outside of every variation.
pub fn has_main_line_moves(tokens: &[Token]) -> bool {
    let mut depth = 0usize;
    for token in tokens {
        match token {
            Token::Open => depth += 1,
            Token::Close => depth = depth.saturating_sub(1),
            Token::Move(_) if depth == 0 => return true,
            Token::Move(_) => {}
        }
    }
    false
}

pub fn build_tree<V: MoveValidator>(
    tokens: &[Token],
    validator: &V,
    max_depth: usize,
) -> Result<GameTree<V::Position>, ParseError> {
    if !has_main_line_moves(tokens) {
        return Err(ParseError::EmptyGame);
    }

    let initial = validator.initial();
    let mut arena = vec![Slot {
        parent: None,
        position_before: initial.clone(),
        position: initial,
        san: String::new(),
        children: SmallVec::new(),
    }];
    let mut frames: SmallVec<[Frame; 8]> = smallvec![Frame {
        current: 0,
        anchor: None,
    }];
    let mut diagnostics = Vec::new();
    let mut skipping = 0usize;

    for token in tokens {
        if skipping > 0 {
            match token {
                Token::Open => skipping += 1,
                Token::Close => skipping -= 1,
                Token::Move(_) => {}
            }
            continue;
        }

        match token {
            Token::Move(m) => {
                let Some(frame) = frames.last_mut() else {
                    break;
                };
                let parent = frame.current;
                let applied = validator
                    .apply(&arena[parent].position, &m.notation)
                    .map_err(|rejection| illegal_move(&arena, parent, m, rejection, validator))?;

                let observed = [
                    cross_check(m, &arena[parent].position, validator),
                    check_suffix(&m.notation, &applied.san),
                ];
                for diagnostic in observed.into_iter().flatten() {
                    log::debug(diagnostic.to_string());
                    diagnostics.push(diagnostic);
                }

                let id = arena.len();
                let position_before = arena[parent].position.clone();
                arena.push(Slot {
                    parent: Some(parent),
                    position_before,
                    position: applied.position,
                    san: applied.san,
                    children: SmallVec::new(),
                });
                arena[parent].children.push(id);
                frame.current = id;
                frame.anchor = Some(parent);
            }
            Token::Open => {
                let anchor = frames.last().and_then(|frame| frame.anchor);
                let diagnostic = match anchor {
                    None => Diagnostic::OrphanVariation,
                    Some(_) if frames.len() > max_depth => Diagnostic::DepthLimit(max_depth),
                    Some(branch_point) => {
                        frames.push(Frame {
                            current: branch_point,
                            anchor: None,
                        });
                        continue;
                    }
                };
                log::warn(diagnostic.to_string());
                diagnostics.push(diagnostic);
                skipping = 1;
            }
            Token::Close => {
                if frames.len() > 1 {
                    frames.pop();
                } else {
                    log::warn(Diagnostic::StrayClose.to_string());
                    diagnostics.push(Diagnostic::StrayClose);
                }
            }
        }
    }

    if frames.len() > 1 {
        let diagnostic = Diagnostic::UnclosedVariation(frames.len() - 1);
        log::warn(diagnostic.to_string());
        diagnostics.push(diagnostic);
    }

    Ok(GameTree {
        root: into_nodes(arena),
        diagnostics,
    })
}

fn illegal_move<V: MoveValidator>(
    arena: &[Slot<V::Position>],
    parent: usize,
    token: &MoveToken,
    rejection: Rejection,
    validator: &V,
) -> ParseError {
    let position = &arena[parent].position;

    let mut path = Vec::new();
    let mut cursor = Some(parent);
    while let Some(id) = cursor {
        if !arena[id].san.is_empty() {
            path.push(arena[id].san.clone());
        }
        cursor = arena[id].parent;
    }
    path.reverse();
    path.push(token.notation.clone());

    ParseError::IllegalMove(Box::new(IllegalMove {
        notation: token.notation.clone(),
        move_number: validator.fullmove(position),
        side: validator.turn(position),
        fen: validator.describe(position),
        path,
        reason: rejection.reason,
    }))
}

/// Compares a written move number against the board the move is played on.
fn cross_check<V: MoveValidator>(
    token: &MoveToken,
    position: &V::Position,
    validator: &V,
) -> Option<Diagnostic> {
    let hinted = token.hint()?;
    let number = validator.fullmove(position);
    let turn = validator.turn(position);

    let number_ok = token.number == Some(number);
    let side_ok = token.side.is_none_or(|side| side == turn);
    if number_ok && side_ok {
        return None;
    }

    Some(Diagnostic::MoveNumberMismatch {
        notation: token.notation.clone(),
        hinted,
        actual: match turn {
            Color::White => format!("{number}."),
            Color::Black => format!("{number}..."),
        },
    })
}

/// Flags a written `+`/`#` that the resulting board contradicts. A missing
/// suffix is not reported.
fn check_suffix(written: &str, canonical: &str) -> Option<Diagnostic> {
    let written_suffix = check_marker(written);
    if written_suffix.is_empty() || written_suffix == check_marker(canonical) {
        return None;
    }

    Some(Diagnostic::SuffixMismatch {
        notation: written.to_string(),
        canonical: canonical.to_string(),
    })
}

fn check_marker(san: &str) -> &str {
    &san[san.trim_end_matches(['+', '#']).len()..]
}

/// Children always come after their parent in the arena, so building from the
/// back guarantees every child node exists before its parent needs it.
fn into_nodes<P>(arena: Vec<Slot<P>>) -> Node<P> {
    let mut built: Vec<Option<Node<P>>> = Vec::with_capacity(arena.len());
    built.resize_with(arena.len(), || None);

    for (id, slot) in arena.into_iter().enumerate().rev() {
        let children = slot
            .children
            .iter()
            .filter_map(|child| built[*child].take())
            .collect();
        built[id] = Some(Node {
            position_before: slot.position_before,
            position: slot.position,
            san: slot.san,
            children,
        });
    }

    built
        .into_iter()
        .next()
        .flatten()
        .unwrap_or_else(|| unreachable!("arena always holds the root"))
}
