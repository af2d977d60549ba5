use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{Chess, Color, EnPassantMode, Position};
use std::fmt;

/// Result of playing one move.
#[derive(Debug, Clone)]
pub struct Applied<P> {
    pub position: P,
    /// Notation as the rules engine understood it, with `+`/`#` recomputed.
    pub san: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// The chess rules the tree builder checks every move against.
///
/// Implementations must be strict: notation that could mean more than one
/// move is rejected, never guessed.
pub trait MoveValidator {
    type Position: Clone + fmt::Debug;

    fn initial(&self) -> Self::Position;

    /// Plays `notation` on a copy of `position`.
    fn apply(
        &self,
        position: &Self::Position,
        notation: &str,
    ) -> Result<Applied<Self::Position>, Rejection>;

    /// Board context for error messages, FEN for the standard validator.
    fn describe(&self, position: &Self::Position) -> String;

    fn fullmove(&self, position: &Self::Position) -> u32;

    fn turn(&self, position: &Self::Position) -> Color;
}

/// Standard chess from the initial position, SAN parsed and checked by shakmaty.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictSan;

impl MoveValidator for StrictSan {
    type Position = Chess;

    fn initial(&self) -> Chess {
        Chess::default()
    }

    fn apply(&self, position: &Chess, notation: &str) -> Result<Applied<Chess>, Rejection> {
        let san_plus = notation.parse::<SanPlus>().map_err(|e| Rejection {
            reason: format!("unreadable notation: {e}"),
        })?;

        let m = san_plus.san.to_move(position).map_err(|e| Rejection {
            reason: e.to_string(),
        })?;

        let mut next = position.clone();
        next.play_unchecked(m);

        let suffix = if next.is_checkmate() {
            "#"
        } else if next.is_check() {
            "+"
        } else {
            ""
        };

        Ok(Applied {
            san: format!("{}{}", san_plus.san, suffix),
            position: next,
        })
    }

    fn describe(&self, position: &Chess) -> String {
        Fen::from_position(position, EnPassantMode::Legal).to_string()
    }

    fn fullmove(&self, position: &Chess) -> u32 {
        position.fullmoves().get()
    }

    fn turn(&self, position: &Chess) -> Color {
        position.turn()
    }
}

/// Plays `moves` from the initial position. On failure returns the index of
/// the first rejected move.
pub fn replay<V, S>(validator: &V, moves: &[S]) -> Result<V::Position, (usize, Rejection)>
where
    V: MoveValidator,
    S: AsRef<str>,
{
    let mut position = validator.initial();
    for (i, notation) in moves.iter().enumerate() {
        position = validator
            .apply(&position, notation.as_ref())
            .map_err(|rejection| (i, rejection))?
            .position;
    }
    Ok(position)
}
