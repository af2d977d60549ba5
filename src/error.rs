use shakmaty::Color;
use std::error::Error;
use std::fmt;

/// A move the rules engine refused, with enough board context to explain why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllegalMove {
    /// Notation exactly as tokenized from the movetext.
    pub notation: String,
    /// Fullmove number of the board the move was tried on.
    pub move_number: u32,
    pub side: Color,
    /// FEN of the board the move was tried on.
    pub fen: String,
    /// Canonical moves leading from the initial position to `fen`, followed
    /// by the rejected notation as written.
    pub path: Vec<String>,
    pub reason: String,
}

impl IllegalMove {
    /// `12. Nf3` / `12... Nf6` style label for messages.
    pub fn label(&self) -> String {
        match self.side {
            Color::White => format!("{}. {}", self.move_number, self.notation),
            Color::Black => format!("{}... {}", self.move_number, self.notation),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    IllegalMove(Box<IllegalMove>),
    /// No move was recognized outside of variations.
    EmptyGame,
}

impl ParseError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IllegalMove(_) => "illegal_move",
            Self::EmptyGame => "empty_game",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllegalMove(illegal) => write!(
                f,
                "illegal move {} ({}) in position {}",
                illegal.label(),
                illegal.reason,
                illegal.fen
            ),
            Self::EmptyGame => write!(f, "no playable content"),
        }
    }
}

impl Error for ParseError {}

/// Non-fatal observations made while building a tree. Format faults end up
/// here instead of aborting the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    StrayClose,
    /// `(` with no earlier move at its level to branch from; the group is dropped.
    OrphanVariation,
    /// Input ended with this many variations still open.
    UnclosedVariation(usize),
    /// A group nested deeper than the configured limit was dropped.
    DepthLimit(usize),
    MoveNumberMismatch {
        notation: String,
        hinted: String,
        actual: String,
    },
    /// Written `+`/`#` does not match the board; the move is kept with the
    /// suffix the board calls for.
    SuffixMismatch { notation: String, canonical: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrayClose => write!(f, "ignored unmatched ')'"),
            Self::OrphanVariation => {
                write!(f, "ignored variation with no preceding move to branch from")
            }
            Self::UnclosedVariation(open) => {
                write!(f, "closed {open} unterminated variation(s) at end of input")
            }
            Self::DepthLimit(max) => {
                write!(f, "skipped variation nested deeper than {max} levels")
            }
            Self::MoveNumberMismatch {
                notation,
                hinted,
                actual,
            } => write!(
                f,
                "move number hint '{hinted}' for {notation} disagrees with board ({actual})"
            ),
            Self::SuffixMismatch {
                notation,
                canonical,
            } => write!(f, "{notation} written with wrong check marker, kept as {canonical}"),
        }
    }
}
