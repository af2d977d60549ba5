use serde_json::{Value, json};

use crate::config::ParseOptions;
use crate::error::{Diagnostic, ParseError};
use crate::flatten::{Variation, flatten};
use crate::parse::{ParsedGame, parse_movetext};
use crate::render::numbered_movetext;

/// Parses `movetext` and describes the outcome as one JSON document.
///
/// `status` is `validated`, `unvalidated` (best-effort policy only) or `error`.
pub fn variations_document(movetext: &str, options: &ParseOptions) -> String {
    let document = match parse_movetext(movetext, options) {
        Ok(ParsedGame::Validated(tree)) => {
            let variations = flatten(&tree, options.name_length);
            json!({
                "status": "validated",
                "variations": variations.iter().map(variation_value).collect::<Vec<_>>(),
                "diagnostics": diagnostics_value(&tree.diagnostics),
            })
        }
        Ok(ParsedGame::Unvalidated(line)) => json!({
            "status": "unvalidated",
            "moves": line.moves.as_slice(),
            "reason": error_value(&line.reason),
        }),
        Err(err) => json!({
            "status": "error",
            "error": error_value(&err),
        }),
    };

    document.to_string()
}

fn variation_value(variation: &Variation) -> Value {
    json!({
        "id": variation.id,
        "name": variation.name,
        "moves": variation.moves,
        "movetext": numbered_movetext(&variation.moves, 0),
        "departs_at": variation.departs_at,
        "main_line": variation.is_main_line,
    })
}

fn diagnostics_value(diagnostics: &[Diagnostic]) -> Value {
    Value::from(
        diagnostics
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>(),
    )
}

fn error_value(err: &ParseError) -> Value {
    match err {
        ParseError::IllegalMove(illegal) => json!({
            "kind": err.kind(),
            "message": err.to_string(),
            "move": illegal.notation,
            "move_number": illegal.move_number,
            "side": if illegal.side.is_white() { "white" } else { "black" },
            "fen": illegal.fen,
            "path": illegal.path,
        }),
        ParseError::EmptyGame => json!({
            "kind": err.kind(),
            "message": err.to_string(),
        }),
    }
}
