pub mod config;
mod duckdb_impl;
pub mod error;
pub mod fallback;
pub mod flatten;
pub mod json;
mod log;
pub mod parse;
pub mod render;
pub mod sanitize;
mod scalars;
pub mod tokenize;
pub mod tree;
pub mod validator;

use duckdb::{Connection, Result};
use duckdb_ext_macros::duckdb_extension;
use scalars::{
    ChessMainlineScalar, ChessVariationCountScalar, ChessVariationsJsonScalar,
    ChessVariationsLenientJsonScalar,
};
use std::error::Error;

pub use config::{FallbackPolicy, ParseOptions};
pub use error::{Diagnostic, IllegalMove, ParseError};
pub use flatten::{Variation, flatten};
pub use parse::{ParsedGame, parse_movetext, parse_movetext_with};
pub use tree::{GameTree, Node};
pub use validator::{MoveValidator, StrictSan};

#[duckdb_extension(name = "chess_rav", api_version = "v1.0.0")]
pub unsafe fn extension_entrypoint(con: Connection) -> Result<(), Box<dyn Error>> {
    con.register_scalar_function::<ChessVariationsJsonScalar>("chess_variations_json")?;
    con.register_scalar_function::<ChessVariationsLenientJsonScalar>(
        "chess_variations_lenient_json",
    )?;
    con.register_scalar_function::<ChessVariationCountScalar>("chess_variation_count")?;
    con.register_scalar_function::<ChessMainlineScalar>("chess_mainline")?;

    Ok(())
}
