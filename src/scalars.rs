use duckdb::{
    Result,
    core::{DataChunkHandle, LogicalTypeHandle, LogicalTypeId},
    vscalar::{ScalarFunctionSignature, VScalar},
    vtab::arrow::WritableVector,
};
use std::error::Error;

use crate::config::{FallbackPolicy, ParseOptions};
use crate::duckdb_impl::scalar::{
    VarcharOutput, invoke_unary_varchar_optional_i64_to_varchar,
    invoke_unary_varchar_to_u64_nullable, invoke_unary_varchar_to_varchar,
};
use crate::json::variations_document;
use crate::log;
use crate::parse::{ParsedGame, parse_movetext};
use crate::render::numbered_movetext;

fn options_for_row(max_depth: Option<i64>, fallback: FallbackPolicy) -> ParseOptions {
    let options = ParseOptions::default().with_fallback(fallback);
    match max_depth {
        Some(depth) => options.with_max_depth(usize::try_from(depth).unwrap_or(0)),
        None => options,
    }
}

fn variation_count(movetext: &str) -> Option<u64> {
    let options = options_for_row(None, FallbackPolicy::Strict);
    match parse_movetext(movetext, &options) {
        Ok(ParsedGame::Validated(tree)) => Some(tree.variation_count() as u64),
        Ok(ParsedGame::Unvalidated(_)) => None,
        Err(e) => {
            log::warn(format!("chess_variation_count: {e}"));
            None
        }
    }
}

fn mainline(movetext: &str) -> Option<String> {
    let options = options_for_row(None, FallbackPolicy::Strict);
    match parse_movetext(movetext, &options) {
        Ok(ParsedGame::Validated(tree)) => Some(numbered_movetext(&tree.main_line_sans(), 0)),
        Ok(ParsedGame::Unvalidated(_)) => None,
        Err(e) => {
            log::warn(format!("chess_mainline: {e}"));
            None
        }
    }
}

fn varchar_signatures(with_depth: bool) -> Vec<ScalarFunctionSignature> {
    let mut signatures = vec![ScalarFunctionSignature::exact(
        vec![LogicalTypeHandle::from(LogicalTypeId::Varchar)],
        LogicalTypeHandle::from(LogicalTypeId::Varchar),
    )];
    if with_depth {
        signatures.push(ScalarFunctionSignature::exact(
            vec![
                LogicalTypeHandle::from(LogicalTypeId::Varchar),
                LogicalTypeHandle::from(LogicalTypeId::Bigint),
            ],
            LogicalTypeHandle::from(LogicalTypeId::Varchar),
        ));
    }
    signatures
}

/// `chess_variations_json(movetext [, max_depth])`
pub struct ChessVariationsJsonScalar;

impl VScalar for ChessVariationsJsonScalar {
    type State = ();

    unsafe fn invoke(
        _state: &Self::State,
        input: &mut DataChunkHandle,
        output: &mut dyn WritableVector,
    ) -> Result<(), Box<dyn Error>> {
        invoke_unary_varchar_optional_i64_to_varchar(input, output, |movetext, max_depth| {
            let options = options_for_row(max_depth, FallbackPolicy::Strict);
            VarcharOutput::Value(variations_document(movetext, &options))
        })
    }

    fn signatures() -> Vec<ScalarFunctionSignature> {
        varchar_signatures(true)
    }
}

/// `chess_variations_lenient_json(movetext [, max_depth])`, best-effort on illegal moves.
pub struct ChessVariationsLenientJsonScalar;

impl VScalar for ChessVariationsLenientJsonScalar {
    type State = ();

    unsafe fn invoke(
        _state: &Self::State,
        input: &mut DataChunkHandle,
        output: &mut dyn WritableVector,
    ) -> Result<(), Box<dyn Error>> {
        invoke_unary_varchar_optional_i64_to_varchar(input, output, |movetext, max_depth| {
            let options = options_for_row(max_depth, FallbackPolicy::BestEffort);
            VarcharOutput::Value(variations_document(movetext, &options))
        })
    }

    fn signatures() -> Vec<ScalarFunctionSignature> {
        varchar_signatures(true)
    }
}

pub struct ChessVariationCountScalar;

impl VScalar for ChessVariationCountScalar {
    type State = ();

    unsafe fn invoke(
        _state: &Self::State,
        input: &mut DataChunkHandle,
        output: &mut dyn WritableVector,
    ) -> Result<(), Box<dyn Error>> {
        invoke_unary_varchar_to_u64_nullable(input, output, variation_count)
    }

    fn signatures() -> Vec<ScalarFunctionSignature> {
        vec![ScalarFunctionSignature::exact(
            vec![LogicalTypeHandle::from(LogicalTypeId::Varchar)],
            LogicalTypeHandle::from(LogicalTypeId::UBigint),
        )]
    }
}

pub struct ChessMainlineScalar;

impl VScalar for ChessMainlineScalar {
    type State = ();

    unsafe fn invoke(
        _state: &Self::State,
        input: &mut DataChunkHandle,
        output: &mut dyn WritableVector,
    ) -> Result<(), Box<dyn Error>> {
        invoke_unary_varchar_to_varchar(input, output, |movetext| match mainline(movetext) {
            Some(line) => VarcharOutput::Value(line),
            None => VarcharOutput::Null,
        })
    }

    fn signatures() -> Vec<ScalarFunctionSignature> {
        varchar_signatures(false)
    }
}
