//! Response Parser: decodes raw model text into a `CandidateRecord`.
//!
//! The model is asked for a single dictionary literal, but it may wrap it
//! in a fenced code block or surround it with prose. Lookup order:
//! 1. the whole text as one literal
//! 2. the body of the first fenced code block
//! 3. the first `{` from which a complete dict literal parses

use thiserror::Error;

use crate::models::candidate::{
    CandidateRecord, FIT_KEY, NAME_KEY, OVERFIT_KEY, STRENGTHS_KEY, SUMMARY_KEY, YEARS_KEY,
};
use crate::screening::literal::{self, Literal, LiteralError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("no dictionary literal found in model output")]
    NoDictionary,

    #[error("invalid literal: {0}")]
    Syntax(#[from] LiteralError),

    #[error("expected a dict, found a {0}")]
    NotADictionary(&'static str),

    #[error("missing required key '{0}'")]
    MissingKey(&'static str),

    #[error("value of '{key}' must be {expected}")]
    WrongShape {
        key: &'static str,
        expected: &'static str,
    },
}

/// Parses the model's raw output. Unknown keys are ignored and values are
/// not checked beyond their shape.
pub fn parse_candidate(raw: &str) -> Result<CandidateRecord, ParseError> {
    let value = locate_literal(raw)?;
    record_from_literal(&value)
}

fn locate_literal(raw: &str) -> Result<Literal, ParseError> {
    let whole_error = match literal::parse(raw) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let Some(value) = fenced_block(raw).and_then(|body| literal::parse(body).ok()) {
        return Ok(value);
    }

    for (offset, _) in raw.match_indices('{') {
        if let Ok((value @ Literal::Dict(_), _)) = literal::parse_prefix(&raw[offset..]) {
            return Ok(value);
        }
    }

    if raw.trim_start().starts_with('{') {
        Err(ParseError::Syntax(whole_error))
    } else {
        Err(ParseError::NoDictionary)
    }
}

/// Body of the first ``` fenced block, without its info string.
fn fenced_block(raw: &str) -> Option<&str> {
    let start = raw.find("```")?;
    let after_fence = &raw[start + 3..];
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

fn record_from_literal(value: &Literal) -> Result<CandidateRecord, ParseError> {
    let Literal::Dict(entries) = value else {
        return Err(ParseError::NotADictionary(value.kind()));
    };

    // Later duplicates win, as they would in a Python dict display.
    let lookup = |key: &'static str| -> Result<&Literal, ParseError> {
        entries
            .iter()
            .rev()
            .find_map(|(k, v)| matches!(k, Literal::Str(s) if s == key).then_some(v))
            .ok_or(ParseError::MissingKey(key))
    };
    let scalar = |key: &'static str| -> Result<String, ParseError> {
        lookup(key)?.scalar_text().ok_or(ParseError::WrongShape {
            key,
            expected: "a string or number",
        })
    };

    let strengths_shape = ParseError::WrongShape {
        key: STRENGTHS_KEY,
        expected: "a list of strings",
    };
    let key_strengths = match lookup(STRENGTHS_KEY)? {
        Literal::List(items) | Literal::Tuple(items) => items
            .iter()
            .map(|item| item.scalar_text().ok_or_else(|| strengths_shape.clone()))
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(strengths_shape),
    };

    Ok(CandidateRecord {
        name: scalar(NAME_KEY)?,
        years_of_experience: scalar(YEARS_KEY)?,
        key_strengths,
        summary: scalar(SUMMARY_KEY)?,
        fit: scalar(FIT_KEY)?,
        overfit: scalar(OVERFIT_KEY)?,
    })
}
