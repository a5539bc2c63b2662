// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! `key: value ...` field reader and writer using pest

use crate::error::{Result, ShapeError};
use nalgebra::{Point3, Vector3};
use pest::error::LineColLocation;
use pest::Parser;
use pest_derive::Parser;
use std::fmt;
use tracing::trace;

#[derive(Parser)]
#[grammar = "io/field.pest"]
struct FieldParser;

/// Significant digits printed for every real.
const SIGNIFICANT_DIGITS: usize = 10;

/// A single value token
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Word(String),
}

/// One `key: values` line of a document
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub values: Vec<FieldValue>,
    /// 1-based source line
    pub line: usize,
}

impl Field {
    pub fn new(key: impl Into<String>, values: Vec<FieldValue>, line: usize) -> Self {
        Self {
            key: key.into(),
            values,
            line,
        }
    }

    /// Whether the field holds exactly the single word `word`.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self.values.as_slice(), [FieldValue::Word(w)] if w == word)
    }

    fn numbers<const N: usize>(&self) -> Result<[f64; N]> {
        if self.values.len() != N {
            return Err(ShapeError::malformed(
                self.line,
                format!(
                    "'{}' expects {} number(s), found {} value(s)",
                    self.key,
                    N,
                    self.values.len()
                ),
            ));
        }
        let mut out = [0.0; N];
        for (slot, value) in out.iter_mut().zip(&self.values) {
            *slot = match value {
                FieldValue::Number(x) => *x,
                FieldValue::Word(w) => {
                    return Err(ShapeError::malformed(
                        self.line,
                        format!("'{}' expects a number, found '{}'", self.key, w),
                    ))
                }
            };
        }
        Ok(out)
    }

    pub fn real(&self) -> Result<f64> {
        let [x] = self.numbers::<1>()?;
        Ok(x)
    }

    /// A non-negative whole number.
    pub fn integer(&self) -> Result<u32> {
        let x = self.real()?;
        if x.fract() != 0.0 || x < 0.0 || x > u32::MAX as f64 {
            return Err(ShapeError::malformed(
                self.line,
                format!("'{}' expects a non-negative integer, found {}", self.key, x),
            ));
        }
        Ok(x as u32)
    }

    pub fn vector3(&self) -> Result<Vector3<f64>> {
        let [x, y, z] = self.numbers::<3>()?;
        Ok(Vector3::new(x, y, z))
    }

    pub fn point3(&self) -> Result<Point3<f64>> {
        Ok(Point3::from(self.vector3()?))
    }
}

/// Tokenize a whole document into fields, in source order.
pub fn parse_fields(source: &str) -> Result<Vec<Field>> {
    let mut pairs = FieldParser::parse(Rule::document, source).map_err(|e| {
        let line = match e.line_col {
            LineColLocation::Pos((line, _)) | LineColLocation::Span((line, _), _) => line,
        };
        ShapeError::malformed(line, e.variant.message().into_owned())
    })?;

    let mut fields = Vec::new();
    let Some(document) = pairs.next() else {
        return Ok(fields);
    };
    for pair in document.into_inner() {
        if pair.as_rule() != Rule::field {
            continue;
        }
        let line = pair.as_span().start_pos().line_col().0;
        let mut inner = pair.into_inner();
        let key = match inner.next() {
            Some(key) => key.as_str().to_string(),
            None => continue,
        };

        let mut values = Vec::new();
        for token in inner {
            match token.as_rule() {
                Rule::number => {
                    let x: f64 = token.as_str().parse().map_err(|_| {
                        ShapeError::malformed(line, format!("invalid number '{}'", token.as_str()))
                    })?;
                    values.push(FieldValue::Number(x));
                }
                Rule::word => values.push(FieldValue::Word(token.as_str().to_string())),
                _ => {}
            }
        }
        fields.push(Field::new(key, values, line));
    }
    trace!(count = fields.len(), "parsed fields");
    Ok(fields)
}

/// Format a real like C's `%.10g`.
pub fn format_real(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    if !x.is_finite() {
        return x.to_string();
    }

    let precision = SIGNIFICANT_DIGITS - 1;
    // exponent after rounding to the printed precision
    let sci = format!("{:.*e}", precision, x);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= SIGNIFICANT_DIGITS as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (precision as i32 - exp) as usize;
        trim_zeros(&format!("{:.*}", decimals, x)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

pub fn write_real_field(out: &mut dyn fmt::Write, key: &str, x: f64) -> fmt::Result {
    writeln!(out, "{}: {}", key, format_real(x))
}

pub fn write_int_field(out: &mut dyn fmt::Write, key: &str, n: u32) -> fmt::Result {
    writeln!(out, "{}: {}", key, n)
}

pub fn write_word_field(out: &mut dyn fmt::Write, key: &str, word: &str) -> fmt::Result {
    writeln!(out, "{}: {}", key, word)
}

pub fn write_vector_field(out: &mut dyn fmt::Write, key: &str, v: &Vector3<f64>) -> fmt::Result {
    writeln!(
        out,
        "{}: {} {} {}",
        key,
        format_real(v.x),
        format_real(v.y),
        format_real(v.z)
    )
}
