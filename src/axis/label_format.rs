//! Label content formatting.
//!
//! Format strings are templates with `{}` placeholders. A placeholder may
//! carry a spec after a colon:
//!
//! * `{:.2}` fixed decimals, `{:.1%}` percent with decimals,
//! * `{:g7}` significant digits (trailing zeros trimmed),
//! * `{:%Y-%m-%d}` any chrono strftime pattern for date-time values.
//!
//! `{{` and `}}` escape braces. Specs that do not apply to a value (a
//! decimal spec on a text category) fall back to the raw value.

use std::fmt;
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::core::CategoryKey;
use crate::error::{AxisError, AxisResult};

/// Value a label is generated for, before formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LabelValue {
    Number(Decimal),
    DateTime(DateTime<Utc>),
    Category(CategoryKey),
    Empty,
}

impl fmt::Display for LabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value.normalize()),
            Self::DateTime(time) => write!(f, "{}", time.format("%Y-%m-%d %H:%M:%S")),
            Self::Category(key) => write!(f, "{key}"),
            Self::Empty => Ok(()),
        }
    }
}

/// Custom label formatter; errors propagate out of the measure pass.
pub type ContentFormatterFn = Arc<dyn Fn(&LabelValue) -> AxisResult<String> + Send + Sync + 'static>;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Value(ValueSpec),
}

#[derive(Debug, Clone, PartialEq)]
enum ValueSpec {
    Raw,
    Fixed(u32),
    Percent(u32),
    Significant(u32),
    Strftime(String),
}

/// Parsed format string.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelFormat {
    segments: Vec<Segment>,
}

impl LabelFormat {
    pub fn parse(template: &str) -> AxisResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        body.push(inner);
                    }
                    if !closed {
                        return Err(AxisError::Format(format!(
                            "unterminated placeholder in `{template}`"
                        )));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Value(parse_spec(&body, template)?));
                }
                '}' => {
                    return Err(AxisError::Format(format!(
                        "unmatched `}}` in `{template}`"
                    )));
                }
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Seven significant digits, the numerical axis default.
    #[must_use]
    pub fn general() -> Self {
        Self {
            segments: vec![Segment::Value(ValueSpec::Significant(7))],
        }
    }

    #[must_use]
    pub fn percent(decimals: u32) -> Self {
        Self {
            segments: vec![Segment::Value(ValueSpec::Percent(decimals))],
        }
    }

    #[must_use]
    pub fn date_time(pattern: &str) -> Self {
        Self {
            segments: vec![Segment::Value(ValueSpec::Strftime(pattern.to_owned()))],
        }
    }

    #[must_use]
    pub fn apply(&self, value: &LabelValue) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Value(spec) => out.push_str(&format_value(spec, value)),
            }
        }
        out
    }
}

fn parse_spec(body: &str, template: &str) -> AxisResult<ValueSpec> {
    let spec = match body.split_once(':') {
        None if body.trim().is_empty() || body.trim() == "0" => return Ok(ValueSpec::Raw),
        None => {
            return Err(AxisError::Format(format!(
                "unsupported placeholder `{{{body}}}` in `{template}`"
            )));
        }
        Some((_, spec)) => spec,
    };

    if spec.is_empty() {
        return Ok(ValueSpec::Raw);
    }

    if spec.starts_with('%') {
        if StrftimeItems::new(spec).any(|item| matches!(item, Item::Error)) {
            return Err(AxisError::Format(format!(
                "invalid date-time pattern `{spec}` in `{template}`"
            )));
        }
        return Ok(ValueSpec::Strftime(spec.to_owned()));
    }

    let invalid = || AxisError::Format(format!("invalid format spec `{spec}` in `{template}`"));

    if let Some(digits) = spec.strip_prefix('.') {
        if let Some(digits) = digits.strip_suffix('%') {
            return digits.parse().map(ValueSpec::Percent).map_err(|_| invalid());
        }
        return digits.parse().map(ValueSpec::Fixed).map_err(|_| invalid());
    }

    if let Some(digits) = spec.strip_prefix(['g', 'G']) {
        let digits: u32 = digits.parse().map_err(|_| invalid())?;
        if digits == 0 {
            return Err(invalid());
        }
        return Ok(ValueSpec::Significant(digits));
    }

    Err(invalid())
}

fn format_value(spec: &ValueSpec, value: &LabelValue) -> String {
    match (spec, value) {
        (ValueSpec::Fixed(decimals), LabelValue::Number(number)) => format_fixed(*number, *decimals),
        (ValueSpec::Percent(decimals), LabelValue::Number(number)) => {
            format!("{}%", format_fixed(*number * Decimal::ONE_HUNDRED, *decimals))
        }
        (ValueSpec::Significant(digits), LabelValue::Number(number)) => {
            format_significant(*number, *digits)
        }
        (ValueSpec::Strftime(pattern), LabelValue::DateTime(time)) => {
            time.format(pattern).to_string()
        }
        _ => value.to_string(),
    }
}

fn format_fixed(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.prec$}", prec = decimals as usize)
}

fn format_significant(value: Decimal, digits: u32) -> String {
    let rounded = value.round_sf(digits).unwrap_or(value);
    rounded.normalize().to_string()
}
