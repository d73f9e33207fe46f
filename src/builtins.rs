//! SWRL built-ins as row filters over a binding table.
//!
//! Math built-ins recompute `left` from `right` (and the atom's constant
//! operand) and keep the row when the two agree. Comparison and string
//! built-ins apply a predicate to the two bound values. Rows whose values are
//! missing or of the wrong type are dropped; only an unknown built-in name is
//! an error.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;

use regex::Regex;
use tracing::trace;

use crate::ast::Argument;
use crate::error::{Error, Result};
use crate::table::{Binding, BindingTable};
use crate::term::{Iri, Literal, Term};
use crate::vocab::SWRLB;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltIn {
    Abs,
    Add,
    Subtract,
    Multiply,
    Divide,
    Pow,
    Round,
    RoundHalfToEven,
    Floor,
    Ceiling,
    Sin,
    Cos,
    Tan,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contains,
    ContainsIgnoreCase,
    StartsWith,
    EndsWith,
    Matches,
}

impl BuiltIn {
    pub const ALL: [BuiltIn; 24] = [
        Self::Abs,
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Pow,
        Self::Round,
        Self::RoundHalfToEven,
        Self::Floor,
        Self::Ceiling,
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Equal,
        Self::NotEqual,
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
        Self::LessThan,
        Self::LessThanOrEqual,
        Self::Contains,
        Self::ContainsIgnoreCase,
        Self::StartsWith,
        Self::EndsWith,
        Self::Matches,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Pow => "pow",
            Self::Round => "round",
            Self::RoundHalfToEven => "roundHalfToEven",
            Self::Floor => "floor",
            Self::Ceiling => "ceiling",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Equal => "equal",
            Self::NotEqual => "notEqual",
            Self::GreaterThan => "greaterThan",
            Self::GreaterThanOrEqual => "greaterThanOrEqual",
            Self::LessThan => "lessThan",
            Self::LessThanOrEqual => "lessThanOrEqual",
            Self::Contains => "contains",
            Self::ContainsIgnoreCase => "containsIgnoreCase",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::Matches => "matches",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// Built-ins are named in the `swrlb:` namespace; a bare name is
    /// accepted as well.
    pub fn from_iri(iri: &Iri) -> Option<Self> {
        match iri.in_namespace(SWRLB) {
            Some(name) => Self::from_name(name),
            None => Self::from_name(iri.as_str()),
        }
    }

    pub fn iri(self) -> Iri {
        Iri::new(format!("{}{}", SWRLB, self.name()))
    }

    pub fn is_math(self) -> bool {
        matches!(
            self,
            Self::Abs
                | Self::Add
                | Self::Subtract
                | Self::Multiply
                | Self::Divide
                | Self::Pow
                | Self::Round
                | Self::RoundHalfToEven
                | Self::Floor
                | Self::Ceiling
                | Self::Sin
                | Self::Cos
                | Self::Tan
        )
    }

    pub fn requires_operand(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Pow
        )
    }

    /// The value `left` must have for the row to survive. `None` when the
    /// relation is undefined for these inputs.
    fn expected(self, right: f64, operand: Option<f64>) -> Option<f64> {
        Some(match self {
            Self::Abs => right.abs(),
            Self::Add => right + operand?,
            Self::Subtract => right - operand?,
            Self::Multiply => right * operand?,
            Self::Divide => {
                let operand = operand?;
                if operand == 0.0 {
                    return None;
                }
                right / operand
            }
            Self::Pow => right.powf(operand?),
            // XPath fn:round: halves go towards positive infinity.
            Self::Round => (right + 0.5).floor(),
            Self::RoundHalfToEven => round_half_to_even(right),
            Self::Floor => right.floor(),
            Self::Ceiling => right.ceil(),
            Self::Sin => right.sin(),
            Self::Cos => right.cos(),
            Self::Tan => right.tan(),
            _ => return None,
        })
    }

    fn holds(
        self,
        left: &Term,
        right: &Term,
        operand: Option<f64>,
        patterns: &mut Patterns,
    ) -> bool {
        if self.is_math() {
            let (Some(left), Some(right)) = (numeric(left), numeric(right)) else {
                return false;
            };
            return self
                .expected(right, operand)
                .map_or(false, |expected| approx_eq(left, expected));
        }
        match self {
            Self::Equal => equal(left, right),
            Self::NotEqual => !equal(left, right) && comparable(left, right),
            Self::GreaterThan => compare(left, right) == Some(Ordering::Greater),
            Self::GreaterThanOrEqual => matches!(
                compare(left, right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::LessThan => compare(left, right) == Some(Ordering::Less),
            Self::LessThanOrEqual => {
                matches!(compare(left, right), Some(Ordering::Less | Ordering::Equal))
            }
            Self::Contains => left.lexical_form().contains(&right.lexical_form()),
            Self::ContainsIgnoreCase => left
                .lexical_form()
                .to_lowercase()
                .contains(&right.lexical_form().to_lowercase()),
            Self::StartsWith => left.lexical_form().starts_with(&right.lexical_form()),
            Self::EndsWith => left.lexical_form().ends_with(&right.lexical_form()),
            Self::Matches => patterns
                .get(&right.lexical_form())
                .map_or(false, |regex| regex.is_match(&left.lexical_form())),
            _ => unreachable!("math built-ins are handled above"),
        }
    }
}

/// Compiled `matches` patterns, one per distinct pattern text in a pass.
#[derive(Default)]
struct Patterns(HashMap<String, Option<Regex>>);

impl Patterns {
    fn get(&mut self, pattern: &str) -> Option<&Regex> {
        self.0
            .entry(pattern.to_owned())
            .or_insert_with(|| match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    trace!("dropping rows with invalid pattern {:?}: {}", pattern, err);
                    None
                }
            })
            .as_ref()
    }
}

fn round_half_to_even(value: f64) -> f64 {
    if (value - value.trunc()).abs() == 0.5 {
        2.0 * (value / 2.0).round()
    } else {
        value.round()
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= 1e-9 * scale
}

fn numeric(term: &Term) -> Option<f64> {
    term.as_literal().and_then(Literal::as_f64)
}

/// Ordering of two numeric literals, exact for integers.
fn numeric_ordering(left: &Term, right: &Term) -> Option<Ordering> {
    let (Some(left), Some(right)) = (left.as_literal(), right.as_literal()) else {
        return None;
    };
    if !left.is_numeric() || !right.is_numeric() {
        return None;
    }
    if let (Some(left), Some(right)) = (left.as_integer(), right.as_integer()) {
        return Some(left.cmp(&right));
    }
    left.as_f64()?.partial_cmp(&right.as_f64()?)
}

fn both_numeric(left: &Term, right: &Term) -> bool {
    let is_numeric = |term: &Term| term.as_literal().map_or(false, Literal::is_numeric);
    is_numeric(left) && is_numeric(right)
}

fn equal(left: &Term, right: &Term) -> bool {
    if both_numeric(left, right) {
        numeric_ordering(left, right) == Some(Ordering::Equal)
    } else {
        left == right
    }
}

/// Numeric literals that fail to parse compare with nothing.
fn comparable(left: &Term, right: &Term) -> bool {
    !both_numeric(left, right) || numeric_ordering(left, right).is_some()
}

fn compare(left: &Term, right: &Term) -> Option<Ordering> {
    if both_numeric(left, right) {
        numeric_ordering(left, right)
    } else {
        Some(left.lexical_form().cmp(&right.lexical_form()))
    }
}

/// The value of `argument` in this row: the bound column for a variable, the
/// constant itself otherwise.
fn resolve<'a>(argument: &'a Argument, binding: &Binding<'a>) -> Option<Cow<'a, Term>> {
    match argument {
        Argument::Variable(name) => binding.get(name).map(Cow::Borrowed),
        constant => constant.as_term().map(Cow::Owned),
    }
}

/// Applies a built-in atom to `table`. Fails only when `builtin` names no
/// known built-in.
pub fn filter_table(
    builtin: &Iri,
    left: &Argument,
    right: &Argument,
    operand: Option<&Literal>,
    table: &BindingTable,
) -> Result<BindingTable> {
    let function = BuiltIn::from_iri(builtin)
        .ok_or_else(|| Error::UnsupportedBuiltIn(builtin.as_str().to_owned()))?;
    let operand = operand.and_then(Literal::as_f64);
    let mut patterns = Patterns::default();

    let filtered = table.filter(|binding| {
        let (Some(left_value), Some(right_value)) = (resolve(left, binding), resolve(right, binding))
        else {
            trace!("{}: unbound argument, dropping row", function.name());
            return false;
        };
        let keep = function.holds(&left_value, &right_value, operand, &mut patterns);
        if !keep {
            trace!("{}: row {:?} rejected", function.name(), binding.row());
        }
        keep
    });
    Ok(filtered)
}
