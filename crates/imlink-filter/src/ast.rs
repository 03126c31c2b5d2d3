//! Filter specification types
//!
//! This module defines the typed form of a programmatic filter: one column,
//! one comparison operator, one literal. The operator set is closed; a spec
//! that exists at this level is always valid.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (==)
    Eq,
    /// Not equal (!=)
    Ne,
}

impl ComparisonOp {
    /// Evaluate the comparison for two f64 values
    pub fn evaluate(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            ComparisonOp::Lt => lhs < rhs,
            ComparisonOp::Le => lhs <= rhs,
            ComparisonOp::Gt => lhs > rhs,
            ComparisonOp::Ge => lhs >= rhs,
            ComparisonOp::Eq => (lhs - rhs).abs() < 1e-10,
            ComparisonOp::Ne => (lhs - rhs).abs() >= 1e-10,
        }
    }

    /// Evaluate the comparison for an already computed ordering
    /// (used for text columns)
    pub fn evaluate_ordering(&self, ord: Ordering) -> bool {
        match self {
            ComparisonOp::Lt => ord == Ordering::Less,
            ComparisonOp::Le => ord != Ordering::Greater,
            ComparisonOp::Gt => ord == Ordering::Greater,
            ComparisonOp::Ge => ord != Ordering::Less,
            ComparisonOp::Eq => ord == Ordering::Equal,
            ComparisonOp::Ne => ord != Ordering::Equal,
        }
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Eq => "==",
            ComparisonOp::Ne => "!=",
        }
    }

    /// Look up an operator token. Returns `None` for anything outside the
    /// closed operator set.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "<" => Some(ComparisonOp::Lt),
            "<=" => Some(ComparisonOp::Le),
            ">" => Some(ComparisonOp::Gt),
            ">=" => Some(ComparisonOp::Ge),
            "==" => Some(ComparisonOp::Eq),
            "!=" => Some(ComparisonOp::Ne),
            _ => None,
        }
    }
}

/// The literal a column is compared against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A numeric literal
    Number(f64),
    /// A text literal
    Text(String),
}

impl FilterValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FilterValue::Number(n) => Some(*n),
            FilterValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Number(_) => None,
            FilterValue::Text(s) => Some(s),
        }
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Number(n)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

/// A fully validated filter: column, operator, literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Grid column the filter applies to
    pub column: String,
    /// Comparison operator
    pub op: ComparisonOp,
    /// Literal to compare against
    pub value: FilterValue,
}

impl FilterSpec {
    /// Create a new filter spec
    pub fn new(column: impl Into<String>, op: ComparisonOp, value: FilterValue) -> Self {
        Self {
            column: column.into(),
            op,
            value,
        }
    }

    /// Create a column op number filter
    pub fn number(column: &str, op: ComparisonOp, value: f64) -> Self {
        Self::new(column, op, FilterValue::Number(value))
    }

    /// Create a column op text filter
    pub fn text(column: &str, op: ComparisonOp, value: &str) -> Self {
        Self::new(column, op, FilterValue::Text(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_operators() {
        assert!(ComparisonOp::Lt.evaluate(1.0, 2.0));
        assert!(!ComparisonOp::Lt.evaluate(2.0, 1.0));
        assert!(ComparisonOp::Le.evaluate(1.0, 1.0));
        assert!(ComparisonOp::Gt.evaluate(2.0, 1.0));
        assert!(ComparisonOp::Eq.evaluate(1.0, 1.0));
        assert!(ComparisonOp::Ne.evaluate(1.0, 2.0));
    }

    #[test]
    fn test_ordering_operators() {
        assert!(ComparisonOp::Eq.evaluate_ordering("x".cmp("x")));
        assert!(ComparisonOp::Ne.evaluate_ordering("x".cmp("y")));
        assert!(ComparisonOp::Lt.evaluate_ordering("a".cmp("b")));
        assert!(ComparisonOp::Ge.evaluate_ordering("b".cmp("b")));
    }

    #[test]
    fn test_from_token_rejects_unknown() {
        assert_eq!(ComparisonOp::from_token(">="), Some(ComparisonOp::Ge));
        assert_eq!(ComparisonOp::from_token("~"), None);
        assert_eq!(ComparisonOp::from_token("="), None);
        assert_eq!(ComparisonOp::from_token("<>"), None);
    }

    #[test]
    fn test_spec_constructors() {
        let spec = FilterSpec::number("a", ComparisonOp::Gt, 3.0);
        assert_eq!(spec.column, "a");
        assert_eq!(spec.value.as_f64(), Some(3.0));

        let spec = FilterSpec::text("b", ComparisonOp::Eq, "x");
        assert_eq!(spec.value.as_text(), Some("x"));
    }
}
