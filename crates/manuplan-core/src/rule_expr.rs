// manuplan-core/src/rule_expr.rs
// ============================================================================
// Module: Rule-Expression Evaluator
// Description: Deterministic boolean evaluator for `Rule.trigger` expressions.
// Purpose: Decide, without I/O or clock access, whether a rule's trigger
//          matches a flat evaluation context.
// Dependencies: serde_json, bigdecimal, time
// ============================================================================

//! ## Overview
//! A [`RuleExpr`] is recursive: a leaf compares one dotted field path
//! against a literal using one of the [`Op`] variants, and a composite node
//! (`all`/`any`/`none`) combines child expressions with boolean algebra.
//! [`eval`] is pure: the same `(expr, context)` pair always yields the same
//! boolean, on any host, forever.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Context
// ============================================================================

/// A single scalar, array, or nested-object value in an evaluation context.
pub type ContextValue = Value;

/// The evaluation context a [`RuleExpr`] is matched against.
///
/// Internally this is a JSON object; fields are addressed by dotted path
/// (`"materials.primary"`) which walks nested objects. Arrays are not
/// indexed by the path syntax — `contains`/`not_contains` inspect array
/// fields directly instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(BTreeMap<String, Value>);

impl Context {
    /// Builds a context from a flat or nested JSON object.
    #[must_use]
    pub fn new(fields: BTreeMap<String, Value>) -> Self {
        Self(fields)
    }

    /// Builds an empty context.
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts or replaces a field, returning `self` for chaining in tests.
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(path.into(), value.into());
        self
    }

    /// Resolves a dotted field path, walking into nested objects.
    ///
    /// Returns `None` when any segment of the path is absent, which is the
    /// single definition of "missing" used by `exists`/`not_exists`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let head = segments.next()?;
        let mut current = self.0.get(head)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

// ============================================================================
// SECTION: Rule Expression
// ============================================================================

/// A comparison operator usable in a [`RuleExpr`] leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// Field equals the literal value.
    Equals,
    /// Field does not equal the literal value.
    NotEquals,
    /// Field (array or string) contains the literal value.
    Contains,
    /// Field (array or string) does not contain the literal value.
    NotContains,
    /// Field is strictly greater than the literal value.
    Gt,
    /// Field is greater than or equal to the literal value.
    Gte,
    /// Field is strictly less than the literal value.
    Lt,
    /// Field is less than or equal to the literal value.
    Lte,
    /// Field is a member of the literal list value.
    In,
    /// Field is not a member of the literal list value.
    NotIn,
    /// Field path resolves to a defined value.
    Exists,
    /// Field path does not resolve to a defined value.
    NotExists,
}

/// A recursive boolean expression evaluated against a [`Context`].
///
/// Leaf nodes compare a single field; composite nodes combine children.
/// Both shapes round-trip as plain JSON with no wrapping discriminant, so a
/// `Rule` authored as data looks exactly like the table in the
/// specification: `{"field": ..., "op": ..., "value": ...}` or
/// `{"all": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleExpr {
    /// Compares one field against a literal.
    Leaf {
        /// Dotted path into the context.
        field: String,
        /// Comparison operator.
        op: Op,
        /// Literal operand. Absent for `exists`/`not_exists`.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        value: Option<Value>,
    },
    /// Conjunction of children. An empty list matches (vacuous truth).
    All {
        /// Child expressions, all of which must match.
        all: Vec<RuleExpr>,
    },
    /// Disjunction of children. An empty list never matches.
    Any {
        /// Child expressions, any of which may match.
        any: Vec<RuleExpr>,
    },
    /// Negated disjunction of children.
    None {
        /// Child expressions, none of which may match.
        none: Vec<RuleExpr>,
    },
}

/// Evaluates `expr` against `context`.
///
/// Deterministic: no I/O, no clock, no randomness. Incompatible-type
/// comparisons (for example, comparing a string to a number with `gt`)
/// evaluate to `false` rather than producing an error.
#[must_use]
pub fn eval(expr: &RuleExpr, context: &Context) -> bool {
    match expr {
        RuleExpr::Leaf { field, op, value } => eval_leaf(context, field, *op, value.as_ref()),
        RuleExpr::All { all } => all.iter().all(|child| eval(child, context)),
        RuleExpr::Any { any } => any.iter().any(|child| eval(child, context)),
        RuleExpr::None { none } => !none.iter().any(|child| eval(child, context)),
    }
}

fn eval_leaf(context: &Context, field: &str, op: Op, literal: Option<&Value>) -> bool {
    let resolved = context.resolve(field);
    if op == Op::Exists {
        return resolved.is_some();
    }
    if op == Op::NotExists {
        return resolved.is_none();
    }
    let (Some(resolved), Some(literal)) = (resolved, literal) else {
        return false;
    };
    match op {
        Op::Equals => values_equal(resolved, literal),
        Op::NotEquals => !values_equal(resolved, literal),
        Op::Contains => contains(resolved, literal),
        Op::NotContains => !contains(resolved, literal),
        Op::Gt => matches!(compare(resolved, literal), Some(Ordering::Greater)),
        Op::Gte => matches!(
            compare(resolved, literal),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Op::Lt => matches!(compare(resolved, literal), Some(Ordering::Less)),
        Op::Lte => matches!(
            compare(resolved, literal),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Op::In => literal
            .as_array()
            .is_some_and(|list| list.iter().any(|item| values_equal(item, resolved))),
        Op::NotIn => !literal
            .as_array()
            .is_some_and(|list| list.iter().any(|item| values_equal(item, resolved))),
        Op::Exists | Op::NotExists => false,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    if let (Some(lhs), Some(rhs)) = (a.as_f64(), b.as_f64()) {
        // Prefer decimal-aware equality so `1` and `1.0` compare equal.
        return numeric_decimal(a)
            .zip(numeric_decimal(b))
            .is_some_and(|(l, r)| l == r)
            || (lhs - rhs).abs() < f64::EPSILON;
    }
    a == b
}

fn contains(field: &Value, literal: &Value) -> bool {
    match field {
        Value::Array(items) => items.iter().any(|item| values_equal(item, literal)),
        Value::String(haystack) => literal
            .as_str()
            .is_some_and(|needle| haystack.contains(needle)),
        _ => false,
    }
}

fn numeric_decimal(value: &Value) -> Option<BigDecimal> {
    value
        .as_number()
        .and_then(|number| BigDecimal::from_str(&number.to_string()).ok())
}

fn temporal(value: &Value) -> Option<OffsetDateTime> {
    let text = value.as_str()?;
    OffsetDateTime::parse(text, &Rfc3339)
        .ok()
        .or_else(|| parse_date_only(text))
}

fn parse_date_only(text: &str) -> Option<OffsetDateTime> {
    let format = time::format_description::parse("[year]-[month]-[day]").ok()?;
    let date = time::Date::parse(text, &format).ok()?;
    Some(date.midnight().assume_utc())
}

/// Orders two JSON values, preferring decimal-aware numeric comparison and
/// falling back to RFC 3339 temporal comparison. Returns `None` when the
/// values are not comparably typed.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(lhs), Some(rhs)) = (numeric_decimal(a), numeric_decimal(b)) {
        return lhs.partial_cmp(&rhs);
    }
    if let (Some(lhs), Some(rhs)) = (temporal(a), temporal(b)) {
        return lhs.partial_cmp(&rhs);
    }
    if let (Value::String(lhs), Value::String(rhs)) = (a, b) {
        return Some(lhs.cmp(rhs));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Context {
        Context::empty()
            .with("industry_profile", json!("space"))
            .with("hardware_class", json!("flight"))
            .with("processes", json!(["SMT", "REFLOW", "CONFORMAL_COAT"]))
            .with("bom_risk_flags", json!([]))
    }

    #[test]
    fn empty_all_matches() {
        let expr = RuleExpr::All { all: vec![] };
        assert!(eval(&expr, &ctx()));
    }

    #[test]
    fn empty_any_does_not_match() {
        let expr = RuleExpr::Any { any: vec![] };
        assert!(!eval(&expr, &ctx()));
    }

    #[test]
    fn missing_field_under_exists_is_false() {
        let expr = RuleExpr::Leaf {
            field: "nonexistent".into(),
            op: Op::Exists,
            value: None,
        };
        assert!(!eval(&expr, &ctx()));
    }

    #[test]
    fn missing_field_under_not_exists_is_true() {
        let expr = RuleExpr::Leaf {
            field: "nonexistent".into(),
            op: Op::NotExists,
            value: None,
        };
        assert!(eval(&expr, &ctx()));
    }

    #[test]
    fn empty_array_field_exists() {
        let expr = RuleExpr::Leaf {
            field: "bom_risk_flags".into(),
            op: Op::Exists,
            value: None,
        };
        assert!(eval(&expr, &ctx()));
    }

    #[test]
    fn contains_on_array_field() {
        let expr = RuleExpr::Leaf {
            field: "processes".into(),
            op: Op::Contains,
            value: Some(json!("REFLOW")),
        };
        assert!(eval(&expr, &ctx()));
    }

    #[test]
    fn incompatible_type_comparison_is_false_not_error() {
        let expr = RuleExpr::Leaf {
            field: "industry_profile".into(),
            op: Op::Gt,
            value: Some(json!(5)),
        };
        assert!(!eval(&expr, &ctx()));
    }

    #[test]
    fn decimal_comparison_avoids_float_drift() {
        let c = Context::empty().with("cost", json!(0.1_f64 + 0.2_f64));
        let expr = RuleExpr::Leaf {
            field: "cost".into(),
            op: Op::Equals,
            value: Some(json!(0.3)),
        };
        assert!(eval(&expr, &c));
    }

    #[test]
    fn composite_all_and_any_nest() {
        let expr = RuleExpr::All {
            all: vec![
                RuleExpr::Leaf {
                    field: "industry_profile".into(),
                    op: Op::Equals,
                    value: Some(json!("space")),
                },
                RuleExpr::Any {
                    any: vec![
                        RuleExpr::Leaf {
                            field: "hardware_class".into(),
                            op: Op::Equals,
                            value: Some(json!("ground")),
                        },
                        RuleExpr::Leaf {
                            field: "hardware_class".into(),
                            op: Op::Equals,
                            value: Some(json!("flight")),
                        },
                    ],
                },
            ],
        };
        assert!(eval(&expr, &ctx()));
    }
}
