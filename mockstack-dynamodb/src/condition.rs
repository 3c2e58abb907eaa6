//! Condition predicates
//!
//! A [`Condition`] tests one attribute of an item against argument values.
//! Conditions bundle into a [`ConditionSet`] (AND semantics, as query and
//! scan consume them) or compose into a [`Predicate`] tree with `and`, `or`
//! and `negate` (the form the expression parser produces).

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DynamoError;
use crate::item::Item;
use crate::value::Value;

/// Comparison operators over one attribute value.
///
/// The negated forms (NE, NOT_CONTAINS, NOT_NULL's complement) are expressed
/// through [`Condition::negate`], not separate operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
    BeginsWith,
    Between,
    In,
    Exists,
}

impl Operator {
    /// Apply this operator to a present attribute value.
    fn apply(&self, value: &Value, arguments: &[Value]) -> Result<bool, DynamoError> {
        match self {
            Self::Eq => Ok(arguments.first() == Some(value)),
            Self::Lt => Self::compare(value, arguments, Ordering::is_lt),
            Self::Le => Self::compare(value, arguments, Ordering::is_le),
            Self::Gt => Self::compare(value, arguments, Ordering::is_gt),
            Self::Ge => Self::compare(value, arguments, Ordering::is_ge),
            Self::Contains => match arguments.first() {
                Some(needle) => value.contains(needle),
                None => Ok(false),
            },
            Self::BeginsWith => Ok(arguments
                .first()
                .is_some_and(|prefix| value.begins_with(prefix))),
            Self::Between => match (arguments.first(), arguments.last()) {
                (Some(low), Some(high)) => Ok(value.try_cmp(low)?.is_ge()
                    && value.try_cmp(high)?.is_le()),
                _ => Ok(false),
            },
            Self::In => Ok(arguments.contains(value)),
            Self::Exists => Ok(true),
        }
    }

    fn compare(
        value: &Value,
        arguments: &[Value],
        test: fn(Ordering) -> bool,
    ) -> Result<bool, DynamoError> {
        match arguments.first() {
            Some(argument) => Ok(test(value.try_cmp(argument)?)),
            None => Ok(false),
        }
    }
}

/// A test against one item attribute: an operator, its argument values, and
/// a negation flag. An absent attribute never satisfies the underlying
/// operator, so the negated forms always hold for absent attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub operator: Operator,
    pub arguments: Vec<Value>,
    pub negated: bool,
}

impl Condition {
    fn new(operator: Operator, arguments: Vec<Value>) -> Self {
        Self {
            operator,
            arguments,
            negated: false,
        }
    }

    pub fn eq(argument: Value) -> Self {
        Self::new(Operator::Eq, vec![argument])
    }

    pub fn ne(argument: Value) -> Self {
        Self::eq(argument).negate()
    }

    pub fn lt(argument: Value) -> Self {
        Self::new(Operator::Lt, vec![argument])
    }

    pub fn le(argument: Value) -> Self {
        Self::new(Operator::Le, vec![argument])
    }

    pub fn gt(argument: Value) -> Self {
        Self::new(Operator::Gt, vec![argument])
    }

    pub fn ge(argument: Value) -> Self {
        Self::new(Operator::Ge, vec![argument])
    }

    pub fn contains(argument: Value) -> Self {
        Self::new(Operator::Contains, vec![argument])
    }

    pub fn not_contains(argument: Value) -> Self {
        Self::contains(argument).negate()
    }

    pub fn begins_with(argument: Value) -> Self {
        Self::new(Operator::BeginsWith, vec![argument])
    }

    pub fn between(low: Value, high: Value) -> Self {
        Self::new(Operator::Between, vec![low, high])
    }

    pub fn is_in(arguments: impl IntoIterator<Item = Value>) -> Self {
        Self::new(Operator::In, arguments.into_iter().collect())
    }

    pub fn exists() -> Self {
        Self::new(Operator::Exists, Vec::new())
    }

    pub fn not_exists() -> Self {
        Self::exists().negate()
    }

    /// Logical negation of this condition.
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// True when this is a plain (non-negated) equality test, the form a
    /// query requires on the hash attribute.
    pub fn is_equality(&self) -> bool {
        self.operator == Operator::Eq && !self.negated
    }

    /// Evaluate against the named attribute of `item`.
    pub fn evaluate(&self, attribute: &str, item: &Item) -> Result<bool, DynamoError> {
        let matched = match item.get(attribute) {
            Some(value) => self.operator.apply(value, &self.arguments)?,
            None => false,
        };
        if self.negated {
            Ok(!matched)
        } else {
            Ok(matched)
        }
    }
}

/// Conditions keyed by attribute name; an item matches when every entry
/// evaluates true.
pub type ConditionSet = HashMap<String, Condition>;

/// Evaluate a whole condition set against an item.
pub fn evaluate_all(conditions: &ConditionSet, item: &Item) -> Result<bool, DynamoError> {
    for (attribute, condition) in conditions {
        if !condition.evaluate(attribute, item)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// A composed boolean test over whole items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    Test {
        attribute: String,
        condition: Condition,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn test(attribute: impl Into<String>, condition: Condition) -> Self {
        Self::Test {
            attribute: attribute.into(),
            condition,
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    pub fn evaluate(&self, item: &Item) -> Result<bool, DynamoError> {
        match self {
            Self::Test {
                attribute,
                condition,
            } => condition.evaluate(attribute, item),
            Self::And(left, right) => Ok(left.evaluate(item)? && right.evaluate(item)?),
            Self::Or(left, right) => Ok(left.evaluate(item)? || right.evaluate(item)?),
            Self::Not(inner) => Ok(!inner.evaluate(item)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(attrs: Vec<(&str, Value)>) -> Item {
        attrs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    fn item_hai() -> Item {
        item(vec![
            ("str", Value::string("hai")),
            ("bin", Value::binary(b"hai".to_vec())),
        ])
    }

    fn item_stuff() -> Item {
        item(vec![
            ("str", Value::string("stuff")),
            ("bin", Value::binary(b"stuff".to_vec())),
        ])
    }

    #[test]
    fn test_eq() {
        assert!(Condition::eq(Value::string("hai"))
            .evaluate("str", &item_hai())
            .unwrap());
        assert!(!Condition::eq(Value::string("ha"))
            .evaluate("str", &item_hai())
            .unwrap());
    }

    #[test]
    fn test_ne() {
        assert!(Condition::ne(Value::string("ha"))
            .evaluate("str", &item_hai())
            .unwrap());
        assert!(!Condition::ne(Value::string("hai"))
            .evaluate("str", &item_hai())
            .unwrap());
    }

    #[test]
    fn test_absent_attribute_semantics() {
        let subject = item_hai();
        assert!(!Condition::eq(Value::string("hai"))
            .evaluate("missing", &subject)
            .unwrap());
        assert!(Condition::ne(Value::string("hai"))
            .evaluate("missing", &subject)
            .unwrap());
        assert!(!Condition::lt(Value::string("z"))
            .evaluate("missing", &subject)
            .unwrap());
        assert!(!Condition::contains(Value::string("ha"))
            .evaluate("missing", &subject)
            .unwrap());
        assert!(Condition::not_contains(Value::string("ha"))
            .evaluate("missing", &subject)
            .unwrap());
        assert!(!Condition::exists().evaluate("missing", &subject).unwrap());
        assert!(Condition::not_exists()
            .evaluate("missing", &subject)
            .unwrap());
    }

    #[test]
    fn test_null_value_is_present() {
        let subject = item(vec![("null", Value::Null)]);
        assert!(Condition::exists().evaluate("null", &subject).unwrap());
        assert!(!Condition::not_exists().evaluate("null", &subject).unwrap());
    }

    #[test]
    fn test_ordering_operators() {
        let owner = item(vec![("ownerId", Value::number(2))]);
        assert!(Condition::ge(Value::number(2)).evaluate("ownerId", &owner).unwrap());
        assert!(Condition::le(Value::number(2)).evaluate("ownerId", &owner).unwrap());
        assert!(!Condition::lt(Value::number(2)).evaluate("ownerId", &owner).unwrap());
        assert!(!Condition::gt(Value::number(2)).evaluate("ownerId", &owner).unwrap());
    }

    #[test]
    fn test_ordering_mismatch_is_an_error() {
        let owner = item(vec![("ownerId", Value::number(2))]);
        assert!(Condition::lt(Value::string("2"))
            .evaluate("ownerId", &owner)
            .is_err());
    }

    #[test]
    fn test_contains() {
        assert!(Condition::contains(Value::string("ha"))
            .evaluate("str", &item_hai())
            .unwrap());
        assert!(!Condition::contains(Value::string("stuff"))
            .evaluate("str", &item_hai())
            .unwrap());
    }

    #[test]
    fn test_binary_contains_is_an_error() {
        assert!(Condition::contains(Value::binary(b"stuff".to_vec()))
            .evaluate("bin", &item_hai())
            .is_err());
    }

    #[test]
    fn test_between() {
        let owner = item(vec![("ownerId", Value::number(2))]);
        assert!(Condition::between(Value::number(0), Value::number(10))
            .evaluate("ownerId", &owner)
            .unwrap());
        assert!(!Condition::between(Value::number(3), Value::number(10))
            .evaluate("ownerId", &owner)
            .unwrap());
    }

    #[test]
    fn test_is_in() {
        let subject = item_hai();
        assert!(
            Condition::is_in([Value::string("hai"), Value::string("stuff")])
                .evaluate("str", &subject)
                .unwrap()
        );
        assert!(!Condition::is_in([Value::string("stuff")])
            .evaluate("str", &subject)
            .unwrap());
    }

    #[test]
    fn test_begins_with() {
        assert!(Condition::begins_with(Value::string("ha"))
            .evaluate("str", &item_hai())
            .unwrap());
        assert!(!Condition::begins_with(Value::string("ai"))
            .evaluate("str", &item_hai())
            .unwrap());
    }

    #[test]
    fn test_double_negation() {
        let condition = Condition::eq(Value::string("hai")).negate().negate();
        assert!(condition.evaluate("str", &item_hai()).unwrap());
    }

    #[test]
    fn test_predicate_and() {
        let predicate = Predicate::test("str", Condition::eq(Value::string("hai")))
            .and(Predicate::test("str", Condition::contains(Value::string("ha"))));
        assert!(predicate.evaluate(&item_hai()).unwrap());
        assert!(!predicate.evaluate(&item_stuff()).unwrap());
    }

    #[test]
    fn test_predicate_or() {
        let predicate = Predicate::test("str", Condition::eq(Value::string("ha")))
            .or(Predicate::test("str", Condition::eq(Value::string("hai"))));
        assert!(predicate.evaluate(&item_hai()).unwrap());
        assert!(!predicate.evaluate(&item_stuff()).unwrap());
    }

    #[test]
    fn test_predicate_negate() {
        let predicate = Predicate::test("str", Condition::eq(Value::string("hai"))).negate();
        assert!(!predicate.evaluate(&item_hai()).unwrap());
        assert!(predicate.evaluate(&item_stuff()).unwrap());
    }

    #[test]
    fn test_evaluate_all() {
        let mut conditions = ConditionSet::new();
        conditions.insert("str".to_string(), Condition::eq(Value::string("hai")));
        conditions.insert("bin".to_string(), Condition::exists());

        assert!(evaluate_all(&conditions, &item_hai()).unwrap());
        assert!(!evaluate_all(&conditions, &item_stuff()).unwrap());
        assert!(evaluate_all(&ConditionSet::new(), &item_stuff()).unwrap());
    }
}
