//! Typed attribute values
//!
//! A [`Value`] is the closed set of shapes an item attribute can take.
//! Equality is structural; ordering and containment are defined only for
//! the kinds the service defines them for, and are errors elsewhere.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::error::DynamoError;
use crate::item::Item;

/// An attribute value. Exactly one variant per instance; numbers are
/// arbitrary-precision decimals so repeated increments stay exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    S(String),
    N(BigDecimal),
    B(Vec<u8>),
    Bool(bool),
    Null,
    Ss(BTreeSet<String>),
    Ns(BTreeSet<BigDecimal>),
    Bs(BTreeSet<Vec<u8>>),
    L(Vec<Value>),
    M(Item),
}

/// The kind of a [`Value`], used in validation diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    String,
    Number,
    Binary,
    Boolean,
    Null,
    StringSet,
    NumberSet,
    BinarySet,
    List,
    Map,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "String",
            Self::Number => "Number",
            Self::Binary => "Binary",
            Self::Boolean => "Boolean",
            Self::Null => "Null",
            Self::StringSet => "StringSet",
            Self::NumberSet => "NumberSet",
            Self::BinarySet => "BinarySet",
            Self::List => "List",
            Self::Map => "Map",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::S(s.into())
    }

    pub fn number(n: impl Into<BigDecimal>) -> Self {
        Value::N(n.into())
    }

    pub fn binary(b: impl Into<Vec<u8>>) -> Self {
        Value::B(b.into())
    }

    pub fn boolean(b: bool) -> Self {
        Value::Bool(b)
    }

    pub fn string_set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::Ss(items.into_iter().map(Into::into).collect())
    }

    pub fn number_set<I, N>(items: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<BigDecimal>,
    {
        Value::Ns(items.into_iter().map(Into::into).collect())
    }

    pub fn binary_set<I, B>(items: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        Value::Bs(items.into_iter().map(Into::into).collect())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::L(items.into_iter().collect())
    }

    pub fn map(item: Item) -> Self {
        Value::M(item)
    }

    /// Get the string value if this is an S type
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::S(s) => Some(s),
            _ => None,
        }
    }

    /// Get the decimal value if this is an N type
    pub fn as_number(&self) -> Option<&BigDecimal> {
        match self {
            Value::N(n) => Some(n),
            _ => None,
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::S(_) => ValueType::String,
            Value::N(_) => ValueType::Number,
            Value::B(_) => ValueType::Binary,
            Value::Bool(_) => ValueType::Boolean,
            Value::Null => ValueType::Null,
            Value::Ss(_) => ValueType::StringSet,
            Value::Ns(_) => ValueType::NumberSet,
            Value::Bs(_) => ValueType::BinarySet,
            Value::L(_) => ValueType::List,
            Value::M(_) => ValueType::Map,
        }
    }

    /// Typed ordering. Defined for String (lexicographic), Number (numeric)
    /// and Binary (byte-wise); every other pairing is a validation error.
    pub fn try_cmp(&self, other: &Value) -> Result<Ordering, DynamoError> {
        match (self, other) {
            (Value::S(a), Value::S(b)) => Ok(a.cmp(b)),
            (Value::N(a), Value::N(b)) => Ok(a.cmp(b)),
            (Value::B(a), Value::B(b)) => Ok(a.cmp(b)),
            _ => Err(DynamoError::invalid_parameter(format!(
                "Cannot compare {} with {}",
                self.value_type(),
                other.value_type()
            ))),
        }
    }

    /// Containment test: substring for String, element membership for the
    /// set kinds. Binary containment has no defined semantics and is an
    /// error; any other pairing is simply false.
    pub fn contains(&self, needle: &Value) -> Result<bool, DynamoError> {
        match (self, needle) {
            (Value::S(haystack), Value::S(s)) => Ok(haystack.contains(s.as_str())),
            (Value::Ss(set), Value::S(s)) => Ok(set.contains(s)),
            (Value::Ns(set), Value::N(n)) => Ok(set.contains(n)),
            (Value::Bs(set), Value::B(b)) => Ok(set.contains(b)),
            (Value::B(_), Value::B(_)) => Err(DynamoError::invalid_parameter(
                "Contains is not supported for Binary values",
            )),
            _ => Ok(false),
        }
    }

    /// String prefix test; false for every non-String pairing.
    pub fn begins_with(&self, prefix: &Value) -> bool {
        match (self, prefix) {
            (Value::S(s), Value::S(p)) => s.starts_with(p.as_str()),
            _ => false,
        }
    }
}
