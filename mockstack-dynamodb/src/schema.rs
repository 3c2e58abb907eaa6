//! Key schemas and attribute declarations

use serde::{Deserialize, Serialize};

use crate::error::DynamoError;
use crate::item::Item;
use crate::value::{Value, ValueType};

/// Declared type of a key attribute. Only the three scalar kinds can key a
/// table or an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    S,
    N,
    B,
}

impl AttributeType {
    /// The value kind this declaration expects.
    pub fn expected_type(&self) -> ValueType {
        match self {
            Self::S => ValueType::String,
            Self::N => ValueType::Number,
            Self::B => ValueType::Binary,
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        value.value_type() == self.expected_type()
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expected_type())
    }
}

/// A named, typed key attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    pub attribute_type: AttributeType,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::S)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::N)
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::B)
    }
}

/// A primary or index key: one hash attribute, optionally a range attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySchema {
    pub hash_key: AttributeDefinition,
    pub range_key: Option<AttributeDefinition>,
}

impl KeySchema {
    pub fn new(hash_key: AttributeDefinition, range_key: Option<AttributeDefinition>) -> Self {
        Self {
            hash_key,
            range_key,
        }
    }

    /// The attributes this schema references.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDefinition> {
        std::iter::once(&self.hash_key).chain(self.range_key.as_ref())
    }

    /// True when `name` is one of this schema's key attributes.
    pub fn is_key_attribute(&self, name: &str) -> bool {
        self.attributes().any(|attr| attr.name == name)
    }

    /// Check that `item` carries every key attribute with the declared type.
    pub fn validate_item(&self, item: &Item) -> Result<(), DynamoError> {
        for key in self.attributes() {
            let value = item.get(&key.name).ok_or_else(|| {
                DynamoError::invalid_parameter(format!("Missing the key {} in the item", key.name))
            })?;
            if !key.attribute_type.matches(value) {
                return Err(DynamoError::invalid_parameter(format!(
                    "Type mismatch for key {} expected: {} actual: {}",
                    key.name,
                    key.attribute_type,
                    value.value_type()
                )));
            }
        }
        Ok(())
    }
}

/// A secondary index: a named key schema over the table's items.
///
/// A global index declares an independent hash (and optional range)
/// attribute; a local index shares the table's hash attribute and declares a
/// distinct range attribute. Indexes are descriptors only, they do not hold
/// their own item store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub schema: KeySchema,
}

impl Index {
    pub fn new(name: impl Into<String>, schema: KeySchema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn cats_schema() -> KeySchema {
        KeySchema::new(
            AttributeDefinition::number("ownerId"),
            Some(AttributeDefinition::string("name")),
        )
    }

    #[test]
    fn test_valid_item_passes() {
        let mut item = Item::new();
        item.insert("ownerId".to_string(), Value::number(1));
        item.insert("name".to_string(), Value::string("Bandit"));
        item.insert("gender".to_string(), Value::string("male"));

        cats_schema().validate_item(&item).unwrap();
    }

    #[test]
    fn test_missing_hash_key() {
        let mut item = Item::new();
        item.insert("name".to_string(), Value::string("Bandit"));

        let err = cats_schema().validate_item(&item).unwrap_err();
        assert_eq!(
            err.to_string(),
            "One or more parameter values were invalid: Missing the key ownerId in the item"
        );
    }

    #[test]
    fn test_missing_range_key() {
        let mut item = Item::new();
        item.insert("ownerId".to_string(), Value::number(1));

        let err = cats_schema().validate_item(&item).unwrap_err();
        assert_eq!(
            err.to_string(),
            "One or more parameter values were invalid: Missing the key name in the item"
        );
    }

    #[test]
    fn test_mistyped_key() {
        let mut item = Item::new();
        item.insert("ownerId".to_string(), Value::string("one"));
        item.insert("name".to_string(), Value::string("Bandit"));

        let err = cats_schema().validate_item(&item).unwrap_err();
        assert_eq!(
            err.to_string(),
            "One or more parameter values were invalid: \
             Type mismatch for key ownerId expected: Number actual: String"
        );
    }

    #[test]
    fn test_key_attribute_lookup() {
        let schema = cats_schema();
        assert!(schema.is_key_attribute("ownerId"));
        assert!(schema.is_key_attribute("name"));
        assert!(!schema.is_key_attribute("gender"));
    }
}
