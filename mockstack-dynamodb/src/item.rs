//! Items and in-place update actions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DynamoError;
use crate::value::Value;

/// A stored record: attribute name to value. Absence of an attribute is
/// distinct from a `Value::Null` attribute.
pub type Item = BTreeMap<String, Value>;

/// One update to a single attribute of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateAction {
    /// Replace or create the attribute with this value.
    Put(Value),
    /// With no value: remove the attribute. With a set value: remove those
    /// elements from a set attribute of the same kind.
    Delete(Option<Value>),
    /// Numeric addition for Number attributes, set union for set attributes;
    /// creates the attribute when absent.
    Add(Value),
}

/// Updates keyed by attribute name, applied in name order.
pub type Updates = BTreeMap<String, UpdateAction>;

/// Apply `updates` to `item` in place.
pub fn apply_updates(item: &mut Item, updates: &Updates) -> Result<(), DynamoError> {
    for (name, action) in updates {
        match action {
            UpdateAction::Put(value) => {
                item.insert(name.clone(), value.clone());
            }
            UpdateAction::Delete(None) => {
                item.remove(name);
            }
            UpdateAction::Delete(Some(value)) => delete_elements(item, name, value)?,
            UpdateAction::Add(value) => add_value(item, name, value)?,
        }
    }
    Ok(())
}

/// Remove set elements from an existing set attribute. Removing the last
/// element removes the attribute itself; a missing attribute is a no-op.
fn delete_elements(item: &mut Item, name: &str, value: &Value) -> Result<(), DynamoError> {
    let Some(current) = item.get(name) else {
        return Ok(());
    };

    let remaining = match (current, value) {
        (Value::Ss(current), Value::Ss(remove)) => {
            Value::Ss(current.difference(remove).cloned().collect())
        }
        (Value::Ns(current), Value::Ns(remove)) => {
            Value::Ns(current.difference(remove).cloned().collect())
        }
        (Value::Bs(current), Value::Bs(remove)) => {
            Value::Bs(current.difference(remove).cloned().collect())
        }
        (current, remove) => {
            return Err(DynamoError::invalid_parameter(format!(
                "Delete with a value requires a set attribute of the same type, \
                 found: {} and {}",
                current.value_type(),
                remove.value_type()
            )));
        }
    };

    let emptied = match &remaining {
        Value::Ss(set) => set.is_empty(),
        Value::Ns(set) => set.is_empty(),
        Value::Bs(set) => set.is_empty(),
        _ => false,
    };

    if emptied {
        item.remove(name);
    } else {
        item.insert(name.to_string(), remaining);
    }
    Ok(())
}

/// Numeric addition or set union, creating the attribute when absent.
fn add_value(item: &mut Item, name: &str, value: &Value) -> Result<(), DynamoError> {
    let updated = match (item.get(name), value) {
        (None, Value::N(_) | Value::Ss(_) | Value::Ns(_) | Value::Bs(_)) => value.clone(),
        (Some(Value::N(current)), Value::N(increment)) => Value::N(current + increment),
        (Some(Value::Ss(current)), Value::Ss(add)) => {
            Value::Ss(current.union(add).cloned().collect())
        }
        (Some(Value::Ns(current)), Value::Ns(add)) => {
            Value::Ns(current.union(add).cloned().collect())
        }
        (Some(Value::Bs(current)), Value::Bs(add)) => {
            Value::Bs(current.union(add).cloned().collect())
        }
        (current, add) => {
            return Err(DynamoError::invalid_parameter(format!(
                "Add requires a Number or Set attribute, found: {} and {}",
                current.map_or(crate::value::ValueType::Null, Value::value_type),
                add.value_type()
            )));
        }
    };

    item.insert(name.to_string(), updated);
    Ok(())
}
