//! Table storage and item operations

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::condition::{evaluate_all, ConditionSet};
use crate::error::DynamoError;
use crate::item::{apply_updates, Item, Updates};
use crate::schema::{AttributeDefinition, Index, KeySchema};
use crate::value::Value;

/// Storage key of an item: the hash value plus the range value when the
/// table declares a range attribute. One item per key; writes replace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PrimaryKey {
    hash: Value,
    range: Option<Value>,
}

/// A table: its key schema, its index descriptors, and its item store.
///
/// Indexes are key-schema descriptors only. A query against an index still
/// scans the primary item store; no separate item set or count is kept, so
/// an index's reported item count is the table's item count.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub arn: String,
    pub created_at: DateTime<Utc>,
    pub schema: KeySchema,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub global_indexes: Vec<Index>,
    pub local_indexes: Vec<Index>,
    items: HashMap<PrimaryKey, Item>,
}

impl Table {
    pub(crate) fn new(
        name: String,
        schema: KeySchema,
        attribute_definitions: Vec<AttributeDefinition>,
        global_indexes: Vec<Index>,
        local_indexes: Vec<Index>,
    ) -> Self {
        let arn = format!("arn:aws:dynamodb-mock:ca-central-1:0123456789:table/{name}");
        Self {
            name,
            arn,
            created_at: Utc::now(),
            schema,
            attribute_definitions,
            global_indexes,
            local_indexes,
            items: HashMap::new(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Validate the key attributes of `item` and build its storage key.
    fn key_of(&self, item: &Item) -> Result<PrimaryKey, DynamoError> {
        self.schema.validate_item(item)?;
        self.lookup_key(item).ok_or_else(|| {
            DynamoError::invalid_parameter(format!(
                "Missing the key {} in the item",
                self.schema.hash_key.name
            ))
        })
    }

    /// Build the storage key a lookup item points at, without validation.
    /// `None` when the lookup lacks a declared key attribute (and therefore
    /// cannot match any stored item).
    fn lookup_key(&self, key: &Item) -> Option<PrimaryKey> {
        let hash = key.get(&self.schema.hash_key.name)?.clone();
        let range = match &self.schema.range_key {
            Some(range_key) => Some(key.get(&range_key.name)?.clone()),
            None => None,
        };
        Some(PrimaryKey { hash, range })
    }

    /// Store an item, replacing whatever occupied its key slot, and return
    /// the stored item.
    pub fn put(&mut self, item: Item) -> Result<Item, DynamoError> {
        let key = self.key_of(&item)?;
        self.items.insert(key, item.clone());
        Ok(item)
    }

    pub fn get(&self, key: &Item) -> Option<&Item> {
        let key = self.lookup_key(key)?;
        self.items.get(&key)
    }

    /// Remove and return the item at `key`, if any.
    pub fn delete(&mut self, key: &Item) -> Option<Item> {
        let key = self.lookup_key(key)?;
        self.items.remove(&key)
    }

    /// Apply `updates` to the item at `key`, creating it when absent.
    ///
    /// An update of a missing item that leaves no non-key attribute behind
    /// stores nothing and returns `None`; otherwise the resulting item is
    /// persisted and returned.
    pub fn update(&mut self, key: &Item, updates: &Updates) -> Result<Option<Item>, DynamoError> {
        let existing = self
            .lookup_key(key)
            .and_then(|key| self.items.get(&key))
            .cloned();
        let existed = existing.is_some();

        let mut item = existing.unwrap_or_else(|| self.key_attributes_of(key));
        apply_updates(&mut item, updates)?;

        if !existed && !self.has_non_key_attribute(&item) {
            return Ok(None);
        }

        self.put(item).map(Some)
    }

    /// The synthetic starting item for an update of a missing key: only the
    /// key attributes of the supplied lookup item.
    fn key_attributes_of(&self, key: &Item) -> Item {
        key.iter()
            .filter(|(name, _)| self.schema.is_key_attribute(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    fn has_non_key_attribute(&self, item: &Item) -> bool {
        item.keys().any(|name| !self.schema.is_key_attribute(name))
    }

    /// Query a logical partition.
    ///
    /// The schema is the table's own, or the named index's. The condition
    /// set must bind the schema's hash attribute with an equality condition;
    /// every other condition is applied as an AND filter. Results are
    /// ordered by the schema's range attribute (descending when
    /// `scan_index_forward` is false); items without a comparable range
    /// value keep their relative scan order.
    pub fn query(
        &self,
        conditions: &ConditionSet,
        index_name: Option<&str>,
        scan_index_forward: bool,
    ) -> Result<Vec<Item>, DynamoError> {
        let schema = match index_name {
            None => &self.schema,
            Some(index_name) => &self.index(index_name)?.schema,
        };

        let hash_name = &schema.hash_key.name;
        let hash_value = conditions
            .get(hash_name)
            .filter(|condition| condition.is_equality())
            .and_then(|condition| condition.arguments.first())
            .ok_or_else(|| {
                DynamoError::validation(format!(
                    "Query condition missed key schema element: {hash_name}"
                ))
            })?;

        let mut results = Vec::new();
        for item in self.items.values() {
            if item.get(hash_name) != Some(hash_value) {
                continue;
            }
            let mut matched = true;
            for (attribute, condition) in conditions {
                if attribute == hash_name {
                    continue;
                }
                if !condition.evaluate(attribute, item)? {
                    matched = false;
                    break;
                }
            }
            if matched {
                results.push(item.clone());
            }
        }

        if let Some(range_key) = &schema.range_key {
            results.sort_by(|a, b| {
                range_ordering(a, b, &range_key.name, scan_index_forward)
            });
        }

        Ok(results)
    }

    /// Every item matching all filters; result order is unspecified.
    pub fn scan(&self, filters: &ConditionSet) -> Result<Vec<Item>, DynamoError> {
        let mut results = Vec::new();
        for item in self.items.values() {
            if evaluate_all(filters, item)? {
                results.push(item.clone());
            }
        }
        Ok(results)
    }

    fn index(&self, name: &str) -> Result<&Index, DynamoError> {
        self.global_indexes
            .iter()
            .chain(self.local_indexes.iter())
            .find(|index| index.name == name)
            .ok_or_else(|| {
                DynamoError::validation(format!(
                    "The table does not have the specified index: {name}"
                ))
            })
    }
}

/// Compare two items by a range attribute for query ordering. Pairs where
/// either side lacks a comparable value stay in their scan order.
fn range_ordering(a: &Item, b: &Item, range_name: &str, forward: bool) -> Ordering {
    let ordering = match (a.get(range_name), b.get(range_name)) {
        (Some(left), Some(right)) => left.try_cmp(right).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    };
    if forward {
        ordering
    } else {
        ordering.reverse()
    }
}
