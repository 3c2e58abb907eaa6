//! Backend: the table registry shared by every client adapter
//!
//! A [`Backend`] is constructed explicitly and passed by reference to each
//! adapter that should observe the same data; there is no process-wide
//! instance. The engine is synchronous and takes `&mut self` for writes.
//! Callers sharing one backend wrap it themselves (`Rc<RefCell<Backend>>`
//! in a single-threaded test); the engine adds no locking of its own.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::condition::ConditionSet;
use crate::error::DynamoError;
use crate::item::{Item, Updates};
use crate::schema::{AttributeDefinition, Index, KeySchema};
use crate::table::Table;

/// One write inside a batch: store an item or remove a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteRequest {
    Put(Item),
    Delete(Item),
}

/// Registry of tables, in creation order.
#[derive(Debug, Default)]
pub struct Backend {
    tables: Vec<Table>,
}

impl Backend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|table| table.name == name)
    }

    /// Look up a table by name, failing with ResourceNotFound.
    pub fn get_table(&self, name: &str) -> Result<&Table, DynamoError> {
        self.table(name).ok_or(DynamoError::ResourceNotFound)
    }

    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table, DynamoError> {
        self.table_mut(name).ok_or(DynamoError::ResourceNotFound)
    }

    /// Create a table.
    ///
    /// Every key attribute referenced by the primary schema or by an index
    /// must appear in `attribute_definitions` with the same declared type.
    pub fn create_table(
        &mut self,
        name: &str,
        hash_key: AttributeDefinition,
        range_key: Option<AttributeDefinition>,
        global_indexes: Vec<Index>,
        local_indexes: Vec<Index>,
        attribute_definitions: Vec<AttributeDefinition>,
    ) -> Result<&Table, DynamoError> {
        if self.table(name).is_some() {
            return Err(DynamoError::ResourceInUse(name.to_string()));
        }

        let schema = KeySchema::new(hash_key, range_key);
        for referenced in schema.attributes().chain(
            global_indexes
                .iter()
                .chain(local_indexes.iter())
                .flat_map(|index| index.schema.attributes()),
        ) {
            check_defined(referenced, &attribute_definitions)?;
        }

        info!(table = name, "creating table");
        self.tables.push(Table::new(
            name.to_string(),
            schema,
            attribute_definitions,
            global_indexes,
            local_indexes,
        ));

        // the freshly pushed table
        self.tables.last().ok_or(DynamoError::ResourceNotFound)
    }

    /// Table description for `name`; ResourceNotFound when absent.
    pub fn describe_table(&self, name: &str) -> Result<&Table, DynamoError> {
        self.get_table(name)
    }

    /// Remove the table and every item in it.
    pub fn delete_table(&mut self, name: &str) -> Result<Table, DynamoError> {
        let position = self
            .tables
            .iter()
            .position(|table| table.name == name)
            .ok_or(DynamoError::ResourceNotFound)?;

        info!(table = name, "deleting table");
        Ok(self.tables.remove(position))
    }

    /// Table names in creation order, truncated to `limit` when given.
    pub fn list_tables(&self, limit: Option<usize>) -> Vec<String> {
        self.tables
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|table| table.name.clone())
            .collect()
    }

    pub fn put_item(&mut self, table: &str, item: Item) -> Result<Item, DynamoError> {
        debug!(table, "put item");
        self.get_table_mut(table)?.put(item)
    }

    pub fn get_item(&self, table: &str, key: &Item) -> Result<Option<Item>, DynamoError> {
        Ok(self.get_table(table)?.get(key).cloned())
    }

    pub fn delete_item(&mut self, table: &str, key: &Item) -> Result<Option<Item>, DynamoError> {
        debug!(table, "delete item");
        Ok(self.get_table_mut(table)?.delete(key))
    }

    pub fn update_item(
        &mut self,
        table: &str,
        key: &Item,
        updates: &Updates,
    ) -> Result<Option<Item>, DynamoError> {
        debug!(table, "update item");
        self.get_table_mut(table)?.update(key, updates)
    }

    pub fn query(
        &self,
        table: &str,
        conditions: &ConditionSet,
        index_name: Option<&str>,
        scan_index_forward: bool,
    ) -> Result<Vec<Item>, DynamoError> {
        self.get_table(table)?
            .query(conditions, index_name, scan_index_forward)
    }

    pub fn scan(&self, table: &str, filters: &ConditionSet) -> Result<Vec<Item>, DynamoError> {
        self.get_table(table)?.scan(filters)
    }

    /// Get items from several tables at once.
    ///
    /// Every named table must exist. Keys that match nothing are omitted;
    /// tables with no matches are omitted from the result. Unprocessed-keys
    /// reporting does not exist here: a batch is never truncated.
    pub fn batch_get_item(
        &self,
        requests: &HashMap<String, Vec<Item>>,
    ) -> Result<HashMap<String, Vec<Item>>, DynamoError> {
        for table in requests.keys() {
            self.get_table(table)?;
        }

        let mut results = HashMap::new();
        for (table_name, keys) in requests {
            let table = self.get_table(table_name)?;
            let found: Vec<Item> = keys
                .iter()
                .filter_map(|key| table.get(key).cloned())
                .collect();
            if !found.is_empty() {
                results.insert(table_name.clone(), found);
            }
        }

        debug!(tables = requests.len(), "batch get");
        Ok(results)
    }

    /// Apply puts and deletes across several tables.
    ///
    /// Failures are atomic: every named table is resolved and every put is
    /// validated against its key schema before any write is applied.
    pub fn batch_write_item(
        &mut self,
        requests: HashMap<String, Vec<WriteRequest>>,
    ) -> Result<(), DynamoError> {
        for (table_name, writes) in &requests {
            let table = self.get_table(table_name)?;
            for write in writes {
                if let WriteRequest::Put(item) = write {
                    table.schema.validate_item(item)?;
                }
            }
        }

        debug!(tables = requests.len(), "batch write");
        for (table_name, writes) in requests {
            let table = self.get_table_mut(&table_name)?;
            for write in writes {
                match write {
                    WriteRequest::Put(item) => {
                        table.put(item)?;
                    }
                    WriteRequest::Delete(key) => {
                        table.delete(&key);
                    }
                }
            }
        }

        Ok(())
    }
}

/// The attribute definitions must declare `referenced` with the same type.
fn check_defined(
    referenced: &AttributeDefinition,
    definitions: &[AttributeDefinition],
) -> Result<(), DynamoError> {
    let declared = definitions
        .iter()
        .find(|definition| definition.name == referenced.name)
        .ok_or_else(|| {
            DynamoError::invalid_parameter(format!(
                "Key attribute {} has no matching attribute definition",
                referenced.name
            ))
        })?;

    if declared.attribute_type != referenced.attribute_type {
        return Err(DynamoError::invalid_parameter(format!(
            "Key attribute {} is declared as {} but used as {}",
            referenced.name, declared.attribute_type, referenced.attribute_type
        )));
    }
    Ok(())
}
