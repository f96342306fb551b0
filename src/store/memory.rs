use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{
    key_id, AttributeUpdate, Key, OrderStore, PutCondition, Record, ReturnValues, StoreError,
    UpdateAction, UpdateCondition, UpdateOutput,
};

// ============================================================================
// In-Memory Order Store
// ============================================================================
//
// Tables must be declared up front; touching an undeclared table fails the
// same way a missing table fails on a real database. Records are keyed by
// their `id` attribute and scanned in key order.
//
// ============================================================================

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<String, BTreeMap<String, Record>>>,
}

impl InMemoryStore {
    pub fn with_tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tables = tables
            .into_iter()
            .map(|name| (name.into(), BTreeMap::new()))
            .collect();

        Self {
            tables: RwLock::new(tables),
        }
    }
}

fn table_not_found(table: &str) -> StoreError {
    StoreError::backend(format!("Requested resource not found: table {}", table))
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn scan(&self, table: &str) -> Result<Vec<Record>, StoreError> {
        let tables = self.tables.read().await;
        let rows = tables.get(table).ok_or_else(|| table_not_found(table))?;
        Ok(rows.values().cloned().collect())
    }

    async fn get_item(&self, table: &str, key: &Key) -> Result<Option<Record>, StoreError> {
        let id = key_id(key)?;
        let tables = self.tables.read().await;
        let rows = tables.get(table).ok_or_else(|| table_not_found(table))?;
        Ok(rows.get(id).cloned())
    }

    async fn put_item(
        &self,
        table: &str,
        item: Record,
        condition: Option<PutCondition>,
    ) -> Result<(), StoreError> {
        let id = key_id(&item)?.to_string();
        let mut tables = self.tables.write().await;
        let rows = tables.get_mut(table).ok_or_else(|| table_not_found(table))?;

        if let Some(PutCondition::AttributeNotExists(attr)) = &condition {
            if rows.get(&id).is_some_and(|existing| existing.contains_key(attr)) {
                return Err(StoreError::ConditionalCheckFailed {
                    table: table.to_string(),
                    condition: format!("attribute_not_exists({})", attr),
                });
            }
        }

        rows.insert(id, item);
        Ok(())
    }

    async fn update_item(
        &self,
        table: &str,
        key: &Key,
        updates: HashMap<String, AttributeUpdate>,
        condition: Option<UpdateCondition>,
        return_values: ReturnValues,
    ) -> Result<UpdateOutput, StoreError> {
        let id = key_id(key)?.to_string();
        if updates.contains_key("id") {
            return Err(StoreError::backend(
                "Cannot update attribute id. This attribute is part of the key",
            ));
        }

        let mut tables = self.tables.write().await;
        let rows = tables.get_mut(table).ok_or_else(|| table_not_found(table))?;

        if let Some(UpdateCondition::AttributeExists(attr)) = &condition {
            if !rows.get(&id).is_some_and(|existing| existing.contains_key(attr)) {
                return Err(StoreError::ConditionalCheckFailed {
                    table: table.to_string(),
                    condition: format!("attribute_exists({})", attr),
                });
            }
        }

        // Unconditional updates upsert, seeding the record with its key.
        let record = rows.entry(id).or_insert_with(|| key.clone());
        for (name, update) in updates {
            match (update.action, update.value) {
                (UpdateAction::Put, Some(value)) => {
                    record.insert(name, value);
                }
                (UpdateAction::Put, None) => {
                    return Err(StoreError::backend(format!(
                        "Attribute update for {} is missing a value",
                        name
                    )));
                }
                (UpdateAction::Delete, _) => {
                    record.remove(&name);
                }
            }
        }

        let attributes = match return_values {
            ReturnValues::AllNew => Some(record.clone()),
            ReturnValues::None => None,
        };

        Ok(UpdateOutput { attributes })
    }

    async fn delete_item(&self, table: &str, key: &Key) -> Result<(), StoreError> {
        let id = key_id(key)?;
        let mut tables = self.tables.write().await;
        let rows = tables.get_mut(table).ok_or_else(|| table_not_found(table))?;
        rows.remove(id);
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
