use async_trait::async_trait;
use futures_util::TryStreamExt;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::response::query_result::QueryResult;
use scylla::value::{CqlValue, Row};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use super::{
    key_id, AttributeUpdate, AttributeValue, Key, OrderStore, PutCondition, Record, ReturnValues,
    StoreError, UpdateAction, UpdateCondition, UpdateOutput,
};

// ============================================================================
// ScyllaDB Order Store
// ============================================================================
//
// Every collection maps to one CQL table:
//
//   CREATE TABLE <keyspace>.<table> (
//       id         text PRIMARY KEY,
//       attributes map<text, text>
//   )
//
// The `id` attribute lives in the key column, every other `S` attribute in
// the map. Conditional writes use lightweight transactions:
// - put with attribute_not_exists(id) -> INSERT ... IF NOT EXISTS
// - update with attribute_exists(id)  -> UPDATE ... IF EXISTS
//
// CQL has no RETURNING, so ReturnValues::AllNew reads the row back with a
// second query after the write. That read is not atomic with the LWT.
//
// ============================================================================

pub struct ScyllaStore {
    session: Arc<Session>,
    keyspace: String,
}

fn backend<E: Display>(err: E) -> StoreError {
    StoreError::backend(err.to_string())
}

/// CQL identifiers are interpolated into statements, so only plain names pass.
fn validate_identifier(name: &str) -> Result<&str, StoreError> {
    let valid = !name.is_empty()
        && name.len() <= 48
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic());

    if valid {
        Ok(name)
    } else {
        Err(StoreError::InvalidTable(name.to_string()))
    }
}

/// Splits a record into its key column and the attribute map.
fn split_record(mut item: Record) -> Result<(String, HashMap<String, String>), StoreError> {
    let id = key_id(&item)?.to_string();
    item.remove("id");

    let mut attributes = HashMap::with_capacity(item.len());
    for (name, value) in item {
        match value {
            AttributeValue::S(text) => {
                attributes.insert(name, text);
            }
            AttributeValue::Null(_) => {
                return Err(StoreError::backend(format!(
                    "Attribute {} must be a string value",
                    name
                )));
            }
        }
    }

    Ok((id, attributes))
}

fn record_from_row(id: String, attributes: Option<HashMap<String, String>>) -> Record {
    let mut record: Record = attributes
        .unwrap_or_default()
        .into_iter()
        .map(|(name, text)| (name, AttributeValue::S(text)))
        .collect();
    record.insert("id".to_string(), AttributeValue::S(id));
    record
}

/// Reads the `[applied]` column of a lightweight-transaction result.
/// A row that passed `IF EXISTS` but is gone on read-back was deleted in
/// between; report it like a failed existence check.
fn read_back(
    table: &str,
    conditional: bool,
    record: Option<Record>,
) -> Result<Option<Record>, StoreError> {
    match record {
        None if conditional => Err(StoreError::ConditionalCheckFailed {
            table: table.to_string(),
            condition: "attribute_exists(id)".to_string(),
        }),
        record => Ok(record),
    }
}

fn lwt_applied(result: QueryResult) -> Result<bool, StoreError> {
    let rows = result.into_rows_result().map_err(backend)?;
    let row = rows.maybe_first_row::<Row>().map_err(backend)?;

    match row.and_then(|r| r.columns.into_iter().next().flatten()) {
        Some(CqlValue::Boolean(applied)) => Ok(applied),
        _ => Err(StoreError::backend("Missing [applied] column in conditional write result")),
    }
}

impl ScyllaStore {
    pub fn new(session: Arc<Session>, keyspace: &str) -> Self {
        Self {
            session,
            keyspace: keyspace.to_string(),
        }
    }

    /// Connect to the given nodes and make sure keyspace and tables exist.
    pub async fn connect(nodes: &[String], keyspace: &str, tables: &[&str]) -> anyhow::Result<Self> {
        tracing::info!(nodes = ?nodes, keyspace = %keyspace, "Connecting to ScyllaDB...");

        let session: Session = SessionBuilder::new().known_nodes(nodes).build().await?;
        let store = Self::new(Arc::new(session), validate_identifier(keyspace)?);

        store.ensure_keyspace().await?;
        for table in tables {
            store.ensure_table(table).await?;
        }

        tracing::info!(keyspace = %keyspace, "✅ ScyllaDB order store ready");
        Ok(store)
    }

    async fn ensure_keyspace(&self) -> Result<(), StoreError> {
        self.session
            .query_unpaged(
                format!(
                    "CREATE KEYSPACE IF NOT EXISTS {} WITH REPLICATION = \
                     {{'class': 'SimpleStrategy', 'replication_factor': 1}}",
                    self.keyspace
                ),
                &[],
            )
            .await
            .map_err(backend)?;
        Ok(())
    }

    pub async fn ensure_table(&self, table: &str) -> Result<(), StoreError> {
        let table = self.qualified(table)?;
        self.session
            .query_unpaged(
                format!(
                    "CREATE TABLE IF NOT EXISTS {} (id text PRIMARY KEY, attributes map<text, text>)",
                    table
                ),
                &[],
            )
            .await
            .map_err(backend)?;

        tracing::debug!(table = %table, "Ensured order table");
        Ok(())
    }

    fn qualified(&self, table: &str) -> Result<String, StoreError> {
        Ok(format!("{}.{}", self.keyspace, validate_identifier(table)?))
    }

    async fn read_record(&self, table: &str, id: &str) -> Result<Option<Record>, StoreError> {
        let result = self
            .session
            .query_unpaged(
                format!("SELECT id, attributes FROM {} WHERE id = ?", table),
                (id,),
            )
            .await
            .map_err(backend)?;

        let row = result
            .into_rows_result()
            .map_err(backend)?
            .maybe_first_row::<(String, Option<HashMap<String, String>>)>()
            .map_err(backend)?;
        Ok(row.map(|(id, attributes)| record_from_row(id, attributes)))
    }
}

#[async_trait]
impl OrderStore for ScyllaStore {
    async fn scan(&self, table: &str) -> Result<Vec<Record>, StoreError> {
        let table = self.qualified(table)?;
        let records = self
            .session
            .query_iter(format!("SELECT id, attributes FROM {}", table), &[])
            .await
            .map_err(backend)?
            .rows_stream::<(String, Option<HashMap<String, String>>)>()
            .map_err(backend)?
            .map_ok(|(id, attributes)| record_from_row(id, attributes))
            .try_collect::<Vec<_>>()
            .await
            .map_err(backend)?;

        tracing::debug!(table = %table, count = records.len(), "Scanned order table");
        Ok(records)
    }

    async fn get_item(&self, table: &str, key: &Key) -> Result<Option<Record>, StoreError> {
        let table = self.qualified(table)?;
        self.read_record(&table, key_id(key)?).await
    }

    async fn put_item(
        &self,
        table: &str,
        item: Record,
        condition: Option<PutCondition>,
    ) -> Result<(), StoreError> {
        let table = self.qualified(table)?;
        let (id, attributes) = split_record(item)?;

        match condition {
            Some(PutCondition::AttributeNotExists(attr)) if attr == "id" => {
                let result = self
                    .session
                    .query_unpaged(
                        format!("INSERT INTO {} (id, attributes) VALUES (?, ?) IF NOT EXISTS", table),
                        (&id, &attributes),
                    )
                    .await
                    .map_err(backend)?;

                if !lwt_applied(result)? {
                    tracing::warn!(table = %table, id = %id, "Conditional insert rejected");
                    return Err(StoreError::ConditionalCheckFailed {
                        table,
                        condition: "attribute_not_exists(id)".to_string(),
                    });
                }
            }
            Some(PutCondition::AttributeNotExists(attr)) => {
                return Err(StoreError::backend(format!(
                    "Unsupported put condition: attribute_not_exists({})",
                    attr
                )));
            }
            None => {
                self.session
                    .query_unpaged(
                        format!("INSERT INTO {} (id, attributes) VALUES (?, ?)", table),
                        (&id, &attributes),
                    )
                    .await
                    .map_err(backend)?;
            }
        }

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
        let table = self.qualified(table)?;
        let id = key_id(key)?;

        let mut puts: HashMap<String, String> = HashMap::new();
        let mut deletes: Vec<String> = Vec::new();
        for (name, update) in updates {
            if name == "id" {
                return Err(StoreError::backend(
                    "Cannot update attribute id. This attribute is part of the key",
                ));
            }
            match (update.action, update.value) {
                (UpdateAction::Put, Some(AttributeValue::S(text))) => {
                    puts.insert(name, text);
                }
                (UpdateAction::Put, _) => {
                    return Err(StoreError::backend(format!(
                        "Attribute {} must be a string value",
                        name
                    )));
                }
                (UpdateAction::Delete, _) => deletes.push(name),
            }
        }

        let (if_clause, lwt) = match condition {
            Some(UpdateCondition::AttributeExists(attr)) if attr == "id" => (" IF EXISTS", true),
            Some(UpdateCondition::AttributeExists(attr)) => {
                return Err(StoreError::backend(format!(
                    "Unsupported update condition: attribute_exists({})",
                    attr
                )));
            }
            None => ("", false),
        };

        let result = match (puts.is_empty(), deletes.is_empty()) {
            (false, true) => {
                self.session
                    .query_unpaged(
                        format!(
                            "UPDATE {} SET attributes = attributes + ? WHERE id = ?{}",
                            table, if_clause
                        ),
                        (&puts, id),
                    )
                    .await
            }
            (true, false) => {
                self.session
                    .query_unpaged(
                        format!(
                            "UPDATE {} SET attributes = attributes - ? WHERE id = ?{}",
                            table, if_clause
                        ),
                        (&deletes, id),
                    )
                    .await
            }
            (true, true) => return Err(StoreError::backend("No attribute updates given")),
            (false, false) => {
                return Err(StoreError::backend(
                    "Mixing put and delete attribute updates is not supported",
                ))
            }
        }
        .map_err(backend)?;

        if lwt && !lwt_applied(result)? {
            tracing::warn!(table = %table, id = %id, "Conditional update rejected");
            return Err(StoreError::ConditionalCheckFailed {
                table,
                condition: "attribute_exists(id)".to_string(),
            });
        }

        let attributes = match return_values {
            ReturnValues::AllNew => read_back(&table, lwt, self.read_record(&table, id).await?)?,
            ReturnValues::None => None,
        };

        Ok(UpdateOutput { attributes })
    }

    async fn delete_item(&self, table: &str, key: &Key) -> Result<(), StoreError> {
        let table = self.qualified(table)?;
        self.session
            .query_unpaged(format!("DELETE FROM {} WHERE id = ?", table), (key_id(key)?,))
            .await
            .map_err(backend)?;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
