use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::config::RequestShape;
use crate::event::Request;
use crate::metrics::Metrics;
use crate::models::{Order, OrderList};
use crate::store::{
    id_key, AttributeUpdate, AttributeValue, OrderStore, PutCondition, ReturnValues,
    UpdateCondition,
};

use super::errors::HandlerError;
use super::mapping::{map_data, map_item, order_record};
use super::response::{create_response, empty_response, not_found, ApiResponse};

// ============================================================================
// Order Handler Set
// ============================================================================
//
// Orchestrates: raw event -> Request -> one OrderStore call -> ApiResponse
//
// Each operation produces exactly one response. Failures never escape: they
// are logged and turned into a 500 here.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Operation::List),
            "get" => Ok(Operation::Get),
            "create" => Ok(Operation::Create),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            other => Err(format!("Unknown operation: {}", other)),
        }
    }
}

pub struct OrderHandlers {
    store: Arc<dyn OrderStore>,
    table: String,
    shape: RequestShape,
    metrics: Option<Arc<Metrics>>,
}

impl OrderHandlers {
    pub fn new(store: Arc<dyn OrderStore>, table: &str, shape: RequestShape) -> Self {
        Self {
            store,
            table: table.to_string(),
            shape,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn request_shape(&self) -> RequestShape {
        self.shape
    }

    /// Entry point for the dispatcher: normalize the raw event, run the operation.
    pub async fn dispatch(&self, operation: Operation, event: &Value) -> ApiResponse {
        tracing::info!(operation = operation.as_str(), event = %event, "Handling order request");
        let started = Instant::now();

        let request = Request::from_event(event, self.shape);
        let response = match operation {
            Operation::List => self.list_orders(&request).await,
            Operation::Get => self.get_order(&request).await,
            Operation::Create => self.create_order(&request).await,
            Operation::Update => self.update_order(&request).await,
            Operation::Delete => self.delete_order(&request).await,
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_request(
                operation.as_str(),
                response.status_code,
                started.elapsed().as_secs_f64(),
            );
        }

        response
    }

    pub async fn list_orders(&self, _request: &Request) -> ApiResponse {
        self.try_list()
            .await
            .unwrap_or_else(|e| self.fail(Operation::List, e))
    }

    pub async fn get_order(&self, request: &Request) -> ApiResponse {
        self.try_get(request)
            .await
            .unwrap_or_else(|e| self.fail(Operation::Get, e))
    }

    pub async fn create_order(&self, request: &Request) -> ApiResponse {
        self.try_create(request)
            .await
            .unwrap_or_else(|e| self.fail(Operation::Create, e))
    }

    pub async fn update_order(&self, request: &Request) -> ApiResponse {
        self.try_update(request)
            .await
            .unwrap_or_else(|e| self.fail(Operation::Update, e))
    }

    pub async fn delete_order(&self, request: &Request) -> ApiResponse {
        self.try_delete(request)
            .await
            .unwrap_or_else(|e| self.fail(Operation::Delete, e))
    }

    async fn try_list(&self) -> Result<ApiResponse, HandlerError> {
        let records = self.store.scan(&self.table).await?;
        let orders = records
            .iter()
            .map(map_item)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = orders.len(), "Listed orders");
        Ok(create_response(200, &OrderList { orders }))
    }

    async fn try_get(&self, request: &Request) -> Result<ApiResponse, HandlerError> {
        let id = request.path_id()?;

        match self.store.get_item(&self.table, &id_key(id)).await? {
            Some(item) => Ok(create_response(200, &map_item(&item)?)),
            None => {
                tracing::warn!(order_id = %id, "Order not found");
                Ok(not_found(id))
            }
        }
    }

    async fn try_create(&self, request: &Request) -> Result<ApiResponse, HandlerError> {
        let input = request.input()?;
        let item = order_record(&Order {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            created_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });

        // Echo the record we built; it is not read back.
        let created = map_item(&item)?;
        self.store
            .put_item(
                &self.table,
                item,
                Some(PutCondition::AttributeNotExists("id".to_string())),
            )
            .await?;

        tracing::info!(order_id = %created.id, "✅ Order created");
        Ok(create_response(200, &created))
    }

    async fn try_update(&self, request: &Request) -> Result<ApiResponse, HandlerError> {
        let id = request.path_id()?;
        let input = request.input()?;
        let updates = HashMap::from([(
            "name".to_string(),
            AttributeUpdate::put(AttributeValue::S(input.name)),
        )]);

        let result = self
            .store
            .update_item(
                &self.table,
                &id_key(id),
                updates,
                Some(UpdateCondition::AttributeExists("id".to_string())),
                ReturnValues::AllNew,
            )
            .await;

        match result {
            Ok(output) => {
                tracing::info!(order_id = %id, "✅ Order updated");
                Ok(create_response(200, &map_data(&output)?))
            }
            Err(e) if e.is_conditional_check_failed() => {
                tracing::warn!(order_id = %id, "Update target not found");
                Ok(not_found(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn try_delete(&self, request: &Request) -> Result<ApiResponse, HandlerError> {
        let id = request.path_id()?;
        self.store.delete_item(&self.table, &id_key(id)).await?;

        tracing::info!(order_id = %id, "✅ Order deleted");
        Ok(empty_response(200))
    }

    fn fail(&self, operation: Operation, err: HandlerError) -> ApiResponse {
        tracing::error!(
            operation = operation.as_str(),
            table = %self.table,
            error = %err,
            "Order request failed"
        );

        if err.is_store_error() {
            if let Some(metrics) = &self.metrics {
                metrics.record_store_error(operation.as_str());
            }
        }

        err.into_response()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
