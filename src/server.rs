use actix_web::http::StatusCode;
use actix_web::{web, App, HttpResponse, HttpServer};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::config::RequestShape;
use crate::handlers::{ApiResponse, Operation, OrderHandlers};
use crate::metrics::{self, Metrics};

// ============================================================================
// Local Dispatcher - HTTP front for development runs
// ============================================================================
//
// Routes mirror the deployed API:
//
//   GET    /orders        -> list
//   GET    /orders/{id}   -> get
//   POST   /orders        -> create
//   PUT    /orders/{id}   -> update
//   DELETE /orders/{id}   -> delete
//   POST   /invoke/{op}   -> raw event passthrough
//
// Each route builds an event in the configured request shape and passes it
// through OrderHandlers::dispatch, so the boundary normalization is the same
// code path a deployed dispatcher would hit.
//
// ============================================================================

pub async fn run_server(
    handlers: Arc<OrderHandlers>,
    metrics: Arc<Metrics>,
    port: u16,
) -> std::io::Result<()> {
    tracing::info!("🚀 Starting order dispatcher on http://0.0.0.0:{}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(handlers.clone()))
            .app_data(web::Data::new(metrics.clone()))
            .configure(configure)
            .configure(metrics::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/orders", web::get().to(list_orders))
        .route("/orders", web::post().to(create_order))
        .route("/orders/{id}", web::get().to(get_order))
        .route("/orders/{id}", web::put().to(update_order))
        .route("/orders/{id}", web::delete().to(delete_order))
        .route("/invoke/{operation}", web::post().to(invoke));
}

/// Build a dispatcher event in the given shape.
fn build_event(shape: RequestShape, method: &str, id: Option<&str>, body: &[u8]) -> Value {
    let params = id.map(|id| json!({ "id": id }));
    let raw_body = (!body.is_empty()).then(|| String::from_utf8_lossy(body).into_owned());

    let mut event = Map::new();
    event.insert("httpMethod".to_string(), json!(method));

    match shape {
        RequestShape::Local => {
            event.insert("path".to_string(), params.unwrap_or_else(|| json!({})));
            // Unparseable text stays a string and fails as a bad body downstream.
            let body = raw_body
                .map(|text| serde_json::from_str(&text).unwrap_or(Value::String(text)))
                .unwrap_or(Value::Null);
            event.insert("body".to_string(), body);
        }
        RequestShape::Deployed => {
            event.insert("pathParameters".to_string(), params.unwrap_or(Value::Null));
            event.insert("body".to_string(), raw_body.map(Value::String).unwrap_or(Value::Null));
        }
    }

    Value::Object(event)
}

fn into_http(response: ApiResponse) -> HttpResponse {
    let status = StatusCode::from_u16(response.status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut builder = HttpResponse::build(status);
    for (name, value) in &response.headers {
        builder.insert_header((name.as_str(), value.as_str()));
    }

    match response.body {
        Some(body) => builder.content_type("application/json").body(body),
        None => builder.finish(),
    }
}

async fn run(
    handlers: &OrderHandlers,
    operation: Operation,
    method: &str,
    id: Option<&str>,
    body: &[u8],
) -> HttpResponse {
    let event = build_event(handlers.request_shape(), method, id, body);
    into_http(handlers.dispatch(operation, &event).await)
}

async fn list_orders(handlers: web::Data<Arc<OrderHandlers>>) -> HttpResponse {
    run(&handlers, Operation::List, "GET", None, &[]).await
}

async fn get_order(
    handlers: web::Data<Arc<OrderHandlers>>,
    path: web::Path<String>,
) -> HttpResponse {
    run(&handlers, Operation::Get, "GET", Some(path.as_str()), &[]).await
}

async fn create_order(handlers: web::Data<Arc<OrderHandlers>>, body: web::Bytes) -> HttpResponse {
    run(&handlers, Operation::Create, "POST", None, &body).await
}

async fn update_order(
    handlers: web::Data<Arc<OrderHandlers>>,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    run(&handlers, Operation::Update, "PUT", Some(path.as_str()), &body).await
}

async fn delete_order(
    handlers: web::Data<Arc<OrderHandlers>>,
    path: web::Path<String>,
) -> HttpResponse {
    run(&handlers, Operation::Delete, "DELETE", Some(path.as_str()), &[]).await
}

async fn invoke(
    handlers: web::Data<Arc<OrderHandlers>>,
    path: web::Path<String>,
    event: web::Json<Value>,
) -> HttpResponse {
    match path.parse::<Operation>() {
        Ok(operation) => into_http(handlers.dispatch(operation, &event).await),
        Err(message) => HttpResponse::NotFound().json(json!({ "message": message })),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
