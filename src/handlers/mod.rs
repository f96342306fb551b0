// ============================================================================
// Order Handlers - Request -> one store call -> normalized response
// ============================================================================
//
// - response      - response formatter (status, CORS header, JSON body)
// - mapping       - tagged store records <-> plain orders
// - errors        - HandlerError, always terminal as a 500
// - order_handler - OrderHandlers with the five operations and dispatch
//
// ============================================================================

pub mod errors;
pub mod mapping;
pub mod order_handler;
pub mod response;

pub use order_handler::*;
pub use response::*;
