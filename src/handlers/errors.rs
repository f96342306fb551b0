use crate::event::RequestError;
use crate::store::StoreError;

use super::mapping::MappingError;
use super::response::{internal_error, ApiResponse};

// ============================================================================
// Handler Errors
// ============================================================================
//
// Every variant ends the invocation as a 500 carrying the error text.
// Not-found is a successful outcome and never shows up here.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl HandlerError {
    pub fn is_store_error(&self) -> bool {
        matches!(self, HandlerError::Store(_))
    }

    pub fn into_response(self) -> ApiResponse {
        internal_error(&self.to_string())
    }
}
