//! HTTP route handlers, one module per resource under `/api`.

pub mod auth;
pub mod cars;
pub mod feedback;
pub mod health;
pub mod rentals;

use serde::Serialize;

/// `{"message": "..."}` acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub const fn new(message: &'static str) -> Self {
        MessageResponse { message }
    }
}
