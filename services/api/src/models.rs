//! API models for request and response payloads

use serde::Serialize;

pub mod admin;
pub mod card;
pub mod profile;

/// Success envelope shared by every procedure
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
