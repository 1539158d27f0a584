//! Utilities shared by the page handlers.

pub mod tracing;

use serde::{Deserialize, Serialize};

/// Standard response wrapper.
///
/// `messages` carries the one-shot notices ("New video saved!", ...) that a
/// page should show alongside its data.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub messages: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            messages: Vec::new(),
        }
    }

    pub fn with_messages(mut self, messages: Vec<String>) -> Self {
        self.messages = messages;
        self
    }
}
