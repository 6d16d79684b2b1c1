use serde::Serialize;

/// Body shape of every non-2xx response: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: &'static str,
}

/// Body shape of the confirmation response: `{"message": "..."}`.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub message: &'static str,
}
