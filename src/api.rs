//! JSON response shapes for the two request contracts (upload and process).
//!
//! The transport layer owns routing and multipart decoding; it hands the decoded file part
//! (or `None` when the form had no file field) and raw process bodies to these functions and
//! writes back `status` and `body` unchanged.

use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::error::{UploadError, UploadResult};
use crate::ingestion::UploadPipeline;
use crate::operations::OperationRequest;
use crate::types::UploadRequest;

/// Status code used for successful responses.
pub const STATUS_OK: u16 = 200;

/// A transport-independent response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP-equivalent status code.
    pub status: u16,
    /// JSON body.
    pub body: JsonValue,
}

impl ApiResponse {
    fn ok<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self {
                status: STATUS_OK,
                body,
            },
            Err(e) => Self {
                status: 500,
                body: json!({ "error": format!("failed to encode response: {e}") }),
            },
        }
    }

    /// Response for a failed request: `{error: message}` with the error's status.
    pub fn from_error(err: &UploadError) -> Self {
        Self {
            status: err.status_code(),
            body: json!({ "error": err.to_string() }),
        }
    }

    fn from_result<T: Serialize>(result: UploadResult<T>) -> Self {
        match result {
            Ok(v) => Self::ok(&v),
            Err(e) => Self::from_error(&e),
        }
    }

    /// Returns `true` for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Handle an upload form submission.
pub fn handle_upload(pipeline: &UploadPipeline, file: Option<&UploadRequest>) -> ApiResponse {
    let result = match file {
        Some(req) => pipeline.preview(req),
        None => Err(UploadError::MissingFile),
    };
    ApiResponse::from_result(result)
}

/// Handle a process request body.
pub fn handle_process(pipeline: &UploadPipeline, body: &[u8]) -> ApiResponse {
    let result =
        OperationRequest::from_json_slice(body).and_then(|req| pipeline.dispatch(&req));
    ApiResponse::from_result(result)
}
