//! Named-operation dispatch.
//!
//! Callers send `{"operation": "<name>", ...payload}`. The [`OperationRegistry`] maps names to
//! [`OperationHandler`]s; new handlers are added with [`OperationRegistry::register`] without
//! touching [`OperationRegistry::dispatch`].
//!
//! ```rust
//! use tabular_intake::config::UnknownOperationPolicy;
//! use tabular_intake::operations::{OperationRegistry, OperationRequest};
//!
//! let registry = OperationRegistry::with_builtins();
//! let req = OperationRequest::from_json_slice(br#"{"operation":"summary"}"#).unwrap();
//! let out = registry.dispatch(&req, UnknownOperationPolicy::Acknowledge).unwrap();
//! assert_eq!(out.message, "Summary operation completed");
//! ```

mod summary;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::config::UnknownOperationPolicy;
use crate::error::{UploadError, UploadResult};

pub use summary::SummaryOperation;

/// Message returned for names without a handler under [`UnknownOperationPolicy::Acknowledge`].
pub const GENERIC_ACK_MESSAGE: &str = "Operation completed successfully";

/// A decoded operation request.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    /// Requested operation; `None` when the field is missing, null or not a string.
    pub operation: Option<String>,
    /// The whole request object, including the `operation` key.
    pub payload: Map<String, JsonValue>,
}

impl OperationRequest {
    /// Build a request from an already-decoded JSON value.
    ///
    /// Anything other than a JSON object is a [`UploadError::MalformedRequest`].
    pub fn from_json(value: JsonValue) -> UploadResult<Self> {
        let payload = match value {
            JsonValue::Object(map) => map,
            other => {
                return Err(UploadError::MalformedRequest {
                    message: format!("expected a JSON object, got {}", json_kind(&other)),
                });
            }
        };
        let operation = payload
            .get("operation")
            .and_then(JsonValue::as_str)
            .map(str::to_owned);
        Ok(Self { operation, payload })
    }

    /// Decode a request body.
    pub fn from_json_slice(body: &[u8]) -> UploadResult<Self> {
        let value: JsonValue =
            serde_json::from_slice(body).map_err(|e| UploadError::MalformedRequest {
                message: e.to_string(),
            })?;
        Self::from_json(value)
    }
}

fn json_kind(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Outcome of an operation. Serializes to `{message, result?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    /// Human-readable status.
    pub message: String,
    /// Optional result text; omitted from JSON when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl OperationResult {
    /// A result with a message only.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            result: None,
        }
    }

    /// A result with both message and result text.
    pub fn with_result(message: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            result: Some(result.into()),
        }
    }
}

/// A named transformation invoked by the dispatcher.
pub trait OperationHandler: Send + Sync {
    /// Run the operation against the full request payload.
    fn run(&self, payload: &Map<String, JsonValue>) -> UploadResult<OperationResult>;
}

/// Operations shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Fixed acknowledgement that a summary was computed.
    Summary,
}

impl Operation {
    /// All built-in operations.
    pub const ALL: [Operation; 1] = [Operation::Summary];

    /// Registry name of the operation.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Summary => "summary",
        }
    }

    /// Look up a built-in by name (exact match).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    fn handler(self) -> Arc<dyn OperationHandler> {
        match self {
            Operation::Summary => Arc::new(SummaryOperation),
        }
    }
}

/// Name → handler table.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    handlers: BTreeMap<String, Arc<dyn OperationHandler>>,
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl OperationRegistry {
    /// An empty registry: every name takes the unknown-operation path.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every [`Operation`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for op in Operation::ALL {
            registry.register(op.name(), op.handler());
        }
        registry
    }

    /// Register (or replace) the handler for `name`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn OperationHandler>,
    ) -> &mut Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    /// Returns `true` if `name` has a handler.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Route `request` to its handler.
    ///
    /// Names without a handler (including a missing name) follow `unknown`.
    pub fn dispatch(
        &self,
        request: &OperationRequest,
        unknown: UnknownOperationPolicy,
    ) -> UploadResult<OperationResult> {
        let name = request.operation.as_deref().unwrap_or("");
        match self.handlers.get(name) {
            Some(handler) => handler.run(&request.payload),
            None => match unknown {
                UnknownOperationPolicy::Acknowledge => {
                    Ok(OperationResult::message(GENERIC_ACK_MESSAGE))
                }
                UnknownOperationPolicy::Reject => Err(UploadError::UnsupportedOperation {
                    operation: name.to_string(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct Echo;

    impl OperationHandler for Echo {
        fn run(&self, payload: &Map<String, JsonValue>) -> UploadResult<OperationResult> {
            let column = payload
                .get("column")
                .and_then(JsonValue::as_str)
                .unwrap_or("?");
            Ok(OperationResult::with_result("echoed", column))
        }
    }

    fn request(v: JsonValue) -> OperationRequest {
        OperationRequest::from_json(v).unwrap()
    }

    #[test]
    fn summary_returns_fixed_acknowledgement() {
        let registry = OperationRegistry::with_builtins();
        let out = registry
            .dispatch(
                &request(json!({"operation": "summary"})),
                UnknownOperationPolicy::Acknowledge,
            )
            .unwrap();
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({
                "message": "Summary operation completed",
                "result": "Data summary calculated successfully"
            })
        );
    }

    #[test]
    fn unknown_and_missing_names_are_acknowledged_by_default() {
        let registry = OperationRegistry::with_builtins();
        for body in [
            json!({"operation": "unknown"}),
            json!({}),
            json!({"operation": null}),
            json!({"operation": 5}),
        ] {
            let out = registry
                .dispatch(&request(body), UnknownOperationPolicy::Acknowledge)
                .unwrap();
            assert_eq!(
                serde_json::to_value(&out).unwrap(),
                json!({"message": "Operation completed successfully"})
            );
        }
    }

    #[test]
    fn reject_policy_turns_unknown_names_into_errors() {
        let registry = OperationRegistry::with_builtins();
        let err = registry
            .dispatch(&request(json!({"operation": "pivot"})), UnknownOperationPolicy::Reject)
            .unwrap_err();
        assert!(matches!(
            err,
            UploadError::UnsupportedOperation { ref operation } if operation == "pivot"
        ));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn operation_names_are_case_sensitive() {
        let registry = OperationRegistry::with_builtins();
        let out = registry
            .dispatch(
                &request(json!({"operation": "SUMMARY"})),
                UnknownOperationPolicy::Acknowledge,
            )
            .unwrap();
        assert_eq!(out.message, GENERIC_ACK_MESSAGE);
        assert_eq!(Operation::from_name("summary"), Some(Operation::Summary));
        assert_eq!(Operation::from_name("Summary"), None);
    }

    #[test]
    fn registering_a_handler_extends_dispatch() {
        let mut registry = OperationRegistry::with_builtins();
        registry.register("echo", Arc::new(Echo));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["echo", "summary"]);

        let out = registry
            .dispatch(
                &request(json!({"operation": "echo", "column": "price"})),
                UnknownOperationPolicy::Reject,
            )
            .unwrap();
        assert_eq!(out, OperationResult::with_result("echoed", "price"));
    }

    #[test]
    fn non_object_bodies_are_malformed() {
        for body in [
            &b"[1,2]"[..],
            &b"null"[..],
            &b"\"summary\""[..],
            &b"{not json"[..],
            &b""[..],
        ] {
            let err = OperationRequest::from_json_slice(body).unwrap_err();
            assert!(matches!(err, UploadError::MalformedRequest { .. }), "body={body:?}");
            assert_eq!(err.status_code(), 500);
        }
    }
}
