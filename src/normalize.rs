//! Exception normalization boundary
//!
//! Converts heterogeneous failures (parameter validation, backend API faults,
//! internal errors) into a closed, user-facing taxonomy with stable
//! machine-readable kinds and templated messages. The mapping is deterministic
//! and total: anything unrecognized becomes [`ErrorKind::UnexpectedFailure`]
//! rather than leaking raw diagnostics. No retries happen here.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::confirmation::ConfirmationChallenge;
use crate::error::Error;

/// Template for single-parameter validation failures
const MSG_INVALID_PARAMETER: &str =
    "Invalid parameter: {}. Please check the parameter values and try again.";
/// Template for multi-parameter validation failures
const MSG_INVALID_PARAMETERS: &str =
    "Invalid parameters: {}. Please check the parameter values and try again.";
/// Template for absent or inaccessible resources
const MSG_RESOURCE_NOT_FOUND: &str = "Resource not found: {}. Please check that the resource exists and you have permission to access it.";
/// Message for destructive calls lacking their confirmation
const MSG_MISSING_CONFIRMATION: &str = "Missing confirmation for destructive operation. Please provide the confirmation parameter with the required value.";
/// Message for writes attempted in read-only mode
const MSG_READONLY_MODE: &str = "This operation is not allowed in read-only mode. Please run the server with --no-readonly to enable write operations.";
/// Template for unclassified failures
const MSG_UNEXPECTED: &str =
    "Unexpected error: {}. Please try again or check the logs for more information.";

/// Closed user-facing error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Single bad argument
    InvalidParameter,
    /// Multiple or combined bad arguments
    InvalidParameters,
    /// Identified resource absent or inaccessible
    ResourceNotFound,
    /// Destructive call lacking or mismatching its required confirmation;
    /// recoverable by resubmitting with the exact value
    MissingConfirmation,
    /// Write operation attempted while the server is read-only
    ReadOnlyMode,
    /// Unclassified backend or internal fault
    UnexpectedFailure,
}

/// A failure remapped to the stable taxonomy
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedError {
    /// Taxonomy kind
    pub kind: ErrorKind,
    /// Interpolated human-readable message
    pub message: String,
    /// The tool operation that failed
    pub operation: String,
    /// Backend error code, when the failure originated there
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl NormalizedError {
    /// Serialize to the JSON payload returned to the caller
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            json!({
                "kind": "unexpected_failure",
                "message": self.message,
            })
        })
    }
}

/// Map an internal error to exactly one taxonomy kind with its message
///
/// Logs at the boundary: challenges at info, read-only rejections at warn,
/// everything else at error.
pub fn normalize(operation: &str, err: &Error) -> NormalizedError {
    match err {
        Error::ConfirmationRequired(challenge) => {
            info!(operation, identifier = %challenge.identifier, "confirmation required");
            NormalizedError {
                kind: ErrorKind::MissingConfirmation,
                message: MSG_MISSING_CONFIRMATION.to_string(),
                operation: operation.to_string(),
                error_code: None,
            }
        }
        Error::ReadOnly { operation: op } => {
            warn!(operation = %op, "operation blocked in read-only mode");
            NormalizedError {
                kind: ErrorKind::ReadOnlyMode,
                message: MSG_READONLY_MODE.to_string(),
                operation: operation.to_string(),
                error_code: None,
            }
        }
        Error::InvalidParameter(detail) => NormalizedError {
            kind: ErrorKind::InvalidParameter,
            message: MSG_INVALID_PARAMETER.replacen("{}", detail, 1),
            operation: operation.to_string(),
            error_code: None,
        },
        Error::InvalidParameters(detail) => NormalizedError {
            kind: ErrorKind::InvalidParameters,
            message: MSG_INVALID_PARAMETERS.replacen("{}", detail, 1),
            operation: operation.to_string(),
            error_code: None,
        },
        Error::ResourceNotFound(identifier) => NormalizedError {
            kind: ErrorKind::ResourceNotFound,
            message: MSG_RESOURCE_NOT_FOUND.replacen("{}", identifier, 1),
            operation: operation.to_string(),
            error_code: None,
        },
        Error::Api { code, message } => {
            error!(operation, code = %code, message = %message, "control-plane call failed");
            let kind = classify_api_code(code);
            let template = match kind {
                ErrorKind::ResourceNotFound => MSG_RESOURCE_NOT_FOUND,
                ErrorKind::InvalidParameter => MSG_INVALID_PARAMETER,
                ErrorKind::InvalidParameters => MSG_INVALID_PARAMETERS,
                _ => MSG_UNEXPECTED,
            };
            NormalizedError {
                kind,
                message: template.replacen("{}", message, 1),
                operation: operation.to_string(),
                error_code: Some(code.clone()),
            }
        }
        other => {
            error!(operation, error = %other, "operation failed unexpectedly");
            NormalizedError {
                kind: ErrorKind::UnexpectedFailure,
                message: MSG_UNEXPECTED.replacen("{}", &other.to_string(), 1),
                operation: operation.to_string(),
                error_code: None,
            }
        }
    }
}

/// Classify a backend-reported error code
///
/// The RDS-style API reports not-found conditions as `*NotFound` /
/// `*NotFoundFault` and validation failures as `InvalidParameterValue` /
/// `InvalidParameterCombination`. Anything else is unclassified.
fn classify_api_code(code: &str) -> ErrorKind {
    if code.ends_with("NotFound") || code.ends_with("NotFoundFault") {
        ErrorKind::ResourceNotFound
    } else if code == "InvalidParameterValue" {
        ErrorKind::InvalidParameter
    } else if code == "InvalidParameterCombination" {
        ErrorKind::InvalidParameters
    } else {
        ErrorKind::UnexpectedFailure
    }
}

/// Build the JSON payload for a confirmation challenge
///
/// Challenges are not failures from the protocol's point of view: the payload
/// tells the caller exactly how to resubmit, and carries the taxonomy kind so
/// every non-success response stays structured.
pub fn challenge_payload(challenge: &ConfirmationChallenge) -> Value {
    json!({
        "kind": ErrorKind::MissingConfirmation,
        "requires_confirmation": true,
        "operation": challenge.operation,
        "resource_type": challenge.resource_type,
        "identifier": challenge.identifier,
        "risk_level": challenge.risk_level,
        "required_confirmation": challenge.required_confirmation,
        "impact": challenge.impact,
        "warning": challenge.warning,
        "message": format!(
            "{}\n\nTo confirm, please call this tool again with the confirmation parameter set to: {}",
            challenge.warning, challenge.required_confirmation
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirmation::{ConfirmationRequest, STOP_INSTANCE};

    #[test]
    fn not_found_code_maps_to_resource_not_found() {
        let err = Error::api("DBInstanceNotFoundFault", "DBInstance db-9 not found");
        let normalized = normalize("describe_db_instance", &err);
        assert_eq!(normalized.kind, ErrorKind::ResourceNotFound);
        assert!(normalized.message.contains("db-9"));
        assert_eq!(normalized.error_code.as_deref(), Some("DBInstanceNotFoundFault"));
    }

    #[test]
    fn unrecognized_code_maps_to_unexpected() {
        let err = Error::api("ThrottlingException", "Rate exceeded for db-9");
        let normalized = normalize("list_db_instances", &err);
        assert_eq!(normalized.kind, ErrorKind::UnexpectedFailure);
        assert!(normalized.message.contains("db-9"));
    }

    #[test]
    fn invalid_parameter_codes_are_distinguished() {
        let one = normalize(
            "modify_db_instance",
            &Error::api("InvalidParameterValue", "bad storage size"),
        );
        assert_eq!(one.kind, ErrorKind::InvalidParameter);

        let many = normalize(
            "modify_db_instance",
            &Error::api("InvalidParameterCombination", "incompatible options"),
        );
        assert_eq!(many.kind, ErrorKind::InvalidParameters);
    }

    #[test]
    fn validation_errors_map_directly() {
        let normalized = normalize(
            "read_db_log_file",
            &Error::InvalidParameter("number_of_lines must be between 1 and 9999".to_string()),
        );
        assert_eq!(normalized.kind, ErrorKind::InvalidParameter);
        assert!(normalized.message.contains("number_of_lines"));
    }

    #[test]
    fn readonly_maps_to_readonly_kind() {
        let err = Error::ReadOnly {
            operation: "delete_db_instance".to_string(),
        };
        let normalized = normalize("delete_db_instance", &err);
        assert_eq!(normalized.kind, ErrorKind::ReadOnlyMode);
        assert!(normalized.message.contains("--no-readonly"));
    }

    #[test]
    fn confirmation_required_maps_to_missing_confirmation() {
        let err = STOP_INSTANCE
            .evaluate(&ConfirmationRequest {
                resource_type: "DB instance",
                identifier: "db-1",
                confirmation: None,
            })
            .unwrap_err();
        let normalized = normalize("stop_db_instance", &err);
        assert_eq!(normalized.kind, ErrorKind::MissingConfirmation);
    }

    #[test]
    fn challenge_payload_names_required_value() {
        let err = STOP_INSTANCE
            .evaluate(&ConfirmationRequest {
                resource_type: "DB instance",
                identifier: "db-1",
                confirmation: None,
            })
            .unwrap_err();
        let Error::ConfirmationRequired(challenge) = err else {
            panic!("expected challenge");
        };
        let payload = challenge_payload(&challenge);
        assert_eq!(payload["requires_confirmation"], true);
        assert_eq!(payload["required_confirmation"], "CONFIRM_STOP");
        assert_eq!(payload["kind"], "missing_confirmation");
        assert_eq!(payload["risk_level"], "high");
    }
}
