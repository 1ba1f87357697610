//! # API Error Type
//!
//! Unified error type for editor commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Editor                             │
//! │                                                                         │
//! │  View                        Rust Host                                  │
//! │  ────                        ─────────                                  │
//! │                                                                         │
//! │  submit_invoice()                                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Gateway Error? ─── GatewayError::Rejected("...") ──┐           │  │
//! │  │         │                                           │           │  │
//! │  │         ▼                                           ▼           │  │
//! │  │  Bad Input? ─── CoreError::MalformedElementId ──── ApiError ───►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  e.code = "GATEWAY_ERROR", e.message = "Invoice rejected: ..."          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Structural edits never produce an `ApiError`; they are no-ops when their
//! preconditions do not hold.

use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

use invoicer_core::CoreError;

use crate::gateway::GatewayError;

/// API error returned from editor commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Invoice not found: 42"
/// }
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Invoice (or other resource) does not exist
    NotFound,

    /// Input could not be understood
    ValidationError,

    /// Persistence collaborator failed or refused
    GatewayError,

    /// PDF generation failed
    PdfError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Json(e) => ApiError::validation(format!("Invalid invoice data: {}", e)),
            CoreError::MalformedElementId(id) => ApiError::validation(format!("Unknown field: {}", id)),
            CoreError::ItemOutOfRange { index, .. } => {
                ApiError::not_found("Item", &index.to_string())
            }
            CoreError::SubItemOutOfRange {
                item_index,
                sub_index,
            } => ApiError::not_found("Sub-item", &format!("{}.{}", item_index, sub_index)),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts collaborator errors to API errors.
impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(id) => ApiError::not_found("Invoice", &id.to_string()),
            GatewayError::Rejected(reason) => ApiError::new(
                ErrorCode::GatewayError,
                format!("Invoice rejected: {}", reason),
            ),
            GatewayError::Unavailable(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Invoice service unavailable: {}", e);
                ApiError::new(ErrorCode::GatewayError, "Invoice service unavailable")
            }
            GatewayError::Pdf(e) => {
                tracing::error!("PDF generation failed: {}", e);
                ApiError::new(ErrorCode::PdfError, "PDF generation failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Config Error
// =============================================================================

/// Errors raised while loading the editor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Convenience type alias for command results.
pub type ApiResult<T> = Result<T, ApiError>;
