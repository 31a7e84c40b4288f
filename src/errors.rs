//! Error types for the x402-swap library.
//!
//! Every failure surfaced by the client is a [`SwapError`], and every
//! [`SwapError`] carries exactly one [`ErrorCode`]. Server-reported failures are
//! turned into the matching variant by [`map_api_error`]; codes the client does
//! not know about are kept verbatim in [`SwapError::Api`] so callers can still
//! branch on them.

use crate::validation::ValidationError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Machine-readable error code, as sent by the swap service or assigned locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The server needed a field the request did not carry
    MissingField,
    /// The chain is not enabled
    UnsupportedChain,
    /// The chain pair is not enabled
    UnsupportedRoute,
    /// The server could not price the route
    QuoteFailed,
    /// The route was priced but cannot fill at the requested size
    InsufficientLiquidity,
    /// Amount below the allowed minimum
    AmountTooLow,
    /// Amount above the allowed maximum
    AmountTooHigh,
    /// Estimated gas cost exceeds the safety cutoff
    GasExceedsThreshold,
    /// Upstream bridge/relay service is degraded
    RelayUnavailable,
    /// The call needs an attached payment and none was found
    PaymentRequired,
    /// Request quota exceeded
    RateLimitExceeded,
    /// Transport-level failure without a structured server response
    NetworkError,
    /// Client-enforced deadline exceeded
    Timeout,
    /// Request rejected locally before any network call
    ValidationError,
    /// The server answered with a shape the client refuses to interpret
    InvalidResponse,
    /// Client configuration could not be applied
    ConfigError,
    /// A code this client version does not recognize, kept verbatim
    Unknown(String),
}

impl ErrorCode {
    /// Parses a wire code. Unrecognized codes become [`ErrorCode::Unknown`].
    pub fn parse(code: &str) -> Self {
        match code {
            "MISSING_FIELD" => Self::MissingField,
            "UNSUPPORTED_CHAIN" => Self::UnsupportedChain,
            "UNSUPPORTED_ROUTE" => Self::UnsupportedRoute,
            "QUOTE_FAILED" => Self::QuoteFailed,
            "INSUFFICIENT_LIQUIDITY" => Self::InsufficientLiquidity,
            "AMOUNT_TOO_LOW" => Self::AmountTooLow,
            "AMOUNT_TOO_HIGH" => Self::AmountTooHigh,
            "GAS_EXCEEDS_THRESHOLD" => Self::GasExceedsThreshold,
            "RELAY_UNAVAILABLE" => Self::RelayUnavailable,
            "PAYMENT_REQUIRED" => Self::PaymentRequired,
            "RATE_LIMIT_EXCEEDED" => Self::RateLimitExceeded,
            "NETWORK_ERROR" => Self::NetworkError,
            "TIMEOUT" => Self::Timeout,
            "VALIDATION_ERROR" => Self::ValidationError,
            "INVALID_RESPONSE" => Self::InvalidResponse,
            "CONFIG_ERROR" => Self::ConfigError,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns the wire representation of the code.
    pub fn as_str(&self) -> &str {
        match self {
            Self::MissingField => "MISSING_FIELD",
            Self::UnsupportedChain => "UNSUPPORTED_CHAIN",
            Self::UnsupportedRoute => "UNSUPPORTED_ROUTE",
            Self::QuoteFailed => "QUOTE_FAILED",
            Self::InsufficientLiquidity => "INSUFFICIENT_LIQUIDITY",
            Self::AmountTooLow => "AMOUNT_TOO_LOW",
            Self::AmountTooHigh => "AMOUNT_TOO_HIGH",
            Self::GasExceedsThreshold => "GAS_EXCEEDS_THRESHOLD",
            Self::RelayUnavailable => "RELAY_UNAVAILABLE",
            Self::PaymentRequired => "PAYMENT_REQUIRED",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::NetworkError => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::Unknown(code) => code,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-facing payload attached to every server-side and transport error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Human-readable message, preserved verbatim from the server when present
    pub message: String,

    /// Optional hint on how to recover
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Optional structured details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorInfo {
    /// Creates an `ErrorInfo` carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Attaches a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attaches structured details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Main error type for swap client operations.
#[derive(Error, Debug)]
pub enum SwapError {
    /// Request rejected locally, no network call was made
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Server reported a missing required field
    #[error("Missing field: {0}")]
    MissingField(ErrorInfo),

    /// Chain not enabled
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(ErrorInfo),

    /// Chain pair not enabled
    #[error("Unsupported route: {0}")]
    UnsupportedRoute(ErrorInfo),

    /// Route could not be priced
    #[error("Quote failed: {0}")]
    QuoteFailed(ErrorInfo),

    /// Route cannot fill at the requested size
    #[error("Insufficient liquidity: {0}")]
    InsufficientLiquidity(ErrorInfo),

    /// Amount below the minimum
    #[error("Amount too low: {0}")]
    AmountTooLow(ErrorInfo),

    /// Amount above the maximum
    #[error("Amount too high: {0}")]
    AmountTooHigh(ErrorInfo),

    /// Gas estimate above the safety cutoff
    #[error("Gas exceeds threshold: {0}")]
    GasExceedsThreshold(ErrorInfo),

    /// Upstream relay degraded
    #[error("Relay unavailable: {0}")]
    RelayUnavailable(ErrorInfo),

    /// Payment required and none attached
    #[error("Payment required: {0}")]
    PaymentRequired(ErrorInfo),

    /// Quota exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(ErrorInfo),

    /// Transport failure without a structured server response
    #[error("Network error: {info}")]
    Network {
        /// Message and details
        info: ErrorInfo,
        /// Underlying cause, when there is one
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Client-enforced deadline exceeded
    #[error("Timeout exceeded: {0}")]
    Timeout(ErrorInfo),

    /// Server error carrying a code this client does not recognize
    #[error("{code}: {info}")]
    Api {
        /// The wire code, unchanged
        code: String,
        /// Message and suggestion from the envelope
        info: ErrorInfo,
    },

    /// Execute response was neither EVM-source nor Solana-source
    #[error("Unclassified execute response: {reason}")]
    UnclassifiedResponse {
        /// Identifier returned alongside the ambiguous payload, if any
        request_id: Option<String>,
        /// Why the response was rejected
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for swap client operations.
pub type Result<T> = std::result::Result<T, SwapError>;

impl SwapError {
    /// Creates a network error without an underlying cause.
    pub fn network(message: impl Into<String>) -> Self {
        SwapError::Network {
            info: ErrorInfo::new(message),
            source: None,
        }
    }

    /// Creates a network error wrapping `source`.
    pub fn network_from<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SwapError::Network {
            info: ErrorInfo::new(message),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        SwapError::Timeout(ErrorInfo::new(message))
    }

    /// Builds the variant matching `code`, keeping `info` as-is.
    pub fn from_code(code: ErrorCode, info: ErrorInfo) -> Self {
        match code {
            ErrorCode::MissingField => SwapError::MissingField(info),
            ErrorCode::UnsupportedChain => SwapError::UnsupportedChain(info),
            ErrorCode::UnsupportedRoute => SwapError::UnsupportedRoute(info),
            ErrorCode::QuoteFailed => SwapError::QuoteFailed(info),
            ErrorCode::InsufficientLiquidity => SwapError::InsufficientLiquidity(info),
            ErrorCode::AmountTooLow => SwapError::AmountTooLow(info),
            ErrorCode::AmountTooHigh => SwapError::AmountTooHigh(info),
            ErrorCode::GasExceedsThreshold => SwapError::GasExceedsThreshold(info),
            ErrorCode::RelayUnavailable => SwapError::RelayUnavailable(info),
            ErrorCode::PaymentRequired => SwapError::PaymentRequired(info),
            ErrorCode::RateLimitExceeded => SwapError::RateLimitExceeded(info),
            ErrorCode::NetworkError => SwapError::Network { info, source: None },
            ErrorCode::Timeout => SwapError::Timeout(info),
            // Local-only codes arriving from a server are passed through untouched.
            other => SwapError::Api {
                code: other.as_str().to_string(),
                info,
            },
        }
    }

    /// Returns the error code of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SwapError::Validation(_) => ErrorCode::ValidationError,
            SwapError::MissingField(_) => ErrorCode::MissingField,
            SwapError::UnsupportedChain(_) => ErrorCode::UnsupportedChain,
            SwapError::UnsupportedRoute(_) => ErrorCode::UnsupportedRoute,
            SwapError::QuoteFailed(_) => ErrorCode::QuoteFailed,
            SwapError::InsufficientLiquidity(_) => ErrorCode::InsufficientLiquidity,
            SwapError::AmountTooLow(_) => ErrorCode::AmountTooLow,
            SwapError::AmountTooHigh(_) => ErrorCode::AmountTooHigh,
            SwapError::GasExceedsThreshold(_) => ErrorCode::GasExceedsThreshold,
            SwapError::RelayUnavailable(_) => ErrorCode::RelayUnavailable,
            SwapError::PaymentRequired(_) => ErrorCode::PaymentRequired,
            SwapError::RateLimitExceeded(_) => ErrorCode::RateLimitExceeded,
            SwapError::Network { .. } => ErrorCode::NetworkError,
            SwapError::Timeout(_) => ErrorCode::Timeout,
            SwapError::Api { code, .. } => ErrorCode::Unknown(code.clone()),
            SwapError::UnclassifiedResponse { .. } => ErrorCode::InvalidResponse,
            SwapError::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Returns the structured payload, if this variant carries one.
    pub fn info(&self) -> Option<&ErrorInfo> {
        match self {
            SwapError::MissingField(info)
            | SwapError::UnsupportedChain(info)
            | SwapError::UnsupportedRoute(info)
            | SwapError::QuoteFailed(info)
            | SwapError::InsufficientLiquidity(info)
            | SwapError::AmountTooLow(info)
            | SwapError::AmountTooHigh(info)
            | SwapError::GasExceedsThreshold(info)
            | SwapError::RelayUnavailable(info)
            | SwapError::PaymentRequired(info)
            | SwapError::RateLimitExceeded(info)
            | SwapError::Timeout(info) => Some(info),
            SwapError::Network { info, .. } | SwapError::Api { info, .. } => Some(info),
            SwapError::Validation(_)
            | SwapError::UnclassifiedResponse { .. }
            | SwapError::Config(_) => None,
        }
    }

    /// Returns the human message, without the variant prefix used by `Display`.
    pub fn message(&self) -> String {
        match self.info() {
            Some(info) => info.message.clone(),
            None => match self {
                SwapError::Validation(err) => err.to_string(),
                SwapError::UnclassifiedResponse { reason, .. } => reason.clone(),
                SwapError::Config(msg) => msg.clone(),
                _ => self.to_string(),
            },
        }
    }

    /// Returns the recovery suggestion, if any.
    pub fn suggestion(&self) -> Option<&str> {
        self.info().and_then(|info| info.suggestion.as_deref())
    }

    /// Returns the structured details, if any.
    pub fn details(&self) -> Option<&Value> {
        self.info().and_then(|info| info.details.as_ref())
    }
}

impl From<reqwest::Error> for SwapError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SwapError::Timeout(ErrorInfo::new(err.to_string()))
        } else {
            SwapError::network_from(err.to_string(), err)
        }
    }
}

impl From<serde_json::Error> for SwapError {
    fn from(err: serde_json::Error) -> Self {
        SwapError::network_from(format!("Malformed response body: {}", err), err)
    }
}

impl From<base64::DecodeError> for SwapError {
    fn from(err: base64::DecodeError) -> Self {
        SwapError::network_from(format!("Invalid base64 payload: {}", err), err)
    }
}

impl From<url::ParseError> for SwapError {
    fn from(err: url::ParseError) -> Self {
        SwapError::Config(format!("Invalid URL: {}", err))
    }
}

/// Maps an HTTP status and (possibly absent) error envelope to a [`SwapError`].
///
/// The envelope is expected as `{ "error": { "code", "message", "suggestion?", "details?" } }`.
/// Resolution order:
///
/// 1. a recognized `code` yields the matching variant, message and suggestion kept verbatim;
/// 2. an unrecognized `code` yields [`SwapError::Api`] with the code unchanged;
/// 3. without a code the status decides: 402 payment required, 404 unsupported route,
///    429 rate limited, 5xx relay unavailable, anything else a network error.
///
/// Never panics, whatever the body looks like.
///
/// # Examples
///
/// ```
/// use x402_swap::errors::{map_api_error, ErrorCode};
/// use serde_json::json;
///
/// let err = map_api_error(400, Some(&json!({
///     "error": { "code": "AMOUNT_TOO_LOW", "message": "Minimum is 1 USDC" }
/// })));
/// assert_eq!(err.code(), ErrorCode::AmountTooLow);
/// assert_eq!(err.message(), "Minimum is 1 USDC");
///
/// let err = map_api_error(402, None);
/// assert_eq!(err.code(), ErrorCode::PaymentRequired);
/// ```
pub fn map_api_error(status: u16, body: Option<&Value>) -> SwapError {
    let envelope = body.and_then(|b| b.get("error"));

    let (code, mut info) = match envelope {
        Some(Value::Object(obj)) => {
            let code = obj
                .get("code")
                .and_then(Value::as_str)
                .filter(|c| !c.is_empty())
                .map(str::to_string);
            let info = ErrorInfo {
                message: obj
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                suggestion: obj
                    .get("suggestion")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                details: obj.get("details").filter(|d| !d.is_null()).cloned(),
            };
            (code, info)
        }
        Some(Value::String(message)) => (None, ErrorInfo::new(message.clone())),
        _ => (None, ErrorInfo::default()),
    };

    if info.message.is_empty() {
        info.message = status_text(status);
    }

    match code {
        Some(code) => SwapError::from_code(ErrorCode::parse(&code), info),
        None => {
            let code = match status {
                402 => ErrorCode::PaymentRequired,
                404 => ErrorCode::UnsupportedRoute,
                429 => ErrorCode::RateLimitExceeded,
                s if s >= 500 => ErrorCode::RelayUnavailable,
                _ => ErrorCode::NetworkError,
            };
            SwapError::from_code(code, info)
        }
    }
}

fn status_text(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(|reason| format!("HTTP {} {}", status, reason))
        .unwrap_or_else(|| format!("HTTP {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_display() {
        let err = SwapError::QuoteFailed(ErrorInfo::new("no route"));
        assert_eq!(err.to_string(), "Quote failed: no route");
        assert_eq!(err.message(), "no route");
    }

    #[test]
    fn test_error_code_round_trip() {
        for code in [
            "MISSING_FIELD",
            "UNSUPPORTED_CHAIN",
            "UNSUPPORTED_ROUTE",
            "QUOTE_FAILED",
            "INSUFFICIENT_LIQUIDITY",
            "AMOUNT_TOO_LOW",
            "AMOUNT_TOO_HIGH",
            "GAS_EXCEEDS_THRESHOLD",
            "RELAY_UNAVAILABLE",
            "PAYMENT_REQUIRED",
            "RATE_LIMIT_EXCEEDED",
            "NETWORK_ERROR",
            "TIMEOUT",
        ] {
            let parsed = ErrorCode::parse(code);
            assert!(!matches!(parsed, ErrorCode::Unknown(_)), "{} unknown", code);
            assert_eq!(parsed.as_str(), code);
        }
    }

    #[test]
    fn test_recognized_code_keeps_message_and_suggestion() {
        let body = json!({
            "error": {
                "code": "INSUFFICIENT_LIQUIDITY",
                "message": "Pool too shallow",
                "suggestion": "Try a smaller amount"
            }
        });
        let err = map_api_error(400, Some(&body));
        assert!(matches!(err, SwapError::InsufficientLiquidity(_)));
        assert_eq!(err.message(), "Pool too shallow");
        assert_eq!(err.suggestion(), Some("Try a smaller amount"));
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let body = json!({"error": {"code": "SANCTIONED_ADDRESS", "message": "blocked"}});
        let err = map_api_error(403, Some(&body));
        assert_eq!(err.code(), ErrorCode::Unknown("SANCTIONED_ADDRESS".to_string()));
        assert_eq!(err.code().as_str(), "SANCTIONED_ADDRESS");
        assert_eq!(err.message(), "blocked");
    }

    #[test]
    fn test_payment_required_without_code() {
        let err = map_api_error(402, Some(&json!({})));
        assert_eq!(err.code(), ErrorCode::PaymentRequired);

        let err = map_api_error(402, Some(&json!({"error": {"message": "x"}})));
        assert_eq!(err.code(), ErrorCode::PaymentRequired);
        assert_eq!(err.message(), "x");
    }

    #[test]
    fn test_status_fallbacks() {
        assert_eq!(map_api_error(404, None).code(), ErrorCode::UnsupportedRoute);
        assert_eq!(map_api_error(429, None).code(), ErrorCode::RateLimitExceeded);
        assert_eq!(map_api_error(500, None).code(), ErrorCode::RelayUnavailable);
        assert_eq!(map_api_error(503, None).code(), ErrorCode::RelayUnavailable);
        assert_eq!(map_api_error(400, None).code(), ErrorCode::NetworkError);
        assert_eq!(map_api_error(418, None).code(), ErrorCode::NetworkError);
    }

    #[test]
    fn test_null_body_never_panics() {
        for status in [0u16, 100, 200, 302, 400, 401, 402, 404, 429, 500, 599, 999] {
            let err = map_api_error(status, Some(&Value::Null));
            assert!(!err.message().is_empty());
            let _ = map_api_error(status, None);
        }
    }

    #[test]
    fn test_odd_envelopes() {
        let err = map_api_error(400, Some(&json!({"error": "plain text"})));
        assert_eq!(err.code(), ErrorCode::NetworkError);
        assert_eq!(err.message(), "plain text");

        let err = map_api_error(500, Some(&json!([1, 2, 3])));
        assert_eq!(err.code(), ErrorCode::RelayUnavailable);
        assert_eq!(err.message(), "HTTP 500 Internal Server Error");

        let err = map_api_error(429, Some(&json!({"error": {"code": 42}})));
        assert_eq!(err.code(), ErrorCode::RateLimitExceeded);
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: SwapError = json_err.into();
        assert_eq!(err.code(), ErrorCode::NetworkError);
        assert!(std::error::Error::source(&err).is_some());
    }
}
