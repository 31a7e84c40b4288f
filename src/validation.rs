//! Local request validation.
//!
//! These checks run before any request leaves the process. They are pure: no I/O,
//! no allocation beyond the error value, and they report the first violated
//! constraint only.

use crate::types::QuoteRequest;
use thiserror::Error;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// A request failed local validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field is empty
    #[error("Missing required field: {field}")]
    MissingField {
        /// Wire name of the field
        field: &'static str,
    },

    /// Amount is not a positive plain decimal
    #[error("Amount must be a positive number, got '{value}'")]
    InvalidAmount {
        /// The rejected amount
        value: String,
    },

    /// Address is neither EVM hex nor base58
    #[error("Invalid address for {field}: '{value}'")]
    InvalidAddress {
        /// Wire name of the field
        field: &'static str,
        /// The rejected address
        value: String,
    },

    /// Slippage outside `[0, 1]`
    #[error("Slippage tolerance must be between 0 and 1, got {value}")]
    InvalidSlippage {
        /// The rejected slippage
        value: f64,
    },
}

impl ValidationError {
    /// Returns the wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field } => field,
            ValidationError::InvalidAmount { .. } => "amount",
            ValidationError::InvalidAddress { field, .. } => field,
            ValidationError::InvalidSlippage { .. } => "slippageTolerance",
        }
    }
}

/// Validates a quote (or execute) request.
///
/// Fields are checked in declaration order and the first failure is returned.
///
/// # Examples
///
/// ```
/// use x402_swap::types::QuoteRequest;
/// use x402_swap::validation::validate_quote_request;
///
/// let request = QuoteRequest::new(
///     "8453",
///     "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
///     "solana",
///     "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
///     "1000000",
///     "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEbb",
///     "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
/// );
/// assert!(validate_quote_request(&request).is_ok());
/// ```
pub fn validate_quote_request(request: &QuoteRequest) -> Result<(), ValidationError> {
    require("sourceChainId", &request.source_chain_id)?;
    require("sourceToken", &request.source_token)?;
    require("destinationChainId", &request.destination_chain_id)?;
    require("destinationToken", &request.destination_token)?;
    require("amount", &request.amount)?;
    validate_amount(&request.amount)?;
    require("senderAddress", &request.sender_address)?;
    require("recipientAddress", &request.recipient_address)?;
    if let Some(slippage) = request.slippage_tolerance {
        validate_slippage(slippage)?;
    }
    Ok(())
}

/// Checks that `amount` is a positive decimal written without sign or exponent.
///
/// Accepts `"1000000"` and `"0.25"`; rejects `"0"`, `"-5"`, `"1e10"`, `"Infinity"`.
pub fn validate_amount(amount: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidAmount {
        value: amount.to_string(),
    };

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (amount, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !fraction.map_or(true, all_digits) {
        return Err(invalid());
    }

    let non_zero = amount.bytes().any(|b| (b'1'..=b'9').contains(&b));
    if !non_zero {
        return Err(invalid());
    }
    Ok(())
}

/// Checks that `address` is an EVM address (`0x` + 40 hex digits) or a base58
/// string of 32 to 44 characters.
pub fn validate_address(field: &'static str, address: &str) -> Result<(), ValidationError> {
    if is_evm_address(address) || is_base58_address(address) {
        Ok(())
    } else {
        Err(ValidationError::InvalidAddress {
            field,
            value: address.to_string(),
        })
    }
}

/// Checks that `slippage` is finite and within `[0, 1]`.
pub fn validate_slippage(slippage: f64) -> Result<(), ValidationError> {
    if slippage.is_finite() && (0.0..=1.0).contains(&slippage) {
        Ok(())
    } else {
        Err(ValidationError::InvalidSlippage { value: slippage })
    }
}

/// Checks that a swap identifier is present.
pub fn validate_request_id(id: &str) -> Result<(), ValidationError> {
    require("requestId", id)
}

/// Returns true for `0x` followed by exactly 40 hex digits.
pub fn is_evm_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex_part) => hex_part.len() == 40 && hex::decode(hex_part).is_ok(),
        None => false,
    }
}

/// Returns true for 32 to 44 characters drawn from the base58 alphabet.
pub fn is_base58_address(address: &str) -> bool {
    (32..=44).contains(&address.len()) && address.chars().all(|c| BASE58_ALPHABET.contains(c))
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(())
    }
}
