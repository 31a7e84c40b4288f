//! Utility functions for swap client operations.
//!
//! This module provides helpers for encoding/decoding, conversions, and the
//! lenient deserializers used by the wire types.

use crate::errors::{Result, SwapError};
use crate::types::PaymentPayload;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ethers::types::{Address, U256};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Encodes a PaymentPayload as Base64 JSON for the X-PAYMENT header.
///
/// # Examples
///
/// ```
/// use x402_swap::types::PaymentPayload;
/// use x402_swap::utils::{decode_payment_header, encode_payment_header};
/// use serde_json::json;
///
/// let payload = PaymentPayload {
///     x402_version: 1,
///     scheme: "exact".to_string(),
///     network: "base".to_string(),
///     payload: json!({}),
/// };
///
/// let encoded = encode_payment_header(&payload).unwrap();
/// assert_eq!(decode_payment_header(&encoded).unwrap().network, "base");
/// ```
pub fn encode_payment_header(payload: &PaymentPayload) -> Result<String> {
    let json = serde_json::to_string(payload)?;
    Ok(BASE64.encode(json.as_bytes()))
}

/// Decodes a Base64 JSON PaymentPayload from the X-PAYMENT header.
pub fn decode_payment_header(encoded: &str) -> Result<PaymentPayload> {
    let json: Value = decode_base64_json(encoded)?;
    Ok(serde_json::from_value(json)?)
}

/// Decodes a Base64 JSON value, e.g. the X-PAYMENT-RESPONSE header.
pub fn decode_base64_json(encoded: &str) -> Result<Value> {
    let decoded = decode_base64(encoded)?;
    Ok(serde_json::from_slice(&decoded)?)
}

/// Decodes standard Base64.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    Ok(BASE64.decode(encoded.trim().as_bytes())?)
}

/// Decodes hex with an optional `0x` prefix.
pub fn decode_hex(data: &str) -> Result<Vec<u8>> {
    let stripped = data
        .strip_prefix("0x")
        .or_else(|| data.strip_prefix("0X"))
        .unwrap_or(data);
    hex::decode(stripped)
        .map_err(|e| SwapError::network(format!("Invalid hex data '{}': {}", data, e)))
}

/// Converts a string representation of a uint256 to ethers U256.
///
/// # Examples
///
/// ```
/// use x402_swap::utils::string_to_u256;
///
/// assert_eq!(string_to_u256("1000000").unwrap(), 1000000u64.into());
/// assert_eq!(string_to_u256("0x0f4240").unwrap(), 1000000u64.into());
/// ```
pub fn string_to_u256(s: &str) -> Result<U256> {
    if let Ok(value) = U256::from_dec_str(s) {
        return Ok(value);
    }

    if s.starts_with("0x") || s.starts_with("0X") {
        if let Ok(value) = U256::from_str(s) {
            return Ok(value);
        }
    }

    Err(SwapError::network(format!("Cannot parse '{}' as U256", s)))
}

/// Validates and parses an Ethereum address.
pub fn parse_address(addr: &str) -> Result<Address> {
    Address::from_str(addr)
        .map_err(|e| SwapError::network(format!("Invalid address '{}': {}", addr, e)))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

/// Deserializes a JSON string or number into a `String`.
pub fn deserialize_string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

/// Deserializes an optional JSON string or number into an `Option<String>`.
pub fn deserialize_opt_string_or_number<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}

/// Deserializes a JSON number or numeric string into a `u64`.
pub fn deserialize_u64_from_any<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::from(StringOrNumber::deserialize(deserializer)?);
    raw.parse::<u64>()
        .map_err(|_| serde::de::Error::custom(format!("expected an unsigned integer, got '{}'", raw)))
}
