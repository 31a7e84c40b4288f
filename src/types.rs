//! Core type definitions for the swap protocol.
//!
//! This module contains the request and response bodies exchanged with the swap
//! service, the structural discriminator for execute responses, and the x402
//! payment types used when an endpoint answers `402 Payment Required`.

use crate::errors::{Result, SwapError};
use crate::utils::{
    decode_base64, decode_hex, deserialize_opt_string_or_number, deserialize_u64_from_any,
    parse_address, string_to_u256,
};
use chrono::{DateTime, Utc};
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Version of the x402 protocol spoken by [`crate::payment::PaymentFetch`].
pub const X402_VERSION: u32 = 1;

/// Request body for both `/api/swap/quote` and `/api/swap/execute`.
///
/// # Examples
///
/// ```
/// use x402_swap::types::QuoteRequest;
///
/// let request = QuoteRequest::new(
///     "8453",
///     "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
///     "solana",
///     "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
///     "1000000",
///     "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEbb",
///     "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
/// )
/// .with_slippage(0.01);
///
/// assert!(request.validate().is_ok());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Chain holding the input asset
    pub source_chain_id: String,

    /// Input token address on the source chain
    pub source_token: String,

    /// Chain receiving the output asset
    pub destination_chain_id: String,

    /// Output token address on the destination chain
    pub destination_token: String,

    /// Input amount in the token's smallest unit, as a plain decimal string
    pub amount: String,

    /// Address paying the input amount
    pub sender_address: String,

    /// Address receiving the output amount
    pub recipient_address: String,

    /// Maximum accepted slippage, between 0 and 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slippage_tolerance: Option<f64>,
}

/// Execute takes the same body as quote; pricing is re-derived server-side.
pub type ExecuteSwapRequest = QuoteRequest;

impl QuoteRequest {
    /// Creates a request without slippage tolerance.
    pub fn new(
        source_chain_id: impl Into<String>,
        source_token: impl Into<String>,
        destination_chain_id: impl Into<String>,
        destination_token: impl Into<String>,
        amount: impl Into<String>,
        sender_address: impl Into<String>,
        recipient_address: impl Into<String>,
    ) -> Self {
        Self {
            source_chain_id: source_chain_id.into(),
            source_token: source_token.into(),
            destination_chain_id: destination_chain_id.into(),
            destination_token: destination_token.into(),
            amount: amount.into(),
            sender_address: sender_address.into(),
            recipient_address: recipient_address.into(),
            slippage_tolerance: None,
        }
    }

    /// Sets the slippage tolerance.
    pub fn with_slippage(mut self, slippage: f64) -> Self {
        self.slippage_tolerance = Some(slippage);
        self
    }

    /// Runs local validation, see [`crate::validation::validate_quote_request`].
    pub fn validate(&self) -> std::result::Result<(), crate::validation::ValidationError> {
        crate::validation::validate_quote_request(self)
    }
}

/// A single fee component: either a formatted string or a USD number.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum FeeValue {
    /// Pre-formatted amount, e.g. `"0.12 USDC"`
    Formatted(String),
    /// Value in USD
    Usd(f64),
}

impl fmt::Display for FeeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeValue::Formatted(s) => f.write_str(s),
            FeeValue::Usd(v) => write!(f, "${:.2}", v),
        }
    }
}

/// Named fee components. The set of names is open.
pub type FeeBreakdown = BTreeMap<String, FeeValue>;

/// Source and destination of a quoted route.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SwapRoute {
    /// Source chain
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub source_chain: Option<String>,
    /// Destination chain
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub destination_chain: Option<String>,
    /// Source token
    #[serde(default)]
    pub source_token: Option<String>,
    /// Destination token
    #[serde(default)]
    pub destination_token: Option<String>,
}

/// Response from `/api/swap/quote`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    /// Estimated output in the destination token's smallest unit
    pub estimated_output: String,

    /// Human-formatted estimated output
    #[serde(default)]
    pub estimated_output_formatted: Option<String>,

    /// Estimated settlement time in seconds
    #[serde(default)]
    pub estimated_time: Option<u64>,

    /// Fee breakdown
    #[serde(default)]
    pub fees: FeeBreakdown,

    /// Route description
    #[serde(default)]
    pub route: SwapRoute,

    /// Whether the route can currently be swapped
    #[serde(default = "default_supported")]
    pub supported: bool,
}

fn default_supported() -> bool {
    true
}

/// One EVM transaction to sign and submit, in order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvmTransaction {
    /// Destination contract
    pub to: String,

    /// Hex-encoded call data
    pub data: String,

    /// Native value in wei, decimal or `0x` hex
    #[serde(default = "zero_value")]
    pub value: String,

    /// Chain the transaction must be sent on
    #[serde(deserialize_with = "deserialize_u64_from_any")]
    pub chain_id: u64,

    /// What the transaction does, e.g. "Approve USDC"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn zero_value() -> String {
    "0".to_string()
}

impl EvmTransaction {
    /// Parses `to` as an EVM address.
    pub fn to_address(&self) -> Result<Address> {
        parse_address(&self.to)
    }

    /// Parses `value` as a uint256.
    pub fn value_u256(&self) -> Result<U256> {
        string_to_u256(&self.value)
    }

    /// Decodes the call data.
    pub fn data_bytes(&self) -> Result<Vec<u8>> {
        decode_hex(&self.data)
    }
}

/// Response from `/api/swap/execute`, exactly as sent on the wire.
///
/// The shape is a union without a tag: Solana-source swaps carry `transaction`,
/// EVM-source swaps carry `transactions`. Use [`ExecuteSwapResponse::classify`]
/// or [`ExecuteSwapResponse::into_prepared`] rather than inspecting the fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteSwapResponse {
    /// Identifier used to poll `/api/swap/{id}/status`
    #[serde(alias = "orderId", alias = "id")]
    pub request_id: String,

    /// Base64 partially-signed Solana transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,

    /// Ordered EVM transactions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<EvmTransaction>>,

    /// Source chain
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub source_chain_id: Option<String>,

    /// Estimated output in the destination token's smallest unit
    #[serde(default)]
    pub estimated_output: Option<String>,

    /// Estimated settlement time in seconds
    #[serde(default)]
    pub estimated_time: Option<u64>,

    /// Fee breakdown
    #[serde(default)]
    pub fees: FeeBreakdown,

    /// What the caller must do next
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Which signing flow an execute response requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Ordered EVM transactions
    Evm,
    /// One base64 Solana transaction
    Solana,
    /// Neither or both shapes present; must be rejected
    Unclassified,
}

/// Classifies an execute response by which transaction field is populated.
///
/// Exactly one of the two must be non-empty. Any other combination is
/// [`SourceKind::Unclassified`].
pub fn classify(response: &ExecuteSwapResponse) -> SourceKind {
    let has_single = response
        .transaction
        .as_deref()
        .map_or(false, |tx| !tx.is_empty());
    let has_list = response
        .transactions
        .as_ref()
        .map_or(false, |txs| !txs.is_empty());

    match (has_list, has_single) {
        (true, false) => SourceKind::Evm,
        (false, true) => SourceKind::Solana,
        _ => SourceKind::Unclassified,
    }
}

/// Fields shared by both prepared swap shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapSummary {
    /// Identifier for status polling
    pub request_id: String,
    /// Source chain
    pub source_chain_id: Option<String>,
    /// Estimated output
    pub estimated_output: Option<String>,
    /// Estimated settlement time in seconds
    pub estimated_time: Option<u64>,
    /// Fee breakdown
    pub fees: FeeBreakdown,
    /// Next-step instructions
    pub instructions: Option<String>,
}

/// EVM-source swap: sign and submit `transactions` sequentially.
#[derive(Debug, Clone, PartialEq)]
pub struct EvmSwap {
    /// Shared fields
    pub summary: SwapSummary,
    /// Transactions in submission order
    pub transactions: Vec<EvmTransaction>,
}

/// Solana-source swap: co-sign and submit one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SolanaSwap {
    /// Shared fields
    pub summary: SwapSummary,
    /// Base64 partially-signed transaction
    pub transaction: String,
}

impl SolanaSwap {
    /// Decodes the base64 transaction into raw bytes.
    pub fn transaction_bytes(&self) -> Result<Vec<u8>> {
        decode_base64(&self.transaction)
    }
}

/// A classified execute response.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedSwap {
    /// EVM-source
    Evm(EvmSwap),
    /// Solana-source
    Solana(SolanaSwap),
}

impl PreparedSwap {
    /// Shared fields of either shape.
    pub fn summary(&self) -> &SwapSummary {
        match self {
            PreparedSwap::Evm(swap) => &swap.summary,
            PreparedSwap::Solana(swap) => &swap.summary,
        }
    }

    /// Identifier for status polling.
    pub fn request_id(&self) -> &str {
        &self.summary().request_id
    }

    /// Which shape this is.
    pub fn kind(&self) -> SourceKind {
        match self {
            PreparedSwap::Evm(_) => SourceKind::Evm,
            PreparedSwap::Solana(_) => SourceKind::Solana,
        }
    }
}

impl ExecuteSwapResponse {
    /// See [`classify`].
    pub fn classify(&self) -> SourceKind {
        classify(self)
    }

    /// Converts into a [`PreparedSwap`], rejecting unclassified responses.
    pub fn into_prepared(self) -> Result<PreparedSwap> {
        let kind = self.classify();
        let summary = SwapSummary {
            request_id: self.request_id,
            source_chain_id: self.source_chain_id,
            estimated_output: self.estimated_output,
            estimated_time: self.estimated_time,
            fees: self.fees,
            instructions: self.instructions,
        };

        match (kind, self.transaction, self.transactions) {
            (SourceKind::Evm, _, Some(transactions)) => Ok(PreparedSwap::Evm(EvmSwap {
                summary,
                transactions,
            })),
            (SourceKind::Solana, Some(transaction), _) => Ok(PreparedSwap::Solana(SolanaSwap {
                summary,
                transaction,
            })),
            (_, transaction, transactions) => {
                let single = transaction.map_or(false, |tx| !tx.is_empty());
                let list = transactions.map_or(false, |txs| !txs.is_empty());
                let reason = if single && list {
                    "both `transaction` and `transactions` are present"
                } else {
                    "neither `transaction` nor `transactions` is populated"
                };
                Err(SwapError::UnclassifiedResponse {
                    request_id: Some(summary.request_id).filter(|id| !id.is_empty()),
                    reason: reason.to_string(),
                })
            }
        }
    }
}

/// Lifecycle state of a swap.
///
/// Unknown wire values are kept in [`SwapStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SwapStatus {
    /// Accepted, waiting for the source transaction
    Pending,
    /// Source transaction submitted
    Submitted,
    /// Bridging in progress
    Processing,
    /// Output delivered
    Completed,
    /// Swap failed
    Failed,
    /// Order expired before fill
    Expired,
    /// Order cancelled
    Cancelled,
    /// Order filled by a relayer
    Fulfilled,
    /// Input returned to the sender
    Refunded,
    /// Any other value, verbatim
    Other(String),
}

impl SwapStatus {
    /// Returns the wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            SwapStatus::Pending => "pending",
            SwapStatus::Submitted => "submitted",
            SwapStatus::Processing => "processing",
            SwapStatus::Completed => "completed",
            SwapStatus::Failed => "failed",
            SwapStatus::Expired => "expired",
            SwapStatus::Cancelled => "cancelled",
            SwapStatus::Fulfilled => "fulfilled",
            SwapStatus::Refunded => "refunded",
            SwapStatus::Other(s) => s,
        }
    }
}

impl From<String> for SwapStatus {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "pending" => SwapStatus::Pending,
            "submitted" => SwapStatus::Submitted,
            "processing" => SwapStatus::Processing,
            "completed" => SwapStatus::Completed,
            "failed" => SwapStatus::Failed,
            "expired" => SwapStatus::Expired,
            "cancelled" | "canceled" => SwapStatus::Cancelled,
            "fulfilled" => SwapStatus::Fulfilled,
            "refunded" => SwapStatus::Refunded,
            _ => SwapStatus::Other(s),
        }
    }
}

impl From<SwapStatus> for String {
    fn from(status: SwapStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response from `/api/swap/{id}/status`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Swap identifier
    #[serde(default, alias = "orderId", alias = "id")]
    pub request_id: Option<String>,

    /// Current status
    pub status: SwapStatus,

    /// Source chain
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub source_chain_id: Option<String>,

    /// Destination chain
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub destination_chain_id: Option<String>,

    /// Input amount
    #[serde(default)]
    pub source_amount: Option<String>,

    /// Output amount
    #[serde(default, alias = "outputAmount")]
    pub destination_amount: Option<String>,

    /// Source transaction hash, once submitted
    #[serde(default)]
    pub source_tx_hash: Option<String>,

    /// Destination transaction hash, once filled
    #[serde(default)]
    pub destination_tx_hash: Option<String>,

    /// Completion timestamp, RFC 3339
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl StatusResponse {
    /// Parses `completed_at`, ignoring values that are not RFC 3339.
    pub fn completed_at_utc(&self) -> Option<DateTime<Utc>> {
        self.completed_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }
}

/// A chain returned by `/api/chains`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    /// Chain identifier, as used in requests
    #[serde(alias = "chainId", deserialize_with = "crate::utils::deserialize_string_or_number")]
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Chain family, e.g. "evm" or "solana"
    #[serde(default, rename = "type", alias = "vm")]
    pub chain_type: Option<String>,

    /// Native currency symbol
    #[serde(default)]
    pub native_currency: Option<String>,
}

/// A token returned by `/api/tokens/{chainId}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    /// Token address on its chain
    pub address: String,

    /// Ticker symbol
    #[serde(default)]
    pub symbol: Option<String>,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Decimal places
    #[serde(default)]
    pub decimals: Option<u8>,
}

/// Body of `/api/chains`: an object with a `chains` array, or a bare array.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub(crate) enum ChainsBody {
    Wrapped { chains: Vec<ChainInfo> },
    Bare(Vec<ChainInfo>),
}

impl From<ChainsBody> for Vec<ChainInfo> {
    fn from(body: ChainsBody) -> Self {
        match body {
            ChainsBody::Wrapped { chains } | ChainsBody::Bare(chains) => chains,
        }
    }
}

/// Body of `/api/tokens/{chainId}`: an object with a `tokens` array, or a bare array.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub(crate) enum TokensBody {
    Wrapped { tokens: Vec<TokenInfo> },
    Bare(Vec<TokenInfo>),
}

impl From<TokensBody> for Vec<TokenInfo> {
    fn from(body: TokensBody) -> Self {
        match body {
            TokensBody::Wrapped { tokens } | TokensBody::Bare(tokens) => tokens,
        }
    }
}

/// One swappable (chain, token) to (chain, token) combination.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct SupportedPair {
    /// Source chain
    pub source_chain_id: String,
    /// Source token address
    pub source_token: String,
    /// Destination chain
    pub destination_chain_id: String,
    /// Destination token address
    pub destination_token: String,
}

/// Price of the paid execute endpoint, from `/api/swap/fee`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwapFee {
    /// Formatted price, e.g. `"$0.01"`
    #[serde(default)]
    pub price: Option<String>,

    /// Amount in the payment asset's smallest unit
    #[serde(default)]
    pub amount: Option<String>,

    /// Payment asset
    #[serde(default)]
    pub asset: Option<String>,

    /// Network the payment settles on
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub network: Option<String>,

    /// Payment recipient
    #[serde(default)]
    pub pay_to: Option<String>,

    /// What the fee covers
    #[serde(default)]
    pub description: Option<String>,
}

/// Response returned by a server when payment is required (HTTP 402).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaymentRequiredResponse {
    /// Protocol version
    #[serde(rename = "x402Version")]
    pub x402_version: u32,

    /// Accepted payment requirements
    pub accepts: Vec<PaymentRequirements>,

    /// Optional error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One acceptable way to pay for a resource.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    /// Payment scheme (e.g., "exact")
    pub scheme: String,

    /// Network identifier (e.g., "base", "8453")
    pub network: String,

    /// Maximum amount in the asset's smallest unit
    pub max_amount_required: String,

    /// The resource being paid for
    pub resource: String,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// MIME type of the resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Recipient address
    pub pay_to: String,

    /// Seconds the payment stays valid
    #[serde(default)]
    pub max_timeout_seconds: u64,

    /// Token contract address
    pub asset: String,

    /// Scheme-specific extra data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

/// Signed payment sent in the `X-PAYMENT` header.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaymentPayload {
    /// Protocol version
    #[serde(rename = "x402Version")]
    pub x402_version: u32,

    /// Payment scheme used
    pub scheme: String,

    /// Network identifier
    pub network: String,

    /// Scheme-specific payload data
    pub payload: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn execute_body(transaction: Value, transactions: Value) -> ExecuteSwapResponse {
        let mut body = json!({
            "requestId": "req-1",
            "sourceChainId": 8453,
            "estimatedOutput": "990000",
            "estimatedTime": 120,
            "fees": {"bridge": "0.10 USDC", "gasUsd": 0.42},
            "instructions": "Sign and submit"
        });
        if !transaction.is_null() {
            body["transaction"] = transaction;
        }
        if !transactions.is_null() {
            body["transactions"] = transactions;
        }
        serde_json::from_value(body).unwrap()
    }

    fn evm_txs() -> Value {
        json!([
            {"to": "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913", "data": "0x095ea7b3", "value": "0", "chainId": 8453, "description": "Approve"},
            {"to": "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEbb", "data": "0x", "value": "0x10", "chainId": "8453"}
        ])
    }

    #[test]
    fn test_quote_request_wire_names() {
        let request = QuoteRequest::new("1", "0xa", "2", "0xb", "10", "0xs", "0xr");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["sourceChainId"], "1");
        assert_eq!(json["recipientAddress"], "0xr");
        assert!(json.get("slippageTolerance").is_none());

        let json = serde_json::to_value(request.with_slippage(0.5)).unwrap();
        assert_eq!(json["slippageTolerance"], 0.5);
    }

    #[test]
    fn test_quote_response_open_fee_map() {
        let quote: QuoteResponse = serde_json::from_value(json!({
            "estimatedOutput": "995000",
            "estimatedOutputFormatted": "0.995 USDC",
            "estimatedTime": 90,
            "fees": {"relayer": "0.003 USDC", "x402": 0.01, "lp": "0.002 USDC"},
            "route": {"sourceChain": 8453, "destinationChain": "solana", "sourceToken": "USDC", "destinationToken": "USDC"},
            "supported": true
        }))
        .unwrap();

        assert_eq!(quote.fees.len(), 3);
        assert_eq!(quote.fees["x402"], FeeValue::Usd(0.01));
        assert_eq!(quote.fees["x402"].to_string(), "$0.01");
        assert_eq!(quote.route.source_chain.as_deref(), Some("8453"));
        assert!(quote.supported);
    }

    #[test]
    fn test_classify_evm() {
        let response = execute_body(Value::Null, evm_txs());
        assert_eq!(response.classify(), SourceKind::Evm);

        let response = execute_body(json!(""), evm_txs());
        assert_eq!(response.classify(), SourceKind::Evm);

        let prepared = response.into_prepared().unwrap();
        assert_eq!(prepared.request_id(), "req-1");
        match prepared {
            PreparedSwap::Evm(swap) => {
                assert_eq!(swap.transactions.len(), 2);
                assert_eq!(swap.transactions[1].chain_id, 8453);
                assert_eq!(swap.transactions[1].value_u256().unwrap(), U256::from(16u64));
                assert_eq!(swap.transactions[0].data_bytes().unwrap(), vec![0x09, 0x5e, 0xa7, 0xb3]);
                assert!(swap.transactions[0].to_address().is_ok());
            }
            other => panic!("expected EVM, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_solana() {
        let response = execute_body(json!("AQID"), Value::Null);
        assert_eq!(classify(&response), SourceKind::Solana);

        let response = execute_body(json!("AQID"), json!([]));
        assert_eq!(classify(&response), SourceKind::Solana);

        match response.into_prepared().unwrap() {
            PreparedSwap::Solana(swap) => {
                assert_eq!(swap.transaction_bytes().unwrap(), vec![1, 2, 3]);
                assert_eq!(swap.summary.source_chain_id.as_deref(), Some("8453"));
            }
            other => panic!("expected Solana, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_rejects_both_and_neither() {
        let both = execute_body(json!("AQID"), evm_txs());
        assert_eq!(both.classify(), SourceKind::Unclassified);
        let err = both.into_prepared().unwrap_err();
        assert!(matches!(
            err,
            SwapError::UnclassifiedResponse { request_id: Some(ref id), .. } if id == "req-1"
        ));

        let neither = execute_body(Value::Null, Value::Null);
        assert_eq!(neither.classify(), SourceKind::Unclassified);
        assert!(neither.into_prepared().is_err());

        let empty = execute_body(json!(""), json!([]));
        assert_eq!(empty.classify(), SourceKind::Unclassified);
    }

    #[test]
    fn test_order_id_alias() {
        let response: ExecuteSwapResponse =
            serde_json::from_value(json!({"orderId": "ord-9", "transaction": "AQID"})).unwrap();
        assert_eq!(response.request_id, "ord-9");
    }

    #[test]
    fn test_status_response() {
        let status: StatusResponse = serde_json::from_value(json!({
            "status": "completed",
            "sourceChainId": 8453,
            "destinationChainId": "solana",
            "sourceAmount": "1000000",
            "outputAmount": "990000",
            "sourceTxHash": "0xabc",
            "completedAt": "2025-01-02T03:04:05Z"
        }))
        .unwrap();

        assert_eq!(status.status, SwapStatus::Completed);
        assert_eq!(status.destination_amount.as_deref(), Some("990000"));
        assert_eq!(status.source_chain_id.as_deref(), Some("8453"));
        assert_eq!(
            status.completed_at_utc().unwrap().to_rfc3339(),
            "2025-01-02T03:04:05+00:00"
        );
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let status: SwapStatus = serde_json::from_value(json!("awaiting_relay")).unwrap();
        assert_eq!(status, SwapStatus::Other("awaiting_relay".to_string()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("awaiting_relay"));
        assert_eq!(SwapStatus::from("CANCELED".to_string()), SwapStatus::Cancelled);
    }

    #[test]
    fn test_discovery_bodies() {
        let chains: ChainsBody =
            serde_json::from_value(json!({"chains": [{"id": 8453, "name": "Base", "type": "evm"}]}))
                .unwrap();
        let chains: Vec<ChainInfo> = chains.into();
        assert_eq!(chains[0].id, "8453");
        assert_eq!(chains[0].chain_type.as_deref(), Some("evm"));

        let tokens: TokensBody =
            serde_json::from_value(json!([{"address": "0xa", "symbol": "USDC", "decimals": 6}]))
                .unwrap();
        let tokens: Vec<TokenInfo> = tokens.into();
        assert_eq!(tokens[0].decimals, Some(6));
    }
}
