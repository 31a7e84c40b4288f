//! # x402-swap
//!
//! A typed Rust client for cross-chain swap services whose paid endpoints are gated
//! by the x402 protocol (HTTP 402 "Payment Required" micropayments).
//!
//! The remote service prices and executes the swap. This crate turns typed requests
//! into validated HTTP calls, maps every failure onto a closed set of error codes,
//! tells EVM-source swaps apart from Solana-source swaps, and polls a swap until it
//! settles.
//!
//! ## Features
//!
//! - **Local validation**: malformed requests fail before any network call
//! - **Typed errors**: every failure carries one [`ErrorCode`]; unknown server codes are kept verbatim
//! - **Safe discrimination**: execute responses that are not clearly EVM or Solana are rejected
//! - **Settlement polling**: bounded, sequential, with a per-update observer
//! - **Pluggable I/O**: inject any [`transport::Fetch`], including [`payment::PaymentFetch`] for x402
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use x402_swap::client::SwapClient;
//! use x402_swap::config::SwapClientConfig;
//! use x402_swap::poller::WaitOptions;
//! use x402_swap::types::{PreparedSwap, QuoteRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SwapClient::new(SwapClientConfig::new("https://swap.example.com"))?;
//!
//! let request = QuoteRequest::new(
//!     "8453",
//!     "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
//!     "solana",
//!     "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
//!     "1000000",
//!     "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEbb",
//!     "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
//! );
//!
//! let quote = client.get_quote(&request).await?;
//! println!("Estimated output: {}", quote.estimated_output);
//!
//! match client.execute_swap(&request).await? {
//!     PreparedSwap::Evm(swap) => {
//!         for tx in &swap.transactions {
//!             // sign and submit in order
//!             println!("{} -> {}", tx.chain_id, tx.to);
//!         }
//!     }
//!     PreparedSwap::Solana(swap) => {
//!         // co-sign and submit
//!         let _bytes = swap.transaction_bytes()?;
//!     }
//! }
//!
//! let status = client.wait_for_settlement("request-id", &WaitOptions::default()).await?;
//! println!("Final status: {}", status.status);
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Failures come in three tiers, all as [`SwapError`]:
//!
//! 1. **Validation**: [`ErrorCode::ValidationError`], raised locally
//! 2. **Transport**: [`ErrorCode::Timeout`] or [`ErrorCode::NetworkError`]
//! 3. **Server**: one of the wire codes, see [`errors::map_api_error`]
//!
//! Only [`client::SwapClient::wait_for_settlement`] repeats requests, and only the
//! idempotent status read.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod errors;
pub mod payment;
pub mod poller;
pub mod transport;
pub mod types;
pub mod utils;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used items
pub use client::SwapClient;
pub use config::SwapClientConfig;
pub use errors::{map_api_error, ErrorCode, ErrorInfo, Result, SwapError};
pub use poller::{PollOptions, ProtocolVersion, TerminalStatuses, WaitOptions};
pub use types::{
    classify, ExecuteSwapResponse, PreparedSwap, QuoteRequest, QuoteResponse, SourceKind,
    StatusResponse, SwapStatus,
};
pub use validation::ValidationError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert_eq!(types::X402_VERSION, 1);
    }

    #[test]
    fn test_module_accessibility() {
        let _ = SwapClientConfig::default();
        let _ = WaitOptions::default();
        let _ = SwapClient::default_client().unwrap();
    }
}
