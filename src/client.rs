//! Client for the swap service.
//!
//! [`SwapClient`] validates each request locally, sends it through a
//! [`Transport`] and decodes the typed response. It keeps no state between
//! calls; the only loop is [`SwapClient::wait_for_settlement`], which re-reads
//! the idempotent status endpoint.

use crate::config::SwapClientConfig;
use crate::errors::{Result, SwapError};
use crate::poller::{poll, WaitOptions};
use crate::transport::{Fetch, Transport};
use crate::types::{
    ChainInfo, ChainsBody, ExecuteSwapResponse, PreparedSwap, QuoteRequest, QuoteResponse,
    StatusResponse, SupportedPair, SwapFee, TokenInfo, TokensBody,
};
use crate::validation::{validate_quote_request, validate_request_id};
use reqwest::Client;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const QUOTE_PATH: &[&str] = &["api", "swap", "quote"];
const EXECUTE_PATH: &[&str] = &["api", "swap", "execute"];
const FEE_PATH: &[&str] = &["api", "swap", "fee"];
const CHAINS_PATH: &[&str] = &["api", "chains"];

/// Typed client for the swap HTTP API.
///
/// Cloning is cheap; clones share the injected [`Fetch`].
///
/// # Examples
///
/// ```no_run
/// use x402_swap::client::SwapClient;
/// use x402_swap::config::SwapClientConfig;
/// use x402_swap::types::QuoteRequest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = SwapClient::new(SwapClientConfig::new("https://swap.example.com"))?;
///
/// let quote = client
///     .get_quote(&QuoteRequest::new(
///         "8453",
///         "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
///         "solana",
///         "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
///         "1000000",
///         "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEbb",
///         "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
///     ))
///     .await?;
///
/// println!("You receive about {}", quote.estimated_output);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SwapClient {
    transport: Transport,
}

impl SwapClient {
    /// Creates a client that sends requests with a plain `reqwest::Client`.
    pub fn new(config: SwapClientConfig) -> Result<Self> {
        Self::with_fetch(config, Arc::new(Client::new()))
    }

    /// Creates a client for the production endpoint with default settings.
    pub fn default_client() -> Result<Self> {
        Self::new(SwapClientConfig::default())
    }

    /// Creates a client that sends requests through `fetch`.
    ///
    /// Pass a [`crate::payment::PaymentFetch`] to pay for x402-gated endpoints.
    pub fn with_fetch(config: SwapClientConfig, fetch: Arc<dyn Fetch>) -> Result<Self> {
        let transport = Transport::new(
            config.parsed_base_url()?,
            fetch,
            config.timeout,
            config.header_map()?,
        );
        Ok(Self { transport })
    }

    /// The underlying transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Requests a price quote. Free and idempotent.
    pub async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse> {
        validate_quote_request(request)?;
        self.transport.post(QUOTE_PATH, request).await
    }

    /// Creates a swap and returns the transactions the caller must sign.
    ///
    /// Not idempotent: every successful call may create a new order. This method
    /// never retries. On [`SwapError::Timeout`] the order may or may not exist;
    /// check with [`SwapClient::get_status`] before submitting again.
    ///
    /// Responses that are neither EVM-source nor Solana-source are rejected with
    /// [`SwapError::UnclassifiedResponse`].
    pub async fn execute_swap(&self, request: &QuoteRequest) -> Result<PreparedSwap> {
        let response = self.execute_swap_raw(request).await?;
        let kind = response.classify();
        tracing::debug!(request_id = %response.request_id, ?kind, "execute response classified");
        response.into_prepared()
    }

    /// Same call as [`SwapClient::execute_swap`], returning the unclassified wire value.
    pub async fn execute_swap_raw(&self, request: &QuoteRequest) -> Result<ExecuteSwapResponse> {
        validate_quote_request(request)?;
        self.transport
            .post(EXECUTE_PATH, request)
            .await
            .map_err(flag_ambiguous_execute)
    }

    /// Reads the current status of a swap. Free and idempotent.
    pub async fn get_status(&self, request_id: &str) -> Result<StatusResponse> {
        validate_request_id(request_id)?;
        self.transport
            .get(&["api", "swap", request_id, "status"])
            .await
    }

    /// Polls the status until it reaches a terminal value or the budget runs out.
    pub async fn wait_for_settlement(
        &self,
        request_id: &str,
        options: &WaitOptions,
    ) -> Result<StatusResponse> {
        self.wait_for_settlement_with(request_id, options, |_| {})
            .await
    }

    /// Like [`SwapClient::wait_for_settlement`], calling `on_update` with every
    /// status read, in order, including the final one.
    pub async fn wait_for_settlement_with<U>(
        &self,
        request_id: &str,
        options: &WaitOptions,
        mut on_update: U,
    ) -> Result<StatusResponse>
    where
        U: FnMut(&StatusResponse),
    {
        validate_request_id(request_id)?;
        let terminal = &options.terminal;

        poll(
            || self.get_status(request_id),
            |status| !terminal.contains(&status.status),
            &options.poll,
            |status| {
                tracing::debug!(request_id, status = %status.status, "swap status");
                on_update(status)
            },
        )
        .await
    }

    /// Lists chains the service supports. Upstream may cache this for an hour.
    pub async fn get_supported_chains(&self) -> Result<Vec<ChainInfo>> {
        let body: ChainsBody = self.transport.get(CHAINS_PATH).await?;
        Ok(body.into())
    }

    /// Lists tokens supported on `chain_id`. Upstream may cache this for an hour.
    pub async fn get_supported_tokens(&self, chain_id: &str) -> Result<Vec<TokenInfo>> {
        validate_chain_id(chain_id)?;
        let body: TokensBody = self.transport.get(&["api", "tokens", chain_id]).await?;
        Ok(body.into())
    }

    /// Lists every cross-chain (token, token) combination.
    ///
    /// Each chain's token list is fetched once, however many chains there are.
    /// Pairs never start and end on the same chain.
    pub async fn get_supported_pairs(&self) -> Result<Vec<SupportedPair>> {
        let chains = self.get_supported_chains().await?;

        let mut chain_ids: Vec<&str> = Vec::with_capacity(chains.len());
        let mut seen = HashSet::new();
        for chain in &chains {
            if seen.insert(chain.id.as_str()) {
                chain_ids.push(chain.id.as_str());
            }
        }

        let mut tokens: HashMap<&str, Vec<TokenInfo>> = HashMap::with_capacity(chain_ids.len());
        for &chain_id in &chain_ids {
            tokens.insert(chain_id, self.get_supported_tokens(chain_id).await?);
        }

        let mut pairs = Vec::new();
        for &source in &chain_ids {
            for &destination in &chain_ids {
                if source == destination {
                    continue;
                }
                for source_token in &tokens[source] {
                    for destination_token in &tokens[destination] {
                        pairs.push(SupportedPair {
                            source_chain_id: source.to_string(),
                            source_token: source_token.address.clone(),
                            destination_chain_id: destination.to_string(),
                            destination_token: destination_token.address.clone(),
                        });
                    }
                }
            }
        }

        tracing::debug!(chains = chain_ids.len(), pairs = pairs.len(), "supported pairs built");
        Ok(pairs)
    }

    /// Price of the paid execute endpoint.
    pub async fn get_swap_fee(&self) -> Result<SwapFee> {
        self.transport.get(FEE_PATH).await
    }
}

fn validate_chain_id(chain_id: &str) -> Result<()> {
    if chain_id.trim().is_empty() {
        return Err(crate::validation::ValidationError::MissingField { field: "chainId" }.into());
    }
    Ok(())
}

fn flag_ambiguous_execute(err: SwapError) -> SwapError {
    match err {
        SwapError::Timeout(mut info) => {
            let mut details = info.details.take().unwrap_or_else(|| json!({}));
            if let Some(obj) = details.as_object_mut() {
                obj.insert("operation".to_string(), json!("executeSwap"));
                obj.insert("orderMayExist".to_string(), json!(true));
            }
            info.details = Some(details);
            info.suggestion.get_or_insert_with(|| {
                "The swap may have been created. Check its status before executing again.".to_string()
            });
            SwapError::Timeout(info)
        }
        other => other,
    }
}
