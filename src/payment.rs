//! x402 payment handling for the transport.
//!
//! [`PaymentFetch`] wraps another [`Fetch`] and answers `402 Payment Required`
//! challenges: it picks one of the offered requirements, asks a
//! [`PaymentSigner`] for a signed payload and resends the original request once
//! with the `X-PAYMENT` header. Key handling stays with the signer.

use crate::errors::{ErrorInfo, Result, SwapError};
use crate::transport::Fetch;
use crate::types::{PaymentPayload, PaymentRequiredResponse, PaymentRequirements};
use crate::utils::{decode_base64_json, encode_payment_header};
use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::{Request, Response, StatusCode};

/// Header carrying the encoded payment on the retried request.
pub const PAYMENT_HEADER: &str = "x-payment";

/// Header carrying the settlement receipt on the paid response.
pub const PAYMENT_RESPONSE_HEADER: &str = "x-payment-response";

/// Produces signed payment payloads, typically backed by a wallet.
#[async_trait]
pub trait PaymentSigner: Send + Sync {
    /// Signs a payment satisfying `requirements`.
    async fn sign(&self, requirements: &PaymentRequirements) -> Result<PaymentPayload>;
}

/// A [`Fetch`] that pays x402 challenges before giving up.
pub struct PaymentFetch<F, S> {
    inner: F,
    signer: S,
    preferred_scheme: Option<String>,
    preferred_network: Option<String>,
}

impl<F: Fetch, S: PaymentSigner> PaymentFetch<F, S> {
    /// Wraps `inner`, paying with `signer`. Prefers the "exact" scheme.
    pub fn new(inner: F, signer: S) -> Self {
        Self {
            inner,
            signer,
            preferred_scheme: Some("exact".to_string()),
            preferred_network: None,
        }
    }

    /// Sets the preferred payment scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.preferred_scheme = Some(scheme.into());
        self
    }

    /// Accepts any scheme.
    pub fn with_any_scheme(mut self) -> Self {
        self.preferred_scheme = None;
        self
    }

    /// Sets the preferred network.
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.preferred_network = Some(network.into());
        self
    }

    /// Selects an appropriate payment requirement from the server's offers.
    fn select_requirement<'a>(
        &self,
        challenge: &'a PaymentRequiredResponse,
    ) -> Result<&'a PaymentRequirements> {
        challenge
            .accepts
            .iter()
            .filter(|r| self.preferred_scheme.as_ref().map_or(true, |s| &r.scheme == s))
            .find(|r| self.preferred_network.as_ref().map_or(true, |n| &r.network == n))
            .ok_or_else(|| {
                SwapError::PaymentRequired(
                    ErrorInfo::new("No suitable payment requirement found")
                        .with_suggestion("Check the scheme and network the signer supports"),
                )
            })
    }
}

#[async_trait]
impl<F: Fetch, S: PaymentSigner> Fetch for PaymentFetch<F, S> {
    async fn fetch(&self, request: Request) -> Result<Response> {
        // Cloned up front: the original is consumed by the first attempt.
        let retry = request.try_clone();
        let response = self.inner.fetch(request).await?;

        if response.status() != StatusCode::PAYMENT_REQUIRED {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        let challenge = match serde_json::from_slice::<PaymentRequiredResponse>(&bytes) {
            Ok(challenge) if !challenge.accepts.is_empty() => challenge,
            _ => {
                // Not an x402 challenge; let the transport map it like any other 402.
                let mut rebuilt = http::Response::builder().status(StatusCode::PAYMENT_REQUIRED);
                if let Some(h) = rebuilt.headers_mut() {
                    *h = headers;
                }
                let rebuilt = rebuilt
                    .body(bytes)
                    .map_err(|e| SwapError::network_from("Cannot rebuild 402 response", e))?;
                return Ok(Response::from(rebuilt));
            }
        };

        let mut retry = retry.ok_or_else(|| {
            SwapError::network("Request body cannot be replayed for the paid retry")
        })?;

        let requirement = self.select_requirement(&challenge)?;
        tracing::warn!(
            scheme = %requirement.scheme,
            network = %requirement.network,
            amount = %requirement.max_amount_required,
            resource = %requirement.resource,
            "402 received, paying and retrying"
        );

        let payload = self.signer.sign(requirement).await?;
        let header = encode_payment_header(&payload)?;
        let value = HeaderValue::from_str(&header)
            .map_err(|e| SwapError::network_from("Payment header is not a valid header value", e))?;
        retry.headers_mut().insert(PAYMENT_HEADER, value);

        let paid = self.inner.fetch(retry).await?;

        if let Some(receipt) = paid.headers().get(PAYMENT_RESPONSE_HEADER) {
            if let Ok(encoded) = receipt.to_str() {
                if let Ok(decoded) = decode_base64_json(encoded) {
                    tracing::debug!(receipt = %decoded, "payment settled");
                }
            }
        }

        Ok(paid)
    }
}
