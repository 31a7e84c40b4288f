//! Example swap client.
//!
//! Quotes a Base USDC -> Solana USDC swap, executes it (paying the x402 fee with
//! a local wallet) and follows the swap until it settles.
//!
//! Run with:
//! ```bash
//! cargo run --example client
//! ```
//!
//! Environment variables:
//! - PRIVATE_KEY: Key used to sign the x402 payment
//! - SENDER / RECIPIENT: Source and destination wallet addresses
//! - X402_SWAP_BASE_URL / X402_SWAP_TIMEOUT_MS: Client overrides

use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use x402_swap::{
    client::SwapClient,
    config::SwapClientConfig,
    payment::{PaymentFetch, PaymentSigner},
    poller::WaitOptions,
    types::{PaymentPayload, PaymentRequirements, PreparedSwap, QuoteRequest, X402_VERSION},
    ErrorInfo, Result, SwapError,
};

/// Signs payment requirements with a local key.
struct WalletSigner {
    wallet: LocalWallet,
}

#[async_trait]
impl PaymentSigner for WalletSigner {
    async fn sign(&self, requirements: &PaymentRequirements) -> Result<PaymentPayload> {
        let message = format!(
            "{}:{}:{}:{}",
            requirements.network, requirements.pay_to, requirements.asset, requirements.max_amount_required
        );
        let signature = self
            .wallet
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| SwapError::PaymentRequired(ErrorInfo::new(format!("Signing failed: {}", e))))?;

        Ok(PaymentPayload {
            x402_version: X402_VERSION,
            scheme: requirements.scheme.clone(),
            network: requirements.network.clone(),
            payload: json!({
                "from": format!("{:?}", self.wallet.address()),
                "message": message,
                "signature": format!("0x{}", signature),
            }),
        })
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let private_key = std::env::var("PRIVATE_KEY").unwrap_or_else(|_| {
        println!("⚠️  No PRIVATE_KEY set, using example key (DO NOT USE IN PRODUCTION)");
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string()
    });
    let wallet: LocalWallet = private_key.parse()?;

    let sender = std::env::var("SENDER").unwrap_or_else(|_| format!("{:?}", wallet.address()));
    let recipient = std::env::var("RECIPIENT")
        .unwrap_or_else(|_| "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM".to_string());

    let config = SwapClientConfig::from_env()?;
    println!("🔁 x402 Swap Client");
    println!("   API: {}", config.base_url);
    println!();

    let fetch = PaymentFetch::new(reqwest::Client::new(), WalletSigner { wallet });
    let client = SwapClient::with_fetch(config, Arc::new(fetch))?;

    let request = QuoteRequest::new(
        "8453",
        "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
        "solana",
        "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
        "1000000",
        sender,
        recipient,
    )
    .with_slippage(0.005);

    if let Err(e) = run(&client, &request).await {
        eprintln!("❌ [{}] {}", e.code(), e.message());
        if let Some(suggestion) = e.suggestion() {
            eprintln!("   💡 {}", suggestion);
        }
        return Err(e.into());
    }

    println!("\n✨ Done!");
    Ok(())
}

async fn run(client: &SwapClient, request: &QuoteRequest) -> Result<()> {
    println!("📡 Requesting quote...");
    let quote = client.get_quote(request).await?;
    println!(
        "   Output: {}",
        quote
            .estimated_output_formatted
            .as_deref()
            .unwrap_or(&quote.estimated_output)
    );
    for (name, fee) in &quote.fees {
        println!("   Fee {}: {}", name, fee);
    }

    println!("\n💸 Executing swap...");
    let prepared = client.execute_swap(request).await?;
    match &prepared {
        PreparedSwap::Evm(swap) => {
            println!("   {} EVM transaction(s) to sign in order:", swap.transactions.len());
            for tx in &swap.transactions {
                println!(
                    "   - chain {} to {} ({})",
                    tx.chain_id,
                    tx.to,
                    tx.description.as_deref().unwrap_or("no description")
                );
            }
        }
        PreparedSwap::Solana(swap) => {
            println!(
                "   Solana transaction, {} bytes to co-sign",
                swap.transaction_bytes()?.len()
            );
        }
    }

    println!("\n⏳ Waiting for settlement of {}...", prepared.request_id());
    let options = WaitOptions::default().with_interval(Duration::from_secs(5));
    let status = client
        .wait_for_settlement_with(prepared.request_id(), &options, |update| {
            println!("   status: {}", update.status);
        })
        .await?;

    println!("\n📦 Final status: {}", status.status);
    if let Some(hash) = &status.destination_tx_hash {
        println!("   Destination tx: {}", hash);
    }
    Ok(())
}
