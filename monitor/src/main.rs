mod config;
mod source;
mod status_server;
mod utils;

use std::sync::Arc;

use alloy::network::Ethereum;
use alloy::primitives::Address;
use alloy::providers::Provider;
use anyhow::{Context, Result};
use futures::try_join;
use health_factor_observer::{HealthFactorObserver, ObserverInputs};
use lending_client::{http_provider, EventKind, LendingClient};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::LocalConfig;
use crate::source::ClientSource;

/// Main entry point for the Lending Pool Monitor
///
/// This function performs the following steps:
/// 1. Initializes the pre-run environment
/// 2. Connects the contract adapter over the configured endpoints
/// 3. Logs the account's recent event history
/// 4. Starts the health factor observer and the status server
/// 5. Handles if any of the services panics
#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    init_pre_run()?;

    info!("Starting the lending pool monitor");

    let local_config = Arc::new(LocalConfig::load_from_env()?);

    let pool_address: Address = local_config
        .pool_address
        .parse()
        .context("POOL_ADDRESS is not a valid address")?;
    let account: Address = local_config
        .account_address
        .parse()
        .context("ACCOUNT_ADDRESS is not a valid address")?;

    let wallet_provider = http_provider(&local_config.rpc_url)?;
    let read_provider = http_provider(&local_config.read_rpc_url)?;
    let client = LendingClient::new(wallet_provider, read_provider, pool_address);

    // Backfill is informational only; the observer still starts if the
    // historical query fails
    if let Err(e) = log_recent_events(&client, account, local_config.event_lookback_blocks).await {
        warn!("Event backfill failed: {:#}", e);
    }

    let source = Arc::new(ClientSource::new(client));

    let (inputs_tx, inputs_rx) = watch::channel::<ObserverInputs<_>>(None);
    let (output_tx, output_rx) = watch::channel(None);

    let observer_handle = HealthFactorObserver::start(inputs_rx, output_tx);

    if inputs_tx.send(Some((source, account))).is_err() {
        anyhow::bail!("Observer stopped before inputs could be delivered");
    }

    let server_handle = tokio::spawn(status_server::start_status_server(output_rx));

    match try_join!(observer_handle, server_handle) {
        Ok((observer_result, server_result)) => {
            if let Err(e) = observer_result {
                let error_message = e
                    .chain()
                    .map(|e| e.to_string())
                    .collect::<Vec<String>>()
                    .join(" -> ");
                error!("Observer failed with error: {}", error_message);
                return Err(anyhow::anyhow!("Observer failed: {}", error_message));
            }

            if let Err(e) = server_result {
                let error_message = e
                    .chain()
                    .map(|e| e.to_string())
                    .collect::<Vec<String>>()
                    .join(" -> ");
                error!("Status server failed with error: {}", error_message);
                return Err(anyhow::anyhow!("Status server failed: {}", error_message));
            }

            info!("Monitor stopped");
            Ok(())
        }
        Err(e) => {
            error!("Monitor task panicked: {}", e);
            Err(anyhow::anyhow!("Monitor task panicked: {}", e))
        }
    }
}

/// Initializes the pre-run environment
///
/// Loads environment variables from the `.env` file when present and sets
/// up the logger
fn init_pre_run() -> Result<()> {
    // A missing .env file is fine; the environment may already be populated
    let _ = dotenvy::dotenv();
    utils::logger::setup_logger().context("Failed to setup logger")?;
    Ok(())
}

/// Logs the account's decoded event history over the lookback window
async fn log_recent_events<W, R>(
    client: &LendingClient<W, R>,
    account: Address,
    lookback_blocks: u64,
) -> Result<()>
where
    W: Provider<Ethereum>,
    R: Provider<Ethereum>,
{
    let last_block = client.get_last_block().await?;
    let from_block = last_block.saturating_sub(lookback_blocks);

    info!(
        "Backfilling events for {} from block {} to {}",
        account, from_block, last_block
    );

    for kind in EventKind::ALL {
        let events = client
            .query_filter_event_by_account(account, kind, from_block, None)
            .await?;

        for event in &events {
            info!(
                "{} | token: {} | amount: {} | at: {}",
                event.event_name, event.token, event.amount, event.timestamp
            );
        }
    }

    Ok(())
}
