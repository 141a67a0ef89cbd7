use anyhow::Result;

use super::env_helper::{load_env_var, load_env_var_or};

/// Public endpoint used for reads and historical queries when no dedicated
/// read endpoint is configured, so the monitor works without a wallet-bound
/// provider.
const DEFAULT_READ_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";

const DEFAULT_EVENT_LOOKBACK_BLOCKS: &str = "5000";

#[derive(Debug, Clone)]
pub struct LocalConfig {
    pub rpc_url: String,
    pub read_rpc_url: String,
    pub pool_address: String,
    pub account_address: String,
    pub event_lookback_blocks: u64,
}

impl LocalConfig {
    pub fn load_from_env() -> Result<Self> {
        Ok(Self {
            rpc_url: load_env_var("RPC_URL")?,
            read_rpc_url: load_env_var_or("READ_RPC_URL", DEFAULT_READ_RPC_URL)?,
            pool_address: load_env_var("POOL_ADDRESS")?,
            account_address: load_env_var("ACCOUNT_ADDRESS")?,
            event_lookback_blocks: load_env_var_or(
                "EVENT_LOOKBACK_BLOCKS",
                DEFAULT_EVENT_LOOKBACK_BLOCKS,
            )?,
        })
    }
}
