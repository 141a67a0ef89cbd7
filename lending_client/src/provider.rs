use alloy::{
    network::Ethereum,
    providers::{Provider, ProviderBuilder},
    rpc::client::RpcClient,
    transports::http::reqwest::Url,
};
use anyhow::Result;

/// Creates an HTTP provider instance for blockchain interactions.
///
/// No retry or backoff layer: any transport failure surfaces once to the
/// caller.
pub fn http_provider(rpc_url: &str) -> Result<impl Provider<Ethereum>> {
    let client = RpcClient::builder().http(Url::parse(rpc_url)?);
    let provider = ProviderBuilder::new().on_client(client);
    Ok(provider)
}
