use alloy::network::Ethereum;
use alloy::primitives::Address;
use alloy::providers::Provider;
use anyhow::Result;
use health_factor_observer::HealthFactorSource;
use lending_client::LendingClient;

/// Bridges the contract adapter into the observer's input seam.
///
/// The adapter's health-factor read is fail-soft (it maps errors to the
/// "0" sentinel), so this source never returns an error in practice.
pub struct ClientSource<W, R>
where
    W: Provider<Ethereum>,
    R: Provider<Ethereum>,
{
    client: LendingClient<W, R>,
}

impl<W, R> ClientSource<W, R>
where
    W: Provider<Ethereum>,
    R: Provider<Ethereum>,
{
    pub fn new(client: LendingClient<W, R>) -> Self {
        Self { client }
    }
}

impl<W, R> HealthFactorSource for ClientSource<W, R>
where
    W: Provider<Ethereum> + 'static,
    R: Provider<Ethereum> + 'static,
{
    async fn user_health_factor(&self, account: Address) -> Result<String> {
        Ok(self.client.user_health_factor(account).await)
    }
}
