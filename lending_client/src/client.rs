use alloy::{
    eips::BlockNumberOrTag,
    network::Ethereum,
    primitives::{Address, U256},
    providers::Provider,
    rpc::types::Filter,
};
use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use crate::contracts::LendingPool::{self, LendingPoolInstance};
use crate::events::{self, DomainEvent, EventKind};
use crate::models::LiquidityPosition;
use crate::units;

/// Sentinel returned by [`LendingClient::user_health_factor`] when the
/// underlying read fails. Callers see "0" instead of an error; note this
/// conflates "zero risk" with "unknown".
pub const HEALTH_FACTOR_FALLBACK: &str = "0";

/// Adapter around the deployed lending pool contract.
///
/// Holds two bindings to the same contract: one on a signer-capable
/// provider for state-changing calls, one on a read-only JSON-RPC endpoint
/// so reads and historical queries work without a connected wallet. Both
/// handles are read-only after construction and safe for concurrent
/// independent calls.
///
/// Every monetary amount crosses this boundary as a decimal string and is
/// scaled to/from the contract's 10^18 fixed-point representation.
pub struct LendingClient<W, R>
where
    W: Provider<Ethereum>,
    R: Provider<Ethereum>,
{
    pool_write: LendingPoolInstance<(), W>,
    pool_read: LendingPoolInstance<(), R>,
}

impl<W, R> LendingClient<W, R>
where
    W: Provider<Ethereum>,
    R: Provider<Ethereum>,
{
    pub fn new(wallet_provider: W, read_provider: R, pool_address: Address) -> Self {
        Self {
            pool_write: LendingPool::new(pool_address, wallet_provider),
            pool_read: LendingPool::new(pool_address, read_provider),
        }
    }

    pub fn pool_address(&self) -> Address {
        *self.pool_read.address()
    }

    // ---------- Read operations ----------

    pub async fn get_asset_value_in_usd(&self, token: Address, amount: &str) -> Result<String> {
        let amount = units::to_fixed_point(amount)?;
        let value = self
            .pool_read
            .getAssetValueInUSD(token, amount)
            .call()
            .await
            .context("getAssetValueInUSD call failed")?
            ._0;
        Ok(units::to_decimal(value))
    }

    pub async fn collateral_deposited(&self, user: Address, token: Address) -> Result<String> {
        let value = self
            .pool_read
            .collateralDeposited(user, token)
            .call()
            .await
            .context("collateralDeposited call failed")?
            ._0;
        Ok(units::to_decimal(value))
    }

    pub async fn get_user_total_borrowed(&self, user: Address) -> Result<String> {
        let value = self
            .pool_read
            .getUserTotalBorrowed(user)
            .call()
            .await
            .context("getUserTotalBorrowed call failed")?
            ._0;
        Ok(units::to_decimal(value))
    }

    pub async fn get_user_total_collateral(&self, user: Address) -> Result<String> {
        let value = self
            .pool_read
            .getUserTotalCollateral(user)
            .call()
            .await
            .context("getUserTotalCollateral call failed")?
            ._0;
        Ok(units::to_decimal(value))
    }

    pub async fn allowed_borrowing_amount(&self, user: Address) -> Result<String> {
        let value = self
            .pool_read
            .allowedBorrowingAmount(user)
            .call()
            .await
            .context("allowedBorrowingAmount call failed")?
            ._0;
        Ok(units::to_decimal(value))
    }

    /// Reads the account's solvency ratio.
    ///
    /// Never fails: any underlying error is logged and mapped to the
    /// [`HEALTH_FACTOR_FALLBACK`] sentinel so the value is always
    /// displayable.
    pub async fn user_health_factor(&self, user: Address) -> String {
        let result = self.pool_read.userHealthFactor(user).call().await;
        health_factor_or_fallback(user, result.map(|r| r._0))
    }

    /// Probes whether the account's position is currently unsafe.
    ///
    /// The underlying contract call resolves or reverts depending on the
    /// position's state; a resolved call maps to `true` and any failure to
    /// `false`. The polarity is preserved from the deployed contract even
    /// though it reads inverted relative to the name.
    pub async fn check_for_broken_health_factor(&self, user: Address) -> bool {
        let result = self.pool_read.checkForBrokenHealthFactor(user).call().await;
        probe_result_to_flag(user, result.map(|_| ()))
    }

    pub async fn total_liquidity(&self, token: Address) -> Result<String> {
        let value = self
            .pool_read
            .totalLiquidity(token)
            .call()
            .await
            .context("totalLiquidity call failed")?
            ._0;
        Ok(units::to_decimal(value))
    }

    pub async fn calculate_basic_lp_rewards(&self, provider: Address) -> Result<String> {
        let value = self
            .pool_read
            .calculateBasicLPRewards(provider)
            .call()
            .await
            .context("calculateBasicLPRewards call failed")?
            ._0;
        Ok(units::to_decimal(value))
    }

    pub async fn get_liquidity_pool(
        &self,
        provider: Address,
        token: Address,
    ) -> Result<LiquidityPosition> {
        let raw = self
            .pool_read
            .getLiquidityPool(provider, token)
            .call()
            .await
            .context("getLiquidityPool call failed")?;
        LiquidityPosition::try_from(raw)
    }

    pub async fn treasury(&self) -> Result<Address> {
        let address = self
            .pool_read
            .treasury()
            .call()
            .await
            .context("treasury call failed")?
            ._0;
        Ok(address)
    }

    pub async fn get_total_value_locked(&self, token: Address) -> Result<String> {
        let value = self
            .pool_read
            .getTotalValueLocked(token)
            .call()
            .await
            .context("getTotalValueLocked call failed")?
            ._0;
        Ok(units::to_decimal(value))
    }

    pub async fn price_feeds(&self, token: Address) -> Result<Address> {
        let feed = self
            .pool_read
            .priceFeeds(token)
            .call()
            .await
            .context("priceFeeds call failed")?
            ._0;
        Ok(feed)
    }

    /// Current chain height from the read-only connection.
    pub async fn get_last_block(&self) -> Result<u64> {
        self.pool_read
            .provider()
            .get_block_number()
            .await
            .context("Failed to get current block")
    }

    // ---------- Event log queries ----------

    /// Fetches and decodes all `event` entries emitted for `account`
    /// between `from_block` and `to_block` (inclusive; latest when absent).
    ///
    /// Entries that fail to decode are dropped individually; the surviving
    /// events come back in log order.
    pub async fn query_filter_event_by_account(
        &self,
        account: Address,
        event: EventKind,
        from_block: u64,
        to_block: Option<u64>,
    ) -> Result<Vec<DomainEvent>> {
        let to_block = to_block
            .map(BlockNumberOrTag::Number)
            .unwrap_or(BlockNumberOrTag::Latest);

        let filter = Filter::new()
            .address(self.pool_address())
            .event_signature(event.signature_hash())
            .topic1(account.into_word())
            .from_block(from_block)
            .to_block(to_block);

        let logs = self
            .pool_read
            .provider()
            .get_logs(&filter)
            .await
            .with_context(|| format!("{} log query failed", event.name()))?;

        let logs = logs.into_iter().map(|log| log.inner).collect::<Vec<_>>();
        Ok(events::decode_events(&logs))
    }

    // ---------- State-changing operations ----------

    pub async fn deposit_collateral(&self, token: Address, amount: &str) -> Result<()> {
        let amount = units::to_fixed_point(amount)?;
        let pending = self
            .pool_write
            .depositCollateral(token, amount)
            .send()
            .await
            .context("depositCollateral submission failed")?;
        let receipt = pending
            .get_receipt()
            .await
            .context("depositCollateral was not confirmed")?;
        if !receipt.status() {
            bail!("depositCollateral reverted in tx {}", receipt.transaction_hash);
        }
        Ok(())
    }

    pub async fn borrow_asset(&self, token: Address, amount: &str) -> Result<()> {
        let amount = units::to_fixed_point(amount)?;
        let pending = self
            .pool_write
            .borrowAsset(token, amount)
            .send()
            .await
            .context("borrowAsset submission failed")?;
        let receipt = pending
            .get_receipt()
            .await
            .context("borrowAsset was not confirmed")?;
        if !receipt.status() {
            bail!("borrowAsset reverted in tx {}", receipt.transaction_hash);
        }
        Ok(())
    }

    pub async fn withdraw_collateral_deposited(&self, token: Address, amount: &str) -> Result<()> {
        let amount = units::to_fixed_point(amount)?;
        let pending = self
            .pool_write
            .withdrawCollateralDeposited(token, amount)
            .send()
            .await
            .context("withdrawCollateralDeposited submission failed")?;
        let receipt = pending
            .get_receipt()
            .await
            .context("withdrawCollateralDeposited was not confirmed")?;
        if !receipt.status() {
            bail!(
                "withdrawCollateralDeposited reverted in tx {}",
                receipt.transaction_hash
            );
        }
        Ok(())
    }

    pub async fn repay_loan(&self, token: Address, amount: &str) -> Result<()> {
        let amount = units::to_fixed_point(amount)?;
        let pending = self
            .pool_write
            .repayLoan(token, amount)
            .send()
            .await
            .context("repayLoan submission failed")?;
        let receipt = pending
            .get_receipt()
            .await
            .context("repayLoan was not confirmed")?;
        if !receipt.status() {
            bail!("repayLoan reverted in tx {}", receipt.transaction_hash);
        }
        Ok(())
    }

    pub async fn liquidate_position(
        &self,
        user: Address,
        token: Address,
        debt_to_cover: &str,
    ) -> Result<()> {
        let debt_to_cover = units::to_fixed_point(debt_to_cover)?;
        let pending = self
            .pool_write
            .liquidatePosition(user, token, debt_to_cover)
            .send()
            .await
            .context("liquidatePosition submission failed")?;
        let receipt = pending
            .get_receipt()
            .await
            .context("liquidatePosition was not confirmed")?;
        if !receipt.status() {
            bail!("liquidatePosition reverted in tx {}", receipt.transaction_hash);
        }
        Ok(())
    }

    pub async fn add_liquidity(&self, token: Address, amount: &str) -> Result<()> {
        let amount = units::to_fixed_point(amount)?;
        let pending = self
            .pool_write
            .addLiquidity(token, amount)
            .send()
            .await
            .context("addLiquidity submission failed")?;
        let receipt = pending
            .get_receipt()
            .await
            .context("addLiquidity was not confirmed")?;
        if !receipt.status() {
            bail!("addLiquidity reverted in tx {}", receipt.transaction_hash);
        }
        Ok(())
    }

    pub async fn withdraw_from_liquidity_pool(&self, token: Address, amount: &str) -> Result<()> {
        let amount = units::to_fixed_point(amount)?;
        let pending = self
            .pool_write
            .withdrawFromLiquidityPool(token, amount)
            .send()
            .await
            .context("withdrawFromLiquidityPool submission failed")?;
        let receipt = pending
            .get_receipt()
            .await
            .context("withdrawFromLiquidityPool was not confirmed")?;
        if !receipt.status() {
            bail!(
                "withdrawFromLiquidityPool reverted in tx {}",
                receipt.transaction_hash
            );
        }
        Ok(())
    }

    pub async fn rebalance_portfolio(&self) -> Result<()> {
        let pending = self
            .pool_write
            .rebalancePortfolio()
            .send()
            .await
            .context("rebalancePortfolio submission failed")?;
        let receipt = pending
            .get_receipt()
            .await
            .context("rebalancePortfolio was not confirmed")?;
        if !receipt.status() {
            bail!("rebalancePortfolio reverted in tx {}", receipt.transaction_hash);
        }
        Ok(())
    }

    pub async fn transfer_ownership(&self, new_owner: Address) -> Result<()> {
        let pending = self
            .pool_write
            .transferOwnership(new_owner)
            .send()
            .await
            .context("transferOwnership submission failed")?;
        let receipt = pending
            .get_receipt()
            .await
            .context("transferOwnership was not confirmed")?;
        if !receipt.status() {
            bail!("transferOwnership reverted in tx {}", receipt.transaction_hash);
        }
        Ok(())
    }

    pub async fn accept_ownership(&self) -> Result<()> {
        let pending = self
            .pool_write
            .acceptOwnership()
            .send()
            .await
            .context("acceptOwnership submission failed")?;
        let receipt = pending
            .get_receipt()
            .await
            .context("acceptOwnership was not confirmed")?;
        if !receipt.status() {
            bail!("acceptOwnership reverted in tx {}", receipt.transaction_hash);
        }
        Ok(())
    }
}

fn health_factor_or_fallback<E: std::fmt::Display>(
    user: Address,
    result: Result<U256, E>,
) -> String {
    match result {
        Ok(value) => units::to_decimal(value),
        Err(e) => {
            warn!("userHealthFactor read failed for {}: {}", user, e);
            HEALTH_FACTOR_FALLBACK.to_string()
        }
    }
}

fn probe_result_to_flag<E: std::fmt::Display>(user: Address, result: Result<(), E>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            debug!("checkForBrokenHealthFactor reverted for {}: {}", user, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    const USER: Address = address!("0000000000000000000000000000000000000001");

    #[test]
    fn health_factor_read_failure_maps_to_sentinel() {
        let failed: Result<U256, &str> = Err("rpc unreachable");
        assert_eq!(health_factor_or_fallback(USER, failed), "0");
    }

    #[test]
    fn health_factor_success_is_rendered_as_decimal() {
        let value = U256::from(15) * U256::from(10).pow(U256::from(17));
        let ok: Result<U256, &str> = Ok(value);
        assert_eq!(health_factor_or_fallback(USER, ok), "1.5");
    }

    #[test]
    fn probe_resolution_means_broken() {
        let ok: Result<(), &str> = Ok(());
        assert!(probe_result_to_flag(USER, ok));
    }

    #[test]
    fn probe_failure_means_not_broken() {
        let reverted: Result<(), &str> = Err("execution reverted");
        assert!(!probe_result_to_flag(USER, reverted));
    }
}
