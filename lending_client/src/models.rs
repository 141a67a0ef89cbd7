use anyhow::{Context, Error, Result};

use crate::contracts::LendingPool;
use crate::units;

/// A liquidity provider's position in the pool.
///
/// The amount is rendered as a decimal string like every other monetary
/// value; the two timestamps come back from the contract as plain
/// seconds-since-epoch and are widened to numbers, not rescaled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityPosition {
    pub amount: String,
    pub withdrawal_time: u64,
    pub added_at: u64,
}

impl TryFrom<LendingPool::getLiquidityPoolReturn> for LiquidityPosition {
    type Error = Error;

    fn try_from(raw: LendingPool::getLiquidityPoolReturn) -> Result<Self> {
        Ok(Self {
            amount: units::to_decimal(raw.amount),
            withdrawal_time: u64::try_from(raw.withdrawalTime)
                .context("withdrawal time does not fit in u64")?,
            added_at: u64::try_from(raw.addedAt).context("added-at time does not fit in u64")?,
        })
    }
}
