use std::str::FromStr;

use alloy::primitives::{Address, B256, Log};
use alloy::sol_types::{SolEvent, SolEventInterface};
use anyhow::{bail, Error};
use tracing::warn;

use crate::contracts::LendingPool::{self, LendingPoolEvents};
use crate::units;

/// The event kinds the lending pool emits, all carrying the same
/// {user, token, amount, timeStamp} shape with the account in the first
/// indexed topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    CollateralDeposited,
    AssetBorrowed,
    LoanRepayed,
    CollateralWithdrawn,
    PositionLiquidated,
    LiquidityAdded,
    LiquidityWithdrawn,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::CollateralDeposited,
        EventKind::AssetBorrowed,
        EventKind::LoanRepayed,
        EventKind::CollateralWithdrawn,
        EventKind::PositionLiquidated,
        EventKind::LiquidityAdded,
        EventKind::LiquidityWithdrawn,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EventKind::CollateralDeposited => "CollateralDeposited",
            EventKind::AssetBorrowed => "AssetBorrowed",
            EventKind::LoanRepayed => "LoanRepayed",
            EventKind::CollateralWithdrawn => "CollateralWithdrawn",
            EventKind::PositionLiquidated => "PositionLiquidated",
            EventKind::LiquidityAdded => "LiquidityAdded",
            EventKind::LiquidityWithdrawn => "LiquidityWithdrawn",
        }
    }

    pub fn signature_hash(&self) -> B256 {
        match self {
            EventKind::CollateralDeposited => LendingPool::CollateralDeposited::SIGNATURE_HASH,
            EventKind::AssetBorrowed => LendingPool::AssetBorrowed::SIGNATURE_HASH,
            EventKind::LoanRepayed => LendingPool::LoanRepayed::SIGNATURE_HASH,
            EventKind::CollateralWithdrawn => LendingPool::CollateralWithdrawn::SIGNATURE_HASH,
            EventKind::PositionLiquidated => LendingPool::PositionLiquidated::SIGNATURE_HASH,
            EventKind::LiquidityAdded => LendingPool::LiquidityAdded::SIGNATURE_HASH,
            EventKind::LiquidityWithdrawn => LendingPool::LiquidityWithdrawn::SIGNATURE_HASH,
        }
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match EventKind::ALL.iter().find(|kind| kind.name() == name) {
            Some(kind) => Ok(*kind),
            None => bail!("unknown event kind: {}", name),
        }
    }
}

/// A decoded entry from the pool's event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainEvent {
    pub user: Address,
    pub token: Address,
    pub amount: String,
    pub timestamp: u64,
    pub event_name: &'static str,
}

/// Decodes raw log entries into domain events, in log order.
///
/// Entries that fail to decode are dropped with a warning; one bad entry
/// never aborts the batch.
pub fn decode_events(logs: &[Log]) -> Vec<DomainEvent> {
    logs.iter()
        .filter_map(|log| match LendingPoolEvents::decode_log(log, false) {
            Ok(decoded) => domain_event(decoded.data),
            Err(e) => {
                warn!("Dropping undecodable log entry: {}", e);
                None
            }
        })
        .collect()
}

fn domain_event(event: LendingPoolEvents) -> Option<DomainEvent> {
    let (user, token, amount, timestamp, event_name) = match event {
        LendingPoolEvents::CollateralDeposited(e) => {
            (e.user, e.token, e.amount, e.timeStamp, "CollateralDeposited")
        }
        LendingPoolEvents::AssetBorrowed(e) => {
            (e.user, e.token, e.amount, e.timeStamp, "AssetBorrowed")
        }
        LendingPoolEvents::LoanRepayed(e) => (e.user, e.token, e.amount, e.timeStamp, "LoanRepayed"),
        LendingPoolEvents::CollateralWithdrawn(e) => {
            (e.user, e.token, e.amount, e.timeStamp, "CollateralWithdrawn")
        }
        LendingPoolEvents::PositionLiquidated(e) => {
            (e.user, e.token, e.amount, e.timeStamp, "PositionLiquidated")
        }
        LendingPoolEvents::LiquidityAdded(e) => {
            (e.provider, e.token, e.amount, e.timeStamp, "LiquidityAdded")
        }
        LendingPoolEvents::LiquidityWithdrawn(e) => {
            (e.provider, e.token, e.amount, e.timeStamp, "LiquidityWithdrawn")
        }
    };

    let timestamp = match u64::try_from(timestamp) {
        Ok(timestamp) => timestamp,
        Err(_) => {
            warn!("Dropping log entry with out-of-range timestamp");
            return None;
        }
    };

    Some(DomainEvent {
        user,
        token,
        amount: units::to_decimal(amount),
        timestamp,
        event_name,
    })
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, Bytes, LogData, U256};

    use super::*;

    fn wad(n: u64) -> U256 {
        U256::from(n) * U256::from(10).pow(U256::from(18))
    }

    fn deposit_log(user: Address, amount: U256, time_stamp: u64) -> Log {
        let event = LendingPool::CollateralDeposited {
            user,
            token: address!("00000000000000000000000000000000000000aa"),
            amount,
            timeStamp: U256::from(time_stamp),
        };
        Log {
            address: address!("00000000000000000000000000000000000000ff"),
            data: event.encode_log_data(),
        }
    }

    #[test]
    fn decodes_batch_in_log_order() {
        let user = address!("0000000000000000000000000000000000000001");
        let logs = vec![
            deposit_log(user, wad(1), 100),
            deposit_log(user, wad(2), 200),
        ];

        let events = decode_events(&logs);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].amount, "1.0");
        assert_eq!(events[0].timestamp, 100);
        assert_eq!(events[0].event_name, "CollateralDeposited");
        assert_eq!(events[1].amount, "2.0");
        assert_eq!(events[1].user, user);
    }

    #[test]
    fn drops_only_the_undecodable_entry() {
        let user = address!("0000000000000000000000000000000000000001");
        let good_first = deposit_log(user, wad(1), 100);
        let good_last = deposit_log(user, wad(3), 300);

        // Same topics, truncated body: decoding must fail for this one entry
        let corrupt = Log {
            address: good_first.address,
            data: LogData::new_unchecked(
                good_first.data.topics().to_vec(),
                Bytes::from(vec![0u8; 3]),
            ),
        };

        let events = decode_events(&[good_first, corrupt, good_last]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].amount, "1.0");
        assert_eq!(events[1].amount, "3.0");
    }

    #[test]
    fn event_kind_round_trips_through_name() {
        for kind in EventKind::ALL {
            assert_eq!(kind.name().parse::<EventKind>().unwrap(), kind);
        }
        assert!("Transfer".parse::<EventKind>().is_err());
    }
}
