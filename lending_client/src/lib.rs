pub mod client;
pub mod contracts;
pub mod events;
pub mod models;
pub mod provider;
pub mod units;

pub use client::LendingClient;
pub use events::{DomainEvent, EventKind};
pub use models::LiquidityPosition;
pub use provider::http_provider;
