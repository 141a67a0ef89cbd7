use std::future::Future;
use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Anything that can answer a health-factor read for an account.
///
/// The observer only depends on this seam, so the contract adapter (or a
/// test double) is injected explicitly rather than reached through ambient
/// state.
pub trait HealthFactorSource: Send + Sync + 'static {
    fn user_health_factor(
        &self,
        account: Address,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// The observer's inputs: a source handle and the account to watch.
/// `None` while either dependency is still missing.
pub type ObserverInputs<S> = Option<(Arc<S>, Address)>;

/// Keeps a published health-factor value synchronized with its inputs.
///
/// Reactive recomputation, not polling: one read is issued each time the
/// source identity or the account changes and both are present. A failed
/// read is logged and the published value is left untouched, so consumers
/// cannot tell "not yet fetched" from "fetch failed" by the output alone.
pub struct HealthFactorObserver;

impl HealthFactorObserver {
    /// Spawns the observer task.
    ///
    /// The task ends when the input channel's sender is dropped.
    pub fn start<S: HealthFactorSource>(
        mut inputs: watch::Receiver<ObserverInputs<S>>,
        output: watch::Sender<Option<String>>,
    ) -> JoinHandle<Result<()>> {
        tokio::spawn(async move {
            info!("Starting health factor observer");

            // Identity of the last (source, account) pair a read was issued
            // for, so re-sending the same inputs does not refetch.
            let mut last_seen: Option<(usize, Address)> = None;

            loop {
                let snapshot = inputs.borrow_and_update().clone();
                match snapshot {
                    Some((source, account)) => {
                        let identity = (Arc::as_ptr(&source) as usize, account);
                        if last_seen != Some(identity) {
                            last_seen = Some(identity);
                            match source.user_health_factor(account).await {
                                Ok(health_factor) => {
                                    info!("Health factor for {}: {}", account, health_factor);
                                    let _ = output.send(Some(health_factor));
                                }
                                Err(e) => {
                                    warn!("Health factor read failed for {}: {:#}", account, e)
                                }
                            }
                        }
                    }
                    // A dependency went away: make no call, leave the
                    // published value untouched, and refetch when the
                    // inputs come back even if they are identical.
                    None => last_seen = None,
                }

                if inputs.changed().await.is_err() {
                    info!("Observer inputs closed, stopping");
                    return Ok(());
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use alloy::primitives::address;
    use anyhow::bail;

    use super::*;

    struct StubSource {
        calls: AtomicUsize,
        value: String,
        fail: bool,
    }

    impl StubSource {
        fn new(value: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                value: value.to_string(),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                value: String::new(),
                fail: true,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl HealthFactorSource for StubSource {
        async fn user_health_factor(&self, _account: Address) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                bail!("rpc unreachable");
            }
            Ok(self.value.clone())
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn makes_no_call_while_inputs_are_absent() {
        let source = StubSource::new("1.5");
        let (inputs_tx, inputs_rx) = watch::channel::<ObserverInputs<StubSource>>(None);
        let (output_tx, output_rx) = watch::channel(None);

        let handle = HealthFactorObserver::start(inputs_rx, output_tx);
        settle().await;

        assert_eq!(source.calls(), 0);
        assert_eq!(*output_rx.borrow(), None);

        drop(inputs_tx);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn fetches_once_when_inputs_appear() {
        let source = StubSource::new("1.5");
        let account = address!("0000000000000000000000000000000000000001");
        let (inputs_tx, inputs_rx) = watch::channel::<ObserverInputs<StubSource>>(None);
        let (output_tx, output_rx) = watch::channel(None);

        let handle = HealthFactorObserver::start(inputs_rx, output_tx);

        inputs_tx.send(Some((source.clone(), account))).unwrap();
        settle().await;

        assert_eq!(source.calls(), 1);
        assert_eq!(output_rx.borrow().as_deref(), Some("1.5"));

        // Re-sending the identical pair is not an identity change
        inputs_tx.send(Some((source.clone(), account))).unwrap();
        settle().await;
        assert_eq!(source.calls(), 1);

        drop(inputs_tx);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn refetches_when_the_account_changes() {
        let source = StubSource::new("2.0");
        let first = address!("0000000000000000000000000000000000000001");
        let second = address!("0000000000000000000000000000000000000002");
        let (inputs_tx, inputs_rx) = watch::channel::<ObserverInputs<StubSource>>(None);
        let (output_tx, _output_rx) = watch::channel(None);

        let handle = HealthFactorObserver::start(inputs_rx, output_tx);

        inputs_tx.send(Some((source.clone(), first))).unwrap();
        settle().await;
        inputs_tx.send(Some((source.clone(), second))).unwrap();
        settle().await;

        assert_eq!(source.calls(), 2);

        drop(inputs_tx);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn refetches_after_inputs_disappear_and_return() {
        let source = StubSource::new("1.1");
        let account = address!("0000000000000000000000000000000000000001");
        let (inputs_tx, inputs_rx) = watch::channel::<ObserverInputs<StubSource>>(None);
        let (output_tx, _output_rx) = watch::channel(None);

        let handle = HealthFactorObserver::start(inputs_rx, output_tx);

        inputs_tx.send(Some((source.clone(), account))).unwrap();
        settle().await;
        inputs_tx.send(None).unwrap();
        settle().await;
        inputs_tx.send(Some((source.clone(), account))).unwrap();
        settle().await;

        assert_eq!(source.calls(), 2);

        drop(inputs_tx);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn failed_read_leaves_prior_value_published() {
        let good = StubSource::new("1.8");
        let bad = StubSource::failing();
        let account = address!("0000000000000000000000000000000000000001");
        let (inputs_tx, inputs_rx) = watch::channel::<ObserverInputs<StubSource>>(None);
        let (output_tx, output_rx) = watch::channel(None);

        let handle = HealthFactorObserver::start(inputs_rx, output_tx);

        inputs_tx.send(Some((good.clone(), account))).unwrap();
        settle().await;
        assert_eq!(output_rx.borrow().as_deref(), Some("1.8"));

        inputs_tx.send(Some((bad.clone(), account))).unwrap();
        settle().await;

        assert_eq!(bad.calls(), 1);
        assert_eq!(output_rx.borrow().as_deref(), Some("1.8"));

        drop(inputs_tx);
        handle.await.unwrap().unwrap();
    }
}
