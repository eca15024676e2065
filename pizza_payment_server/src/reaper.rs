use chrono::Duration;
use log::*;
use pizza_payment_engine::{InMemoryStore, TransactionStore};
use tokio::task::JoinHandle;

/// Starts the stale order reaper. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Orders live in process memory only, so anything the storefront abandons would otherwise pile up
/// until restart. The reaper sweeps once a minute and drops every order older than `order_ttl`,
/// whatever its status. Pollers suspended on a reaped order resolve by poll timeout.
pub fn start_reaper(store: InMemoryStore, order_ttl: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(std::time::Duration::from_secs(60));
        info!("🕰️ Stale order reaper started. Orders are dropped after {} s", order_ttl.num_seconds());
        loop {
            timer.tick().await;
            trace!("🕰️ Running the stale order sweep");
            match store.reap_older_than(order_ttl).await {
                Ok(reaped) => {
                    for tx in &reaped {
                        info!(
                            "🕰️ Dropped order {} for shop {}. It was {} when it expired",
                            tx.order_id, tx.shop_id, tx.status
                        );
                    }
                },
                Err(e) => {
                    error!("🕰️ Error running the stale order sweep: {e}");
                },
            }
        }
    })
}
