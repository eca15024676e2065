//! Wake-ups for suspended status polls.
//!
//! A poll that cannot be answered yet registers a [`WaitTicket`] with the [`NotificationHub`] and
//! awaits it. When the order settles, [`NotificationHub::notify`] wakes every ticket registered
//! for that order exactly once and forgets them. Tickets deregister themselves when dropped, so a
//! poller that times out or disconnects leaves nothing behind.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
        Mutex,
        MutexGuard,
        PoisonError,
    },
};

use log::*;
use tokio::sync::oneshot;

use crate::db_types::OrderId;

type WaiterMap = HashMap<OrderId, HashMap<u64, oneshot::Sender<()>>>;

#[derive(Debug, Default)]
struct HubInner {
    waiters: Mutex<WaiterMap>,
    next_handle: AtomicU64,
}

impl HubInner {
    fn lock(&self) -> MutexGuard<'_, WaiterMap> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deregister(&self, order_id: &OrderId, handle_id: u64) {
        let mut waiters = self.lock();
        if let Some(handles) = waiters.get_mut(order_id) {
            if handles.remove(&handle_id).is_some() {
                trace!("📣️ Deregistered waiter {handle_id} for order {order_id}");
            }
            if handles.is_empty() {
                waiters.remove(order_id);
            }
        }
    }
}

/// The waiter registry. Cloning is cheap and clones share the registry.
///
/// The registry lock is only ever held for map bookkeeping, never across an await point.
#[derive(Debug, Clone, Default)]
pub struct NotificationHub {
    inner: Arc<HubInner>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in `order_id` settling. Registration is immediate; the returned ticket
    /// is awaited separately, so a caller can re-check state between registering and suspending.
    pub fn register(&self, order_id: &OrderId) -> WaitTicket {
        let (tx, rx) = oneshot::channel();
        let handle_id = self.inner.next_handle.fetch_add(1, Ordering::Relaxed);
        let mut waiters = self.inner.lock();
        waiters.entry(order_id.clone()).or_default().insert(handle_id, tx);
        trace!("📣️ Registered waiter {handle_id} for order {order_id}");
        WaitTicket { hub: Arc::clone(&self.inner), order_id: order_id.clone(), handle_id, rx: Some(rx) }
    }

    /// Wakes every waiter currently registered for `order_id`, exactly once, and clears the key.
    ///
    /// A handle whose receiver has already gone away is logged and skipped; it never stops the
    /// remaining waiters from being woken. Tickets registered after this call are not woken by it.
    pub fn notify(&self, order_id: &OrderId) {
        let handles = self.inner.lock().remove(order_id);
        let Some(handles) = handles else {
            trace!("📣️ No waiters registered for order {order_id}");
            return;
        };
        let count = handles.len();
        for (handle_id, tx) in handles {
            if tx.send(()).is_err() {
                debug!("📣️ Waiter {handle_id} for order {order_id} went away before it could be woken");
            }
        }
        debug!("📣️ Woke {count} waiter(s) for order {order_id}");
    }

    /// The number of waiters currently registered for `order_id`.
    pub fn waiter_count(&self, order_id: &OrderId) -> usize {
        self.inner.lock().get(order_id).map(|handles| handles.len()).unwrap_or_default()
    }
}

/// A registered wake-up handle, removed from the registry when woken or dropped.
#[derive(Debug)]
pub struct WaitTicket {
    hub: Arc<HubInner>,
    order_id: OrderId,
    handle_id: u64,
    rx: Option<oneshot::Receiver<()>>,
}

impl WaitTicket {
    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Waits for the wake-up. Completes immediately if notify already fired for this ticket.
    pub async fn wait(mut self) {
        if let Some(rx) = self.rx.take() {
            let _ = rx.await;
        }
    }

    /// Drops the receiving end while leaving the registration in place, simulating a waiter that
    /// disappeared without deregistering.
    #[cfg(test)]
    fn abandon(mut self) {
        self.rx = None;
        std::mem::forget(self);
    }
}

impl Drop for WaitTicket {
    fn drop(&mut self) {
        self.hub.deregister(&self.order_id, self.handle_id);
    }
}
