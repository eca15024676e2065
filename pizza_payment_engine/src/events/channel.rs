//! Stateless pub-sub plumbing for engine events.
//!
//! Components subscribe to order events by installing an async closure. Handlers are stateless,
//! receiving only the event itself and nothing of the engine's internals.
use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
    time::Duration,
};

use log::*;
use tokio::sync::mpsc;

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs the dispatch loop until the last producer is dropped, then waits for any handler jobs
    /// still in flight before returning.
    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // Our own sender must go first, or the recv loop would never end.
        drop(self.sender);
        let in_flight = Arc::new(AtomicI64::new(0));
        while let Some(event) = self.listener.recv().await {
            trace!("📬️ Dispatching event");
            let handler = Arc::clone(&self.handler);
            in_flight.fetch_add(1, Ordering::SeqCst);
            let counter = Arc::clone(&in_flight);
            tokio::spawn(async move {
                (handler)(event).await;
                counter.fetch_sub(1, Ordering::SeqCst);
                trace!("📬️ Event handled");
            });
        }
        loop {
            let remaining = in_flight.load(Ordering::SeqCst);
            if remaining <= 0 {
                break;
            }
            debug!("📬️ Waiting for {remaining} handler job(s) to finish");
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
        debug!("📬️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }
}
