//! Background task that mirrors the cart to storage.
//!
//! Every mutation enqueues a full snapshot of the cart. A single task drains
//! the queue and performs one write at a time, so writes never interleave.
//! When snapshots pile up behind a slow write, only the newest is written.

use std::sync::Arc;

use go_marketplace_core::Cart;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, instrument};

use crate::error::PersistError;
use crate::storage::KeyValueStorage;

/// Work item for the persistence task.
pub(crate) enum Command {
    /// Overwrite the stored blob with this cart.
    Write(Cart),
    /// Acknowledge once every write queued before this one has been attempted.
    Flush(oneshot::Sender<()>),
}

/// Spawn the persistence task and return its command queue.
///
/// The task runs until every sender is dropped, finishing queued work first.
pub(crate) fn spawn(
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    errors: broadcast::Sender<PersistError>,
) -> mpsc::UnboundedSender<Command> {
    let (commands, receiver) = mpsc::unbounded_channel();
    let worker = PersistenceWorker {
        storage,
        key,
        commands: receiver,
        errors,
    };
    tokio::spawn(worker.run());
    commands
}

struct PersistenceWorker {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    commands: mpsc::UnboundedReceiver<Command>,
    errors: broadcast::Sender<PersistError>,
}

impl PersistenceWorker {
    async fn run(mut self) {
        debug!(key = %self.key, "Cart persistence task started");

        while let Some(first) = self.commands.recv().await {
            let (latest, acks) = self.drain(first);

            // A newer snapshot supersedes older ones, so writing it satisfies
            // every flush queued in between.
            if let Some(cart) = latest {
                self.persist(&cart).await;
            }
            for ack in acks {
                let _ = ack.send(());
            }
        }

        info!(key = %self.key, "Cart persistence task stopped");
    }

    /// Take `first` plus everything already queued behind it.
    fn drain(&mut self, first: Command) -> (Option<Cart>, Vec<oneshot::Sender<()>>) {
        let mut latest = None;
        let mut acks = Vec::new();
        let mut skipped = 0_usize;

        let mut next = Some(first);
        while let Some(command) = next {
            match command {
                Command::Write(cart) => {
                    if latest.replace(cart).is_some() {
                        skipped += 1;
                    }
                }
                Command::Flush(ack) => acks.push(ack),
            }
            next = self.commands.try_recv().ok();
        }

        if skipped > 0 {
            debug!(skipped, "Coalesced queued cart snapshots");
        }
        (latest, acks)
    }

    #[instrument(skip(self, cart), fields(key = %self.key, items = cart.len()))]
    async fn persist(&self, cart: &Cart) {
        let result = match serde_json::to_string(cart) {
            Ok(blob) => self
                .storage
                .set(&self.key, &blob)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(()) => debug!("Persisted cart"),
            Err(message) => {
                let err = PersistError {
                    key: self.key.clone(),
                    message,
                };
                let event_id = sentry::capture_error(&err);
                error!(
                    error = %err,
                    sentry_event_id = %event_id,
                    "Cart write failed"
                );
                // No subscribers is fine; the failure is already logged.
                let _ = self.errors.send(err);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use go_marketplace_core::{NewLineItem, Price, ProductId};

    use super::*;
    use crate::storage::MemoryStorage;

    const KEY: &str = "@GoMarketplace:products";

    fn cart_with(quantity: usize) -> Cart {
        let item = NewLineItem {
            id: ProductId::new("1"),
            title: "Shirt".to_string(),
            image_url: "u".to_string(),
            price: Price::from_cents(1000),
        };
        (0..quantity).fold(Cart::empty(), |cart, _| cart.with_added(item.clone()))
    }

    async fn flush(commands: &mpsc::UnboundedSender<Command>) {
        let (tx, rx) = oneshot::channel();
        commands.send(Command::Flush(tx)).unwrap();
        rx.await.unwrap();
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let storage = MemoryStorage::new();
        let (errors, _) = broadcast::channel(4);
        let commands = spawn(Arc::new(storage.clone()), KEY.to_string(), errors);

        for n in 1..=5 {
            commands.send(Command::Write(cart_with(n))).unwrap();
        }
        flush(&commands).await;

        let stored: Cart = serde_json::from_str(&storage.get(KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(stored, cart_with(5));
        assert!(storage.write_count() >= 1);
        assert!(storage.write_count() <= 5);
    }

    #[tokio::test]
    async fn test_flush_without_writes_touches_nothing() {
        let storage = MemoryStorage::new();
        let (errors, _) = broadcast::channel(4);
        let commands = spawn(Arc::new(storage.clone()), KEY.to_string(), errors);

        flush(&commands).await;
        assert_eq!(storage.write_count(), 0);
        assert_eq!(storage.get(KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_write_is_published() {
        let storage = MemoryStorage::new();
        storage.fail_writes(true);
        let (errors, mut failures) = broadcast::channel(4);
        let commands = spawn(Arc::new(storage.clone()), KEY.to_string(), errors);

        commands.send(Command::Write(cart_with(1))).unwrap();
        flush(&commands).await;

        let failure = failures.try_recv().unwrap();
        assert_eq!(failure.key, KEY);
        assert!(failure.message.contains("disabled"));
    }
}
