//! Cart provider and the handle consumers use to reach the cart.
//!
//! A [`CartProvider`] is mounted once per session: it loads the persisted
//! cart, starts the persistence task, and then hands out [`CartHandle`]s to
//! whichever components need cart access. The provider only exists once the
//! load has finished, so no handle can observe or mutate a half-loaded cart.
//!
//! Every mutation runs against the one authoritative cart cell. The new cart
//! is computed from the live value and enqueued for persistence while the
//! cell is still locked, so two mutations issued back to back both land and
//! reach storage in the order they were made.

use std::sync::Arc;

use go_marketplace_core::{Cart, LineItem, NewLineItem, ProductId};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, instrument, warn};

use crate::config::CartConfig;
use crate::error::{CartError, PersistError, Result};
use crate::persistence::{self, Command};
use crate::storage::KeyValueStorage;

/// Owner of the session's cart.
///
/// Cloning a provider is cheap and yields another reference to the same cart.
#[derive(Clone)]
pub struct CartProvider {
    shared: Arc<Shared>,
}

/// Accessor for the cart: current items plus the mutators.
///
/// Obtained from [`CartProvider::handle`] or [`use_cart`]. Cheap to clone.
#[derive(Clone)]
pub struct CartHandle {
    shared: Arc<Shared>,
}

struct Shared {
    key: String,
    cart: watch::Sender<Cart>,
    commands: mpsc::UnboundedSender<Command>,
    errors: broadcast::Sender<PersistError>,
}

impl CartProvider {
    /// Load the persisted cart and start mirroring changes to `storage`.
    ///
    /// An absent or empty blob yields an empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the read fails and
    /// [`CartError::Corrupt`] if the stored blob is not a valid cart. There is
    /// no fallback to an empty cart.
    #[instrument(skip(storage, config), fields(key = %config.storage_key))]
    pub async fn mount<S: KeyValueStorage>(storage: S, config: CartConfig) -> Result<Self> {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(storage);

        debug!("Loading persisted cart");
        let cart = load_cart(storage.as_ref(), &config.storage_key).await?;
        info!(
            items = cart.len(),
            quantity = cart.total_quantity(),
            "Cart ready"
        );

        let (errors, _) = broadcast::channel(config.error_channel_capacity.max(1));
        let commands = persistence::spawn(storage, config.storage_key.clone(), errors.clone());
        let (cart, _) = watch::channel(cart);

        Ok(Self {
            shared: Arc::new(Shared {
                key: config.storage_key,
                cart,
                commands,
                errors,
            }),
        })
    }

    /// Get a handle to the cart.
    #[must_use]
    pub fn handle(&self) -> CartHandle {
        CartHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Storage key the cart is mirrored to.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.shared.key
    }
}

/// Resolve the cart handle for a component.
///
/// # Errors
///
/// Returns [`CartError::MissingProvider`] when `scope` is `None`: the
/// component was wired up without a mounted provider.
pub fn use_cart(scope: Option<&CartProvider>) -> Result<CartHandle> {
    scope.map(CartProvider::handle).ok_or(CartError::MissingProvider)
}

/// Read and parse the blob under `key`.
async fn load_cart(storage: &dyn KeyValueStorage, key: &str) -> Result<Cart> {
    match storage.get(key).await? {
        Some(blob) if !blob.trim().is_empty() => {
            serde_json::from_str(&blob).map_err(|source| CartError::Corrupt {
                key: key.to_owned(),
                source,
            })
        }
        _ => Ok(Cart::empty()),
    }
}

impl CartHandle {
    /// Snapshot of the current line items, in insertion order.
    #[must_use]
    pub fn products(&self) -> Vec<LineItem> {
        self.shared.cart.borrow().items().to_vec()
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.shared.cart.borrow().clone()
    }

    /// Watch the cart; the receiver sees every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.shared.cart.subscribe()
    }

    /// Subscribe to writes that failed to reach storage.
    ///
    /// Only failures after the call are delivered.
    #[must_use]
    pub fn persistence_errors(&self) -> broadcast::Receiver<PersistError> {
        self.shared.errors.subscribe()
    }

    /// Add one unit of `item`; new products are appended with quantity 1.
    pub fn add_to_cart(&self, item: NewLineItem) {
        debug!(product_id = %item.id, "Adding to cart");
        self.apply(|cart| cart.with_added(item));
    }

    /// Add one unit to the line for `id`. Unknown ids are ignored.
    pub fn increment(&self, id: &ProductId) {
        debug!(product_id = %id, "Incrementing cart line");
        self.apply(|cart| cart.with_incremented(id));
    }

    /// Remove one unit from the line for `id`, dropping the line at zero.
    /// Unknown ids are ignored.
    pub fn decrement(&self, id: &ProductId) {
        debug!(product_id = %id, "Decrementing cart line");
        self.apply(|cart| cart.with_decremented(id));
    }

    /// Drop the line for `id` whatever its quantity.
    pub fn remove(&self, id: &ProductId) {
        debug!(product_id = %id, "Removing cart line");
        self.apply(|cart| cart.without(id));
    }

    /// Empty the cart.
    pub fn clear(&self) {
        debug!("Clearing cart");
        self.apply(|_| Cart::empty());
    }

    /// Wait until every mutation made so far has been written or has failed.
    ///
    /// Failed writes are reported on [`persistence_errors`](Self::persistence_errors),
    /// not here.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::WorkerStopped`] if the persistence task is gone.
    pub async fn flush(&self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.shared
            .commands
            .send(Command::Flush(ack))
            .map_err(|_| CartError::WorkerStopped)?;
        done.await.map_err(|_| CartError::WorkerStopped)
    }

    /// Replace the cart with `transition(current)` and enqueue the result.
    fn apply(&self, transition: impl FnOnce(&Cart) -> Cart) {
        self.shared.cart.send_modify(|cart| {
            *cart = transition(cart);
            if self
                .shared
                .commands
                .send(Command::Write(cart.clone()))
                .is_err()
            {
                warn!(
                    key = %self.shared.key,
                    "Cart persistence task stopped; change kept in memory only"
                );
            }
        });
    }
}
