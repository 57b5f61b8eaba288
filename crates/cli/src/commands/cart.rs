//! Cart commands backed by file storage.
//!
//! # Environment Variables
//!
//! - `GO_MARKETPLACE_STORAGE_DIR` - Where the cart file lives
//! - `GO_MARKETPLACE_STORAGE_KEY` - Key (and file name) of the cart blob

use go_marketplace_cart::{
    CartConfig, CartError, CartHandle, CartProvider, ConfigError, FileStorage, PersistError,
};
use go_marketplace_core::{NewLineItem, Price, PriceError, ProductId};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::info;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The cart store failed to load or flush.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// The price given on the command line is invalid.
    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] PriceError),

    /// The cart changed in memory but was not saved.
    #[error("{0}")]
    Persist(#[from] PersistError),
}

/// A mounted cart plus a subscription to its write failures.
pub struct CartSession {
    cart: CartHandle,
    failures: broadcast::Receiver<PersistError>,
}

impl CartSession {
    /// Load configuration and mount the cart from file storage.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the stored cart
    /// cannot be read.
    pub async fn open() -> Result<Self, CommandError> {
        let config = CartConfig::from_env()?;
        info!(dir = %config.storage_dir.display(), "Opening cart storage");

        let storage = FileStorage::new(config.storage_dir.clone());
        let provider = CartProvider::mount(storage, config).await?;
        let cart = provider.handle();
        let failures = cart.persistence_errors();

        Ok(Self { cart, failures })
    }

    /// The cart handle.
    pub const fn cart(&self) -> &CartHandle {
        &self.cart
    }

    /// Log every line and the cart totals.
    pub fn show(&self) {
        let cart = self.cart.cart();
        if cart.is_empty() {
            info!("Cart is empty");
            return;
        }

        for line in &cart {
            info!(
                id = %line.id,
                quantity = line.quantity.get(),
                price = %line.price,
                total = %line.line_total(),
                "{}",
                line.title
            );
        }
        info!(
            items = cart.len(),
            quantity = cart.total_quantity(),
            subtotal = %cart.subtotal(),
            "Cart totals"
        );
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if `price` is not a valid stored price.
    pub fn add(
        &self,
        id: String,
        title: String,
        image_url: String,
        price: Decimal,
    ) -> Result<(), CommandError> {
        self.cart.add_to_cart(new_line_item(id, title, image_url, price)?);
        Ok(())
    }

    /// Wait for pending writes and surface the first failure, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be written to storage.
    pub async fn commit(mut self) -> Result<(), CommandError> {
        self.cart.flush().await?;

        if let Ok(failure) = self.failures.try_recv() {
            return Err(failure.into());
        }

        self.show();
        Ok(())
    }
}

/// Build the `add` input from command line values.
fn new_line_item(
    id: String,
    title: String,
    image_url: String,
    price: Decimal,
) -> Result<NewLineItem, CommandError> {
    Ok(NewLineItem {
        id: ProductId::new(id),
        title,
        image_url,
        price: Price::new(price)?,
    })
}
