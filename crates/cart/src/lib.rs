//! Go Marketplace cart state store.
//!
//! Holds the shopping cart in memory and mirrors every change to a
//! key-value storage slot.
//!
//! # Usage
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), go_marketplace_cart::CartError> {
//! use go_marketplace_cart::{CartConfig, CartProvider, MemoryStorage};
//! use go_marketplace_core::{NewLineItem, Price, ProductId};
//!
//! let provider = CartProvider::mount(MemoryStorage::new(), CartConfig::default()).await?;
//! let cart = provider.handle();
//!
//! cart.add_to_cart(NewLineItem {
//!     id: ProductId::new("1"),
//!     title: "Shirt".to_string(),
//!     image_url: "https://cdn.example/shirt.png".to_string(),
//!     price: Price::from_cents(1000),
//! });
//! cart.flush().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`provider`] - `CartProvider` (owns the cart) and `CartHandle` (the accessor)
//! - [`storage`] - The `KeyValueStorage` collaborator and its memory/file backends
//! - [`config`] - Store configuration, optionally loaded from the environment
//! - [`error`] - Error types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
mod persistence;
pub mod provider;
pub mod storage;

pub use config::{CartConfig, ConfigError, DEFAULT_STORAGE_KEY};
pub use error::{CartError, PersistError, Result, StorageError};
pub use provider::{CartHandle, CartProvider, use_cart};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
