//! Integration tests for Go Marketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Provider lifecycle and mutations over in-memory storage
//! - `file_persistence` - Reload across sessions over file storage
//!
//! This crate also provides shared fixtures for those tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use go_marketplace_core::{NewLineItem, Price, ProductId};

/// A product fixture.
#[must_use]
pub fn product(id: &str, title: &str, cents: u32) -> NewLineItem {
    NewLineItem {
        id: ProductId::new(id),
        title: title.to_string(),
        image_url: format!("https://cdn.example/{id}.png"),
        price: Price::from_cents(cents),
    }
}

/// A fresh, not yet created directory under the system temp dir.
#[must_use]
pub fn temp_dir(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{prefix}-{}", uuid::Uuid::new_v4()))
}
