//! Go Marketplace Core - Shared cart types library.
//!
//! This crate provides the domain types used across all Go Marketplace components:
//! - `cart` - The cart state store and its persistence
//! - `cli` - Command-line driver for the cart store
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no async runtime. Every cart transition takes a `&Cart` and returns
//! a new `Cart`, which keeps the store's read-modify-write logic trivially
//! testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, and quantities
//! - [`cart`] - Line items and the id-unique, ordered cart collection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartDataError, LineItem, NewLineItem};
pub use types::*;
