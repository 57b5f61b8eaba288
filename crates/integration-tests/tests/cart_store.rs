//! Integration tests for the cart store over in-memory storage.
//!
//! These tests drive the public provider/handle API end to end and check
//! what actually lands in storage.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use go_marketplace_cart::{
    CartConfig, CartError, CartHandle, CartProvider, DEFAULT_STORAGE_KEY, KeyValueStorage,
    MemoryStorage, use_cart,
};
use go_marketplace_core::{Cart, ProductId};
use go_marketplace_integration_tests::product;

async fn mount(storage: &MemoryStorage) -> CartHandle {
    CartProvider::mount(storage.clone(), CartConfig::default())
        .await
        .unwrap()
        .handle()
}

async fn stored_cart(storage: &MemoryStorage) -> Option<Cart> {
    storage
        .get(DEFAULT_STORAGE_KEY)
        .await
        .unwrap()
        .map(|blob| serde_json::from_str(&blob).unwrap())
}

fn quantities(cart: &CartHandle) -> Vec<(String, u32)> {
    cart.products()
        .into_iter()
        .map(|line| (line.id.into_inner(), line.quantity.get()))
        .collect()
}

// ============================================================================
// Wiring Tests
// ============================================================================

#[test]
fn test_accessor_outside_provider_fails() {
    let err = use_cart(None).err().unwrap();
    assert!(matches!(err, CartError::MissingProvider));
    assert!(err.to_string().contains("must be used within a CartProvider"));
}

#[tokio::test]
async fn test_handles_share_one_cart() {
    let provider = CartProvider::mount(MemoryStorage::new(), CartConfig::default())
        .await
        .unwrap();
    let header = use_cart(Some(&provider)).unwrap();
    let list = provider.handle();

    list.add_to_cart(product("1", "Shirt", 1000));
    assert_eq!(quantities(&header), [("1".to_string(), 1)]);
}

// ============================================================================
// Mutation Tests
// ============================================================================

#[tokio::test]
async fn test_add_add_decrement_decrement_scenario() {
    let storage = MemoryStorage::new();
    let cart = mount(&storage).await;
    let id = ProductId::new("1");

    cart.add_to_cart(product("1", "Shirt", 1000));
    assert_eq!(quantities(&cart), [("1".to_string(), 1)]);

    cart.add_to_cart(product("1", "Shirt", 1000));
    assert_eq!(quantities(&cart), [("1".to_string(), 2)]);

    cart.decrement(&id);
    assert_eq!(quantities(&cart), [("1".to_string(), 1)]);

    cart.decrement(&id);
    assert!(cart.products().is_empty());

    cart.flush().await.unwrap();
    assert_eq!(stored_cart(&storage).await, Some(Cart::empty()));
}

#[tokio::test]
async fn test_unknown_ids_are_silent_noops() {
    let storage = MemoryStorage::new();
    let cart = mount(&storage).await;
    cart.add_to_cart(product("1", "Shirt", 1000));
    let before = cart.cart();

    cart.increment(&ProductId::new("ghost"));
    cart.decrement(&ProductId::new("ghost"));
    cart.flush().await.unwrap();

    assert_eq!(cart.cart(), before);
    assert_eq!(stored_cart(&storage).await, Some(before));
}

#[tokio::test]
async fn test_decrement_keeps_other_fields() {
    let cart = mount(&MemoryStorage::new()).await;
    let id = ProductId::new("7");
    cart.add_to_cart(product("7", "Lamp", 2599));
    cart.increment(&id);
    cart.increment(&id);
    cart.decrement(&id);

    let line = &cart.products()[0];
    assert_eq!(line.quantity.get(), 2);
    assert_eq!(line.title, "Lamp");
    assert_eq!(line.image_url, "https://cdn.example/7.png");
    assert_eq!(line.price.to_string(), "25.99");
}

#[tokio::test]
async fn test_burst_of_mutations_loses_nothing() {
    let storage = MemoryStorage::new();
    let cart = mount(&storage).await;

    let mut tasks = Vec::new();
    for _ in 0..50 {
        let cart = cart.clone();
        tasks.push(tokio::spawn(async move {
            cart.add_to_cart(product("1", "Shirt", 1000));
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    cart.flush().await.unwrap();

    assert_eq!(quantities(&cart), [("1".to_string(), 50)]);
    assert_eq!(stored_cart(&storage).await, Some(cart.cart()));
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_flush_mirrors_memory_to_storage() {
    let storage = MemoryStorage::new();
    let cart = mount(&storage).await;

    cart.add_to_cart(product("1", "Shirt", 1000));
    cart.add_to_cart(product("2", "Mug", 450));
    cart.increment(&ProductId::new("2"));
    cart.flush().await.unwrap();

    let stored = stored_cart(&storage).await.unwrap();
    assert_eq!(stored, cart.cart());
    assert_eq!(stored.total_quantity(), 3);
}

#[tokio::test]
async fn test_remount_reproduces_cart() {
    let storage = MemoryStorage::new();
    let first = mount(&storage).await;
    first.add_to_cart(product("1", "Shirt", 1000));
    first.add_to_cart(product("2", "Mug", 450));
    first.add_to_cart(product("1", "Shirt", 1000));
    first.flush().await.unwrap();

    let second = mount(&storage).await;
    assert_eq!(second.cart(), first.cart());
}

#[tokio::test]
async fn test_write_failures_reach_error_channel() {
    let storage = MemoryStorage::new();
    let cart = mount(&storage).await;
    let mut failures = cart.persistence_errors();

    storage.fail_writes(true);
    cart.add_to_cart(product("1", "Shirt", 1000));
    cart.flush().await.unwrap();

    let failure = failures.recv().await.unwrap();
    assert_eq!(failure.key, DEFAULT_STORAGE_KEY);
    assert_eq!(cart.products().len(), 1);
    assert_eq!(stored_cart(&storage).await, None);

    // Not retried, but the next mutation writes the full cart again
    storage.fail_writes(false);
    cart.increment(&ProductId::new("1"));
    cart.flush().await.unwrap();
    assert_eq!(stored_cart(&storage).await, Some(cart.cart()));
}

#[tokio::test]
async fn test_custom_storage_key() {
    let storage = MemoryStorage::new();
    let config = CartConfig {
        storage_key: "@Test:cart".to_string(),
        ..CartConfig::default()
    };
    let cart = CartProvider::mount(storage.clone(), config)
        .await
        .unwrap()
        .handle();

    cart.add_to_cart(product("1", "Shirt", 1000));
    cart.flush().await.unwrap();

    assert!(storage.get("@Test:cart").await.unwrap().is_some());
    assert_eq!(storage.get(DEFAULT_STORAGE_KEY).await.unwrap(), None);
}

// ============================================================================
// Load Failure Tests
// ============================================================================

#[tokio::test]
async fn test_malformed_blob_fails_mount() {
    let storage = MemoryStorage::with_entries([(DEFAULT_STORAGE_KEY, "[{\"id\": 1}]")]);
    let result = CartProvider::mount(storage, CartConfig::default()).await;
    assert!(matches!(result, Err(CartError::Corrupt { .. })));
}

#[tokio::test]
async fn test_duplicate_ids_fail_mount() {
    let blob = r#"[
        {"id":"1","title":"Shirt","image_url":"u","price":10,"quantity":1},
        {"id":"1","title":"Shirt","image_url":"u","price":10,"quantity":2}
    ]"#;
    let storage = MemoryStorage::with_entries([(DEFAULT_STORAGE_KEY, blob)]);
    let result = CartProvider::mount(storage, CartConfig::default()).await;
    assert!(matches!(result, Err(CartError::Corrupt { .. })));
}
