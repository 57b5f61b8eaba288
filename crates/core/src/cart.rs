//! Cart line items and the cart collection.
//!
//! A [`Cart`] is an ordered, id-unique list of [`LineItem`]s. Every
//! transition borrows the current cart and returns a new one, so the caller
//! decides when (and whether) the new value replaces the old.
//!
//! The serialized form of a cart is a JSON array of line items:
//!
//! ```json
//! [{ "id": "1", "title": "Shirt", "image_url": "u", "price": 10.0, "quantity": 2 }]
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId, Quantity};

/// Errors raised when cart data violates the cart invariants.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartDataError {
    /// Two line items share the same product ID.
    #[error("duplicate line item for product {0}")]
    DuplicateItem(ProductId),
}

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identifier, unique within a cart.
    pub id: ProductId,
    /// Product display title.
    pub title: String,
    /// Product image URL.
    pub image_url: String,
    /// Unit price.
    pub price: Price,
    /// Units in the cart (at least 1).
    pub quantity: Quantity,
}

impl LineItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity.get())
    }
}

/// A product being added to the cart: a [`LineItem`] without a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    /// Product identifier; an existing line with this id is incremented.
    pub id: ProductId,
    /// Product display title.
    pub title: String,
    /// Product image URL.
    pub image_url: String,
    /// Unit price.
    pub price: Price,
}

impl NewLineItem {
    /// Turn into a line item with a quantity of one.
    #[must_use]
    pub fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: Quantity::ONE,
        }
    }
}

/// The ordered, id-unique collection of line items.
///
/// Insertion order is kept across appends. No two items share an id and
/// every item has a quantity of at least 1; deserializing data that breaks
/// either rule fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// The line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line item by product ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|line| &line.id == id)
    }

    /// Whether the cart holds a line for `id`.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all line items.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Sum of line totals. No tax or discounts are applied.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items
            .iter()
            .map(LineItem::line_total)
            .fold(Price::ZERO, Price::saturating_add)
    }

    /// Add one unit of a product.
    ///
    /// A product not yet in the cart is appended with a quantity of one. For a
    /// product already in the cart only the quantity changes; the incoming
    /// title, image and price are ignored.
    #[must_use]
    pub fn with_added(&self, item: NewLineItem) -> Self {
        if self.contains(&item.id) {
            return self.with_incremented(&item.id);
        }

        let mut items = self.items.clone();
        items.push(item.into_line_item());
        Self { items }
    }

    /// Add one unit to an existing line. Unknown ids leave the cart as is.
    #[must_use]
    pub fn with_incremented(&self, id: &ProductId) -> Self {
        let items = self
            .items
            .iter()
            .map(|line| {
                if &line.id == id {
                    LineItem {
                        quantity: line.quantity.increment(),
                        ..line.clone()
                    }
                } else {
                    line.clone()
                }
            })
            .collect();
        Self { items }
    }

    /// Remove one unit from a line, dropping the line when it reaches zero.
    /// Unknown ids leave the cart as is.
    #[must_use]
    pub fn with_decremented(&self, id: &ProductId) -> Self {
        let items = self
            .items
            .iter()
            .filter_map(|line| {
                if &line.id != id {
                    return Some(line.clone());
                }
                line.quantity.decrement().map(|quantity| LineItem {
                    quantity,
                    ..line.clone()
                })
            })
            .collect();
        Self { items }
    }

    /// Drop a line entirely, whatever its quantity.
    #[must_use]
    pub fn without(&self, id: &ProductId) -> Self {
        let items = self
            .items
            .iter()
            .filter(|line| &line.id != id)
            .cloned()
            .collect();
        Self { items }
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = CartDataError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(items.len());
        for line in &items {
            if !seen.insert(&line.id) {
                return Err(CartDataError::DuplicateItem(line.id.clone()));
            }
        }
        Ok(Self { items })
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
