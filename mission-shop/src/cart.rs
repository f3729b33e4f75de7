//! Shopping cart
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// A line item in the shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item: String,
    pub quantity: u32,
}

/// Shopping cart state.
///
/// Lines keep the order in which items were first added. Totals are never
/// cached; they are recomputed from the catalog on every read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create a new empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from a flat list of item names, one entry per unit.
    pub fn from_flat<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut cart = Self::new();
        for item in items {
            cart.add_one(item.as_ref());
        }
        cart
    }

    /// Expand the cart into a flat list of item names, one entry per unit.
    #[must_use]
    pub fn to_flat(&self) -> Vec<String> {
        self.lines
            .iter()
            .flat_map(|line| std::iter::repeat_n(line.item.clone(), line.quantity as usize))
            .collect()
    }

    /// Find a cart line by item name.
    #[must_use]
    pub fn find_line(&self, item: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.item == item)
    }

    fn find_line_mut(&mut self, item: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.item == item)
    }

    /// Add one unit of an item.
    /// Returns the new quantity for that item.
    pub fn add_one(&mut self, item: &str) -> u32 {
        if let Some(line) = self.find_line_mut(item) {
            line.quantity += 1;
            line.quantity
        } else {
            self.lines.push(CartLine {
                item: item.to_string(),
                quantity: 1,
            });
            1
        }
    }

    /// Remove one unit of an item.
    /// Returns the new quantity (0 if the line is removed or was absent).
    pub fn remove_one(&mut self, item: &str) -> u32 {
        let Some(line) = self.find_line_mut(item) else {
            return 0;
        };
        line.quantity = line.quantity.saturating_sub(1);
        let remaining = line.quantity;
        if remaining == 0 {
            self.lines.retain(|l| l.item != item);
        }
        remaining
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Get the current quantity of an item in the cart.
    #[must_use]
    pub fn quantity(&self, item: &str) -> u32 {
        self.find_line(item).map_or(0, |line| line.quantity)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> std::slice::Iter<'_, CartLine> {
        self.lines.iter()
    }

    /// Calculate the total cost of the cart against a catalog.
    ///
    /// Lines whose item is no longer listed contribute nothing.
    #[must_use]
    pub fn total(&self, catalog: &Catalog) -> i64 {
        let mut total = 0i64;

        for line in &self.lines {
            if let Some(entry) = catalog.find(&line.item) {
                total += i64::from(entry.unit_price) * i64::from(line.quantity);
            } else {
                log::warn!("cart line {:?} has no catalog entry; skipped", line.item);
            }
        }

        total
    }
}
