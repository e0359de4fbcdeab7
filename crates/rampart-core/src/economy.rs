//! Gold and build-site collaborators.
//!
//! The registry pays for placement and upgrades through [`Economy`] and checks
//! cells through [`BuildMap`]. Both are small traits so the embedder can back
//! them with its own game state; [`Treasury`] and closures cover tests.

use serde::{Deserialize, Serialize};

/// Gold accounting used by placement, upgrade and sale.
pub trait Economy {
    /// Returns true if `cost` can be paid right now.
    fn can_afford(&self, cost: u32) -> bool;

    /// Deducts `amount`. Callers check [`Economy::can_afford`] first.
    fn spend_gold(&mut self, amount: u32);

    /// Credits `amount`.
    fn add_gold(&mut self, amount: u32);
}

/// Simple gold counter.
///
/// # Example
///
/// ```
/// use rampart_core::economy::{Economy, Treasury};
///
/// let mut treasury = Treasury::new(100);
/// assert!(treasury.can_afford(50));
/// treasury.spend_gold(50);
/// treasury.add_gold(35);
/// assert_eq!(treasury.gold(), 85);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treasury {
    gold: u32,
}

impl Treasury {
    /// Creates a treasury holding `gold`.
    #[must_use]
    pub const fn new(gold: u32) -> Self {
        Self { gold }
    }

    /// Current balance.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }
}

impl Economy for Treasury {
    fn can_afford(&self, cost: u32) -> bool {
        self.gold >= cost
    }

    fn spend_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_sub(amount);
    }

    fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }
}

/// Grid-cell buildability.
pub trait BuildMap {
    /// Returns true if a tower may stand on cell `(gx, gy)`.
    fn is_buildable(&self, gx: i32, gy: i32) -> bool;
}

impl<F> BuildMap for F
where
    F: Fn(i32, i32) -> bool,
{
    fn is_buildable(&self, gx: i32, gy: i32) -> bool {
        self(gx, gy)
    }
}
