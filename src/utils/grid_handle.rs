//! Lazily resolved, weakly cached grid reference

use std::sync::{Arc, Weak};

use log::debug;
use parking_lot::RwLock;

use crate::common::GridLocator;

/// Resolves the grid through a [`GridLocator`] on first use and caches a
/// weak reference to it. The cache is refreshed behind `&self` whenever the
/// cached grid has been dropped.
pub struct GridHandle<G, L> {
    locator: L,
    cached: RwLock<Weak<G>>,
}

impl<G, L> GridHandle<G, L>
where
    L: GridLocator<G>,
{
    pub fn new(locator: L) -> Self {
        Self {
            locator,
            cached: RwLock::new(Weak::new()),
        }
    }

    /// The current grid, if one can be found
    pub fn grid(&self) -> Option<Arc<G>> {
        if let Some(grid) = self.cached.read().upgrade() {
            return Some(grid);
        }

        let grid = match self.locator.locate() {
            Some(grid) => grid,
            None => {
                debug!("[GridHandle] no grid located");
                return None;
            }
        };
        *self.cached.write() = Arc::downgrade(&grid);
        Some(grid)
    }

    /// Forget the cached grid so the next access locates it again
    pub fn invalidate(&self) {
        *self.cached.write() = Weak::new();
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }
}
