// storefront/src/cart/mod.rs

pub mod reconcile;
pub mod sync;

pub use reconcile::DEFAULT_STOCK_CEILING;
pub use sync::{CartSynchronizer, SyncStatus};
