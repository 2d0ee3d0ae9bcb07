//! Application services for the storefront.
//!
//! # Services
//!
//! - `cart` - Cart container: a user's cart lines mirrored from the backend
//! - `wishlist` - Wishlist container: a user's saved products
//!
//! Both follow the same contract: state is a whole-collection snapshot of the
//! remote store, re-fetched in full after every mutation. There is no
//! optimistic patching and no local merge; a signed-out container is always
//! empty. Remote failures are logged and leave the snapshot unchanged.

pub mod cart;
pub mod wishlist;

pub use cart::{CartService, CartStore};
pub use wishlist::{WishlistService, WishlistStore};
