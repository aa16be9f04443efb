//! # relational-demo
//!
//! A shop object model generated at build time by relational-codegen:
//! customers, orders referencing customers twice, order items with a
//! composite key and an `active_customers` view.
//!
//! ```ignore
//! use std::sync::Arc;
//! use relational_demo::ShopRoot;
//!
//! let shop = ShopRoot::new(Arc::new(db));
//! for order in shop.get_order_list(None, None)? {
//!     let customer = order.get_customer()?;
//! }
//! ```

#[allow(clippy::all, clippy::pedantic, clippy::nursery)]
mod shop {
    include!(concat!(env!("OUT_DIR"), "/shop.rs"));
}

pub use shop::*;
