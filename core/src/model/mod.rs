// storefront/src/model/mod.rs

//! Data carried between the remote API, the durable store and the views.

pub mod cart;
pub mod product;

pub use cart::{CartId, CartItem, CartState, LineRequest, RemoteCart, RemoteCartLine};
pub use product::{Dimensions, Product, ProductDetail, ProductId, ProductPage, Review};
